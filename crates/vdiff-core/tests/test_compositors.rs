mod common;

use vdiff_core::composite::{anaglyph, dissolve, highlight, merged, side_by_side, HighlightOptions};
use vdiff_core::coords::{Rect, WorkingSpace};
use vdiff_core::error::VdiffError;
use vdiff_core::homography::Homography;
use vdiff_core::raster::RasterImage;
use vdiff_core::scale::LegendColor;
use vdiff_core::warp::warp;

use common::{channel_is_uniform, max_abs_diff, page_with_square, solid, BLACK, WHITE};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn full_roi(img: &RasterImage) -> Rect<WorkingSpace> {
    Rect::new(0.0, 0.0, img.width() as f64, img.height() as f64)
}

fn red_blue(w: usize, h: usize) -> (RasterImage, RasterImage) {
    (
        solid(w, h, [1.0, 0.0, 0.0, 1.0]),
        solid(w, h, [0.0, 0.0, 1.0, 1.0]),
    )
}

// ---------------------------------------------------------------------------
// Side-by-side
// ---------------------------------------------------------------------------

#[test]
fn test_side_by_side_doubles_width() {
    let (a, b) = red_blue(6, 4);
    let out = side_by_side(&a, &b, false).unwrap();
    assert_eq!(out.dim(), (4, 12));
    assert_eq!(out.pixel(0, 0), [1.0, 0.0, 0.0, 1.0]);
    assert_eq!(out.pixel(0, 11), [0.0, 0.0, 1.0, 1.0]);
}

#[test]
fn test_side_by_side_can_put_first_on_right() {
    let (a, b) = red_blue(6, 4);
    let out = side_by_side(&a, &b, true).unwrap();
    assert_eq!(out.pixel(3, 0), [0.0, 0.0, 1.0, 1.0]);
    assert_eq!(out.pixel(3, 6), [1.0, 0.0, 0.0, 1.0]);
}

#[test]
fn test_compositors_reject_mismatched_sizes() {
    let a = solid(6, 4, WHITE);
    let b = solid(5, 4, WHITE);
    assert!(matches!(
        side_by_side(&a, &b, false),
        Err(VdiffError::SizeMismatch { .. })
    ));
    assert!(matches!(dissolve(&a, &b, 0.5), Err(VdiffError::SizeMismatch { .. })));
    assert!(matches!(
        anaglyph(&a, &b, &full_roi(&a)),
        Err(VdiffError::SizeMismatch { .. })
    ));
}

// ---------------------------------------------------------------------------
// Dissolve
// ---------------------------------------------------------------------------

#[test]
fn test_dissolve_endpoints_are_exact() {
    let a = page_with_square(16, 16, 2, 2, 5);
    let b = page_with_square(16, 16, 8, 8, 5);
    assert_eq!(dissolve(&a, &b, 0.0).unwrap(), a);
    assert_eq!(dissolve(&a, &b, 1.0).unwrap(), b);
}

#[test]
fn test_dissolve_is_linear() {
    let (a, b) = red_blue(3, 3);
    let out = dissolve(&a, &b, 0.25).unwrap();
    let px = out.pixel(1, 1);
    assert!((px[0] - 0.75).abs() < 1e-6);
    assert!((px[2] - 0.25).abs() < 1e-6);
}

#[test]
fn test_merged_is_opaque_half_dissolve() {
    let a = solid(4, 4, [1.0, 1.0, 1.0, 0.0]);
    let b = solid(4, 4, [0.0, 0.0, 0.0, 0.0]);
    let m = merged(&a, &b).unwrap();
    assert!(channel_is_uniform(&m, 0, 0.5, 1e-6));
    assert!(channel_is_uniform(&m, 3, 1.0, 0.0));
}

// ---------------------------------------------------------------------------
// Highlight
// ---------------------------------------------------------------------------

#[test]
fn test_highlight_of_identical_images_is_empty() {
    let a = page_with_square(40, 40, 10, 10, 12);
    let w = warp(&a, &Homography::identity(), 40, 40);
    let out = highlight(&a, &w, &full_roi(&a), &HighlightOptions::default()).unwrap();

    assert_eq!(out.difference_pixels, 0);
    assert!(out.overlay.data.iter().all(|&v| v == 0.0));
    assert_eq!(out.legend.first, LegendColor::Gray);
    assert_eq!(out.legend.second, LegendColor::Gray);
}

#[test]
fn test_highlight_marks_each_direction() {
    // Ink only in image 1 at (20..40), only in image 2 at (50..70).
    let a = page_with_square(80, 80, 20, 20, 20);
    let b = page_with_square(80, 80, 50, 50, 20);
    let w = warp(&b, &Homography::identity(), 80, 80);
    let out = highlight(&a, &w, &full_roi(&a), &HighlightOptions::default()).unwrap();

    assert!(out.difference_pixels > 0);
    // Image 2 brighter where only image 1 has ink: blue.
    let only_first = out.overlay.pixel(30, 30);
    assert!((only_first[2] - 1.0).abs() < 1e-5 && only_first[0] == 0.0);
    // Image 1 brighter where only image 2 has ink: red.
    let only_second = out.overlay.pixel(60, 60);
    assert!((only_second[0] - 1.0).abs() < 1e-5 && only_second[2] == 0.0);
    // Untouched background.
    assert_eq!(out.overlay.pixel(5, 75), [0.0; 4]);

    // Dark ink on a light page: image 1 content is blue, image 2 red.
    assert_eq!(out.legend.first, LegendColor::Blue);
    assert_eq!(out.legend.second, LegendColor::Red);

    // The merged view is the half dissolve plus the overlay.
    let m = out.merged.pixel(30, 30);
    assert!((m[0] - 0.5).abs() < 1e-3 && (m[2] - 1.0).abs() < 1e-3);
    assert!((out.merged.pixel(5, 75)[0] - 1.0).abs() < 1e-5);
}

/// Square of `ink` on a `bg` page.
fn square_on(w: usize, h: usize, at: usize, size: usize, ink: f32, bg: f32) -> RasterImage {
    RasterImage::from_fn(w, h, |row, col| {
        let v = if (at..at + size).contains(&col) && (at..at + size).contains(&row) {
            ink
        } else {
            bg
        };
        [v, v, v, 1.0]
    })
}

#[test]
fn test_noise_reduction_drops_differences_both_binarizations_agree_on() {
    // Both squares binarize as ink, so only the raw difference sees them.
    let a = square_on(80, 80, 20, 20, 0.9, 1.0);
    let b = square_on(80, 80, 20, 20, 0.6, 1.0);
    let w = warp(&b, &Homography::identity(), 80, 80);

    let reduced = highlight(&a, &w, &full_roi(&a), &HighlightOptions::default()).unwrap();
    assert_eq!(reduced.difference_pixels, 0);

    let options = HighlightOptions {
        noise_reduction: false,
        ..HighlightOptions::default()
    };
    let raw = highlight(&a, &w, &full_roi(&a), &options).unwrap();
    assert!(raw.difference_pixels > 0);
    // Image 1 is brighter inside the square: red.
    assert!((raw.overlay.pixel(30, 30)[0] - 1.0).abs() < 1e-5);
}

#[test]
fn test_highlight_legend_inverts_on_dark_pages() {
    let a = square_on(80, 80, 10, 20, 1.0, 0.0);
    let b = square_on(80, 80, 50, 20, 1.0, 0.0);
    let w = warp(&b, &Homography::identity(), 80, 80);
    let out = highlight(&a, &w, &full_roi(&a), &HighlightOptions::default()).unwrap();

    assert!(out.difference_pixels > 0);
    assert_eq!(out.legend.first, LegendColor::Red);
    assert_eq!(out.legend.second, LegendColor::Blue);
}

#[test]
fn test_highlight_respects_roi() {
    let a = page_with_square(80, 80, 20, 20, 20);
    let b = solid(80, 80, WHITE);
    let w = warp(&b, &Homography::identity(), 80, 80);

    let inside = highlight(&a, &w, &Rect::new(0.0, 0.0, 50.0, 50.0), &HighlightOptions::default())
        .unwrap();
    assert!(inside.difference_pixels > 0);

    let outside = highlight(&a, &w, &Rect::new(50.0, 50.0, 30.0, 30.0), &HighlightOptions::default())
        .unwrap();
    assert_eq!(outside.difference_pixels, 0);
    assert!(outside.overlay.data.iter().all(|&v| v == 0.0));
}

#[test]
fn test_highlight_ignores_uncovered_pixels() {
    // Image 2 shifted far right: the left half of the output has no source.
    let a = page_with_square(60, 30, 5, 5, 20);
    let b = solid(60, 30, WHITE);
    let w = warp(&b, &Homography::translation(40.0, 0.0), 60, 30);
    let out = highlight(&a, &w, &full_roi(&a), &HighlightOptions::default()).unwrap();
    assert_eq!(out.difference_pixels, 0);
}

#[test]
fn test_highlight_legend_follows_ordering() {
    let a = page_with_square(80, 80, 20, 20, 20);
    let b = page_with_square(80, 80, 50, 50, 20);
    let w = warp(&b, &Homography::identity(), 80, 80);
    let options = HighlightOptions {
        first_on_right: true,
        ..HighlightOptions::default()
    };
    let out = highlight(&a, &w, &full_roi(&a), &options).unwrap();
    assert_eq!(out.legend.right(), LegendColor::Blue);
    assert_eq!(out.legend.left(), LegendColor::Red);
}

#[test]
fn test_highlight_single_image_outputs() {
    let a = page_with_square(80, 80, 20, 20, 20);
    let b = page_with_square(80, 80, 50, 50, 20);
    let w = warp(&b, &Homography::identity(), 80, 80);
    let out = highlight(&a, &w, &full_roi(&a), &HighlightOptions::default()).unwrap();

    // Image 1 gets the red layer where image 2 has ink.
    let first = out.first.pixel(60, 60);
    assert!((first[0] - 1.0).abs() < 1e-5);
    // Image 2 gets the blue layer where image 1 has ink.
    let second = out.second.pixel(30, 30);
    assert!((second[2] - 1.0).abs() < 1e-5);
    assert_eq!(out.first.dim(), a.dim());
    assert_eq!(out.second.dim(), a.dim());
}

// ---------------------------------------------------------------------------
// Anaglyph
// ---------------------------------------------------------------------------

#[test]
fn test_anaglyph_of_white_pages_is_uniform() {
    let a = solid(20, 20, WHITE);
    let out = anaglyph(&a, &a, &full_roi(&a)).unwrap();
    for c in 0..4 {
        assert!(channel_is_uniform(&out, c, 1.0, 1e-6));
    }
}

#[test]
fn test_anaglyph_colors_exclusive_ink() {
    let a = page_with_square(20, 20, 0, 0, 10);
    let b = solid(20, 20, WHITE);
    let out = anaglyph(&a, &b, &full_roi(&a)).unwrap();
    // Ink only in image 1 shows blue.
    let px = out.pixel(5, 5);
    assert!(px[0] < 1e-6 && px[1] < 1e-6 && (px[2] - 1.0).abs() < 1e-6);

    let out = anaglyph(&b, &a, &full_roi(&a)).unwrap();
    // Ink only in image 2 shows red.
    let px = out.pixel(5, 5);
    assert!((px[0] - 1.0).abs() < 1e-6 && px[1] < 1e-6 && px[2] < 1e-6);
}

#[test]
fn test_anaglyph_outside_roi_is_merged() {
    let a = solid(20, 20, BLACK);
    let b = solid(20, 20, WHITE);
    let out = anaglyph(&a, &b, &Rect::new(0.0, 0.0, 10.0, 20.0)).unwrap();
    let m = merged(&a, &b).unwrap();
    assert!(max_abs_diff(
        &RasterImage::new(out.data.slice(ndarray::s![.., 10.., ..]).to_owned()),
        &RasterImage::new(m.data.slice(ndarray::s![.., 10.., ..]).to_owned()),
    ) < 1e-6);
    // Inside: ink only in image 1 shows blue.
    let px = out.pixel(0, 0);
    assert!(px[0] == 0.0 && px[1] == 0.0 && (px[2] - 1.0).abs() < 1e-6);
}
