mod common;

use vdiff_core::homography::Homography;
use vdiff_core::raster::RasterImage;
use vdiff_core::warp::{warp, warp_perspective};

use common::{channel_is_uniform, max_abs_diff, solid, WHITE};

fn gradient(w: usize, h: usize) -> RasterImage {
    RasterImage::from_fn(w, h, |row, col| {
        [col as f32 / w as f32, row as f32 / h as f32, 0.5, 1.0]
    })
}

// ---------------------------------------------------------------------------
// warp_perspective
// ---------------------------------------------------------------------------

#[test]
fn test_identity_warp_reproduces_source() {
    let src = gradient(16, 12);
    let (out, coverage) = warp_perspective(&src, &Homography::identity(), 16, 12);
    assert!(max_abs_diff(&out, &src) < 1e-6);
    assert!(coverage.iter().all(|&c| (c - 1.0).abs() < 1e-6));
}

#[test]
fn test_output_takes_requested_size() {
    let src = gradient(10, 10);
    let (out, coverage) = warp_perspective(&src, &Homography::scaling(2.0, 3.0), 20, 30);
    assert_eq!(out.dim(), (30, 20));
    assert_eq!(coverage.dim(), (30, 20));
}

#[test]
fn test_translation_leaves_zero_border_without_coverage() {
    let src = solid(10, 10, WHITE);
    // Source shifted right by 4: the first four output columns have no source.
    let (out, coverage) = warp_perspective(&src, &Homography::translation(4.0, 0.0), 10, 10);
    for row in 0..10 {
        for col in 0..3 {
            assert_eq!(out.pixel(row, col), [0.0; 4]);
            assert_eq!(coverage[[row, col]], 0.0);
        }
        for col in 4..10 {
            assert!((coverage[[row, col]] - 1.0).abs() < 1e-6);
            assert!((out.data[[row, col, 0]] - 1.0).abs() < 1e-6);
        }
    }
}

#[test]
fn test_half_pixel_shift_interpolates() {
    let src = RasterImage::from_fn(4, 1, |_, col| {
        let v = if col < 2 { 0.0 } else { 1.0 };
        [v, v, v, 1.0]
    });
    let (out, _) = warp_perspective(&src, &Homography::translation(0.5, 0.0), 4, 1);
    // Output col 2 samples source x = 1.5, halfway between 0 and 1.
    assert!((out.data[[0, 2, 0]] - 0.5).abs() < 1e-6);
}

#[test]
fn test_singular_transform_yields_empty_canvas() {
    let src = solid(8, 8, WHITE);
    let singular = Homography::from_rows([[0.0; 3], [0.0; 3], [0.0, 0.0, 1.0]]);
    let (out, coverage) = warp_perspective(&src, &singular, 8, 8);
    assert!(out.data.iter().all(|&v| v == 0.0));
    assert!(coverage.iter().all(|&v| v == 0.0));
}

// ---------------------------------------------------------------------------
// warp (with sharpening)
// ---------------------------------------------------------------------------

#[test]
fn test_sharpening_keeps_flat_regions() {
    let src = solid(12, 12, [0.4, 0.4, 0.4, 1.0]);
    let result = warp(&src, &Homography::identity(), 12, 12);
    assert!(channel_is_uniform(&result.sharpened, 0, 0.4, 1e-5));
    assert!(result.coverage_mask().iter().all(|&m| m));
}

#[test]
fn test_sharpening_steepens_edges() {
    let src = RasterImage::from_fn(8, 3, |_, col| {
        let v = if col < 4 { 0.2 } else { 0.8 };
        [v, v, v, 1.0]
    });
    let result = warp(&src, &Homography::identity(), 8, 3);
    // Unsharp pushes each side of the step away from the other.
    assert!(result.sharpened.data[[1, 3, 0]] < 0.2);
    assert!(result.sharpened.data[[1, 4, 0]] > 0.8);
}
