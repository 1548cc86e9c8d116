//! Visualizations of an aligned pair.
//!
//! Every compositor takes image 1 and the sharpened warp of image 2 at the
//! same working size and returns a raster of that size (side-by-side is
//! twice as wide).

use ndarray::{Array2, Zip};
use tracing::debug;

use crate::consts::{FEATHER_KERNEL_SIZE, FEATHER_SIGMA, HIGHLIGHT_DILATE_ITERATIONS};
use crate::coords::{Rect, WorkingSpace};
use crate::error::Result;
use crate::filters::gaussian_blur::gaussian_blur_sized;
use crate::filters::median::{median3, median3_mask};
use crate::filters::morphology::{dilate_n, morphological_opening, StructuringElement};
use crate::filters::threshold::otsu_binarize;
use crate::raster::RasterImage;
use crate::scale::{classify_legend, Legend};
use crate::warp::WarpResult;

/// Image 1 and the warped image 2 next to each other.
pub fn side_by_side(
    first: &RasterImage,
    second: &RasterImage,
    first_on_right: bool,
) -> Result<RasterImage> {
    first.ensure_same_size(second)?;
    if first_on_right {
        RasterImage::hconcat(second, first)
    } else {
        RasterImage::hconcat(first, second)
    }
}

/// `(1 - t) * first + t * second` on every channel.
pub fn dissolve(first: &RasterImage, second: &RasterImage, t: f32) -> Result<RasterImage> {
    first.ensure_same_size(second)?;
    let t = t.clamp(0.0, 1.0);
    let data = Zip::from(&first.data)
        .and(&second.data)
        .map_collect(|&a, &b| (1.0 - t) * a + t * b);
    Ok(RasterImage::new(data))
}

fn add_saturating(base: &RasterImage, overlay: &RasterImage) -> RasterImage {
    let data = Zip::from(&base.data)
        .and(&overlay.data)
        .map_collect(|&a, &b| (a + b).min(1.0));
    RasterImage::new(data)
}

/// The 50/50 dissolve with an opaque alpha channel.
pub fn merged(first: &RasterImage, second: &RasterImage) -> Result<RasterImage> {
    Ok(dissolve(first, second, 0.5)?.with_opaque_alpha())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HighlightOptions {
    /// Ignore differences where both binarized inputs agree.
    pub noise_reduction: bool,
    pub first_on_right: bool,
}

impl Default for HighlightOptions {
    fn default() -> Self {
        Self {
            noise_reduction: true,
            first_on_right: false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct HighlightOutput {
    /// The 50/50 dissolve with the difference overlay added.
    pub merged: RasterImage,
    /// Image 1 with its highlight layer.
    pub first: RasterImage,
    /// Warped image 2 with its highlight layer.
    pub second: RasterImage,
    /// Both highlight layers: red where image 1 is brighter, blue where
    /// image 2 is.
    pub overlay: RasterImage,
    pub legend: Legend,
    /// Pixels set in either difference mask before feathering.
    pub difference_pixels: usize,
}

/// Highlight local differences between image 1 and the warped image 2,
/// inside `roi` and where the warp has source coverage.
pub fn highlight(
    first: &RasterImage,
    warp: &WarpResult,
    roi: &Rect<WorkingSpace>,
    options: &HighlightOptions,
) -> Result<HighlightOutput> {
    first.ensure_same_size(&warp.warped)?;
    first.ensure_same_size(&warp.sharpened)?;
    let (h, w) = first.dim();

    let gray1 = first.luminance();
    let gray2 = warp.warped.luminance();

    let binary1 = otsu_binarize(&gray1);
    let binary2 = otsu_binarize(&gray2);
    let differs = options
        .noise_reduction
        .then(|| Zip::from(&binary1).and(&binary2).map_collect(|&a, &b| a ^ b));

    let lighter1 = Zip::from(&gray1).and(&gray2).map_collect(|&a, &b| (a - b).max(0.0));
    let lighter2 = Zip::from(&gray2).and(&gray1).map_collect(|&a, &b| (a - b).max(0.0));
    let absolute = Zip::from(&gray1).and(&gray2).map_collect(|&a, &b| (a - b).abs());

    let keep = region_mask(h, w, roi, &warp.coverage_mask());
    let candidates = |diff: &Array2<f32>| -> Array2<bool> {
        let mut mask = otsu_binarize(&median3(diff));
        if let Some(differs) = &differs {
            mask.zip_mut_with(differs, |m, &d| *m &= d);
        }
        mask.zip_mut_with(&keep, |m, &k| *m &= k);
        denoise(&mask)
    };

    let lighter1 = candidates(&lighter1);
    let lighter2 = candidates(&lighter2);
    let absolute = candidates(&absolute);

    // Only regions confirmed by the absolute difference survive.
    let red = Zip::from(&absolute).and(&lighter1).map_collect(|&a, &b| a && b);
    let blue = Zip::from(&absolute).and(&lighter2).map_collect(|&a, &b| a && b);
    let difference_pixels = Zip::from(&red)
        .and(&blue)
        .fold(0usize, |n, &r, &b| n + usize::from(r || b));
    debug!(difference_pixels, "Highlight masks computed");

    let legend = classify_legend(
        &binary1,
        &binary2,
        difference_pixels > 0,
        options.first_on_right,
    );

    let red = feather(&red);
    let blue = feather(&blue);
    let zeros = Array2::<f32>::zeros((h, w));
    let layer1 = RasterImage::from_planes(&red, &zeros, &zeros, &red);
    let layer2 = RasterImage::from_planes(&zeros, &zeros, &blue, &blue);
    let overlay = add_saturating(&layer1, &layer2);

    let base = merged(first, &warp.sharpened)?;
    Ok(HighlightOutput {
        merged: add_saturating(&base, &overlay),
        first: add_saturating(first, &layer1),
        second: add_saturating(&warp.sharpened, &layer2),
        overlay,
        legend,
        difference_pixels,
    })
}

/// Set inside the integer-snapped ROI where the coverage mask is set.
fn region_mask(h: usize, w: usize, roi: &Rect<WorkingSpace>, coverage: &Array2<bool>) -> Array2<bool> {
    let (col0, row0, col1, row1) = roi.as_pixel_rect().snapped(w, h);
    Array2::from_shape_fn((h, w), |(row, col)| {
        row >= row0 && row < row1 && col >= col0 && col < col1 && coverage[[row, col]]
    })
}

/// Median, opening to drop specks, then dilation to regrow what remains.
fn denoise(mask: &Array2<bool>) -> Array2<bool> {
    let element = StructuringElement::Ellipse;
    let smoothed = median3_mask(mask);
    let opened = morphological_opening(&smoothed, element);
    dilate_n(&opened, element, HIGHLIGHT_DILATE_ITERATIONS)
}

fn feather(mask: &Array2<bool>) -> Array2<f32> {
    let plane = mask.mapv(|v| if v { 1.0 } else { 0.0 });
    gaussian_blur_sized(&plane, FEATHER_KERNEL_SIZE, FEATHER_SIGMA)
}

/// Red/blue anaglyph inside the ROI over the 50/50 dissolve.
///
/// Image 1's gray level drives red and image 2's drives blue, with green
/// their product: dark content only in image 1 shows blue, dark content
/// only in image 2 shows red, and shared content stays dark.
pub fn anaglyph(
    first: &RasterImage,
    second: &RasterImage,
    roi: &Rect<WorkingSpace>,
) -> Result<RasterImage> {
    first.ensure_same_size(second)?;
    let (h, w) = first.dim();
    let gray1 = first.luminance();
    let gray2 = second.luminance();

    let mut out = merged(first, second)?;
    let (col0, row0, col1, row1) = roi.as_pixel_rect().snapped(w, h);
    for row in row0..row1 {
        for col in col0..col1 {
            let g1 = gray1[[row, col]];
            let g2 = gray2[[row, col]];
            out.data[[row, col, 0]] = g1;
            out.data[[row, col, 1]] = g1 * g2;
            out.data[[row, col, 2]] = g2;
            out.data[[row, col, 3]] = 1.0;
        }
    }
    Ok(out)
}
