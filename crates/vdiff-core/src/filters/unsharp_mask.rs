use ndarray::Array2;

use crate::consts::{UNSHARP_AMOUNT, UNSHARP_KERNEL_SIZE, UNSHARP_SIGMA};
use crate::filters::gaussian_blur::{gaussian_blur_raster, gaussian_blur_sized};
use crate::raster::RasterImage;

/// Parameters of an unsharp mask.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UnsharpParams {
    /// Odd size of the Gaussian kernel.
    pub kernel_size: usize,
    /// Gaussian sigma for the blurred copy.
    pub sigma: f32,
    /// Fraction of (original - blurred) added back.
    pub amount: f32,
    /// Minimum |original - blurred| to sharpen.
    pub threshold: f32,
}

impl Default for UnsharpParams {
    /// `1.5 * original - 0.5 * blurred` over a 3x3 kernel.
    fn default() -> Self {
        Self {
            kernel_size: UNSHARP_KERNEL_SIZE,
            sigma: UNSHARP_SIGMA,
            amount: UNSHARP_AMOUNT,
            threshold: 0.0,
        }
    }
}

/// Apply unsharp mask sharpening to one plane.
pub fn unsharp_mask_array(data: &Array2<f32>, params: &UnsharpParams) -> Array2<f32> {
    let blurred = gaussian_blur_sized(data, params.kernel_size, params.sigma);
    ndarray::Zip::from(data)
        .and(&blurred)
        .map_collect(|&orig, &blur| sharpen_sample(orig, blur, params))
}

/// Apply unsharp mask sharpening to every channel of a raster.
pub fn unsharp_mask(img: &RasterImage, params: &UnsharpParams) -> RasterImage {
    let blurred = gaussian_blur_raster(img, params.kernel_size, params.sigma);
    let data = ndarray::Zip::from(&img.data)
        .and(&blurred.data)
        .map_collect(|&orig, &blur| sharpen_sample(orig, blur, params));
    RasterImage::new(data)
}

#[inline]
fn sharpen_sample(orig: f32, blur: f32, params: &UnsharpParams) -> f32 {
    let diff = orig - blur;
    if diff.abs() > params.threshold {
        (orig + diff * params.amount).clamp(0.0, 1.0)
    } else {
        orig
    }
}
