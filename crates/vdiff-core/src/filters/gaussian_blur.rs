use ndarray::{s, Array2};

use crate::raster::RasterImage;

use super::build_rows;

/// Gaussian blur with a kernel radius of `ceil(3 * sigma)`.
pub fn gaussian_blur_array(data: &Array2<f32>, sigma: f32) -> Array2<f32> {
    let radius = (sigma * 3.0).ceil().max(1.0) as usize;
    gaussian_blur_sized(data, 2 * radius + 1, sigma)
}

/// Gaussian blur with an explicit odd kernel size, using separable 1D
/// convolution. Borders replicate the edge pixel.
pub fn gaussian_blur_sized(data: &Array2<f32>, kernel_size: usize, sigma: f32) -> Array2<f32> {
    let kernel = make_gaussian_kernel(kernel_size / 2, sigma);
    let row_pass = convolve_rows(data, &kernel);
    convolve_cols(&row_pass, &kernel)
}

/// Blur every channel of a raster, alpha included.
pub fn gaussian_blur_raster(img: &RasterImage, kernel_size: usize, sigma: f32) -> RasterImage {
    let mut out = img.clone();
    for c in 0..img.data.dim().2 {
        let plane = img.channel(c);
        let blurred = gaussian_blur_sized(&plane, kernel_size, sigma);
        out.data.slice_mut(s![.., .., c]).assign(&blurred);
    }
    out
}

fn make_gaussian_kernel(radius: usize, sigma: f32) -> Vec<f32> {
    let size = 2 * radius + 1;
    let mut kernel = vec![0.0f32; size];
    let s2 = 2.0 * sigma * sigma;
    let mut sum = 0.0f32;

    for (i, k) in kernel.iter_mut().enumerate() {
        let x = i as f32 - radius as f32;
        *k = (-x * x / s2).exp();
        sum += *k;
    }

    for v in &mut kernel {
        *v /= sum;
    }

    kernel
}

fn convolve_rows(data: &Array2<f32>, kernel: &[f32]) -> Array2<f32> {
    let (h, w) = data.dim();
    let radius = kernel.len() as isize / 2;

    build_rows(h, w, |row| {
        (0..w)
            .map(|col| {
                kernel
                    .iter()
                    .enumerate()
                    .map(|(ki, &kv)| {
                        let src = (col as isize + ki as isize - radius).clamp(0, w as isize - 1);
                        data[[row, src as usize]] * kv
                    })
                    .sum::<f32>()
            })
            .collect()
    })
}

fn convolve_cols(data: &Array2<f32>, kernel: &[f32]) -> Array2<f32> {
    let (h, w) = data.dim();
    let radius = kernel.len() as isize / 2;

    build_rows(h, w, |row| {
        (0..w)
            .map(|col| {
                kernel
                    .iter()
                    .enumerate()
                    .map(|(ki, &kv)| {
                        let src = (row as isize + ki as isize - radius).clamp(0, h as isize - 1);
                        data[[src as usize, col]] * kv
                    })
                    .sum::<f32>()
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernel_is_normalized_and_symmetric() {
        let k = make_gaussian_kernel(1, 1.0);
        assert_eq!(k.len(), 3);
        assert!((k.iter().sum::<f32>() - 1.0).abs() < 1e-6);
        assert!((k[0] - k[2]).abs() < 1e-7);
        assert!(k[1] > k[0]);
    }
}
