use ndarray::{Array2, Array3};
use tracing::{debug, warn};

use crate::consts::{COVERAGE_THRESHOLD, RASTER_CHANNELS};
use crate::filters::build_rows;
use crate::filters::unsharp_mask::{unsharp_mask, UnsharpParams};
use crate::homography::Homography;
use crate::raster::RasterImage;

/// Image 2 resampled into image 1's frame.
#[derive(Clone, Debug)]
pub struct WarpResult {
    /// Bilinear resample, zero outside the source.
    pub warped: RasterImage,
    /// `warped` after the unsharp step; what every visualization shows.
    pub sharpened: RasterImage,
    /// A solid plane warped through the same transform: 1 where the output
    /// has full source coverage, 0 where it has none.
    pub coverage: Array2<f32>,
}

impl WarpResult {
    /// Pixels with true source coverage.
    pub fn coverage_mask(&self) -> Array2<bool> {
        self.coverage.mapv(|v| v > COVERAGE_THRESHOLD)
    }
}

/// Warp `src` by `transform` (source → destination coordinates) onto a
/// `out_w`x`out_h` canvas and sharpen the result.
pub fn warp(src: &RasterImage, transform: &Homography, out_w: usize, out_h: usize) -> WarpResult {
    let (warped, coverage) = warp_perspective(src, transform, out_w, out_h);
    let sharpened = unsharp_mask(&warped, &UnsharpParams::default());
    WarpResult {
        warped,
        sharpened,
        coverage,
    }
}

/// Inverse-mapped bilinear warp with a constant zero border, plus the
/// coverage plane.
///
/// A non-invertible transform yields an empty canvas with zero coverage.
pub fn warp_perspective(
    src: &RasterImage,
    transform: &Homography,
    out_w: usize,
    out_h: usize,
) -> (RasterImage, Array2<f32>) {
    let Some(inverse) = transform.inverse() else {
        warn!("Transform is not invertible, warped image is empty");
        return (
            RasterImage::new(Array3::zeros((out_h, out_w, RASTER_CHANNELS))),
            Array2::zeros((out_h, out_w)),
        );
    };
    debug!(out_w, out_h, "Warping image");

    // Four color samples and the coverage sample per pixel.
    let samples: Array2<[f32; 5]> = build_rows(out_h, out_w, |row| {
        (0..out_w)
            .map(|col| match inverse.apply(col as f64, row as f64) {
                Some((x, y)) => bilinear_sample(src, y, x),
                None => [0.0; 5],
            })
            .collect()
    });

    let mut data = Array3::<f32>::zeros((out_h, out_w, RASTER_CHANNELS));
    let mut coverage = Array2::<f32>::zeros((out_h, out_w));
    for ((row, col), px) in samples.indexed_iter() {
        for c in 0..RASTER_CHANNELS {
            data[[row, col, c]] = px[c];
        }
        coverage[[row, col]] = px[RASTER_CHANNELS];
    }

    (RasterImage::new(data), coverage)
}

/// Bilinear sample at `(y, x)`; pixels outside the source count as zero.
/// The fifth lane is the interpolated in-bounds weight.
fn bilinear_sample(src: &RasterImage, y: f64, x: f64) -> [f32; 5] {
    let (h, w) = src.dim();
    if !(x.is_finite() && y.is_finite()) || x <= -1.0 || y <= -1.0 || x >= w as f64 || y >= h as f64
    {
        return [0.0; 5];
    }

    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;
    let fx = (x - x0 as f64) as f32;
    let fy = (y - y0 as f64) as f32;

    let mut out = [0.0f32; 5];
    let taps = [
        (y0, x0, (1.0 - fx) * (1.0 - fy)),
        (y0, x0 + 1, fx * (1.0 - fy)),
        (y0 + 1, x0, (1.0 - fx) * fy),
        (y0 + 1, x0 + 1, fx * fy),
    ];
    for (r, c, weight) in taps {
        if weight == 0.0 || r < 0 || c < 0 || r >= h as i64 || c >= w as i64 {
            continue;
        }
        let (r, c) = (r as usize, c as usize);
        for (ch, lane) in out.iter_mut().take(RASTER_CHANNELS).enumerate() {
            *lane += src.data[[r, c, ch]] * weight;
        }
        out[RASTER_CHANNELS] += weight;
    }
    out
}
