use image::imageops::FilterType;
use image::{DynamicImage, ImageBuffer, Rgba, RgbaImage};
use ndarray::{s, Array2, Array3};

use crate::consts::{LUMINANCE_B, LUMINANCE_G, LUMINANCE_R, RASTER_CHANNELS};
use crate::coords::FrameMapping;
use crate::error::{Result, VdiffError};

/// An RGBA raster image.
/// Samples are f32 in [0.0, 1.0].
#[derive(Clone, Debug, PartialEq)]
pub struct RasterImage {
    /// Pixel data, row-major, shape = (height, width, 4)
    pub data: Array3<f32>,
}

impl RasterImage {
    pub fn new(data: Array3<f32>) -> Self {
        debug_assert_eq!(data.dim().2, RASTER_CHANNELS);
        Self { data }
    }

    /// A raster of `width`x`height` where every pixel is `rgba`.
    pub fn filled(width: usize, height: usize, rgba: [f32; 4]) -> Self {
        Self::from_fn(width, height, |_, _| rgba)
    }

    /// Build a raster from a per-pixel function of `(row, col)`.
    pub fn from_fn(width: usize, height: usize, f: impl Fn(usize, usize) -> [f32; 4]) -> Self {
        let mut data = Array3::<f32>::zeros((height, width, RASTER_CHANNELS));
        for row in 0..height {
            for col in 0..width {
                let px = f(row, col);
                for (c, v) in px.iter().enumerate() {
                    data[[row, col, c]] = *v;
                }
            }
        }
        Self { data }
    }

    /// Assemble a raster from four equally sized channel planes.
    pub fn from_planes(
        red: &Array2<f32>,
        green: &Array2<f32>,
        blue: &Array2<f32>,
        alpha: &Array2<f32>,
    ) -> Self {
        let (h, w) = red.dim();
        let mut data = Array3::<f32>::zeros((h, w, RASTER_CHANNELS));
        for (c, plane) in [red, green, blue, alpha].into_iter().enumerate() {
            data.slice_mut(s![.., .., c]).assign(plane);
        }
        Self { data }
    }

    pub fn width(&self) -> usize {
        self.data.dim().1
    }

    pub fn height(&self) -> usize {
        self.data.dim().0
    }

    /// `(height, width)`, matching the shape of the channel planes.
    pub fn dim(&self) -> (usize, usize) {
        let (h, w, _) = self.data.dim();
        (h, w)
    }

    pub fn pixel(&self, row: usize, col: usize) -> [f32; 4] {
        [
            self.data[[row, col, 0]],
            self.data[[row, col, 1]],
            self.data[[row, col, 2]],
            self.data[[row, col, 3]],
        ]
    }

    /// Copy one channel out as a plane.
    pub fn channel(&self, c: usize) -> Array2<f32> {
        self.data.slice(s![.., .., c]).to_owned()
    }

    pub fn from_rgba8(img: &RgbaImage) -> Self {
        let (w, h) = img.dimensions();
        let mut data = Array3::<f32>::zeros((h as usize, w as usize, RASTER_CHANNELS));
        for (col, row, px) in img.enumerate_pixels() {
            for c in 0..RASTER_CHANNELS {
                data[[row as usize, col as usize, c]] = px.0[c] as f32 / 255.0;
            }
        }
        Self { data }
    }

    pub fn from_dynamic(img: &DynamicImage) -> Self {
        Self::from_rgba8(&img.to_rgba8())
    }

    pub fn to_rgba8(&self) -> RgbaImage {
        let (h, w) = self.dim();
        RgbaImage::from_fn(w as u32, h as u32, |x, y| {
            let px = self.pixel(y as usize, x as usize);
            Rgba(px.map(to_u8))
        })
    }

    /// Fail with `InvalidDimensions` for a zero-sized raster.
    pub fn ensure_nonempty(&self) -> Result<()> {
        let (h, w) = self.dim();
        if h == 0 || w == 0 {
            return Err(VdiffError::InvalidDimensions {
                width: w as u32,
                height: h as u32,
            });
        }
        Ok(())
    }

    /// Fail with `SizeMismatch` unless `other` has exactly this raster's size.
    pub fn ensure_same_size(&self, other: &RasterImage) -> Result<()> {
        let (h, w) = self.dim();
        let (oh, ow) = other.dim();
        if h != oh || w != ow {
            return Err(VdiffError::SizeMismatch {
                expected_w: w,
                expected_h: h,
                actual_w: ow,
                actual_h: oh,
            });
        }
        Ok(())
    }

    /// BT.601 luminance of the color channels; alpha is ignored.
    pub fn luminance(&self) -> Array2<f32> {
        let (h, w) = self.dim();
        let mut data = Array2::<f32>::zeros((h, w));

        for row in 0..h {
            for col in 0..w {
                data[[row, col]] = LUMINANCE_R * self.data[[row, col, 0]]
                    + LUMINANCE_G * self.data[[row, col, 1]]
                    + LUMINANCE_B * self.data[[row, col, 2]];
            }
        }

        data
    }

    /// Same color data with alpha forced to fully opaque.
    pub fn with_opaque_alpha(&self) -> RasterImage {
        let mut out = self.clone();
        out.data.slice_mut(s![.., .., 3]).fill(1.0);
        out
    }

    /// Mean of every channel over the whole raster.
    pub fn mean_color(&self) -> [f32; 4] {
        let (h, w) = self.dim();
        let n = (h * w).max(1) as f64;
        let mut sums = [0.0f64; 4];
        for row in 0..h {
            for col in 0..w {
                for (c, sum) in sums.iter_mut().enumerate() {
                    *sum += self.data[[row, col, c]] as f64;
                }
            }
        }
        sums.map(|v| (v / n) as f32)
    }

    /// Resample to `width`x`height` with a triangle (bilinear) filter.
    pub fn resized(&self, width: usize, height: usize) -> RasterImage {
        let (h, w) = self.dim();
        if width == w && height == h {
            return self.clone();
        }

        let buf: ImageBuffer<Rgba<f32>, Vec<f32>> =
            ImageBuffer::from_fn(w as u32, h as u32, |x, y| {
                Rgba(self.pixel(y as usize, x as usize))
            });
        let resized = image::imageops::resize(&buf, width as u32, height as u32, FilterType::Triangle);

        let mut data = Array3::<f32>::zeros((height, width, RASTER_CHANNELS));
        for (x, y, px) in resized.enumerate_pixels() {
            for c in 0..RASTER_CHANNELS {
                data[[y as usize, x as usize, c]] = px.0[c].clamp(0.0, 1.0);
            }
        }
        RasterImage { data }
    }

    /// Horizontal concatenation; both rasters must share a height.
    pub fn hconcat(left: &RasterImage, right: &RasterImage) -> Result<RasterImage> {
        let (lh, lw) = left.dim();
        let (rh, rw) = right.dim();
        if lh != rh {
            return Err(VdiffError::SizeMismatch {
                expected_w: rw,
                expected_h: lh,
                actual_w: rw,
                actual_h: rh,
            });
        }

        let mut data = Array3::<f32>::zeros((lh, lw + rw, RASTER_CHANNELS));
        data.slice_mut(s![.., ..lw, ..]).assign(&left.data);
        data.slice_mut(s![.., lw.., ..]).assign(&right.data);
        Ok(RasterImage { data })
    }
}

/// A raster resized to its working size, with the mapping back to its
/// natural size.
#[derive(Clone, Debug)]
pub struct WorkingImage {
    pub raster: RasterImage,
    pub mapping: FrameMapping,
}

impl WorkingImage {
    /// Shrink `natural` so its longest side is at most `max_size`.
    pub fn prepare(natural: &RasterImage, max_size: u32) -> Result<Self> {
        natural.ensure_nonempty()?;
        let (h, w) = natural.dim();
        let mapping = FrameMapping::new(w, h, max_size);
        let (ww, wh) = mapping.working_size();
        Ok(Self {
            raster: natural.resized(ww, wh),
            mapping,
        })
    }

    pub fn width(&self) -> usize {
        self.raster.width()
    }

    pub fn height(&self) -> usize {
        self.raster.height()
    }
}

/// Quantize a [0,1] sample to 8 bits with rounding and saturation.
pub fn to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Quantize a [0,1] sample to its 8-bit level, as used by histogram bins.
pub fn to_level(v: f32) -> usize {
    to_u8(v) as usize
}
