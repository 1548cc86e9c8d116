//! Coordinate frames.
//!
//! Every image lives in three frames: its natural (full) size, the working
//! size it is resized to before processing (bounded by a maximum side), and
//! the display size it is finally shown at (bounded by an optional maximum
//! width or height). Points and rectangles carry their frame in their type.

use std::fmt::Debug;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

use crate::geometry::PixelRect;

/// A coordinate frame. `scale` is the per-axis factor from full-size
/// coordinates into this frame.
pub trait Space: Copy + Debug + Default + PartialEq + 'static {
    const NAME: &'static str;
    fn scale(mapping: &FrameMapping) -> (f64, f64);
}

/// Natural image coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FullSpace;

/// Coordinates of the size-limited working raster.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorkingSpace;

/// On-screen coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DisplaySpace;

impl Space for FullSpace {
    const NAME: &'static str = "full";
    fn scale(_mapping: &FrameMapping) -> (f64, f64) {
        (1.0, 1.0)
    }
}

impl Space for WorkingSpace {
    const NAME: &'static str = "working";
    fn scale(mapping: &FrameMapping) -> (f64, f64) {
        mapping.working_scale()
    }
}

impl Space for DisplaySpace {
    const NAME: &'static str = "display";
    fn scale(mapping: &FrameMapping) -> (f64, f64) {
        let (sx, sy) = mapping.working_scale();
        (sx * mapping.display_ratio, sy * mapping.display_ratio)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point<S: Space> {
    pub x: f64,
    pub y: f64,
    space: PhantomData<S>,
}

impl<S: Space> Point<S> {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            space: PhantomData,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn to_tuple(self) -> (f64, f64) {
        (self.x, self.y)
    }
}

impl<S: Space> From<(f64, f64)> for Point<S> {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect<S: Space> {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    space: PhantomData<S>,
}

impl<S: Space> Rect<S> {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            space: PhantomData,
        }
    }

    pub fn from_pixel_rect(r: PixelRect) -> Self {
        Self::new(r.x, r.y, r.width, r.height)
    }

    pub fn as_pixel_rect(&self) -> PixelRect {
        PixelRect::new(self.x, self.y, self.width, self.height)
    }

    /// Corners clockwise from `(x, y)`.
    pub fn corners(&self) -> [Point<S>; 4] {
        self.as_pixel_rect().corners().map(Point::from)
    }
}

/// Ratio that brings the longest side of `natural_w`x`natural_h` down to
/// `max_size`. Never enlarges.
pub fn working_ratio(natural_w: usize, natural_h: usize, max_size: u32) -> f64 {
    let longest = natural_w.max(natural_h) as f64;
    let max_size = max_size as f64;
    if longest > max_size && longest > 0.0 {
        max_size / longest
    } else {
        1.0
    }
}

/// Size of `natural` after scaling by `ratio`, at least one pixel per side.
pub fn scaled_size(natural_w: usize, natural_h: usize, ratio: f64) -> (usize, usize) {
    let w = (natural_w as f64 * ratio).round().max(1.0) as usize;
    let h = (natural_h as f64 * ratio).round().max(1.0) as usize;
    (w, h)
}

/// Optional on-screen bounds. `max_width` takes precedence over
/// `max_height`; neither ever enlarges.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayLimit {
    pub max_width: Option<f64>,
    pub max_height: Option<f64>,
}

impl DisplayLimit {
    /// Ratio from working size to display size.
    pub fn ratio(&self, working_w: f64, working_h: f64) -> f64 {
        if let Some(max_w) = self.max_width.filter(|v| v.is_finite() && *v > 0.0) {
            if working_w > 0.0 {
                return (max_w / working_w).min(1.0);
            }
        } else if let Some(max_h) = self.max_height.filter(|v| v.is_finite() && *v > 0.0) {
            if working_h > 0.0 {
                return (max_h / working_h).min(1.0);
            }
        }
        1.0
    }
}

/// Full → working → display mapping of one image.
///
/// The working raster is a whole number of pixels, so full ↔ working
/// conversions use the per-axis ratio of the rounded working size to the
/// natural size rather than the nominal `working_ratio`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameMapping {
    natural_w: usize,
    natural_h: usize,
    working_w: usize,
    working_h: usize,
    working_ratio: f64,
    display_ratio: f64,
}

impl FrameMapping {
    pub fn new(natural_w: usize, natural_h: usize, max_size: u32) -> Self {
        let ratio = working_ratio(natural_w, natural_h, max_size);
        let (working_w, working_h) = scaled_size(natural_w, natural_h, ratio);
        Self {
            natural_w,
            natural_h,
            working_w,
            working_h,
            working_ratio: ratio,
            display_ratio: 1.0,
        }
    }

    /// Identity mapping for an image processed at natural size.
    pub fn identity(natural_w: usize, natural_h: usize) -> Self {
        Self {
            natural_w,
            natural_h,
            working_w: natural_w,
            working_h: natural_h,
            working_ratio: 1.0,
            display_ratio: 1.0,
        }
    }

    pub fn with_display_limit(mut self, limit: &DisplayLimit) -> Self {
        let (ww, wh) = self.working_size_f64();
        self.display_ratio = limit.ratio(ww, wh);
        self
    }

    /// Nominal full → working ratio the working size was derived from.
    pub fn working_ratio(&self) -> f64 {
        self.working_ratio
    }

    /// Exact full → working factors `(working_w / natural_w, working_h / natural_h)`.
    pub fn working_scale(&self) -> (f64, f64) {
        let axis = |working: usize, natural: usize| {
            if natural == 0 {
                self.working_ratio
            } else {
                working as f64 / natural as f64
            }
        };
        (
            axis(self.working_w, self.natural_w),
            axis(self.working_h, self.natural_h),
        )
    }

    pub fn display_ratio(&self) -> f64 {
        self.display_ratio
    }

    pub fn natural_size(&self) -> (usize, usize) {
        (self.natural_w, self.natural_h)
    }

    /// Pixel size of the working raster.
    pub fn working_size(&self) -> (usize, usize) {
        (self.working_w, self.working_h)
    }

    fn working_size_f64(&self) -> (f64, f64) {
        (self.working_w as f64, self.working_h as f64)
    }

    pub fn display_size(&self) -> (f64, f64) {
        let (ww, wh) = self.working_size_f64();
        (ww * self.display_ratio, wh * self.display_ratio)
    }

    /// Display size of a side-by-side composite built on this image.
    pub fn side_by_side_display_size(&self) -> (f64, f64) {
        let (dw, dh) = self.display_size();
        (dw * 2.0, dh)
    }

    pub fn convert_point<A: Space, B: Space>(&self, p: Point<A>) -> Point<B> {
        let (kx, ky) = self.factors::<A, B>();
        Point::new(p.x * kx, p.y * ky)
    }

    pub fn convert_rect<A: Space, B: Space>(&self, r: &Rect<A>) -> Rect<B> {
        let (kx, ky) = self.factors::<A, B>();
        Rect::new(r.x * kx, r.y * ky, r.width * kx, r.height * ky)
    }

    fn factors<A: Space, B: Space>(&self) -> (f64, f64) {
        let ((fx, fy), (tx, ty)) = (A::scale(self), B::scale(self));
        (tx / fx, ty / fy)
    }

    pub fn to_working(&self, p: Point<FullSpace>) -> Point<WorkingSpace> {
        self.convert_point(p)
    }

    pub fn to_full(&self, p: Point<WorkingSpace>) -> Point<FullSpace> {
        self.convert_point(p)
    }

    pub fn to_display(&self, p: Point<WorkingSpace>) -> Point<DisplaySpace> {
        self.convert_point(p)
    }

    pub fn from_display(&self, p: Point<DisplaySpace>) -> Point<WorkingSpace> {
        self.convert_point(p)
    }
}
