//! Comparison-scale estimation: which color marks which image.

use ndarray::Array2;

use crate::consts::{MONOCHROME_SATURATION_LIMIT, WHITE_RATE_THRESHOLD};
use crate::filters::threshold::white_rate;
use crate::raster::{to_u8, RasterImage};

/// HSV saturation (0-255) of an image's single representative pixel, its
/// mean color.
pub fn representative_saturation(img: &RasterImage) -> u8 {
    let [r, g, b, _] = img.mean_color().map(to_u8);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    if max == 0 {
        return 0;
    }
    ((max - min) as f32 * 255.0 / max as f32).round() as u8
}

/// Color of the correspondence markers drawn over an image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkerColor {
    Blue,
    White,
}

impl MarkerColor {
    pub fn hex(&self) -> &'static str {
        match self {
            Self::Blue => "#3388ff",
            Self::White => "#ffffff",
        }
    }
}

impl std::fmt::Display for MarkerColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.hex())
    }
}

/// Blue over (near-)monochrome images, white over colorful ones.
pub fn marker_color(img: &RasterImage) -> MarkerColor {
    if representative_saturation(img) < MONOCHROME_SATURATION_LIMIT {
        MarkerColor::Blue
    } else {
        MarkerColor::White
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LegendColor {
    Blue,
    Red,
    Gray,
}

impl std::fmt::Display for LegendColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blue => write!(f, "blue"),
            Self::Red => write!(f, "red"),
            Self::Gray => write!(f, "gray"),
        }
    }
}

/// Which highlight color denotes content of each image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Legend {
    pub first: LegendColor,
    pub second: LegendColor,
    pub first_on_right: bool,
}

impl Legend {
    pub fn gray(first_on_right: bool) -> Self {
        Self {
            first: LegendColor::Gray,
            second: LegendColor::Gray,
            first_on_right,
        }
    }

    pub fn left(&self) -> LegendColor {
        if self.first_on_right {
            self.second
        } else {
            self.first
        }
    }

    pub fn right(&self) -> LegendColor {
        if self.first_on_right {
            self.first
        } else {
            self.second
        }
    }
}

/// Classify from the binarized inputs.
///
/// Mostly-white inputs (dark content on a light background) mark image 1
/// content blue and image 2 content red; mostly-dark inputs invert this.
/// Disagreeing inputs, or no differences at all, leave both markers gray.
pub fn classify_legend(
    binary_first: &Array2<bool>,
    binary_second: &Array2<bool>,
    has_differences: bool,
    first_on_right: bool,
) -> Legend {
    if !has_differences {
        return Legend::gray(first_on_right);
    }
    let light_first = white_rate(binary_first) >= WHITE_RATE_THRESHOLD;
    let light_second = white_rate(binary_second) >= WHITE_RATE_THRESHOLD;

    let (first, second) = match (light_first, light_second) {
        (true, true) => (LegendColor::Blue, LegendColor::Red),
        (false, false) => (LegendColor::Red, LegendColor::Blue),
        _ => (LegendColor::Gray, LegendColor::Gray),
    };
    Legend {
        first,
        second,
        first_on_right,
    }
}
