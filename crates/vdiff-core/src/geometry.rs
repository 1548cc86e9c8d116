//! Region-of-interest rectangles.
//!
//! A region is written as a Media Fragments `xywh` value (`pixel:` or
//! `percent:` with integer components, unit defaults to pixel) or as an
//! IIIF region (`pct:` with fractional components between 0 and 100).
//! Anything that does not parse is the full extent.

use serde::{Deserialize, Serialize};

/// Unit of a fragment rectangle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    #[default]
    Pixel,
    Percent,
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pixel => write!(f, "pixel"),
            Self::Percent => write!(f, "percent"),
        }
    }
}

/// A rectangle as written in a fragment, before it is evaluated against an
/// extent. Percent rectangles are relative to whatever extent they meet.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FragmentRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub unit: Unit,
}

impl Default for FragmentRect {
    fn default() -> Self {
        Self::full_extent()
    }
}

impl FragmentRect {
    /// `{0, 0, 100, 100}` percent.
    pub fn full_extent() -> Self {
        Self::percent(0.0, 0.0, 100.0, 100.0)
    }

    pub fn pixel(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            unit: Unit::Pixel,
        }
    }

    pub fn percent(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            unit: Unit::Percent,
        }
    }

    /// Serialize back to fragment syntax.
    ///
    /// Integral rectangles use Media Fragments syntax; a percent rectangle
    /// with a fractional component uses the IIIF `pct:` form. Fractional
    /// pixel values are rounded since pixel fragments carry integers only.
    pub fn to_fragment(&self) -> String {
        let parts = [self.x, self.y, self.width, self.height];
        match self.unit {
            Unit::Pixel => {
                let [x, y, w, h] = parts.map(|v| v.max(0.0).round() as u64);
                format!("pixel:{x},{y},{w},{h}")
            }
            Unit::Percent if parts.iter().all(|v| v.fract() == 0.0) => {
                let [x, y, w, h] = parts.map(|v| v.max(0.0) as u64);
                format!("percent:{x},{y},{w},{h}")
            }
            Unit::Percent => {
                let [x, y, w, h] = parts.map(|v| v.clamp(0.0, 100.0));
                format!("pct:{x},{y},{w},{h}")
            }
        }
    }
}

/// Parse a region fragment. Never fails: malformed input yields
/// [`FragmentRect::full_extent`].
pub fn parse_fragment_rect(fragment: &str) -> FragmentRect {
    let body = fragment.strip_prefix("xywh=").unwrap_or(fragment);

    if let Some(rest) = body.strip_prefix("pct:") {
        if let Some([x, y, w, h]) = split_components(rest, leading_pct_component) {
            return FragmentRect::percent(x, y, w, h);
        }
        return FragmentRect::full_extent();
    }

    let (unit, rest) = if let Some(rest) = body.strip_prefix("percent:") {
        (Unit::Percent, rest)
    } else if let Some(rest) = body.strip_prefix("pixel:") {
        (Unit::Pixel, rest)
    } else {
        (Unit::Pixel, body)
    };

    match split_components(rest, leading_integer_component) {
        Some([x, y, w, h]) => FragmentRect {
            x,
            y,
            width: w,
            height: h,
            unit,
        },
        None => FragmentRect::full_extent(),
    }
}

/// Four comma-separated components. The first three must be whole
/// components; the fourth is read from the start of the remaining text and
/// anything after it is ignored (`10,20,30,40&t=5` is `10,20,30,40`).
fn split_components(s: &str, leading: fn(&str) -> Option<(f64, usize)>) -> Option<[f64; 4]> {
    let mut out = [0.0; 4];
    let mut parts = s.splitn(4, ',');
    for slot in out.iter_mut().take(3) {
        let part = parts.next()?;
        let (value, used) = leading(part)?;
        if used != part.len() {
            return None;
        }
        *slot = value;
    }
    out[3] = leading(parts.next()?)?.0;
    Some(out)
}

/// Leading run of ASCII digits, with the number of bytes it spans.
fn leading_integer_component(s: &str) -> Option<(f64, usize)> {
    let len = s.bytes().take_while(u8::is_ascii_digit).count();
    if len == 0 {
        return None;
    }
    Some((s[..len].parse::<f64>().ok()?, len))
}

/// Leading `100`, or a one- or two-digit number without a leading zero,
/// optionally followed by a fractional part.
fn leading_pct_component(s: &str) -> Option<(f64, usize)> {
    if s.starts_with("100") {
        return Some((100.0, 3));
    }
    let b = s.as_bytes();
    let mut len = match b {
        [b'1'..=b'9', d, ..] if d.is_ascii_digit() => 2,
        [d, ..] if d.is_ascii_digit() => 1,
        _ => return None,
    };
    if b.get(len) == Some(&b'.') {
        let frac = b[len + 1..].iter().take_while(|c| c.is_ascii_digit()).count();
        if frac > 0 {
            len += 1 + frac;
        }
    }
    Some((s[..len].parse::<f64>().ok()?, len))
}

/// A rectangle in pixels of some concrete extent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PixelRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn full(extent_w: f64, extent_h: f64) -> Self {
        Self::new(0.0, 0.0, extent_w, extent_h)
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// The "nothing usable" result of an intersection: zero area at (0,0).
    pub fn is_empty_at_origin(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.area() == 0.0
    }

    /// The four corners, clockwise from the origin corner.
    pub fn corners(&self) -> [(f64, f64); 4] {
        let (x0, y0) = (self.x, self.y);
        let (x1, y1) = (self.x + self.width, self.y + self.height);
        [(x0, y0), (x1, y0), (x1, y1), (x0, y1)]
    }

    /// Integer pixel bounds `(col0, row0, col1, row1)`, end-exclusive.
    ///
    /// The origin is floored and the extent truncated, then everything is
    /// clamped to `extent_w`x`extent_h`.
    pub fn snapped(&self, extent_w: usize, extent_h: usize) -> (usize, usize, usize, usize) {
        let col0 = (self.x.floor().max(0.0) as usize).min(extent_w);
        let row0 = (self.y.floor().max(0.0) as usize).min(extent_h);
        let col1 = (col0 + self.width.max(0.0).trunc() as usize).min(extent_w);
        let row1 = (row0 + self.height.max(0.0).trunc() as usize).min(extent_h);
        (col0, row0, col1, row1)
    }

    pub fn to_fragment_rect(&self) -> FragmentRect {
        FragmentRect::pixel(self.x, self.y, self.width, self.height)
    }
}

impl From<PixelRect> for FragmentRect {
    fn from(r: PixelRect) -> Self {
        r.to_fragment_rect()
    }
}

/// Clamp `rect` to an extent and convert it to pixels.
///
/// Pixel rectangles are clamped to `[0,extent_w]x[0,extent_h]`; percent
/// rectangles to `[0,100]x[0,100]` and then scaled to the extent. Inverted
/// bounds are swapped.
pub fn intersect_rect(extent_w: f64, extent_h: f64, rect: &FragmentRect) -> PixelRect {
    let (limit_w, limit_h) = match rect.unit {
        Unit::Percent => (100.0, 100.0),
        Unit::Pixel => (extent_w, extent_h),
    };

    let mut xmin = rect.x.max(0.0).min(limit_w);
    let mut xmax = (rect.x + rect.width).min(limit_w).max(0.0);
    let mut ymin = rect.y.max(0.0).min(limit_h);
    let mut ymax = (rect.y + rect.height).min(limit_h).max(0.0);
    if xmin > xmax {
        std::mem::swap(&mut xmin, &mut xmax);
    }
    if ymin > ymax {
        std::mem::swap(&mut ymin, &mut ymax);
    }

    match rect.unit {
        Unit::Percent => PixelRect::new(
            xmin / 100.0 * extent_w,
            ymin / 100.0 * extent_h,
            (xmax - xmin) / 100.0 * extent_w,
            (ymax - ymin) / 100.0 * extent_h,
        ),
        Unit::Pixel => PixelRect::new(xmin, ymin, xmax - xmin, ymax - ymin),
    }
}

/// [`intersect_rect`], with a zero-area result at the origin replaced by
/// the full extent.
pub fn intersect_or_full(extent_w: f64, extent_h: f64, rect: &FragmentRect) -> PixelRect {
    let r = intersect_rect(extent_w, extent_h, rect);
    if r.is_empty_at_origin() {
        PixelRect::full(extent_w, extent_h)
    } else {
        r
    }
}

/// Rescale a pixel rectangle by `to_scale / from_scale`. Percent rectangles
/// are returned unchanged.
pub fn scale_rect(rect: &FragmentRect, from_scale: f64, to_scale: f64) -> FragmentRect {
    match rect.unit {
        Unit::Percent => *rect,
        Unit::Pixel => {
            let k = to_scale / from_scale;
            FragmentRect::pixel(rect.x * k, rect.y * k, rect.width * k, rect.height * k)
        }
    }
}

/// Axis-aligned bounding rectangle of a set of points; `None` when empty.
pub fn bounding_rect(points: impl IntoIterator<Item = (f64, f64)>) -> Option<PixelRect> {
    let mut iter = points.into_iter();
    let (fx, fy) = iter.next()?;
    let (mut x0, mut y0, mut x1, mut y1) = (fx, fy, fx, fy);
    for (x, y) in iter {
        x0 = x0.min(x);
        y0 = y0.min(y);
        x1 = x1.max(x);
        y1 = y1.max(y);
    }
    Some(PixelRect::new(x0, y0, x1 - x0, y1 - y0))
}
