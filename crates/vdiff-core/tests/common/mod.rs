#![allow(dead_code)]

use vdiff_core::raster::RasterImage;

pub const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
pub const BLACK: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

/// A `w`x`h` raster of a single color.
pub fn solid(w: usize, h: usize, rgba: [f32; 4]) -> RasterImage {
    RasterImage::filled(w, h, rgba)
}

/// White page with a black square `[x, x+size) x [y, y+size)`.
pub fn page_with_square(w: usize, h: usize, x: usize, y: usize, size: usize) -> RasterImage {
    RasterImage::from_fn(w, h, |row, col| {
        if (x..x + size).contains(&col) && (y..y + size).contains(&row) {
            BLACK
        } else {
            WHITE
        }
    })
}

/// Deterministic black/white cells of `cell` pixels, defined for every
/// integer position so shifted copies agree exactly.
pub fn cell_pattern_value(x: i64, y: i64, cell: i64) -> f32 {
    let cx = x.div_euclid(cell) as u64;
    let cy = y.div_euclid(cell) as u64;
    let mut h = cx
        .wrapping_mul(0x9E37_79B9_7F4A_7C15)
        .wrapping_add(cy.wrapping_mul(0xC2B2_AE3D_27D4_EB4F));
    h ^= h >> 29;
    h = h.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    h ^= h >> 32;
    if h & 1 == 0 {
        0.0
    } else {
        1.0
    }
}

/// Cell pattern viewed through a window offset by `(dx, dy)`: pixel
/// `(col, row)` shows pattern position `(col - dx, row - dy)`.
pub fn shifted_pattern(w: usize, h: usize, dx: i64, dy: i64) -> RasterImage {
    RasterImage::from_fn(w, h, |row, col| {
        let v = cell_pattern_value(col as i64 - dx, row as i64 - dy, 7);
        [v, v, v, 1.0]
    })
}

/// Largest absolute per-sample difference.
pub fn max_abs_diff(a: &RasterImage, b: &RasterImage) -> f32 {
    a.data
        .iter()
        .zip(b.data.iter())
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f32::max)
}

/// True when every sample lies within `tol` of `value` in channel `c`.
pub fn channel_is_uniform(img: &RasterImage, c: usize, value: f32, tol: f32) -> bool {
    img.channel(c).iter().all(|v| (v - value).abs() <= tol)
}
