use ndarray::Array2;

use crate::filters::build_rows;

/// Bresenham circle of radius 3, clockwise from 12 o'clock, as (dx, dy).
const CIRCLE: [(isize, isize); 16] = [
    (0, -3),
    (1, -3),
    (2, -2),
    (3, -1),
    (3, 0),
    (3, 1),
    (2, 2),
    (1, 3),
    (0, 3),
    (-1, 3),
    (-2, 2),
    (-3, 1),
    (-3, 0),
    (-3, -1),
    (-2, -2),
    (-1, -3),
];

/// Contiguous circle pixels needed for a corner.
const ARC_LENGTH: usize = 9;

/// A FAST corner in the coordinates of the image it was found in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Corner {
    pub x: usize,
    pub y: usize,
    pub score: f32,
}

/// FAST-9 corners farther than `border` from every edge, after 3x3
/// non-maximum suppression on the corner score.
pub fn detect_fast(data: &Array2<f32>, threshold: f32, border: usize) -> Vec<Corner> {
    let (h, w) = data.dim();
    let border = border.max(3);
    if h <= 2 * border || w <= 2 * border {
        return Vec::new();
    }

    let scores = build_rows(h, w, |row| {
        (0..w)
            .map(|col| {
                if row < border || row >= h - border || col < border || col >= w - border {
                    0.0
                } else {
                    corner_score(data, row, col, threshold)
                }
            })
            .collect()
    });

    let mut corners = Vec::new();
    for row in border..h - border {
        for col in border..w - border {
            let s = scores[[row, col]];
            if s > 0.0 && is_local_max(&scores, row, col) {
                corners.push(Corner {
                    x: col,
                    y: row,
                    score: s,
                });
            }
        }
    }
    corners
}

/// Sum of `|p - center| - threshold` over the circle when the pixel is a
/// FAST-9 corner, otherwise 0.
fn corner_score(data: &Array2<f32>, row: usize, col: usize, threshold: f32) -> f32 {
    let center = data[[row, col]];
    let mut classes = [0i8; 16];
    let mut score = 0.0f32;

    for (i, &(dx, dy)) in CIRCLE.iter().enumerate() {
        let p = data[[(row as isize + dy) as usize, (col as isize + dx) as usize]];
        let diff = p - center;
        if diff > threshold {
            classes[i] = 1;
        } else if diff < -threshold {
            classes[i] = -1;
        }
        score += (diff.abs() - threshold).max(0.0);
    }

    if has_arc(&classes, 1) || has_arc(&classes, -1) {
        score
    } else {
        0.0
    }
}

fn has_arc(classes: &[i8; 16], class: i8) -> bool {
    let mut run = 0usize;
    for i in 0..(16 + ARC_LENGTH - 1) {
        if classes[i % 16] == class {
            run += 1;
            if run >= ARC_LENGTH {
                return true;
            }
        } else {
            run = 0;
        }
    }
    false
}

/// Strict maximum over the 3x3 neighborhood; ties go to the pixel that
/// comes first in raster order.
fn is_local_max(scores: &Array2<f32>, row: usize, col: usize) -> bool {
    let s = scores[[row, col]];
    for dr in -1..=1_isize {
        for dc in -1..=1_isize {
            if dr == 0 && dc == 0 {
                continue;
            }
            let n = scores[[(row as isize + dr) as usize, (col as isize + dc) as usize]];
            let earlier = dr < 0 || (dr == 0 && dc < 0);
            if n > s || (n == s && earlier) {
                return false;
            }
        }
    }
    true
}
