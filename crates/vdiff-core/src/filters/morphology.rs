use ndarray::Array2;

use super::build_rows;

/// Shape of a 3x3 structuring element.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StructuringElement {
    /// Full 3x3 square.
    Square,
    /// The 3x3 ellipse, which is a plus-shaped cross.
    #[default]
    Ellipse,
}

const SQUARE: [(isize, isize); 9] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 0),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

const CROSS: [(isize, isize); 5] = [(-1, 0), (0, -1), (0, 0), (0, 1), (1, 0)];

impl StructuringElement {
    fn offsets(&self) -> &'static [(isize, isize)] {
        match self {
            Self::Square => &SQUARE,
            Self::Ellipse => &CROSS,
        }
    }
}

/// Binary erosion: a pixel stays set only if every in-bounds neighbor under
/// the element is set. Out-of-bounds neighbors never erode.
pub fn erode(mask: &Array2<bool>, element: StructuringElement) -> Array2<bool> {
    let (h, w) = mask.dim();
    let offsets = element.offsets();
    build_rows(h, w, |row| {
        (0..w)
            .map(|col| {
                mask[[row, col]]
                    && offsets.iter().all(|&(dr, dc)| {
                        neighbor(h, w, row, col, dr, dc).map_or(true, |(r, c)| mask[[r, c]])
                    })
            })
            .collect()
    })
}

/// Binary dilation: a pixel becomes set if any in-bounds neighbor under the
/// element is set.
pub fn dilate(mask: &Array2<bool>, element: StructuringElement) -> Array2<bool> {
    let (h, w) = mask.dim();
    let offsets = element.offsets();
    build_rows(h, w, |row| {
        (0..w)
            .map(|col| {
                offsets.iter().any(|&(dr, dc)| {
                    neighbor(h, w, row, col, dr, dc).is_some_and(|(r, c)| mask[[r, c]])
                })
            })
            .collect()
    })
}

/// Repeated dilation.
pub fn dilate_n(mask: &Array2<bool>, element: StructuringElement, iterations: usize) -> Array2<bool> {
    let mut current = mask.clone();
    for _ in 0..iterations {
        current = dilate(&current, element);
    }
    current
}

/// Morphological opening (erosion followed by dilation).
///
/// Removes foreground specks smaller than the element while preserving
/// larger regions.
pub fn morphological_opening(mask: &Array2<bool>, element: StructuringElement) -> Array2<bool> {
    let eroded = erode(mask, element);
    dilate(&eroded, element)
}

#[inline]
fn neighbor(
    h: usize,
    w: usize,
    row: usize,
    col: usize,
    dr: isize,
    dc: isize,
) -> Option<(usize, usize)> {
    let r = row as isize + dr;
    let c = col as isize + dc;
    if r < 0 || r >= h as isize || c < 0 || c >= w as isize {
        None
    } else {
        Some((r as usize, c as usize))
    }
}
