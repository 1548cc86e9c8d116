pub mod gaussian_blur;
pub mod median;
pub mod morphology;
pub mod threshold;
pub mod unsharp_mask;

use ndarray::Array2;
use rayon::prelude::*;

use crate::consts::PARALLEL_PIXEL_THRESHOLD;

/// Build an `h`x`w` array one row at a time.
///
/// Rows are computed in parallel once the image reaches
/// `PARALLEL_PIXEL_THRESHOLD` pixels; smaller images run sequentially.
pub(crate) fn build_rows<T, F>(h: usize, w: usize, row_fn: F) -> Array2<T>
where
    T: Clone + Default + Send,
    F: Fn(usize) -> Vec<T> + Send + Sync,
{
    let rows: Vec<Vec<T>> = if h * w >= PARALLEL_PIXEL_THRESHOLD {
        (0..h).into_par_iter().map(&row_fn).collect()
    } else {
        (0..h).map(&row_fn).collect()
    };

    let mut result = Array2::<T>::default((h, w));
    for (row, row_data) in rows.into_iter().enumerate() {
        for (col, val) in row_data.into_iter().enumerate() {
            result[[row, col]] = val;
        }
    }
    result
}
