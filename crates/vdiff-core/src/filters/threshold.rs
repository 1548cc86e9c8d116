use ndarray::Array2;

use crate::consts::OTSU_HISTOGRAM_BINS;
use crate::raster::to_level;

/// Otsu's thresholding over 8-bit levels: the level that maximizes the
/// between-class variance. A single-valued input yields level 0.
pub fn otsu_threshold(data: &Array2<f32>) -> u8 {
    let mut histogram = [0u64; OTSU_HISTOGRAM_BINS];
    data.iter().for_each(|&v| histogram[to_level(v)] += 1);

    let total = data.len() as f64;
    let level_sum: f64 = histogram
        .iter()
        .enumerate()
        .map(|(level, &n)| level as f64 * n as f64)
        .sum();

    let mut below = 0.0_f64;
    let mut below_sum = 0.0_f64;
    let mut best = (0usize, 0.0_f64);
    for (level, &n) in histogram.iter().enumerate() {
        below += n as f64;
        below_sum += level as f64 * n as f64;
        let above = total - below;
        if below == 0.0 {
            continue;
        }
        if above == 0.0 {
            break;
        }
        let spread = below_sum / below - (level_sum - below_sum) / above;
        let variance = below * above * spread * spread;
        if variance > best.1 {
            best = (level, variance);
        }
    }
    best.0 as u8
}

/// Pixels whose 8-bit level is strictly above `level`.
pub fn binarize(data: &Array2<f32>, level: u8) -> Array2<bool> {
    data.mapv(|v| to_level(v) > level as usize)
}

/// Binarize with the Otsu level of the data itself.
pub fn otsu_binarize(data: &Array2<f32>) -> Array2<bool> {
    binarize(data, otsu_threshold(data))
}

/// Fraction of set pixels; 0 for an empty mask.
pub fn white_rate(mask: &Array2<bool>) -> f64 {
    if mask.is_empty() {
        return 0.0;
    }
    mask.iter().filter(|&&v| v).count() as f64 / mask.len() as f64
}
