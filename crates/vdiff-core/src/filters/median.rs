use ndarray::Array2;

use super::build_rows;

/// 3x3 median filter. Borders replicate the edge pixel.
pub fn median3(data: &Array2<f32>) -> Array2<f32> {
    let (h, w) = data.dim();
    build_rows(h, w, |row| {
        let mut window = [0.0f32; 9];
        (0..w)
            .map(|col| {
                fill_window(&mut window, h, w, row, col, |r, c| data[[r, c]]);
                compute_median(&mut window)
            })
            .collect()
    })
}

/// 3x3 median of a binary mask: a pixel is set when at least five of its
/// nine (edge-replicated) neighbors are set.
pub fn median3_mask(mask: &Array2<bool>) -> Array2<bool> {
    let (h, w) = mask.dim();
    build_rows(h, w, |row| {
        let mut window = [false; 9];
        (0..w)
            .map(|col| {
                fill_window(&mut window, h, w, row, col, |r, c| mask[[r, c]]);
                window.iter().filter(|&&v| v).count() >= 5
            })
            .collect()
    })
}

fn fill_window<T: Copy>(
    window: &mut [T; 9],
    h: usize,
    w: usize,
    row: usize,
    col: usize,
    get: impl Fn(usize, usize) -> T,
) {
    let mut i = 0;
    for dr in -1..=1_isize {
        let r = (row as isize + dr).clamp(0, h as isize - 1) as usize;
        for dc in -1..=1_isize {
            let c = (col as isize + dc).clamp(0, w as isize - 1) as usize;
            window[i] = get(r, c);
            i += 1;
        }
    }
}

fn compute_median(values: &mut [f32; 9]) -> f32 {
    let (_, median, _) = values.select_nth_unstable_by(4, |a, b| a.total_cmp(b));
    *median
}
