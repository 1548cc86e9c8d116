use ndarray::Array2;

use crate::consts::DESCRIPTOR_BORDER;

use crate::filters::build_rows;

/// One level of a scale pyramid.
#[derive(Clone, Debug)]
pub struct PyramidLevel {
    pub image: Array2<f32>,
    /// Factor from this level's coordinates back to level 0.
    pub scale: f32,
}

/// Build a pyramid where level `l` is level 0 shrunk by `scale_factor^l`.
///
/// Levels too small to hold a full descriptor patch are not generated, so
/// the result may be shorter than `levels` (and is empty for tiny inputs).
pub fn build_pyramid(data: &Array2<f32>, levels: usize, scale_factor: f32) -> Vec<PyramidLevel> {
    let min_side = 2 * DESCRIPTOR_BORDER + 1;
    let (h, w) = data.dim();
    let mut pyramid = Vec::with_capacity(levels);

    for level in 0..levels {
        let scale = scale_factor.powi(level as i32);
        let lh = (h as f32 / scale).round() as usize;
        let lw = (w as f32 / scale).round() as usize;
        if lh < min_side || lw < min_side {
            break;
        }
        let image = if level == 0 {
            data.clone()
        } else {
            resize_bilinear(data, lh, lw)
        };
        pyramid.push(PyramidLevel { image, scale });
    }

    pyramid
}

/// Resample a plane to `new_h`x`new_w` with bilinear interpolation on
/// pixel centers.
pub fn resize_bilinear(data: &Array2<f32>, new_h: usize, new_w: usize) -> Array2<f32> {
    let (h, w) = data.dim();
    let sy = h as f32 / new_h as f32;
    let sx = w as f32 / new_w as f32;

    build_rows(new_h, new_w, |row| {
        let y = ((row as f32 + 0.5) * sy - 0.5).clamp(0.0, (h - 1) as f32);
        let y0 = y.floor() as usize;
        let y1 = (y0 + 1).min(h - 1);
        let fy = y - y0 as f32;
        (0..new_w)
            .map(|col| {
                let x = ((col as f32 + 0.5) * sx - 0.5).clamp(0.0, (w - 1) as f32);
                let x0 = x.floor() as usize;
                let x1 = (x0 + 1).min(w - 1);
                let fx = x - x0 as f32;
                let top = data[[y0, x0]] * (1.0 - fx) + data[[y0, x1]] * fx;
                let bottom = data[[y1, x0]] * (1.0 - fx) + data[[y1, x1]] * fx;
                top * (1.0 - fy) + bottom * fy
            })
            .collect()
    })
}
