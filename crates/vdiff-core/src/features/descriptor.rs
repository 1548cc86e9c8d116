use ndarray::Array2;

use crate::consts::{DESCRIPTOR_BITS, PATCH_RADIUS};

/// A 256-bit binary descriptor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Descriptor(pub [u64; 4]);

impl Descriptor {
    #[inline]
    pub fn hamming(&self, other: &Descriptor) -> u32 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a ^ b).count_ones())
            .sum()
    }
}

/// Point pairs compared by the descriptor, as offsets from the keypoint.
pub(crate) type SamplingPattern = Vec<[(f32, f32); 2]>;

/// Fixed pseudo-random test pairs drawn inside the patch.
pub(crate) fn sampling_pattern() -> SamplingPattern {
    let r = PATCH_RADIUS as i64;
    let span = (2 * r + 1) as u64;
    let mut state: u64 = 0x0DDB_A11C_0FFE_E123;
    let mut next = || {
        state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        ((state >> 33) % span) as i64 - r
    };

    (0..DESCRIPTOR_BITS)
        .map(|_| {
            let a = (next() as f32, next() as f32);
            let b = (next() as f32, next() as f32);
            [a, b]
        })
        .collect()
}

/// Orientation by intensity centroid over a disc of `PATCH_RADIUS`.
pub(crate) fn intensity_centroid_angle(data: &Array2<f32>, x: usize, y: usize) -> f32 {
    let r = PATCH_RADIUS as isize;
    let r2 = r * r;
    let mut m01 = 0.0f32;
    let mut m10 = 0.0f32;

    for dy in -r..=r {
        for dx in -r..=r {
            if dx * dx + dy * dy > r2 {
                continue;
            }
            let v = data[[(y as isize + dy) as usize, (x as isize + dx) as usize]];
            m10 += dx as f32 * v;
            m01 += dy as f32 * v;
        }
    }

    m01.atan2(m10)
}

/// Rotated BRIEF: bit `i` is set when the first point of pair `i` is darker
/// than the second, after rotating the pattern by `angle`.
///
/// The caller guarantees `(x, y)` is at least `DESCRIPTOR_BORDER` from the
/// edges, which keeps every rotated sample in bounds.
pub(crate) fn describe(
    smoothed: &Array2<f32>,
    x: usize,
    y: usize,
    angle: f32,
    pattern: &SamplingPattern,
) -> Descriptor {
    let (sin, cos) = angle.sin_cos();
    let sample = |(px, py): (f32, f32)| -> f32 {
        let rx = (cos * px - sin * py).round() as isize;
        let ry = (sin * px + cos * py).round() as isize;
        smoothed[[(y as isize + ry) as usize, (x as isize + rx) as usize]]
    };

    let mut bits = [0u64; 4];
    for (i, &[a, b]) in pattern.iter().enumerate() {
        if sample(a) < sample(b) {
            bits[i / 64] |= 1 << (i % 64);
        }
    }
    Descriptor(bits)
}
