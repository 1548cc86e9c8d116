//! Planar projective transforms.
//!
//! A [`Homography`] maps source pixel coordinates to destination pixel
//! coordinates. Fits use the direct linear transform on Hartley-normalized
//! points: the solution is the right singular vector of the stacked
//! constraint matrix with the smallest singular value, exact for four pairs
//! and least squares beyond. [`find_homography_ransac`] rejects outlying
//! pairs before the final refit.

use nalgebra::{DMatrix, Matrix3, Vector3};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::consts::{
    DEFAULT_RANSAC_CONFIDENCE, DEFAULT_RANSAC_MAX_ITERS, DEFAULT_RANSAC_THRESHOLD, EPSILON,
    MIN_CORRESPONDENCES,
};

/// Fixed seed so repeated runs on the same input pick the same samples.
const RANSAC_SEED: u64 = 0x5EED;

/// Relative size below which a singular value counts as zero.
const RANK_TOLERANCE: f64 = 1e-9;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Homography {
    /// Acts on column vectors `(x, y, 1)`.
    pub m: Matrix3<f64>,
}

impl Default for Homography {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<Matrix3<f64>> for Homography {
    fn from(m: Matrix3<f64>) -> Self {
        Self { m }
    }
}

impl Homography {
    pub fn identity() -> Self {
        Self {
            m: Matrix3::identity(),
        }
    }

    /// Build from row-major coefficients.
    pub fn from_rows(r: [[f64; 3]; 3]) -> Self {
        Self {
            m: Matrix3::new(
                r[0][0], r[0][1], r[0][2], r[1][0], r[1][1], r[1][2], r[2][0], r[2][1], r[2][2],
            ),
        }
    }

    pub fn translation(dx: f64, dy: f64) -> Self {
        Self::from_rows([[1.0, 0.0, dx], [0.0, 1.0, dy], [0.0, 0.0, 1.0]])
    }

    pub fn scaling(sx: f64, sy: f64) -> Self {
        Self::from_rows([[sx, 0.0, 0.0], [0.0, sy, 0.0], [0.0, 0.0, 1.0]])
    }

    /// Map a point. `None` when it lands on the line at infinity.
    #[inline]
    pub fn apply(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let p = self.m * Vector3::new(x, y, 1.0);
        if p.z.abs() < EPSILON {
            return None;
        }
        Some((p.x / p.z, p.y / p.z))
    }

    /// `self * other`: apply `other` first, then `self`.
    pub fn compose(&self, other: &Homography) -> Homography {
        Homography {
            m: self.m * other.m,
        }
    }

    pub fn determinant(&self) -> f64 {
        self.m.determinant()
    }

    /// `None` for a singular matrix.
    pub fn inverse(&self) -> Option<Homography> {
        let det = self.determinant();
        if det.abs() < EPSILON || !det.is_finite() {
            return None;
        }
        self.m
            .try_inverse()
            .map(|m| Homography { m }.normalized())
    }

    /// Scale so the bottom-right coefficient is 1 (when it is non-zero).
    pub fn normalized(&self) -> Homography {
        let k = self.m[(2, 2)];
        if k.abs() < EPSILON {
            return *self;
        }
        Homography { m: self.m / k }
    }

    pub fn is_finite(&self) -> bool {
        self.m.iter().all(|v| v.is_finite())
    }

    /// Exact transform taking each `src[i]` to `dst[i]`.
    pub fn from_four_points(src: &[(f64, f64); 4], dst: &[(f64, f64); 4]) -> Option<Homography> {
        Self::fit(src, dst)
    }

    /// Fit to `src.len() >= 4` pairs: exact for four, least squares beyond.
    ///
    /// `None` when the pairs do not determine a unique non-singular
    /// transform, e.g. collinear points.
    pub fn fit(src: &[(f64, f64)], dst: &[(f64, f64)]) -> Option<Homography> {
        if src.len() != dst.len() || src.len() < MIN_CORRESPONDENCES {
            return None;
        }
        let (src_n, t_src) = normalize_points(src)?;
        let (dst_n, t_dst) = normalize_points(dst)?;

        let hn = solve_dlt(&src_n, &dst_n)?;
        if hn.determinant().abs() < RANK_TOLERANCE {
            return None;
        }

        // H = T_dst^-1 * Hn * T_src
        let m = t_dst.try_inverse()? * hn * t_src;
        let result = Homography { m }.normalized();
        result.is_finite().then_some(result)
    }

    /// Squared distance between `dst` and the image of `src`.
    pub fn reprojection_error_sq(&self, src: (f64, f64), dst: (f64, f64)) -> f64 {
        match self.apply(src.0, src.1) {
            Some((u, v)) => (u - dst.0).powi(2) + (v - dst.1).powi(2),
            None => f64::INFINITY,
        }
    }
}

/// Translate to the centroid and scale to mean distance sqrt(2).
fn normalize_points(pts: &[(f64, f64)]) -> Option<(Vec<(f64, f64)>, Matrix3<f64>)> {
    let n = pts.len() as f64;
    let mx = pts.iter().map(|p| p.0).sum::<f64>() / n;
    let my = pts.iter().map(|p| p.1).sum::<f64>() / n;
    let mean_dist = pts
        .iter()
        .map(|p| ((p.0 - mx).powi(2) + (p.1 - my).powi(2)).sqrt())
        .sum::<f64>()
        / n;
    if mean_dist <= 1e-12 || !mean_dist.is_finite() {
        return None;
    }

    let s = std::f64::consts::SQRT_2 / mean_dist;
    let t = Matrix3::new(s, 0.0, -s * mx, 0.0, s, -s * my, 0.0, 0.0, 1.0);
    let out = pts.iter().map(|p| (s * (p.0 - mx), s * (p.1 - my))).collect();
    Some((out, t))
}

/// Null vector of the DLT system, reshaped to a 3x3 matrix.
///
/// The system has two rows per pair and is padded with zero rows to at
/// least nine, so the thin SVD always yields all nine right singular
/// vectors.
fn solve_dlt(src: &[(f64, f64)], dst: &[(f64, f64)]) -> Option<Matrix3<f64>> {
    let rows = (2 * src.len()).max(9);
    let mut a = DMatrix::<f64>::zeros(rows, 9);
    for (i, (&(x, y), &(u, v))) in src.iter().zip(dst).enumerate() {
        let r0 = 2 * i;
        let r1 = r0 + 1;

        a[(r0, 0)] = x;
        a[(r0, 1)] = y;
        a[(r0, 2)] = 1.0;
        a[(r0, 6)] = -u * x;
        a[(r0, 7)] = -u * y;
        a[(r0, 8)] = -u;

        a[(r1, 3)] = x;
        a[(r1, 4)] = y;
        a[(r1, 5)] = 1.0;
        a[(r1, 6)] = -v * x;
        a[(r1, 7)] = -v * y;
        a[(r1, 8)] = -v;
    }

    let svd = a.svd(false, true);
    let vt = svd.v_t?;
    let mut order: Vec<(usize, f64)> = svd.singular_values.iter().copied().enumerate().collect();
    order.sort_by(|p, q| p.1.total_cmp(&q.1));
    let (smallest, _) = order[0];
    let second = order[1].1;
    let largest = order[order.len() - 1].1;
    // A second vanishing singular value leaves a family of solutions.
    if !largest.is_finite() || largest <= 0.0 || second <= RANK_TOLERANCE * largest {
        return None;
    }

    let h = vt.row(smallest);
    Some(Matrix3::new(h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], h[8]))
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RansacParams {
    /// Maximum reprojection distance (pixels) for an inlier.
    pub threshold: f64,
    pub max_iters: usize,
    /// Desired probability of drawing at least one outlier-free sample.
    pub confidence: f64,
}

impl Default for RansacParams {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_RANSAC_THRESHOLD,
            max_iters: DEFAULT_RANSAC_MAX_ITERS,
            confidence: DEFAULT_RANSAC_CONFIDENCE,
        }
    }
}

#[derive(Clone, Debug)]
pub struct RansacResult {
    pub homography: Homography,
    pub inliers: Vec<bool>,
    pub inlier_count: usize,
}

/// Robustly fit a homography taking `src` onto `dst`.
///
/// Returns `None` when fewer than four pairs are given or no sample yields
/// a usable transform.
pub fn find_homography_ransac(
    src: &[(f64, f64)],
    dst: &[(f64, f64)],
    params: &RansacParams,
) -> Option<RansacResult> {
    let n = src.len();
    if n != dst.len() || n < MIN_CORRESPONDENCES {
        return None;
    }
    let thresh2 = params.threshold * params.threshold;

    let mut best: Option<(Homography, Vec<bool>, usize)> = None;
    let mut needed = if n == MIN_CORRESPONDENCES {
        1
    } else {
        params.max_iters.max(1)
    };

    let mut iter = 0usize;
    while iter < needed {
        let idx = sample_unique_indices(n, MIN_CORRESPONDENCES, RANSAC_SEED + iter as u64);
        iter += 1;

        let s: Vec<(f64, f64)> = idx.iter().map(|&j| src[j]).collect();
        let d: Vec<(f64, f64)> = idx.iter().map(|&j| dst[j]).collect();
        let Some(h) = Homography::fit(&s, &d) else {
            continue;
        };

        let (mask, count) = inlier_mask(&h, src, dst, thresh2);
        if best.as_ref().map_or(true, |(_, _, c)| count > *c) {
            let outlier_ratio = 1.0 - count as f64 / n as f64;
            needed = needed.min(required_iterations(params.confidence, outlier_ratio, params.max_iters));
            best = Some((h, mask, count));
        }
    }

    let (h, mask, count) = best?;
    debug!(iterations = iter, inliers = count, total = n, "RANSAC finished");

    let in_src: Vec<(f64, f64)> = src.iter().zip(&mask).filter(|&(_, &m)| m).map(|(p, _)| *p).collect();
    let in_dst: Vec<(f64, f64)> = dst.iter().zip(&mask).filter(|&(_, &m)| m).map(|(p, _)| *p).collect();

    if let Some(refined) = Homography::fit(&in_src, &in_dst) {
        let (refined_mask, refined_count) = inlier_mask(&refined, src, dst, thresh2);
        if refined_count >= count {
            return Some(RansacResult {
                homography: refined,
                inliers: refined_mask,
                inlier_count: refined_count,
            });
        }
    }

    Some(RansacResult {
        homography: h,
        inliers: mask,
        inlier_count: count,
    })
}

fn inlier_mask(
    h: &Homography,
    src: &[(f64, f64)],
    dst: &[(f64, f64)],
    thresh2: f64,
) -> (Vec<bool>, usize) {
    let mask: Vec<bool> = src
        .iter()
        .zip(dst)
        .map(|(&s, &d)| h.reprojection_error_sq(s, d) <= thresh2)
        .collect();
    let count = mask.iter().filter(|&&m| m).count();
    (mask, count)
}

/// Iterations needed to draw one all-inlier minimal sample with the given
/// confidence.
fn required_iterations(confidence: f64, outlier_ratio: f64, max_iters: usize) -> usize {
    let inlier_p = (1.0 - outlier_ratio).powi(MIN_CORRESPONDENCES as i32);
    if inlier_p >= 1.0 - f64::EPSILON {
        return 1;
    }
    if inlier_p <= f64::EPSILON {
        return max_iters;
    }
    let num = (1.0 - confidence).max(f64::MIN_POSITIVE).ln();
    let denom = (1.0 - inlier_p).ln();
    if denom >= 0.0 {
        return max_iters;
    }
    ((num / denom).ceil() as usize).clamp(1, max_iters)
}

/// `k` distinct indices below `n` from a linear congruential sequence.
fn sample_unique_indices(n: usize, k: usize, seed: u64) -> Vec<usize> {
    let mut out = Vec::with_capacity(k);
    let mut used = vec![false; n];
    let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
    while out.len() < k {
        state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        let idx = ((state >> 33) as usize) % n;
        if !used[idx] {
            used[idx] = true;
            out.push(idx);
        }
    }
    out
}
