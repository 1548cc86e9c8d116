//! Oriented binary keypoints.
//!
//! FAST-9 corners are detected on every level of a scale pyramid, oriented
//! by their intensity centroid, and described by a rotated BRIEF test
//! pattern. Descriptors are compared by Hamming distance.

pub mod descriptor;
pub mod fast;
pub mod matcher;
pub mod pyramid;

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::consts::{
    DEFAULT_FAST_THRESHOLD, DEFAULT_MAX_KEYPOINTS, DEFAULT_PYRAMID_LEVELS, DEFAULT_PYRAMID_SCALE,
    DESCRIPTOR_BLUR_SIGMA, DESCRIPTOR_BORDER,
};
use crate::filters::gaussian_blur::gaussian_blur_array;

pub use descriptor::Descriptor;
pub use matcher::{knn_match_2, ratio_test_matches, DescriptorMatch};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureParams {
    /// FAST intensity threshold, as a fraction of full scale.
    pub fast_threshold: f32,
    /// Keypoint budget summed over all pyramid levels.
    pub max_keypoints: usize,
    pub pyramid_levels: usize,
    /// Downscale factor between consecutive levels.
    pub pyramid_scale: f32,
}

impl Default for FeatureParams {
    fn default() -> Self {
        Self {
            fast_threshold: DEFAULT_FAST_THRESHOLD,
            max_keypoints: DEFAULT_MAX_KEYPOINTS,
            pyramid_levels: DEFAULT_PYRAMID_LEVELS,
            pyramid_scale: DEFAULT_PYRAMID_SCALE,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Keypoint {
    /// Position in level-0 (input image) pixels.
    pub x: f32,
    pub y: f32,
    pub level: usize,
    /// Orientation in radians.
    pub angle: f32,
    pub score: f32,
}

/// Keypoints and their descriptors, index-aligned.
#[derive(Clone, Debug, Default)]
pub struct Features {
    pub keypoints: Vec<Keypoint>,
    pub descriptors: Vec<Descriptor>,
}

impl Features {
    pub fn len(&self) -> usize {
        self.keypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keypoints.is_empty()
    }
}

/// Detect and describe keypoints of a grayscale plane.
///
/// With a `mask` (same shape as `gray`), only keypoints whose level-0
/// position falls on a set pixel are kept.
pub fn detect_and_describe(
    gray: &Array2<f32>,
    mask: Option<&Array2<bool>>,
    params: &FeatureParams,
) -> Features {
    let levels = pyramid::build_pyramid(gray, params.pyramid_levels.max(1), params.pyramid_scale);
    let quotas = level_quotas(params.max_keypoints, levels.len(), params.pyramid_scale);
    let pattern = descriptor::sampling_pattern();
    let mut features = Features::default();

    for (level_idx, (level, quota)) in levels.iter().zip(quotas).enumerate() {
        let mut corners = fast::detect_fast(&level.image, params.fast_threshold, DESCRIPTOR_BORDER);
        corners.sort_by(|a, b| b.score.total_cmp(&a.score));

        let smoothed = gaussian_blur_array(&level.image, DESCRIPTOR_BLUR_SIGMA);
        let mut kept = 0usize;
        for c in corners {
            if kept >= quota {
                break;
            }
            let x0 = c.x as f32 * level.scale;
            let y0 = c.y as f32 * level.scale;
            if let Some(m) = mask {
                if !mask_allows(m, x0, y0) {
                    continue;
                }
            }

            let angle = descriptor::intensity_centroid_angle(&level.image, c.x, c.y);
            let desc = descriptor::describe(&smoothed, c.x, c.y, angle, &pattern);
            features.keypoints.push(Keypoint {
                x: x0,
                y: y0,
                level: level_idx,
                angle,
                score: c.score,
            });
            features.descriptors.push(desc);
            kept += 1;
        }
        debug!(level = level_idx, keypoints = kept, "Described keypoints");
    }

    features
}

/// Split `total` keypoints over `levels` in geometric proportion, so each
/// level gets `1 / scale` of the previous level's share.
fn level_quotas(total: usize, levels: usize, scale: f32) -> Vec<usize> {
    if levels == 0 {
        return Vec::new();
    }
    let factor = 1.0 / scale.max(1.0 + f32::EPSILON);
    let mut per_level = total as f32 * (1.0 - factor) / (1.0 - factor.powi(levels as i32));
    let mut quotas = Vec::with_capacity(levels);
    let mut assigned = 0usize;
    for _ in 0..levels - 1 {
        let n = (per_level.round() as usize).min(total - assigned);
        quotas.push(n);
        assigned += n;
        per_level *= factor;
    }
    quotas.push(total - assigned);
    quotas
}

fn mask_allows(mask: &Array2<bool>, x: f32, y: f32) -> bool {
    let (h, w) = mask.dim();
    if h == 0 || w == 0 {
        return false;
    }
    let row = (y.round().max(0.0) as usize).min(h - 1);
    let col = (x.round().max(0.0) as usize).min(w - 1);
    mask[[row, col]]
}
