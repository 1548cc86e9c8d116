use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_EDITOR_MAX_SIZE, DEFAULT_RANSAC_CONFIDENCE, DEFAULT_RANSAC_MAX_ITERS,
    DEFAULT_RANSAC_THRESHOLD, DEFAULT_RATIO_TEST, DEFAULT_VIEWER_MAX_SIZE,
};
use crate::coords::DisplayLimit;
use crate::error::{Result, VdiffError};
use crate::features::FeatureParams;
use crate::homography::RansacParams;

/// Which family of visualizations a run produces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareMode {
    /// Highlight-difference and anaglyph, for local changes.
    #[default]
    LocalHighlight,
    /// Dissolve, for changes spread over the whole image.
    GlobalDissolve,
}

impl CompareMode {
    pub fn from_global_flag(global: bool) -> Self {
        if global {
            Self::GlobalDissolve
        } else {
            Self::LocalHighlight
        }
    }

    pub fn is_global(&self) -> bool {
        matches!(self, Self::GlobalDissolve)
    }
}

impl std::fmt::Display for CompareMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LocalHighlight => write!(f, "local highlight"),
            Self::GlobalDissolve => write!(f, "global dissolve"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Keep a match only if best < ratio_test * second best.
    pub ratio_test: f32,
    /// RANSAC inlier distance in working-size pixels.
    pub ransac_threshold: f64,
    pub ransac_max_iters: usize,
    pub ransac_confidence: f64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            ratio_test: DEFAULT_RATIO_TEST,
            ransac_threshold: DEFAULT_RANSAC_THRESHOLD,
            ransac_max_iters: DEFAULT_RANSAC_MAX_ITERS,
            ransac_confidence: DEFAULT_RANSAC_CONFIDENCE,
        }
    }
}

impl MatchingConfig {
    pub fn ransac_params(&self) -> RansacParams {
        RansacParams {
            threshold: self.ransac_threshold,
            max_iters: self.ransac_max_iters,
            confidence: self.ransac_confidence,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Longest working side in pixels; zero or negative selects the viewer
    /// default.
    pub max_working_size: i64,
    pub mode: CompareMode,
    /// Region of interest on image 1, in fragment syntax.
    pub roi: Option<String>,
    /// Suppress differences where both binarized inputs agree.
    pub noise_reduction: bool,
    pub show_first_on_right: bool,
    /// Dissolve weight of the warped image 2, in [0, 1].
    pub opacity: f32,
    pub display: DisplayLimit,
    pub matching: MatchingConfig,
    pub features: FeatureParams,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_working_size: DEFAULT_VIEWER_MAX_SIZE as i64,
            mode: CompareMode::default(),
            roi: None,
            noise_reduction: true,
            show_first_on_right: false,
            opacity: 0.5,
            display: DisplayLimit::default(),
            matching: MatchingConfig::default(),
            features: FeatureParams::default(),
        }
    }
}

impl PipelineConfig {
    /// Defaults for the comparison viewer.
    pub fn viewer() -> Self {
        Self::default()
    }

    /// Defaults for the correspondence editor, which works on smaller
    /// rasters.
    pub fn editor() -> Self {
        Self {
            max_working_size: DEFAULT_EDITOR_MAX_SIZE as i64,
            ..Self::default()
        }
    }

    /// Effective working-size limit.
    pub fn working_max_size(&self) -> u32 {
        if self.max_working_size <= 0 {
            DEFAULT_VIEWER_MAX_SIZE
        } else {
            self.max_working_size.min(u32::MAX as i64) as u32
        }
    }

    /// Normalize and check every option once, before any image work.
    pub fn validated(mut self) -> Result<Self> {
        self.max_working_size = self.working_max_size() as i64;

        if !self.opacity.is_finite() {
            return Err(VdiffError::InvalidConfig(format!(
                "opacity must be finite, got {}",
                self.opacity
            )));
        }
        self.opacity = self.opacity.clamp(0.0, 1.0);

        let ratio = self.matching.ratio_test;
        if !(ratio > 0.0 && ratio <= 1.0) {
            return Err(VdiffError::InvalidConfig(format!(
                "ratio_test must be in (0, 1], got {ratio}"
            )));
        }
        let threshold = self.matching.ransac_threshold;
        if !(threshold.is_finite() && threshold > 0.0) {
            return Err(VdiffError::InvalidConfig(format!(
                "ransac_threshold must be finite and positive, got {threshold}"
            )));
        }
        let confidence = self.matching.ransac_confidence;
        if !(confidence > 0.0 && confidence < 1.0) {
            return Err(VdiffError::InvalidConfig(format!(
                "ransac_confidence must be in (0, 1), got {confidence}"
            )));
        }
        if self.matching.ransac_max_iters == 0 {
            return Err(VdiffError::InvalidConfig(
                "ransac_max_iters must be at least 1".into(),
            ));
        }

        let features = &self.features;
        if !(features.pyramid_scale.is_finite() && features.pyramid_scale > 1.0) {
            return Err(VdiffError::InvalidConfig(format!(
                "pyramid_scale must be greater than 1, got {}",
                features.pyramid_scale
            )));
        }
        if features.pyramid_levels == 0 {
            return Err(VdiffError::InvalidConfig(
                "pyramid_levels must be at least 1".into(),
            ));
        }
        if !(features.fast_threshold.is_finite() && features.fast_threshold > 0.0) {
            return Err(VdiffError::InvalidConfig(format!(
                "fast_threshold must be positive, got {}",
                features.fast_threshold
            )));
        }

        Ok(self)
    }
}
