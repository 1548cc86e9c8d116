pub mod align;
pub mod compare;
pub mod config;
pub mod info;
pub mod roi;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use vdiff_core::params::CorrPts;
use vdiff_core::pipeline::config::PipelineConfig;

/// Read a pipeline config from TOML, or start from `fallback`.
pub(crate) fn load_config(path: Option<&Path>, fallback: PipelineConfig) -> Result<PipelineConfig> {
    let Some(path) = path else {
        return Ok(fallback);
    };
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    toml::from_str(&contents).context("Invalid pipeline config")
}

/// `corners`, `auto`, or a JSON file holding a correspondence point set.
pub(crate) fn parse_corr_pts(arg: &str) -> Result<CorrPts> {
    match arg {
        "corners" => Ok(CorrPts::Corners),
        "auto" => Ok(CorrPts::Auto),
        path => {
            let path = PathBuf::from(path);
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read points {}", path.display()))?;
            let value: serde_json::Value = serde_json::from_str(&text)
                .with_context(|| format!("Invalid JSON in {}", path.display()))?;
            Ok(CorrPts::from_value(value))
        }
    }
}
