use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use vdiff_core::io::load_pair;
use vdiff_core::pipeline::config::PipelineConfig;
use vdiff_core::raster::WorkingImage;

#[derive(Args)]
pub struct AlignArgs {
    /// Image 1 (the reference)
    pub img1: PathBuf,

    /// Image 2
    pub img2: PathBuf,

    /// `corners`, `auto`, or a JSON file of correspondence points
    #[arg(long, default_value = "auto")]
    pub corr_pts: String,

    /// Region of interest on image 1
    #[arg(long)]
    pub roi: Option<String>,

    /// Longest working side in pixels
    #[arg(long)]
    pub max_size: Option<i64>,

    /// Pipeline config file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Resolve correspondences at editor working size and print them in
/// full-size coordinates.
pub fn run(args: &AlignArgs) -> Result<()> {
    let mut config = super::load_config(args.config.as_deref(), PipelineConfig::editor())?;
    if let Some(max_size) = args.max_size {
        config.max_working_size = max_size;
    }
    if let Some(roi) = &args.roi {
        config.roi = Some(roi.clone());
    }
    let config = config.validated()?;
    let hint = super::parse_corr_pts(&args.corr_pts)?.to_hint();

    let (first, second) = load_pair(&args.img1, &args.img2).context("Failed to load images")?;
    let max_size = config.working_max_size();
    let first = WorkingImage::prepare(&first, max_size)?;
    let second = WorkingImage::prepare(&second, max_size)?;

    let resolution = vdiff_core::correspondence::resolve(
        &first,
        &second,
        &hint,
        config.roi.as_deref(),
        &config.matching,
        &config.features,
    );
    eprintln!("Resolved with {}", resolution.method);
    println!("{}", serde_json::to_string_pretty(&resolution.correspondences)?);
    Ok(())
}
