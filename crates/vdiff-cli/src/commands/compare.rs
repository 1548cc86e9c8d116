use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use vdiff_core::io::{load_pair, save_png};
use vdiff_core::params::ComparisonParameters;
use vdiff_core::pipeline::config::PipelineConfig;
use vdiff_core::pipeline::run_pipeline_reported;

use crate::progress::BarReporter;
use crate::summary::print_compare_summary;

#[derive(Args)]
pub struct CompareArgs {
    /// Image 1 (the reference)
    pub img1: PathBuf,

    /// Image 2 (warped onto image 1)
    pub img2: PathBuf,

    /// Saved comparison parameters (JSON)
    #[arg(long)]
    pub params: Option<PathBuf>,

    /// Pipeline config file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// `corners`, `auto`, or a JSON file of correspondence points
    #[arg(long)]
    pub corr_pts: Option<String>,

    /// Region of interest on image 1, e.g. `pixel:10,10,200,100`
    #[arg(long)]
    pub roi: Option<String>,

    /// Global dissolve instead of local highlighting
    #[arg(long)]
    pub global: bool,

    /// Put image 1 on the right in side-by-side views
    #[arg(long)]
    pub show_first_right: bool,

    /// Keep differences where both binarized inputs agree
    #[arg(long)]
    pub no_noise_reduction: bool,

    /// Longest working side in pixels
    #[arg(long)]
    pub max_size: Option<i64>,

    /// Dissolve opacity of image 2 (0-1)
    #[arg(long)]
    pub opacity: Option<f32>,

    /// Output directory
    #[arg(short, long, default_value = "vdiff-out")]
    pub output: PathBuf,
}

pub fn run(args: &CompareArgs) -> Result<()> {
    let mut config = super::load_config(args.config.as_deref(), PipelineConfig::viewer())?;
    if let Some(max_size) = args.max_size {
        config.max_working_size = max_size;
    }
    if let Some(opacity) = args.opacity {
        config.opacity = opacity;
    }

    let params = build_params(args)?;
    let (first, second) = load_pair(&args.img1, &args.img2).context("Failed to load images")?;

    let reporter = Arc::new(BarReporter::new()?);
    let state = run_pipeline_reported(&first, &second, &params, &config, reporter.clone())?;
    reporter.finish();

    std::fs::create_dir_all(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;
    let mut written = Vec::new();
    for (name, raster) in state.outputs().named() {
        let path = args.output.join(format!("{name}.png"));
        save_png(raster, &path).with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path);
    }

    let params_path = args.output.join("params.json");
    let exported = state.export_parameters();
    exported
        .save(&params_path)
        .with_context(|| format!("Failed to write {}", params_path.display()))?;
    written.push(params_path);

    print_compare_summary(&state, &written);
    Ok(())
}

/// Saved parameters (if any) with command-line overrides on top.
fn build_params(args: &CompareArgs) -> Result<ComparisonParameters> {
    let mut params = match &args.params {
        Some(path) => ComparisonParameters::load(path)
            .with_context(|| format!("Failed to read parameters {}", path.display()))?,
        None => ComparisonParameters::default(),
    };
    params.img1 = args.img1.display().to_string();
    params.img2 = args.img2.display().to_string();

    if let Some(corr_pts) = &args.corr_pts {
        params.corr_pts = Some(super::parse_corr_pts(corr_pts)?);
    }
    if let Some(roi) = &args.roi {
        params.img1_roi_xywh = Some(roi.clone());
    }
    if args.global {
        params.mode = true;
    }
    if args.show_first_right {
        params.show_img1_right = true;
    }
    if args.no_noise_reduction {
        params.nrbi = Some(false);
    }
    Ok(params)
}
