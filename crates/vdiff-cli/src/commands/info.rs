use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use vdiff_core::consts::DEFAULT_VIEWER_MAX_SIZE;
use vdiff_core::coords::FrameMapping;
use vdiff_core::io::load_raster;
use vdiff_core::scale::{marker_color, representative_saturation};

#[derive(Args)]
pub struct InfoArgs {
    /// Image file
    pub file: PathBuf,

    /// Longest working side in pixels
    #[arg(long, default_value_t = DEFAULT_VIEWER_MAX_SIZE)]
    pub max_size: u32,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let raster = load_raster(&args.file)
        .with_context(|| format!("Failed to load {}", args.file.display()))?;
    let (h, w) = raster.dim();
    let mapping = FrameMapping::new(w, h, args.max_size);
    let (ww, wh) = mapping.working_size();

    println!("File:          {}", args.file.display());
    println!("Dimensions:    {}x{}", w, h);
    println!("Working size:  {}x{} (ratio {:.4})", ww, wh, mapping.working_ratio());
    println!("Saturation:    {}", representative_saturation(&raster));
    println!("Marker color:  {}", marker_color(&raster));

    Ok(())
}
