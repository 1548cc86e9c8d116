use anyhow::Result;
use clap::Args;
use vdiff_core::geometry::{intersect_rect, parse_fragment_rect};

#[derive(Args)]
pub struct RoiArgs {
    /// Fragment, e.g. `xywh=percent:10,10,50,50`
    pub fragment: String,

    /// Extent width in pixels
    #[arg(long)]
    pub width: f64,

    /// Extent height in pixels
    #[arg(long)]
    pub height: f64,
}

pub fn run(args: &RoiArgs) -> Result<()> {
    let rect = parse_fragment_rect(&args.fragment);
    let pixels = intersect_rect(args.width, args.height, &rect);

    println!("Parsed:   {}", rect.to_fragment());
    println!(
        "Pixels:   x={} y={} w={} h={}",
        pixels.x, pixels.y, pixels.width, pixels.height
    );
    println!("Fragment: {}", pixels.to_fragment_rect().to_fragment());
    Ok(())
}
