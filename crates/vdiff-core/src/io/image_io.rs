use std::path::Path;

use image::ImageFormat;
use tracing::debug;

use crate::error::{ImageSlot, Result, VdiffError};
use crate::raster::RasterImage;

/// Load an image file as RGBA.
pub fn load_raster(path: &Path) -> Result<RasterImage> {
    let img = image::open(path)?;
    let raster = RasterImage::from_dynamic(&img);
    raster.ensure_nonempty()?;
    debug!(path = %path.display(), width = raster.width(), height = raster.height(), "Loaded image");
    Ok(raster)
}

/// Decode an encoded image held in memory.
pub fn decode_raster(bytes: &[u8]) -> Result<RasterImage> {
    let img = image::load_from_memory(bytes)?;
    let raster = RasterImage::from_dynamic(&img);
    raster.ensure_nonempty()?;
    Ok(raster)
}

/// Save a raster as 8-bit RGBA PNG.
pub fn save_png(raster: &RasterImage, path: &Path) -> Result<()> {
    raster
        .to_rgba8()
        .save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

fn tag(slot: ImageSlot) -> impl Fn(VdiffError) -> VdiffError {
    move |e| VdiffError::ImageLoad {
        slot,
        reason: e.to_string(),
    }
}

/// Load both images; either failing fails the pair.
pub fn load_pair(first: &Path, second: &Path) -> Result<(RasterImage, RasterImage)> {
    let (a, b) = rayon::join(|| load_raster(first), || load_raster(second));
    Ok((a.map_err(tag(ImageSlot::First))?, b.map_err(tag(ImageSlot::Second))?))
}

/// Decode both images; either failing fails the pair.
pub fn decode_pair(first: &[u8], second: &[u8]) -> Result<(RasterImage, RasterImage)> {
    let (a, b) = rayon::join(|| decode_raster(first), || decode_raster(second));
    Ok((a.map_err(tag(ImageSlot::First))?, b.map_err(tag(ImageSlot::Second))?))
}
