pub mod image_io;

pub use image_io::{decode_pair, decode_raster, load_pair, load_raster, save_png};
