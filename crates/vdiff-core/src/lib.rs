pub mod composite;
pub mod consts;
pub mod coords;
pub mod correspondence;
pub mod error;
pub mod features;
pub mod filters;
pub mod geometry;
pub mod homography;
pub mod io;
pub mod params;
pub mod pipeline;
pub mod raster;
pub mod scale;
pub mod warp;
