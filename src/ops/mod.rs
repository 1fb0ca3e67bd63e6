pub mod drag;
pub mod geometry;
pub mod overlay;
pub mod placement;
pub mod raster;
pub mod ratio;
pub mod spiral;
