// Rasterization adapter: preview surfaces and the pixel painter behind the
// local raster export strategy.

pub mod preview;
pub mod rasterizer;
pub mod surface;
