//! Keypoint overlay
//!
//! Drawing surfaces and the per-tick marker renderer.

pub mod renderer;
pub mod surface;

pub use renderer::redraw;
pub use surface::{Color, CommandSurface, DisplaySurface, DrawOp, RasterSurface};
