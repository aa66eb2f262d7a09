//! Camera frame acquisition
//!
//! Frames are produced outside the crate and polled by the sampling loop.

pub mod frame;

pub use frame::{FrameSource, LatestFrameSource, VideoFrame};
