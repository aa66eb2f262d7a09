//! Frame sources
//!
//! The camera is an external collaborator that is polled on every sampling
//! tick. [`LatestFrameSource`] keeps whatever frame a producer pushed last.

use crate::recorder::error::{TrackerError, TrackerResult};
use async_trait::async_trait;
use parking_lot::Mutex as ParkingMutex;
use std::sync::Arc;
use std::time::Instant;

/// Bytes per RGBA pixel
pub const BYTES_PER_PIXEL: usize = 4;

/// One video frame
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// Raw pixel data (RGBA, tightly packed)
    pub data: Arc<[u8]>,

    /// Frame width in pixels
    pub width: u32,

    /// Frame height in pixels
    pub height: u32,

    /// Milliseconds since the source was created
    pub timestamp_ms: f64,
}

impl VideoFrame {
    /// Buffer length of a `width` x `height` RGBA frame
    pub fn byte_len(width: u32, height: u32) -> TrackerResult<usize> {
        (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(BYTES_PER_PIXEL))
            .ok_or_else(|| {
                TrackerError::InvalidFrame(format!("{}x{} frame is too large", width, height))
            })
    }

    /// Build a frame, checking that the buffer matches the dimensions
    pub fn new(width: u32, height: u32, data: Vec<u8>, timestamp_ms: f64) -> TrackerResult<Self> {
        let expected = Self::byte_len(width, height)?;
        if data.len() != expected {
            return Err(TrackerError::InvalidFrame(format!(
                "{}x{} frame needs {} bytes, got {}",
                width,
                height,
                expected,
                data.len()
            )));
        }

        Ok(Self {
            data: data.into(),
            width,
            height,
            timestamp_ms,
        })
    }

    /// Fully transparent frame of the given size
    pub fn blank(width: u32, height: u32) -> TrackerResult<Self> {
        let len = Self::byte_len(width, height)?;
        Ok(Self {
            data: vec![0u8; len].into(),
            width,
            height,
            timestamp_ms: 0.0,
        })
    }

    pub fn has_dimensions(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Trait for anything that can hand out the current camera frame
#[async_trait]
pub trait FrameSource: Send + Sync {
    /// Whether a frame with known dimensions is currently available
    fn is_ready(&self) -> bool;

    /// Current frame width and height
    fn dimensions(&self) -> Option<(u32, u32)>;

    /// Current frame image data
    async fn current_frame(&self) -> Option<VideoFrame>;
}

/// Frame source fed by an external producer (e.g. a webview camera)
pub struct LatestFrameSource {
    latest: ParkingMutex<Option<VideoFrame>>,
    created_at: Instant,
}

impl Default for LatestFrameSource {
    fn default() -> Self {
        Self::new()
    }
}

impl LatestFrameSource {
    pub fn new() -> Self {
        Self {
            latest: ParkingMutex::new(None),
            created_at: Instant::now(),
        }
    }

    /// Replace the current frame
    pub fn publish(&self, width: u32, height: u32, data: Vec<u8>) -> TrackerResult<()> {
        let timestamp_ms = self.created_at.elapsed().as_secs_f64() * 1000.0;
        let frame = VideoFrame::new(width, height, data, timestamp_ms)?;
        tracing::trace!("Frame published: {}x{} @ {:.1}ms", width, height, timestamp_ms);
        *self.latest.lock() = Some(frame);
        Ok(())
    }

    /// Forget the current frame; the source reports not ready until the next publish
    pub fn clear(&self) {
        *self.latest.lock() = None;
    }
}

#[async_trait]
impl FrameSource for LatestFrameSource {
    fn is_ready(&self) -> bool {
        self.latest
            .lock()
            .as_ref()
            .map(VideoFrame::has_dimensions)
            .unwrap_or(false)
    }

    fn dimensions(&self) -> Option<(u32, u32)> {
        self.latest
            .lock()
            .as_ref()
            .filter(|frame| frame.has_dimensions())
            .map(|frame| (frame.width, frame.height))
    }

    async fn current_frame(&self) -> Option<VideoFrame> {
        self.latest.lock().clone()
    }
}
