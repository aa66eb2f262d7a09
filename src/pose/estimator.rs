//! Pose estimator seam
//!
//! The model itself is an external collaborator. Anything that can turn a
//! frame into keypoints implements [`PoseEstimator`].

use crate::capture::VideoFrame;
use crate::pose::types::{EstimationOptions, Pose};
use crate::recorder::error::TrackerResult;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};

/// Trait for pose estimation backends
#[async_trait]
pub trait PoseEstimator: Send + Sync {
    /// Human readable backend name, used in logs
    fn name(&self) -> &str;

    /// Estimate the poses visible in `frame`
    async fn estimate(&self, frame: &VideoFrame, options: EstimationOptions)
        -> TrackerResult<Vec<Pose>>;
}

/// Estimator used when no model backend is wired in; never detects anyone
#[derive(Debug, Default)]
pub struct NullEstimator {
    warned: AtomicBool,
}

#[async_trait]
impl PoseEstimator for NullEstimator {
    fn name(&self) -> &str {
        "null"
    }

    async fn estimate(
        &self,
        frame: &VideoFrame,
        _options: EstimationOptions,
    ) -> TrackerResult<Vec<Pose>> {
        if !self.warned.swap(true, Ordering::Relaxed) {
            tracing::info!(
                "No pose model configured; frames ({}x{}) will produce no keypoints",
                frame.width,
                frame.height
            );
        }
        Ok(Vec::new())
    }
}
