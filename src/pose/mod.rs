//! Pose data and the estimator interface
//!
//! Keypoints, poses and the enumerated landmarks a user can record.

pub mod estimator;
pub mod types;

pub use estimator::{NullEstimator, PoseEstimator};
pub use types::{EstimationOptions, Keypoint, Landmark, Pose};
