//! Sampling loop
//!
//! Every [`SAMPLE_PERIOD`] the loop polls the frame source. A ready frame
//! resizes the overlay and is handed to the estimator in its own task, so
//! a slow model never delays the next tick. The estimate then goes to the
//! tracker actor, which redraws the overlay and records the selected
//! keypoint.

use crate::capture::FrameSource;
use crate::config::EstimationPolicy;
use crate::pose::{EstimationOptions, PoseEstimator};
use crate::recorder::state::SAMPLE_PERIOD;
use crate::recorder::tracker::{TrackerHandle, WeakTrackerHandle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Spawn the sampling loop for `handle`; it ends when the tracker does
pub fn spawn_sampler(
    handle: &TrackerHandle,
    frames: Arc<dyn FrameSource>,
    estimator: Arc<dyn PoseEstimator>,
    options: EstimationOptions,
    policy: EstimationPolicy,
) -> JoinHandle<()> {
    tokio::spawn(run_sampling_loop(
        handle.downgrade(),
        frames,
        estimator,
        options,
        policy,
    ))
}

async fn run_sampling_loop(
    tracker: WeakTrackerHandle,
    frames: Arc<dyn FrameSource>,
    estimator: Arc<dyn PoseEstimator>,
    options: EstimationOptions,
    policy: EstimationPolicy,
) {
    tracing::info!(
        "Sampling loop started (estimator={}, period={:?}, policy={:?})",
        estimator.name(),
        SAMPLE_PERIOD,
        policy
    );

    let pending = Arc::new(AtomicBool::new(false));
    let mut ticker = tokio::time::interval(SAMPLE_PERIOD);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        let Some(handle) = tracker.upgrade() else {
            break;
        };

        if !frames.is_ready() {
            continue;
        }
        // Overlay size comes from the frame being estimated
        let Some(frame) = frames.current_frame().await else {
            continue;
        };
        if !frame.has_dimensions() {
            continue;
        }
        let (width, height) = (frame.width, frame.height);

        if policy == EstimationPolicy::SingleFlight && pending.swap(true, Ordering::AcqRel) {
            tracing::trace!("Previous estimate still pending, skipping tick");
            continue;
        }

        if handle.sync_surface(width, height).await.is_err() {
            break;
        }

        let estimator = estimator.clone();
        let pending = pending.clone();
        tokio::spawn(async move {
            let result = estimator.estimate(&frame, options).await;
            pending.store(false, Ordering::Release);

            match result {
                Ok(mut poses) => {
                    poses.truncate(options.max_poses);
                    let _ = handle.submit_poses(poses).await;
                }
                Err(e) => tracing::warn!("Pose estimation failed: {}", e),
            }
        });
    }

    tracing::debug!("Sampling loop stopped");
}
