//! Pose Trail - record the on-screen path of a body landmark.
//!
//! A 100ms sampling loop feeds camera frames to a pose estimator, redraws
//! the keypoint overlay and, during a recording window, logs the position
//! of the selected landmark. The optional `desktop` feature wraps it all in
//! a Tauri application.

pub mod capture;
pub mod config;
pub mod overlay;
pub mod pose;
pub mod recorder;
pub mod telemetry;

#[cfg(feature = "desktop")]
pub mod commands;

/// Initialize the desktop application
#[cfg(feature = "desktop")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    use anyhow::Context;
    use capture::LatestFrameSource;
    use commands::tracking::{self, TrackerState};
    use config::TrackerConfig;
    use pose::NullEstimator;
    use std::sync::Arc;
    use tauri::Manager;

    tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .setup(|app| {
            let config_path = app
                .path()
                .app_config_dir()
                .context("Failed to resolve config directory")?
                .join("tracker.json");
            let config = TrackerConfig::load_or_default(&config_path)
                .with_context(|| format!("Failed to load {:?}", config_path))?;

            telemetry::init_tracing(&config.log_filter);
            tracing::info!("Starting Pose Trail v{}", env!("CARGO_PKG_VERSION"));

            let frames = Arc::new(LatestFrameSource::new());
            let surface = tracking::webview_surface(app.handle().clone());
            let handle = tauri::async_runtime::block_on(async {
                recorder::spawn(
                    frames.clone(),
                    Arc::new(NullEstimator::default()),
                    Box::new(surface),
                    &config,
                )
            });

            tracking::forward_events(app.handle().clone(), handle.subscribe());
            app.manage(TrackerState { handle, frames });
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::tracking::list_landmarks,
            commands::tracking::select_landmark,
            commands::tracking::start_recording,
            commands::tracking::get_tracker_snapshot,
            commands::tracking::push_frame,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
