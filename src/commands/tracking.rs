//! Tracking-related Tauri commands
//!
//! The webview owns the camera and the presentational markup. It pushes
//! frames in, drives the selection and start controls, and listens for
//! `tracker-event` and `overlay-frame` events.

use crate::capture::LatestFrameSource;
use crate::overlay::CommandSurface;
use crate::pose::Landmark;
use crate::recorder::{TrackerEvent, TrackerHandle, TrackerSnapshot};
use serde::Serialize;
use std::sync::Arc;
use tauri::{AppHandle, Emitter, State};
use tauri_plugin_dialog::DialogExt;
use tokio::sync::broadcast::{self, error::RecvError};

/// Event carrying serialized [`TrackerEvent`]s
pub const TRACKER_EVENT: &str = "tracker-event";

/// Event carrying one redraw worth of overlay draw ops
pub const OVERLAY_FRAME_EVENT: &str = "overlay-frame";

/// Application state for tracking
pub struct TrackerState {
    pub handle: TrackerHandle,
    pub frames: Arc<LatestFrameSource>,
}

/// Entry of the landmark picker
#[derive(Debug, Clone, Serialize)]
pub struct LandmarkOption {
    pub value: &'static str,
    pub label: &'static str,
}

/// Overlay surface that emits each redraw to the webview
pub fn webview_surface(app: AppHandle) -> CommandSurface {
    CommandSurface::with_presenter(move |ops| {
        if let Err(e) = app.emit(OVERLAY_FRAME_EVENT, ops) {
            tracing::warn!("Failed to emit overlay frame: {}", e);
        }
    })
}

/// Relay tracker events to the webview and announce the end of a recording
pub fn forward_events(app: AppHandle, mut events: broadcast::Receiver<TrackerEvent>) {
    tauri::async_runtime::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if matches!(event, TrackerEvent::RecordingStopped { .. }) {
                        app.dialog()
                            .message("Recording stopped!")
                            .title("Pose Trail")
                            .show(|_| {});
                    }
                    if let Err(e) = app.emit(TRACKER_EVENT, &event) {
                        tracing::warn!("Failed to emit tracker event: {}", e);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Webview fell behind, {} tracker events dropped", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    });
}

/// Landmarks the user can pick, in display order
#[tauri::command]
pub async fn list_landmarks() -> Vec<LandmarkOption> {
    Landmark::ALL
        .iter()
        .map(|landmark| LandmarkOption {
            value: landmark.as_str(),
            label: landmark.label(),
        })
        .collect()
}

/// Set the landmark to record; an empty string clears the selection
#[tauri::command]
pub async fn select_landmark(
    state: State<'_, TrackerState>,
    landmark: String,
) -> Result<(), String> {
    let selection = Landmark::parse_selection(&landmark).map_err(|e| e.to_string())?;
    state.handle.select(selection).await.map_err(|e| e.to_string())
}

/// Start a recording window; returns the session id
#[tauri::command]
pub async fn start_recording(state: State<'_, TrackerState>) -> Result<String, String> {
    let session_id = state
        .handle
        .start_recording()
        .await
        .map_err(|e| e.to_string())?;
    Ok(session_id.to_string())
}

/// Get selection, countdown and recorded samples
#[tauri::command]
pub async fn get_tracker_snapshot(
    state: State<'_, TrackerState>,
) -> Result<TrackerSnapshot, String> {
    state.handle.snapshot().await.map_err(|e| e.to_string())
}

/// Publish the webview's current camera frame (RGBA)
#[tauri::command]
pub fn push_frame(
    state: State<'_, TrackerState>,
    width: u32,
    height: u32,
    data: Vec<u8>,
) -> Result<(), String> {
    state
        .frames
        .publish(width, height, data)
        .map_err(|e| e.to_string())
}
