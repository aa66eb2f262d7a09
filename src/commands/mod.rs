//! Tauri command handlers
//!
//! IPC commands the webview calls via Tauri's invoke system.

pub mod tracking;
