//! Landmark trail recording
//!
//! The tracker actor, its sampling loop and session timers, and the
//! synchronous recording state they drive.

pub mod error;
pub mod sampler;
pub mod state;
pub(crate) mod timers;
pub mod tracker;

pub use error::{TrackerError, TrackerResult};
pub use sampler::spawn_sampler;
pub use state::{Position, RecordingSession, SampleRecord, TrackerSnapshot, TrailRecorder};
pub use tracker::{spawn, spawn_actor, TrackerEvent, TrackerHandle};
