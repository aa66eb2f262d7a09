//! Recording state
//!
//! [`TrailRecorder`] owns the selection, the recording session and the
//! sample log. It is purely synchronous; timing lives in the tracker actor.

use crate::pose::{Landmark, Pose};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Period of the sampling loop
pub const SAMPLE_PERIOD: Duration = Duration::from_millis(100);

/// Value the countdown display starts from
pub const COUNTDOWN_START: u32 = 5;

/// Period of the countdown display
pub const COUNTDOWN_PERIOD: Duration = Duration::from_secs(1);

/// Time after start at which a session is forcibly ended.
///
/// One second longer than the displayed countdown: the countdown reads 0
/// at 5s and the session keeps sampling until this stop fires.
pub const HARD_STOP_AFTER: Duration = Duration::from_secs(6);

/// Screen-space position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// One recorded position of the selected landmark
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleRecord {
    pub part: String,
    pub position: Position,
}

impl std::fmt::Display for SampleRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Body Part: {}\nPosition: {}, {}",
            self.part, self.position.x, self.position.y
        )
    }
}

/// An open recording window
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingSession {
    pub id: Uuid,
    pub remaining_seconds: u32,
    pub started_at: DateTime<Utc>,
}

/// Selection, session and log for one tracker
#[derive(Debug, Default)]
pub struct TrailRecorder {
    selection: Option<Landmark>,
    session: Option<RecordingSession>,
    samples: Vec<SampleRecord>,
}

impl TrailRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> Option<Landmark> {
        self.selection
    }

    pub fn select(&mut self, selection: Option<Landmark>) {
        self.selection = selection;
    }

    pub fn session(&self) -> Option<&RecordingSession> {
        self.session.as_ref()
    }

    pub fn is_recording(&self) -> bool {
        self.session.is_some()
    }

    pub fn samples(&self) -> &[SampleRecord] {
        &self.samples
    }

    /// Open a new recording window, discarding the previous log
    ///
    /// A session that is still open is replaced.
    pub fn start(&mut self) -> &RecordingSession {
        self.samples.clear();
        self.session.insert(RecordingSession {
            id: Uuid::new_v4(),
            remaining_seconds: COUNTDOWN_START,
            started_at: Utc::now(),
        })
    }

    /// Decrement the displayed countdown of session `id`
    ///
    /// Returns the new value, or `None` when `id` is not the open session.
    pub fn countdown_tick(&mut self, id: Uuid) -> Option<u32> {
        let session = self.session.as_mut().filter(|session| session.id == id)?;
        session.remaining_seconds = session.remaining_seconds.saturating_sub(1);
        Some(session.remaining_seconds)
    }

    /// Close session `id`; returns false when it is not the open session
    pub fn stop(&mut self, id: Uuid) -> bool {
        match &self.session {
            Some(session) if session.id == id => {
                self.session = None;
                true
            }
            _ => false,
        }
    }

    /// Record the selected keypoint of the first pose, if recording
    pub fn observe(&mut self, poses: &[Pose]) -> Option<&SampleRecord> {
        if self.session.is_none() {
            return None;
        }
        let selection = self.selection?;
        let keypoint = poses.first()?.find(selection.as_str())?;

        self.samples.push(SampleRecord {
            part: keypoint.name.clone(),
            position: Position {
                x: keypoint.x,
                y: keypoint.y,
            },
        });
        self.samples.last()
    }

    pub fn snapshot(&self) -> TrackerSnapshot {
        let is_recording = self.is_recording();
        let countdown = self
            .session
            .as_ref()
            .map(|session| session.remaining_seconds)
            .unwrap_or(0);

        TrackerSnapshot {
            selection: self.selection,
            is_recording,
            countdown,
            countdown_message: (is_recording && countdown > 0)
                .then(|| format!("Recording starts in {} seconds...", countdown)),
            session_id: self.session.as_ref().map(|session| session.id),
            started_at: self.session.as_ref().map(|session| session.started_at),
            samples: self.samples.clone(),
        }
    }
}

/// Read-only view of the tracker for display
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerSnapshot {
    pub selection: Option<Landmark>,
    pub is_recording: bool,
    pub countdown: u32,
    /// Status line shown while the countdown is running
    pub countdown_message: Option<String>,
    pub session_id: Option<Uuid>,
    pub started_at: Option<DateTime<Utc>>,
    pub samples: Vec<SampleRecord>,
}
