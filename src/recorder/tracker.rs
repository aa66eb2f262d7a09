//! Tracker actor
//!
//! One task owns the selection, the sample log, the recording session and
//! the overlay surface. Everything else talks to it through a
//! [`TrackerHandle`]: the UI, the sampling loop and the session timers.
//! The actor exits once every handle has been dropped; the sampling loop
//! and timers only hold weak senders.

use crate::capture::FrameSource;
use crate::config::TrackerConfig;
use crate::overlay::{renderer, DisplaySurface};
use crate::pose::{Landmark, Pose, PoseEstimator};
use crate::recorder::error::{TrackerError, TrackerResult};
use crate::recorder::sampler;
use crate::recorder::state::{SampleRecord, TrackerSnapshot, TrailRecorder};
use crate::recorder::timers::SessionTimers;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot};
use uuid::Uuid;

const COMMAND_CAPACITY: usize = 64;
const EVENT_CAPACITY: usize = 256;

/// Messages handled by the tracker actor
pub(crate) enum TrackerCommand {
    Select(Option<Landmark>),
    StartRecording(oneshot::Sender<Uuid>),
    CountdownTick(Uuid),
    HardStop(Uuid),
    SyncSurface { width: u32, height: u32 },
    Estimated(Vec<Pose>),
    Snapshot(oneshot::Sender<TrackerSnapshot>),
}

/// Notifications published by the tracker
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TrackerEvent {
    #[serde(rename_all = "camelCase")]
    SelectionChanged { selection: Option<Landmark> },
    #[serde(rename_all = "camelCase")]
    RecordingStarted { session_id: Uuid },
    #[serde(rename_all = "camelCase")]
    Countdown { session_id: Uuid, remaining: u32 },
    #[serde(rename_all = "camelCase")]
    SampleRecorded { sample: SampleRecord },
    #[serde(rename_all = "camelCase")]
    RecordingStopped { session_id: Uuid, samples: usize },
}

/// Cloneable entry point to a running tracker
#[derive(Clone)]
pub struct TrackerHandle {
    commands: mpsc::Sender<TrackerCommand>,
    events: broadcast::Sender<TrackerEvent>,
}

impl TrackerHandle {
    /// Change the landmark to record; takes effect on the next tick
    pub async fn select(&self, selection: Option<Landmark>) -> TrackerResult<()> {
        self.send(TrackerCommand::Select(selection)).await
    }

    /// Clear the log and open a new recording window
    pub async fn start_recording(&self) -> TrackerResult<Uuid> {
        let (reply, response) = oneshot::channel();
        self.send(TrackerCommand::StartRecording(reply)).await?;
        response.await.map_err(|_| TrackerError::TrackerStopped)
    }

    pub async fn snapshot(&self) -> TrackerResult<TrackerSnapshot> {
        let (reply, response) = oneshot::channel();
        self.send(TrackerCommand::Snapshot(reply)).await?;
        response.await.map_err(|_| TrackerError::TrackerStopped)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TrackerEvent> {
        self.events.subscribe()
    }

    /// Match the overlay surface to the current frame size
    pub(crate) async fn sync_surface(&self, width: u32, height: u32) -> TrackerResult<()> {
        self.send(TrackerCommand::SyncSurface { width, height }).await
    }

    /// Hand one tick's estimate to the renderer and recorder
    pub(crate) async fn submit_poses(&self, poses: Vec<Pose>) -> TrackerResult<()> {
        self.send(TrackerCommand::Estimated(poses)).await
    }

    /// Reference that does not keep the actor alive
    pub(crate) fn downgrade(&self) -> WeakTrackerHandle {
        WeakTrackerHandle {
            commands: self.commands.downgrade(),
            events: self.events.clone(),
        }
    }

    async fn send(&self, command: TrackerCommand) -> TrackerResult<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| TrackerError::TrackerStopped)
    }
}

/// Handle held by background tasks; see [`TrackerHandle::downgrade`]
#[derive(Clone)]
pub(crate) struct WeakTrackerHandle {
    commands: mpsc::WeakSender<TrackerCommand>,
    events: broadcast::Sender<TrackerEvent>,
}

impl WeakTrackerHandle {
    pub(crate) fn upgrade(&self) -> Option<TrackerHandle> {
        self.commands.upgrade().map(|commands| TrackerHandle {
            commands,
            events: self.events.clone(),
        })
    }
}

/// Start the actor alone; estimates must be fed by the caller
pub fn spawn_actor(surface: Box<dyn DisplaySurface>) -> TrackerHandle {
    let (commands, inbox) = mpsc::channel(COMMAND_CAPACITY);
    let (events, _) = broadcast::channel(EVENT_CAPACITY);

    let actor = TrackerActor {
        recorder: TrailRecorder::new(),
        surface,
        commands: commands.downgrade(),
        events: events.clone(),
        timers: None,
    };
    tokio::spawn(actor.run(inbox));

    TrackerHandle { commands, events }
}

/// Start the actor together with its 100ms sampling loop
pub fn spawn(
    frames: Arc<dyn FrameSource>,
    estimator: Arc<dyn PoseEstimator>,
    surface: Box<dyn DisplaySurface>,
    config: &TrackerConfig,
) -> TrackerHandle {
    let handle = spawn_actor(surface);
    sampler::spawn_sampler(
        &handle,
        frames,
        estimator,
        config.estimation_options(),
        config.estimation_policy,
    );
    handle
}

struct TrackerActor {
    recorder: TrailRecorder,
    surface: Box<dyn DisplaySurface>,
    commands: mpsc::WeakSender<TrackerCommand>,
    events: broadcast::Sender<TrackerEvent>,
    timers: Option<SessionTimers>,
}

impl TrackerActor {
    async fn run(mut self, mut inbox: mpsc::Receiver<TrackerCommand>) {
        tracing::debug!("Tracker actor started");
        while let Some(command) = inbox.recv().await {
            self.handle(command);
        }
        if let Some(timers) = self.timers.take() {
            timers.cancel();
        }
        tracing::debug!("Tracker actor stopped");
    }

    fn handle(&mut self, command: TrackerCommand) {
        match command {
            TrackerCommand::Select(selection) => {
                self.recorder.select(selection);
                tracing::debug!("Selected landmark: {:?}", selection);
                self.publish(TrackerEvent::SelectionChanged { selection });
            }
            TrackerCommand::StartRecording(reply) => {
                let session_id = self.start_recording();
                let _ = reply.send(session_id);
            }
            TrackerCommand::CountdownTick(session_id) => {
                if let Some(remaining) = self.recorder.countdown_tick(session_id) {
                    tracing::trace!("Countdown: {}", remaining);
                    self.publish(TrackerEvent::Countdown {
                        session_id,
                        remaining,
                    });
                }
            }
            TrackerCommand::HardStop(session_id) => self.stop_recording(session_id),
            TrackerCommand::SyncSurface { width, height } => {
                self.surface.resize(width, height);
            }
            TrackerCommand::Estimated(poses) => {
                renderer::redraw(self.surface.as_mut(), &poses);
                if let Some(sample) = self.recorder.observe(&poses).cloned() {
                    tracing::trace!(
                        "Recorded {} at ({:.1}, {:.1})",
                        sample.part,
                        sample.position.x,
                        sample.position.y
                    );
                    self.publish(TrackerEvent::SampleRecorded { sample });
                }
            }
            TrackerCommand::Snapshot(reply) => {
                let _ = reply.send(self.recorder.snapshot());
            }
        }
    }

    fn start_recording(&mut self) -> Uuid {
        if let Some(previous) = self.timers.take() {
            tracing::debug!("Replacing the running recording session");
            previous.cancel();
        }

        let session = self.recorder.start();
        let session_id = session.id;
        tracing::info!(
            "Recording started (session={}, selection={:?})",
            session_id,
            self.recorder.selection()
        );

        self.timers = Some(SessionTimers::schedule(session_id, self.commands.clone()));
        self.publish(TrackerEvent::RecordingStarted { session_id });
        session_id
    }

    fn stop_recording(&mut self, session_id: Uuid) {
        if !self.recorder.stop(session_id) {
            tracing::trace!("Ignoring hard stop for stale session {}", session_id);
            return;
        }
        if let Some(timers) = self.timers.take() {
            timers.cancel_countdown();
        }

        let samples = self.recorder.samples().len();
        tracing::info!("Recording stopped! (session={}, samples={})", session_id, samples);
        self.publish(TrackerEvent::RecordingStopped {
            session_id,
            samples,
        });
    }

    fn publish(&self, event: TrackerEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::CommandSurface;
    use crate::pose::Keypoint;
    use crate::recorder::state::Position;
    use parking_lot::Mutex;
    use std::time::Duration;
    use tokio::time::sleep;

    fn wrist_pose(x: f64, y: f64) -> Vec<Pose> {
        vec![Pose::new(vec![
            Keypoint::new("nose", 1.0, 1.0, 0.9),
            Keypoint::new("left_wrist", x, y, 0.8),
        ])]
    }

    fn counting_surface() -> (Box<dyn DisplaySurface>, Arc<Mutex<usize>>) {
        let presents = Arc::new(Mutex::new(0));
        let counter = presents.clone();
        let surface = CommandSurface::with_presenter(move |_| *counter.lock() += 1);
        (Box::new(surface), presents)
    }

    fn drain(events: &mut broadcast::Receiver<TrackerEvent>) -> Vec<TrackerEvent> {
        let mut drained = Vec::new();
        while let Ok(event) = events.try_recv() {
            drained.push(event);
        }
        drained
    }

    #[tokio::test]
    async fn test_records_three_ticks_in_arrival_order() {
        let handle = spawn_actor(Box::new(CommandSurface::new()));
        handle.select(Some(Landmark::LeftWrist)).await.unwrap();
        handle.start_recording().await.unwrap();

        for (x, y) in [(10.0, 20.0), (30.0, 40.0), (50.0, 60.0)] {
            handle.submit_poses(wrist_pose(x, y)).await.unwrap();
        }

        let snapshot = handle.snapshot().await.unwrap();
        assert!(snapshot.is_recording);
        assert_eq!(snapshot.samples.len(), 3);
        assert!(snapshot.samples.iter().all(|s| s.part == "left_wrist"));
        assert_eq!(
            snapshot
                .samples
                .iter()
                .map(|s| s.position)
                .collect::<Vec<_>>(),
            vec![
                Position { x: 10.0, y: 20.0 },
                Position { x: 30.0, y: 40.0 },
                Position { x: 50.0, y: 60.0 },
            ]
        );
    }

    #[tokio::test]
    async fn test_unset_selection_keeps_log_empty() {
        let handle = spawn_actor(Box::new(CommandSurface::new()));
        handle.start_recording().await.unwrap();
        handle.submit_poses(wrist_pose(1.0, 2.0)).await.unwrap();
        handle.submit_poses(wrist_pose(3.0, 4.0)).await.unwrap();

        assert!(handle.snapshot().await.unwrap().samples.is_empty());
    }

    #[tokio::test]
    async fn test_estimates_before_start_are_not_recorded() {
        let (surface, presents) = counting_surface();
        let handle = spawn_actor(surface);
        handle.select(Some(Landmark::LeftWrist)).await.unwrap();
        handle.submit_poses(wrist_pose(1.0, 2.0)).await.unwrap();

        let snapshot = handle.snapshot().await.unwrap();
        assert!(snapshot.samples.is_empty());
        // The overlay is still redrawn while idle
        assert_eq!(*presents.lock(), 1);
    }

    #[tokio::test]
    async fn test_second_start_discards_first_session_samples() {
        let handle = spawn_actor(Box::new(CommandSurface::new()));
        handle.select(Some(Landmark::LeftWrist)).await.unwrap();

        let first = handle.start_recording().await.unwrap();
        handle.submit_poses(wrist_pose(1.0, 1.0)).await.unwrap();
        handle.submit_poses(wrist_pose(2.0, 2.0)).await.unwrap();

        let second = handle.start_recording().await.unwrap();
        assert_ne!(first, second);
        handle.submit_poses(wrist_pose(3.0, 3.0)).await.unwrap();

        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.session_id, Some(second));
        assert_eq!(snapshot.samples.len(), 1);
        assert_eq!(snapshot.samples[0].position.x, 3.0);
    }

    #[tokio::test]
    async fn test_selection_change_applies_to_next_tick() {
        let handle = spawn_actor(Box::new(CommandSurface::new()));
        handle.select(Some(Landmark::RightWrist)).await.unwrap();
        handle.start_recording().await.unwrap();
        handle.submit_poses(wrist_pose(1.0, 1.0)).await.unwrap();

        handle.select(Some(Landmark::LeftWrist)).await.unwrap();
        handle.submit_poses(wrist_pose(2.0, 2.0)).await.unwrap();

        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.selection, Some(Landmark::LeftWrist));
        assert_eq!(snapshot.samples.len(), 1);
        assert_eq!(snapshot.samples[0].position.x, 2.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_countdown_reaches_zero_before_hard_stop() {
        let handle = spawn_actor(Box::new(CommandSurface::new()));
        handle.start_recording().await.unwrap();

        sleep(Duration::from_millis(4_999)).await;
        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.countdown, 1);
        assert!(snapshot.is_recording);

        sleep(Duration::from_millis(2)).await;
        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.countdown, 0);
        assert!(snapshot.is_recording);
        assert_eq!(snapshot.countdown_message, None);

        sleep(Duration::from_millis(998)).await;
        assert!(handle.snapshot().await.unwrap().is_recording);

        sleep(Duration::from_millis(2)).await;
        assert!(!handle.snapshot().await.unwrap().is_recording);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hard_stop_fires_once_and_keeps_log() {
        let handle = spawn_actor(Box::new(CommandSurface::new()));
        let mut events = handle.subscribe();
        handle.select(Some(Landmark::LeftWrist)).await.unwrap();
        let session_id = handle.start_recording().await.unwrap();
        handle.submit_poses(wrist_pose(5.0, 5.0)).await.unwrap();

        sleep(Duration::from_secs(20)).await;

        let stops: Vec<_> = drain(&mut events)
            .into_iter()
            .filter(|event| matches!(event, TrackerEvent::RecordingStopped { .. }))
            .collect();
        assert_eq!(
            stops,
            vec![TrackerEvent::RecordingStopped {
                session_id,
                samples: 1
            }]
        );

        // Log outlives the session
        let snapshot = handle.snapshot().await.unwrap();
        assert!(!snapshot.is_recording);
        assert_eq!(snapshot.samples.len(), 1);

        // Ticks after the stop are drawn but not recorded
        handle.submit_poses(wrist_pose(6.0, 6.0)).await.unwrap();
        assert_eq!(handle.snapshot().await.unwrap().samples.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_replaces_timers() {
        let handle = spawn_actor(Box::new(CommandSurface::new()));
        let mut events = handle.subscribe();
        handle.start_recording().await.unwrap();

        sleep(Duration::from_secs(3)).await;
        let second = handle.start_recording().await.unwrap();

        // The first session's stop time passes without ending the second one
        sleep(Duration::from_millis(3_500)).await;
        let snapshot = handle.snapshot().await.unwrap();
        assert!(snapshot.is_recording);
        assert_eq!(snapshot.countdown, 2);

        sleep(Duration::from_secs(3)).await;
        assert!(!handle.snapshot().await.unwrap().is_recording);

        let stopped: Vec<Uuid> = drain(&mut events)
            .into_iter()
            .filter_map(|event| match event {
                TrackerEvent::RecordingStopped { session_id, .. } => Some(session_id),
                _ => None,
            })
            .collect();
        assert_eq!(stopped, vec![second]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_countdown_events() {
        let handle = spawn_actor(Box::new(CommandSurface::new()));
        let mut events = handle.subscribe();
        let session_id = handle.start_recording().await.unwrap();

        sleep(Duration::from_millis(5_500)).await;

        let remaining: Vec<u32> = drain(&mut events)
            .into_iter()
            .filter_map(|event| match event {
                TrackerEvent::Countdown {
                    session_id: id,
                    remaining,
                } if id == session_id => Some(remaining),
                _ => None,
            })
            .collect();
        assert_eq!(remaining, vec![4, 3, 2, 1, 0]);
    }

    #[tokio::test]
    async fn test_sync_surface_resizes_overlay() {
        let ops = Arc::new(Mutex::new(Vec::new()));
        let sink = ops.clone();
        let surface = CommandSurface::with_presenter(move |batch| sink.lock().extend_from_slice(batch));
        let handle = spawn_actor(Box::new(surface));

        handle.sync_surface(640, 480).await.unwrap();
        handle.submit_poses(Vec::new()).await.unwrap();
        handle.snapshot().await.unwrap();

        let ops = ops.lock();
        assert_eq!(
            ops[0],
            crate::overlay::DrawOp::Resize {
                width: 640,
                height: 480
            }
        );
        assert_eq!(
            ops[1],
            crate::overlay::DrawOp::Clear {
                x: 0.0,
                y: 0.0,
                width: 640.0,
                height: 480.0
            }
        );
    }

    #[test]
    fn test_event_serialization() {
        let event = TrackerEvent::Countdown {
            session_id: Uuid::nil(),
            remaining: 3,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "countdown");
        assert_eq!(json["remaining"], 3);
        assert!(json.get("sessionId").is_some());
    }

    #[tokio::test]
    async fn test_handle_errors_once_actor_is_gone() {
        let (commands, inbox) = mpsc::channel(1);
        let (events, _) = broadcast::channel(1);
        drop(inbox);
        let handle = TrackerHandle { commands, events };

        assert!(matches!(
            handle.snapshot().await,
            Err(TrackerError::TrackerStopped)
        ));
    }
}
