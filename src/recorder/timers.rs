//! Session timers
//!
//! Each recording session runs two independent scheduled tasks, both
//! anchored to the same start instant:
//!
//! - a countdown interval firing every [`COUNTDOWN_PERIOD`], first tick one
//!   period after start
//! - a one-shot hard stop firing [`HARD_STOP_AFTER`] after start
//!
//! They only send messages; the tracker actor decides what they mean.

use crate::recorder::state::{COUNTDOWN_PERIOD, HARD_STOP_AFTER};
use crate::recorder::tracker::TrackerCommand;
use tokio::sync::mpsc::WeakSender;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep_until, Instant};
use uuid::Uuid;

pub(crate) struct SessionTimers {
    countdown: JoinHandle<()>,
    hard_stop: JoinHandle<()>,
}

impl SessionTimers {
    /// Schedule the countdown and the hard stop for `session_id`
    pub(crate) fn schedule(session_id: Uuid, commands: WeakSender<TrackerCommand>) -> Self {
        let started = Instant::now();

        let countdown = tokio::spawn(run_countdown(session_id, started, commands.clone()));
        let hard_stop = tokio::spawn(async move {
            sleep_until(started + HARD_STOP_AFTER).await;
            if let Some(commands) = commands.upgrade() {
                let _ = commands.send(TrackerCommand::HardStop(session_id)).await;
            }
        });

        Self {
            countdown,
            hard_stop,
        }
    }

    /// Stop the countdown display; called when the hard stop fires
    pub(crate) fn cancel_countdown(&self) {
        self.countdown.abort();
    }

    /// Abort both tasks; used when a new session replaces this one
    pub(crate) fn cancel(self) {
        self.countdown.abort();
        self.hard_stop.abort();
    }
}

async fn run_countdown(session_id: Uuid, started: Instant, commands: WeakSender<TrackerCommand>) {
    let mut ticker = interval_at(started + COUNTDOWN_PERIOD, COUNTDOWN_PERIOD);
    loop {
        ticker.tick().await;
        let Some(commands) = commands.upgrade() else {
            break;
        };
        if commands
            .send(TrackerCommand::CountdownTick(session_id))
            .await
            .is_err()
        {
            break;
        }
    }
}
