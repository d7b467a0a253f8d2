//! Per-credential ticking timers
//!
//! A timer is a tokio task that reports a [`TimerFired`] on a fixed
//! cadence to the scheduler loop. The timer never touches credential state
//! itself; the loop checks the fire's epoch against the live timer for
//! that key, so fires queued before a cancellation are discarded.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::trace;

/// Lifecycle of a credential timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    /// No timer armed
    Idle,
    /// Armed; fires carry this epoch
    Running { epoch: u64 },
    /// Terminal; the task has been aborted
    Cancelled,
}

impl std::fmt::Display for TimerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimerState::Idle => write!(f, "idle"),
            TimerState::Running { epoch } => write!(f, "running (epoch {})", epoch),
            TimerState::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// One delivery from a running timer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerFired {
    pub(crate) key: String,
    pub(crate) epoch: u64,
}

pub(crate) struct CredentialTimer {
    state: TimerState,
    handle: Option<JoinHandle<()>>,
}

impl CredentialTimer {
    /// Arm a timer for `key` whose first fire comes after `first_delay`
    /// and every `period` afterwards
    pub(crate) fn start(
        key: String,
        epoch: u64,
        first_delay: Duration,
        period: Duration,
        fired_tx: mpsc::UnboundedSender<TimerFired>,
    ) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + first_delay, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                trace!(epoch, "Timer fired");
                let fired = TimerFired {
                    key: key.clone(),
                    epoch,
                };
                if fired_tx.send(fired).is_err() {
                    break;
                }
            }
        });

        Self {
            state: TimerState::Running { epoch },
            handle: Some(handle),
        }
    }

    pub(crate) fn state(&self) -> TimerState {
        self.state
    }

    /// True when `epoch` belongs to this timer and it is still running
    pub(crate) fn accepts(&self, epoch: u64) -> bool {
        self.state == TimerState::Running { epoch }
    }

    /// Stop the timer; calling it again has no effect
    pub(crate) fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        self.state = TimerState::Cancelled;
    }
}

impl Drop for CredentialTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
