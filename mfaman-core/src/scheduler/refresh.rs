//! Credential refresh scheduling
//!
//! [`RefreshScheduler`] owns one ticking timer per live credential, keyed by
//! the credential's secret. Each fire recomputes the countdown from the
//! stored expiry, and regenerates the code once the countdown reaches zero.
//! Every change is published as the full ordered credential set on a
//! `watch` channel.

use crate::auth::totp::{Rfc6238Generator, TotpGenerator};
use crate::config::AppConfig;
use crate::error::{CredentialError, MfaError};
use crate::scheduler::clock::{Clock, SystemClock};
use crate::scheduler::timer::{CredentialTimer, TimerFired, TimerState};
use crate::store::CredentialStore;
use crate::types::{Credential, OtpSecret};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

/// Timing behaviour of the refresh scheduler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerPolicy {
    /// Cadence of every credential timer, in milliseconds
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,

    /// Realign a timer's phase to the new expiry after each regeneration
    #[serde(default)]
    pub resync_phase: bool,
}

fn default_tick_interval() -> u64 {
    1000
}

impl Default for SchedulerPolicy {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval(),
            resync_phase: false,
        }
    }
}

impl SchedulerPolicy {
    /// Validate the entire policy
    pub fn validate(&self) -> Result<(), PolicyValidationError> {
        if self.tick_interval_ms < 100 || self.tick_interval_ms > 60_000 {
            return Err(PolicyValidationError::InvalidTickInterval(
                self.tick_interval_ms,
            ));
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

/// Validation errors for SchedulerPolicy
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PolicyValidationError {
    #[error("tick_interval_ms must be between 100 and 60000, got: {0}")]
    InvalidTickInterval(u64),
}

/// Keeps codes and countdowns of the credential set current
pub struct RefreshScheduler {
    store: CredentialStore,
    generator: Arc<dyn TotpGenerator>,
    clock: Arc<dyn Clock>,
    policy: SchedulerPolicy,
    view_tx: watch::Sender<Vec<Credential>>,
    timers: HashMap<String, CredentialTimer>,
    fired_tx: mpsc::UnboundedSender<TimerFired>,
    fired_rx: mpsc::UnboundedReceiver<TimerFired>,
    next_epoch: u64,
}

impl RefreshScheduler {
    /// Create a scheduler with an empty view and no timers
    pub fn new(
        store: CredentialStore,
        generator: Arc<dyn TotpGenerator>,
        clock: Arc<dyn Clock>,
        policy: SchedulerPolicy,
    ) -> Self {
        let (view_tx, _) = watch::channel(Vec::new());
        let (fired_tx, fired_rx) = mpsc::unbounded_channel();

        Self {
            store,
            generator,
            clock,
            policy,
            view_tx,
            timers: HashMap::new(),
            fired_tx,
            fired_rx,
            next_epoch: 0,
        }
    }

    /// Build a scheduler on the wall clock from application configuration
    pub fn from_config(config: &AppConfig) -> Result<Self, MfaError> {
        let store = config.open_store()?;
        let generator = Rfc6238Generator::new(
            config.totp.algorithm,
            config.totp.digits,
            config.totp.step_secs,
        );

        Ok(Self::new(
            store,
            Arc::new(generator),
            Arc::new(SystemClock),
            config.scheduler.clone(),
        ))
    }

    /// Subscribe to published credential sets
    pub fn subscribe(&self) -> watch::Receiver<Vec<Credential>> {
        self.view_tx.subscribe()
    }

    /// Snapshot of the currently published credential set
    pub fn view(&self) -> Vec<Credential> {
        self.view_tx.borrow().clone()
    }

    /// Number of armed credential timers
    pub fn active_timers(&self) -> usize {
        self.timers.len()
    }

    /// State of the timer owned by the credential with `secret`
    pub fn timer_state(&self, secret: &str) -> TimerState {
        let key = OtpSecret::normalized(secret);
        self.timers
            .get(key.expose())
            .map_or(TimerState::Idle, CredentialTimer::state)
    }

    /// Load the persisted set and reconcile against it
    ///
    /// On a storage failure the current view and timers stay as they are.
    pub async fn reload(&mut self) -> Result<(), MfaError> {
        let set = self.store.load().await?;
        self.reconcile(set);
        Ok(())
    }

    /// Replace the view with `new_set` and restart every timer
    ///
    /// All existing timers are cancelled before any new one is armed.
    /// Credentials without a usable code are regenerated before their timer
    /// starts, so the first published codes are never placeholders.
    pub fn reconcile(&mut self, new_set: Vec<Credential>) {
        self.cancel_all();

        let now = self.clock.now_ms();
        let mut seen = HashSet::new();
        let published: Vec<Credential> = new_set
            .into_iter()
            .filter(|credential| {
                let unique = seen.insert(credential.key().to_string());
                if !unique {
                    warn!(title = %credential.title, "Ignoring credential with a duplicate secret");
                }
                unique
            })
            .map(|mut credential| {
                credential.seconds_remaining = credential.seconds_remaining_at(now);
                credential
            })
            .collect();

        let stale: Vec<(String, bool)> = published
            .iter()
            .map(|c| (c.key().to_string(), c.needs_regeneration(now)))
            .collect();

        self.view_tx.send_replace(published);

        for (key, needs_regeneration) in stale {
            if needs_regeneration {
                self.regenerate(&key, now);
            }
            self.start_timer(key, self.policy.tick_interval());
        }

        info!(credentials = self.timers.len(), "Reconciled credential timers");
    }

    /// Add a credential, persist it, and reconcile on the reloaded set
    ///
    /// # Errors
    ///
    /// - `CredentialError` for a blank title/secret or an already registered secret
    /// - `OtpError::InvalidBase32` if no code can be generated for the secret
    /// - `StorageError` if the store cannot be read or written; the view is untouched
    pub async fn add_and_regenerate(&mut self, title: &str, secret: &str) -> Result<(), MfaError> {
        let mut credential = Credential::new(title, secret)?;

        let now = self.clock.now_ms();
        let code = self.generator.generate(&credential.secret, now)?;
        credential.apply_code(code, now);

        let mut persisted = self.store.load().await?;
        if let Some(existing) = persisted.iter().find(|c| c.key() == credential.key()) {
            return Err(CredentialError::DuplicateSecret {
                title: existing.title.clone(),
            }
            .into());
        }

        let title = credential.title.clone();
        persisted.push(credential);
        self.store.replace_all(&persisted).await?;
        info!(title = %title, "Added credential");

        self.reload().await
    }

    /// Remove the credential whose secret matches
    ///
    /// The store is written first; only after that succeeds is the
    /// credential's timer cancelled and the view republished. Other timers
    /// are left running. Returns `false` when no credential matched.
    pub async fn delete(&mut self, secret: &str) -> Result<bool, MfaError> {
        let key = OtpSecret::normalized(secret);
        let key = key.expose();

        let mut persisted = self.store.load().await?;
        let before = persisted.len();
        persisted.retain(|c| c.key() != key);
        let removed_from_store = persisted.len() != before;

        if removed_from_store {
            self.store.replace_all(&persisted).await?;
        }

        let removed_from_view = self.view_tx.send_if_modified(|set| {
            let before = set.len();
            set.retain(|c| c.key() != key);
            set.len() != before
        });

        if let Some(mut timer) = self.timers.remove(key) {
            timer.cancel();
        }

        if !removed_from_store && !removed_from_view {
            debug!("Delete requested for an unknown secret, nothing to do");
            return Ok(false);
        }

        info!(remaining = self.timers.len(), "Deleted credential");
        Ok(true)
    }

    /// Wait for the next timer fire and apply it
    pub async fn process_next_tick(&mut self) {
        if let Some(fired) = self.next_fired().await {
            self.handle_tick(fired);
        }
    }

    /// Cancel every timer; the published view is kept
    pub fn shutdown(&mut self) {
        let cancelled = self.timers.len();
        self.cancel_all();
        info!(cancelled, "Refresh scheduler stopped");
    }

    pub(crate) async fn next_fired(&mut self) -> Option<TimerFired> {
        self.fired_rx.recv().await
    }

    pub(crate) fn handle_tick(&mut self, fired: TimerFired) {
        let live = self
            .timers
            .get(&fired.key)
            .is_some_and(|timer| timer.accepts(fired.epoch));
        if !live {
            debug!(epoch = fired.epoch, "Dropping fire from a cancelled timer");
            return;
        }

        let now = self.clock.now_ms();
        let generator = &self.generator;
        let mut regenerated_until = None;

        let found = self.view_tx.send_if_modified(|set| {
            let Some(credential) = set.iter_mut().find(|c| c.key() == fired.key) else {
                return false;
            };

            let remaining = credential.seconds_remaining_at(now);
            if remaining == 0.0 {
                regenerate_credential(credential, generator.as_ref(), now);
                regenerated_until = credential.code.as_ref().map(|c| c.expires_at_ms);
            } else {
                credential.seconds_remaining = remaining;
            }
            true
        });

        if !found {
            debug!("Dropping fire for a credential no longer in view");
            return;
        }

        if self.policy.resync_phase {
            if let Some(expires_at_ms) = regenerated_until {
                self.resync(fired.key, expires_at_ms, now);
            }
        }
    }

    /// Regenerate the code of the credential with `key`, if still in view
    fn regenerate(&self, key: &str, now_ms: u64) {
        let generator = &self.generator;
        let found = self.view_tx.send_if_modified(|set| {
            match set.iter_mut().find(|c| c.key() == key) {
                Some(credential) => {
                    regenerate_credential(credential, generator.as_ref(), now_ms);
                    true
                }
                None => false,
            }
        });

        if !found {
            debug!("Dropping regeneration for a credential no longer in view");
        }
    }

    /// Replace the timer for `key` with one whose fires land on the
    /// tick boundaries counted back from `expires_at_ms`
    fn resync(&mut self, key: String, expires_at_ms: u64, now_ms: u64) {
        let period_ms = self.policy.tick_interval_ms.max(1);
        let offset = expires_at_ms.saturating_sub(now_ms) % period_ms;
        let first_delay = if offset == 0 {
            self.policy.tick_interval()
        } else {
            Duration::from_millis(offset)
        };

        debug!(first_delay_ms = first_delay.as_millis() as u64, "Resynchronizing timer phase");
        self.start_timer(key, first_delay);
    }

    fn start_timer(&mut self, key: String, first_delay: Duration) {
        self.next_epoch += 1;
        let timer = CredentialTimer::start(
            key.clone(),
            self.next_epoch,
            first_delay,
            self.policy.tick_interval(),
            self.fired_tx.clone(),
        );

        if let Some(mut previous) = self.timers.insert(key, timer) {
            previous.cancel();
        }
    }

    fn cancel_all(&mut self) {
        for (_, mut timer) in self.timers.drain() {
            timer.cancel();
        }
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

/// Run the generator for one credential, updating code and expiry together
fn regenerate_credential(credential: &mut Credential, generator: &dyn TotpGenerator, now_ms: u64) {
    match generator.generate(&credential.secret, now_ms) {
        Ok(code) => {
            debug!(
                title = %credential.title,
                expires_at_ms = code.expires_at_ms,
                "Regenerated code"
            );
            credential.apply_code(code, now_ms);
        }
        Err(e) => {
            if credential.error.is_none() {
                warn!(title = %credential.title, "Code generation failed: {}", e);
            }
            credential.mark_invalid(e.to_string());
        }
    }
}
