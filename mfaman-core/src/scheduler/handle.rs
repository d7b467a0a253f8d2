//! Command loop driving a [`RefreshScheduler`]
//!
//! The loop is the single logical thread of the scheduler: timer fires and
//! external commands are handled one at a time, so a delete can never
//! interleave with a tick or a reload.

use crate::error::{MfaError, SchedulerError};
use crate::scheduler::refresh::RefreshScheduler;
use crate::types::Credential;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::debug;

/// Commands accepted by a running scheduler
#[derive(Debug)]
pub enum SchedulerCommand {
    /// Add a credential and reconcile
    Add {
        title: String,
        secret: String,
        reply: oneshot::Sender<Result<(), MfaError>>,
    },

    /// Delete the credential with a secret
    Delete {
        secret: String,
        reply: oneshot::Sender<Result<bool, MfaError>>,
    },

    /// Reload the persisted set and reconcile
    Reload {
        reply: oneshot::Sender<Result<(), MfaError>>,
    },

    /// Cancel every timer and stop the loop
    Shutdown,
}

impl RefreshScheduler {
    /// Run the scheduler event loop
    ///
    /// Processes timer fires and commands until `Shutdown` is received or
    /// every command sender is dropped. All timers are cancelled on exit.
    pub async fn run(mut self, mut commands: mpsc::UnboundedReceiver<SchedulerCommand>) {
        loop {
            tokio::select! {
                Some(fired) = self.next_fired() => {
                    self.handle_tick(fired);
                }

                command = commands.recv() => {
                    match command {
                        Some(SchedulerCommand::Add { title, secret, reply }) => {
                            let result = self.add_and_regenerate(&title, &secret).await;
                            let _ = reply.send(result);
                        }
                        Some(SchedulerCommand::Delete { secret, reply }) => {
                            let result = self.delete(&secret).await;
                            let _ = reply.send(result);
                        }
                        Some(SchedulerCommand::Reload { reply }) => {
                            let result = self.reload().await;
                            let _ = reply.send(result);
                        }
                        Some(SchedulerCommand::Shutdown) | None => {
                            debug!("Scheduler loop exiting");
                            break;
                        }
                    }
                }
            }
        }

        self.shutdown();
    }

    /// Spawn the event loop on the current runtime
    pub fn spawn(self) -> SchedulerHandle {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let view_rx = self.subscribe();
        let task = tokio::spawn(self.run(command_rx));

        SchedulerHandle {
            command_tx,
            view_rx,
            task,
        }
    }
}

/// Client side of a spawned scheduler
pub struct SchedulerHandle {
    command_tx: mpsc::UnboundedSender<SchedulerCommand>,
    view_rx: watch::Receiver<Vec<Credential>>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Subscribe to published credential sets
    pub fn subscribe(&self) -> watch::Receiver<Vec<Credential>> {
        self.view_rx.clone()
    }

    /// Snapshot of the currently published credential set
    pub fn view(&self) -> Vec<Credential> {
        self.view_rx.borrow().clone()
    }

    pub async fn add(&self, title: &str, secret: &str) -> Result<(), MfaError> {
        let (reply, response) = oneshot::channel();
        self.send(SchedulerCommand::Add {
            title: title.to_string(),
            secret: secret.to_string(),
            reply,
        })?;
        response.await.map_err(|_| SchedulerError::Stopped)?
    }

    pub async fn delete(&self, secret: &str) -> Result<bool, MfaError> {
        let (reply, response) = oneshot::channel();
        self.send(SchedulerCommand::Delete {
            secret: secret.to_string(),
            reply,
        })?;
        response.await.map_err(|_| SchedulerError::Stopped)?
    }

    pub async fn reload(&self) -> Result<(), MfaError> {
        let (reply, response) = oneshot::channel();
        self.send(SchedulerCommand::Reload { reply })?;
        response.await.map_err(|_| SchedulerError::Stopped)?
    }

    /// Stop the loop and wait until every timer is cancelled
    pub async fn shutdown(self) {
        let _ = self.command_tx.send(SchedulerCommand::Shutdown);
        let _ = self.task.await;
    }

    fn send(&self, command: SchedulerCommand) -> Result<(), SchedulerError> {
        self.command_tx
            .send(command)
            .map_err(|_| SchedulerError::Stopped)
    }
}
