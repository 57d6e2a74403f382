// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The polling coordinator.

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::{Mutex, broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::client::DeviceClient;
use crate::device::{DeviceSnapshot, Snapshot};
use crate::error::{Error, Result, TransportError};
use crate::event::{CoordinatorEvent, EventBus};
use crate::protocol::DeviceSource;

use super::{CoordinatorConfig, CoordinatorState};

/// Bookkeeping updated after every refresh.
#[derive(Debug, Default)]
struct Progress {
    state: CoordinatorState,
    consecutive_failures: u32,
    sequence: u64,
}

/// Polls a [`DeviceClient`] and publishes the latest [`Snapshot`].
///
/// Refreshes are serialized: the client sits behind an async mutex and is
/// only touched from inside a refresh. The published snapshot lives in a
/// watch channel as an `Arc<Snapshot>`, so readers always get a complete
/// snapshot that no one mutates.
#[derive(Debug)]
pub struct Coordinator<S> {
    client: Mutex<DeviceClient<S>>,
    controller_name: String,
    config: CoordinatorConfig,
    progress: RwLock<Progress>,
    snapshot_tx: watch::Sender<Option<Arc<Snapshot>>>,
    event_bus: EventBus,
}

impl<S: DeviceSource> Coordinator<S> {
    /// Creates a coordinator around `client`. Nothing is polled until
    /// [`first_refresh`](Self::first_refresh) is called.
    #[must_use]
    pub fn new(client: DeviceClient<S>, config: CoordinatorConfig) -> Self {
        let controller_name = client.controller_name();
        let (snapshot_tx, _) = watch::channel(None);

        Self {
            client: Mutex::new(client),
            controller_name,
            config,
            progress: RwLock::new(Progress::default()),
            snapshot_tx,
            event_bus: EventBus::new(),
        }
    }

    /// Returns the controller name of the polled account.
    #[must_use]
    pub fn controller_name(&self) -> &str {
        &self.controller_name
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> CoordinatorState {
        self.progress.read().state
    }

    /// Returns the number of failed refreshes since the last success.
    #[must_use]
    pub fn consecutive_failures(&self) -> u32 {
        self.progress.read().consecutive_failures
    }

    /// Returns the published snapshot, if any.
    #[must_use]
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.snapshot_tx.borrow().clone()
    }

    /// Returns the published snapshot or the reason there is none.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unavailable` when no snapshot is published.
    pub fn require_snapshot(&self) -> Result<Arc<Snapshot>> {
        self.snapshot().ok_or_else(|| Error::Unavailable {
            consecutive_failures: self.consecutive_failures(),
        })
    }

    /// Watches the published snapshot.
    ///
    /// The receiver sees `None` until the first success, and again if the
    /// snapshot is withdrawn under [`StalePolicy::MarkUnavailable`](super::StalePolicy::MarkUnavailable).
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<Snapshot>>> {
        self.snapshot_tx.subscribe()
    }

    /// Subscribes to refresh and state-change events.
    #[must_use]
    pub fn events(&self) -> broadcast::Receiver<CoordinatorEvent> {
        self.event_bus.subscribe()
    }

    /// Runs the first refresh of a setup attempt.
    ///
    /// Connects, polls and publishes. No retry is attempted here. Once a
    /// first refresh has succeeded, this behaves like
    /// [`refresh`](Self::refresh).
    ///
    /// # Errors
    ///
    /// Returns `Error::NotReady` wrapping the cause if the refresh fails; the
    /// coordinator then stays in [`CoordinatorState::NotReady`] until a later
    /// attempt succeeds. On an initialized coordinator the cause is returned
    /// as is and handled by the stale policy.
    pub async fn first_refresh(&self) -> Result<Arc<Snapshot>> {
        if self.state().is_initialized() {
            return self.next_refresh().await;
        }

        match self.poll().await {
            Ok(devices) => Ok(self.publish(devices)),
            Err(e) => {
                tracing::warn!(
                    controller = %self.controller_name,
                    error = %e,
                    "First refresh failed, coordinator not ready"
                );
                let (failures, from) = {
                    let mut progress = self.progress.write();
                    progress.consecutive_failures += 1;
                    let from = std::mem::replace(&mut progress.state, CoordinatorState::NotReady);
                    (progress.consecutive_failures, from)
                };
                self.event_bus.publish(CoordinatorEvent::RefreshFailed {
                    error: e.to_string(),
                    consecutive_failures: failures,
                });
                self.state_changed(from, CoordinatorState::NotReady);
                Err(Error::NotReady(Box::new(e)))
            }
        }
    }

    /// Polls once and publishes the result.
    ///
    /// Before the first success this behaves like
    /// [`first_refresh`](Self::first_refresh). Afterwards a failure is
    /// handled according to the configured stale policy and returned.
    ///
    /// # Errors
    ///
    /// Returns the error of the failed connect or poll.
    pub async fn refresh(&self) -> Result<Arc<Snapshot>> {
        if !self.state().is_initialized() {
            return self.first_refresh().await;
        }
        self.next_refresh().await
    }

    async fn next_refresh(&self) -> Result<Arc<Snapshot>> {
        match self.poll().await {
            Ok(devices) => Ok(self.publish(devices)),
            Err(e) => {
                self.record_failure(&e);
                Err(e)
            }
        }
    }

    /// Returns true if the client currently holds a session.
    ///
    /// Waits for any refresh in progress.
    pub async fn is_connected(&self) -> bool {
        self.client.lock().await.is_connected()
    }

    /// Disconnects the client. The published snapshot is left as is.
    pub async fn shutdown(&self) {
        self.client.lock().await.disconnect();
    }

    /// Connects if needed and reads all devices, bounded by the refresh timeout.
    async fn poll(&self) -> Result<Vec<DeviceSnapshot>> {
        let mut client = self.client.lock().await;
        let timeout = self.config.refresh_timeout();

        let attempt = async {
            if !client.is_connected() {
                client.connect().await?;
            }
            client.get_devices().await
        };

        match tokio::time::timeout(timeout, attempt).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout(
                u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            )
            .into()),
        }
    }

    fn publish(&self, devices: Vec<DeviceSnapshot>) -> Arc<Snapshot> {
        // State and data change together so a woken watcher sees both.
        let (snapshot, from) = {
            let mut progress = self.progress.write();
            progress.sequence += 1;
            progress.consecutive_failures = 0;
            let from = std::mem::replace(&mut progress.state, CoordinatorState::Ready);
            (Arc::new(Snapshot::new(progress.sequence, devices)), from)
        };

        self.snapshot_tx.send_replace(Some(Arc::clone(&snapshot)));

        tracing::debug!(
            controller = %self.controller_name,
            sequence = snapshot.sequence,
            devices = snapshot.len(),
            "Published snapshot"
        );

        self.event_bus.publish(CoordinatorEvent::Refreshed {
            sequence: snapshot.sequence,
            device_count: snapshot.len(),
        });
        self.state_changed(from, CoordinatorState::Ready);

        snapshot
    }

    fn record_failure(&self, error: &Error) {
        let (failures, withdraw, from, to) = {
            let mut progress = self.progress.write();
            progress.consecutive_failures += 1;
            let failures = progress.consecutive_failures;
            let withdraw = self.config.stale_policy().withdraws_after(failures);
            let to = if withdraw {
                CoordinatorState::Unavailable {
                    consecutive_failures: failures,
                }
            } else {
                CoordinatorState::Stale {
                    consecutive_failures: failures,
                }
            };
            let from = std::mem::replace(&mut progress.state, to);
            (failures, withdraw, from, to)
        };

        tracing::warn!(
            controller = %self.controller_name,
            error = %error,
            consecutive_failures = failures,
            "Refresh failed"
        );

        self.event_bus.publish(CoordinatorEvent::RefreshFailed {
            error: error.to_string(),
            consecutive_failures: failures,
        });

        if withdraw {
            // Watchers are only woken when a snapshot is actually withdrawn.
            self.snapshot_tx.send_if_modified(|current| current.take().is_some());
        }
        self.state_changed(from, to);
    }

    fn state_changed(&self, from: CoordinatorState, to: CoordinatorState) {
        if from == to {
            return;
        }

        // Failure counts change on every failed poll; only log kind changes.
        if std::mem::discriminant(&from) != std::mem::discriminant(&to) {
            tracing::info!(controller = %self.controller_name, from = %from, to = %to, "Coordinator state changed");
        }
        self.event_bus
            .publish(CoordinatorEvent::StateChanged { from, to });
    }
}

impl<S: DeviceSource + 'static> Coordinator<S> {
    /// Starts polling every [`poll_interval`](CoordinatorConfig::poll_interval)
    /// on the tokio runtime.
    ///
    /// The first tick fires one interval from now, since the first refresh
    /// is expected to have run already. A tick that comes due while a slow
    /// refresh is still running is delayed rather than fired in a burst.
    /// Polling stops, and the client is disconnected, when the returned
    /// handle is shut down or dropped.
    #[must_use = "dropping the handle stops polling"]
    pub fn spawn(self: Arc<Self>) -> PollHandle {
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let period = self.config.poll_interval();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        // Failures are recorded and logged by refresh itself.
                        let _ = self.refresh().await;
                    }
                    _ = stop_rx.changed() => break,
                }
            }

            tracing::debug!(controller = %self.controller_name, "Polling stopped");
            self.shutdown().await;
        });

        PollHandle {
            stop: stop_tx,
            task,
        }
    }
}

/// Handle to a polling task started with [`Coordinator::spawn`].
#[derive(Debug)]
pub struct PollHandle {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl PollHandle {
    /// Returns true if the polling task has ended.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stops polling after any refresh in progress and waits for the task.
    pub async fn shutdown(self) {
        let _ = self.stop.send(true);
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "Polling task ended abnormally");
        }
    }
}
