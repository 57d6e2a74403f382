// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Coordinator behaviour against a scripted device source.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU32, Ordering};
use std::time::Duration;

use macvolt_lib::event::CoordinatorEvent;
use macvolt_lib::protocol::{DeviceSource, Readings};
use macvolt_lib::{
    AuthError, Catalog, Coordinator, CoordinatorConfig, CoordinatorState, Credentials,
    DeviceClient, DeviceType, DeviceValue, Error, SessionTokens, StalePolicy, TransportError,
};

/// Knobs shared between a test and the source it handed to a client.
#[derive(Debug, Default)]
struct Script {
    reject_login: AtomicBool,
    fail_reads: AtomicBool,
    reject_session: AtomicBool,
    temperature: AtomicI64,
    read_delay_ms: AtomicU32,
    logins: AtomicU32,
    reads: AtomicU32,
}

#[derive(Debug, Clone)]
struct ScriptedSource(Arc<Script>);

impl DeviceSource for ScriptedSource {
    async fn login(&self, _credentials: &Credentials) -> macvolt_lib::Result<SessionTokens> {
        let n = self.0.logins.fetch_add(1, Ordering::SeqCst) + 1;
        if self.0.reject_login.load(Ordering::SeqCst) {
            return Err(AuthError::InvalidCredentials {
                code: 401,
                message: None,
            }
            .into());
        }
        Ok(SessionTokens::new(format!("token-{n}"), format!("refresh-{n}")))
    }

    async fn read_values(
        &self,
        _tokens: &SessionTokens,
        catalog: &Catalog,
    ) -> macvolt_lib::Result<Readings> {
        self.0.reads.fetch_add(1, Ordering::SeqCst);

        let delay = self.0.read_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(u64::from(delay))).await;
        }
        if self.0.reject_session.load(Ordering::SeqCst) {
            return Err(AuthError::SessionRejected { code: 401 }.into());
        }
        if self.0.fail_reads.load(Ordering::SeqCst) {
            return Err(TransportError::HttpStatus {
                status: 502,
                body: "bad gateway".to_string(),
            }
            .into());
        }

        let temperature = self.0.temperature.load(Ordering::SeqCst);
        Ok(Readings::new(
            catalog
                .iter()
                .map(|d| match d.device_type {
                    DeviceType::DoorSensor => DeviceValue::Bool(d.id % 2 == 0),
                    DeviceType::TempSensor => DeviceValue::Int(temperature),
                    DeviceType::Other => DeviceValue::Int(1),
                })
                .collect(),
        ))
    }
}

fn script() -> Arc<Script> {
    let script = Arc::new(Script::default());
    script.temperature.store(20, Ordering::SeqCst);
    script
}

fn coordinator(script: &Arc<Script>, config: CoordinatorConfig) -> Coordinator<ScriptedSource> {
    let client = DeviceClient::new(
        ScriptedSource(Arc::clone(script)),
        Credentials::new("jane.doe", "pw"),
    );
    Coordinator::new(client, config)
}

#[tokio::test]
async fn first_refresh_failure_then_host_retry() {
    let script = script();
    script.reject_login.store(true, Ordering::SeqCst);
    let coordinator = coordinator(&script, CoordinatorConfig::default());

    let err = coordinator.first_refresh().await.unwrap_err();
    assert!(matches!(err, Error::NotReady(_)));
    assert_eq!(coordinator.state(), CoordinatorState::NotReady);
    assert!(coordinator.snapshot().is_none());
    assert!(!coordinator.is_connected().await);

    // The host retries setup later.
    script.reject_login.store(false, Ordering::SeqCst);
    let snapshot = coordinator.first_refresh().await.unwrap();
    assert_eq!(snapshot.sequence, 1);
    assert_eq!(coordinator.state(), CoordinatorState::Ready);
    assert_eq!(script.logins.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn published_snapshot_matches_client_output() {
    let script = script();
    let coordinator = coordinator(&script, CoordinatorConfig::default());
    let snapshot = coordinator.first_refresh().await.unwrap();

    let mut client = DeviceClient::new(
        ScriptedSource(Arc::clone(&script)),
        Credentials::new("jane.doe", "pw"),
    );
    client.connect().await.unwrap();
    let expected = client.get_devices().await.unwrap();

    assert_eq!(snapshot.devices, expected);
    assert_eq!(
        coordinator.snapshot().unwrap().devices,
        expected,
        "published snapshot must be the refresh result"
    );
}

#[tokio::test]
async fn unique_ids_stable_across_polls() {
    let script = script();
    let coordinator = coordinator(&script, CoordinatorConfig::default());

    let first = coordinator.first_refresh().await.unwrap();
    script.temperature.store(26, Ordering::SeqCst);
    let second = coordinator.refresh().await.unwrap();

    let ids = |s: &macvolt_lib::Snapshot| {
        s.devices
            .iter()
            .map(|d| (d.unique_id.clone(), d.name.clone()))
            .collect::<Vec<_>>()
    };
    assert_eq!(ids(&first), ids(&second));
    assert_ne!(first.devices[0].value, second.devices[0].value);
    assert_eq!(second.get("jane_doe_T1").unwrap().value, DeviceValue::Int(26));
}

#[tokio::test]
async fn keep_last_good_serves_stale_snapshot() {
    let script = script();
    let coordinator = coordinator(&script, CoordinatorConfig::default());
    let good = coordinator.first_refresh().await.unwrap();

    script.fail_reads.store(true, Ordering::SeqCst);
    for n in 1..=3 {
        assert!(coordinator.refresh().await.unwrap_err().is_transport());
        assert_eq!(
            coordinator.state(),
            CoordinatorState::Stale {
                consecutive_failures: n
            }
        );
        assert!(Arc::ptr_eq(&good, &coordinator.snapshot().unwrap()));
    }

    script.fail_reads.store(false, Ordering::SeqCst);
    let fresh = coordinator.refresh().await.unwrap();
    assert_eq!(fresh.sequence, 2);
    assert_eq!(coordinator.state(), CoordinatorState::Ready);
    assert_eq!(coordinator.consecutive_failures(), 0);
}

#[tokio::test]
async fn mark_unavailable_withdraws_snapshot() {
    let script = script();
    let config =
        CoordinatorConfig::new().with_stale_policy(StalePolicy::MarkUnavailable { after: 2 });
    let coordinator = coordinator(&script, config);
    coordinator.first_refresh().await.unwrap();

    script.fail_reads.store(true, Ordering::SeqCst);
    coordinator.refresh().await.unwrap_err();
    assert!(coordinator.snapshot().is_some());
    assert_eq!(
        coordinator.state(),
        CoordinatorState::Stale {
            consecutive_failures: 1
        }
    );

    coordinator.refresh().await.unwrap_err();
    assert!(coordinator.snapshot().is_none());
    assert_eq!(
        coordinator.state(),
        CoordinatorState::Unavailable {
            consecutive_failures: 2
        }
    );
    assert!(matches!(
        coordinator.require_snapshot(),
        Err(Error::Unavailable {
            consecutive_failures: 2
        })
    ));

    script.fail_reads.store(false, Ordering::SeqCst);
    coordinator.refresh().await.unwrap();
    assert_eq!(coordinator.state(), CoordinatorState::Ready);
    assert!(coordinator.require_snapshot().is_ok());
}

#[tokio::test]
async fn rejected_session_triggers_login_on_next_refresh() {
    let script = script();
    let coordinator = coordinator(&script, CoordinatorConfig::default());
    coordinator.first_refresh().await.unwrap();
    assert_eq!(script.logins.load(Ordering::SeqCst), 1);

    script.reject_session.store(true, Ordering::SeqCst);
    assert!(coordinator.refresh().await.unwrap_err().is_auth());
    assert!(!coordinator.is_connected().await);

    script.reject_session.store(false, Ordering::SeqCst);
    coordinator.refresh().await.unwrap();
    assert_eq!(script.logins.load(Ordering::SeqCst), 2);
    assert!(coordinator.is_connected().await);
}

#[tokio::test(start_paused = true)]
async fn refresh_is_bounded_by_timeout() {
    let script = script();
    let config = CoordinatorConfig::new().with_refresh_timeout(Duration::from_secs(5));
    let coordinator = coordinator(&script, config);
    coordinator.first_refresh().await.unwrap();

    script.read_delay_ms.store(60_000, Ordering::SeqCst);
    let err = coordinator.refresh().await.unwrap_err();

    assert!(matches!(err, Error::Transport(TransportError::Timeout(5000))));
    assert!(coordinator.snapshot().is_some());
}

#[tokio::test]
async fn watchers_and_events_see_updates() {
    let script = script();
    let coordinator = coordinator(&script, CoordinatorConfig::default());
    let mut watcher = coordinator.subscribe();
    let mut events = coordinator.events();

    assert!(watcher.borrow().is_none());
    coordinator.first_refresh().await.unwrap();

    assert!(watcher.has_changed().unwrap());
    assert_eq!(
        watcher.borrow_and_update().as_ref().map(|s| s.sequence),
        Some(1)
    );

    assert_eq!(
        events.recv().await.unwrap(),
        CoordinatorEvent::Refreshed {
            sequence: 1,
            device_count: 8
        }
    );
    assert_eq!(
        events.recv().await.unwrap(),
        CoordinatorEvent::StateChanged {
            from: CoordinatorState::Uninitialized,
            to: CoordinatorState::Ready
        }
    );

    script.fail_reads.store(true, Ordering::SeqCst);
    coordinator.refresh().await.unwrap_err();
    assert!(events.recv().await.unwrap().is_failure());
    assert_eq!(
        events.recv().await.unwrap(),
        CoordinatorEvent::StateChanged {
            from: CoordinatorState::Ready,
            to: CoordinatorState::Stale {
                consecutive_failures: 1
            }
        }
    );
}

#[tokio::test(start_paused = true)]
async fn spawned_loop_polls_on_interval_and_stops() {
    let script = script();
    let config = CoordinatorConfig::new().with_poll_interval(Duration::from_secs(60));
    let coordinator = Arc::new(coordinator(&script, config));
    coordinator.first_refresh().await.unwrap();

    let handle = Arc::clone(&coordinator).spawn();

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(coordinator.snapshot().unwrap().sequence, 1);

    tokio::time::sleep(Duration::from_secs(160)).await;
    assert_eq!(coordinator.snapshot().unwrap().sequence, 4);
    assert_eq!(script.reads.load(Ordering::SeqCst), 4);

    handle.shutdown().await;
    assert!(!coordinator.is_connected().await);

    tokio::time::sleep(Duration::from_secs(600)).await;
    assert_eq!(script.reads.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn repeated_first_refresh_follows_stale_policy() {
    let script = script();
    let config =
        CoordinatorConfig::new().with_stale_policy(StalePolicy::MarkUnavailable { after: 2 });
    let coordinator = coordinator(&script, config);
    coordinator.first_refresh().await.unwrap();

    script.fail_reads.store(true, Ordering::SeqCst);
    let err = coordinator.first_refresh().await.unwrap_err();
    assert!(err.is_transport());
    assert!(!matches!(err, Error::NotReady(_)));
    assert_eq!(
        coordinator.state(),
        CoordinatorState::Stale {
            consecutive_failures: 1
        }
    );
    assert!(coordinator.snapshot().is_some());

    coordinator.refresh().await.unwrap_err();
    assert_eq!(
        coordinator.state(),
        CoordinatorState::Unavailable {
            consecutive_failures: 2
        }
    );
    assert!(coordinator.snapshot().is_none());
    assert_eq!(coordinator.state().has_data(), coordinator.snapshot().is_some());
}

#[tokio::test]
async fn withdrawal_wakes_watchers_once() {
    let script = script();
    let config =
        CoordinatorConfig::new().with_stale_policy(StalePolicy::MarkUnavailable { after: 1 });
    let coordinator = coordinator(&script, config);
    coordinator.first_refresh().await.unwrap();
    let mut watcher = coordinator.subscribe();
    watcher.borrow_and_update();

    script.fail_reads.store(true, Ordering::SeqCst);
    coordinator.refresh().await.unwrap_err();
    assert!(watcher.has_changed().unwrap());
    assert!(watcher.borrow_and_update().is_none());

    for _ in 0..3 {
        coordinator.refresh().await.unwrap_err();
        assert!(!watcher.has_changed().unwrap());
    }
    assert_eq!(
        coordinator.state(),
        CoordinatorState::Unavailable {
            consecutive_failures: 4
        }
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn woken_watcher_sees_state_matching_data() {
    let script = script();
    let config =
        CoordinatorConfig::new().with_stale_policy(StalePolicy::MarkUnavailable { after: 1 });
    let coordinator = Arc::new(coordinator(&script, config));
    coordinator.first_refresh().await.unwrap();

    let mut watcher = coordinator.subscribe();
    watcher.borrow_and_update();
    let observer = {
        let coordinator = Arc::clone(&coordinator);
        tokio::spawn(async move {
            let mut seen = Vec::new();
            while seen.len() < 2 {
                watcher.changed().await.unwrap();
                let has_snapshot = watcher.borrow_and_update().is_some();
                seen.push((has_snapshot, coordinator.state().has_data()));
            }
            seen
        })
    };

    script.fail_reads.store(true, Ordering::SeqCst);
    coordinator.refresh().await.unwrap_err();
    tokio::time::sleep(Duration::from_millis(50)).await;
    script.fail_reads.store(false, Ordering::SeqCst);
    coordinator.refresh().await.unwrap();

    let seen = observer.await.unwrap();
    assert_eq!(seen, vec![(false, false), (true, true)]);
}
