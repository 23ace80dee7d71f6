// Copyright 2024 The TopoMQ Rust Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::Mutex;
use tokio::sync::OwnedMutexGuard;
use tokio::time::Instant;
use topomq_common::TopologyConfig;
use topomq_error::ConnectionError;
use topomq_error::ConnectionResult;
use tracing::error;
use tracing::info;

use crate::connection::BrokerConnection;
use crate::connection::Channel;
use crate::connection::ConnectionFactory;
use crate::listener::ConnectionEventListener;

/// Retry policy for the background reconnect loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionManagerConfig {
    /// Fixed delay between reconnect attempts.
    pub retry_interval: Duration,
    /// Total window allowed for reconnection before giving up.
    pub retry_window: Duration,
}

impl Default for ConnectionManagerConfig {
    fn default() -> Self {
        ConnectionManagerConfig {
            retry_interval: Duration::from_secs(1),
            retry_window: Duration::from_secs(5 * 60),
        }
    }
}

impl From<&TopologyConfig> for ConnectionManagerConfig {
    fn from(config: &TopologyConfig) -> Self {
        ConnectionManagerConfig {
            retry_interval: Duration::from_millis(config.reconnect_retry_interval_ms),
            retry_window: Duration::from_millis(config.reconnect_retry_window_ms),
        }
    }
}

enum ConnectionSlot<C> {
    Connected(Arc<C>),
    Down,
    Terminal,
}

/// Manages one live broker connection with automatic reconnection.
///
/// The connection slot sits behind an async mutex, the access gate. Channel
/// creation acquires the gate, so callers block while a reconnect holds it
/// and resume as soon as the connection is back. Contract for an exhausted
/// retry window: the gate is released in a terminal state and every
/// subsequent (or blocked) `create_channel` call fails directly with
/// [`ConnectionError::PermanentlyDisconnected`]; the manager must be
/// recreated to connect again.
pub struct ConnectionManager<F: ConnectionFactory> {
    factory: Arc<F>,
    slot: Arc<Mutex<ConnectionSlot<F::Connection>>>,
    listeners: Arc<RwLock<Vec<Arc<dyn ConnectionEventListener>>>>,
    terminal: Arc<AtomicBool>,
    config: ConnectionManagerConfig,
}

impl<F> ConnectionManager<F>
where
    F: ConnectionFactory + Send + Sync + 'static,
    F::Connection: 'static,
{
    /// Connects with the default retry policy (1 s interval, 5 min window).
    pub async fn connect(factory: F) -> ConnectionResult<Self> {
        Self::connect_with(factory, ConnectionManagerConfig::default()).await
    }

    pub async fn connect_with(factory: F, config: ConnectionManagerConfig) -> ConnectionResult<Self> {
        let connection = factory.new_connection().await?;
        Ok(ConnectionManager {
            factory: Arc::new(factory),
            slot: Arc::new(Mutex::new(ConnectionSlot::Connected(Arc::new(connection)))),
            listeners: Arc::new(RwLock::new(Vec::new())),
            terminal: Arc::new(AtomicBool::new(false)),
            config,
        })
    }

    /// Opens a channel on the live connection.
    ///
    /// Blocks while a reconnect is in progress and resumes promptly once
    /// reconnection succeeds or is abandoned.
    pub async fn create_channel(&self) -> ConnectionResult<Channel> {
        let slot = self.slot.lock().await;
        match &*slot {
            ConnectionSlot::Connected(connection) => connection.create_channel(),
            ConnectionSlot::Down => Err(ConnectionError::NotConnected),
            ConnectionSlot::Terminal => Err(ConnectionError::PermanentlyDisconnected),
        }
    }

    pub fn add_connection_event_listener(&self, listener: Arc<dyn ConnectionEventListener>) {
        self.listeners.write().push(listener);
    }

    pub fn remove_connection_event_listener(&self, listener: &Arc<dyn ConnectionEventListener>) {
        self.listeners.write().retain(|l| !Arc::ptr_eq(l, listener));
    }

    /// Whether the retry window was exhausted, leaving the manager terminal.
    pub fn is_permanently_disconnected(&self) -> bool {
        self.terminal.load(Ordering::SeqCst)
    }

    /// Application-initiated close: the connection is shut down and no
    /// reconnection is attempted.
    pub async fn shutdown(&self) {
        {
            let slot = self.slot.lock().await;
            if let ConnectionSlot::Connected(connection) = &*slot {
                connection.close();
            }
        }
        self.handle_shutdown(true).await;
    }

    /// Reacts to the connection shutting down. Called by the transport
    /// layer when it observes the connection closing; `initiated_by_application`
    /// distinguishes a deliberate close from an unexpected loss.
    ///
    /// Listeners are notified with the "should reconnect" flag. For an
    /// unexpected loss, the access gate is closed and a background task
    /// retries connecting every `retry_interval` until success or until
    /// `retry_window` has elapsed.
    pub async fn handle_shutdown(&self, initiated_by_application: bool) {
        let should_reconnect = !initiated_by_application;
        info!("connection closed, reconnect warranted: {}", should_reconnect);

        let mut guard = Arc::clone(&self.slot).lock_owned().await;
        *guard = ConnectionSlot::Down;

        for listener in self.listener_snapshot() {
            listener.on_connection_closed(should_reconnect);
        }

        if should_reconnect {
            // the guard moves into the reconnect task, keeping the gate
            // closed for the whole outage
            self.spawn_reconnect(guard);
        }
    }

    fn spawn_reconnect(&self, mut guard: OwnedMutexGuard<ConnectionSlot<F::Connection>>) {
        let factory = Arc::clone(&self.factory);
        let listeners = Arc::clone(&self.listeners);
        let terminal = Arc::clone(&self.terminal);
        let config = self.config;

        tokio::spawn(async move {
            let deadline = Instant::now() + config.retry_window;
            while Instant::now() < deadline {
                match factory.new_connection().await {
                    Ok(connection) => {
                        *guard = ConnectionSlot::Connected(Arc::new(connection));
                        drop(guard);
                        info!("successfully reconnected");
                        let snapshot: Vec<Arc<dyn ConnectionEventListener>> = listeners.read().clone();
                        for listener in snapshot {
                            listener.on_connection_reconnected();
                        }
                        return;
                    }
                    Err(e) => {
                        error!("reconnect attempt failed: {}", e);
                        tokio::time::sleep(config.retry_interval).await;
                    }
                }
            }
            *guard = ConnectionSlot::Terminal;
            terminal.store(true, Ordering::SeqCst);
            drop(guard);
            info!("failed to reconnect in the time allowed, will no longer attempt");
        });
    }

    fn listener_snapshot(&self) -> Vec<Arc<dyn ConnectionEventListener>> {
        self.listeners.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicU32;
    use std::sync::atomic::AtomicU64;

    use super::*;

    struct TestConnection {
        channel_counter: AtomicU64,
        open: AtomicBool,
    }

    impl TestConnection {
        fn new() -> Self {
            TestConnection {
                channel_counter: AtomicU64::new(0),
                open: AtomicBool::new(true),
            }
        }
    }

    impl BrokerConnection for TestConnection {
        fn create_channel(&self) -> ConnectionResult<Channel> {
            if !self.is_open() {
                return Err(ConnectionError::NotConnected);
            }
            Ok(Channel::new(self.channel_counter.fetch_add(1, Ordering::SeqCst)))
        }

        fn is_open(&self) -> bool {
            self.open.load(Ordering::SeqCst)
        }

        fn close(&self) {
            self.open.store(false, Ordering::SeqCst);
        }
    }

    /// Fails the first `failures` connection attempts, then succeeds.
    struct FlakyFactory {
        failures: AtomicU32,
        attempts: Arc<AtomicU32>,
    }

    impl FlakyFactory {
        fn new(failures: u32) -> Self {
            FlakyFactory {
                failures: AtomicU32::new(failures),
                attempts: Arc::new(AtomicU32::new(0)),
            }
        }

        fn reliable() -> Self {
            FlakyFactory::new(0)
        }
    }

    impl ConnectionFactory for FlakyFactory {
        type Connection = TestConnection;

        async fn new_connection(&self) -> ConnectionResult<TestConnection> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            if self.failures.load(Ordering::SeqCst) > 0 {
                self.failures.fetch_sub(1, Ordering::SeqCst);
                return Err(ConnectionError::ConnectFailed("broker unavailable".into()));
            }
            Ok(TestConnection::new())
        }
    }

    #[derive(Default)]
    struct RecordingListener {
        closed_expecting_reconnect: AtomicU32,
        closed_final: AtomicU32,
        reconnected: AtomicU32,
    }

    impl ConnectionEventListener for RecordingListener {
        fn on_connection_closed(&self, should_reconnect: bool) {
            if should_reconnect {
                self.closed_expecting_reconnect.fetch_add(1, Ordering::SeqCst);
            } else {
                self.closed_final.fetch_add(1, Ordering::SeqCst);
            }
        }

        fn on_connection_reconnected(&self) {
            self.reconnected.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn fast_config() -> ConnectionManagerConfig {
        ConnectionManagerConfig {
            retry_interval: Duration::from_secs(1),
            retry_window: Duration::from_secs(300),
        }
    }

    #[test]
    fn retry_policy_derives_from_topology_config() {
        let mut topology_config = TopologyConfig::default();
        topology_config.reconnect_retry_interval_ms = 250;
        topology_config.reconnect_retry_window_ms = 60_000;

        let config = ConnectionManagerConfig::from(&topology_config);
        assert_eq!(config.retry_interval, Duration::from_millis(250));
        assert_eq!(config.retry_window, Duration::from_secs(60));
    }

    #[tokio::test]
    async fn channels_open_on_a_live_connection() {
        let manager = ConnectionManager::connect(FlakyFactory::reliable()).await.unwrap();
        let first = manager.create_channel().await.unwrap();
        let second = manager.create_channel().await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn initial_connect_failure_propagates() {
        let factory = FlakyFactory::new(1);
        assert!(ConnectionManager::connect(factory).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn reconnect_within_window_unblocks_channel_creation() {
        let factory = FlakyFactory::new(3);
        let attempts = Arc::clone(&factory.attempts);
        let manager = ConnectionManager::connect_with(factory, fast_config()).await.unwrap();
        let listener = Arc::new(RecordingListener::default());
        manager.add_connection_event_listener(listener.clone());

        manager.handle_shutdown(false).await;
        // blocks on the gate until the background task reconnects
        manager.create_channel().await.unwrap();

        assert_eq!(listener.closed_expecting_reconnect.load(Ordering::SeqCst), 1);
        assert_eq!(listener.reconnected.load(Ordering::SeqCst), 1);
        // 1 initial + 3 failures + 1 success
        assert_eq!(attempts.load(Ordering::SeqCst), 5);
        assert!(!manager.is_permanently_disconnected());
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_window_is_terminal() {
        // enough failures to outlast the whole window
        let factory = FlakyFactory::new(u32::MAX);
        let manager = ConnectionManager::connect_with(factory, fast_config()).await.unwrap();
        let listener = Arc::new(RecordingListener::default());
        manager.add_connection_event_listener(listener.clone());

        manager.handle_shutdown(false).await;
        let err = manager.create_channel().await.unwrap_err();
        assert!(matches!(err, ConnectionError::PermanentlyDisconnected));
        assert!(manager.is_permanently_disconnected());
        assert_eq!(listener.reconnected.load(Ordering::SeqCst), 0);

        // still terminal on the next call
        assert!(matches!(
            manager.create_channel().await.unwrap_err(),
            ConnectionError::PermanentlyDisconnected
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn application_shutdown_never_reconnects() {
        let factory = FlakyFactory::reliable();
        let attempts = Arc::clone(&factory.attempts);
        let manager = ConnectionManager::connect_with(factory, fast_config()).await.unwrap();
        let listener = Arc::new(RecordingListener::default());
        manager.add_connection_event_listener(listener.clone());

        manager.shutdown().await;
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert_eq!(listener.closed_final.load(Ordering::SeqCst), 1);
        assert_eq!(listener.closed_expecting_reconnect.load(Ordering::SeqCst), 0);
        assert_eq!(listener.reconnected.load(Ordering::SeqCst), 0);
        // only the initial connect ever ran
        assert_eq!(attempts.load(Ordering::SeqCst), 1);

        let err = manager.create_channel().await.unwrap_err();
        assert!(matches!(err, ConnectionError::NotConnected));
        assert!(!manager.is_permanently_disconnected());
    }

    #[tokio::test]
    async fn removed_listeners_stop_receiving_events() {
        let manager = ConnectionManager::connect(FlakyFactory::reliable()).await.unwrap();
        let listener: Arc<RecordingListener> = Arc::new(RecordingListener::default());
        let as_dyn: Arc<dyn ConnectionEventListener> = listener.clone();
        manager.add_connection_event_listener(as_dyn.clone());
        manager.remove_connection_event_listener(&as_dyn);

        manager.shutdown().await;
        assert_eq!(listener.closed_final.load(Ordering::SeqCst), 0);
    }
}
