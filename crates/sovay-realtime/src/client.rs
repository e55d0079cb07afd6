//! The realtime client: connect, heartbeat, reconnect-with-budget, teardown.
//!
//! A single connection task exclusively owns the socket, the heartbeat
//! and reconnect timers, and the attempt counter. The [`RealtimeClient`]
//! handle is clonable and non-blocking: `connect`, `disconnect` and
//! `send` enqueue commands and return immediately.
//!
//! Inbound envelopes are parsed on the connection task but delivered to
//! listeners through a bounded queue drained by a separate dispatcher
//! task, so slow listener code never stalls the socket read loop. The
//! queue preserves frame arrival order across all event kinds.

use std::future::{Future, pending};
use std::pin::Pin;
use std::sync::Arc;

use serde_json::Value;
use sovay_core::ClientId;
use sovay_events::{Envelope, EventKind};
use tokio::sync::mpsc;
use tokio::time::{self, Instant, Interval, MissedTickBehavior, Sleep};
use tracing::{debug, info, warn};

use crate::config::RealtimeConfig;
use crate::connector::{Connection, Connector, TransportEvent, WsConnector};
use crate::error::RealtimeError;
use crate::router::{EventRouter, Subscription};
use crate::status::{ConnectionStatus, StatusBroadcaster, StatusSubscription};

/// Commands from client handles to the connection task.
enum Command {
    Connect,
    Disconnect,
    Send(Envelope),
}

/// Handle to the realtime push channel for one client session.
///
/// Construct once at application start and pass to consumers explicitly.
/// Dropping every handle tears the connection down.
#[derive(Clone)]
pub struct RealtimeClient {
    config: Arc<RealtimeConfig>,
    router: Arc<EventRouter>,
    status: Arc<StatusBroadcaster>,
    cmd_tx: mpsc::Sender<Command>,
}

impl RealtimeClient {
    /// Create a client over the production WebSocket connector.
    ///
    /// Dials immediately when the config has `auto_connect` set. Must be
    /// called from within a Tokio runtime; the connection task is spawned
    /// on it.
    #[must_use]
    pub fn new(config: RealtimeConfig) -> Self {
        Self::with_connector(config, Arc::new(WsConnector))
    }

    /// Create a client over a custom [`Connector`].
    #[must_use]
    pub fn with_connector(config: RealtimeConfig, connector: Arc<dyn Connector>) -> Self {
        let router = Arc::new(EventRouter::new());
        let status = Arc::new(StatusBroadcaster::new());
        let (cmd_tx, cmd_rx) = mpsc::channel(64);
        let (dispatch_tx, mut dispatch_rx) = mpsc::channel::<Envelope>(config.dispatch_buffer);

        // Dispatcher turn: listeners run here, never on the read loop.
        let dispatch_router = Arc::clone(&router);
        let _ = tokio::spawn(async move {
            while let Some(envelope) = dispatch_rx.recv().await {
                dispatch_router.dispatch(&envelope);
            }
        });

        let auto_connect = config.auto_connect;
        let config = Arc::new(config);
        let task = ConnectionTask::new(
            Arc::clone(&config),
            connector,
            Arc::clone(&status),
            dispatch_tx,
            cmd_rx,
        );
        let _ = tokio::spawn(task.run());

        let client = Self {
            config,
            router,
            status,
            cmd_tx,
        };
        if auto_connect {
            client.connect();
        }
        client
    }

    /// Open the connection. No-op while already open or in progress.
    pub fn connect(&self) {
        self.command(Command::Connect);
    }

    /// Close the connection and stop automatic reconnection.
    ///
    /// Safe to call when already disconnected. A later [`Self::connect`]
    /// starts over.
    pub fn disconnect(&self) {
        self.command(Command::Disconnect);
    }

    /// Transmit an envelope, fire-and-forget.
    ///
    /// Dropped with a logged warning unless the status is
    /// [`ConnectionStatus::Connected`]; there is no outbound queueing.
    pub fn send(&self, envelope: Envelope) {
        self.command(Command::Send(envelope));
    }

    /// The status holding right now.
    #[must_use]
    pub fn status(&self) -> ConnectionStatus {
        self.status.current()
    }

    /// Whether the channel is currently connected.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.status() == ConnectionStatus::Connected
    }

    /// Observe status transitions; the observer is called immediately
    /// with the current status.
    pub fn on_status_change(
        &self,
        observer: impl Fn(ConnectionStatus) + Send + Sync + 'static,
    ) -> StatusSubscription {
        self.status.on_status_change(observer)
    }

    /// Register a listener for one event kind.
    pub fn subscribe(
        &self,
        kind: EventKind,
        listener: impl Fn(&Value, &Envelope) + Send + Sync + 'static,
    ) -> Subscription {
        self.router.subscribe(kind, listener)
    }

    /// The event router this client feeds.
    #[must_use]
    pub fn router(&self) -> &Arc<EventRouter> {
        &self.router
    }

    /// This session's client token.
    #[must_use]
    pub fn client_id(&self) -> &ClientId {
        &self.config.client_id
    }

    /// The configuration the client was built with.
    #[must_use]
    pub fn config(&self) -> &RealtimeConfig {
        &self.config
    }

    fn command(&self, command: Command) {
        if self.cmd_tx.try_send(command).is_err() {
            warn!("realtime connection task is gone, command dropped");
        }
    }
}

type DialFuture = Pin<Box<dyn Future<Output = Result<Connection, RealtimeError>> + Send>>;

/// One loop turn's resolved wake-up cause.
enum Tick {
    Cmd(Option<Command>),
    Dialed(Result<Connection, RealtimeError>),
    Transport(Option<TransportEvent>),
    Ping,
    PongTimeout,
    ReconnectDue,
}

/// The task that owns the socket, both timers and the attempt counter.
struct ConnectionTask {
    config: Arc<RealtimeConfig>,
    connector: Arc<dyn Connector>,
    status: Arc<StatusBroadcaster>,
    dispatch_tx: mpsc::Sender<Envelope>,
    cmd_rx: mpsc::Receiver<Command>,
    dial: Option<DialFuture>,
    link: Option<Connection>,
    attempts: u32,
    reconnect_timer: Option<Pin<Box<Sleep>>>,
    ping_timer: Option<Interval>,
    pong_deadline: Option<Pin<Box<Sleep>>>,
}

impl ConnectionTask {
    fn new(
        config: Arc<RealtimeConfig>,
        connector: Arc<dyn Connector>,
        status: Arc<StatusBroadcaster>,
        dispatch_tx: mpsc::Sender<Envelope>,
        cmd_rx: mpsc::Receiver<Command>,
    ) -> Self {
        Self {
            config,
            connector,
            status,
            dispatch_tx,
            cmd_rx,
            dial: None,
            link: None,
            attempts: 0,
            reconnect_timer: None,
            ping_timer: None,
            pong_deadline: None,
        }
    }

    async fn run(mut self) {
        loop {
            let tick = tokio::select! {
                cmd = self.cmd_rx.recv() => Tick::Cmd(cmd),
                result = await_dial(&mut self.dial) => Tick::Dialed(result),
                event = await_transport(&mut self.link) => Tick::Transport(event),
                () = await_interval(&mut self.ping_timer) => Tick::Ping,
                () = await_sleep(&mut self.pong_deadline) => Tick::PongTimeout,
                () = await_sleep(&mut self.reconnect_timer) => Tick::ReconnectDue,
            };

            match tick {
                Tick::Cmd(Some(Command::Connect)) => self.handle_connect(),
                Tick::Cmd(Some(Command::Disconnect)) => self.handle_disconnect(),
                Tick::Cmd(Some(Command::Send(envelope))) => self.handle_send(&envelope),
                Tick::Cmd(None) => break,
                Tick::Dialed(result) => {
                    self.dial = None;
                    self.handle_dial_result(result);
                }
                Tick::Transport(event) => self.handle_transport(event),
                Tick::Ping => self.handle_ping_tick(),
                Tick::PongTimeout => {
                    self.pong_deadline = None;
                    self.handle_pong_timeout();
                }
                Tick::ReconnectDue => {
                    self.reconnect_timer = None;
                    self.handle_connect();
                }
            }
        }
        debug!(client_id = %self.config.client_id, "connection task finished");
    }

    fn handle_connect(&mut self) {
        if self.link.is_some() || self.dial.is_some() {
            debug!("already connected or connecting");
            return;
        }
        self.status.set(ConnectionStatus::Connecting);
        let url = self.config.socket_url();
        info!(%url, "connecting");
        let connector = Arc::clone(&self.connector);
        self.dial = Some(Box::pin(async move { connector.connect(&url).await }));
    }

    fn handle_dial_result(&mut self, result: Result<Connection, RealtimeError>) {
        match result {
            Ok(connection) => {
                info!(client_id = %self.config.client_id, "connected");
                self.attempts = 0;
                self.link = Some(connection);
                self.pong_deadline = None;
                let period = self.config.heartbeat_interval;
                let mut interval = time::interval_at(Instant::now() + period, period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                self.ping_timer = Some(interval);
                self.status.set(ConnectionStatus::Connected);
            }
            Err(e) => {
                warn!(error = %e, "connection failed");
                self.status.set(ConnectionStatus::Error);
                self.schedule_reconnect();
            }
        }
    }

    fn handle_disconnect(&mut self) {
        info!(client_id = %self.config.client_id, "disconnecting");
        // Exhaust the budget so no close event schedules another retry.
        self.attempts = self.config.max_reconnect_attempts;
        self.dial = None;
        self.reconnect_timer = None;
        self.ping_timer = None;
        self.pong_deadline = None;
        self.link = None;
        self.status.set(ConnectionStatus::Disconnected);
    }

    fn handle_send(&mut self, envelope: &Envelope) {
        if self.status.current() != ConnectionStatus::Connected {
            warn!(event_type = %envelope.kind, "cannot send: not connected");
            return;
        }
        self.transmit(envelope);
    }

    fn handle_transport(&mut self, event: Option<TransportEvent>) {
        match event {
            Some(TransportEvent::Frame(text)) => self.handle_frame(&text),
            Some(TransportEvent::Error(reason)) => {
                // The close that follows drives cleanup and reconnect.
                warn!(%reason, "socket error");
                self.status.set(ConnectionStatus::Error);
            }
            Some(TransportEvent::Closed) | None => self.handle_close(),
        }
    }

    fn handle_frame(&mut self, text: &str) {
        let envelope: Envelope = match serde_json::from_str(text) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(error = %e, "dropping malformed frame");
                return;
            }
        };
        debug!(event_type = %envelope.kind, "received");
        if envelope.kind == EventKind::Pong {
            self.pong_deadline = None;
        }
        match self.dispatch_tx.try_send(envelope) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(envelope)) => {
                warn!(event_type = %envelope.kind, "dispatch queue full, dropping event");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {}
        }
    }

    fn handle_close(&mut self) {
        info!(client_id = %self.config.client_id, "socket closed");
        self.link = None;
        self.ping_timer = None;
        self.pong_deadline = None;
        self.status.set(ConnectionStatus::Disconnected);
        self.schedule_reconnect();
    }

    fn handle_ping_tick(&mut self) {
        self.transmit(&Envelope::ping_now());
        self.pong_deadline = Some(Box::pin(time::sleep(self.config.pong_timeout)));
    }

    fn handle_pong_timeout(&mut self) {
        warn!(
            timeout = ?self.config.pong_timeout,
            "no pong within timeout, presuming connection dead"
        );
        self.link = None;
        self.ping_timer = None;
        self.status.set(ConnectionStatus::Disconnected);
        self.schedule_reconnect();
    }

    fn schedule_reconnect(&mut self) {
        if self.attempts >= self.config.max_reconnect_attempts {
            warn!(attempts = self.attempts, "max reconnection attempts reached");
            self.status.set(ConnectionStatus::Disconnected);
            return;
        }
        self.attempts += 1;
        self.status.set(ConnectionStatus::Reconnecting);
        info!(
            attempt = self.attempts,
            max = self.config.max_reconnect_attempts,
            delay = ?self.config.reconnect_interval,
            "scheduling reconnect"
        );
        self.reconnect_timer = Some(Box::pin(time::sleep(self.config.reconnect_interval)));
    }

    fn transmit(&mut self, envelope: &Envelope) {
        let Some(link) = &self.link else {
            warn!(event_type = %envelope.kind, "cannot send: no open socket");
            return;
        };
        match serde_json::to_string(envelope) {
            Ok(json) => {
                if link.outbound.try_send(json).is_ok() {
                    debug!(event_type = %envelope.kind, "sent");
                } else {
                    warn!(event_type = %envelope.kind, "socket write queue unavailable, dropping frame");
                }
            }
            Err(e) => warn!(error = %e, "failed to serialize outbound frame"),
        }
    }
}

// ── select! helpers: disabled sources pend forever ───────────────────────────

async fn await_dial(dial: &mut Option<DialFuture>) -> Result<Connection, RealtimeError> {
    match dial {
        Some(future) => future.as_mut().await,
        None => pending().await,
    }
}

async fn await_transport(link: &mut Option<Connection>) -> Option<TransportEvent> {
    match link {
        Some(connection) => connection.inbound.recv().await,
        None => pending().await,
    }
}

async fn await_interval(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            let _ = interval.tick().await;
        }
        None => pending().await,
    }
}

async fn await_sleep(sleep: &mut Option<Pin<Box<Sleep>>>) {
    match sleep {
        Some(sleep) => sleep.as_mut().await,
        None => pending().await,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    /// One accepted socket, seen from the test side.
    struct TestLink {
        to_client: mpsc::Sender<TransportEvent>,
        from_client: mpsc::Receiver<String>,
    }

    impl TestLink {
        async fn push_frame(&self, envelope: &Envelope) {
            let json = serde_json::to_string(envelope).unwrap();
            self.to_client.send(TransportEvent::Frame(json)).await.unwrap();
        }

        async fn push_raw(&self, text: &str) {
            self.to_client
                .send(TransportEvent::Frame(text.to_owned()))
                .await
                .unwrap();
        }

        async fn push_close(&self) {
            self.to_client.send(TransportEvent::Closed).await.unwrap();
        }

        async fn push_error(&self, reason: &str) {
            self.to_client
                .send(TransportEvent::Error(reason.to_owned()))
                .await
                .unwrap();
        }
    }

    /// Scripted connector: counts dials, optionally refuses them, and
    /// hands each accepted socket's far end to the test.
    struct MockConnector {
        dials: AtomicUsize,
        refuse: AtomicBool,
        links: Mutex<VecDeque<TestLink>>,
    }

    impl MockConnector {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                dials: AtomicUsize::new(0),
                refuse: AtomicBool::new(false),
                links: Mutex::new(VecDeque::new()),
            })
        }

        fn dial_count(&self) -> usize {
            self.dials.load(Ordering::SeqCst)
        }

        fn set_refuse(&self, refuse: bool) {
            self.refuse.store(refuse, Ordering::SeqCst);
        }

        async fn take_link(&self) -> TestLink {
            for _ in 0..1_000 {
                if let Some(link) = self.links.lock().pop_front() {
                    return link;
                }
                tokio::task::yield_now().await;
            }
            panic!("no socket was accepted");
        }
    }

    #[async_trait::async_trait]
    impl Connector for MockConnector {
        async fn connect(&self, url: &str) -> Result<Connection, RealtimeError> {
            let _ = self.dials.fetch_add(1, Ordering::SeqCst);
            if self.refuse.load(Ordering::SeqCst) {
                return Err(RealtimeError::Connect {
                    url: url.to_owned(),
                    reason: "refused by test".into(),
                });
            }
            let (outbound_tx, outbound_rx) = mpsc::channel(32);
            let (inbound_tx, inbound_rx) = mpsc::channel(32);
            self.links.lock().push_back(TestLink {
                to_client: inbound_tx,
                from_client: outbound_rx,
            });
            Ok(Connection {
                outbound: outbound_tx,
                inbound: inbound_rx,
            })
        }
    }

    fn test_config() -> RealtimeConfig {
        RealtimeConfig::new("ws://test.local/ws")
            .with_client_id("client-test")
            .with_auto_connect(false)
    }

    async fn settle() {
        for _ in 0..64 {
            tokio::task::yield_now().await;
        }
    }

    async fn wait_for_status(client: &RealtimeClient, status: ConnectionStatus) {
        for _ in 0..1_000 {
            if client.status() == status {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("status never became {status}, last = {}", client.status());
    }

    fn status_recorder(client: &RealtimeClient) -> (Arc<Mutex<Vec<ConnectionStatus>>>, StatusSubscription) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen2 = Arc::clone(&seen);
        let sub = client.on_status_change(move |status| seen2.lock().push(status));
        (seen, sub)
    }

    // ── connect / disconnect ────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn auto_connect_dials_on_construction() {
        let connector = MockConnector::new();
        let config = test_config().with_auto_connect(true);
        let client = RealtimeClient::with_connector(config, connector.clone());

        wait_for_status(&client, ConnectionStatus::Connected).await;
        assert_eq!(connector.dial_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn connect_is_idempotent_while_open() {
        let connector = MockConnector::new();
        let client = RealtimeClient::with_connector(test_config(), connector.clone());

        client.connect();
        wait_for_status(&client, ConnectionStatus::Connected).await;
        client.connect();
        client.connect();
        settle().await;

        assert_eq!(connector.dial_count(), 1);
        assert!(client.is_connected());
    }

    #[tokio::test(start_paused = true)]
    async fn status_sequence_on_successful_open() {
        let connector = MockConnector::new();
        let client = RealtimeClient::with_connector(test_config(), connector.clone());
        let (seen, _sub) = status_recorder(&client);

        client.connect();
        wait_for_status(&client, ConnectionStatus::Connected).await;

        assert_eq!(
            &*seen.lock(),
            &[
                ConnectionStatus::Disconnected,
                ConnectionStatus::Connecting,
                ConnectionStatus::Connected
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn late_status_observer_sees_current_only() {
        let connector = MockConnector::new();
        let client = RealtimeClient::with_connector(test_config(), connector.clone());
        client.connect();
        wait_for_status(&client, ConnectionStatus::Connected).await;

        let (seen, _sub) = status_recorder(&client);
        settle().await;

        assert_eq!(&*seen.lock(), &[ConnectionStatus::Connected]);
    }

    #[tokio::test(start_paused = true)]
    async fn disconnect_when_never_connected_is_safe() {
        let connector = MockConnector::new();
        let client = RealtimeClient::with_connector(test_config(), connector.clone());

        client.disconnect();
        settle().await;

        assert_eq!(client.status(), ConnectionStatus::Disconnected);
        assert_eq!(connector.dial_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn disconnect_closes_and_stays_down() {
        let connector = MockConnector::new();
        let client = RealtimeClient::with_connector(test_config(), connector.clone());
        client.connect();
        wait_for_status(&client, ConnectionStatus::Connected).await;

        client.disconnect();
        wait_for_status(&client, ConnectionStatus::Disconnected).await;

        time::advance(Duration::from_secs(60)).await;
        settle().await;
        assert_eq!(connector.dial_count(), 1, "no reconnect after disconnect");
        assert_eq!(client.status(), ConnectionStatus::Disconnected);
    }

    #[tokio::test(start_paused = true)]
    async fn connect_after_disconnect_starts_over() {
        let connector = MockConnector::new();
        let client = RealtimeClient::with_connector(test_config(), connector.clone());
        client.connect();
        wait_for_status(&client, ConnectionStatus::Connected).await;

        client.disconnect();
        wait_for_status(&client, ConnectionStatus::Disconnected).await;

        client.connect();
        wait_for_status(&client, ConnectionStatus::Connected).await;
        assert_eq!(connector.dial_count(), 2);
    }

    // ── reconnection ────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn close_schedules_fixed_interval_reconnect() {
        let connector = MockConnector::new();
        let config = test_config().with_reconnect_interval(Duration::from_millis(3_000));
        let client = RealtimeClient::with_connector(config, connector.clone());
        client.connect();
        wait_for_status(&client, ConnectionStatus::Connected).await;
        let link = connector.take_link().await;

        link.push_close().await;
        wait_for_status(&client, ConnectionStatus::Reconnecting).await;
        assert_eq!(connector.dial_count(), 1, "retry waits for the interval");

        time::advance(Duration::from_millis(3_000)).await;
        wait_for_status(&client, ConnectionStatus::Connected).await;
        assert_eq!(connector.dial_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn status_sequence_on_close_is_disconnected_then_reconnecting() {
        let connector = MockConnector::new();
        let client = RealtimeClient::with_connector(test_config(), connector.clone());
        client.connect();
        wait_for_status(&client, ConnectionStatus::Connected).await;
        let link = connector.take_link().await;

        let (seen, _sub) = status_recorder(&client);
        link.push_close().await;
        wait_for_status(&client, ConnectionStatus::Reconnecting).await;

        assert_eq!(
            &*seen.lock(),
            &[
                ConnectionStatus::Connected,
                ConnectionStatus::Disconnected,
                ConnectionStatus::Reconnecting
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn reconnect_attempts_capped_at_budget() {
        let connector = MockConnector::new();
        connector.set_refuse(true);
        let config = test_config()
            .with_auto_connect(true)
            .with_max_reconnect_attempts(3)
            .with_reconnect_interval(Duration::from_millis(100));
        let client = RealtimeClient::with_connector(config, connector.clone());

        // Initial dial plus one per budgeted retry, then nothing.
        for _ in 0..10 {
            time::advance(Duration::from_millis(100)).await;
            settle().await;
        }

        assert_eq!(connector.dial_count(), 1 + 3);
        assert_eq!(client.status(), ConnectionStatus::Disconnected);
    }

    #[tokio::test(start_paused = true)]
    async fn open_resets_attempt_counter() {
        let connector = MockConnector::new();
        let config = test_config()
            .with_max_reconnect_attempts(2)
            .with_reconnect_interval(Duration::from_millis(100));
        let client = RealtimeClient::with_connector(config, connector.clone());
        client.connect();
        wait_for_status(&client, ConnectionStatus::Connected).await;

        // Burn one attempt, reconnect successfully.
        let link = connector.take_link().await;
        link.push_close().await;
        wait_for_status(&client, ConnectionStatus::Reconnecting).await;
        time::advance(Duration::from_millis(100)).await;
        wait_for_status(&client, ConnectionStatus::Connected).await;

        // The fresh connection has the full budget again.
        let link = connector.take_link().await;
        link.push_close().await;
        wait_for_status(&client, ConnectionStatus::Reconnecting).await;
        time::advance(Duration::from_millis(100)).await;
        wait_for_status(&client, ConnectionStatus::Connected).await;

        assert_eq!(connector.dial_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn disconnect_while_reconnecting_cancels_pending_retry() {
        let connector = MockConnector::new();
        let config = test_config().with_reconnect_interval(Duration::from_millis(3_000));
        let client = RealtimeClient::with_connector(config, connector.clone());
        client.connect();
        wait_for_status(&client, ConnectionStatus::Connected).await;
        let link = connector.take_link().await;

        link.push_close().await;
        wait_for_status(&client, ConnectionStatus::Reconnecting).await;

        client.disconnect();
        wait_for_status(&client, ConnectionStatus::Disconnected).await;

        time::advance(Duration::from_millis(30_000)).await;
        settle().await;
        assert_eq!(connector.dial_count(), 1, "cancelled timer must not dial");
        assert_eq!(client.status(), ConnectionStatus::Disconnected);
    }

    #[tokio::test(start_paused = true)]
    async fn socket_error_sets_error_status_then_close_reconnects() {
        let connector = MockConnector::new();
        let client = RealtimeClient::with_connector(test_config(), connector.clone());
        client.connect();
        wait_for_status(&client, ConnectionStatus::Connected).await;
        let link = connector.take_link().await;

        link.push_error("io failure").await;
        wait_for_status(&client, ConnectionStatus::Error).await;
        assert_eq!(connector.dial_count(), 1, "error alone does not reconnect");

        link.push_close().await;
        wait_for_status(&client, ConnectionStatus::Reconnecting).await;
    }

    #[tokio::test(start_paused = true)]
    async fn dial_failure_sets_error_then_schedules_retry() {
        let connector = MockConnector::new();
        connector.set_refuse(true);
        let config = test_config().with_reconnect_interval(Duration::from_millis(500));
        let client = RealtimeClient::with_connector(config, connector.clone());
        let (seen, _sub) = status_recorder(&client);

        client.connect();
        wait_for_status(&client, ConnectionStatus::Reconnecting).await;

        assert_eq!(
            &*seen.lock(),
            &[
                ConnectionStatus::Disconnected,
                ConnectionStatus::Connecting,
                ConnectionStatus::Error,
                ConnectionStatus::Reconnecting
            ]
        );

        connector.set_refuse(false);
        time::advance(Duration::from_millis(500)).await;
        wait_for_status(&client, ConnectionStatus::Connected).await;
        assert_eq!(connector.dial_count(), 2);
    }

    // ── heartbeat and pong liveness ─────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn heartbeat_sends_exactly_one_ping_per_interval() {
        let connector = MockConnector::new();
        let config = test_config()
            .with_heartbeat_interval(Duration::from_millis(30_000))
            .with_pong_timeout(Duration::from_millis(120_000));
        let client = RealtimeClient::with_connector(config, connector.clone());
        client.connect();
        wait_for_status(&client, ConnectionStatus::Connected).await;
        let mut link = connector.take_link().await;

        time::advance(Duration::from_millis(30_000)).await;
        settle().await;
        let frame = link.from_client.try_recv().expect("one ping at +30s");
        let ping: Envelope = serde_json::from_str(&frame).unwrap();
        assert_eq!(ping.kind, EventKind::Ping);
        assert!(ping.data["timestamp"].is_string());

        // +59 999 ms total: the second ping (due at +60 000) not yet sent.
        time::advance(Duration::from_millis(29_999)).await;
        settle().await;
        assert!(link.from_client.try_recv().is_err(), "no second ping yet");
    }

    #[tokio::test(start_paused = true)]
    async fn missing_pong_closes_and_reconnects() {
        let connector = MockConnector::new();
        let config = test_config()
            .with_heartbeat_interval(Duration::from_millis(1_000))
            .with_pong_timeout(Duration::from_millis(500))
            .with_reconnect_interval(Duration::from_millis(200));
        let client = RealtimeClient::with_connector(config, connector.clone());
        client.connect();
        wait_for_status(&client, ConnectionStatus::Connected).await;
        let _link = connector.take_link().await;

        time::advance(Duration::from_millis(1_000)).await; // ping sent
        settle().await;
        time::advance(Duration::from_millis(500)).await; // pong deadline passes
        wait_for_status(&client, ConnectionStatus::Reconnecting).await;

        time::advance(Duration::from_millis(200)).await;
        wait_for_status(&client, ConnectionStatus::Connected).await;
        assert_eq!(connector.dial_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn timely_pong_keeps_connection_up() {
        let connector = MockConnector::new();
        let config = test_config()
            .with_heartbeat_interval(Duration::from_millis(1_000))
            .with_pong_timeout(Duration::from_millis(500));
        let client = RealtimeClient::with_connector(config, connector.clone());
        client.connect();
        wait_for_status(&client, ConnectionStatus::Connected).await;
        let link = connector.take_link().await;

        for _ in 0..3 {
            time::advance(Duration::from_millis(1_000)).await; // ping sent
            settle().await;
            link.push_frame(&Envelope::new(EventKind::Pong, json!({}))).await;
            settle().await;
        }

        assert!(client.is_connected());
        assert_eq!(connector.dial_count(), 1);
    }

    // ── send ────────────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn send_while_connected_transmits_json() {
        let connector = MockConnector::new();
        let client = RealtimeClient::with_connector(test_config(), connector.clone());
        client.connect();
        wait_for_status(&client, ConnectionStatus::Connected).await;
        let mut link = connector.take_link().await;

        client.send(Envelope::get_status());
        settle().await;

        let frame = link.from_client.try_recv().unwrap();
        let sent: Envelope = serde_json::from_str(&frame).unwrap();
        assert_eq!(sent.kind, EventKind::GetStatus);
    }

    #[tokio::test(start_paused = true)]
    async fn send_while_disconnected_drops_silently() {
        let connector = MockConnector::new();
        let client = RealtimeClient::with_connector(test_config(), connector.clone());

        client.send(Envelope::get_status());
        settle().await;

        assert_eq!(connector.dial_count(), 0);
        assert_eq!(client.status(), ConnectionStatus::Disconnected);
    }

    // ── inbound dispatch ────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn inbound_frame_reaches_subscribed_listener() {
        let connector = MockConnector::new();
        let client = RealtimeClient::with_connector(test_config(), connector.clone());
        client.connect();
        wait_for_status(&client, ConnectionStatus::Connected).await;
        let link = connector.take_link().await;

        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen2 = Arc::clone(&seen);
        let _sub = client.subscribe(EventKind::TinChapCreated, move |data, _| {
            seen2.lock().push(data.clone());
        });

        link.push_frame(&Envelope::new(
            EventKind::TinChapCreated,
            json!({"ma_hop_dong": "TC-0042"}),
        ))
        .await;
        settle().await;

        assert_eq!(seen.lock().len(), 1);
        assert_eq!(seen.lock()[0]["ma_hop_dong"], "TC-0042");
    }

    #[tokio::test(start_paused = true)]
    async fn frames_delivered_in_arrival_order() {
        let connector = MockConnector::new();
        let client = RealtimeClient::with_connector(test_config(), connector.clone());
        client.connect();
        wait_for_status(&client, ConnectionStatus::Connected).await;
        let link = connector.take_link().await;

        let order = Arc::new(Mutex::new(Vec::new()));
        let o1 = Arc::clone(&order);
        let o2 = Arc::clone(&order);
        let _sub_a = client.subscribe(EventKind::TinChapCreated, move |data, _| {
            o1.lock().push(data["n"].as_i64().unwrap());
        });
        let _sub_b = client.subscribe(EventKind::TraGopCreated, move |data, _| {
            o2.lock().push(data["n"].as_i64().unwrap());
        });

        for n in 0..6 {
            let kind = if n % 2 == 0 {
                EventKind::TinChapCreated
            } else {
                EventKind::TraGopCreated
            };
            link.push_frame(&Envelope::new(kind, json!({"n": n}))).await;
        }
        settle().await;

        assert_eq!(&*order.lock(), &[0, 1, 2, 3, 4, 5]);
    }

    #[tokio::test(start_paused = true)]
    async fn malformed_frame_dropped_connection_survives() {
        let connector = MockConnector::new();
        let client = RealtimeClient::with_connector(test_config(), connector.clone());
        client.connect();
        wait_for_status(&client, ConnectionStatus::Connected).await;
        let link = connector.take_link().await;

        let seen = Arc::new(Mutex::new(0usize));
        let seen2 = Arc::clone(&seen);
        let _sub = client.subscribe(EventKind::DashboardUpdated, move |_, _| {
            *seen2.lock() += 1;
        });

        link.push_raw("this is not json").await;
        link.push_raw("{\"no_type\": true}").await;
        settle().await;
        assert!(client.is_connected(), "bad frames must not close the socket");
        assert_eq!(*seen.lock(), 0);

        link.push_frame(&Envelope::new(EventKind::DashboardUpdated, json!({})))
            .await;
        settle().await;
        assert_eq!(*seen.lock(), 1, "good frames still flow afterwards");
    }

    #[tokio::test(start_paused = true)]
    async fn unsubscribed_kind_is_ignored() {
        let connector = MockConnector::new();
        let client = RealtimeClient::with_connector(test_config(), connector.clone());
        client.connect();
        wait_for_status(&client, ConnectionStatus::Connected).await;
        let link = connector.take_link().await;

        link.push_frame(&Envelope::new(EventKind::from("nobody_cares"), json!({})))
            .await;
        settle().await;
        assert!(client.is_connected());
    }
}
