//! Message channel client
//!
//! A handle/worker pair around `rumqttc`. The worker owns the client, the event
//! loop and the [`ConnectionState`]; it runs as its own tokio task and is the only
//! place network I/O happens. The presentation side talks to it through
//! [`MqttHandle`] / [`MqttPublisher`] (an unbounded command queue) and hears back
//! through the [`BridgeSender`].
//!
//! ```text
//!            ┌──────────── MqttWorker<Running> ─────────────┐
//! publish ──►│ commands ─► gate on state ─► try_publish      │
//!            │ eventloop.poll ─► classify ─► bridge ─────────┼──► UI
//!            │ errors ─► Failed/Reconnecting ─► backoff      │
//! cancel ───►│ teardown (exactly once, consumes the worker)  │
//!            └───────────────────────────────────────────────┘
//! ```
//!
//! All client calls inside the worker are the non-blocking `try_*` variants; the
//! same task drives the event loop, so awaiting on the request queue could stall it.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use rumqttc::{
    AsyncClient, ConnectReturnCode, ConnectionError, Event, EventLoop, MqttOptions, Outgoing,
    Packet, QoS,
};
use statum::{machine, state};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::config::{ConnectionParams, ReconnectPolicy};
use super::topics::TopicRegistry;
use crate::bridge::BridgeSender;
use crate::telemetry::classify;

/// Capacity of rumqttc's internal request queue.
const REQUEST_CAPACITY: usize = 100;

/// Upper bound for flushing the DISCONNECT packet during teardown.
const DISCONNECT_FLUSH: Duration = Duration::from_secs(1);

#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
    Failed(FailureCode),
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "Disconnected"),
            ConnectionState::Connecting => write!(f, "Connecting..."),
            ConnectionState::Connected => write!(f, "Connected"),
            ConnectionState::Reconnecting => write!(f, "Reconnecting..."),
            ConnectionState::Failed(code) => write!(f, "Connection failed ({})", code),
        }
    }
}

/// Why the last connection attempt failed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FailureCode {
    /// CONNACK return code sent by the broker.
    Refused(u8),
    /// Socket-level failure, carrying the transport's description.
    Transport(String),
}

impl fmt::Display for FailureCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FailureCode::Refused(code) => write!(f, "{}", code),
            FailureCode::Transport(reason) => write!(f, "{}", reason),
        }
    }
}

impl From<&ConnectionError> for FailureCode {
    fn from(error: &ConnectionError) -> Self {
        match error {
            ConnectionError::ConnectionRefused(code) => FailureCode::Refused(refusal_code(code)),
            other => FailureCode::Transport(other.to_string()),
        }
    }
}

fn refusal_code(code: &ConnectReturnCode) -> u8 {
    match code {
        ConnectReturnCode::Success => 0,
        ConnectReturnCode::RefusedProtocolVersion => 1,
        ConnectReturnCode::BadClientId => 2,
        ConnectReturnCode::ServiceUnavailable => 3,
        ConnectReturnCode::BadUserNamePassword => 4,
        ConnectReturnCode::NotAuthorized => 5,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("MQTT client not connected (state: {0})")]
    NotConnected(ConnectionState),

    #[error("MQTT request rejected: {0}")]
    Request(#[from] rumqttc::ClientError),

    #[error("MQTT worker is no longer running")]
    WorkerGone,
}

/// Publishing is only attempted while connected.
pub fn check_publish(state: &ConnectionState) -> Result<(), ClientError> {
    if state.is_connected() {
        Ok(())
    } else {
        Err(ClientError::NotConnected(state.clone()))
    }
}

#[derive(Debug)]
pub enum ClientCommand {
    Publish { topic: String, payload: String },
}

#[state]
#[derive(Debug, Clone)]
pub enum WorkerState {
    Configured,
    Running,
}

#[machine]
pub struct MqttWorker<S: WorkerState> {
    client: AsyncClient,
    eventloop: EventLoop,
    params: ConnectionParams,
    policy: ReconnectPolicy,
    registry: Arc<TopicRegistry>,
    bridge: BridgeSender,
    commands: mpsc::UnboundedReceiver<ClientCommand>,
    cancel: CancellationToken,
    connection: ConnectionState,
    attempts: u32,
    retry_at: Option<Instant>,
    exhausted: bool,
}

impl<S: WorkerState> MqttWorker<S> {
    fn set_state(&mut self, next: ConnectionState) {
        if self.connection != next {
            info!("MQTT state: {} -> {}", self.connection, next);
            self.connection = next.clone();
            self.bridge.connection(next);
        }
    }

    fn diagnostic(&self, message: String) {
        debug!("{}", message);
        self.bridge.diagnostic(message);
    }
}

impl MqttWorker<Configured> {
    fn create(
        params: ConnectionParams,
        policy: ReconnectPolicy,
        registry: Arc<TopicRegistry>,
        bridge: BridgeSender,
        commands: mpsc::UnboundedReceiver<ClientCommand>,
        cancel: CancellationToken,
    ) -> Self {
        let mut options = MqttOptions::new(
            params.client_id.clone(),
            params.host.clone(),
            params.port,
        );
        options
            .set_keep_alive(params.keep_alive)
            .set_clean_session(true);

        let (client, eventloop) = AsyncClient::new(options, REQUEST_CAPACITY);

        Self::new(
            client,
            eventloop,
            params,
            policy,
            registry,
            bridge,
            commands,
            cancel,
            ConnectionState::Disconnected,
            0,
            None,
            false,
        )
    }

    /// Announces the first connection attempt. The socket is opened by the first
    /// poll of the event loop inside [`MqttWorker::run`].
    fn start(mut self) -> MqttWorker<Running> {
        self.set_state(ConnectionState::Connecting);
        self.diagnostic(format!(
            "Attempting to connect to MQTT broker at {}...",
            self.params.address()
        ));
        self.transition()
    }
}

impl MqttWorker<Running> {
    pub async fn run(mut self) {
        loop {
            let retry_at = self.retry_at;
            let polling = retry_at.is_none() && !self.exhausted;

            tokio::select! {
                biased;

                _ = self.cancel.cancelled() => {
                    debug!("Disconnect requested");
                    break;
                }
                command = self.commands.recv() => match command {
                    Some(ClientCommand::Publish { topic, payload }) => self.publish(topic, payload),
                    None => {
                        debug!("All MQTT handles dropped");
                        break;
                    }
                },
                _ = time::sleep_until(retry_at.unwrap_or_else(Instant::now)), if retry_at.is_some() => {
                    self.retry_at = None;
                    self.set_state(ConnectionState::Reconnecting);
                    self.diagnostic(format!(
                        "Reconnecting to MQTT broker at {} (attempt {})...",
                        self.params.address(),
                        self.attempts + 1
                    ));
                }
                event = self.eventloop.poll(), if polling => self.handle_event(event),
            }
        }

        self.teardown().await;
    }

    fn handle_event(&mut self, event: Result<Event, ConnectionError>) {
        match event {
            Ok(Event::Incoming(Packet::ConnAck(_))) => self.on_connected(),
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                let payload = String::from_utf8_lossy(&publish.payload);
                let event = classify(&self.registry, &publish.topic, &payload);
                self.bridge.telemetry(event);
            }
            Ok(Event::Incoming(Packet::SubAck(ack))) => {
                debug!("Subscription acknowledged (pkid {})", ack.pkid);
            }
            Ok(_) => {}
            Err(e) => self.on_connection_error(e),
        }
    }

    fn on_connected(&mut self) {
        self.attempts = 0;
        self.set_state(ConnectionState::Connected);
        self.diagnostic("Successfully connected to MQTT broker.".to_string());

        // clean session: subscriptions are redone after every CONNACK
        for topic in &self.params.topics {
            let message = match self.client.try_subscribe(topic.clone(), QoS::AtMostOnce) {
                Ok(()) => format!("Subscribed to topic: {}", topic),
                Err(e) => format!("Failed to subscribe to {}: {}", topic, e),
            };
            debug!("{}", message);
            self.bridge.diagnostic(message);
        }
    }

    fn on_connection_error(&mut self, error: ConnectionError) {
        let was_connected = self.connection.is_connected();
        let code = FailureCode::from(&error);

        // losing an established session is not a failed attempt
        if was_connected {
            warn!("MQTT connection lost: {}", error);
            self.diagnostic(format!("MQTT disconnected: {}. Reconnecting...", error));
            self.set_state(ConnectionState::Reconnecting);
        } else {
            self.attempts = self.attempts.saturating_add(1);
            warn!("MQTT connection attempt {} failed: {}", self.attempts, error);
            self.diagnostic(format!("Failed to connect, {}", error));
            self.set_state(ConnectionState::Failed(code.clone()));
        }

        if self.policy.allows(self.attempts) {
            let delay = self.policy.delay_for(self.attempts);
            debug!("Next connection attempt in {:?}", delay);
            self.retry_at = Some(Instant::now() + delay);
        } else {
            self.exhausted = true;
            self.set_state(ConnectionState::Failed(code));
            error!("Giving up on MQTT broker after {} attempts", self.attempts);
            self.diagnostic(format!(
                "Giving up on MQTT broker at {} after {} attempts.",
                self.params.address(),
                self.attempts
            ));
        }
    }

    fn publish(&mut self, topic: String, payload: String) {
        if let Err(e) = check_publish(&self.connection) {
            warn!("Dropping publish to {}: {}", topic, e);
            self.diagnostic(format!(
                "Cannot publish to {}, MQTT client not connected.",
                topic
            ));
            return;
        }

        if let Err(e) = self
            .client
            .try_publish(topic.clone(), QoS::AtMostOnce, false, payload)
        {
            self.diagnostic(format!("Error publishing to {}: {}", topic, e));
        } else {
            debug!("Queued publish to {}", topic);
        }
    }

    /// Releases the connection. Consumes the worker, so it runs once per session.
    async fn teardown(mut self) {
        self.retry_at = None;
        self.diagnostic("Stopping MQTT client...".to_string());

        if self.connection.is_connected() {
            match self.client.try_disconnect() {
                Ok(()) => {
                    let eventloop = &mut self.eventloop;
                    let flush = async {
                        loop {
                            match eventloop.poll().await {
                                Ok(Event::Outgoing(Outgoing::Disconnect)) | Err(_) => break,
                                Ok(_) => continue,
                            }
                        }
                    };
                    if time::timeout(DISCONNECT_FLUSH, flush).await.is_err() {
                        warn!("Broker did not take DISCONNECT within {:?}", DISCONNECT_FLUSH);
                    }
                }
                Err(e) => warn!("Could not queue DISCONNECT: {}", e),
            }
        }

        self.set_state(ConnectionState::Disconnected);
        self.diagnostic("MQTT client disconnected.".to_string());
        info!("MQTT worker stopped");
    }
}

/// Cheap, cloneable publishing side of the client.
#[derive(Debug, Clone)]
pub struct MqttPublisher {
    commands: mpsc::UnboundedSender<ClientCommand>,
}

impl MqttPublisher {
    /// Queues a publish for the worker. Never blocks; whether the message actually
    /// leaves depends on the connection state at the time the worker handles it.
    pub fn publish(&self, topic: String, payload: String) -> Result<(), ClientError> {
        self.commands
            .send(ClientCommand::Publish { topic, payload })
            .map_err(|_| ClientError::WorkerGone)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    Graceful,
    Aborted,
    Panicked,
}

/// Owner of the running client task.
pub struct MqttHandle {
    publisher: MqttPublisher,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl MqttHandle {
    /// Starts connecting in the background and returns immediately.
    ///
    /// Once the broker accepts the session every topic in `params.topics` is
    /// subscribed. Progress is reported through `bridge`.
    pub fn spawn(
        params: ConnectionParams,
        policy: ReconnectPolicy,
        registry: Arc<TopicRegistry>,
        bridge: BridgeSender,
    ) -> Self {
        info!(
            "Spawning MQTT client '{}' for {} ({} topics)",
            params.client_id,
            params.address(),
            params.topics.len()
        );

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        let worker =
            MqttWorker::create(params, policy, registry, bridge, command_rx, cancel.clone());
        let task = tokio::spawn(worker.start().run());

        Self {
            publisher: MqttPublisher {
                commands: command_tx,
            },
            cancel,
            task,
        }
    }

    pub fn publisher(&self) -> MqttPublisher {
        self.publisher.clone()
    }

    pub fn publish(&self, topic: String, payload: String) -> Result<(), ClientError> {
        self.publisher.publish(topic, payload)
    }

    /// Requests a graceful disconnect. Idempotent.
    pub fn disconnect(&self) {
        self.cancel.cancel();
    }

    /// Disconnects and waits for the worker, aborting it if `timeout` elapses.
    pub async fn shutdown(self, timeout: Duration) -> ShutdownOutcome {
        self.disconnect();
        let mut task = self.task;

        match time::timeout(timeout, &mut task).await {
            Ok(Ok(())) => {
                info!("MQTT client shut down");
                ShutdownOutcome::Graceful
            }
            Ok(Err(e)) => {
                error!("MQTT worker ended abnormally: {}", e);
                ShutdownOutcome::Panicked
            }
            Err(_) => {
                warn!("MQTT worker did not stop within {:?}, aborting", timeout);
                task.abort();
                ShutdownOutcome::Aborted
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::{self, BridgeEvent, BridgeReceiver};
    use crate::telemetry::TelemetryEvent;
    use std::cell::Cell;
    use std::collections::BTreeSet;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    const CONNACK: [u8; 4] = [0x20, 0x02, 0x00, 0x00];
    const SUBSCRIBE: u8 = 0x80;
    const PUBLISH: u8 = 0x30;

    fn unreachable_params() -> ConnectionParams {
        ConnectionParams {
            host: "127.0.0.1".to_string(),
            // nothing listens on tcpmux; the connect is refused immediately
            port: 1,
            client_id: "scale-monitor-test".to_string(),
            keep_alive: Duration::from_secs(5),
            topics: TopicRegistry::default().subscriptions(),
        }
    }

    fn fast_policy(max_attempts: Option<u32>) -> ReconnectPolicy {
        ReconnectPolicy {
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(20),
            max_attempts,
        }
    }

    /// Collects bridge events until `stop` matches or the deadline passes.
    async fn collect_until(
        rx: &mut BridgeReceiver,
        stop: impl Fn(&BridgeEvent) -> bool,
    ) -> Vec<BridgeEvent> {
        let mut events = Vec::new();
        let deadline = Instant::now() + Duration::from_secs(10);
        while let Ok(Some(event)) = time::timeout_at(deadline, rx.recv()).await {
            let done = stop(&event);
            events.push(event);
            if done {
                break;
            }
        }
        events
    }

    fn states(events: &[BridgeEvent]) -> Vec<ConnectionState> {
        events
            .iter()
            .filter_map(|e| match e {
                BridgeEvent::ConnectionChanged(state) => Some(state.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn publish_gate_only_opens_when_connected() {
        assert!(check_publish(&ConnectionState::Connected).is_ok());
        for state in [
            ConnectionState::Disconnected,
            ConnectionState::Connecting,
            ConnectionState::Reconnecting,
            ConnectionState::Failed(FailureCode::Refused(5)),
        ] {
            assert!(matches!(
                check_publish(&state),
                Err(ClientError::NotConnected(s)) if s == state
            ));
        }
    }

    #[test]
    fn states_render_for_the_status_line() {
        assert_eq!(ConnectionState::Connected.to_string(), "Connected");
        assert_eq!(
            ConnectionState::Failed(FailureCode::Refused(5)).to_string(),
            "Connection failed (5)"
        );
    }

    #[test]
    fn refusal_codes_follow_mqtt_3_1_1() {
        assert_eq!(refusal_code(&ConnectReturnCode::Success), 0);
        assert_eq!(refusal_code(&ConnectReturnCode::BadUserNamePassword), 4);
        assert_eq!(
            FailureCode::from(&ConnectionError::ConnectionRefused(
                ConnectReturnCode::NotAuthorized
            )),
            FailureCode::Refused(5)
        );
    }

    #[tokio::test]
    async fn publish_while_not_connected_only_reports() {
        let (tx, mut rx) = bridge::channel();
        let handle = MqttHandle::spawn(
            unreachable_params(),
            fast_policy(Some(0)),
            Arc::new(TopicRegistry::default()),
            tx,
        );

        handle
            .publish("smfm/s01/operation/tare".to_string(), "1".to_string())
            .unwrap();

        let events = collect_until(&mut rx, |e| {
            matches!(e, BridgeEvent::Diagnostic(m) if m.starts_with("Cannot publish"))
        })
        .await;

        assert!(matches!(
            events.last(),
            Some(BridgeEvent::Diagnostic(m)) if m.contains("smfm/s01/operation/tare")
        ));
        assert_eq!(states(&events).first(), Some(&ConnectionState::Connecting));
        assert!(!states(&events).contains(&ConnectionState::Connected));

        assert_eq!(
            handle.shutdown(Duration::from_secs(5)).await,
            ShutdownOutcome::Graceful
        );
    }

    #[tokio::test]
    async fn retries_follow_policy_then_give_up() {
        let (tx, mut rx) = bridge::channel();
        let handle = MqttHandle::spawn(
            unreachable_params(),
            fast_policy(Some(2)),
            Arc::new(TopicRegistry::default()),
            tx,
        );

        let events = collect_until(&mut rx, |e| {
            matches!(e, BridgeEvent::Diagnostic(m) if m.starts_with("Giving up"))
        })
        .await;
        let states = states(&events);

        assert_eq!(states.first(), Some(&ConnectionState::Connecting));
        assert_eq!(
            states
                .iter()
                .filter(|s| **s == ConnectionState::Reconnecting)
                .count(),
            2
        );
        assert!(matches!(
            states.last(),
            Some(ConnectionState::Failed(FailureCode::Transport(_)))
        ));

        handle.shutdown(Duration::from_secs(5)).await;
    }

    #[tokio::test]
    async fn shutdown_ends_in_disconnected_and_closes_publisher() {
        let (tx, mut rx) = bridge::channel();
        let handle = MqttHandle::spawn(
            unreachable_params(),
            ReconnectPolicy::default(),
            Arc::new(TopicRegistry::default()),
            tx,
        );
        let publisher = handle.publisher();
        handle.disconnect();
        handle.disconnect();

        assert_eq!(
            handle.shutdown(Duration::from_secs(5)).await,
            ShutdownOutcome::Graceful
        );

        let mut events = Vec::new();
        while let Some(event) = rx.try_recv() {
            events.push(event);
        }
        assert_eq!(states(&events).last(), Some(&ConnectionState::Disconnected));
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, BridgeEvent::Diagnostic(m) if m == "MQTT client disconnected."))
                .count(),
            1
        );
        assert!(matches!(
            publisher.publish("t".to_string(), String::new()),
            Err(ClientError::WorkerGone)
        ));
    }

    /// Reads one control packet: (fixed header byte, variable header + payload).
    async fn read_packet(stream: &mut TcpStream) -> (u8, Vec<u8>) {
        let header = stream.read_u8().await.unwrap();
        let mut length = 0usize;
        let mut shift = 0;
        loop {
            let byte = stream.read_u8().await.unwrap();
            length |= usize::from(byte & 0x7f) << shift;
            if byte & 0x80 == 0 {
                break;
            }
            shift += 7;
        }
        let mut body = vec![0; length];
        stream.read_exact(&mut body).await.unwrap();
        (header, body)
    }

    /// Accepts a session: CONNECT, CONNACK, then a SUBACK for every topic.
    async fn accept_session(listener: &TcpListener, topics: usize) -> TcpStream {
        let (mut stream, _) = listener.accept().await.unwrap();
        let (header, _) = read_packet(&mut stream).await;
        assert_eq!(header, 0x10);
        stream.write_all(&CONNACK).await.unwrap();

        let mut acked = 0;
        while acked < topics {
            let (header, body) = read_packet(&mut stream).await;
            if header & 0xf0 == SUBSCRIBE {
                stream
                    .write_all(&[0x90, 0x03, body[0], body[1], 0x00])
                    .await
                    .unwrap();
                acked += 1;
            }
        }
        stream
    }

    fn publish_frame(topic: &str, payload: &str) -> Vec<u8> {
        let length = 2 + topic.len() + payload.len();
        let mut frame = vec![PUBLISH, u8::try_from(length).unwrap()];
        frame.extend_from_slice(&(topic.len() as u16).to_be_bytes());
        frame.extend_from_slice(topic.as_bytes());
        frame.extend_from_slice(payload.as_bytes());
        frame
    }

    #[tokio::test]
    async fn reconnects_after_drop_and_publishes_once_connected() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let params = ConnectionParams {
            host: "127.0.0.1".to_string(),
            port,
            ..unreachable_params()
        };
        let topics = params.topics.len();

        let broker = tokio::spawn(async move {
            let mut first = accept_session(&listener, topics).await;
            for payload in ["12.345", "bad", "12.400"] {
                first
                    .write_all(&publish_frame("smfm/s01/measurement/weight", payload))
                    .await
                    .unwrap();
            }
            first.shutdown().await.unwrap();
            let mut rest = Vec::new();
            let _ = first.read_to_end(&mut rest).await;
            drop(first);

            let mut second = accept_session(&listener, topics).await;
            loop {
                let (header, body) = read_packet(&mut second).await;
                if header & 0xf0 == PUBLISH {
                    return (second, body);
                }
            }
        });

        let (tx, mut rx) = bridge::channel();
        let handle = MqttHandle::spawn(
            params,
            fast_policy(None),
            Arc::new(TopicRegistry::default()),
            tx,
        );

        let subscribed = Cell::new(0);
        let events = collect_until(&mut rx, |e| {
            if matches!(e, BridgeEvent::Diagnostic(m) if m.starts_with("Subscribed to topic")) {
                subscribed.set(subscribed.get() + 1);
            }
            subscribed.get() == 2 * topics
        })
        .await;

        let weights: Vec<f64> = events
            .iter()
            .filter_map(|e| match e {
                BridgeEvent::Telemetry(TelemetryEvent::WeightSample { value, .. }) => Some(*value),
                _ => None,
            })
            .collect();
        assert_eq!(weights, vec![12.345, 12.4]);
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(
                    e,
                    BridgeEvent::Telemetry(TelemetryEvent::LogEntry { text }) if text.contains("'bad'")
                ))
                .count(),
            1
        );
        assert_eq!(
            states(&events),
            vec![
                ConnectionState::Connecting,
                ConnectionState::Connected,
                ConnectionState::Reconnecting,
                ConnectionState::Connected,
            ]
        );
        assert!(events.iter().any(
            |e| matches!(e, BridgeEvent::Diagnostic(m) if m.starts_with("Reconnecting") && m.contains("(attempt 1)"))
        ));

        handle
            .publish("smfm/s01/operation/tare".to_string(), "1".to_string())
            .unwrap();
        let (_session, body) = time::timeout(Duration::from_secs(10), broker)
            .await
            .unwrap()
            .unwrap();
        let topic_len = usize::from(u16::from_be_bytes([body[0], body[1]]));
        assert_eq!(&body[2..2 + topic_len], b"smfm/s01/operation/tare");
        assert_eq!(&body[2 + topic_len..], b"1");

        assert_eq!(
            handle.shutdown(Duration::from_secs(5)).await,
            ShutdownOutcome::Graceful
        );
    }

    #[test]
    fn subscriptions_come_from_the_registry() {
        let params = unreachable_params();
        let expected: BTreeSet<String> = TopicRegistry::default().subscriptions();
        assert_eq!(params.topics, expected);
    }
}
