//! Cross-thread event bridge
//!
//! Carries everything raised on the I/O task (decoded telemetry, connection state
//! transitions, diagnostics) over to the presentation loop.
//!
//! The queue is unbounded: the I/O side never waits on the UI and no event is
//! dropped while the receiver is alive. Events from one sender arrive in the order
//! they were sent. The receiver is drained once per frame on the presentation
//! thread, so everything downstream of it runs single-threaded and lock-free.

use tokio::sync::mpsc;
use tracing::debug;

use crate::monitor::MonitorObserver;
use crate::mqtt::mqtt_handler::ConnectionState;
use crate::telemetry::TelemetryEvent;

#[derive(Debug, Clone, PartialEq)]
pub enum BridgeEvent {
    Telemetry(TelemetryEvent),
    ConnectionChanged(ConnectionState),
    Diagnostic(String),
}

pub fn channel() -> (BridgeSender, BridgeReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (BridgeSender { tx }, BridgeReceiver { rx })
}

#[derive(Debug, Clone)]
pub struct BridgeSender {
    tx: mpsc::UnboundedSender<BridgeEvent>,
}

impl BridgeSender {
    /// Hands an event to the presentation side without waiting.
    ///
    /// Returns `false` once the receiver is gone (UI closed).
    pub fn send(&self, event: BridgeEvent) -> bool {
        match self.tx.send(event) {
            Ok(()) => true,
            Err(e) => {
                debug!("Presentation side closed, dropping {:?}", e.0);
                false
            }
        }
    }

    pub fn telemetry(&self, event: TelemetryEvent) -> bool {
        self.send(BridgeEvent::Telemetry(event))
    }

    pub fn connection(&self, state: ConnectionState) -> bool {
        self.send(BridgeEvent::ConnectionChanged(state))
    }

    pub fn diagnostic(&self, message: impl Into<String>) -> bool {
        self.send(BridgeEvent::Diagnostic(message.into()))
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

#[derive(Debug)]
pub struct BridgeReceiver {
    rx: mpsc::UnboundedReceiver<BridgeEvent>,
}

impl BridgeReceiver {
    /// Delivers every queued event to `observer`, in order, without blocking.
    pub fn drain_into<O: MonitorObserver + ?Sized>(&mut self, observer: &mut O) -> usize {
        let mut delivered = 0;
        while let Ok(event) = self.rx.try_recv() {
            observer.observe(event);
            delivered += 1;
        }
        delivered
    }

    pub fn try_recv(&mut self) -> Option<BridgeEvent> {
        self.rx.try_recv().ok()
    }

    pub async fn recv(&mut self) -> Option<BridgeEvent> {
        self.rx.recv().await
    }
}
