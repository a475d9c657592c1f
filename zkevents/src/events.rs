//! Notification seam between the protocol engine and its consumers
//!
//! The engine holds an [`EventSink`] by composition and publishes every
//! occurrence through it; [`ChannelSink`] adapts the sink onto an
//! unbounded channel for callers who prefer consuming notifications as
//! an async stream.

use tokio::sync::mpsc;

use zkevents_types::AttendanceRecord;

use crate::error::Error;

/// Minimal capability the engine publishes to
pub trait EventSink: Send + Sync + 'static {
    /// Session established, session id assigned
    fn connected(&self);

    /// Session closed after a DISCONNECT acknowledgement
    fn disconnected(&self);

    /// Decoded real-time attendance transaction
    fn transaction(&self, record: AttendanceRecord);

    /// Any fault: transport, framing, correlation, device rejection
    fn error(&self, error: Error);
}

/// One notification as seen by a channel consumer
#[derive(Debug)]
pub enum DeviceEvent {
    Connected,
    Disconnected,
    Transaction(AttendanceRecord),
    Error(Error),
}

/// [`EventSink`] implementation publishing onto an unbounded channel
///
/// Sends to a dropped receiver are discarded; the engine never blocks
/// on a slow consumer.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<DeviceEvent>,
}

impl ChannelSink {
    /// Create a sink and the receiver draining it
    pub fn new() -> (Self, mpsc::UnboundedReceiver<DeviceEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelSink {
    fn connected(&self) {
        let _ = self.tx.send(DeviceEvent::Connected);
    }

    fn disconnected(&self) {
        let _ = self.tx.send(DeviceEvent::Disconnected);
    }

    fn transaction(&self, record: AttendanceRecord) {
        let _ = self.tx.send(DeviceEvent::Transaction(record));
    }

    fn error(&self, error: Error) {
        let _ = self.tx.send(DeviceEvent::Error(error));
    }
}
