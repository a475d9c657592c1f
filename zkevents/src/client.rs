//! High-level client interface

use std::sync::Arc;

use bytes::{BufMut, Bytes, BytesMut};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, trace, warn};

use zkevents_core::{Command, EventKind, Frame, Session};
use zkevents_transport::{TcpTransport, Transport};

use crate::dispatch::{AckSender, Dispatcher};
use crate::error::{Error, Result};
use crate::events::{ChannelSink, DeviceEvent, EventSink};

/// One queued operation: a command with its payload and the handle its
/// acknowledgement completes
struct Op {
    command: Command,
    payload: Bytes,
    ack: AckSender,
}

/// Client for one access-control terminal
///
/// Connecting spawns a worker task that owns the transport and
/// processes inbound frames and queued commands as a single flow.
/// Methods never block; each awaits its acknowledgement through the
/// pending-request table.
///
/// # Examples
///
/// ```no_run
/// use zkevents::{Client, DeviceEvent};
///
/// #[tokio::main]
/// async fn main() -> zkevents::Result<()> {
///     let (client, mut events) = Client::connect_events("10.0.0.12", 4370).await?;
///
///     client.enable_events().await?;
///
///     while let Some(event) = events.recv().await {
///         match event {
///             DeviceEvent::Transaction(record) => println!("{record}"),
///             DeviceEvent::Disconnected => break,
///             _ => {}
///         }
///     }
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Client {
    ops: mpsc::UnboundedSender<Op>,
    session: Session,
}

impl Client {
    /// Connect to a device, publishing notifications to `sink`
    ///
    /// Opens the transport (3-second connect timeout, the only timeout
    /// in the protocol), performs the CONNECT handshake, captures the
    /// device-assigned session id, then spawns the worker task.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport cannot be established or the
    /// device answers the handshake with anything but ACK_OK.
    pub async fn connect(
        address: impl Into<String>,
        port: u16,
        sink: impl EventSink,
    ) -> Result<Self> {
        let transport = TcpTransport::new(address, port);
        Self::connect_transport(Box::new(transport), Arc::new(sink)).await
    }

    /// Connect and consume notifications as a channel of [`DeviceEvent`]
    pub async fn connect_events(
        address: impl Into<String>,
        port: u16,
    ) -> Result<(Self, mpsc::UnboundedReceiver<DeviceEvent>)> {
        let (sink, events) = ChannelSink::new();
        let client = Self::connect(address, port, sink).await?;
        Ok((client, events))
    }

    async fn connect_transport(
        mut transport: Box<dyn Transport>,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self> {
        info!("Connecting to {}...", transport.remote_addr());

        transport.connect().await?;

        let session = Session::new();

        // CONNECT goes out with session and reply ids both 0; the ack
        // carries the session id every later frame must echo
        let reply_id = session.next_reply_id(Command::Connect);
        let hello = Frame::outbound(Command::Connect, 0, reply_id, Bytes::new());
        trace!("Sending: {:?}", hello);

        if let Err(e) = transport.send(&hello.encode()).await {
            let _ = transport.disconnect().await;
            return Err(e.into());
        }

        let ack = match transport.receive().await.map_err(Error::from).and_then(|buf| {
            Frame::decode(buf).map_err(Error::from)
        }) {
            Ok(frame) => frame,
            Err(e) => {
                let _ = transport.disconnect().await;
                return Err(e);
            }
        };

        match ack.command_kind() {
            Some(Command::AckOk) => session.initialize(ack.session_id)?,
            _ => {
                let _ = transport.disconnect().await;
                return Err(Error::Handshake(ack.command));
            }
        }

        info!("Connected (session_id={})", session.session_id());
        sink.connected();

        let (ops, ops_rx) = mpsc::unbounded_channel();
        let worker = Worker {
            transport,
            ops: ops_rx,
            session: session.clone(),
            dispatcher: Dispatcher::new(sink),
        };
        tokio::spawn(worker.run());

        Ok(Self { ops, session })
    }

    /// Session id assigned by the device, 0 before the handshake
    pub fn session_id(&self) -> u16 {
        self.session.session_id()
    }

    /// Check if the session is established
    pub fn is_connected(&self) -> bool {
        self.session.is_connected()
    }

    /// Register for real-time events
    ///
    /// Asks the device to push every event kind; only attendance
    /// transactions have a decodable payload and reach the sink.
    pub async fn enable_events(&self) -> Result<()> {
        let mut payload = BytesMut::with_capacity(4);
        payload.put_u16_le(EventKind::All.into());
        // Machine id: meaningful on the serial variant only, always 0
        // over TCP
        payload.put_u16_le(0);

        self.command(Command::EnableEvents, payload.freeze()).await?;
        debug!("Real-time events enabled");
        Ok(())
    }

    /// Unlock the door for `seconds` seconds
    pub async fn unlock_door(&self, seconds: u16) -> Result<()> {
        let mut payload = BytesMut::with_capacity(4);
        payload.put_u16_le(seconds);
        // Machine id, as above
        payload.put_u16_le(0);

        self.command(Command::UnlockDoor, payload.freeze()).await?;
        debug!(seconds = seconds, "Door unlocked");
        Ok(())
    }

    /// End the session
    ///
    /// On the device's acknowledgement the worker closes the transport,
    /// signals `disconnected`, and exits.
    pub async fn disconnect(&self) -> Result<()> {
        self.command(Command::Disconnect, Bytes::new()).await?;
        Ok(())
    }

    async fn command(&self, command: Command, payload: Bytes) -> Result<Frame> {
        let (tx, rx) = oneshot::channel();

        self.ops
            .send(Op {
                command,
                payload,
                ack: tx,
            })
            .map_err(|_| Error::NotConnected)?;

        // A dropped sender means the worker went away with the request
        // unresolved
        rx.await.map_err(|_| Error::ConnectionLost)?
    }
}

#[derive(PartialEq)]
enum Flow {
    Continue,
    Shutdown,
}

/// Owns the transport and processes the connection as one logical flow:
/// inbound chunks and queued operations never overlap
struct Worker {
    transport: Box<dyn Transport>,
    ops: mpsc::UnboundedReceiver<Op>,
    session: Session,
    dispatcher: Dispatcher,
}

impl Worker {
    async fn run(mut self) {
        loop {
            tokio::select! {
                chunk = self.transport.receive() => match chunk {
                    Ok(buf) => {
                        if self.handle_chunk(buf) == Flow::Shutdown {
                            self.shutdown(true).await;
                            break;
                        }
                    }
                    Err(e) => {
                        // Transport failure: force close, surface the
                        // error verbatim
                        self.dispatcher.sink.error(Error::Transport(e));
                        self.shutdown(false).await;
                        break;
                    }
                },
                op = self.ops.recv() => match op {
                    Some(op) => {
                        if !self.send_command(op).await {
                            self.shutdown(false).await;
                            break;
                        }
                    }
                    // Every client handle dropped; nothing further can
                    // be sent, so the connection is torn down
                    None => {
                        self.shutdown(false).await;
                        break;
                    }
                },
            }
        }
    }

    /// Decode and route one received chunk
    ///
    /// One transport read is assumed to carry exactly one frame; see
    /// `Frame::decode`.
    fn handle_chunk(&mut self, buf: BytesMut) -> Flow {
        trace!(chunk = %hex::encode(&buf), "Inbound chunk");

        match Frame::decode(buf) {
            Ok(frame) => {
                trace!("Received: {:?}", frame);
                if self.dispatcher.dispatch(frame) == Some(Command::Disconnect) {
                    return Flow::Shutdown;
                }
            }
            // Undersized buffer: framing fault, keep reading
            Err(e) => self.dispatcher.sink.error(Error::Protocol(e)),
        }

        Flow::Continue
    }

    /// Stamp, encode, send, and register one command
    ///
    /// Returns false when the transport failed and the connection must
    /// come down.
    async fn send_command(&mut self, op: Op) -> bool {
        let reply_id = self.session.next_reply_id(op.command);
        let frame = Frame::outbound(op.command, self.session.session_id(), reply_id, op.payload);
        let bytes = frame.encode();

        trace!("Sending: {:?}", frame);

        match self.transport.send(&bytes).await {
            Ok(()) => {
                self.dispatcher
                    .pending
                    .register(reply_id, op.command, bytes.freeze(), op.ack);
                true
            }
            Err(e) => {
                let _ = op.ack.send(Err(Error::ConnectionLost));
                self.dispatcher.sink.error(Error::Transport(e));
                false
            }
        }
    }

    async fn shutdown(&mut self, graceful: bool) {
        if let Err(e) = self.transport.disconnect().await {
            warn!("Error closing transport: {}", e);
        }

        // Dropping the completion handles wakes any remaining waiters
        self.dispatcher.pending.clear();
        self.session.close();

        if graceful {
            info!("Disconnected");
            self.dispatcher.sink.disconnected();
        }
    }
}
