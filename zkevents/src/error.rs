//! High-level error types

use bytes::Bytes;

use zkevents_core::{Command, Frame};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Protocol error: {0}")]
    Protocol(#[from] zkevents_core::Error),

    #[error("Transport error: {0}")]
    Transport(#[from] zkevents_transport::Error),

    #[error("Event decode error: {0}")]
    Event(#[from] zkevents_types::Error),

    /// The device answered a command with ACK_ERROR; delivered to the
    /// waiter of that command
    #[error("Device rejected {command} (reply {reply_id})")]
    CommandRejected { command: Command, reply_id: u16 },

    /// The device answered a command with ACK_ERROR; published on the
    /// error channel with the frame bytes originally sent
    #[error("Packet send error: device returned ACK_ERROR for reply {reply_id}")]
    PacketSendErr {
        reply_id: u16,
        request: Option<Bytes>,
    },

    /// Inbound frame carried a command code outside the known set
    #[error("Unknown packet type: {frame}")]
    PacketTypeUnk { frame: Frame },

    /// ACK_OK referenced a reply id with no request in flight
    #[error("Acknowledgement for unknown reply id {0}")]
    UnmatchedReply(u16),

    /// The CONNECT handshake was answered with something other than
    /// ACK_OK
    #[error("Unexpected handshake reply: 0x{0:04X}")]
    Handshake(u16),

    #[error("Device not connected")]
    NotConnected,

    #[error("Connection lost before acknowledgement")]
    ConnectionLost,
}

impl Error {
    /// Stable fault code for faults that have one on the wire-era
    /// surface
    pub fn code(&self) -> Option<&'static str> {
        match self {
            Self::PacketSendErr { .. } => Some("PACKETSENDERR"),
            Self::PacketTypeUnk { .. } => Some("PACKETTYPEUNK"),
            _ => None,
        }
    }
}
