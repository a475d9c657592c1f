//! Wire frame structure and encoding/decoding

use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::fmt;

use crate::{
    checksum,
    command::Command,
    constants::MAGIC,
    error::{Error, Result},
};

/// One complete protocol frame
///
/// # Wire Layout
///
/// ```text
/// ┌─────────────┬─────────────┬─────────┬──────────┬───────────┬──────────┬──────────┐
/// │    Magic    │   Length    │ Command │ Checksum │ SessionID │ ReplyID  │   Data   │
/// │   4 bytes   │ 4 bytes LE  │ 2 bytes │ 2 bytes  │  2 bytes  │ 2 bytes  │ N bytes  │
/// │ 50 50 82 7D │ (= 8 + N)   │ (LE u16)│ (LE u16) │ (LE u16)  │ (LE u16) │          │
/// └─────────────┴─────────────┴─────────┴──────────┴───────────┴──────────┴──────────┘
/// ```
///
/// All multi-byte values are little-endian. The length field counts the
/// inner payload only (the 8 header bytes plus the data section).
///
/// The command is kept as a raw `u16` so frames carrying codes outside
/// the known set survive decoding and can be reported instead of lost;
/// [`Frame::command_kind`] gives the typed view.
///
/// # Examples
///
/// ```
/// use zkevents_core::{Command, Frame};
///
/// let frame = Frame::outbound(Command::Connect, 0, 0, bytes::Bytes::new());
/// let encoded = frame.encode();
/// let decoded = Frame::decode(encoded).unwrap();
/// assert_eq!(decoded.command_kind(), Some(Command::Connect));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    /// Raw command code
    pub command: u16,

    /// Checksum over the inner payload (received value for decoded
    /// frames, precomputed for outbound ones)
    pub checksum: u16,

    /// Session identifier (assigned by device on connect); unsolicited
    /// event frames reuse this field as the event kind
    pub session_id: u16,

    /// Reply number correlating a command with its acknowledgement
    pub reply_id: u16,

    /// Data section
    pub payload: Bytes,
}

impl Frame {
    /// Outer header size: magic plus length field
    pub const TCP_HEADER_SIZE: usize = 8;

    /// Inner header size: command, checksum, session id, reply id
    pub const HEADER_SIZE: usize = 8;

    /// Smallest decodable frame: outer plus inner header, no data
    pub const MIN_SIZE: usize = Self::TCP_HEADER_SIZE + Self::HEADER_SIZE;

    /// Build an outbound frame with its checksum precomputed
    pub fn outbound(
        command: Command,
        session_id: u16,
        reply_id: u16,
        payload: impl Into<Bytes>,
    ) -> Self {
        let payload = payload.into();
        let checksum = checksum::calculate(command.into(), session_id, reply_id, &payload);

        Self {
            command: command.into(),
            checksum,
            session_id,
            reply_id,
            payload,
        }
    }

    /// Typed view of the raw command code
    pub fn command_kind(&self) -> Option<Command> {
        Command::try_from(self.command).ok()
    }

    /// Encode frame to wire bytes
    ///
    /// Output length is always `16 + payload.len()`.
    pub fn encode(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(Self::MIN_SIZE + self.payload.len());

        buf.put_slice(&MAGIC);
        buf.put_u32_le((Self::HEADER_SIZE + self.payload.len()) as u32);

        buf.put_u16_le(self.command);
        buf.put_u16_le(self.checksum);
        buf.put_u16_le(self.session_id);
        buf.put_u16_le(self.reply_id);
        buf.put_slice(&self.payload);

        buf
    }

    /// Decode a frame from one received buffer
    ///
    /// The four inner header fields are read at fixed offsets 8/10/12/14
    /// and everything from offset 16 on is the data section. Neither the
    /// magic, the length field, nor the checksum is validated here: the
    /// device enforces them on its side, and rejecting inbound frames the
    /// original firmware accepts would change observable behavior.
    ///
    /// One transport read is assumed to deliver exactly one complete
    /// frame. There is no reassembly across partial reads and no
    /// splitting of concatenated frames (documented limitation).
    ///
    /// # Errors
    ///
    /// Returns [`Error::FrameTooShort`] for buffers under 16 bytes.
    pub fn decode(mut buf: BytesMut) -> Result<Self> {
        if buf.len() < Self::MIN_SIZE {
            return Err(Error::FrameTooShort {
                expected: Self::MIN_SIZE,
                actual: buf.len(),
            });
        }

        // Skip magic and length field
        buf.advance(Self::TCP_HEADER_SIZE);

        let command = buf.get_u16_le();
        let checksum = buf.get_u16_le();
        let session_id = buf.get_u16_le();
        let reply_id = buf.get_u16_le();
        let payload = buf.freeze();

        Ok(Self {
            command,
            checksum,
            session_id,
            reply_id,
            payload,
        })
    }

    /// Recompute the checksum over this frame's fields and compare it
    /// with the stored one
    pub fn checksum_ok(&self) -> bool {
        checksum::verify(
            self.command,
            self.session_id,
            self.reply_id,
            &self.payload,
            self.checksum,
        )
    }

    /// Total encoded size
    pub fn size(&self) -> usize {
        Self::MIN_SIZE + self.payload.len()
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("command", &format!("0x{:04X}", self.command))
            .field("checksum", &format!("0x{:04X}", self.checksum))
            .field("session_id", &format!("0x{:04X}", self.session_id))
            .field("reply_id", &format!("0x{:04X}", self.reply_id))
            .field("payload_len", &self.payload.len())
            .finish()
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.command_kind() {
            Some(cmd) => write!(
                f,
                "Frame[{}](session={}, reply={}, len={})",
                cmd,
                self.session_id,
                self.reply_id,
                self.payload.len()
            ),
            None => write!(
                f,
                "Frame[0x{:04X}](session={}, reply={}, len={})",
                self.command,
                self.session_id,
                self.reply_id,
                self.payload.len()
            ),
        }
    }
}
