//! Protocol command and real-time event code definitions

use std::fmt;

use crate::error::{Error, Result};

/// Protocol command codes
///
/// The TCP-framed ZKTeco access-control protocol uses this fixed command
/// set: four client requests, two device-state toggles, and the two
/// acknowledgement codes the device answers with.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Command {
    // Session commands
    Connect = 0x03E8,
    Disconnect = 0x03E9,
    EnableDevice = 0x03EA,
    DisableDevice = 0x03EB,

    // Door control
    UnlockDoor = 0x001F,

    // Real-time event registration; also the tag the device stamps on
    // every unsolicited event frame it pushes afterwards
    EnableEvents = 0x01F4,

    // Response commands (from device)
    AckOk = 0x07D0,
    AckError = 0x07D1,
}

impl Command {
    /// Check if this is a request command (from client to device)
    pub fn is_request(self) -> bool {
        !self.is_response()
    }

    /// Check if this is a response command (from device to client)
    pub fn is_response(self) -> bool {
        matches!(self, Self::AckOk | Self::AckError)
    }

    /// Check if this is a success response
    pub fn is_success(self) -> bool {
        matches!(self, Self::AckOk)
    }

    /// Check if this is an error response
    pub fn is_error(self) -> bool {
        matches!(self, Self::AckError)
    }

    /// Get command name
    pub fn name(self) -> &'static str {
        match self {
            Self::Connect => "CMD_CONNECT",
            Self::Disconnect => "CMD_DISCONNECT",
            Self::EnableDevice => "CMD_ENABLEDEVICE",
            Self::DisableDevice => "CMD_DISABLEDEVICE",
            Self::UnlockDoor => "CMD_UNLOCK_DOOR",
            Self::EnableEvents => "CMD_ENABLE_EVENTS",
            Self::AckOk => "CMD_ACK_OK",
            Self::AckError => "CMD_ACK_ERROR",
        }
    }
}

impl From<Command> for u16 {
    fn from(cmd: Command) -> u16 {
        cmd as u16
    }
}

impl TryFrom<u16> for Command {
    type Error = Error;

    fn try_from(value: u16) -> Result<Self> {
        match value {
            0x03E8 => Ok(Self::Connect),
            0x03E9 => Ok(Self::Disconnect),
            0x03EA => Ok(Self::EnableDevice),
            0x03EB => Ok(Self::DisableDevice),
            0x001F => Ok(Self::UnlockDoor),
            0x01F4 => Ok(Self::EnableEvents),
            0x07D0 => Ok(Self::AckOk),
            0x07D1 => Ok(Self::AckError),
            _ => Err(Error::UnknownCommand(value)),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(0x{:04X})", self.name(), *self as u16)
    }
}

/// Real-time event kinds
///
/// Unsolicited frames reuse the session-id field to carry the event kind.
/// Only `Transaction` has a specified payload; `All` is the mask value
/// sent when registering for events.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum EventKind {
    /// Attendance transaction (user verified at the terminal)
    Transaction = 0x0001,

    /// All events (registration mask, never a payload tag)
    All = 0xFFFF,
}

impl From<EventKind> for u16 {
    fn from(kind: EventKind) -> u16 {
        kind as u16
    }
}

impl TryFrom<u16> for EventKind {
    type Error = Error;

    fn try_from(value: u16) -> Result<Self> {
        match value {
            0x0001 => Ok(Self::Transaction),
            0xFFFF => Ok(Self::All),
            _ => Err(Error::UnknownEventKind(value)),
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transaction => write!(f, "EF_TRANSACTION"),
            Self::All => write!(f, "EF_ALL"),
        }
    }
}
