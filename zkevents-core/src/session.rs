//! Session management
//!
//! A session represents one connection to a device and tracks:
//! - Session ID (assigned by the device on connect)
//! - Reply counter (advances per stamped command)

use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;

use crate::command::Command;
use crate::error::{Error, Result};

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Not connected
    Disconnected,

    /// Handshake completed, session id assigned
    Connected,
}

/// Session handle
///
/// Thread-safe and cheap to clone (Arc internally). Both counters are
/// only mutated by the single processing flow that owns the connection;
/// the atomics exist so the handle can be shared with it.
#[derive(Debug, Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

#[derive(Debug)]
struct SessionInner {
    /// Session ID assigned by device (0 when not connected)
    session_id: AtomicU16,

    /// Reply counter, wraps modulo 65536
    reply_counter: AtomicU16,

    /// Current session state
    state: parking_lot::RwLock<SessionState>,
}

impl Session {
    /// Create a new disconnected session
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SessionInner {
                session_id: AtomicU16::new(0),
                reply_counter: AtomicU16::new(0),
                state: parking_lot::RwLock::new(SessionState::Disconnected),
            }),
        }
    }

    /// Get current session ID
    pub fn session_id(&self) -> u16 {
        self.inner.session_id.load(Ordering::Acquire)
    }

    /// Get current state
    pub fn state(&self) -> SessionState {
        *self.inner.state.read()
    }

    /// Check if connected
    pub fn is_connected(&self) -> bool {
        self.state() == SessionState::Connected
    }

    /// Initialize session with the device-assigned session ID
    ///
    /// The id is write-once per handshake: initializing an already
    /// connected session is an error.
    pub fn initialize(&self, session_id: u16) -> Result<()> {
        let mut state = self.inner.state.write();

        if *state != SessionState::Disconnected {
            return Err(Error::InvalidSessionState(format!(
                "Cannot initialize from state: {:?}",
                *state
            )));
        }

        self.inner.session_id.store(session_id, Ordering::Release);
        self.inner.reply_counter.store(0, Ordering::Release);
        *state = SessionState::Connected;

        Ok(())
    }

    /// Close session and reset both ids
    pub fn close(&self) {
        self.inner.session_id.store(0, Ordering::Release);
        self.inner.reply_counter.store(0, Ordering::Release);
        *self.inner.state.write() = SessionState::Disconnected;
    }

    /// Stamp a reply ID for an outgoing command
    ///
    /// CONNECT and an outgoing ACK_OK always carry reply id 0 and leave
    /// the counter untouched. Every other command advances the counter
    /// by one, wrapping modulo 65536, and uses the new value, so the
    /// first command after the handshake is stamped 1.
    pub fn next_reply_id(&self, command: Command) -> u16 {
        if matches!(command, Command::Connect | Command::AckOk) {
            return 0;
        }

        let next = self
            .inner
            .reply_counter
            .load(Ordering::Acquire)
            .wrapping_add(1);
        self.inner.reply_counter.store(next, Ordering::Release);

        next
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
