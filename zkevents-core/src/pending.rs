//! In-flight request table
//!
//! Every sent command is registered here under its reply id; the
//! matching acknowledgement resolves the entry. The table is generic
//! over the completion handle so this crate stays runtime-free; the
//! client instantiates it with a oneshot sender.

use std::collections::HashMap;

use bytes::Bytes;
use parking_lot::Mutex;
use tracing::trace;

use crate::command::Command;

/// One in-flight request
#[derive(Debug)]
pub struct PendingRequest<T> {
    /// Command the request carried
    pub command: Command,

    /// Encoded frame bytes as they went out on the wire
    pub frame: Bytes,

    /// Completion handle invoked when the acknowledgement arrives
    pub completion: T,
}

/// Reply-id keyed table of in-flight requests
///
/// Entries are removed when resolved, so a long-lived connection does
/// not accumulate completed requests. A reply-id collision (only
/// possible after 65536 outstanding commands wrap the counter)
/// silently replaces the older entry.
#[derive(Debug)]
pub struct PendingTable<T> {
    entries: Mutex<HashMap<u16, PendingRequest<T>>>,
}

impl<T> PendingTable<T> {
    /// Create an empty table
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Register an in-flight request under its reply id
    pub fn register(&self, reply_id: u16, command: Command, frame: Bytes, completion: T) {
        trace!(reply_id = reply_id, command = %command, "Registering pending request");

        self.entries.lock().insert(
            reply_id,
            PendingRequest {
                command,
                frame,
                completion,
            },
        );
    }

    /// Resolve and remove the request waiting on `reply_id`
    ///
    /// Returns `None` when no request is registered under that id; the
    /// caller is expected to report that as a correlation fault rather
    /// than drop it.
    pub fn resolve(&self, reply_id: u16) -> Option<PendingRequest<T>> {
        self.entries.lock().remove(&reply_id)
    }

    /// Number of requests still awaiting acknowledgement
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Check if no requests are in flight
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Drop every in-flight request
    ///
    /// Used when the connection goes away; dropping the completion
    /// handles wakes their waiters with a closed-channel error.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl<T> Default for PendingTable<T> {
    fn default() -> Self {
        Self::new()
    }
}
