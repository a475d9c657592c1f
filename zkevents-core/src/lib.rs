//! # zkevents-core
//!
//! Core protocol implementation for the TCP-framed ZKTeco real-time
//! event protocol.
//!
//! This crate provides the low-level protocol primitives:
//! - Frame structure and encoding/decoding
//! - Checksum calculation
//! - Command and event-kind definitions
//! - Session and reply-id tracking
//! - The in-flight request table

pub mod checksum;
pub mod command;
pub mod constants;
pub mod error;
pub mod frame;
pub mod pending;
pub mod session;

pub use command::{Command, EventKind};
pub use error::{Error, Result};
pub use frame::Frame;
pub use pending::{PendingRequest, PendingTable};
pub use session::Session;
