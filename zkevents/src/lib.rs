//! # zkevents
//!
//! Real-time event client for ZKTeco biometric access-control terminals
//! speaking the TCP-framed protocol.
//!
//! ## Features
//!
//! - Session handshake with reply-id correlation of acknowledgements
//! - Real-time attendance transactions pushed by the device, decoded
//!   into structured records
//! - Door unlock and device enable/disable command codes
//! - Notifications through a sink trait or an async channel
//!
//! ## Quick Start
//!
//! ```no_run
//! use zkevents::{Client, DeviceEvent};
//!
//! #[tokio::main]
//! async fn main() -> zkevents::Result<()> {
//!     // Connect and take the notification channel
//!     let (client, mut events) = Client::connect_events("10.0.0.12", 4370).await?;
//!
//!     // Ask the device to stream events
//!     client.enable_events().await?;
//!
//!     while let Some(event) = events.recv().await {
//!         match event {
//!             DeviceEvent::Transaction(record) => println!("{record}"),
//!             DeviceEvent::Error(error) => eprintln!("fault: {error}"),
//!             DeviceEvent::Disconnected => break,
//!             DeviceEvent::Connected => {}
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
mod dispatch;
pub mod error;
pub mod events;

// Re-exports
pub use client::Client;
pub use error::{Error, Result};
pub use events::{ChannelSink, DeviceEvent, EventSink};

// Re-export protocol and domain types
pub use zkevents_core::{Command, EventKind, Frame, Session};
pub use zkevents_types::{AttState, AttendanceRecord, VerifyMethod};
