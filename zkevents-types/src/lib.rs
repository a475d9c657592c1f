//! Type definitions for zkevents

pub mod attendance;
pub mod error;

pub use attendance::{AttState, AttendanceRecord, VerifyMethod};
pub use error::{Error, Result};
