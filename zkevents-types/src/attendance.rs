//! Decoded attendance transaction records

use std::fmt;

use chrono::NaiveDate;

use crate::error::{Error, Result};

/// Attendance state reported with a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AttState {
    CheckIn = 0x00,
    CheckOut = 0x01,
    BreakOut = 0x02,
    BreakIn = 0x03,
    OvertimeIn = 0x04,
    OvertimeOut = 0x05,
}

impl TryFrom<u8> for AttState {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0x00 => Ok(Self::CheckIn),
            0x01 => Ok(Self::CheckOut),
            0x02 => Ok(Self::BreakOut),
            0x03 => Ok(Self::BreakIn),
            0x04 => Ok(Self::OvertimeIn),
            0x05 => Ok(Self::OvertimeOut),
            _ => Err(Error::UnknownAttState(value)),
        }
    }
}

impl fmt::Display for AttState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CheckIn => "check-in",
            Self::CheckOut => "check-out",
            Self::BreakOut => "break-out",
            Self::BreakIn => "break-in",
            Self::OvertimeIn => "overtime-in",
            Self::OvertimeOut => "overtime-out",
        };
        f.write_str(name)
    }
}

/// How the user verified at the terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum VerifyMethod {
    Password = 0x00,
    Fingerprint = 0x01,
    Face = 0x0F,
}

impl TryFrom<u8> for VerifyMethod {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0x00 => Ok(Self::Password),
            0x01 => Ok(Self::Fingerprint),
            0x0F => Ok(Self::Face),
            _ => Err(Error::UnknownVerifyMethod(value)),
        }
    }
}

impl fmt::Display for VerifyMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Password => "password",
            Self::Fingerprint => "fingerprint",
            Self::Face => "face",
        };
        f.write_str(name)
    }
}

/// One decoded attendance transaction
///
/// # Payload Layout
///
/// ```text
/// offset 0..16   enroll number, ASCII, NUL padded
/// offset 16..24  reserved
/// offset 24      attendance state
/// offset 25      verify method
/// offset 26      year - 2000
/// offset 27..32  month, day, hours, minutes, seconds
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceRecord {
    /// User enroll number as printed on the terminal
    pub enroll_number: String,

    /// Attendance state
    pub state: AttState,

    /// Verification method
    pub verify_method: VerifyMethod,

    /// Full year (wire carries the offset from 2000)
    pub year: u16,

    pub month: u8,
    pub day: u8,
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
}

impl AttendanceRecord {
    /// Width of the enroll number field
    pub const ENROLL_FIELD_LEN: usize = 16;

    /// Minimum payload length holding every field
    pub const MIN_PAYLOAD_LEN: usize = 32;

    /// Decode a record from a transaction event payload
    ///
    /// # Errors
    ///
    /// Returns an error for payloads under 32 bytes or for state/verify
    /// byte values outside the known enumerations.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < Self::MIN_PAYLOAD_LEN {
            return Err(Error::PayloadTooShort {
                expected: Self::MIN_PAYLOAD_LEN,
                actual: data.len(),
            });
        }

        // The field is NUL padded; the terminal may also embed NULs
        // before the digits, so every NUL byte is stripped
        let enroll_number: String = data[..Self::ENROLL_FIELD_LEN]
            .iter()
            .filter(|&&b| b != 0)
            .map(|&b| char::from(b))
            .collect();

        Ok(Self {
            enroll_number,
            state: AttState::try_from(data[24])?,
            verify_method: VerifyMethod::try_from(data[25])?,
            year: 2000 + u16::from(data[26]),
            month: data[27],
            day: data[28],
            hours: data[29],
            minutes: data[30],
            seconds: data[31],
        })
    }

    /// The record's date and time, when the fields form a valid one
    pub fn timestamp(&self) -> Option<chrono::NaiveDateTime> {
        NaiveDate::from_ymd_opt(
            i32::from(self.year),
            u32::from(self.month),
            u32::from(self.day),
        )?
        .and_hms_opt(
            u32::from(self.hours),
            u32::from(self.minutes),
            u32::from(self.seconds),
        )
    }
}

impl fmt::Display for AttendanceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} via {} at {:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.enroll_number,
            self.state,
            self.verify_method,
            self.year,
            self.month,
            self.day,
            self.hours,
            self.minutes,
            self.seconds
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transaction_payload() -> Vec<u8> {
        let mut data = vec![0u8; 32];
        data[0] = b'4';
        data[1] = b'2';
        data[24] = 0x00; // check-in
        data[25] = 0x01; // fingerprint
        data[26] = 0x17; // 2023
        data[27] = 0x06;
        data[28] = 0x0F;
        data[29] = 0x08;
        data[30] = 0x1E;
        data[31] = 0x00;
        data
    }

    #[test]
    fn test_parse_transaction() {
        let record = AttendanceRecord::parse(&transaction_payload()).unwrap();

        assert_eq!(record.enroll_number, "42");
        assert_eq!(record.state, AttState::CheckIn);
        assert_eq!(record.verify_method, VerifyMethod::Fingerprint);
        assert_eq!(record.year, 2023);
        assert_eq!(record.month, 6);
        assert_eq!(record.day, 15);
        assert_eq!(record.hours, 8);
        assert_eq!(record.minutes, 30);
        assert_eq!(record.seconds, 0);
    }

    #[test]
    fn test_parse_strips_interior_nuls() {
        let mut data = transaction_payload();
        data[0] = 0;
        data[1] = b'9';
        data[2] = 0;
        data[3] = b'7';

        let record = AttendanceRecord::parse(&data).unwrap();
        assert_eq!(record.enroll_number, "97");
    }

    #[test]
    fn test_parse_too_short() {
        let result = AttendanceRecord::parse(&[0u8; 31]);
        assert!(matches!(
            result,
            Err(Error::PayloadTooShort {
                expected: 32,
                actual: 31
            })
        ));
    }

    #[test]
    fn test_parse_unknown_state() {
        let mut data = transaction_payload();
        data[24] = 0x09;
        assert!(matches!(
            AttendanceRecord::parse(&data),
            Err(Error::UnknownAttState(0x09))
        ));
    }

    #[test]
    fn test_parse_unknown_verify_method() {
        let mut data = transaction_payload();
        data[25] = 0x07;
        assert!(matches!(
            AttendanceRecord::parse(&data),
            Err(Error::UnknownVerifyMethod(0x07))
        ));
    }

    #[test]
    fn test_timestamp() {
        let record = AttendanceRecord::parse(&transaction_payload()).unwrap();
        let ts = record.timestamp().unwrap();

        assert_eq!(
            ts,
            NaiveDate::from_ymd_opt(2023, 6, 15)
                .unwrap()
                .and_hms_opt(8, 30, 0)
                .unwrap()
        );
    }

    #[test]
    fn test_timestamp_invalid_date() {
        let mut data = transaction_payload();
        data[27] = 13; // no 13th month

        let record = AttendanceRecord::parse(&data).unwrap();
        assert!(record.timestamp().is_none());
    }

    #[test]
    fn test_display() {
        let record = AttendanceRecord::parse(&transaction_payload()).unwrap();
        assert_eq!(
            record.to_string(),
            "42 check-in via fingerprint at 2023-06-15 08:30:00"
        );
    }
}
