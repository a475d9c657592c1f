//! Device checksum algorithm
//!
//! The TCP-framed firmware sums the inner payload as unsigned 16-bit
//! little-endian words, takes each word modulo 0xFFFF, and subtracts the
//! running total from 0xFFFF. The running sum is never folded back into
//! 16-bit range; whatever the subtraction leaves is truncated by the
//! 16-bit field on the wire. This is not a ones-complement checksum, and
//! firmware rejects frames computed with one.

use tracing::trace;

/// Value the word modulus and final subtraction are taken against
const USHORT_MAX: i64 = 0xFFFF;

/// Checksum a raw buffer
///
/// # Algorithm
///
/// ```text
/// 1. Walk the buffer two bytes at a time as little-endian u16 words;
///    an odd trailing byte is used as its byte value
/// 2. sum += word % 0xFFFF   (sum itself is never reduced)
/// 3. Result is 0xFFFF - sum, truncated to the low 16 bits
/// ```
///
/// # Examples
///
/// ```
/// use zkevents_core::checksum;
///
/// // CMD_CONNECT header with zeroed checksum/session/reply fields
/// let sum = checksum::compute(&[0xE8, 0x03, 0, 0, 0, 0, 0, 0]);
/// assert_eq!(sum, 64535);
/// ```
pub fn compute(buf: &[u8]) -> u16 {
    let mut sum: i64 = 0;
    let mut i = 0;

    while i < buf.len() {
        let word = if i == buf.len() - 1 {
            i64::from(buf[i])
        } else {
            i64::from(u16::from_le_bytes([buf[i], buf[i + 1]]))
        };

        sum += word % USHORT_MAX;
        i += 2;
    }

    // Truncation of any overflow matches the 16-bit field write
    (USHORT_MAX - sum) as u16
}

/// Checksum a frame's inner payload from its parts
///
/// Builds the 8-byte inner header with a zeroed checksum field, appends
/// the payload, and runs [`compute`] over the result.
pub fn calculate(command: u16, session_id: u16, reply_id: u16, payload: &[u8]) -> u16 {
    let mut buf = Vec::with_capacity(8 + payload.len());

    buf.extend_from_slice(&command.to_le_bytes());
    buf.extend_from_slice(&[0, 0]); // Checksum placeholder
    buf.extend_from_slice(&session_id.to_le_bytes());
    buf.extend_from_slice(&reply_id.to_le_bytes());
    buf.extend_from_slice(payload);

    let checksum = compute(&buf);

    trace!(
        command = command,
        session_id = session_id,
        reply_id = reply_id,
        payload_len = payload.len(),
        checksum = format!("0x{:04X}", checksum),
        "Calculated checksum"
    );

    checksum
}

/// Verify a received checksum
pub fn verify(
    command: u16,
    session_id: u16,
    reply_id: u16,
    payload: &[u8],
    expected: u16,
) -> bool {
    calculate(command, session_id, reply_id, payload) == expected
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_compute_connect_header() {
        // Words: 0x03E8, 0, 0, 0 -> sum = 1000 -> 65535 - 1000
        let buf = [0xE8, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
        assert_eq!(compute(&buf), 64535);
    }

    #[test]
    fn test_compute_empty() {
        assert_eq!(compute(&[]), 0xFFFF);
    }

    #[test]
    fn test_compute_odd_trailing_byte() {
        // Words: 0x0201 = 513, then the lone 0x03 byte -> sum = 516
        let buf = [0x01, 0x02, 0x03];
        assert_eq!(compute(&buf), 65535 - 516);
    }

    #[test]
    fn test_word_modulus_zeroes_ffff() {
        // A 0xFFFF word contributes nothing: 0xFFFF % 0xFFFF == 0
        assert_eq!(compute(&[0xFF, 0xFF]), 0xFFFF);
    }

    #[test]
    fn test_truncation_on_overflow() {
        // Two 0xFFFE words: sum = 131068, 65535 - 131068 = -65533,
        // which the 16-bit write truncates to 3
        let buf = [0xFE, 0xFF, 0xFE, 0xFF];
        assert_eq!(compute(&buf), 3);
    }

    #[test]
    fn test_calculate_matches_compute() {
        let payload = [0xFF, 0xFF, 0x00, 0x00];
        let by_parts = calculate(0x01F4, 0x1234, 0x0001, &payload);

        let mut buf = vec![0xF4, 0x01, 0x00, 0x00, 0x34, 0x12, 0x01, 0x00];
        buf.extend_from_slice(&payload);
        assert_eq!(by_parts, compute(&buf));
    }

    #[test]
    fn test_verify() {
        let payload = [0xAB, 0xCD];
        let checksum = calculate(0x03E8, 50, 100, &payload);

        assert!(verify(0x03E8, 50, 100, &payload, checksum));
        assert!(!verify(0x03E8, 50, 100, &payload, checksum.wrapping_add(1)));
    }

    #[test]
    fn test_different_fields_different_checksums() {
        let cs1 = calculate(0x03E8, 0, 0, &[]);
        let cs2 = calculate(0x03E9, 0, 0, &[]);
        let cs3 = calculate(0x03E8, 1, 0, &[]);

        assert_ne!(cs1, cs2);
        assert_ne!(cs1, cs3);
    }
}
