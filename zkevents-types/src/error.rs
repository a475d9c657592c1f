pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Event payload too short: expected at least {expected} bytes, got {actual} bytes")]
    PayloadTooShort {
        expected: usize,
        actual: usize,
    },

    #[error("Unknown attendance state: 0x{0:02X}")]
    UnknownAttState(u8),

    #[error("Unknown verify method: 0x{0:02X}")]
    UnknownVerifyMethod(u8),
}
