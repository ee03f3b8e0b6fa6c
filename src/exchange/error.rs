use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExchangeError>;

#[derive(Debug, Error)]
pub enum ExchangeError {
    /// The group was not started with exactly two participants. No transfer is attempted.
    #[error("must run with exactly 2 participants, but the group has {size}")]
    WrongGroupSize { size: u32 },

    /// The matched message does not fit into the receive buffer. The buffer is left untouched.
    #[error("incoming message of {received} elements exceeds receive buffer of {expected} elements")]
    SizeMismatch { expected: usize, received: usize },

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ExchangeError {
    pub fn is_wrong_group_size(&self) -> bool {
        matches!(self, ExchangeError::WrongGroupSize { .. })
    }
}
