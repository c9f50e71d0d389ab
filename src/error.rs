use thiserror::Error;
use tokio_util::codec::LinesCodecError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O failure: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse network configuration JSON: {0}")]
    DeserializationError(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Line exceeds the maximum request length of {0} bytes")]
    LineTooLong(usize),

    #[error("Slot {index} is already occupied by plane {plane_id}")]
    SlotConflict { index: usize, plane_id: i64 },

    #[error("Failed to start airport node {airport}: {reason}")]
    NodeStartupError { airport: usize, reason: String },
}

impl From<LinesCodecError> for Error {
    fn from(e: LinesCodecError) -> Self {
        match e {
            LinesCodecError::MaxLineLengthExceeded => Error::LineTooLong(crate::config::MAX_LINE),
            LinesCodecError::Io(e) => Error::IoError(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
