use thiserror::Error;

/// Core error type for scout operations.
#[derive(Error, Debug)]
pub enum ScoutError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Unexpected HTTP status {0}")]
    Status(u16),
}

impl From<serde_json::Error> for ScoutError {
    fn from(e: serde_json::Error) -> Self {
        ScoutError::Serialization(e.to_string())
    }
}

/// Result type alias using ScoutError.
pub type Result<T> = std::result::Result<T, ScoutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion() {
        let err: ScoutError = std::io::Error::other("disk").into();
        assert!(matches!(err, ScoutError::Io(_)));
        assert_eq!(err.to_string(), "IO error: disk");
    }

    #[test]
    fn test_json_error_conversion() {
        let err: ScoutError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, ScoutError::Serialization(_)));
    }
}
