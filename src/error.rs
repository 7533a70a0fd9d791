//! @ai:module:intent Error taxonomy for backend calls
//! @ai:module:layer domain
//! @ai:module:public_api ClientError, MODEL_NOT_AVAILABLE
//! @ai:module:stateless true

use std::time::Duration;
use thiserror::Error;

/// Sentinel message for a backend that is unreachable by design (e.g. daemon not running)
pub const MODEL_NOT_AVAILABLE: &str = "Model not available";

/// @ai:intent Failure while talking to a model backend; never crosses the client boundary
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("Request timeout after {}s", .0.as_secs_f64())]
    Timeout(Duration),

    #[error("{}", MODEL_NOT_AVAILABLE)]
    Unavailable,

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Protocol(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message_mentions_timeout() {
        let message = ClientError::Timeout(Duration::from_secs(120)).to_string();
        assert!(message.to_lowercase().contains("timeout"));
        assert!(message.contains("120"));
    }

    #[test]
    fn test_unavailable_uses_sentinel() {
        assert_eq!(ClientError::Unavailable.to_string(), MODEL_NOT_AVAILABLE);
    }
}
