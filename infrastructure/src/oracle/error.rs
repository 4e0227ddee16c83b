//! Error types for the HTTP oracle adapter

use ecogroup_application::GatewayError;
use ecogroup_domain::util::truncate_str;
use thiserror::Error;

/// Result type alias for oracle HTTP operations
pub type Result<T> = std::result::Result<T, OracleError>;

/// Errors that can occur when talking to the chat completions endpoint
#[derive(Error, Debug)]
pub enum OracleError {
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Request timeout")]
    Timeout,

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Failed to parse response: {error}\nRaw response: {raw}")]
    ParseError { error: String, raw: String },

    #[error("Response has no choices")]
    EmptyResponse,
}

impl From<reqwest::Error> for OracleError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            OracleError::Timeout
        } else if err.is_connect() {
            OracleError::Connect(err.to_string())
        } else {
            OracleError::Transport(err.to_string())
        }
    }
}

impl From<OracleError> for GatewayError {
    fn from(err: OracleError) -> Self {
        match err {
            OracleError::Status { status: 429, body } => GatewayError::RateLimited(body),
            OracleError::Status { status, body } if status >= 500 => GatewayError::ServerError {
                status,
                message: body,
            },
            OracleError::Status { status, body } => GatewayError::RequestFailed(format!(
                "HTTP {}: {}",
                status,
                truncate_str(&body, 500)
            )),
            OracleError::Timeout => GatewayError::Timeout,
            OracleError::Connect(message) => GatewayError::ConnectionError(message),
            OracleError::Transport(message) => GatewayError::Other(message),
            e @ (OracleError::ParseError { .. } | OracleError::EmptyResponse) => {
                GatewayError::InvalidResponse(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(status: u16) -> GatewayError {
        OracleError::Status {
            status,
            body: "body".into(),
        }
        .into()
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(status(429), GatewayError::RateLimited(_)));
        assert!(matches!(
            status(529),
            GatewayError::ServerError { status: 529, .. }
        ));
        assert!(matches!(status(401), GatewayError::RequestFailed(_)));
        assert!(status(503).is_transient());
        assert!(!status(400).is_transient());
    }

    #[test]
    fn test_parse_errors_are_permanent() {
        let err: GatewayError = OracleError::EmptyResponse.into();
        assert!(matches!(err, GatewayError::InvalidResponse(_)));
        assert!(!err.is_transient());
    }
}
