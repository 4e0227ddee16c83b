//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Invalid grouping template: {0}")]
    InvalidTemplate(String),

    #[error("No reference groups available")]
    EmptyRegistry,

    #[error("Invalid assignment data: {0}")]
    InvalidAssignments(String),

    #[error("Malformed oracle response: {0}")]
    MalformedResponse(String),

    #[error("Invalid GeoJSON: {0}")]
    InvalidGeoJson(String),

    #[error("Invalid diet matrix: {0}")]
    InvalidDietMatrix(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            DomainError::EmptyRegistry.to_string(),
            "No reference groups available"
        );
        assert_eq!(
            DomainError::InvalidDietMatrix("row 3".to_string()).to_string(),
            "Invalid diet matrix: row 3"
        );
    }
}
