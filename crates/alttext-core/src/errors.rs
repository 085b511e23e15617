use std::time::Duration;

use crate::ids::NodeId;

/// Typed error hierarchy for the remote alt-text generator.
/// The orchestrator never shows these to the operator; they are logged.
#[derive(Clone, Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("rate limited")]
    RateLimited { retry_after: Option<Duration> },
    #[error("server error {status}: {body}")]
    ServerError { status: u16, body: String },
    #[error("provider overloaded")]
    ProviderOverloaded,
    #[error("network error: {0}")]
    NetworkError(String),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("timeout after {0:?}")]
    Timeout(Duration),
}

impl GeneratorError {
    /// Short classification string for logging.
    pub fn error_kind(&self) -> &'static str {
        match self {
            Self::AuthenticationFailed(_) => "authentication_failed",
            Self::InvalidRequest(_) => "invalid_request",
            Self::RateLimited { .. } => "rate_limited",
            Self::ServerError { .. } => "server_error",
            Self::ProviderOverloaded => "provider_overloaded",
            Self::NetworkError(_) => "network_error",
            Self::MalformedResponse(_) => "malformed_response",
            Self::Timeout(_) => "timeout",
        }
    }

    /// Classify an HTTP status code into the appropriate error variant.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => Self::AuthenticationFailed(body),
            400 | 404 | 422 => Self::InvalidRequest(body),
            429 => Self::RateLimited { retry_after: None },
            503 | 529 => Self::ProviderOverloaded,
            500..=599 => Self::ServerError { status, body },
            _ => Self::InvalidRequest(format!("unexpected status {status}: {body}")),
        }
    }
}

/// Faults reported by the canvas host.
#[derive(Clone, Debug, thiserror::Error)]
pub enum CanvasError {
    #[error("canvas host unavailable: {0}")]
    Unavailable(String),
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),
    #[error("node {0} has no mutable image attachment")]
    NotMutable(NodeId),
    #[error("mutation rejected: {0}")]
    Rejected(String),
}

impl CanvasError {
    pub fn error_kind(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "unavailable",
            Self::NodeNotFound(_) => "node_not_found",
            Self::NotMutable(_) => "not_mutable",
            Self::Rejected(_) => "rejected",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_status_mapping() {
        assert!(matches!(
            GeneratorError::from_status(401, "unauthorized".into()),
            GeneratorError::AuthenticationFailed(_)
        ));
        assert!(matches!(
            GeneratorError::from_status(403, "forbidden".into()),
            GeneratorError::AuthenticationFailed(_)
        ));
        assert!(matches!(
            GeneratorError::from_status(400, "bad image".into()),
            GeneratorError::InvalidRequest(_)
        ));
        assert!(matches!(
            GeneratorError::from_status(429, String::new()),
            GeneratorError::RateLimited { retry_after: None }
        ));
        assert!(matches!(
            GeneratorError::from_status(503, String::new()),
            GeneratorError::ProviderOverloaded
        ));
        assert!(matches!(
            GeneratorError::from_status(502, "bad gateway".into()),
            GeneratorError::ServerError { status: 502, .. }
        ));
    }

    #[test]
    fn unexpected_status_keeps_code_in_message() {
        let err = GeneratorError::from_status(418, "teapot".into());
        assert!(err.to_string().contains("418"), "got: {err}");
    }

    #[test]
    fn error_kinds() {
        assert_eq!(
            GeneratorError::Timeout(Duration::from_secs(1)).error_kind(),
            "timeout"
        );
        assert_eq!(
            GeneratorError::MalformedResponse("x".into()).error_kind(),
            "malformed_response"
        );
        assert_eq!(
            CanvasError::NotMutable(NodeId::from_raw("n1")).error_kind(),
            "not_mutable"
        );
    }

    #[test]
    fn canvas_error_display_names_node() {
        let err = CanvasError::NodeNotFound(NodeId::from_raw("n7"));
        assert_eq!(err.to_string(), "node not found: n7");
    }
}
