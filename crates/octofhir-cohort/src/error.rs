//! Error types for cohort search and patient lifecycle operations.

/// Errors surfaced by the search pipeline and the lifecycle operations.
///
/// Errors reported by a [`ResourceClient`](crate::ResourceClient) travel
/// through the pipeline unchanged; nothing here is retried.
#[derive(Debug, thiserror::Error)]
pub enum CohortError {
    /// Caller input was rejected before any request was sent.
    #[error("Validation error: {message}")]
    Validation {
        /// What was wrong with the input.
        message: String,
    },

    /// The targeted resource does not exist on the server.
    #[error("Resource not found: {resource_type}/{id}")]
    NotFound {
        /// The resource type that was requested.
        resource_type: String,
        /// The identifier that was requested.
        id: String,
    },

    /// Transport failure or non-success status from the server.
    #[error("{}", format_request_error(.status, .message))]
    Request {
        /// HTTP status, absent when the request never got a response.
        status: Option<u16>,
        /// Server diagnostics or transport error text.
        message: String,
    },

    /// The server answered but the body could not be understood.
    #[error("Invalid response: {message}")]
    InvalidResponse {
        /// Description of what was malformed.
        message: String,
    },

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn format_request_error(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(status) => format!("Request failed (HTTP {status}): {message}"),
        None => format!("Request failed: {message}"),
    }
}

impl CohortError {
    /// Creates a new `Validation` error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }

    /// Creates a new `Request` error for a response with the given status.
    #[must_use]
    pub fn request(status: u16, message: impl Into<String>) -> Self {
        Self::Request {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Creates a new `Request` error for a request that never got a response.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Request {
            status: None,
            message: message.into(),
        }
    }

    /// Creates a new `InvalidResponse` error.
    #[must_use]
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    /// Returns `true` if the input was rejected locally.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Returns `true` if the server reported the target as missing.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if the failure came from talking to the server.
    #[must_use]
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::Request { .. } | Self::InvalidResponse { .. } | Self::NotFound { .. }
        )
    }
}

/// Result type alias for cohort operations.
pub type Result<T> = std::result::Result<T, CohortError>;
