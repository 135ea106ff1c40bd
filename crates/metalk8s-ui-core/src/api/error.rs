use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// RBAC refused the request for this user.
    #[error("Forbidden by cluster RBAC: {0}")]
    AccessDenied(String),

    /// Basic-auth credentials no longer accepted; the user must log in again.
    #[error("Cluster API rejected the session credentials - log in again")]
    Unauthorized,

    #[error("Cluster API resource not found: {0}")]
    NotFound(String),

    /// API priority and fairness throttled the request.
    #[error("Cluster API is throttling requests - retry shortly")]
    RateLimited,

    #[error("Cluster API server error: {0}")]
    ServerError(String),

    #[error("Cluster API unreachable: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Request cancelled")]
    Cancelled,
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Truncate a response body to avoid logging excessive data
pub(crate) fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY_LENGTH {
        body.to_string()
    } else {
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }
}

impl ApiError {
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = truncate_body(body);
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            403 => ApiError::AccessDenied(truncated),
            404 => ApiError::NotFound(truncated),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError(truncated),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, truncated)),
        }
    }

    /// True when the request never got an HTTP answer.
    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::NetworkError(_))
    }
}
