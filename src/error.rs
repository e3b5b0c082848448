//! Error types for the SDK

use thiserror::Error;

/// Main error type for SDK operations
#[derive(Error, Debug)]
pub enum AuthError {
    /// Caller supplied malformed or missing input; raised before any network call
    #[error("Validation error: {0}")]
    Validation(String),

    /// The identity provider rejected an authentication-flow step
    #[error("Authentication error: {description}")]
    Authentication {
        /// Provider error code (e.g. `invalid_request`), when reported
        code: Option<String>,
        /// Human-readable description of the failure
        description: String,
    },

    /// The token endpoint rejected an exchange
    #[error("Token error: {description}")]
    Token {
        /// Provider error code (e.g. `invalid_grant`), when reported
        code: Option<String>,
        /// Human-readable description of the failure
        description: String,
    },

    /// Transport-level failure: connection refused, timeout, malformed response
    #[error("Network error: {0}")]
    Network(String),
}

/// Result type alias for SDK operations
pub type Result<T> = std::result::Result<T, AuthError>;

impl AuthError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an authentication error with an optional provider error code
    pub fn authentication(code: Option<String>, description: impl Into<String>) -> Self {
        Self::Authentication {
            code,
            description: description.into(),
        }
    }

    /// Create a token error with an optional provider error code
    pub fn token(code: Option<String>, description: impl Into<String>) -> Self {
        Self::Token {
            code,
            description: description.into(),
        }
    }

    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Provider error code carried by this error, if any
    #[must_use]
    pub fn provider_code(&self) -> Option<&str> {
        match self {
            Self::Authentication { code, .. } | Self::Token { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}
