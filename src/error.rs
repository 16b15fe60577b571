use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RdsError {
    /// Input rejected before any network call.
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Failed to read response body: {0}")]
    BodyRead(#[source] reqwest::Error),

    #[error("HTTP {} {status_text}: {body}", .status.as_u16())]
    Http {
        status: StatusCode,
        status_text: String,
        body: String,
    },

    #[error("Failed to parse response: {source}")]
    Parse {
        body: String,
        #[source]
        source: serde_json::Error,
    },

    /// The call succeeded at the HTTP level but the response header reports failure.
    #[error("API error {code}: {message}")]
    Api { code: i64, message: String },

    #[error("Token acquisition failed: {0}")]
    Token(#[from] TokenError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures on the OAuth2 token mint path.
#[derive(Error, Debug)]
pub enum TokenError {
    #[error("could not build token request: {0}")]
    Request(#[source] reqwest::Error),

    #[error("token endpoint unreachable: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("token endpoint returned {}: {body}", .status.as_u16())]
    Status { status: StatusCode, body: String },

    #[error("could not read token response: {0}")]
    BodyRead(#[source] reqwest::Error),

    #[error("malformed token response: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("token response has an unusable lifetime: expires_in = {0}")]
    InvalidExpiry(i64),
}

pub type Result<T> = std::result::Result<T, RdsError>;

impl RdsError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    pub fn is_api_error(&self) -> bool {
        matches!(self, Self::Api { .. })
    }

    /// Whether a caller-driven retry of the same call could plausibly succeed.
    /// The library itself never retries.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::BodyRead(_) => true,
            Self::Http { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            Self::Token(TokenError::Transport(_)) => true,
            Self::Token(TokenError::Status { status, .. }) => status.is_server_error(),
            _ => false,
        }
    }
}
