use serde::Deserialize;
use thiserror::Error;

use crate::auth::AuthError;

/// Errors from the Graph drive endpoints.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Graph API error (status {status}): {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),
}

impl GraphError {
    pub fn api(status: u16, code: Option<&str>, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            code: code.map(str::to_string),
            message: message.into(),
        }
    }

    /// Build an error from a non-success response, reading Graph's
    /// `{"error": {"code", "message"}}` envelope when present.
    pub fn from_response(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ErrorEnvelope>(body) {
            Ok(envelope) => Self::Api {
                status,
                message: envelope.error.message.unwrap_or_else(|| {
                    envelope
                        .error
                        .code
                        .clone()
                        .unwrap_or_else(|| "unknown error".to_string())
                }),
                code: envelope.error.code,
            },
            Err(_) => Self::Api {
                status,
                code: None,
                message: if body.trim().is_empty() {
                    format!("empty response body (status {status})")
                } else {
                    body.to_string()
                },
            },
        }
    }

    /// The provider's "no such item" answer.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Api { status, code, .. } => {
                *status == 404 || code.as_deref() == Some("itemNotFound")
            }
            _ => false,
        }
    }

    /// Transient failures worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(err) => err.is_timeout() || err.is_connect() || err.is_request(),
            Self::Api { status, .. } => *status == 429 || (500..=599).contains(status),
            _ => false,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: Option<String>,
    message: Option<String>,
}
