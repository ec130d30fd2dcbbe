//! Error types for meetai.

use thiserror::Error;

use crate::auth::AuthError;
use crate::drive::GraphError;
use crate::recording::CaptureError;

/// Primary error type for all meetai operations.
#[derive(Error, Debug)]
pub enum MeetError {
    #[error("Authentication error: {0}")]
    Authentication(#[from] AuthError),

    #[error("Folder lookup failed for '{folder}': {source}")]
    FolderLookup {
        folder: String,
        #[source]
        source: GraphError,
    },

    #[error("Folder creation failed for '{folder}': {source}")]
    FolderCreate {
        folder: String,
        #[source]
        source: GraphError,
    },

    #[error("Upload of '{file_name}' failed: {source}")]
    Upload {
        file_name: String,
        #[source]
        source: GraphError,
    },

    #[error("Microphone unavailable: {0}")]
    Permission(String),

    #[error("Capture device error: {0}")]
    Capture(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MeetError {
    /// Folder lookup failure; a credential failure stays an auth error.
    pub fn folder_lookup(folder: impl Into<String>, source: GraphError) -> Self {
        match source {
            GraphError::Auth(err) => Self::Authentication(err),
            source => Self::FolderLookup {
                folder: folder.into(),
                source,
            },
        }
    }

    pub fn folder_create(folder: impl Into<String>, source: GraphError) -> Self {
        match source {
            GraphError::Auth(err) => Self::Authentication(err),
            source => Self::FolderCreate {
                folder: folder.into(),
                source,
            },
        }
    }

    pub fn upload(file_name: impl Into<String>, source: GraphError) -> Self {
        match source {
            GraphError::Auth(err) => Self::Authentication(err),
            source => Self::Upload {
                file_name: file_name.into(),
                source,
            },
        }
    }

    /// Short text for the status line.
    pub fn status_message(&self) -> &'static str {
        match self {
            Self::Authentication(_) => "Sign-in failed.",
            Self::FolderLookup { .. } | Self::FolderCreate { .. } | Self::Upload { .. } => {
                "Upload to OneDrive failed."
            }
            Self::Permission(_) | Self::Capture(_) => "Could not access the microphone.",
            Self::InvalidState(_) => "Action not available right now.",
            Self::Configuration(_) => "Configuration error.",
            Self::Io(_) => "File error.",
        }
    }
}

impl From<CaptureError> for MeetError {
    fn from(error: CaptureError) -> Self {
        match error {
            CaptureError::PermissionDenied(msg) => Self::Permission(msg),
            CaptureError::NoDevice => Self::Permission("no input device available".to_string()),
            CaptureError::Device(msg) => Self::Capture(msg),
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, MeetError>;
