//! Convenience re-exports for common use.

pub use crate::auth::{AuthError, Session, SessionAuthenticator, TokenStore};
pub use crate::config::MeetConfig;
pub use crate::controller::{ControlState, Controller, StatusSink};
pub use crate::drive::{DriveApi, DriveItem, FolderLookup, GraphClient, UploadWorkflow};
pub use crate::error::{MeetError, Result};
pub use crate::recording::{AudioBlob, CaptureDevice, Recorder, RecordingState};
