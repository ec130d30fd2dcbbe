//! The single context object behind the sign-in / start / stop controls.

use std::sync::Arc;

use crate::auth::{Session, SessionAuthenticator};
use crate::drive::{DriveItem, UploadWorkflow};
use crate::error::{MeetError, Result};
use crate::recording::{AudioBlob, Recorder, RecordingState};

/// Receives short human-readable status lines.
pub trait StatusSink: Send + Sync {
    fn set_status(&self, status: &str);
}

/// Status sink that only logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogStatus;

impl StatusSink for LogStatus {
    fn set_status(&self, status: &str) {
        tracing::info!(status, "status");
    }
}

/// Which controls are currently usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlState {
    pub sign_in_enabled: bool,
    pub start_enabled: bool,
    pub stop_enabled: bool,
}

/// Owns the session, the recorder and the upload workflow.
///
/// Every operation reports its outcome to the status sink and logs
/// failures before returning them; nothing here ends the process.
pub struct Controller {
    authenticator: Arc<SessionAuthenticator>,
    workflow: UploadWorkflow,
    recorder: Recorder,
    status: Arc<dyn StatusSink>,
    session: Option<Session>,
}

impl Controller {
    pub fn new(
        authenticator: Arc<SessionAuthenticator>,
        workflow: UploadWorkflow,
        recorder: Recorder,
        status: Arc<dyn StatusSink>,
    ) -> Self {
        Self {
            authenticator,
            workflow,
            recorder,
            status,
            session: None,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn recording_state(&self) -> RecordingState {
        self.recorder.state()
    }

    pub fn controls(&self) -> ControlState {
        let signed_in = self.session.is_some();
        let recording = self.recorder.state() == RecordingState::Recording;
        ControlState {
            sign_in_enabled: !signed_in,
            start_enabled: signed_in && !recording,
            stop_enabled: recording,
        }
    }

    /// Pick up a session cached by an earlier run, without prompting.
    pub async fn resume(&mut self) -> Option<&Session> {
        if self.session.is_none() {
            self.session = self.authenticator.session().await;
            if let Some(session) = &self.session {
                self.status
                    .set_status(&format!("Connected as: {}", session.display_name()));
            }
        }
        self.session.as_ref()
    }

    pub async fn sign_in(&mut self) -> Result<Session> {
        match self.authenticator.sign_in().await {
            Ok(session) => {
                self.status
                    .set_status(&format!("Connected as: {}", session.display_name()));
                self.session = Some(session.clone());
                Ok(session)
            }
            Err(err) => self.fail("sign-in failed", err.into()),
        }
    }

    pub fn start_recording(&mut self) -> Result<()> {
        if !self.controls().start_enabled {
            let reason = if self.session.is_none() {
                "sign in before recording"
            } else {
                "a recording is already in progress"
            };
            return self.fail("start refused", MeetError::InvalidState(reason.to_string()));
        }
        match self.recorder.start() {
            Ok(()) => {
                self.status.set_status("Recording…");
                Ok(())
            }
            Err(err) => self.fail("could not start recording", err),
        }
    }

    /// Stop recording and hand the blob to the upload workflow.
    pub async fn stop_recording(&mut self) -> Result<DriveItem> {
        self.status.set_status("Processing…");
        let blob = match self.recorder.stop().await {
            Ok(blob) => blob,
            Err(err) => return self.fail("could not stop recording", err),
        };
        self.upload(&blob).await
    }

    pub async fn upload(&self, blob: &AudioBlob) -> Result<DriveItem> {
        self.status.set_status("Stopped. Uploading to OneDrive…");
        match self.workflow.upload_blob(blob).await {
            Ok(item) => {
                self.status.set_status(&format!("Uploaded: {}", item.name));
                Ok(item)
            }
            Err(err) => self.fail("upload failed", err),
        }
    }

    fn fail<T>(&self, context: &str, err: MeetError) -> Result<T> {
        tracing::error!(error = %err, "{context}");
        self.status.set_status(err.status_message());
        Err(err)
    }
}
