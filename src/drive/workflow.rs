//! Folder-ensure-and-upload workflow.
//!
//! There is no atomic "create if absent" in the drive API. Two workflows
//! racing on an absent folder can both observe absence and both create;
//! the store then renames the second folder (`AudioParaTranscribir 1`).
//! Each run still uploads into the folder it resolved. No lock is taken
//! across calls.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use strum::{Display, EnumString};

use super::client::{odata_string, DriveApi};
use super::item::{CreateFolderRequest, DriveItem, FolderId};
use crate::config::MeetConfig;
use crate::error::{MeetError, Result};
use crate::recording::AudioBlob;
use crate::util::retry::RetryPolicy;

pub const DEFAULT_FOLDER_NAME: &str = "AudioParaTranscribir";

/// Largest payload a single `PUT .../content` is documented to accept.
/// Bigger recordings would need an upload session, which is not implemented.
pub const SIMPLE_UPLOAD_LIMIT_BYTES: usize = 4 * 1024 * 1024;

/// How `ensure_folder` looks for an existing folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum FolderLookup {
    /// `GET root:/<name>`; a not-found answer means absent.
    #[default]
    DirectPath,
    /// List root children filtered by name; non-folders are ignored.
    Listing,
}

/// Upload item name for a recording finished at `at`.
///
/// `meeting_2025-06-01T10-15-30-123Z.wav`: an ISO-8601 UTC timestamp with
/// `:` and `.` replaced by `-`.
pub fn upload_file_name(at: DateTime<Utc>) -> String {
    format!("meeting_{}.wav", at.format("%Y-%m-%dT%H-%M-%S-%3fZ"))
}

/// Ensures the destination folder exists and writes recordings into it.
pub struct UploadWorkflow {
    drive: Arc<dyn DriveApi>,
    folder_name: String,
    lookup: FolderLookup,
    retry: RetryPolicy,
}

impl UploadWorkflow {
    pub fn new(drive: Arc<dyn DriveApi>) -> Self {
        Self {
            drive,
            folder_name: DEFAULT_FOLDER_NAME.to_string(),
            lookup: FolderLookup::default(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn from_config(drive: Arc<dyn DriveApi>, config: &MeetConfig) -> Self {
        Self::new(drive)
            .with_folder_name(config.folder_name.clone())
            .with_lookup(config.folder_lookup)
            .with_retry_policy(RetryPolicy::default().with_max_attempts(config.retry_attempts))
    }

    pub fn with_folder_name(mut self, name: impl Into<String>) -> Self {
        self.folder_name = name.into();
        self
    }

    pub fn with_lookup(mut self, lookup: FolderLookup) -> Self {
        self.lookup = lookup;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn folder_name(&self) -> &str {
        &self.folder_name
    }

    pub fn lookup(&self) -> FolderLookup {
        self.lookup
    }

    /// Id of the root folder called `name`, creating it if absent.
    pub async fn ensure_folder(&self, name: &str) -> Result<FolderId> {
        if let Some(existing) = self.find_folder(name).await? {
            tracing::debug!(folder = name, id = %existing.id, "folder exists");
            return Ok(FolderId::new(existing.id));
        }

        tracing::info!(folder = name, "folder missing; creating");
        let request = CreateFolderRequest::rename_on_conflict(name);
        // Never retried: a replayed create could leave a renamed duplicate.
        let created = self
            .drive
            .create_root_folder(&request)
            .await
            .map_err(|e| MeetError::folder_create(name, e))?;
        if created.name != name {
            tracing::warn!(
                requested = name,
                created = %created.name,
                "store renamed the new folder; another folder with this name appeared concurrently"
            );
        }
        Ok(FolderId::new(created.id))
    }

    async fn find_folder(&self, name: &str) -> Result<Option<DriveItem>> {
        match self.lookup {
            FolderLookup::DirectPath => {
                let found = self
                    .retry
                    .execute(|| self.drive.get_item_by_path(name))
                    .await;
                match found {
                    Ok(item) => Ok(Some(item)),
                    Err(e) if e.is_not_found() => Ok(None),
                    Err(e) => {
                        tracing::error!(folder = name, error = %e, "folder lookup failed");
                        Err(MeetError::folder_lookup(name, e))
                    }
                }
            }
            FolderLookup::Listing => {
                let filter = format!("name eq {}", odata_string(name));
                let items = self
                    .retry
                    .execute(|| self.drive.list_root_children(&filter))
                    .await
                    .map_err(|e| {
                        tracing::error!(folder = name, error = %e, "folder listing failed");
                        MeetError::folder_lookup(name, e)
                    })?;
                Ok(items.into_iter().find(|item| item.is_folder()))
            }
        }
    }

    /// Upload a recording into the configured folder, named after now.
    pub async fn upload_blob(&self, blob: &AudioBlob) -> Result<DriveItem> {
        self.upload_blob_at(blob, Utc::now()).await
    }

    /// Upload a recording, naming it after `at`.
    pub async fn upload_blob_at(&self, blob: &AudioBlob, at: DateTime<Utc>) -> Result<DriveItem> {
        let folder = self.ensure_folder(&self.folder_name).await?;
        let file_name = upload_file_name(at);

        if blob.len() > SIMPLE_UPLOAD_LIMIT_BYTES {
            tracing::warn!(
                bytes = blob.len(),
                limit = SIMPLE_UPLOAD_LIMIT_BYTES,
                "payload exceeds the single-request upload limit; the store may reject it"
            );
        }

        let item = self
            .retry
            .execute(|| {
                self.drive
                    .put_content(&folder, &file_name, blob.content_type(), blob.as_bytes())
            })
            .await
            .map_err(|e| {
                tracing::error!(file = %file_name, error = %e, "upload failed");
                MeetError::upload(file_name.clone(), e)
            })?;

        tracing::info!(file = %item.name, id = %item.id, bytes = blob.len(), "uploaded");
        Ok(item)
    }
}
