//! OneDrive access through Microsoft Graph and the upload workflow.

pub mod client;
pub mod error;
pub mod item;
pub mod workflow;

pub use client::{DriveApi, GraphClient, DEFAULT_GRAPH_URL};
pub use error::GraphError;
pub use item::{ConflictBehavior, CreateFolderRequest, DriveItem, FolderId};
pub use workflow::{
    upload_file_name, FolderLookup, UploadWorkflow, DEFAULT_FOLDER_NAME,
    SIMPLE_UPLOAD_LIMIT_BYTES,
};
