//! meetai: record a meeting and drop it into a OneDrive folder.
//!
//! The flow is sign in with a Microsoft account, capture audio, then
//! upload it as `meeting_<timestamp>.wav` into a folder at the drive root
//! (`AudioParaTranscribir` unless configured otherwise), creating that
//! folder on first use.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use meetai::prelude::*;
//! use meetai::auth::providers::MicrosoftIdentity;
//! use meetai::recording::FileDevice;
//!
//! # async fn example() -> meetai::error::Result<()> {
//! let config = MeetConfig::from_env()?;
//! let auth = Arc::new(SessionAuthenticator::new(
//!     Arc::new(MicrosoftIdentity::from_config(&config)),
//!     config.token_store(),
//! ));
//! let graph = GraphClient::new(auth.clone())
//!     .map_err(|e| MeetError::Configuration(e.to_string()))?
//!     .with_base_url(config.graph_url.clone());
//! let workflow = UploadWorkflow::from_config(Arc::new(graph), &config);
//! let recorder = Recorder::new(Box::new(FileDevice::new("take.wav")));
//!
//! let mut controller = Controller::new(
//!     auth,
//!     workflow,
//!     recorder,
//!     Arc::new(meetai::controller::LogStatus),
//! );
//! controller.sign_in().await?;
//! controller.start_recording()?;
//! let item = controller.stop_recording().await?;
//! println!("{}", item.name);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod controller;
pub mod drive;
pub mod error;
pub mod prelude;
pub mod recording;
pub mod util;

#[cfg(feature = "cli")]
pub mod cli;
