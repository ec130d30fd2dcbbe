//! CLI handlers for `upload` and `record`.

use std::path::Path;
use std::sync::Arc;

use super::auth::authenticator;
use super::DestinationArgs;
use crate::config::MeetConfig;
use crate::controller::{Controller, StatusSink};
use crate::drive::{GraphClient, UploadWorkflow};
use crate::recording::{CaptureDevice, FileDevice, Recorder};

/// Prints status lines to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleStatus;

impl StatusSink for ConsoleStatus {
    fn set_status(&self, status: &str) {
        tracing::debug!(status, "status");
        eprintln!("{status}");
    }
}

fn apply_destination(config: &MeetConfig, destination: &DestinationArgs) -> MeetConfig {
    let mut config = config.clone();
    if let Some(folder) = &destination.folder {
        config = config.with_folder_name(folder.clone());
    }
    if let Some(lookup) = destination.lookup {
        config = config.with_folder_lookup(lookup);
    }
    config
}

async fn controller(
    config: &MeetConfig,
    device: Box<dyn CaptureDevice>,
) -> Result<Controller, Box<dyn std::error::Error>> {
    config.validate()?;
    let auth = authenticator(config);
    let graph = GraphClient::new(auth.clone())?.with_base_url(config.graph_url.clone());
    let workflow = UploadWorkflow::from_config(Arc::new(graph), config);

    let mut controller = Controller::new(
        auth,
        workflow,
        Recorder::new(device),
        Arc::new(ConsoleStatus),
    );
    if controller.resume().await.is_none() {
        controller.sign_in().await?;
    }
    Ok(controller)
}

/// Handle `meetai upload <path>`.
pub async fn handle_upload(
    config: &MeetConfig,
    path: &Path,
    destination: &DestinationArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = apply_destination(config, destination);
    let mut controller = controller(&config, Box::new(FileDevice::new(path))).await?;

    controller.start_recording()?;
    let item = controller.stop_recording().await?;
    if let Some(url) = &item.web_url {
        println!("{url}");
    }
    Ok(())
}

/// Handle `meetai record`.
#[cfg(feature = "microphone")]
pub async fn handle_record(
    config: &MeetConfig,
    device: Option<&str>,
    destination: &DestinationArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    use crate::recording::MicrophoneDevice;

    let config = apply_destination(config, destination);
    let mut microphone = MicrophoneDevice::new();
    if let Some(name) = device {
        microphone = microphone.with_device(name);
    }
    let mut controller = controller(&config, Box::new(microphone)).await?;

    controller.start_recording()?;
    eprintln!("Press Enter (or Ctrl-C) to stop.");
    // Detached: a pending stdin read must not block runtime shutdown.
    let (enter_tx, enter_rx) = tokio::sync::oneshot::channel();
    std::thread::spawn(move || {
        let mut line = String::new();
        let _ = std::io::stdin().read_line(&mut line);
        let _ = enter_tx.send(());
    });
    tokio::select! {
        _ = enter_rx => {}
        _ = tokio::signal::ctrl_c() => {}
    }

    let item = controller.stop_recording().await?;
    if let Some(url) = &item.web_url {
        println!("{url}");
    }
    Ok(())
}

/// Handle `meetai record` without microphone support compiled in.
#[cfg(not(feature = "microphone"))]
pub async fn handle_record(
    _config: &MeetConfig,
    _device: Option<&str>,
    _destination: &DestinationArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    Err("microphone capture is not compiled in; rebuild with `--features microphone`".into())
}
