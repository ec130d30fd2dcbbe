//! Capture device collaborator and the file-backed device.

use std::io::ErrorKind;
use std::path::PathBuf;

use thiserror::Error;
use tokio::sync::mpsc;

/// Channel a device pushes captured chunks into.
pub type ChunkSender = mpsc::UnboundedSender<Vec<u8>>;

/// Capture device failures.
#[derive(Debug, Clone, Error)]
pub enum CaptureError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("No audio input device available")]
    NoDevice,

    #[error("Device error: {0}")]
    Device(String),
}

/// Source of recorded audio bytes.
///
/// `start` hands the device a sender; the device pushes chunks as they
/// become available. `stop` must flush any pending data into the sender
/// before returning.
pub trait CaptureDevice: Send {
    fn start(&mut self, sink: ChunkSender) -> Result<(), CaptureError>;
    fn stop(&mut self) -> Result<(), CaptureError>;
}

/// Replays an existing audio file as a single chunk when stopped.
#[derive(Debug)]
pub struct FileDevice {
    path: PathBuf,
    sink: Option<ChunkSender>,
}

impl FileDevice {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sink: None,
        }
    }
}

impl CaptureDevice for FileDevice {
    fn start(&mut self, sink: ChunkSender) -> Result<(), CaptureError> {
        match std::fs::metadata(&self.path) {
            Ok(meta) if meta.is_file() => {
                self.sink = Some(sink);
                Ok(())
            }
            Ok(_) => Err(CaptureError::Device(format!(
                "{} is not a file",
                self.path.display()
            ))),
            Err(err) => Err(io_to_capture(&self.path, err)),
        }
    }

    fn stop(&mut self) -> Result<(), CaptureError> {
        let Some(sink) = self.sink.take() else {
            return Ok(());
        };
        let data = std::fs::read(&self.path).map_err(|err| io_to_capture(&self.path, err))?;
        tracing::debug!(path = %self.path.display(), bytes = data.len(), "file capture finished");
        // The receiver is closed only if the recorder was dropped mid-recording.
        let _ = sink.send(data);
        Ok(())
    }
}

fn io_to_capture(path: &std::path::Path, err: std::io::Error) -> CaptureError {
    match err.kind() {
        ErrorKind::PermissionDenied => {
            CaptureError::PermissionDenied(format!("{}: {err}", path.display()))
        }
        ErrorKind::NotFound => CaptureError::Device(format!("{} not found", path.display())),
        _ => CaptureError::Device(format!("{}: {err}", path.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn file_device_emits_contents_on_stop() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("take.wav");
        std::fs::write(&path, b"RIFFdata").unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut device = FileDevice::new(&path);
        device.start(tx).unwrap();
        assert!(rx.try_recv().is_err());
        device.stop().unwrap();
        assert_eq!(rx.try_recv().unwrap(), b"RIFFdata".to_vec());
    }

    #[test]
    fn missing_file_fails_to_start() {
        let dir = TempDir::new().unwrap();
        let (tx, _rx) = mpsc::unbounded_channel();
        let err = FileDevice::new(dir.path().join("nope.wav"))
            .start(tx)
            .unwrap_err();
        assert!(matches!(err, CaptureError::Device(_)));
    }

    #[test]
    fn directory_is_rejected() {
        let dir = TempDir::new().unwrap();
        let (tx, _rx) = mpsc::unbounded_channel();
        assert!(FileDevice::new(dir.path()).start(tx).is_err());
    }
}
