//! Idle/Recording state machine.

use std::time::Instant;

use strum::Display;
use tokio::sync::mpsc;

use super::device::CaptureDevice;
use crate::error::{MeetError, Result};

/// Content type attached to recorded blobs.
pub const AUDIO_CONTENT_TYPE: &str = "audio/wav";

/// A finished recording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioBlob {
    data: Vec<u8>,
    content_type: String,
}

impl AudioBlob {
    pub fn wav(data: Vec<u8>) -> Self {
        Self {
            data,
            content_type: AUDIO_CONTENT_TYPE.to_string(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum RecordingState {
    Idle,
    Recording,
}

enum Phase {
    Idle,
    Recording {
        chunks: mpsc::UnboundedReceiver<Vec<u8>>,
        started_at: Instant,
    },
}

/// Drives a capture device through one recording at a time.
pub struct Recorder {
    device: Box<dyn CaptureDevice>,
    phase: Phase,
}

impl Recorder {
    pub fn new(device: Box<dyn CaptureDevice>) -> Self {
        Self {
            device,
            phase: Phase::Idle,
        }
    }

    pub fn state(&self) -> RecordingState {
        match self.phase {
            Phase::Idle => RecordingState::Idle,
            Phase::Recording { .. } => RecordingState::Recording,
        }
    }

    /// Open the device and begin buffering. Stays `Idle` on failure.
    pub fn start(&mut self) -> Result<()> {
        if let Phase::Recording { .. } = self.phase {
            return Err(MeetError::InvalidState(
                "a recording is already in progress".to_string(),
            ));
        }
        let (tx, rx) = mpsc::unbounded_channel();
        self.device.start(tx)?;
        self.phase = Phase::Recording {
            chunks: rx,
            started_at: Instant::now(),
        };
        tracing::info!("recording started");
        Ok(())
    }

    /// Stop the device and join every non-empty chunk into one blob.
    pub async fn stop(&mut self) -> Result<AudioBlob> {
        let (mut chunks, started_at) = match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Recording { chunks, started_at } => (chunks, started_at),
            Phase::Idle => {
                return Err(MeetError::InvalidState(
                    "no recording in progress".to_string(),
                ))
            }
        };

        let stopped = self.device.stop();
        // Anything already buffered is still drained after close.
        chunks.close();
        let mut data = Vec::new();
        let mut count = 0usize;
        while let Some(chunk) = chunks.recv().await {
            if !chunk.is_empty() {
                count += 1;
                data.extend_from_slice(&chunk);
            }
        }
        stopped?;

        tracing::info!(
            chunks = count,
            bytes = data.len(),
            elapsed_ms = started_at.elapsed().as_millis() as u64,
            "recording stopped"
        );
        Ok(AudioBlob::wav(data))
    }
}
