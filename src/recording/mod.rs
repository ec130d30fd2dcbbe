//! Recording control: capture devices and the start/stop state machine.

pub mod device;
#[cfg(feature = "microphone")]
pub mod microphone;
pub mod recorder;

pub use device::{CaptureDevice, CaptureError, ChunkSender, FileDevice};
#[cfg(feature = "microphone")]
pub use microphone::MicrophoneDevice;
pub use recorder::{AudioBlob, Recorder, RecordingState, AUDIO_CONTENT_TYPE};
