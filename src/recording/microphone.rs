//! Microphone capture through cpal, encoded as WAV with hound.

use std::io::Cursor;
use std::sync::mpsc as std_mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, StreamConfig};

use super::device::{CaptureDevice, CaptureError, ChunkSender};

const START_TIMEOUT: Duration = Duration::from_secs(3);

type SampleBuffer = Arc<Mutex<Vec<i16>>>;

/// Records the default (or a named) input device.
///
/// The cpal stream lives on its own thread for the length of the
/// recording; the whole take is delivered as one WAV chunk on `stop`.
#[derive(Default)]
pub struct MicrophoneDevice {
    device_name: Option<String>,
    worker: Option<Worker>,
}

struct Worker {
    stop_tx: std_mpsc::Sender<()>,
    handle: thread::JoinHandle<Result<Vec<u8>, CaptureError>>,
    sink: ChunkSender,
}

impl MicrophoneDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_device(mut self, name: impl Into<String>) -> Self {
        self.device_name = Some(name.into());
        self
    }
}

impl CaptureDevice for MicrophoneDevice {
    fn start(&mut self, sink: ChunkSender) -> Result<(), CaptureError> {
        if self.worker.is_some() {
            return Err(CaptureError::Device("microphone already capturing".to_string()));
        }
        let (stop_tx, stop_rx) = std_mpsc::channel::<()>();
        let (ready_tx, ready_rx) = std_mpsc::channel::<Result<(), CaptureError>>();
        let device_name = self.device_name.clone();
        let handle = thread::spawn(move || capture(device_name, ready_tx, stop_rx));

        match ready_rx.recv_timeout(START_TIMEOUT) {
            Ok(Ok(())) => {
                self.worker = Some(Worker {
                    stop_tx,
                    handle,
                    sink,
                });
                Ok(())
            }
            Ok(Err(err)) => {
                let _ = handle.join();
                Err(err)
            }
            Err(_) => {
                let _ = stop_tx.send(());
                Err(CaptureError::Device(
                    "timed out opening the input stream".to_string(),
                ))
            }
        }
    }

    fn stop(&mut self) -> Result<(), CaptureError> {
        let Some(worker) = self.worker.take() else {
            return Ok(());
        };
        let _ = worker.stop_tx.send(());
        let wav = worker
            .handle
            .join()
            .map_err(|_| CaptureError::Device("capture thread panicked".to_string()))??;
        let _ = worker.sink.send(wav);
        Ok(())
    }
}

fn capture(
    device_name: Option<String>,
    ready_tx: std_mpsc::Sender<Result<(), CaptureError>>,
    stop_rx: std_mpsc::Receiver<()>,
) -> Result<Vec<u8>, CaptureError> {
    let samples: SampleBuffer = Arc::new(Mutex::new(Vec::new()));
    let (stream, config) = match open_stream(device_name.as_deref(), samples.clone()) {
        Ok(opened) => opened,
        Err(err) => {
            let _ = ready_tx.send(Err(err.clone()));
            return Err(err);
        }
    };
    let _ = ready_tx.send(Ok(()));

    let _ = stop_rx.recv();
    drop(stream);

    let samples = samples
        .lock()
        .map(|guard| guard.clone())
        .map_err(|_| CaptureError::Device("sample buffer poisoned".to_string()))?;
    encode_wav(&samples, config.channels, config.sample_rate.0)
}

fn open_stream(
    device_name: Option<&str>,
    samples: SampleBuffer,
) -> Result<(cpal::Stream, StreamConfig), CaptureError> {
    let host = cpal::default_host();
    let device = match device_name {
        Some(wanted) => host
            .input_devices()
            .map_err(|e| CaptureError::Device(e.to_string()))?
            .find(|d| d.name().map(|n| n == wanted).unwrap_or(false))
            .ok_or(CaptureError::NoDevice)?,
        None => host.default_input_device().ok_or(CaptureError::NoDevice)?,
    };

    let supported = device.default_input_config().map_err(|e| match e {
        cpal::DefaultStreamConfigError::DeviceNotAvailable => CaptureError::NoDevice,
        other => CaptureError::PermissionDenied(other.to_string()),
    })?;
    let config: StreamConfig = supported.config();

    let stream = match supported.sample_format() {
        SampleFormat::F32 => build_stream::<f32>(&device, &config, samples),
        SampleFormat::I16 => build_stream::<i16>(&device, &config, samples),
        SampleFormat::U16 => build_stream::<u16>(&device, &config, samples),
        other => {
            return Err(CaptureError::Device(format!(
                "unsupported sample format {other:?}"
            )))
        }
    }?;
    stream
        .play()
        .map_err(|e| CaptureError::PermissionDenied(e.to_string()))?;

    tracing::debug!(
        channels = config.channels,
        sample_rate = config.sample_rate.0,
        "microphone stream open"
    );
    Ok((stream, config))
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &StreamConfig,
    samples: SampleBuffer,
) -> Result<cpal::Stream, CaptureError>
where
    T: cpal::SizedSample,
    i16: cpal::FromSample<T>,
{
    device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                if let Ok(mut buffer) = samples.lock() {
                    buffer.extend(data.iter().map(|&s| cpal::Sample::to_sample::<i16>(s)));
                }
            },
            |err| tracing::warn!(error = %err, "input stream error"),
            None,
        )
        .map_err(|e| match e {
            cpal::BuildStreamError::DeviceNotAvailable => CaptureError::NoDevice,
            other => CaptureError::PermissionDenied(other.to_string()),
        })
}

/// Encode interleaved 16-bit PCM as an in-memory WAV file.
pub fn encode_wav(samples: &[i16], channels: u16, sample_rate: u32) -> Result<Vec<u8>, CaptureError> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut bytes = Vec::new();
    let mut writer = hound::WavWriter::new(Cursor::new(&mut bytes), spec)
        .map_err(|e| CaptureError::Device(e.to_string()))?;
    for &sample in samples {
        writer
            .write_sample(sample)
            .map_err(|e| CaptureError::Device(e.to_string()))?;
    }
    writer
        .finalize()
        .map_err(|e| CaptureError::Device(e.to_string()))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_wav_writes_riff_header() {
        let wav = encode_wav(&[0, 1, -1, 0], 1, 16_000).unwrap();
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        // 44-byte header plus four 16-bit samples.
        assert_eq!(wav.len(), 44 + 8);
    }

    #[test]
    fn stop_without_start_is_noop() {
        assert!(MicrophoneDevice::new().stop().is_ok());
    }
}
