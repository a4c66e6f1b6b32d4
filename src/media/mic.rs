//! cpal microphone backend
//!
//! Audio-only capture for native hosts. The cpal stream is not `Send`, so a
//! dedicated worker thread owns it and takes track commands over a channel.
//! There is no camera device on this backend: `has_video()` is false and the
//! video controls are no-ops.

use super::capture::{CaptureBackend, CaptureStream};
use crate::{Result, VivaError};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::StreamConfig;
use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread;
use tracing::{debug, error, info};

enum MicCommand {
    SetEnabled(bool),
    Stop,
}

/// Acquires the default input device through cpal.
///
/// Captured frames can be bound to a preview sink (a level meter or
/// waveform); without one they are dropped. Muting drops frames but keeps
/// the device held.
pub struct CpalMicBackend {
    preview_tx: Option<Sender<Vec<f32>>>,
}

impl CpalMicBackend {
    pub fn new() -> Self {
        Self { preview_tx: None }
    }

    /// Bind captured frames to a preview sink.
    pub fn with_preview(mut self, preview_tx: Sender<Vec<f32>>) -> Self {
        self.preview_tx = Some(preview_tx);
        self
    }
}

impl Default for CpalMicBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureBackend for CpalMicBackend {
    fn acquire(&mut self) -> Result<Box<dyn CaptureStream>> {
        let (command_tx, command_rx) = bounded(8);
        let (ready_tx, ready_rx) = bounded(1);
        let preview_tx = self.preview_tx.clone();

        thread::spawn(move || mic_worker(command_rx, ready_tx, preview_tx));

        // Surface acquisition failure to the caller instead of losing it on
        // the worker thread.
        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Box::new(CpalMicStream {
                command_tx,
                stopped: false,
            })),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(VivaError::MediaDeviceError(
                "microphone worker exited before reporting readiness".into(),
            )),
        }
    }
}

fn mic_worker(
    command_rx: Receiver<MicCommand>,
    ready_tx: Sender<Result<()>>,
    preview_tx: Option<Sender<Vec<f32>>>,
) {
    let (stream, gate) = match build_input_stream(preview_tx) {
        Ok(parts) => {
            let _ = ready_tx.send(Ok(()));
            parts
        }
        Err(e) => {
            let _ = ready_tx.send(Err(e));
            return;
        }
    };

    info!("Microphone capture started");

    while let Ok(command) = command_rx.recv() {
        match command {
            MicCommand::SetEnabled(enabled) => {
                *gate.lock() = enabled;
            }
            MicCommand::Stop => break,
        }
    }

    drop(stream);
    info!("Microphone capture stopped");
}

fn build_input_stream(
    preview_tx: Option<Sender<Vec<f32>>>,
) -> Result<(cpal::Stream, Arc<Mutex<bool>>)> {
    let host = cpal::default_host();

    let device = host
        .default_input_device()
        .ok_or_else(|| VivaError::MediaDeviceError("No input device available".into()))?;

    info!(
        "Using input device: {}",
        device.name().unwrap_or_else(|_| "Unknown".to_string())
    );

    let config: StreamConfig = device
        .default_input_config()
        .map_err(|e| VivaError::MediaDeviceError(format!("Failed to get input config: {e}")))?
        .into();

    let channels = config.channels as usize;
    let enabled = Arc::new(Mutex::new(true));
    let gate = Arc::clone(&enabled);

    let err_fn = |err| {
        error!("Audio input stream error: {}", err);
    };

    let stream = device
        .build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                if !*gate.lock() {
                    // Muted: frames are dropped but the device stays held.
                    return;
                }

                if let Some(tx) = preview_tx.as_ref() {
                    // Average channels down to mono for preview rendering.
                    let samples: Vec<f32> = if channels == 1 {
                        data.to_vec()
                    } else {
                        data.chunks(channels)
                            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
                            .collect()
                    };
                    if let Err(e) = tx.try_send(samples) {
                        debug!("Failed to send preview frames: {}", e);
                    }
                }
            },
            err_fn,
            None,
        )
        .map_err(|e| VivaError::MediaDeviceError(format!("Failed to build input stream: {e}")))?;

    stream
        .play()
        .map_err(|e| VivaError::MediaDeviceError(format!("Failed to start input stream: {e}")))?;

    Ok((stream, enabled))
}

struct CpalMicStream {
    command_tx: Sender<MicCommand>,
    stopped: bool,
}

impl CaptureStream for CpalMicStream {
    fn set_audio_enabled(&mut self, enabled: bool) {
        let _ = self.command_tx.send(MicCommand::SetEnabled(enabled));
    }

    fn set_video_enabled(&mut self, _enabled: bool) {}

    fn stop_video(&mut self) {}

    fn stop_all(&mut self) {
        if !self.stopped {
            self.stopped = true;
            let _ = self.command_tx.send(MicCommand::Stop);
        }
    }

    fn has_video(&self) -> bool {
        false
    }
}

impl Drop for CpalMicStream {
    fn drop(&mut self) {
        self.stop_all();
    }
}
