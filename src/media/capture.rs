//! Capture session lifecycle
//!
//! One `MediaSession` exclusively owns the audio+video capture handle for a
//! mounted interview page. Acquisition happens at most once; toggling
//! operates on the existing handle's tracks; every track is stopped on
//! release and on drop.

use super::CameraOffPolicy;
use crate::{Result, VivaError};
use tracing::{debug, info, warn};

/// A live capture handle obtained from a [`CaptureBackend`].
///
/// Implementations wrap the platform's stream object. Toggling a track is
/// synchronous and must not touch the permission system.
pub trait CaptureStream: Send {
    /// Enable or disable the audio track.
    fn set_audio_enabled(&mut self, enabled: bool);

    /// Enable or disable the video track.
    fn set_video_enabled(&mut self, enabled: bool);

    /// Stop the video track entirely, releasing its device.
    fn stop_video(&mut self);

    /// Stop every track. Called on teardown; must be idempotent.
    fn stop_all(&mut self);

    /// Whether this stream carries a video track.
    fn has_video(&self) -> bool;
}

/// Platform adapter that performs device acquisition.
pub trait CaptureBackend: Send {
    /// Request a combined audio+video capture handle. Fails on permission
    /// refusal, missing devices, or a busy device; callers never retry.
    fn acquire(&mut self) -> Result<Box<dyn CaptureStream>>;
}

/// Owns the capture handle and the two track flags.
///
/// Invariant: when no handle is held, both flags are false.
pub struct MediaSession {
    backend: Box<dyn CaptureBackend>,
    stream: Option<Box<dyn CaptureStream>>,
    is_mic_on: bool,
    is_camera_on: bool,
    camera_off_policy: CameraOffPolicy,
}

impl MediaSession {
    pub fn new(backend: Box<dyn CaptureBackend>, camera_off_policy: CameraOffPolicy) -> Self {
        Self {
            backend,
            stream: None,
            is_mic_on: false,
            is_camera_on: false,
            camera_off_policy,
        }
    }

    /// Acquire the capture handle. On denial both flags stay false, no
    /// handle is stored, and no retry is attempted.
    pub fn acquire(&mut self) -> Result<()> {
        if self.stream.is_some() {
            debug!("capture already acquired");
            return Ok(());
        }

        match self.backend.acquire() {
            Ok(stream) => {
                self.is_camera_on = stream.has_video();
                self.is_mic_on = true;
                self.stream = Some(stream);
                info!(camera = self.is_camera_on, "capture acquired");
                Ok(())
            }
            Err(e) => {
                self.is_mic_on = false;
                self.is_camera_on = false;
                warn!(error = %e, "capture acquisition failed");
                Err(e)
            }
        }
    }

    /// Flip the microphone track. Synchronous; operates on the existing
    /// handle only and never re-requests the device.
    pub fn toggle_mic(&mut self) -> bool {
        if let Some(stream) = self.stream.as_mut() {
            self.is_mic_on = !self.is_mic_on;
            stream.set_audio_enabled(self.is_mic_on);
        }
        self.is_mic_on
    }

    /// Flip the camera track according to the configured off-policy.
    pub fn toggle_camera(&mut self) -> Result<bool> {
        let Some(stream) = self.stream.as_mut() else {
            return Ok(false);
        };

        if self.is_camera_on {
            match self.camera_off_policy {
                CameraOffPolicy::MuteTrack => stream.set_video_enabled(false),
                CameraOffPolicy::ReleaseTrack => stream.stop_video(),
            }
            self.is_camera_on = false;
        } else {
            match self.camera_off_policy {
                CameraOffPolicy::MuteTrack => {
                    stream.set_video_enabled(true);
                    self.is_camera_on = true;
                }
                CameraOffPolicy::ReleaseTrack => {
                    // The video track was stopped; the whole handle has to be
                    // re-acquired to get it back.
                    if let Some(mut old) = self.stream.take() {
                        old.stop_all();
                    }
                    self.is_mic_on = false;
                    self.acquire()?;
                }
            }
        }
        Ok(self.is_camera_on)
    }

    /// Stop every held track and drop the handle. Idempotent.
    pub fn release(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop_all();
            info!("capture released");
        }
        self.is_mic_on = false;
        self.is_camera_on = false;
    }

    pub fn is_mic_on(&self) -> bool {
        self.is_mic_on
    }

    pub fn is_camera_on(&self) -> bool {
        self.is_camera_on
    }

    pub fn is_acquired(&self) -> bool {
        self.stream.is_some()
    }
}

impl Drop for MediaSession {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for MediaSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaSession")
            .field("acquired", &self.stream.is_some())
            .field("is_mic_on", &self.is_mic_on)
            .field("is_camera_on", &self.is_camera_on)
            .finish()
    }
}

/// Backend for hosts without capture hardware; acquisition always fails.
pub struct NullCaptureBackend;

impl CaptureBackend for NullCaptureBackend {
    fn acquire(&mut self) -> Result<Box<dyn CaptureStream>> {
        Err(VivaError::MediaDeviceError(
            "no capture device available on this platform".into(),
        ))
    }
}
