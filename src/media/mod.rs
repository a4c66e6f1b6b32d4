//! Media capture: ownership of the camera/microphone handle with per-track
//! enable controls and guaranteed release.

pub mod capture;
#[cfg(feature = "audio-io")]
pub mod mic;

pub use capture::{CaptureBackend, CaptureStream, MediaSession, NullCaptureBackend};
#[cfg(feature = "audio-io")]
pub use mic::CpalMicBackend;

/// What "camera off" means for the underlying hardware.
///
/// The original behavior keeps the device lock while the track is merely
/// muted, so the hardware indicator stays lit. Releasing instead drops the
/// video track entirely, and turning the camera back on requires a fresh
/// acquisition (and possibly a new permission prompt).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraOffPolicy {
    /// Keep the device, flip the track-enabled flag. Synchronous, no
    /// re-prompt, camera LED stays on.
    #[default]
    MuteTrack,

    /// Stop the video track and release the hardware; re-enabling
    /// re-acquires the device.
    ReleaseTrack,
}
