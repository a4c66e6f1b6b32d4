//! Proctoring: detects signals correlated with the candidate leaving the
//! assessment context and keeps a bounded violation summary.

pub mod tracker;

pub use tracker::{ProctorSignal, ProctorStats, ViolationTracker, MAX_WARNINGS};

use crate::Result;

/// Platform adapter for the viewport the assessment runs in.
///
/// Implementations wrap whatever the host environment offers (a browser's
/// Fullscreen API, a native window). Tests substitute an in-memory fake.
pub trait ViewportMonitor: Send + Sync {
    /// Whether the viewport is currently fullscreen.
    fn is_fullscreen(&self) -> bool;

    /// Ask the host to enter fullscreen. May fail when the platform refuses
    /// (missing user gesture, permission rejected).
    fn request_fullscreen(&self) -> Result<()>;
}

/// Viewport monitor for hosts without a fullscreen capability.
///
/// Reports not-fullscreen and refuses requests, which the tracker treats as
/// a swallowed, non-fatal denial.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullViewport;

impl ViewportMonitor for NullViewport {
    fn is_fullscreen(&self) -> bool {
        false
    }

    fn request_fullscreen(&self) -> Result<()> {
        Err(crate::VivaError::PermissionDenied(
            "fullscreen is not available on this platform".into(),
        ))
    }
}
