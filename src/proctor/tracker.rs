//! Violation tracker
//!
//! Accumulates tab-visibility and fullscreen transitions into a violation
//! count and a bounded warning log. Signals are delivered by the embedding
//! shell; the tracker itself owns no event loop.

use super::ViewportMonitor;
use chrono::Local;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, warn};

/// Number of warnings retained; older entries are evicted first.
pub const MAX_WARNINGS: usize = 5;

/// A viewport signal observed by the embedding shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProctorSignal {
    /// The page/window became hidden (tab switch, minimize).
    VisibilityHidden,

    /// The page/window became visible again.
    VisibilityRestored,

    /// The viewport entered fullscreen.
    FullscreenEntered,

    /// The viewport left fullscreen.
    FullscreenExited,

    /// Keyboard focus left the window. Observed but never counted: focus
    /// flips on ordinary interactions, so it is too noisy to treat as
    /// leaving the assessment.
    FocusLost,
}

/// Read-only proctoring summary.
#[derive(Debug, Clone)]
pub struct ProctorStats {
    pub violation_count: u32,
    pub is_tab_active: bool,
    pub is_fullscreen: bool,
    pub warnings: VecDeque<String>,
}

impl Default for ProctorStats {
    fn default() -> Self {
        Self {
            violation_count: 0,
            is_tab_active: true,
            is_fullscreen: false,
            warnings: VecDeque::with_capacity(MAX_WARNINGS),
        }
    }
}

/// Tracks candidate-left-the-context signals while active.
pub struct ViolationTracker {
    stats: ProctorStats,
    active: bool,
    capacity: usize,
    viewport: Arc<dyn ViewportMonitor>,
}

impl ViolationTracker {
    pub fn new(viewport: Arc<dyn ViewportMonitor>) -> Self {
        Self::with_capacity(viewport, MAX_WARNINGS)
    }

    /// Tracker with a non-default warning log size.
    pub fn with_capacity(viewport: Arc<dyn ViewportMonitor>, capacity: usize) -> Self {
        Self {
            stats: ProctorStats::default(),
            active: false,
            capacity,
            viewport,
        }
    }

    /// Start observing signals. Seeds the fullscreen flag from the current
    /// viewport state, matching listener installation on the original page.
    pub fn activate(&mut self) {
        self.active = true;
        self.stats.is_fullscreen = self.viewport.is_fullscreen();
        debug!(is_fullscreen = self.stats.is_fullscreen, "proctoring active");
    }

    /// Stop observing. Subsequent signals are ignored until reactivated.
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Apply one observed signal. Inactive trackers ignore everything.
    pub fn observe(&mut self, signal: ProctorSignal) {
        if !self.active {
            return;
        }

        match signal {
            ProctorSignal::VisibilityHidden => {
                self.stats.is_tab_active = false;
                self.log_violation("Tab switch/Window hidden");
            }
            ProctorSignal::VisibilityRestored => {
                self.stats.is_tab_active = true;
            }
            ProctorSignal::FullscreenEntered => {
                self.stats.is_fullscreen = true;
            }
            ProctorSignal::FullscreenExited => {
                self.stats.is_fullscreen = false;
                self.log_violation("Exited fullscreen");
            }
            ProctorSignal::FocusLost => {
                // Tracked as a minor signal only; strict visibility state is
                // the reliable indicator.
                debug!("window focus lost");
            }
        }
    }

    /// Record a violation unconditionally: no de-duplication or debounce, so
    /// a flapping signal produces one violation per flap.
    pub fn log_violation(&mut self, kind: &str) {
        self.stats.violation_count += 1;
        let entry = format!("{} detected at {}", kind, Local::now().format("%H:%M:%S"));
        self.stats.warnings.push_back(entry);
        while self.stats.warnings.len() > self.capacity {
            self.stats.warnings.pop_front();
        }
        warn!(
            kind,
            count = self.stats.violation_count,
            "proctoring violation"
        );
    }

    /// Best-effort fullscreen request. Denial is swallowed and logged only;
    /// it never counts as a violation and is never retried.
    pub fn request_fullscreen(&self) {
        if let Err(e) = self.viewport.request_fullscreen() {
            warn!(error = %e, "fullscreen request denied");
        }
    }

    pub fn stats(&self) -> &ProctorStats {
        &self.stats
    }

    pub fn has_violations(&self) -> bool {
        self.stats.violation_count > 0
    }
}
