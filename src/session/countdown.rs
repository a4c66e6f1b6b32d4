//! Interview countdown
//!
//! Ticks once per second regardless of connectivity or focus, and floors at
//! zero rather than going negative.

/// Remaining-time counter for the session header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    remaining_secs: u32,
}

impl Countdown {
    pub fn new(secs: u32) -> Self {
        Self {
            remaining_secs: secs,
        }
    }

    /// Advance one second. Returns the new remaining value.
    pub fn tick(&mut self) -> u32 {
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        self.remaining_secs
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn is_expired(&self) -> bool {
        self.remaining_secs == 0
    }

    /// `MM:SS` display form (minutes may exceed two digits for long sessions).
    pub fn display(&self) -> String {
        format!(
            "{:02}:{:02}",
            self.remaining_secs / 60,
            self.remaining_secs % 60
        )
    }
}
