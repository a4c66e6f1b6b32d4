//! Speech output: narrates assistant messages through a platform synthesis
//! backend, tracking a single `is_speaking` flag for UI animation gating.

pub mod narrator;

pub use narrator::Narrator;

use crate::Result;
use uuid::Uuid;

/// A voice offered by the synthesis backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    pub name: String,
    pub language: String,
}

impl Voice {
    pub fn new(name: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            language: language.into(),
        }
    }
}

/// One utterance handed to the backend.
#[derive(Debug, Clone)]
pub struct Utterance {
    pub id: Uuid,
    pub text: String,
    /// Chosen voice name, or None for the platform default.
    pub voice: Option<String>,
    pub rate: f32,
}

/// Event emitted by the synthesis backend for a specific utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechEvent {
    Started(Uuid),
    Finished(Uuid),
    Failed(Uuid, String),
}

/// Platform adapter over a speech synthesis engine.
///
/// Backends play at most one utterance at a time; `speak` on a busy backend
/// replaces whatever is in flight. Progress is reported through the event
/// channel handed out at construction time.
pub trait SpeechSynth: Send {
    /// Whether synthesis is available at all. When false, narration
    /// silently no-ops.
    fn available(&self) -> bool;

    /// Voices the platform offers.
    fn voices(&self) -> Vec<Voice>;

    /// Begin speaking. Must not block for the duration of playback.
    fn speak(&mut self, utterance: &Utterance) -> Result<()>;

    /// Abandon the in-flight utterance, if any.
    fn cancel(&mut self);
}

/// Backend for hosts without a synthesis engine; reports unavailable so the
/// narrator degrades to text-only.
pub struct NullSynth;

impl SpeechSynth for NullSynth {
    fn available(&self) -> bool {
        false
    }

    fn voices(&self) -> Vec<Voice> {
        Vec::new()
    }

    fn speak(&mut self, _utterance: &Utterance) -> Result<()> {
        Ok(())
    }

    fn cancel(&mut self) {}
}
