//! Narrator
//!
//! At-most-one utterance at a time: a new `speak` preempts the previous one
//! rather than queuing behind it. The narrator selects a preferred voice by
//! name-matching the backend's inventory and keeps an `is_speaking` flag for
//! the duration of the current utterance.

use super::{SpeechEvent, SpeechSynth, Utterance, Voice};
use crossbeam_channel::Receiver;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

pub struct Narrator {
    backend: Box<dyn SpeechSynth>,
    events: Receiver<SpeechEvent>,
    voice_preferences: Vec<String>,
    rate: f32,
    /// Voice chosen on first use; None until then or when nothing matches.
    selected_voice: Option<String>,
    voice_selected: bool,
    current: Option<Uuid>,
    is_speaking: Arc<AtomicBool>,
}

impl Narrator {
    /// Create a narrator over a backend and the event channel its concrete
    /// type handed out at construction.
    pub fn new(
        backend: Box<dyn SpeechSynth>,
        events: Receiver<SpeechEvent>,
        voice_preferences: Vec<String>,
        rate: f32,
    ) -> Self {
        Self {
            backend,
            events,
            voice_preferences,
            rate,
            selected_voice: None,
            voice_selected: false,
            current: None,
            is_speaking: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Narrate `text`, preempting any in-flight utterance.
    ///
    /// No-ops entirely when the backend reports synthesis unavailable.
    pub fn speak(&mut self, text: &str) {
        if !self.backend.available() {
            debug!("speech synthesis unavailable; skipping narration");
            return;
        }
        if text.trim().is_empty() {
            return;
        }

        if self.current.is_some() {
            // The prior utterance is abandoned, not completed.
            self.backend.cancel();
        }

        if !self.voice_selected {
            self.selected_voice = select_voice(&self.backend.voices(), &self.voice_preferences);
            self.voice_selected = true;
            debug!(voice = ?self.selected_voice, "voice selected");
        }

        let utterance = Utterance {
            id: Uuid::new_v4(),
            text: text.to_string(),
            voice: self.selected_voice.clone(),
            rate: self.rate,
        };

        match self.backend.speak(&utterance) {
            Ok(()) => {
                self.current = Some(utterance.id);
                self.is_speaking.store(true, Ordering::SeqCst);
            }
            Err(e) => {
                warn!(error = %e, "narration failed to start");
                self.current = None;
                self.is_speaking.store(false, Ordering::SeqCst);
            }
        }
    }

    /// Stop the current utterance, if any.
    pub fn stop(&mut self) {
        if self.current.take().is_some() {
            self.backend.cancel();
            self.is_speaking.store(false, Ordering::SeqCst);
        }
    }

    /// Drain backend events and update the speaking flag. Events for
    /// superseded utterances are ignored.
    pub fn pump(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            match event {
                SpeechEvent::Started(id) => {
                    if self.current == Some(id) {
                        self.is_speaking.store(true, Ordering::SeqCst);
                    }
                }
                SpeechEvent::Finished(id) => {
                    if self.current == Some(id) {
                        self.current = None;
                        self.is_speaking.store(false, Ordering::SeqCst);
                    }
                }
                SpeechEvent::Failed(id, reason) => {
                    if self.current == Some(id) {
                        warn!(reason, "utterance failed");
                        self.current = None;
                        self.is_speaking.store(false, Ordering::SeqCst);
                    }
                }
            }
        }
    }

    pub fn is_speaking(&self) -> bool {
        self.is_speaking.load(Ordering::SeqCst)
    }

    /// Shared flag for UI animation gating.
    pub fn speaking_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.is_speaking)
    }
}

/// Pick the first preference that matches a platform voice by name
/// (case-insensitive substring), or None for the platform default.
fn select_voice(voices: &[Voice], preferences: &[String]) -> Option<String> {
    for preference in preferences {
        let wanted = preference.to_lowercase();
        if let Some(voice) = voices
            .iter()
            .find(|v| v.name.to_lowercase().contains(&wanted))
        {
            return Some(voice.name.clone());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Result;
    use crossbeam_channel::{unbounded, Sender};
    use parking_lot::Mutex;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Cancel,
        Speak(String),
    }

    struct StubSynth {
        available: bool,
        voices: Vec<Voice>,
        calls: Arc<Mutex<Vec<Call>>>,
        events_tx: Sender<SpeechEvent>,
        last_utterance: Arc<Mutex<Option<Utterance>>>,
    }

    impl SpeechSynth for StubSynth {
        fn available(&self) -> bool {
            self.available
        }

        fn voices(&self) -> Vec<Voice> {
            self.voices.clone()
        }

        fn speak(&mut self, utterance: &Utterance) -> Result<()> {
            self.calls.lock().push(Call::Speak(utterance.text.clone()));
            *self.last_utterance.lock() = Some(utterance.clone());
            let _ = self.events_tx.send(SpeechEvent::Started(utterance.id));
            Ok(())
        }

        fn cancel(&mut self) {
            self.calls.lock().push(Call::Cancel);
        }
    }

    struct Rig {
        narrator: Narrator,
        calls: Arc<Mutex<Vec<Call>>>,
        events_tx: Sender<SpeechEvent>,
        last_utterance: Arc<Mutex<Option<Utterance>>>,
    }

    fn rig(available: bool, voices: Vec<Voice>, preferences: Vec<String>) -> Rig {
        let (events_tx, events_rx) = unbounded();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let last_utterance = Arc::new(Mutex::new(None));
        let backend = StubSynth {
            available,
            voices,
            calls: Arc::clone(&calls),
            events_tx: events_tx.clone(),
            last_utterance: Arc::clone(&last_utterance),
        };
        Rig {
            narrator: Narrator::new(Box::new(backend), events_rx, preferences, 1.0),
            calls,
            events_tx,
            last_utterance,
        }
    }

    #[test]
    fn test_speak_sets_and_clears_speaking() {
        let mut r = rig(true, vec![], vec![]);
        r.narrator.speak("Hello");
        r.narrator.pump();
        assert!(r.narrator.is_speaking());

        let id = r.last_utterance.lock().as_ref().unwrap().id;
        r.events_tx.send(SpeechEvent::Finished(id)).unwrap();
        r.narrator.pump();
        assert!(!r.narrator.is_speaking());
    }

    #[test]
    fn test_preemption_cancels_then_speaks_latest() {
        let mut r = rig(true, vec![], vec![]);
        r.narrator.speak("A");
        r.narrator.speak("B");

        let calls = r.calls.lock().clone();
        assert_eq!(
            calls,
            vec![
                Call::Speak("A".to_string()),
                Call::Cancel,
                Call::Speak("B".to_string()),
            ]
        );

        // Only B's completion ends the speaking state.
        let id_b = r.last_utterance.lock().as_ref().unwrap().id;
        r.events_tx.send(SpeechEvent::Finished(id_b)).unwrap();
        r.narrator.pump();
        assert!(!r.narrator.is_speaking());
    }

    #[test]
    fn test_stale_events_for_superseded_utterance_ignored() {
        let mut r = rig(true, vec![], vec![]);
        r.narrator.speak("A");
        let id_a = r.last_utterance.lock().as_ref().unwrap().id;
        r.narrator.speak("B");

        // A's late completion must not clear B's speaking state.
        r.events_tx.send(SpeechEvent::Finished(id_a)).unwrap();
        r.narrator.pump();
        assert!(r.narrator.is_speaking());
    }

    #[test]
    fn test_unavailable_backend_noops() {
        let mut r = rig(false, vec![], vec![]);
        r.narrator.speak("Hello");
        assert!(r.calls.lock().is_empty());
        assert!(!r.narrator.is_speaking());
    }

    #[test]
    fn test_empty_text_noops() {
        let mut r = rig(true, vec![], vec![]);
        r.narrator.speak("   ");
        assert!(r.calls.lock().is_empty());
    }

    #[test]
    fn test_voice_preference_matching() {
        let voices = vec![
            Voice::new("Alex", "en-US"),
            Voice::new("Google UK English Female", "en-GB"),
        ];
        let preferences = vec!["Samantha".to_string(), "google uk".to_string()];
        let mut r = rig(true, voices, preferences);
        r.narrator.speak("Hello");
        assert_eq!(
            r.last_utterance.lock().as_ref().unwrap().voice.as_deref(),
            Some("Google UK English Female")
        );
    }

    #[test]
    fn test_voice_fallback_to_platform_default() {
        let voices = vec![Voice::new("Alex", "en-US")];
        let preferences = vec!["Samantha".to_string()];
        let mut r = rig(true, voices, preferences);
        r.narrator.speak("Hello");
        assert!(r.last_utterance.lock().as_ref().unwrap().voice.is_none());
    }

    #[test]
    fn test_failed_utterance_clears_speaking() {
        let mut r = rig(true, vec![], vec![]);
        r.narrator.speak("Hello");
        let id = r.last_utterance.lock().as_ref().unwrap().id;
        r.events_tx
            .send(SpeechEvent::Failed(id, "engine died".to_string()))
            .unwrap();
        r.narrator.pump();
        assert!(!r.narrator.is_speaking());
    }

    #[test]
    fn test_stop_cancels_current() {
        let mut r = rig(true, vec![], vec![]);
        r.narrator.speak("Hello");
        r.narrator.stop();
        assert!(!r.narrator.is_speaking());
        assert_eq!(r.calls.lock().last(), Some(&Call::Cancel));
    }
}
