//! Engine configuration
//!
//! Named service URLs resolved from environment variables with hard-coded
//! production fallbacks, plus the tunables the session engine needs.

use crate::media::CameraOffPolicy;
use crate::{Result, VivaError};
use std::env;
use std::time::Duration;

/// Production fallbacks used when the corresponding env var is unset.
const DEFAULT_API_URL: &str = "https://api.viva.app";
const DEFAULT_AUTH_URL: &str = "https://auth.viva.app";
const DEFAULT_EDITOR_URL: &str = "https://edit.viva.app";
const DEFAULT_INTERVIEW_URL: &str = "https://interview.viva.app";
const DEFAULT_BASE_URL: &str = "https://viva.app";

/// Flat map of the service origins the client talks to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoints {
    pub api_url: String,
    pub auth_url: String,
    pub editor_url: String,
    pub interview_url: String,
    pub base_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            editor_url: DEFAULT_EDITOR_URL.to_string(),
            interview_url: DEFAULT_INTERVIEW_URL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl Endpoints {
    /// Resolve endpoints from `VIVA_*` environment variables, falling back to
    /// the production origins for anything unset.
    pub fn from_env() -> Self {
        Self {
            api_url: env_or("VIVA_API_URL", DEFAULT_API_URL),
            auth_url: env_or("VIVA_AUTH_URL", DEFAULT_AUTH_URL),
            editor_url: env_or("VIVA_EDITOR_URL", DEFAULT_EDITOR_URL),
            interview_url: env_or("VIVA_INTERVIEW_URL", DEFAULT_INTERVIEW_URL),
            base_url: env_or("VIVA_BASE_URL", DEFAULT_BASE_URL),
        }
    }

    /// The sign-in page users are sent to when the API answers 401.
    pub fn sign_in_url(&self) -> String {
        format!("{}/signin", self.auth_url.trim_end_matches('/'))
    }

    /// Websocket origin for the realtime session channel, with the session id
    /// carried as a query parameter.
    pub fn socket_url(&self, session_id: &str) -> String {
        let ws_origin = self
            .api_url
            .replacen("https://", "wss://", 1)
            .replacen("http://", "ws://", 1);
        format!("{}/?sessionId={}", ws_origin.trim_end_matches('/'), session_id)
    }
}

fn env_or(key: &str, fallback: &str) -> String {
    match env::var(key) {
        Ok(v) if !v.trim().is_empty() => v,
        _ => fallback.to_string(),
    }
}

/// Tunables for one interview session engine.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Service origins.
    pub endpoints: Endpoints,

    /// Initial countdown, in seconds.
    pub countdown_secs: u32,

    /// How many proctoring warnings to retain (oldest evicted first).
    pub warning_capacity: usize,

    /// Voice names tried in order when narrating assistant messages.
    pub voice_preferences: Vec<String>,

    /// Speech rate passed to the synthesis backend (1.0 = normal).
    pub speech_rate: f32,

    /// Whether turning the camera off mutes the track or releases it.
    pub camera_off_policy: CameraOffPolicy,

    /// Delay before the local-only fallback assistant message is appended
    /// when an answer is submitted while disconnected.
    pub offline_fallback_delay: Duration,

    /// Display name announced in the start-interview handshake.
    pub candidate_name: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            endpoints: Endpoints::default(),
            countdown_secs: 3600,
            warning_capacity: 5,
            voice_preferences: vec![
                "Google UK English Female".to_string(),
                "Samantha".to_string(),
                "Microsoft Zira".to_string(),
            ],
            speech_rate: 1.0,
            camera_off_policy: CameraOffPolicy::MuteTrack,
            offline_fallback_delay: Duration::from_millis(1500),
            candidate_name: "Candidate".to_string(),
        }
    }
}

impl EngineConfig {
    /// Create a config resolving endpoints from the environment.
    pub fn from_env() -> Self {
        Self {
            endpoints: Endpoints::from_env(),
            ..Default::default()
        }
    }

    /// Set the countdown duration in seconds.
    pub fn with_countdown_secs(mut self, secs: u32) -> Self {
        self.countdown_secs = secs;
        self
    }

    /// Set the candidate display name.
    pub fn with_candidate_name(mut self, name: impl Into<String>) -> Self {
        self.candidate_name = name.into();
        self
    }

    /// Set the camera-off policy.
    pub fn with_camera_off_policy(mut self, policy: CameraOffPolicy) -> Self {
        self.camera_off_policy = policy;
        self
    }

    /// Set the speech rate.
    pub fn with_speech_rate(mut self, rate: f32) -> Self {
        self.speech_rate = rate;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.countdown_secs == 0 {
            return Err(VivaError::ConfigError(
                "Countdown must be at least one second".into(),
            ));
        }
        if self.warning_capacity == 0 {
            return Err(VivaError::ConfigError(
                "Warning capacity must be non-zero".into(),
            ));
        }
        if !(0.1..=4.0).contains(&self.speech_rate) {
            return Err(VivaError::ConfigError(format!(
                "Speech rate out of range: {}",
                self.speech_rate
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.countdown_secs, 3600);
        assert_eq!(config.warning_capacity, 5);
    }

    #[test]
    fn test_config_builder() {
        let config = EngineConfig::default()
            .with_countdown_secs(120)
            .with_candidate_name("Ada")
            .with_speech_rate(1.5);

        assert_eq!(config.countdown_secs, 120);
        assert_eq!(config.candidate_name, "Ada");
        assert!((config.speech_rate - 1.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_validate_rejects_zero_countdown() {
        let config = EngineConfig::default().with_countdown_secs(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_sign_in_url() {
        let endpoints = Endpoints::default();
        assert_eq!(endpoints.sign_in_url(), "https://auth.viva.app/signin");
    }

    #[test]
    fn test_socket_url_carries_session_id() {
        let endpoints = Endpoints {
            api_url: "http://localhost:4000".to_string(),
            ..Endpoints::default()
        };
        assert_eq!(
            endpoints.socket_url("abc123"),
            "ws://localhost:4000/?sessionId=abc123"
        );
    }

    #[test]
    fn test_https_api_becomes_wss() {
        let endpoints = Endpoints::default();
        assert!(endpoints.socket_url("x").starts_with("wss://"));
    }
}
