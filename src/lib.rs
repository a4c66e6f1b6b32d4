pub mod api;
pub mod channel;
pub mod config;
pub mod media;
pub mod proctor;
pub mod session;
pub mod speech;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum VivaError {
    #[error("Media device error: {0}")]
    MediaDeviceError(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Speech error: {0}")]
    SpeechError(String),

    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Not authenticated; sign in at {sign_in_url}")]
    NotAuthenticated { sign_in_url: String },

    #[error("Session error: {0}")]
    SessionError(String),

    #[error("Channel error: {0}")]
    ChannelError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IOError(String),
}

impl From<std::io::Error> for VivaError {
    fn from(e: std::io::Error) -> Self {
        VivaError::IOError(e.to_string())
    }
}

impl VivaError {
    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            // Hardware/permission errors require user intervention
            VivaError::MediaDeviceError(_) => false,
            VivaError::PermissionDenied(_) => false,
            // Speech failures degrade to text-only display
            VivaError::SpeechError(_) => true,
            // The transport reconnects on its own; API calls can be retried
            VivaError::TransportError(_) => true,
            VivaError::ApiError(_) => true,
            VivaError::NotAuthenticated { .. } => false,
            VivaError::SessionError(_) => true,
            VivaError::ChannelError(_) => false,
            VivaError::ConfigError(_) => false,
            VivaError::IOError(_) => false,
        }
    }

    /// Get a user-friendly description
    pub fn user_message(&self) -> String {
        match self {
            VivaError::MediaDeviceError(_) => {
                "Camera or microphone unavailable. Please check your devices.".to_string()
            }
            VivaError::PermissionDenied(_) => "Camera/Mic permission denied.".to_string(),
            VivaError::SpeechError(_) => {
                "Speech output failed. The question will be shown as text.".to_string()
            }
            VivaError::TransportError(_) => {
                "Connection lost. Please check your network and try again.".to_string()
            }
            VivaError::ApiError(_) => {
                "Failed to reach the interview service. Please try again.".to_string()
            }
            VivaError::NotAuthenticated { sign_in_url } => {
                format!("Session expired or not logged in. Sign in at {sign_in_url}.")
            }
            VivaError::SessionError(_) => "Interview session error. Please try again.".to_string(),
            VivaError::ChannelError(_) => {
                "Internal communication error. Please restart the application.".to_string()
            }
            VivaError::ConfigError(_) => "Configuration error. Please check settings.".to_string(),
            VivaError::IOError(_) => "File system error occurred.".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, VivaError>;
