//! Session lifecycle
//!
//! The page moves through a small set of phases; every decision that used to
//! hang off scattered booleans (loading, connected, ended) keys off one enum.

/// Where the session page is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPhase {
    /// Mounted, nothing started yet.
    Idle,

    /// The session record fetch is in flight.
    FetchingSession,

    /// Fetch resolved and the realtime channel is live; the interview runs.
    Connected,

    /// The candidate ended the interview. Terminal.
    Ended,

    /// Startup failed (fetch error, bad session id). Terminal, with the
    /// user-facing reason.
    Failed(String),
}

impl SessionPhase {
    /// Whether answers may be submitted to the server in this phase.
    pub fn can_send(&self) -> bool {
        matches!(self, SessionPhase::Connected)
    }

    /// Whether the session has reached a state it cannot leave.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionPhase::Ended | SessionPhase::Failed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_connected_can_send() {
        assert!(!SessionPhase::Idle.can_send());
        assert!(!SessionPhase::FetchingSession.can_send());
        assert!(SessionPhase::Connected.can_send());
        assert!(!SessionPhase::Ended.can_send());
        assert!(!SessionPhase::Failed("boom".into()).can_send());
    }

    #[test]
    fn test_terminal_phases() {
        assert!(SessionPhase::Ended.is_terminal());
        assert!(SessionPhase::Failed("boom".into()).is_terminal());
        assert!(!SessionPhase::Connected.is_terminal());
    }
}
