//! Session channel
//!
//! Wraps a transport with the interview protocol rules: the start-interview
//! handshake fires only after the session record has been fetched, and at
//! most once per channel.

use super::transport::{Transport, TransportEvent};
use super::wire::{self, IncomingMessage};
use crate::Result;
use tracing::{debug, info};

/// Handshake payload, available only once the session fetch has resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartPayload {
    pub name: String,
    pub role: String,
    pub session_id: String,
}

/// What a transport event meant for the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelUpdate {
    Connectivity(bool),
    Message(IncomingMessage),
    None,
}

pub struct SessionChannel {
    transport: Box<dyn Transport>,
    connected: bool,
    started: bool,
    pending_start: Option<StartPayload>,
}

impl SessionChannel {
    pub fn new(transport: Box<dyn Transport>) -> Self {
        Self {
            transport,
            connected: false,
            started: false,
            pending_start: None,
        }
    }

    /// Record the handshake payload. Called only from the session-fetch
    /// success continuation, which is what guarantees the fetch-then-start
    /// ordering.
    pub fn set_start_payload(&mut self, payload: StartPayload) {
        self.pending_start = Some(payload);
        self.try_start();
    }

    /// Apply one transport event.
    pub fn handle_event(&mut self, event: TransportEvent) -> ChannelUpdate {
        match event {
            TransportEvent::Connected => {
                self.connected = true;
                self.try_start();
                ChannelUpdate::Connectivity(true)
            }
            TransportEvent::Disconnected => {
                self.connected = false;
                ChannelUpdate::Connectivity(false)
            }
            TransportEvent::Frame(frame) => match wire::decode(&frame) {
                Some(message) => ChannelUpdate::Message(message),
                // Nothing to display, nothing to speak.
                None => ChannelUpdate::None,
            },
        }
    }

    /// Emit start-interview if connected and the payload is in hand.
    /// Guarded so it fires exactly once.
    fn try_start(&mut self) {
        if self.started || !self.connected {
            return;
        }
        let Some(payload) = self.pending_start.as_ref() else {
            return;
        };

        let frame =
            wire::encode_start_interview(&payload.name, &payload.role, &payload.session_id);
        if self.transport.send(frame).is_ok() {
            self.started = true;
            info!(session_id = %payload.session_id, "start-interview emitted");
        }
    }

    /// Send a user answer. Fails when disconnected; the caller decides what
    /// to show, and the message is not resent.
    pub fn send_user_message(&mut self, content: &str) -> Result<()> {
        if !self.connected {
            debug!("answer submitted while disconnected");
            return Err(crate::VivaError::TransportError(
                "not connected".into(),
            ));
        }
        self.transport.send(wire::encode_send_message(content))
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn disconnect(&mut self) {
        self.transport.disconnect();
        self.connected = false;
    }
}
