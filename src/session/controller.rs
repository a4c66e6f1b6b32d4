//! Session controller
//!
//! Owns everything a live interview page holds: the transcript, countdown,
//! proctoring tracker, media session, narrator, and the realtime channel.
//! Commands arrive over an async channel from the embedding shell; state
//! changes go back out as [`SessionEvent`]s.
//!
//! Startup ordering: the session record fetch and the socket connect run
//! concurrently, and the start-interview handshake fires only once both have
//! resolved. A fetch failure is terminal; a media failure is not.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, Sender};
use tokio::sync::mpsc;
use tokio::time::{interval, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::api::SessionApi;
use crate::channel::{ChannelUpdate, IncomingMessage, SessionChannel, StartPayload, TransportEvent};
use crate::config::EngineConfig;
use crate::media::MediaSession;
use crate::proctor::{ProctorSignal, ViolationTracker};
use crate::speech::Narrator;
use crate::{Result, VivaError};

use super::countdown::Countdown;
use super::state::SessionPhase;
use super::transcript::{ChatMessage, Transcript};

/// How often the controller drains narrator events and timer deadlines.
const PUMP_INTERVAL: Duration = Duration::from_millis(100);

/// Commands from the embedding shell.
#[derive(Debug, Clone)]
pub enum SessionCommand {
    /// Submit one candidate answer.
    SubmitAnswer(String),
    ToggleMic,
    ToggleCamera,
    /// A viewport signal observed by the shell.
    Proctor(ProctorSignal),
    RequestFullscreen,
    EndInterview,
}

/// State changes pushed to the embedding shell.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    PhaseChanged(SessionPhase),
    MessageAppended(ChatMessage),
    ConnectivityChanged(bool),
    CountdownTick(u32),
    ViolationLogged { count: u32, warning: String },
    SpeakingChanged(bool),
    /// A user-facing failure description. The session may still be usable;
    /// terminal failures also carry a `PhaseChanged(Failed)`.
    Error(String),
}

/// Cheap handle for driving a running controller.
#[derive(Clone)]
pub struct ControllerHandle {
    command_tx: mpsc::Sender<SessionCommand>,
    events: Receiver<SessionEvent>,
    transcript: Transcript,
    speaking: Arc<AtomicBool>,
    cancel: CancellationToken,
}

impl ControllerHandle {
    pub fn submit_answer(&self, content: impl Into<String>) -> Result<()> {
        self.send(SessionCommand::SubmitAnswer(content.into()))
    }

    pub fn toggle_mic(&self) -> Result<()> {
        self.send(SessionCommand::ToggleMic)
    }

    pub fn toggle_camera(&self) -> Result<()> {
        self.send(SessionCommand::ToggleCamera)
    }

    pub fn observe(&self, signal: ProctorSignal) -> Result<()> {
        self.send(SessionCommand::Proctor(signal))
    }

    pub fn request_fullscreen(&self) -> Result<()> {
        self.send(SessionCommand::RequestFullscreen)
    }

    pub fn end_interview(&self) -> Result<()> {
        self.send(SessionCommand::EndInterview)
    }

    /// Event stream for the shell to render from.
    pub fn events(&self) -> &Receiver<SessionEvent> {
        &self.events
    }

    /// Shared view of the chat history.
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Whether the assistant is currently being narrated.
    pub fn is_speaking(&self) -> bool {
        self.speaking.load(Ordering::SeqCst)
    }

    /// Abort the controller without the end-interview teardown protocol.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    fn send(&self, command: SessionCommand) -> Result<()> {
        self.command_tx
            .try_send(command)
            .map_err(|e| VivaError::ChannelError(format!("controller unavailable: {e}")))
    }
}

pub struct SessionController {
    config: EngineConfig,
    session_id: String,
    api: Arc<dyn SessionApi>,
    channel: SessionChannel,
    transport_rx: mpsc::Receiver<TransportEvent>,
    media: MediaSession,
    narrator: Narrator,
    tracker: ViolationTracker,

    phase: SessionPhase,
    countdown: Countdown,
    transcript: Transcript,
    was_speaking: bool,
    /// Deadlines for local fallback replies to answers submitted offline.
    pending_fallbacks: VecDeque<Instant>,

    command_rx: mpsc::Receiver<SessionCommand>,
    event_tx: Sender<SessionEvent>,
    cancel: CancellationToken,
}

impl SessionController {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: EngineConfig,
        session_id: String,
        api: Arc<dyn SessionApi>,
        channel: SessionChannel,
        transport_rx: mpsc::Receiver<TransportEvent>,
        media: MediaSession,
        narrator: Narrator,
        tracker: ViolationTracker,
        cancel: CancellationToken,
    ) -> (Self, ControllerHandle) {
        let (command_tx, command_rx) = mpsc::channel(64);
        let (event_tx, event_rx) = unbounded();
        let transcript = Transcript::new();
        let countdown = Countdown::new(config.countdown_secs);

        let handle = ControllerHandle {
            command_tx,
            events: event_rx,
            transcript: transcript.clone(),
            speaking: narrator.speaking_flag(),
            cancel: cancel.clone(),
        };

        let controller = Self {
            config,
            session_id,
            api,
            channel,
            transport_rx,
            media,
            narrator,
            tracker,
            phase: SessionPhase::Idle,
            countdown,
            transcript,
            was_speaking: false,
            pending_fallbacks: VecDeque::new(),
            command_rx,
            event_tx,
            cancel,
        };

        (controller, handle)
    }

    /// Drive the session until it ends, fails, or is cancelled.
    pub async fn run(mut self) {
        info!(session_id = %self.session_id, "session controller starting");

        self.tracker.activate();
        self.set_phase(SessionPhase::FetchingSession);

        // Device denial leaves the interview usable in degraded form.
        if let Err(e) = self.media.acquire() {
            self.emit(SessionEvent::Error(e.user_message()));
        }

        let api = Arc::clone(&self.api);
        let session_id = self.session_id.clone();
        let mut fetch = Box::pin(async move { api.fetch_session(&session_id).await });
        let mut fetch_done = false;
        let mut transport_open = true;

        let mut tick = interval(Duration::from_secs(1));
        tick.tick().await;
        let mut pump = interval(PUMP_INTERVAL);

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    debug!("controller cancelled");
                    break;
                }
                record = &mut fetch, if !fetch_done => {
                    fetch_done = true;
                    match record {
                        Ok(record) => {
                            info!(session_id = %record.id, "session record fetched");
                            self.channel.set_start_payload(StartPayload {
                                name: self.config.candidate_name.clone(),
                                role: record.role_label().to_string(),
                                session_id: record.id,
                            });
                            self.maybe_mark_connected();
                        }
                        Err(e) => {
                            error!(error = %e, "session fetch failed");
                            self.emit(SessionEvent::Error(e.user_message()));
                            self.set_phase(SessionPhase::Failed(e.user_message()));
                            break;
                        }
                    }
                }
                command = self.command_rx.recv() => match command {
                    Some(SessionCommand::EndInterview) => {
                        self.set_phase(SessionPhase::Ended);
                        break;
                    }
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                event = self.transport_rx.recv(), if transport_open => match event {
                    Some(event) => self.handle_transport_event(event),
                    None => {
                        // Closed channels resolve immediately; the arm must
                        // be disabled or the loop never parks again.
                        transport_open = false;
                        debug!("transport event stream closed");
                    }
                },
                _ = tick.tick() => {
                    let remaining = self.countdown.tick();
                    self.emit(SessionEvent::CountdownTick(remaining));
                }
                _ = pump.tick() => self.pump(),
            }
        }

        self.teardown();
    }

    fn handle_command(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::SubmitAnswer(content) => self.submit_answer(content),
            SessionCommand::ToggleMic => {
                let on = self.media.toggle_mic();
                debug!(on, "microphone toggled");
            }
            SessionCommand::ToggleCamera => match self.media.toggle_camera() {
                Ok(on) => debug!(on, "camera toggled"),
                Err(e) => {
                    warn!(error = %e, "camera toggle failed");
                    self.emit(SessionEvent::Error(e.user_message()));
                }
            },
            SessionCommand::Proctor(signal) => {
                let before = self.tracker.stats().violation_count;
                self.tracker.observe(signal);
                let stats = self.tracker.stats();
                if stats.violation_count > before {
                    if let Some(warning) = stats.warnings.back() {
                        self.emit(SessionEvent::ViolationLogged {
                            count: stats.violation_count,
                            warning: warning.clone(),
                        });
                    }
                }
            }
            SessionCommand::RequestFullscreen => self.tracker.request_fullscreen(),
            // Intercepted by the select loop so it can break.
            SessionCommand::EndInterview => {}
        }
    }

    fn submit_answer(&mut self, content: String) {
        if content.trim().is_empty() {
            return;
        }

        let message = ChatMessage::user(content.clone());
        self.transcript.append(message.clone());
        self.emit(SessionEvent::MessageAppended(message));

        if self.phase.can_send() && self.channel.is_connected() {
            if let Err(e) = self.channel.send_user_message(&content) {
                warn!(error = %e, "answer send failed");
                self.schedule_offline_fallback();
            }
        } else {
            // The answer is not queued for resend; the candidate gets a
            // local reply explaining the outage after a short delay.
            debug!("answer submitted while offline");
            self.schedule_offline_fallback();
        }
    }

    fn schedule_offline_fallback(&mut self) {
        self.pending_fallbacks
            .push_back(Instant::now() + self.config.offline_fallback_delay);
    }

    fn handle_transport_event(&mut self, event: TransportEvent) {
        match self.channel.handle_event(event) {
            ChannelUpdate::Connectivity(connected) => {
                self.emit(SessionEvent::ConnectivityChanged(connected));
                if connected {
                    self.maybe_mark_connected();
                }
            }
            ChannelUpdate::Message(message) => self.handle_incoming(message),
            ChannelUpdate::None => {}
        }
    }

    fn handle_incoming(&mut self, incoming: IncomingMessage) {
        let mut message = ChatMessage::assistant(incoming.content.clone());
        if let Some(ts) = incoming.timestamp {
            message = message.with_timestamp(ts);
        }
        self.transcript.append(message.clone());
        self.emit(SessionEvent::MessageAppended(message));
        self.narrator.speak(&incoming.content);
        self.sync_speaking();
    }

    /// The page counts as connected once the handshake has gone out, which
    /// requires both the fetch result and a live socket.
    fn maybe_mark_connected(&mut self) {
        if self.channel.is_started() && self.phase != SessionPhase::Connected {
            self.set_phase(SessionPhase::Connected);
        }
    }

    fn pump(&mut self) {
        self.narrator.pump();
        self.sync_speaking();

        let now = Instant::now();
        while let Some(deadline) = self.pending_fallbacks.front() {
            if *deadline > now {
                break;
            }
            self.pending_fallbacks.pop_front();
            let fallback = ChatMessage::assistant(
                VivaError::TransportError("offline".into()).user_message(),
            );
            self.transcript.append(fallback.clone());
            self.emit(SessionEvent::MessageAppended(fallback));
        }
    }

    fn sync_speaking(&mut self) {
        let speaking = self.narrator.is_speaking();
        if speaking != self.was_speaking {
            self.was_speaking = speaking;
            self.emit(SessionEvent::SpeakingChanged(speaking));
        }
    }

    fn set_phase(&mut self, phase: SessionPhase) {
        if self.phase != phase {
            debug!(?phase, "phase change");
            self.phase = phase.clone();
            self.emit(SessionEvent::PhaseChanged(phase));
        }
    }

    fn emit(&self, event: SessionEvent) {
        if self.event_tx.send(event).is_err() {
            debug!("event receiver dropped");
        }
    }

    fn teardown(&mut self) {
        info!(
            violations = self.tracker.stats().violation_count,
            "session controller stopping"
        );
        self.tracker.deactivate();
        self.narrator.stop();
        self.channel.disconnect();
        self.media.release();
        self.cancel.cancel();
    }
}
