use std::io::BufRead;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use viva::api::ApiClient;
use viva::channel::{SessionChannel, WsTransport};
use viva::config::EngineConfig;
use viva::media::MediaSession;
use viva::proctor::{NullViewport, ViolationTracker};
use viva::session::{SessionController, SessionEvent};
use viva::speech::{Narrator, NullSynth};

#[cfg(feature = "audio-io")]
use viva::media::CpalMicBackend;
#[cfg(not(feature = "audio-io"))]
use viva::media::NullCaptureBackend;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "viva=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let session_id = std::env::args()
        .nth(1)
        .context("usage: viva <session-id>")?;

    let config = EngineConfig::from_env();
    config.validate().context("invalid configuration")?;

    info!(session_id, "starting interview session");

    let api = Arc::new(ApiClient::new(config.endpoints.clone())?);
    let cancel = CancellationToken::new();

    let socket_url = config.endpoints.socket_url(&session_id);
    let (transport, transport_rx) = WsTransport::connect(socket_url, cancel.clone());
    let channel = SessionChannel::new(Box::new(transport));

    #[cfg(feature = "audio-io")]
    let backend = Box::new(CpalMicBackend::new());
    #[cfg(not(feature = "audio-io"))]
    let backend = Box::new(NullCaptureBackend);
    let media = MediaSession::new(backend, config.camera_off_policy);

    // No synthesis engine on the terminal; questions render as text.
    let (_speech_tx, speech_rx) = crossbeam_channel::unbounded();
    let narrator = Narrator::new(
        Box::new(NullSynth),
        speech_rx,
        config.voice_preferences.clone(),
        config.speech_rate,
    );

    let tracker = ViolationTracker::with_capacity(Arc::new(NullViewport), config.warning_capacity);

    let (controller, handle) = SessionController::new(
        config,
        session_id,
        api,
        channel,
        transport_rx,
        media,
        narrator,
        tracker,
        cancel,
    );

    let events = handle.events().clone();
    std::thread::spawn(move || {
        while let Ok(event) = events.recv() {
            match event {
                SessionEvent::PhaseChanged(phase) => println!("[session] {phase:?}"),
                SessionEvent::MessageAppended(msg) => {
                    println!("[{:?}] {}", msg.role, msg.content);
                }
                SessionEvent::ConnectivityChanged(up) => {
                    println!("[net] {}", if up { "connected" } else { "disconnected" });
                }
                SessionEvent::ViolationLogged { count, warning } => {
                    println!("[proctor] #{count}: {warning}");
                }
                SessionEvent::Error(message) => println!("[error] {message}"),
                SessionEvent::CountdownTick(_) | SessionEvent::SpeakingChanged(_) => {}
            }
        }
    });

    let input = handle.clone();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            let result = match line.trim() {
                "" => continue,
                "/end" => input.end_interview(),
                "/mic" => input.toggle_mic(),
                "/cam" => input.toggle_camera(),
                answer => input.submit_answer(answer),
            };
            if result.is_err() {
                break;
            }
        }
    });

    controller.run().await;
    info!("session finished");
    Ok(())
}
