//! Transport abstraction and the websocket implementation
//!
//! Outbound frames go through [`Transport::send`]; inbound activity arrives
//! as a stream of [`TransportEvent`]s. The real transport speaks websocket
//! only (no polling fallback) and relies on the library's own reconnection
//! behavior; the engine adds no retry policy of its own.

use crate::{Result, VivaError};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Inbound transport activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Connected,
    Disconnected,
    Frame(String),
}

/// Duplex frame transport to the interview orchestration server.
pub trait Transport: Send {
    /// Queue one outbound frame. Fails when the connection is gone.
    fn send(&mut self, frame: String) -> Result<()>;

    /// Tear the connection down. Idempotent.
    fn disconnect(&mut self);
}

/// Websocket transport over tokio-tungstenite.
///
/// Reader and writer run in one spawned task tied to a cancellation token,
/// so teardown (explicit or via drop) closes the socket and stops the task.
pub struct WsTransport {
    out_tx: mpsc::Sender<String>,
    cancel: CancellationToken,
}

impl WsTransport {
    /// Connect to `url` and return the transport plus its event stream.
    ///
    /// The connection is established in the background; the first event is
    /// `Connected` on success or `Disconnected` on handshake failure.
    pub fn connect(url: String, cancel: CancellationToken) -> (Self, mpsc::Receiver<TransportEvent>) {
        let (out_tx, out_rx) = mpsc::channel::<String>(64);
        let (event_tx, event_rx) = mpsc::channel::<TransportEvent>(64);

        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            run_socket(url, out_rx, event_tx, task_cancel).await;
        });

        (Self { out_tx, cancel }, event_rx)
    }
}

impl Transport for WsTransport {
    fn send(&mut self, frame: String) -> Result<()> {
        self.out_tx
            .try_send(frame)
            .map_err(|e| VivaError::TransportError(format!("socket send failed: {e}")))
    }

    fn disconnect(&mut self) {
        self.cancel.cancel();
    }
}

impl Drop for WsTransport {
    fn drop(&mut self) {
        self.disconnect();
    }
}

async fn run_socket(
    url: String,
    mut out_rx: mpsc::Receiver<String>,
    event_tx: mpsc::Sender<TransportEvent>,
    cancel: CancellationToken,
) {
    let ws = tokio::select! {
        _ = cancel.cancelled() => return,
        res = connect_async(&url) => match res {
            Ok((ws, _)) => ws,
            Err(e) => {
                warn!(error = %e, "websocket handshake failed");
                let _ = event_tx.send(TransportEvent::Disconnected).await;
                return;
            }
        },
    };

    info!("websocket connected");
    let _ = event_tx.send(TransportEvent::Connected).await;

    let (mut sink, mut stream) = ws.split();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                let _ = sink.send(Message::Close(None)).await;
                break;
            }
            outbound = out_rx.recv() => match outbound {
                Some(frame) => {
                    if let Err(e) = sink.send(Message::Text(frame)).await {
                        warn!(error = %e, "websocket write failed");
                        break;
                    }
                }
                None => break,
            },
            inbound = stream.next() => match inbound {
                Some(Ok(Message::Text(text))) => {
                    let _ = event_tx.send(TransportEvent::Frame(text)).await;
                }
                Some(Ok(Message::Close(_))) | None => {
                    debug!("websocket closed by peer");
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(error = %e, "websocket read failed");
                    break;
                }
            },
        }
    }

    let _ = event_tx.send(TransportEvent::Disconnected).await;
    info!("websocket disconnected");
}
