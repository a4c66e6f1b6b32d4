//! Realtime session channel: one duplex event connection per interview
//! session, carrying lifecycle, chat, and the start-interview handshake.

pub mod session;
pub mod transport;
pub mod wire;

pub use session::{ChannelUpdate, SessionChannel, StartPayload};
pub use transport::{Transport, TransportEvent, WsTransport};
pub use wire::{decode, encode_send_message, encode_start_interview, IncomingMessage};
