//! Live interview session: lifecycle, transcript, countdown, and the
//! controller task that ties the subsystems together.

pub mod controller;
pub mod countdown;
pub mod state;
pub mod transcript;

pub use controller::{ControllerHandle, SessionCommand, SessionController, SessionEvent};
pub use countdown::Countdown;
pub use state::SessionPhase;
pub use transcript::{ChatMessage, Role, Transcript};
