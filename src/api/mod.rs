//! REST collaborators: the interview service endpoints the client consumes.

pub mod client;
pub mod types;

pub use client::{ApiClient, SessionApi};
pub use types::{
    ApiEnvelope, InterviewDetails, JdInfo, SessionRecord, StartInterviewRequest, StartedSession,
};
