//! Payload types for the interview REST endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Standard `{success, data, message}` response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

/// Parsed job-description metadata attached to a session.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JdInfo {
    pub role: Option<String>,
    pub is_developer: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InterviewDetails {
    pub type_id: Option<String>,
}

/// Read-only view of a server-owned interview session.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub jd_info: JdInfo,
    #[serde(default)]
    pub interview_details: InterviewDetails,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl SessionRecord {
    /// Role announced in the handshake; sessions without parsed JD metadata
    /// fall back to a generic label.
    pub fn role_label(&self) -> &str {
        self.jd_info.role.as_deref().unwrap_or("Candidate")
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartInterviewRequest {
    pub job_description: String,
    pub interview_type: String,
    pub interview_level: String,
    pub technology: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StartedSession {
    #[serde(alias = "_id")]
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CanStart {
    #[serde(rename = "canStart")]
    pub can_start: bool,
}
