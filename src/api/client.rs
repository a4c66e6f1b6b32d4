//! HTTP client for the interview service.
//!
//! Auth rides on cookies set by the web sign-in flow; a 401 anywhere means
//! the user has to go through the hosted sign-in page, so those map to
//! [`VivaError::NotAuthenticated`] carrying the URL to open.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use super::types::{
    ApiEnvelope, CanStart, SessionRecord, StartInterviewRequest, StartedSession,
};
use crate::config::Endpoints;
use crate::{Result, VivaError};

/// The one REST call the session controller depends on. Trait-shaped so
/// tests can resolve it without a server.
#[async_trait]
pub trait SessionApi: Send + Sync {
    async fn fetch_session(&self, session_id: &str) -> Result<SessionRecord>;
}

pub struct ApiClient {
    http: reqwest::Client,
    endpoints: Endpoints,
}

impl ApiClient {
    pub fn new(endpoints: Endpoints) -> Result<Self> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|e| VivaError::ApiError(format!("http client init failed: {e}")))?;
        Ok(Self { http, endpoints })
    }

    /// All sessions belonging to the signed-in user, newest first as the
    /// server returns them.
    pub async fn list_sessions(&self) -> Result<Vec<SessionRecord>> {
        let url = format!("{}/api/interview/sessions", self.endpoints.api_url);
        self.get(&url).await
    }

    /// Whether the user's plan allows starting another interview.
    pub async fn can_start(&self) -> Result<bool> {
        let url = format!("{}/api/interview/can-start", self.endpoints.api_url);
        let data: CanStart = self.get(&url).await?;
        Ok(data.can_start)
    }

    /// Create a session on the server. The returned id is what the socket
    /// handshake and the session page key off.
    pub async fn start_interview(&self, req: &StartInterviewRequest) -> Result<StartedSession> {
        let url = format!("{}/api/interview/start", self.endpoints.api_url);
        debug!(interview_type = %req.interview_type, "creating interview session");
        let response = self
            .http
            .post(&url)
            .json(req)
            .send()
            .await
            .map_err(|e| VivaError::ApiError(format!("request failed: {e}")))?;
        let started: StartedSession = self.unwrap_envelope(response).await?;
        info!(session_id = %started.id, "interview session created");
        Ok(started)
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| VivaError::ApiError(format!("request failed: {e}")))?;
        self.unwrap_envelope(response).await
    }

    async fn unwrap_envelope<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| VivaError::ApiError(format!("malformed response: {e}")))?;
        parse_envelope(status, &body, || self.endpoints.sign_in_url())
    }
}

/// Map one response to the envelope contract: 401 means re-authentication,
/// any other non-2xx is a plain API failure, and a 2xx body must be a
/// `{success, data, message}` envelope with `success` true and `data` set.
fn parse_envelope<T: DeserializeOwned>(
    status: StatusCode,
    body: &str,
    sign_in_url: impl FnOnce() -> String,
) -> Result<T> {
    if status == StatusCode::UNAUTHORIZED {
        return Err(VivaError::NotAuthenticated {
            sign_in_url: sign_in_url(),
        });
    }
    if !status.is_success() {
        return Err(VivaError::ApiError(format!("server returned {status}")));
    }

    let envelope: ApiEnvelope<T> = serde_json::from_str(body)
        .map_err(|e| VivaError::ApiError(format!("malformed response: {e}")))?;

    if !envelope.success {
        return Err(VivaError::ApiError(
            envelope
                .message
                .unwrap_or_else(|| "request rejected".to_string()),
        ));
    }
    envelope
        .data
        .ok_or_else(|| VivaError::ApiError("response missing data".to_string()))
}

#[async_trait]
impl SessionApi for ApiClient {
    async fn fetch_session(&self, session_id: &str) -> Result<SessionRecord> {
        let url = format!("{}/api/interview/{}", self.endpoints.api_url, session_id);
        debug!(session_id, "fetching session record");
        self.get(&url).await
    }
}
