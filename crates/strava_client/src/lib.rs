//! Minimal `StravaClient` trait and the wire models it exchanges.

use async_trait::async_trait;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod config;
pub mod http_client;
pub mod retry;
pub mod utils;

#[derive(Debug, Error)]
pub enum StravaError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("rate limited: {0}")]
    RateLimited(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("decode error: {0}")]
    Decode(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("configuration error: {0}")]
    Config(String),
}

impl StravaError {
    /// Map a non-success HTTP status and a snippet of its body to an error.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => StravaError::Unauthorized(body),
            404 => StravaError::NotFound(body),
            429 => StravaError::RateLimited(body),
            _ => StravaError::Status { status, body },
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, StravaError::RateLimited(_))
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, StravaError::Unauthorized(_))
    }

    /// True for any 4xx answer, i.e. the server understood and refused the request.
    pub fn is_client_error(&self) -> bool {
        match self {
            StravaError::Unauthorized(_)
            | StravaError::NotFound(_)
            | StravaError::RateLimited(_) => true,
            StravaError::Status { status, .. } => (400..500).contains(status),
            _ => false,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct AthleteProfile {
    #[serde(default)]
    pub id: u64,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
}

/// One entry of the athlete activity list.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ActivitySummary {
    pub id: u64,
    #[serde(rename = "type", default)]
    pub activity_type: String,
    pub name: Option<String>,
    pub start_date: Option<String>,
}

/// Query string of `GET /athlete/activities`. `before`/`after` are epoch seconds.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct ActivityQuery {
    pub page: u32,
    pub per_page: u32,
    pub before: i64,
    pub after: i64,
}

/// JSON body posted to the OAuth token endpoint.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct TokenGrant {
    pub client_id: String,
    pub client_secret: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub grant_type: &'static str,
}

impl TokenGrant {
    pub fn authorization_code(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            code: Some(code.into()),
            refresh_token: None,
            grant_type: "authorization_code",
        }
    }

    pub fn refresh(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            code: None,
            refresh_token: Some(refresh_token.into()),
            grant_type: "refresh_token",
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<i64>,
}

#[async_trait]
pub trait StravaClient: Send + Sync + 'static {
    /// Authenticated athlete; cheap enough to double as a token validity probe.
    async fn get_athlete(
        &self,
        access_token: &SecretString,
    ) -> Result<AthleteProfile, StravaError>;

    /// One page of the athlete's activities.
    async fn list_activities(
        &self,
        access_token: &SecretString,
        query: &ActivityQuery,
    ) -> Result<Vec<ActivitySummary>, StravaError>;

    /// Full detail of one activity, laps and metric splits included.
    async fn get_activity(
        &self,
        access_token: &SecretString,
        activity_id: u64,
    ) -> Result<serde_json::Value, StravaError>;

    /// Exchange an authorization code or refresh token for a fresh access token.
    async fn exchange_token(&self, grant: &TokenGrant) -> Result<TokenResponse, StravaError>;
}
