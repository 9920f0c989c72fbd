//! HTTP client implementation for the Strava v3 API.
//!
//! This module provides a reqwest-based implementation of the [`StravaClient`](crate::StravaClient) trait.

use crate::{
    ActivityQuery, ActivitySummary, AthleteProfile, StravaClient, StravaError, TokenGrant,
    TokenResponse,
};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

/// Client for the Strava API using reqwest.
///
/// The client holds no credentials; every authenticated call takes the bearer
/// token explicitly so the caller can swap it after a re-authorization.
#[derive(Clone, Debug)]
pub struct ReqwestStravaClient {
    base_url: String,
    token_url: String,
    client: reqwest::Client,
}

impl ReqwestStravaClient {
    /// Create a new client instance.
    ///
    /// # Arguments
    /// * `base_url` - The API root (e.g., "https://www.strava.com/api/v3")
    /// * `token_url` - The OAuth token endpoint used for code and refresh exchanges
    pub fn new(base_url: &str, token_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token_url: token_url.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Build an authenticated GET request.
    fn get_request(&self, url: &str, access_token: &SecretString) -> reqwest::RequestBuilder {
        tracing::debug!(%url, "GET");
        self.client
            .get(url)
            .bearer_auth(access_token.expose_secret())
    }

    /// Execute a request and expect a JSON response.
    async fn execute_json<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, StravaError> {
        let resp = request.send().await?;
        self.handle_response(resp).await
    }

    /// Handle a response, converting status codes to appropriate errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, StravaError> {
        if !resp.status().is_success() {
            return Err(self.error_from_response(resp).await);
        }
        // Read body as text first so a shape mismatch reports what came back.
        let text = resp.text().await?;
        serde_json::from_str::<T>(&text).map_err(|e| {
            let body_snippet: String = text.chars().take(256).collect();
            StravaError::Decode(format!("{} - body: {}", e, body_snippet))
        })
    }

    /// Extract error information from a failed response.
    async fn error_from_response(&self, resp: reqwest::Response) -> StravaError {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        let body_snippet: String = body.chars().take(256).collect();
        if status == 429 {
            tracing::warn!("Strava rate limit hit (429)");
        }
        StravaError::from_status(status, body_snippet)
    }
}

#[async_trait]
impl StravaClient for ReqwestStravaClient {
    async fn get_athlete(
        &self,
        access_token: &SecretString,
    ) -> Result<AthleteProfile, StravaError> {
        let url = format!("{}/athlete", self.base_url);
        self.execute_json(self.get_request(&url, access_token))
            .await
    }

    async fn list_activities(
        &self,
        access_token: &SecretString,
        query: &ActivityQuery,
    ) -> Result<Vec<ActivitySummary>, StravaError> {
        let url = format!("{}/athlete/activities", self.base_url);
        self.execute_json(self.get_request(&url, access_token).query(query))
            .await
    }

    async fn get_activity(
        &self,
        access_token: &SecretString,
        activity_id: u64,
    ) -> Result<serde_json::Value, StravaError> {
        let url = format!("{}/activities/{}", self.base_url, activity_id);
        self.execute_json(self.get_request(&url, access_token))
            .await
    }

    async fn exchange_token(&self, grant: &TokenGrant) -> Result<TokenResponse, StravaError> {
        tracing::debug!(url = %self.token_url, grant_type = grant.grant_type, "POST");
        self.execute_json(self.client.post(&self.token_url).json(grant))
            .await
    }
}
