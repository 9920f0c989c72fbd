//! Timing and outcome logging around every Strava API call.

use std::sync::Arc;
use std::time::Instant;

use secrecy::SecretString;
use strava_client::{
    ActivityQuery, ActivitySummary, AthleteProfile, StravaClient, StravaError, TokenGrant,
    TokenResponse,
};
use tracing::debug;

/// Wraps a [`StravaClient`] and logs each call with its duration.
#[derive(Clone)]
pub struct LoggingMiddleware<C: StravaClient> {
    inner: Arc<C>,
}

impl<C: StravaClient> LoggingMiddleware<C> {
    pub fn new(client: C) -> Self {
        Self {
            inner: Arc::new(client),
        }
    }

    async fn with_logging<F, Fut, T>(&self, operation: F, name: &str) -> Result<T, StravaError>
    where
        F: FnOnce(Arc<C>) -> Fut,
        Fut: std::future::Future<Output = Result<T, StravaError>>,
    {
        let start = Instant::now();
        debug!("Starting operation: {}", name);

        let result = operation(self.inner.clone()).await;

        let duration = start.elapsed();
        match &result {
            Ok(_) => debug!("Operation completed: {} in {:?}", name, duration),
            Err(e) => debug!("Operation failed: {} in {:?} - error: {}", name, duration, e),
        }

        result
    }
}

#[async_trait::async_trait]
impl<C: StravaClient> StravaClient for LoggingMiddleware<C> {
    async fn get_athlete(&self, access_token: &SecretString) -> Result<AthleteProfile, StravaError> {
        self.with_logging(
            |client| async move { client.get_athlete(access_token).await },
            "get_athlete",
        )
        .await
    }

    async fn list_activities(
        &self,
        access_token: &SecretString,
        query: &ActivityQuery,
    ) -> Result<Vec<ActivitySummary>, StravaError> {
        self.with_logging(
            |client| async move { client.list_activities(access_token, query).await },
            &format!("list_activities(page {})", query.page),
        )
        .await
    }

    async fn get_activity(
        &self,
        access_token: &SecretString,
        activity_id: u64,
    ) -> Result<serde_json::Value, StravaError> {
        self.with_logging(
            |client| async move { client.get_activity(access_token, activity_id).await },
            &format!("get_activity({activity_id})"),
        )
        .await
    }

    async fn exchange_token(&self, grant: &TokenGrant) -> Result<TokenResponse, StravaError> {
        self.with_logging(
            |client| async move { client.exchange_token(grant).await },
            grant.grant_type,
        )
        .await
    }
}
