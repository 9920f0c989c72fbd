//! Scripted `StravaClient` and credential source shared by unit tests.
#![cfg(test)]

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use secrecy::SecretString;
use strava_client::{
    ActivityQuery, ActivitySummary, AthleteProfile, StravaClient, StravaError, TokenGrant,
    TokenResponse,
};
use tokio::sync::Mutex;

use crate::auth::{Credential, CredentialProvider};
use crate::error::ExportResult;

/// Answers are consumed in the order they were scripted.
///
/// Unscripted calls fall back to: a valid athlete, an empty page, a 404 for
/// activity details and a 400 for token exchanges.
#[derive(Default)]
pub struct MockClient {
    athlete: Mutex<VecDeque<Result<AthleteProfile, StravaError>>>,
    pages: Mutex<VecDeque<Result<Vec<ActivitySummary>, StravaError>>>,
    details: Mutex<HashMap<u64, Result<serde_json::Value, StravaError>>>,
    tokens: Mutex<VecDeque<Result<TokenResponse, StravaError>>>,
    pub queries: Mutex<Vec<ActivityQuery>>,
    pub grants: Mutex<Vec<TokenGrant>>,
    pub detail_requests: Mutex<Vec<u64>>,
}

impl MockClient {
    pub fn with_athlete(mut self, result: Result<AthleteProfile, StravaError>) -> Self {
        self.athlete.get_mut().push_back(result);
        self
    }

    pub fn with_page(mut self, result: Result<Vec<ActivitySummary>, StravaError>) -> Self {
        self.pages.get_mut().push_back(result);
        self
    }

    pub fn with_detail(mut self, id: u64, result: Result<serde_json::Value, StravaError>) -> Self {
        self.details.get_mut().insert(id, result);
        self
    }

    pub fn with_token(mut self, result: Result<TokenResponse, StravaError>) -> Self {
        self.tokens.get_mut().push_back(result);
        self
    }
}

pub fn summary(id: u64, activity_type: &str) -> ActivitySummary {
    ActivitySummary {
        id,
        activity_type: activity_type.to_string(),
        name: Some(format!("{activity_type} {id}")),
        start_date: Some("2024-01-01T07:00:00Z".to_string()),
    }
}

#[async_trait]
impl StravaClient for MockClient {
    async fn get_athlete(&self, _access_token: &SecretString) -> Result<AthleteProfile, StravaError> {
        self.athlete.lock().await.pop_front().unwrap_or_else(|| {
            Ok(AthleteProfile {
                id: 42,
                firstname: Some("Test".into()),
                lastname: Some("Runner".into()),
            })
        })
    }

    async fn list_activities(
        &self,
        _access_token: &SecretString,
        query: &ActivityQuery,
    ) -> Result<Vec<ActivitySummary>, StravaError> {
        self.queries.lock().await.push(query.clone());
        self.pages.lock().await.pop_front().unwrap_or_else(|| Ok(vec![]))
    }

    async fn get_activity(
        &self,
        _access_token: &SecretString,
        activity_id: u64,
    ) -> Result<serde_json::Value, StravaError> {
        self.detail_requests.lock().await.push(activity_id);
        self.details
            .lock()
            .await
            .remove(&activity_id)
            .unwrap_or_else(|| Err(StravaError::NotFound(format!("activity {activity_id}"))))
    }

    async fn exchange_token(&self, grant: &TokenGrant) -> Result<TokenResponse, StravaError> {
        self.grants.lock().await.push(grant.clone());
        self.tokens.lock().await.pop_front().unwrap_or_else(|| {
            Err(StravaError::Status {
                status: 400,
                body: "no token scripted".into(),
            })
        })
    }
}

/// Replays canned answers and records what was asked.
pub struct ScriptedCredentials {
    answers: VecDeque<String>,
    pub asked: Vec<Credential>,
}

impl ScriptedCredentials {
    pub fn new<I>(answers: I) -> Self
    where
        I: IntoIterator<Item = &'static str>,
    {
        Self {
            answers: answers.into_iter().map(String::from).collect(),
            asked: Vec::new(),
        }
    }
}

impl CredentialProvider for ScriptedCredentials {
    fn request(&mut self, credential: &Credential) -> ExportResult<String> {
        self.asked.push(credential.clone());
        Ok(self.answers.pop_front().unwrap_or_default())
    }
}
