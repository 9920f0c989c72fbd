//! Export of Strava running activities and their laps to CSV.
//!
//! [`run_export`] drives one run: authenticate, list the activities in the
//! requested range, fetch and normalise each one, then write the summary and
//! lap files.

use std::path::PathBuf;
use std::sync::Arc;

use strava_client::StravaClient;
use strava_client::config::ApiConfig;
use strava_client::retry::RetryPolicy;
use strava_client::utils::DateRange;
use tracing::info;

pub mod activities;
pub mod auth;
pub mod cli;
pub mod csv_writer;
pub mod error;
pub mod middleware;
pub mod normalize;
pub mod settings;

mod test_utils;

use crate::activities::{fetch_activity_detail, list_activities};
use crate::auth::{Authenticator, CredentialProvider};
use crate::csv_writer::{ExportFiles, write_csv};
use crate::error::{ExportError, ExportResult};
use crate::settings::Settings;

/// Everything one export run needs, built once at startup.
#[derive(Clone)]
pub struct AppContext {
    pub client: Arc<dyn StravaClient>,
    pub config: ApiConfig,
    pub retry: RetryPolicy,
    pub settings_path: PathBuf,
    pub output_folder: PathBuf,
    pub range: DateRange,
}

/// Outcome of a run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportSummary {
    pub activities_found: usize,
    pub details_resolved: usize,
    /// `None` when there was nothing to write.
    pub files: Option<ExportFiles>,
}

pub async fn run_export(
    ctx: &AppContext,
    credentials: &mut dyn CredentialProvider,
) -> ExportResult<ExportSummary> {
    let settings = Settings::load(&ctx.settings_path)?;
    let settings = Authenticator::new(ctx.client.as_ref(), &ctx.config, &ctx.settings_path)
        .authenticate(settings, credentials)
        .await?;
    let access_token = settings
        .access_token()
        .ok_or(ExportError::MissingCredential("access token"))?;

    let activities =
        list_activities(ctx.client.as_ref(), &access_token, &ctx.range, &ctx.retry).await?;

    let mut details = Vec::with_capacity(activities.len());
    for activity in &activities {
        if let Some(detail) =
            fetch_activity_detail(ctx.client.as_ref(), &access_token, activity, &ctx.retry).await
        {
            details.push(detail);
        }
    }
    info!(
        found = activities.len(),
        resolved = details.len(),
        "activity details loaded"
    );

    let files = write_csv(&details, &ctx.output_folder, &ctx.range)?;
    Ok(ExportSummary {
        activities_found: activities.len(),
        details_resolved: details.len(),
        files,
    })
}
