use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use strava_client::config::ApiConfig;
use strava_client::http_client::ReqwestStravaClient;
use strava_client::retry::RetryPolicy;
use strava_export::auth::ConsoleCredentials;
use strava_export::cli::{Cli, log_filter};
use strava_export::middleware::LoggingMiddleware;
use strava_export::{AppContext, run_export};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // `STRAVA_EXPORT_LOG_LEVEL`, falling back to `RUST_LOG`, default `info`.
    let log_env = log_filter(|key| std::env::var(key).ok());
    let env_filter = tracing_subscriber::EnvFilter::try_new(&log_env)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(env_filter)
        .init();
    tracing::debug!("strava_export: log filter: {}", log_env);

    let cli = Cli::parse();
    let range = cli
        .date_range(chrono::Local::now().date_naive())
        .context("invalid date range")?;
    let config = ApiConfig::from_env().context("invalid API configuration")?;

    let client = ReqwestStravaClient::new(&config.base_url, &config.token_url);
    let ctx = AppContext {
        client: Arc::new(LoggingMiddleware::new(client)),
        config,
        retry: RetryPolicy::default(),
        settings_path: cli.settings,
        output_folder: cli.output_folder,
        range,
    };

    tracing::info!(
        start = %range.start(),
        end = %range.end(),
        output = %ctx.output_folder.display(),
        "strava_export: exporting running activities"
    );
    let summary = run_export(&ctx, &mut ConsoleCredentials).await?;

    match &summary.files {
        Some(files) => tracing::info!(
            activities = summary.details_resolved,
            summary = %files.summary.display(),
            laps = %files.laps.display(),
            "strava_export: export complete"
        ),
        None => tracing::info!(
            found = summary.activities_found,
            "strava_export: nothing to export"
        ),
    }
    Ok(())
}
