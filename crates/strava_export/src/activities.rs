//! Activity listing and per-activity detail retrieval.

use secrecy::SecretString;
use strava_client::retry::RetryPolicy;
use strava_client::utils::DateRange;
use strava_client::{ActivityQuery, ActivitySummary, StravaClient, StravaError};
use tracing::{debug, error, info, warn};

use crate::error::ExportResult;
use crate::normalize::ActivityDetail;

pub const PAGE_SIZE: u32 = 50;

/// Activity types kept for export.
pub const SUPPORTED_ACTIVITY_TYPES: &[&str] = &["Run"];

/// An exportable activity picked from a list page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Activity {
    pub id: u64,
    pub activity_type: String,
}

impl Activity {
    pub fn from_summary(summary: &ActivitySummary) -> Self {
        Self {
            id: summary.id,
            activity_type: summary.activity_type.clone(),
        }
    }
}

pub fn select_supported(page: &[ActivitySummary]) -> impl Iterator<Item = Activity> + '_ {
    page.iter()
        .filter(|s| SUPPORTED_ACTIVITY_TYPES.contains(&s.activity_type.as_str()))
        .map(Activity::from_summary)
}

/// Walks the list pages for `range` until an empty page comes back.
///
/// Throttled pages are retried under `policy`. Once retries are exhausted the
/// activities gathered so far are returned; any other failure is an error.
pub async fn list_activities(
    client: &dyn StravaClient,
    access_token: &SecretString,
    range: &DateRange,
    policy: &RetryPolicy,
) -> ExportResult<Vec<Activity>> {
    let (after, before) = range.epoch_bounds();
    let mut activities = Vec::new();
    let mut page = 1;

    loop {
        let query = ActivityQuery {
            page,
            per_page: PAGE_SIZE,
            before,
            after,
        };
        debug!(page, "listing activities");
        let result = policy
            .retry_async(
                || client.list_activities(access_token, &query),
                StravaError::is_rate_limited,
            )
            .await;

        let summaries = match result {
            Ok(summaries) => summaries,
            Err(e) if e.is_rate_limited() => {
                warn!(page, error = %e, "giving up on listing after repeated throttling");
                break;
            }
            Err(e) => return Err(e.into()),
        };
        if summaries.is_empty() {
            break;
        }
        activities.extend(select_supported(&summaries));
        page += 1;
    }

    info!(
        count = activities.len(),
        start = %range.start(),
        end = %range.end(),
        "found activities"
    );
    Ok(activities)
}

/// Fetches and normalises one activity, retrying throttled requests.
///
/// Any failure, exhausted retries included, is logged and yields `None`.
pub async fn fetch_activity_detail(
    client: &dyn StravaClient,
    access_token: &SecretString,
    activity: &Activity,
    policy: &RetryPolicy,
) -> Option<ActivityDetail> {
    info!(activity_id = activity.id, "loading activity");
    let result = policy
        .retry_async(
            || client.get_activity(access_token, activity.id),
            StravaError::is_rate_limited,
        )
        .await;
    match result {
        Ok(data) => {
            let detail = ActivityDetail::from_json(&data);
            if detail.is_none() {
                error!(activity_id = activity.id, "activity payload is not an object");
            }
            detail
        }
        Err(e) => {
            error!(activity_id = activity.id, error = %e, "unable to load activity");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{MockClient, summary};
    use chrono::NaiveDate;
    use serde_json::json;
    use std::time::Duration;

    fn token() -> SecretString {
        SecretString::new("tok".into())
    }

    fn day() -> DateRange {
        let d = NaiveDate::from_ymd_opt(2024, 1, 1).expect("date");
        DateRange::new(d, d).expect("range")
    }

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            backoff_unit: Duration::from_millis(1),
        }
    }

    #[test]
    fn only_runs_are_selected() {
        let page = [summary(1, "Run"), summary(2, "Ride"), summary(3, "Run"), summary(4, "Swim")];
        let ids: Vec<u64> = select_supported(&page).map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[tokio::test]
    async fn pages_until_empty_with_day_bounds() {
        let client = MockClient::default()
            .with_page(Ok(vec![summary(1, "Run"), summary(2, "Ride")]))
            .with_page(Ok(vec![summary(3, "Run")]))
            .with_page(Ok(vec![]));

        let activities = list_activities(&client, &token(), &day(), &fast_policy())
            .await
            .expect("list");
        assert_eq!(
            activities.iter().map(|a| a.id).collect::<Vec<_>>(),
            vec![1, 3]
        );

        let queries = client.queries.lock().await;
        assert_eq!(queries.len(), 3);
        assert_eq!(queries[0].page, 1);
        assert_eq!(queries[2].page, 3);
        assert!(queries.iter().all(|q| q.per_page == PAGE_SIZE));
        assert!(queries.iter().all(|q| q.after == 1_704_067_200));
        assert!(queries.iter().all(|q| q.before == 1_704_153_600));
    }

    #[tokio::test]
    async fn throttled_page_is_retried() {
        let client = MockClient::default()
            .with_page(Err(StravaError::RateLimited("slow".into())))
            .with_page(Ok(vec![summary(1, "Run")]))
            .with_page(Ok(vec![]));

        let activities = list_activities(&client, &token(), &day(), &fast_policy())
            .await
            .expect("list");
        assert_eq!(activities.len(), 1);
        assert_eq!(client.queries.lock().await.len(), 3);
    }

    #[tokio::test]
    async fn exhausted_throttling_keeps_collected_activities() {
        let client = MockClient::default()
            .with_page(Ok(vec![summary(1, "Run"), summary(2, "Run")]))
            .with_page(Err(StravaError::RateLimited("slow".into())))
            .with_page(Err(StravaError::RateLimited("slow".into())))
            .with_page(Err(StravaError::RateLimited("slow".into())))
            .with_page(Ok(vec![summary(3, "Run")]));

        let activities = list_activities(&client, &token(), &day(), &fast_policy())
            .await
            .expect("list");
        assert_eq!(activities.len(), 2);
        assert_eq!(client.queries.lock().await.len(), 4);
    }

    #[tokio::test]
    async fn other_errors_abort_listing() {
        let client = MockClient::default()
            .with_page(Err(StravaError::Unauthorized("bad token".into())));
        let err = list_activities(&client, &token(), &day(), &fast_policy())
            .await
            .expect_err("should fail");
        assert!(matches!(
            err,
            crate::error::ExportError::Api(StravaError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn detail_is_normalised() {
        let client = MockClient::default().with_detail(
            7,
            Ok(json!({"id": 7, "name": "Track", "distance": 400.0, "elapsed_time": 90})),
        );
        let activity = Activity {
            id: 7,
            activity_type: "Run".into(),
        };
        let detail = fetch_activity_detail(&client, &token(), &activity, &fast_policy())
            .await
            .expect("detail");
        assert_eq!(detail.activity_metadata["activity_id"], "7");
        assert_eq!(detail.lap_records.len(), 1);
    }

    #[tokio::test]
    async fn detail_failure_is_skipped() {
        let client = MockClient::default()
            .with_detail(8, Err(StravaError::Status { status: 500, body: "boom".into() }));
        let activity = Activity {
            id: 8,
            activity_type: "Run".into(),
        };
        assert!(
            fetch_activity_detail(&client, &token(), &activity, &fast_policy())
                .await
                .is_none()
        );
        assert_eq!(*client.detail_requests.lock().await, vec![8]);
    }

    #[tokio::test]
    async fn throttled_detail_is_retried_then_skipped() {
        let client = MockClient::default()
            .with_detail(9, Err(StravaError::RateLimited("slow".into())));
        let activity = Activity {
            id: 9,
            activity_type: "Run".into(),
        };
        // the scripted 429 is consumed by the first attempt, later ones see 404
        assert!(
            fetch_activity_detail(&client, &token(), &activity, &fast_policy())
                .await
                .is_none()
        );
        assert_eq!(*client.detail_requests.lock().await, vec![9, 9]);
    }
}
