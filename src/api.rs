//! Client for the public TVmaze schedule feed.
//!
//! The whole schedule comes back from a single GET as a JSON array of
//! episodes with the show embedded. There is no paging on the remote side and
//! no retry: a failed fetch is reported to the caller once.

use crate::error::{AppError, Result};
use crate::types::Episode;
use log::{debug, info};
use std::time::Duration;

/// Full schedule of upcoming episodes, broadcast and web.
pub const SCHEDULE_URL: &str = "https://api.tvmaze.com/schedule/full";

const USER_AGENT: &str = concat!("schedule-watcher/", env!("CARGO_PKG_VERSION"));

/// Decode a feed body into episode records.
///
/// # Examples
///
/// ```
/// use schedule_watcher::api::parse_schedule;
///
/// let episodes = parse_schedule("[]").unwrap();
/// assert!(episodes.is_empty());
/// assert!(parse_schedule("{\"status\": 404}").is_err());
/// ```
pub fn parse_schedule(body: &str) -> Result<Vec<Episode>> {
    let episodes: Vec<Episode> = serde_json::from_str(body)?;
    Ok(episodes)
}

fn with_feed_url(err: AppError, url: &str) -> AppError {
    match err {
        AppError::Parse(msg) => AppError::Parse(format!("{} (feed {})", msg, url)),
        other => other,
    }
}

/// Fetch the schedule from `url`.
///
/// # Errors
///
/// [`AppError::Network`] on transport failures and non-success statuses,
/// [`AppError::Parse`] when the body is not a list of episodes.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> Result<(), schedule_watcher::error::AppError> {
/// use schedule_watcher::api::{fetch_schedule, SCHEDULE_URL};
/// use std::time::Duration;
///
/// let episodes = fetch_schedule(SCHEDULE_URL, Duration::from_secs(30)).await?;
/// println!("{} episodes", episodes.len());
/// # Ok(())
/// # }
/// ```
pub async fn fetch_schedule(url: &str, timeout: Duration) -> Result<Vec<Episode>> {
    debug!("Fetching schedule from {}", url);

    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()?;

    let resp = client
        .get(url)
        .send()
        .await
        .map_err(|e| AppError::Network(format!("Failed to reach {}: {}", url, e)))?;

    let status = resp.status();
    if !status.is_success() {
        return Err(AppError::Network(format!(
            "{} answered with status {}",
            url, status
        )));
    }

    let body = resp
        .text()
        .await
        .map_err(|e| AppError::Network(format!("Failed to read schedule body: {}", e)))?;

    let episodes = parse_schedule(&body).map_err(|e| with_feed_url(e, url))?;

    info!("Fetched {} episodes from {}", episodes.len(), url);

    Ok(episodes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_schedule_two_items() {
        let body = r#"[
            {
                "id": 1,
                "name": "Pilot",
                "season": 1,
                "number": 1,
                "airstamp": "2030-01-01T20:00:00+00:00",
                "_embedded": { "show": { "name": "A", "type": "Scripted", "language": "English" } }
            },
            {
                "id": 2,
                "name": "Finale",
                "season": 3,
                "number": 10,
                "airstamp": "2030-01-02T20:00:00+00:00",
                "_embedded": { "show": { "name": "B", "type": "Reality", "language": null } }
            }
        ]"#;

        let episodes = parse_schedule(body).unwrap();
        assert_eq!(episodes.len(), 2);
        assert_eq!(episodes[0].show.name, "A");
        assert_eq!(episodes[1].show.language(), None);
    }

    #[test]
    fn test_parse_schedule_rejects_object() {
        let err = parse_schedule(r#"{"name": "Not Found", "status": 404}"#).unwrap_err();
        assert!(matches!(err, AppError::Parse(_)));
    }

    #[test]
    fn test_parse_schedule_rejects_missing_show() {
        let body = r#"[{ "id": 1, "name": "x", "season": 1, "number": 1, "airstamp": "" }]"#;
        assert!(parse_schedule(body).is_err());
    }

    #[test]
    fn test_parse_failure_names_feed() {
        let err = parse_schedule("<html>").unwrap_err();
        let err = with_feed_url(err, SCHEDULE_URL);
        assert!(matches!(err, AppError::Parse(_)));
        assert!(err.to_string().starts_with("Parse error: "));
        assert!(err.to_string().ends_with("(feed https://api.tvmaze.com/schedule/full)"));

        let other = with_feed_url(AppError::Network("down".to_string()), SCHEDULE_URL);
        assert_eq!(other.to_string(), "Network error: down");
    }

    #[test]
    fn test_user_agent_names_crate() {
        assert!(USER_AGENT.starts_with("schedule-watcher/"));
    }
}
