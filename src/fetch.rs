// Weekly page fetcher for the rebas.tw season games API.
//
// The API pages a season in 7-day blocks keyed by the block's start date and
// a per-year season suffix. One request is issued at a time; there is no
// retry. A failed week surfaces as a `FetchError` so the caller can decide
// whether to skip it or abort. The range walker skips, logs, and keeps the
// cursor moving, so partial data loss is an expected outcome rather than a
// fatal one.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::calendar::ScanDate;
use crate::model::GameRecord;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const API_BASE: &str = "https://www.rebas.tw/api/seasons";

/// Browser-style UA; the API refuses default library agents.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/142.0.0.0 Safari/537.36";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(8);

/// Season URL suffixes by year. Unmapped years fail closed to
/// `DEFAULT_SUFFIX` rather than erroring, matching the feed's newest code.
const SEASON_SUFFIXES: &[(u16, &str)] = &[
    (2018, "Fq"),
    (2019, "Sf"),
    (2020, "KS"),
    (2021, "fi"),
    (2022, "dG"),
    (2023, "sk"),
    (2024, "xa"),
    (2025, "JO"),
];

const DEFAULT_SUFFIX: &str = "JO";

/// Resolve the season suffix code for a year.
pub fn season_suffix(year: u16) -> &'static str {
    SEASON_SUFFIXES
        .iter()
        .find(|(y, _)| *y == year)
        .map(|(_, s)| *s)
        .unwrap_or(DEFAULT_SUFFIX)
}

/// Build the games URL for the 7-day window starting at `date`.
pub fn week_url(date: ScanDate) -> String {
    format!(
        "{API_BASE}/CPBL-{}-{}/games?start={}-{:02}-{:02}",
        date.year,
        season_suffix(date.year),
        date.year,
        date.month,
        date.day
    )
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport { url: String, source: reqwest::Error },

    #[error("unexpected status {status} from {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("malformed payload from {url}: {source}")]
    Payload { url: String, source: reqwest::Error },
}

// ---------------------------------------------------------------------------
// Payload envelope
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct WeekPayload {
    #[serde(default)]
    data: Vec<GameRecord>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// HTTP client over the season games API. Strictly sequential: callers await
/// each week before asking for the next.
pub struct SeasonClient {
    http: reqwest::Client,
}

impl SeasonClient {
    pub fn new() -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { http })
    }

    /// Fetch the week of games starting at `start`.
    ///
    /// Games come back newest-first within the week, exactly as the API
    /// serves them; reverse for chronological order.
    pub async fn fetch_week(&self, start: ScanDate) -> Result<Vec<GameRecord>, FetchError> {
        let url = week_url(start);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { url, status });
        }

        let payload: WeekPayload =
            response
                .json()
                .await
                .map_err(|source| FetchError::Payload {
                    url: url.clone(),
                    source,
                })?;
        Ok(payload.data)
    }

    /// Walk the half-open range `[start, end)` one week at a time.
    ///
    /// A failed week is logged and recorded as empty; the cursor advances
    /// regardless, so the output always has one entry per week of the range.
    pub async fn walk_range(
        &self,
        start: ScanDate,
        end: ScanDate,
    ) -> Vec<(ScanDate, Vec<GameRecord>)> {
        let mut weeks = Vec::new();
        let mut now = start;
        while now < end {
            match self.fetch_week(now).await {
                Ok(games) => {
                    info!("week {now}: {} games", games.len());
                    weeks.push((now, games));
                }
                Err(e) => {
                    warn!("week {now} skipped: {e}");
                    weeks.push((now, Vec::new()));
                }
            }
            now = now.advance_week();
        }
        info!("range walk complete: {} weeks", weeks.len());
        weeks
    }
}

// ---------------------------------------------------------------------------
// Week flattening
// ---------------------------------------------------------------------------

/// Flatten walked weeks into one chronological game list. Weeks are sorted by
/// start date and each week is reversed, since the API serves games
/// newest-first within a week.
pub fn chronological_games(mut weeks: Vec<(ScanDate, Vec<GameRecord>)>) -> Vec<GameRecord> {
    weeks.sort_by_key(|(date, _)| *date);
    let mut games = Vec::new();
    for (_, week) in weeks {
        games.extend(week.into_iter().rev());
    }
    games
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
