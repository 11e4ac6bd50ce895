// Wire models for the rebas.tw weekly games feed.
//
// The feed's `data` array holds one object per game, newest first. Only the
// fields the aggregation pipeline reads are modeled; everything else in the
// payload is ignored by serde.

use serde::Deserialize;

use crate::calendar::{parse_started_at, ScanDate};

// ---------------------------------------------------------------------------
// Game record
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct GameRecord {
    pub home: TeamSide,
    pub away: TeamSide,
    pub info: GameInfo,
    /// Plate appearances in strict time order. Absent for scheduled games.
    #[serde(rename = "PA_list", default)]
    pub pa_list: Vec<PlateAppearance>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeamSide {
    pub abbr: String,
    /// Runs scored. The feed serializes this as either a number or a string;
    /// absent for games that have not started.
    #[serde(default, deserialize_with = "de_opt_u32")]
    pub runs: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GameInfo {
    pub status: GameStatus,
    /// "YYYY-MM-DD HH:MM" timestamp; only the date portion is meaningful here.
    pub started_at: String,
    #[serde(default)]
    pub winner_side: Option<WinnerSide>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum GameStatus {
    #[serde(rename = "SCHEDULED")]
    Scheduled,
    #[serde(rename = "IN_PROGRESS")]
    InProgress,
    #[serde(rename = "FINISHED")]
    Finished,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum WinnerSide {
    #[serde(rename = "HOME")]
    Home,
    #[serde(rename = "AWAY")]
    Away,
    #[serde(rename = "TIE")]
    Tie,
    #[serde(other)]
    Other,
}

impl GameRecord {
    /// Date-resolution start of the game, if the timestamp parses.
    pub fn date(&self) -> Option<ScanDate> {
        parse_started_at(&self.info.started_at)
    }

    pub fn is_finished(&self) -> bool {
        self.info.status == GameStatus::Finished
    }

    /// Whether the given team code appears on either side.
    pub fn involves(&self, team: &str) -> bool {
        self.home.abbr == team || self.away.abbr == team
    }
}

// ---------------------------------------------------------------------------
// Plate appearance
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct PlateAppearance {
    pub batter: Participant,
    pub pitcher: Participant,
    /// Batting-order slot within the current half-inning, 1-based and
    /// monotonically increasing until the half-inning ends.
    #[serde(rename = "PA_order")]
    pub pa_order: u32,
    /// Lineup cycle within the half-inning, reset to 1 each half-inning.
    #[serde(rename = "PA_round")]
    pub pa_round: u32,
    /// Run-expectancy contribution. The feed serializes this as a string.
    #[serde(rename = "RE24", deserialize_with = "de_f64")]
    pub re24: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Participant {
    pub name: String,
}

// ---------------------------------------------------------------------------
// Tolerant scalar deserializers
// ---------------------------------------------------------------------------

/// Accept a float either as a JSON number or as a numeric string.
fn de_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(f64),
        Text(String),
    }
    match Raw::deserialize(deserializer)? {
        Raw::Num(v) => Ok(v),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Accept an optional unsigned count as a JSON number or numeric string.
fn de_opt_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(u32),
        Text(String),
    }
    match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Num(v)) => Ok(Some(v)),
        Some(Raw::Text(s)) => s.trim().parse().map(Some).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
