// Configuration loading and parsing (config/analysis.toml).

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::aggregate::{LateWindow, WindowSpec};
use crate::calendar::{days_in_month, parse_started_at, ScanDate};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub season_start: ScanDate,
    pub season_end: ScanDate,
    pub tracked_team: String,
    pub windows: WindowSpec,
    pub rolling_window: usize,
    pub roster_filter: bool,
    pub batting_table: PathBuf,
    pub pitching_tables: HashMap<String, PathBuf>,
    pub output_dir: PathBuf,
}

// ---------------------------------------------------------------------------
// analysis.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire analysis.toml file.
#[derive(Debug, Clone, Deserialize)]
struct AnalysisFile {
    season: SeasonSection,
    team: TeamSection,
    late_window: LateWindowSection,
    analysis: AnalysisSection,
    tables: TablesSection,
    output: OutputSection,
}

#[derive(Debug, Clone, Deserialize)]
struct SeasonSection {
    start: String,
    end: String,
}

#[derive(Debug, Clone, Deserialize)]
struct TeamSection {
    tracked: String,
}

/// Exactly one of the two fields must be set: a calendar cutoff or a count
/// of trailing games.
#[derive(Debug, Clone, Deserialize)]
struct LateWindowSection {
    #[serde(default)]
    from_date: Option<String>,
    #[serde(default)]
    trailing_games: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
struct AnalysisSection {
    rolling_window: usize,
    #[serde(default)]
    roster_filter: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct TablesSection {
    batting: String,
    /// Archived pitching pages keyed by team code.
    pitching: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
struct OutputSection {
    dir: String,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/analysis.toml` relative to
/// the given `base_dir`.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join("analysis.toml");
    let text = std::fs::read_to_string(&path).map_err(|_| ConfigError::FileNotFound {
        path: path.clone(),
    })?;
    let file: AnalysisFile = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;

    let season_start = parse_date("season.start", &file.season.start)?;
    let season_end = parse_date("season.end", &file.season.end)?;

    let late = match (&file.late_window.from_date, file.late_window.trailing_games) {
        (Some(raw), None) => LateWindow::From(parse_date("late_window.from_date", raw)?),
        (None, Some(n)) => LateWindow::TrailingGames(n),
        (Some(_), Some(_)) => {
            return Err(ConfigError::ValidationError {
                field: "late_window".into(),
                message: "set either from_date or trailing_games, not both".into(),
            })
        }
        (None, None) => {
            return Err(ConfigError::ValidationError {
                field: "late_window".into(),
                message: "one of from_date or trailing_games is required".into(),
            })
        }
    };

    let config = Config {
        season_start,
        season_end,
        tracked_team: file.team.tracked,
        windows: WindowSpec {
            full_end: season_end,
            late,
        },
        rolling_window: file.analysis.rolling_window,
        roster_filter: file.analysis.roster_filter,
        batting_table: PathBuf::from(file.tables.batting),
        pitching_tables: file
            .tables
            .pitching
            .into_iter()
            .map(|(team, p)| (team, PathBuf::from(p)))
            .collect(),
        output_dir: PathBuf::from(file.output.dir),
    };

    validate(&config)?;

    Ok(config)
}

/// Convenience wrapper: loads config relative to the current working directory.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_date(field: &str, raw: &str) -> Result<ScanDate, ConfigError> {
    let date = parse_started_at(raw).ok_or_else(|| ConfigError::ValidationError {
        field: field.into(),
        message: format!("expected a YYYY-MM-DD date, got `{raw}`"),
    })?;
    // Structural validity matters here: config dates seed week stepping,
    // which assumes a day that fits its month.
    let valid_month = (1..=12).contains(&date.month);
    if !valid_month || date.day < 1 || date.day > days_in_month(date.year, date.month) {
        return Err(ConfigError::ValidationError {
            field: field.into(),
            message: format!("`{raw}` is not a valid calendar date"),
        });
    }
    Ok(date)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.season_start > config.season_end {
        return Err(ConfigError::ValidationError {
            field: "season.start".into(),
            message: format!(
                "must not be after season.end ({} > {})",
                config.season_start, config.season_end
            ),
        });
    }

    if config.tracked_team.is_empty() {
        return Err(ConfigError::ValidationError {
            field: "team.tracked".into(),
            message: "must not be empty".into(),
        });
    }

    if config.rolling_window == 0 {
        return Err(ConfigError::ValidationError {
            field: "analysis.rolling_window".into(),
            message: "must be greater than 0".into(),
        });
    }

    match config.windows.late {
        LateWindow::From(date) => {
            if date > config.season_end {
                return Err(ConfigError::ValidationError {
                    field: "late_window.from_date".into(),
                    message: format!(
                        "must not be after season.end ({} > {})",
                        date, config.season_end
                    ),
                });
            }
        }
        LateWindow::TrailingGames(n) => {
            if n == 0 {
                return Err(ConfigError::ValidationError {
                    field: "late_window.trailing_games".into(),
                    message: "must be greater than 0".into(),
                });
            }
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
