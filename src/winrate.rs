// Rolling win-rate statistics over a team's chronological outcome sequence.
//
// Every contiguous window of the configured size gets a win rate (ties drop
// out of both numerator and denominator), and the population mean/stdev of
// those rates describes how streaky the team has been. The deviation of the
// most recent window from that mean is the headline number: is the current
// stretch unusually hot or cold.

use thiserror::Error;
use tracing::debug;

use crate::calendar::ScanDate;
use crate::model::{GameRecord, WinnerSide};
use crate::stats::{population_stats, STDEV_EPSILON};

// ---------------------------------------------------------------------------
// Outcome sequence
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Loss,
    Tie,
}

/// One dated outcome for the tracked team.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameOutcome {
    pub outcome: Outcome,
    pub date: ScanDate,
}

/// Derive the tracked team's chronological W/L/T sequence from a game
/// stream. Only finished games with the team on either side and a parseable
/// date contribute; a finished game with no decodable winner is dropped.
pub fn outcome_sequence(games: &[GameRecord], team: &str) -> Vec<GameOutcome> {
    let mut sequence = Vec::new();
    for game in games {
        if !game.is_finished() || !game.involves(team) {
            continue;
        }
        let Some(date) = game.date() else {
            debug!(
                "dropping outcome with unparseable timestamp '{}'",
                game.info.started_at
            );
            continue;
        };
        let is_home = game.home.abbr == team;
        let outcome = match game.info.winner_side {
            Some(WinnerSide::Home) if is_home => Outcome::Win,
            Some(WinnerSide::Away) if !is_home => Outcome::Win,
            Some(WinnerSide::Home) | Some(WinnerSide::Away) => Outcome::Loss,
            Some(WinnerSide::Tie) => Outcome::Tie,
            _ => continue,
        };
        sequence.push(GameOutcome { outcome, date });
    }
    sequence
}

/// Aggregate W/L/T tally, for range summaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
}

pub fn tally(sequence: &[GameOutcome]) -> Tally {
    let mut t = Tally::default();
    for game in sequence {
        match game.outcome {
            Outcome::Win => t.wins += 1,
            Outcome::Loss => t.losses += 1,
            Outcome::Tie => t.ties += 1,
        }
    }
    t
}

// ---------------------------------------------------------------------------
// Rolling statistics
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("insufficient data: {available} outcomes for a window of {window}")]
    InsufficientData { window: usize, available: usize },

    #[error("window of {window} starting at index {start} contains only ties")]
    NoDecisions { window: usize, start: usize },
}

/// Sliding-window win-rate statistics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RollingStats {
    /// Number of windows evaluated (`N - window + 1`).
    pub windows: usize,
    /// Population mean of all window rates.
    pub mean: f64,
    /// Population standard deviation of all window rates.
    pub stdev: f64,
    /// Win rate of the final (most recent) window.
    pub latest: f64,
    /// `(latest - mean) / stdev`; `None` when the spread is zero, which
    /// would otherwise be a division by zero.
    pub z_score: Option<f64>,
}

/// Compute the rolling win rate over every contiguous window of `window`
/// outcomes, sliding by one.
///
/// Ties are excluded from both sides of each window's rate. A window left
/// with no decisions at all cannot produce a rate and is an error, as is a
/// sequence shorter than the window.
pub fn rolling_stats(sequence: &[GameOutcome], window: usize) -> Result<RollingStats, StatsError> {
    if window == 0 || sequence.len() < window {
        return Err(StatsError::InsufficientData {
            window,
            available: sequence.len(),
        });
    }

    let mut rates = Vec::with_capacity(sequence.len() - window + 1);
    for (start, chunk) in sequence.windows(window).enumerate() {
        let mut wins = 0u32;
        let mut decisions = 0u32;
        for game in chunk {
            match game.outcome {
                Outcome::Win => {
                    wins += 1;
                    decisions += 1;
                }
                Outcome::Loss => decisions += 1,
                Outcome::Tie => {}
            }
        }
        if decisions == 0 {
            return Err(StatsError::NoDecisions { window, start });
        }
        rates.push(f64::from(wins) / f64::from(decisions));
    }

    let stats = population_stats(&rates);
    let latest = rates[rates.len() - 1];
    let z_score = if stats.stdev < STDEV_EPSILON {
        None
    } else {
        Some((latest - stats.mean) / stats.stdev)
    };

    Ok(RollingStats {
        windows: rates.len(),
        mean: stats.mean,
        stdev: stats.stdev,
        latest,
        z_score,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-10
    }

    fn seq(outcomes: &[Outcome]) -> Vec<GameOutcome> {
        outcomes
            .iter()
            .enumerate()
            .map(|(i, &outcome)| GameOutcome {
                outcome,
                date: ScanDate::new(2025, 4, 1 + i as u8),
            })
            .collect()
    }

    fn game(home: &str, away: &str, status: &str, winner: Option<&str>, date: &str) -> GameRecord {
        let winner_field = winner
            .map(|w| format!(r#", "winner_side": "{w}""#))
            .unwrap_or_default();
        let json = format!(
            r#"{{
                "home": {{ "abbr": "{home}" }},
                "away": {{ "abbr": "{away}" }},
                "info": {{ "status": "{status}", "started_at": "{date} 18:35"{winner_field} }}
            }}"#
        );
        serde_json::from_str(&json).unwrap()
    }

    // ---- Sequence derivation ----

    #[test]
    fn outcomes_from_both_sides() {
        use Outcome::*;
        let games = vec![
            game("悍", "龍", "FINISHED", Some("HOME"), "2025-04-01"), // home win
            game("龍", "悍", "FINISHED", Some("HOME"), "2025-04-02"), // away loss
            game("龍", "悍", "FINISHED", Some("AWAY"), "2025-04-03"), // away win
            game("悍", "龍", "FINISHED", Some("TIE"), "2025-04-04"),
            game("象", "龍", "FINISHED", Some("HOME"), "2025-04-05"), // not involved
            game("悍", "龍", "IN_PROGRESS", None, "2025-04-06"),      // not finished
            game("悍", "龍", "FINISHED", None, "2025-04-07"),          // no winner field
        ];
        let sequence = outcome_sequence(&games, "悍");
        let outcomes: Vec<Outcome> = sequence.iter().map(|g| g.outcome).collect();
        assert_eq!(outcomes, vec![Win, Loss, Win, Tie]);
        assert_eq!(sequence[0].date, ScanDate::new(2025, 4, 1));
    }

    #[test]
    fn tally_counts() {
        use Outcome::*;
        let t = tally(&seq(&[Win, Win, Loss, Tie, Win]));
        assert_eq!(
            t,
            Tally {
                wins: 3,
                losses: 1,
                ties: 1
            }
        );
    }

    // ---- Rolling statistics ----

    #[test]
    fn ten_games_window_five_gives_six_windows() {
        use Outcome::*;
        let sequence = seq(&[Win, Loss, Win, Win, Loss, Win, Loss, Loss, Win, Win]);
        let stats = rolling_stats(&sequence, 5).unwrap();
        assert_eq!(stats.windows, 6);

        // Window rates: WLWWL=3/5, LWWLW=3/5, WWLWL=3/5, WLWLL=2/5,
        // LWLLW=2/5, WLLWW=3/5.
        let expected_rates = [0.6, 0.6, 0.6, 0.4, 0.4, 0.6];
        let expected_mean = expected_rates.iter().sum::<f64>() / 6.0;
        assert!(approx_eq(stats.mean, expected_mean));
        assert!(approx_eq(stats.latest, 0.6));
    }

    #[test]
    fn ties_excluded_from_rate() {
        use Outcome::*;
        // Window of 4 with one tie: rate over the three decisions.
        let sequence = seq(&[Win, Tie, Loss, Win]);
        let stats = rolling_stats(&sequence, 4).unwrap();
        assert_eq!(stats.windows, 1);
        assert!(approx_eq(stats.latest, 2.0 / 3.0));
    }

    #[test]
    fn identical_windows_have_zero_spread_and_no_z() {
        use Outcome::*;
        // Alternating W/L: every window of 2 is exactly 0.5.
        let sequence = seq(&[Win, Loss, Win, Loss, Win, Loss]);
        let stats = rolling_stats(&sequence, 2).unwrap();
        assert!(approx_eq(stats.stdev, 0.0));
        assert!(stats.z_score.is_none());
    }

    #[test]
    fn z_score_measures_latest_deviation() {
        use Outcome::*;
        // Windows of 2: WW=1.0, WL=0.5, LL=0.0 -> mean 0.5, latest 0.0.
        let sequence = seq(&[Win, Win, Loss, Loss]);
        let stats = rolling_stats(&sequence, 2).unwrap();
        let z = stats.z_score.unwrap();
        assert!(approx_eq(stats.mean, 0.5));
        assert!(approx_eq(stats.latest, 0.0));
        assert!(z < 0.0, "cold stretch should be below the mean, got {z}");
        assert!(approx_eq(z, (0.0 - 0.5) / stats.stdev));
    }

    #[test]
    fn window_larger_than_sequence_errors() {
        use Outcome::*;
        let sequence = seq(&[Win, Loss, Win]);
        let err = rolling_stats(&sequence, 5).unwrap_err();
        assert!(matches!(
            err,
            StatsError::InsufficientData {
                window: 5,
                available: 3
            }
        ));
    }

    #[test]
    fn zero_window_errors() {
        let err = rolling_stats(&seq(&[Outcome::Win]), 0).unwrap_err();
        assert!(matches!(err, StatsError::InsufficientData { window: 0, .. }));
    }

    #[test]
    fn all_tie_window_errors() {
        use Outcome::*;
        let sequence = seq(&[Win, Tie, Tie, Loss]);
        let err = rolling_stats(&sequence, 2).unwrap_err();
        assert!(matches!(err, StatsError::NoDecisions { window: 2, start: 1 }));
    }

    #[test]
    fn window_equal_to_sequence_is_single_window() {
        use Outcome::*;
        let sequence = seq(&[Win, Loss, Win, Win]);
        let stats = rolling_stats(&sequence, 4).unwrap();
        assert_eq!(stats.windows, 1);
        assert!(approx_eq(stats.latest, 0.75));
        assert!(approx_eq(stats.mean, 0.75));
        assert!(stats.z_score.is_none()); // single window has zero spread
    }
}
