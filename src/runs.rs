// Run-scoring summary for the tracked team over a game stream.
//
// Totals runs scored and allowed across the team's finished games and
// describes the per-game run differential with its population mean and
// standard deviation.

use crate::model::GameRecord;
use crate::stats::population_stats;

/// Aggregate run-scoring figures for one team over one range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub games: u32,
    pub runs_scored: u32,
    pub runs_allowed: u32,
    pub avg_scored: f64,
    pub avg_allowed: f64,
    pub diff_mean: f64,
    pub diff_stdev: f64,
}

/// Summarize run scoring for `team`. Only finished games with the team on
/// either side and run totals present on both sides count. Returns `None`
/// when no game qualifies.
pub fn run_summary(games: &[GameRecord], team: &str) -> Option<RunSummary> {
    let mut scored: u32 = 0;
    let mut allowed: u32 = 0;
    let mut differentials = Vec::new();

    for game in games {
        if !game.is_finished() || !game.involves(team) {
            continue;
        }
        let (Some(home_runs), Some(away_runs)) = (game.home.runs, game.away.runs) else {
            continue;
        };
        let (own, other) = if game.home.abbr == team {
            (home_runs, away_runs)
        } else {
            (away_runs, home_runs)
        };
        scored += own;
        allowed += other;
        differentials.push(f64::from(own) - f64::from(other));
    }

    if differentials.is_empty() {
        return None;
    }

    let games_count = differentials.len() as u32;
    let stats = population_stats(&differentials);
    Some(RunSummary {
        games: games_count,
        runs_scored: scored,
        runs_allowed: allowed,
        avg_scored: f64::from(scored) / f64::from(games_count),
        avg_allowed: f64::from(allowed) / f64::from(games_count),
        diff_mean: stats.mean,
        diff_stdev: stats.stdev,
    })
}
