// Game-log analysis entry point.
//
// Run sequence:
// 1. Initialize tracing (stderr)
// 2. Load config
// 3. Walk the season range week by week and flatten to a game stream
// 4. Accumulate windowed batting and starter counts
// 5. Load archived batting/pitching tables
// 6. Reconcile aggregates with the tables
// 7. Write CSV reports
// 8. Log win-rate and run-scoring summaries

use cpbl_gamelog::aggregate::GameLogAggregate;
use cpbl_gamelog::config;
use cpbl_gamelog::export;
use cpbl_gamelog::fetch;
use cpbl_gamelog::reconcile;
use cpbl_gamelog::runs;
use cpbl_gamelog::tables;
use cpbl_gamelog::winrate;

use anyhow::Context;
use std::collections::HashMap;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;
    info!("Game-log analysis starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: team={}, range {}..{}",
        config.tracked_team, config.season_start, config.season_end
    );

    // 3. Fetch the season range
    let client = fetch::SeasonClient::new().context("failed to build HTTP client")?;
    let weeks = client
        .walk_range(config.season_start, config.season_end)
        .await;
    let games = fetch::chronological_games(weeks);
    info!("fetched {} games", games.len());

    // 4. Accumulate windowed counters
    let mut aggregate = GameLogAggregate::new(config.tracked_team.clone(), config.windows);
    aggregate.accumulate_all(&games);
    info!(
        "accumulated {} qualifying games, {} batters",
        aggregate.games_seen,
        aggregate.batters.len()
    );

    // 5. Load archived tables: the batting page, the tracked team's pitching
    // page, and one pitching page per opponent grouping that has one.
    let batting_rows = tables::load_batting_table(&config.batting_table);
    let pitching_rows = match config.pitching_tables.get(&config.tracked_team) {
        Some(path) => tables::load_pitching_table(path),
        None => {
            warn!(
                "no archived pitching table configured for team {}",
                config.tracked_team
            );
            Vec::new()
        }
    };
    let mut opponent_tables = HashMap::new();
    for team in aggregate.starts.keys() {
        if *team == config.tracked_team {
            continue;
        }
        match config.pitching_tables.get(team) {
            Some(path) => {
                opponent_tables.insert(team.clone(), tables::load_pitching_table(path));
            }
            None => warn!("no archived pitching table configured for opponent {team}"),
        }
    }

    // 6. Reconcile
    let empty = HashMap::new();
    let starts = aggregate.tracked_starts().unwrap_or(&empty);
    let pitchers = reconcile::reconcile_pitchers(starts, &pitching_rows, config.roster_filter);
    let opponents = reconcile::reconcile_opponents(
        &aggregate.starts,
        &config.tracked_team,
        &opponent_tables,
        config.roster_filter,
    );
    let batters =
        reconcile::reconcile_batters(&aggregate.batters, &batting_rows, config.roster_filter);
    info!(
        "reconciled {} pitchers, {} opponent groupings, {} batters",
        pitchers.len(),
        opponents.len(),
        batters.len()
    );

    // 7. Write reports
    std::fs::create_dir_all(&config.output_dir).with_context(|| {
        format!(
            "failed to create output directory {}",
            config.output_dir.display()
        )
    })?;
    export::export_pitcher_csv(&config.output_dir.join("pitchers.csv"), &pitchers)
        .context("failed to write pitcher report")?;
    export::export_opponent_csv(&config.output_dir.join("opponent_pitchers.csv"), &opponents)
        .context("failed to write opponent pitcher report")?;
    export::export_batter_csv(&config.output_dir.join("batters.csv"), &batters)
        .context("failed to write batter report")?;

    // 8. Win-rate and run-scoring summaries
    let sequence = winrate::outcome_sequence(&games, &config.tracked_team);
    let record = winrate::tally(&sequence);
    info!(
        "record: {}W-{}L-{}T over {} games",
        record.wins,
        record.losses,
        record.ties,
        sequence.len()
    );
    match winrate::rolling_stats(&sequence, config.rolling_window) {
        Ok(stats) => match stats.z_score {
            Some(z) => info!(
                "rolling win rate ({} windows of {}): mean {:.3}, latest {:.3}, z {:+.2}",
                stats.windows, config.rolling_window, stats.mean, stats.latest, z
            ),
            None => info!(
                "rolling win rate ({} windows of {}): mean {:.3}, latest {:.3}, zero spread",
                stats.windows, config.rolling_window, stats.mean, stats.latest
            ),
        },
        Err(e) => warn!("rolling win rate unavailable: {e}"),
    }
    match runs::run_summary(&games, &config.tracked_team) {
        Some(summary) => info!(
            "runs: {:.2} scored / {:.2} allowed per game, differential {:.2} ± {:.2}",
            summary.avg_scored, summary.avg_allowed, summary.diff_mean, summary.diff_stdev
        ),
        None => warn!("no finished games with run totals for {}", config.tracked_team),
    }

    info!("Analysis complete");
    Ok(())
}

/// Initialize tracing to stderr so reports on stdout stay clean.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("cpbl_gamelog=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
