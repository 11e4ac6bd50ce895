// Windowed per-player accumulation over a chronological game stream.
//
// Two overlapping windows are tracked at once: the full queried range and a
// trailing late-window sub-range (either everything from a given date, or
// the last N qualifying games). Every counter increment that lands in the
// late window also lands in the full window, so late counts can never exceed
// full counts for the same key.
//
// The accumulator is a plain owned value constructed by the caller and
// mutated through explicit calls. It is deliberately NOT idempotent:
// accumulating the same game twice doubles every counter. Guarding against
// duplicate games is the caller's responsibility.

use std::collections::HashMap;

use tracing::debug;

use crate::calendar::ScanDate;
use crate::detect;
use crate::model::GameRecord;

// ---------------------------------------------------------------------------
// Window specification
// ---------------------------------------------------------------------------

/// How the trailing late window is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LateWindow {
    /// Qualifying games dated on or after this date.
    From(ScanDate),
    /// The trailing N qualifying games of the range.
    TrailingGames(usize),
}

/// Window bounds for one analysis run. The late window always ends where the
/// full window ends.
#[derive(Debug, Clone, Copy)]
pub struct WindowSpec {
    /// Inclusive last date of the full window.
    pub full_end: ScanDate,
    pub late: LateWindow,
}

// ---------------------------------------------------------------------------
// Counters
// ---------------------------------------------------------------------------

/// PA count and summed run-expectancy contribution for one window.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WindowedCounts {
    pub pa: u32,
    pub re24_sum: f64,
}

impl WindowedCounts {
    /// RE24 per plate appearance, 0.0 when no PAs were observed.
    pub fn re24_per_pa(&self) -> f64 {
        if self.pa == 0 {
            0.0
        } else {
            self.re24_sum / self.pa as f64
        }
    }
}

/// Full- and late-window batting counters for one player.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatterTotals {
    pub full: WindowedCounts,
    pub late: WindowedCounts,
}

/// Starting-pitcher start counts for one pitcher within one team grouping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StartCounts {
    pub full: u32,
    pub late: u32,
}

// ---------------------------------------------------------------------------
// Aggregate
// ---------------------------------------------------------------------------

/// Accumulated per-player state for one tracked team over one date range.
#[derive(Debug, Clone)]
pub struct GameLogAggregate {
    tracked_team: String,
    windows: WindowSpec,
    /// Batting counters keyed by batter name. Covers every batter appearing
    /// in a qualifying game, opponents included; roster filtering happens at
    /// reconciliation time.
    pub batters: HashMap<String, BatterTotals>,
    /// Start counts keyed by team code, then by pitcher name.
    pub starts: HashMap<String, HashMap<String, StartCounts>>,
    /// Number of qualifying games accumulated so far.
    pub games_seen: u32,
}

impl GameLogAggregate {
    pub fn new(tracked_team: impl Into<String>, windows: WindowSpec) -> Self {
        Self {
            tracked_team: tracked_team.into(),
            windows,
            batters: HashMap::new(),
            starts: HashMap::new(),
            games_seen: 0,
        }
    }

    pub fn tracked_team(&self) -> &str {
        &self.tracked_team
    }

    /// Whether a game contributes to the aggregate at all: finished, tracked
    /// team on either side, and dated inside the full window. Games with an
    /// unparseable timestamp cannot be windowed and are skipped.
    pub fn qualifies(&self, game: &GameRecord) -> bool {
        if !game.is_finished() || !game.involves(&self.tracked_team) {
            return false;
        }
        match game.date() {
            Some(date) => date <= self.windows.full_end,
            None => {
                debug!(
                    "skipping game with unparseable timestamp '{}'",
                    game.info.started_at
                );
                false
            }
        }
    }

    /// Fold a chronological game stream into the aggregate.
    ///
    /// Late-window membership is decided here: by date for
    /// `LateWindow::From`, by position among the qualifying games for
    /// `LateWindow::TrailingGames`.
    pub fn accumulate_all(&mut self, games: &[GameRecord]) {
        let qualifying: Vec<&GameRecord> = games.iter().filter(|g| self.qualifies(g)).collect();
        let trailing_start = match self.windows.late {
            LateWindow::TrailingGames(n) => qualifying.len().saturating_sub(n),
            LateWindow::From(_) => 0,
        };

        for (idx, game) in qualifying.iter().enumerate() {
            let in_late = match self.windows.late {
                LateWindow::From(start) => game.date().is_some_and(|d| d >= start),
                LateWindow::TrailingGames(_) => idx >= trailing_start,
            };
            self.accumulate(game, in_late);
        }
    }

    /// Fold a single qualifying game into the aggregate. `in_late` marks
    /// late-window membership, decided by the caller.
    ///
    /// Calling this twice for the same game doubles its contribution.
    pub fn accumulate(&mut self, game: &GameRecord, in_late: bool) {
        self.games_seen += 1;

        // Batting counters for every PA, both sides.
        for pa in &game.pa_list {
            let totals = self.batters.entry(pa.batter.name.clone()).or_default();
            totals.full.pa += 1;
            totals.full.re24_sum += pa.re24;
            if in_late {
                totals.late.pa += 1;
                totals.late.re24_sum += pa.re24;
            }
        }

        // Starter credit: the top of the 1st is pitched by the home side,
        // the bottom by the away side. Attribution uses the literal team
        // codes on the record. An undetectable bottom-half starter costs
        // only its own credit, not the whole game.
        let sp = detect::detect(game);
        if let Some(name) = sp.top_half {
            self.credit_start(game.home.abbr.clone(), name, in_late);
        }
        if let Some(name) = sp.bottom_half {
            self.credit_start(game.away.abbr.clone(), name, in_late);
        }
    }

    fn credit_start(&mut self, team: String, pitcher: String, in_late: bool) {
        let counts = self
            .starts
            .entry(team)
            .or_default()
            .entry(pitcher)
            .or_default();
        counts.full += 1;
        if in_late {
            counts.late += 1;
        }
    }

    /// Start counts for the tracked team's own staff, if any were credited.
    pub fn tracked_starts(&self) -> Option<&HashMap<String, StartCounts>> {
        self.starts.get(&self.tracked_team)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PlateAppearance;

    fn pa(batter: &str, pitcher: &str, order: u32, round: u32, re24: f64) -> PlateAppearance {
        let json = format!(
            r#"{{
                "batter": {{ "name": "{batter}" }},
                "pitcher": {{ "name": "{pitcher}" }},
                "PA_order": {order},
                "PA_round": {round},
                "RE24": "{re24}"
            }}"#
        );
        serde_json::from_str(&json).unwrap()
    }

    fn game(
        home: &str,
        away: &str,
        date: &str,
        status: &str,
        pa_list: Vec<PlateAppearance>,
    ) -> GameRecord {
        let json = format!(
            r#"{{
                "home": {{ "abbr": "{home}" }},
                "away": {{ "abbr": "{away}" }},
                "info": {{ "status": "{status}", "started_at": "{date} 18:35", "winner_side": "HOME" }}
            }}"#
        );
        let mut game: GameRecord = serde_json::from_str(&json).unwrap();
        game.pa_list = pa_list;
        game
    }

    /// Minimal game with a detectable transition: two away PAs against the
    /// home starter, then one home PA against the away starter.
    fn simple_game(home: &str, away: &str, date: &str, home_sp: &str, away_sp: &str) -> GameRecord {
        game(
            home,
            away,
            date,
            "FINISHED",
            vec![
                pa("away_batter", home_sp, 1, 1, 0.2),
                pa("away_batter2", home_sp, 2, 1, -0.1),
                pa("home_batter", away_sp, 1, 1, 0.5),
            ],
        )
    }

    fn spec(full_end: ScanDate, late: LateWindow) -> WindowSpec {
        WindowSpec { full_end, late }
    }

    // ---- Qualification ----

    #[test]
    fn unfinished_game_skipped() {
        let agg = GameLogAggregate::new(
            "悍",
            spec(ScanDate::new(2025, 6, 30), LateWindow::TrailingGames(2)),
        );
        let g = game("悍", "龍", "2025-05-01", "IN_PROGRESS", Vec::new());
        assert!(!agg.qualifies(&g));
    }

    #[test]
    fn untracked_game_skipped() {
        let agg = GameLogAggregate::new(
            "悍",
            spec(ScanDate::new(2025, 6, 30), LateWindow::TrailingGames(2)),
        );
        let g = game("象", "龍", "2025-05-01", "FINISHED", Vec::new());
        assert!(!agg.qualifies(&g));
    }

    #[test]
    fn game_after_full_window_skipped() {
        let agg = GameLogAggregate::new(
            "悍",
            spec(ScanDate::new(2025, 6, 30), LateWindow::TrailingGames(2)),
        );
        let g = game("悍", "龍", "2025-07-01", "FINISHED", Vec::new());
        assert!(!agg.qualifies(&g));
        // The boundary date itself is inside the window.
        let g = game("悍", "龍", "2025-06-30", "FINISHED", Vec::new());
        assert!(agg.qualifies(&g));
    }

    // ---- Batting counters ----

    #[test]
    fn batter_counts_split_by_date_window() {
        let mut agg = GameLogAggregate::new(
            "悍",
            spec(
                ScanDate::new(2025, 6, 30),
                LateWindow::From(ScanDate::new(2025, 6, 23)),
            ),
        );

        let games = vec![
            game(
                "悍",
                "龍",
                "2025-06-01",
                "FINISHED",
                vec![pa("張三", "p1", 1, 1, 0.4), pa("張三", "p1", 2, 1, 0.1)],
            ),
            game(
                "龍",
                "悍",
                "2025-06-25",
                "FINISHED",
                vec![pa("張三", "p2", 1, 1, -0.2)],
            ),
        ];
        agg.accumulate_all(&games);

        let totals = &agg.batters["張三"];
        assert_eq!(totals.full.pa, 3);
        assert!((totals.full.re24_sum - 0.3).abs() < 1e-9);
        assert_eq!(totals.late.pa, 1);
        assert!((totals.late.re24_sum + 0.2).abs() < 1e-9);
    }

    #[test]
    fn opponent_batters_also_counted() {
        let mut agg = GameLogAggregate::new(
            "悍",
            spec(ScanDate::new(2025, 6, 30), LateWindow::TrailingGames(1)),
        );
        let games = vec![simple_game("悍", "龍", "2025-05-01", "home_sp", "away_sp")];
        agg.accumulate_all(&games);
        // Both sides' batters get full-window entries.
        assert!(agg.batters.contains_key("away_batter"));
        assert!(agg.batters.contains_key("home_batter"));
    }

    #[test]
    fn re24_per_pa_derivation() {
        let counts = WindowedCounts {
            pa: 4,
            re24_sum: 1.0,
        };
        assert!((counts.re24_per_pa() - 0.25).abs() < 1e-12);
        assert_eq!(WindowedCounts::default().re24_per_pa(), 0.0);
    }

    // ---- Trailing-games late window ----

    #[test]
    fn trailing_games_window_marks_last_n() {
        let mut agg = GameLogAggregate::new(
            "悍",
            spec(ScanDate::new(2025, 6, 30), LateWindow::TrailingGames(2)),
        );
        let games = vec![
            simple_game("悍", "龍", "2025-05-01", "sp_a", "sp_x"),
            simple_game("悍", "龍", "2025-05-02", "sp_b", "sp_x"),
            simple_game("悍", "龍", "2025-05-03", "sp_a", "sp_x"),
        ];
        agg.accumulate_all(&games);

        let tracked = agg.tracked_starts().unwrap();
        // sp_a started games 1 and 3; only game 3 is in the trailing two.
        assert_eq!(tracked["sp_a"], StartCounts { full: 2, late: 1 });
        // sp_b started game 2, which is in the trailing two.
        assert_eq!(tracked["sp_b"], StartCounts { full: 1, late: 1 });
    }

    #[test]
    fn trailing_games_larger_than_range_covers_everything() {
        let mut agg = GameLogAggregate::new(
            "悍",
            spec(ScanDate::new(2025, 6, 30), LateWindow::TrailingGames(10)),
        );
        let games = vec![simple_game("悍", "龍", "2025-05-01", "sp_a", "sp_x")];
        agg.accumulate_all(&games);
        let tracked = agg.tracked_starts().unwrap();
        assert_eq!(tracked["sp_a"], StartCounts { full: 1, late: 1 });
    }

    // ---- Starter attribution ----

    #[test]
    fn starters_credited_to_their_sides() {
        let mut agg = GameLogAggregate::new(
            "悍",
            spec(ScanDate::new(2025, 6, 30), LateWindow::TrailingGames(1)),
        );
        // Guardians are the away side here: their starter pitched the bottom.
        let games = vec![simple_game("龍", "悍", "2025-05-01", "dragons_sp", "guardians_sp")];
        agg.accumulate_all(&games);

        assert_eq!(
            agg.starts["龍"]["dragons_sp"],
            StartCounts { full: 1, late: 1 }
        );
        assert_eq!(
            agg.starts["悍"]["guardians_sp"],
            StartCounts { full: 1, late: 1 }
        );
    }

    #[test]
    fn missing_bottom_starter_still_credits_top() {
        let mut agg = GameLogAggregate::new(
            "悍",
            spec(ScanDate::new(2025, 6, 30), LateWindow::TrailingGames(1)),
        );
        // No order reset: bottom-half starter is undetectable.
        let games = vec![game(
            "悍",
            "龍",
            "2025-05-01",
            "FINISHED",
            vec![pa("b1", "home_sp", 1, 1, 0.0), pa("b2", "home_sp", 2, 1, 0.0)],
        )];
        agg.accumulate_all(&games);

        assert_eq!(
            agg.starts["悍"]["home_sp"],
            StartCounts { full: 1, late: 1 }
        );
        assert!(agg.starts.get("龍").is_none());
    }

    // ---- Invariants ----

    #[test]
    fn late_window_is_subset_of_full() {
        let mut agg = GameLogAggregate::new(
            "悍",
            spec(
                ScanDate::new(2025, 6, 30),
                LateWindow::From(ScanDate::new(2025, 6, 1)),
            ),
        );
        let games = vec![
            simple_game("悍", "龍", "2025-05-20", "sp_a", "sp_x"),
            simple_game("悍", "龍", "2025-06-10", "sp_a", "sp_x"),
            simple_game("龍", "悍", "2025-06-20", "sp_x", "sp_b"),
        ];
        agg.accumulate_all(&games);

        for totals in agg.batters.values() {
            assert!(totals.late.pa <= totals.full.pa);
        }
        for team in agg.starts.values() {
            for counts in team.values() {
                assert!(counts.late <= counts.full);
            }
        }
    }

    #[test]
    fn accumulate_is_not_idempotent() {
        // Documented non-property: replaying a game doubles its counters.
        let mut agg = GameLogAggregate::new(
            "悍",
            spec(ScanDate::new(2025, 6, 30), LateWindow::TrailingGames(1)),
        );
        let g = simple_game("悍", "龍", "2025-05-01", "sp_a", "sp_x");
        agg.accumulate(&g, false);
        agg.accumulate(&g, false);

        assert_eq!(agg.games_seen, 2);
        assert_eq!(agg.batters["away_batter"].full.pa, 2);
        assert_eq!(agg.starts["悍"]["sp_a"].full, 2);
    }
}
