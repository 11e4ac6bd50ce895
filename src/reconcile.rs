// Cross-source reconciliation of game-log aggregates with archived tables.
//
// The two sources share no identifier except the player's name, and the
// archived pages sometimes render a longer or shorter form of it (suffixes,
// alternate characters). The join therefore walks the external rows in table
// order and takes the FIRST row whose name contains the aggregate key as a
// substring, or vice versa. This is an O(n*m) first-found policy, not a
// best-match algorithm: a key matching several rows silently gets the
// earliest one. Each joined record carries a match confidence so downstream
// consumers can flag the low-confidence joins instead of trusting them
// blindly.

use std::collections::HashMap;

use tracing::debug;

use crate::aggregate::{BatterTotals, StartCounts};
use crate::tables::{BattingMetrics, BattingRow, PitchingRow};

// ---------------------------------------------------------------------------
// Match confidence
// ---------------------------------------------------------------------------

/// How a joined record's external metrics were resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchConfidence {
    /// The external name equals the aggregate key.
    Exact,
    /// One name contains the other; first such row won.
    Substring,
    /// No external row matched; metrics are zero-valued.
    Unmatched,
}

impl MatchConfidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchConfidence::Exact => "exact",
            MatchConfidence::Substring => "substring",
            MatchConfidence::Unmatched => "unmatched",
        }
    }
}

fn names_match(key: &str, row_name: &str) -> bool {
    row_name.contains(key) || key.contains(row_name)
}

/// First-found lookup over external rows in table order.
fn find_row<'a, T>(
    key: &str,
    rows: &'a [T],
    name_of: impl Fn(&T) -> &str,
) -> (Option<&'a T>, MatchConfidence) {
    for row in rows {
        let row_name = name_of(row);
        if names_match(key, row_name) {
            let confidence = if row_name == key {
                MatchConfidence::Exact
            } else {
                MatchConfidence::Substring
            };
            return (Some(row), confidence);
        }
    }
    (None, MatchConfidence::Unmatched)
}

// ---------------------------------------------------------------------------
// Joined records
// ---------------------------------------------------------------------------

/// Starting-pitcher aggregate joined with archived pitching indices.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedPitcher {
    pub name: String,
    pub starts: StartCounts,
    pub era_plus: f64,
    pub tera_plus: f64,
    pub confidence: MatchConfidence,
}

/// Batting aggregate joined with archived batting rate metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedBatter {
    pub name: String,
    pub totals: BatterTotals,
    pub metrics: BattingMetrics,
    pub confidence: MatchConfidence,
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

/// Join start counts against archived pitching rows.
///
/// With `roster_filter` set, the external table acts as the authoritative
/// roster: aggregate keys with no match at all are excluded from the output
/// rather than carried with zero metrics.
pub fn reconcile_pitchers(
    starts: &HashMap<String, StartCounts>,
    rows: &[PitchingRow],
    roster_filter: bool,
) -> Vec<JoinedPitcher> {
    let mut joined: Vec<JoinedPitcher> = Vec::with_capacity(starts.len());
    for (name, counts) in starts {
        let (row, confidence) = find_row(name, rows, |r| r.name.as_str());
        if row.is_none() {
            debug!("no archived pitching row for '{name}'");
            if roster_filter {
                continue;
            }
        }
        joined.push(JoinedPitcher {
            name: name.clone(),
            starts: *counts,
            era_plus: row.map_or(0.0, |r| r.era_plus),
            tera_plus: row.map_or(0.0, |r| r.tera_plus),
            confidence,
        });
    }
    // Deterministic output order: busiest starters first.
    joined.sort_by(|a, b| {
        b.starts
            .full
            .cmp(&a.starts.full)
            .then_with(|| a.name.cmp(&b.name))
    });
    joined
}

/// Join batting aggregates against archived batting rows.
///
/// `roster_filter` keeps only batters present in the archived table, which
/// is how opposing batters picked up from the shared PA stream fall out of
/// a single team's report.
pub fn reconcile_batters(
    batters: &HashMap<String, BatterTotals>,
    rows: &[BattingRow],
    roster_filter: bool,
) -> Vec<JoinedBatter> {
    let mut joined: Vec<JoinedBatter> = Vec::with_capacity(batters.len());
    for (name, totals) in batters {
        let (row, confidence) = find_row(name, rows, |r| r.name.as_str());
        if row.is_none() {
            debug!("no archived batting row for '{name}'");
            if roster_filter {
                continue;
            }
        }
        joined.push(JoinedBatter {
            name: name.clone(),
            totals: totals.clone(),
            metrics: row.map_or_else(BattingMetrics::default, |r| r.metrics),
            confidence,
        });
    }
    joined.sort_by(|a, b| {
        b.totals
            .full
            .pa
            .cmp(&a.totals.full.pa)
            .then_with(|| a.name.cmp(&b.name))
    });
    joined
}

// ---------------------------------------------------------------------------
// Opponent groupings
// ---------------------------------------------------------------------------

/// Joined pitcher records for one team grouping of the start counts.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamPitchers {
    pub team: String,
    pub pitchers: Vec<JoinedPitcher>,
}

/// Join every non-tracked team grouping against its own archived table.
///
/// Each opponent's starters are reconciled against the table registered
/// under that team's code; a team with no table joins against an empty row
/// set, so its starters surface as unmatched (or drop out entirely under
/// `roster_filter`). Groups come back sorted by team code.
pub fn reconcile_opponents(
    starts: &HashMap<String, HashMap<String, StartCounts>>,
    tracked_team: &str,
    tables: &HashMap<String, Vec<PitchingRow>>,
    roster_filter: bool,
) -> Vec<TeamPitchers> {
    let mut groups: Vec<TeamPitchers> = starts
        .iter()
        .filter(|(team, _)| team.as_str() != tracked_team)
        .map(|(team, counts)| {
            let rows = tables.get(team).map_or(&[][..], |rows| rows.as_slice());
            TeamPitchers {
                team: team.clone(),
                pitchers: reconcile_pitchers(counts, rows, roster_filter),
            }
        })
        .collect();
    groups.sort_by(|a, b| a.team.cmp(&b.team));
    groups
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
