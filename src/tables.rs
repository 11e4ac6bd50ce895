// Archived HTML stat-table parsing.
//
// Analysts save the advanced-stats pages as local HTML files; this module
// turns them into tagged rows for the reconciler. Tables are recognized by
// their header text, not position: a pitching table carries both `ERA+` and
// `tERA+` columns, a batting table carries any subset of the recognized
// batting rate columns. Cell values use a lossy-but-non-fatal numeric
// policy: the placeholders the site emits (`-`, `NaN`, `Infinity`, empty)
// and anything else unparseable all coerce to 0.0.

use std::collections::HashMap;
use std::path::Path;

use scraper::{Html, Selector};
use tracing::{debug, warn};

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// One pitcher row from an archived pitching table.
#[derive(Debug, Clone, PartialEq)]
pub struct PitchingRow {
    pub name: String,
    pub era_plus: f64,
    pub tera_plus: f64,
}

/// Recognized batting rate metrics, zero-filled for columns a page lacks.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BattingMetrics {
    pub avg: f64,
    pub iso: f64,
    pub ops_plus: f64,
    pub tops_plus: f64,
    pub babip: f64,
    pub pitches_per_pa: f64,
}

/// One batter row, merged across every table of the page that mentions the
/// player. Order of rows follows first appearance in the document.
#[derive(Debug, Clone, PartialEq)]
pub struct BattingRow {
    pub name: String,
    pub metrics: BattingMetrics,
}

/// Rows whose player name contains this marker are league/team summary rows,
/// not players.
const TEAM_AVERAGE_MARKER: &str = "平均";

// ---------------------------------------------------------------------------
// Numeric cell coercion
// ---------------------------------------------------------------------------

/// Parse a stat cell. The site's placeholder values and malformed content
/// all map to 0.0 rather than failing the row.
pub fn coerce_cell(raw: &str) -> f64 {
    let trimmed = raw.trim();
    match trimmed {
        "-" | "NaN" | "Infinity" | "" => 0.0,
        _ => trimmed.parse().unwrap_or_else(|_| {
            warn!("unparseable stat cell '{trimmed}' coerced to 0.0");
            0.0
        }),
    }
}

// ---------------------------------------------------------------------------
// Pitching tables
// ---------------------------------------------------------------------------

/// Extract pitcher rows from every table in `html` whose header carries both
/// `ERA+` and `tERA+` columns. The player name is the first cell.
pub fn parse_pitching_tables(html: &str) -> Vec<PitchingRow> {
    let document = Html::parse_document(html);
    let (Some(table_sel), Some(th_sel), Some(row_sel), Some(cell_sel)) = (
        Selector::parse("table").ok(),
        Selector::parse("thead th").ok(),
        Selector::parse("tbody tr").ok(),
        Selector::parse("td").ok(),
    ) else {
        return Vec::new();
    };

    let mut rows = Vec::new();
    for table in document.select(&table_sel) {
        let headers: Vec<String> = table
            .select(&th_sel)
            .map(|th| th.text().collect::<String>().trim().to_string())
            .collect();

        let era_idx = headers.iter().position(|h| h == "ERA+");
        let tera_idx = headers.iter().position(|h| h == "tERA+");
        let (Some(era_idx), Some(tera_idx)) = (era_idx, tera_idx) else {
            continue;
        };

        for row in table.select(&row_sel) {
            let cells: Vec<String> = row
                .select(&cell_sel)
                .map(|td| td.text().collect::<String>().trim().to_string())
                .collect();
            if cells.len() <= era_idx.max(tera_idx) {
                continue;
            }
            let name = cells[0].clone();
            if name.is_empty() || name.contains(TEAM_AVERAGE_MARKER) {
                continue;
            }
            rows.push(PitchingRow {
                name,
                era_plus: coerce_cell(&cells[era_idx]),
                tera_plus: coerce_cell(&cells[tera_idx]),
            });
        }
    }
    debug!("parsed {} pitching rows", rows.len());
    rows
}

/// Read and parse an archived pitching page. A missing or unreadable file
/// yields an empty table with a warning, per the lossy parse policy.
pub fn load_pitching_table(path: &Path) -> Vec<PitchingRow> {
    match std::fs::read_to_string(path) {
        Ok(html) => parse_pitching_tables(&html),
        Err(e) => {
            warn!("cannot read pitching table {}: {e}", path.display());
            Vec::new()
        }
    }
}

// ---------------------------------------------------------------------------
// Batting tables
// ---------------------------------------------------------------------------

/// Which `BattingMetrics` field a recognized header column feeds.
#[derive(Debug, Clone, Copy)]
enum BattingColumn {
    Avg,
    Iso,
    OpsPlus,
    TopsPlus,
    Babip,
    PitchesPerPa,
}

fn batting_column(header: &str) -> Option<BattingColumn> {
    match header {
        "AVG" => Some(BattingColumn::Avg),
        "ISO" => Some(BattingColumn::Iso),
        "OPS+" => Some(BattingColumn::OpsPlus),
        "tOPS+" => Some(BattingColumn::TopsPlus),
        "BABIP" => Some(BattingColumn::Babip),
        "P/PA" => Some(BattingColumn::PitchesPerPa),
        _ => None,
    }
}

fn apply_column(metrics: &mut BattingMetrics, column: BattingColumn, value: f64) {
    match column {
        BattingColumn::Avg => metrics.avg = value,
        BattingColumn::Iso => metrics.iso = value,
        BattingColumn::OpsPlus => metrics.ops_plus = value,
        BattingColumn::TopsPlus => metrics.tops_plus = value,
        BattingColumn::Babip => metrics.babip = value,
        BattingColumn::PitchesPerPa => metrics.pitches_per_pa = value,
    }
}

/// Extract batter rows from every table in `html` carrying at least one
/// recognized batting column. A page spreads the metrics across several
/// tables, so rows merge by player name; the name comes from the row's
/// button element and team-average rows are dropped.
pub fn parse_batting_tables(html: &str) -> Vec<BattingRow> {
    let document = Html::parse_document(html);
    let (Some(table_sel), Some(th_sel), Some(row_sel), Some(cell_sel), Some(button_sel)) = (
        Selector::parse("table").ok(),
        Selector::parse("thead th").ok(),
        Selector::parse("tbody tr").ok(),
        Selector::parse("td").ok(),
        Selector::parse("button").ok(),
    ) else {
        return Vec::new();
    };

    let mut rows: Vec<BattingRow> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for table in document.select(&table_sel) {
        let headers: Vec<String> = table
            .select(&th_sel)
            .map(|th| th.text().collect::<String>().trim().to_string())
            .collect();

        let columns: Vec<(usize, BattingColumn)> = headers
            .iter()
            .enumerate()
            .filter_map(|(idx, h)| batting_column(h).map(|c| (idx, c)))
            .collect();
        if columns.is_empty() {
            continue;
        }

        for row in table.select(&row_sel) {
            let Some(button) = row.select(&button_sel).next() else {
                continue;
            };
            let name = button.text().collect::<String>().trim().to_string();
            if name.is_empty() || name.contains(TEAM_AVERAGE_MARKER) {
                continue;
            }

            let cells: Vec<String> = row
                .select(&cell_sel)
                .map(|td| td.text().collect::<String>().trim().to_string())
                .collect();

            let slot = *index.entry(name.clone()).or_insert_with(|| {
                rows.push(BattingRow {
                    name: name.clone(),
                    metrics: BattingMetrics::default(),
                });
                rows.len() - 1
            });

            for &(idx, column) in &columns {
                if let Some(cell) = cells.get(idx) {
                    apply_column(&mut rows[slot].metrics, column, coerce_cell(cell));
                }
            }
        }
    }
    debug!("parsed {} batting rows", rows.len());
    rows
}

/// Read and parse an archived batting page; missing file yields no rows.
pub fn load_batting_table(path: &Path) -> Vec<BattingRow> {
    match std::fs::read_to_string(path) {
        Ok(html) => parse_batting_tables(&html),
        Err(e) => {
            warn!("cannot read batting table {}: {e}", path.display());
            Vec::new()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
