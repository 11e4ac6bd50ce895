// CSV report writers.
//
// Reports open with a UTF-8 byte-order mark so spreadsheet software decodes
// the CJK player names correctly. Rate columns are rounded to three decimals
// to match the prior exports.

use std::io::Write;
use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::reconcile::{JoinedBatter, JoinedPitcher, TeamPitchers};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error writing report: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error writing report: {0}")]
    Csv(#[from] csv::Error),
}

fn round3(value: f64) -> String {
    format!("{value:.3}")
}

// ---------------------------------------------------------------------------
// Pitcher report
// ---------------------------------------------------------------------------

/// Write joined pitcher records: one row per starter, indexed by name.
pub fn write_pitcher_report<W: Write>(
    mut out: W,
    records: &[JoinedPitcher],
) -> Result<(), ExportError> {
    out.write_all(UTF8_BOM)?;
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(["投手名稱", "ERA+", "tERA+", "總出賽數", "季末出賽", "比對"])?;
    for record in records {
        writer.write_record([
            record.name.clone(),
            round3(record.era_plus),
            round3(record.tera_plus),
            record.starts.full.to_string(),
            record.starts.late.to_string(),
            record.confidence.as_str().to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn export_pitcher_csv(path: &Path, records: &[JoinedPitcher]) -> Result<(), ExportError> {
    let file = std::fs::File::create(path)?;
    write_pitcher_report(file, records)?;
    info!("wrote {} pitcher rows to {}", records.len(), path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Opponent pitcher report
// ---------------------------------------------------------------------------

/// Write per-team opponent starter groupings as one flat report with a
/// leading team-code column.
pub fn write_opponent_report<W: Write>(
    mut out: W,
    groups: &[TeamPitchers],
) -> Result<(), ExportError> {
    out.write_all(UTF8_BOM)?;
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(["隊伍", "投手名稱", "ERA+", "tERA+", "總出賽數", "季末出賽", "比對"])?;
    for group in groups {
        for record in &group.pitchers {
            writer.write_record([
                group.team.clone(),
                record.name.clone(),
                round3(record.era_plus),
                round3(record.tera_plus),
                record.starts.full.to_string(),
                record.starts.late.to_string(),
                record.confidence.as_str().to_string(),
            ])?;
        }
    }
    writer.flush()?;
    Ok(())
}

pub fn export_opponent_csv(path: &Path, groups: &[TeamPitchers]) -> Result<(), ExportError> {
    let file = std::fs::File::create(path)?;
    write_opponent_report(file, groups)?;
    let rows: usize = groups.iter().map(|g| g.pitchers.len()).sum();
    info!(
        "wrote {} opponent pitcher rows ({} teams) to {}",
        rows,
        groups.len(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Batter report
// ---------------------------------------------------------------------------

/// Write joined batter records with both windows' PA and RE24-per-PA.
pub fn write_batter_report<W: Write>(
    mut out: W,
    records: &[JoinedBatter],
) -> Result<(), ExportError> {
    out.write_all(UTF8_BOM)?;
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record([
        "球員名稱",
        "AVG",
        "ISO",
        "OPS+",
        "tOPS+",
        "BABIP",
        "P/PA",
        "Full_PA",
        "End_PA",
        "Full_RE24/PA",
        "End_RE24/PA",
        "比對",
    ])?;
    for record in records {
        writer.write_record([
            record.name.clone(),
            round3(record.metrics.avg),
            round3(record.metrics.iso),
            round3(record.metrics.ops_plus),
            round3(record.metrics.tops_plus),
            round3(record.metrics.babip),
            round3(record.metrics.pitches_per_pa),
            record.totals.full.pa.to_string(),
            record.totals.late.pa.to_string(),
            round3(record.totals.full.re24_per_pa()),
            round3(record.totals.late.re24_per_pa()),
            record.confidence.as_str().to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn export_batter_csv(path: &Path, records: &[JoinedBatter]) -> Result<(), ExportError> {
    let file = std::fs::File::create(path)?;
    write_batter_report(file, records)?;
    info!("wrote {} batter rows to {}", records.len(), path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{BatterTotals, StartCounts, WindowedCounts};
    use crate::reconcile::MatchConfidence;
    use crate::tables::BattingMetrics;

    fn pitcher(name: &str) -> JoinedPitcher {
        JoinedPitcher {
            name: name.into(),
            starts: StartCounts { full: 12, late: 3 },
            era_plus: 135.25,
            tera_plus: 120.0,
            confidence: MatchConfidence::Exact,
        }
    }

    fn batter(name: &str) -> JoinedBatter {
        JoinedBatter {
            name: name.into(),
            totals: BatterTotals {
                full: WindowedCounts {
                    pa: 4,
                    re24_sum: 1.0,
                },
                late: WindowedCounts {
                    pa: 2,
                    re24_sum: -0.5,
                },
            },
            metrics: BattingMetrics {
                avg: 0.3125,
                iso: 0.18,
                ops_plus: 142.0,
                tops_plus: 110.0,
                babip: 0.33,
                pitches_per_pa: 3.951,
            },
            confidence: MatchConfidence::Substring,
        }
    }

    #[test]
    fn pitcher_report_starts_with_bom() {
        let mut buf = Vec::new();
        write_pitcher_report(&mut buf, &[pitcher("陳仕朋")]).unwrap();
        assert_eq!(&buf[..3], UTF8_BOM);
    }

    #[test]
    fn pitcher_report_rows() {
        let mut buf = Vec::new();
        write_pitcher_report(&mut buf, &[pitcher("陳仕朋")]).unwrap();
        let text = String::from_utf8(buf[3..].to_vec()).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "投手名稱,ERA+,tERA+,總出賽數,季末出賽,比對"
        );
        assert_eq!(lines.next().unwrap(), "陳仕朋,135.250,120.000,12,3,exact");
    }

    #[test]
    fn opponent_report_carries_team_column() {
        let groups = vec![
            TeamPitchers {
                team: "象".into(),
                pitchers: vec![pitcher("象投")],
            },
            TeamPitchers {
                team: "龍".into(),
                pitchers: vec![pitcher("龍投")],
            },
        ];
        let mut buf = Vec::new();
        write_opponent_report(&mut buf, &groups).unwrap();
        let text = String::from_utf8(buf[3..].to_vec()).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "隊伍,投手名稱,ERA+,tERA+,總出賽數,季末出賽,比對"
        );
        assert_eq!(lines.next().unwrap(), "象,象投,135.250,120.000,12,3,exact");
        assert_eq!(lines.next().unwrap(), "龍,龍投,135.250,120.000,12,3,exact");
    }

    #[test]
    fn batter_report_rounds_rates() {
        let mut buf = Vec::new();
        write_batter_report(&mut buf, &[batter("張育成")]).unwrap();
        let text = String::from_utf8(buf[3..].to_vec()).unwrap();
        let row = text.lines().nth(1).unwrap();
        // Full RE24/PA = 1.0/4 = 0.250, late = -0.5/2 = -0.250.
        assert_eq!(
            row,
            "張育成,0.312,0.180,142.000,110.000,0.330,3.951,4,2,0.250,-0.250,substring"
        );
    }

    #[test]
    fn empty_report_is_header_only() {
        let mut buf = Vec::new();
        write_batter_report(&mut buf, &[]).unwrap();
        let text = String::from_utf8(buf[3..].to_vec()).unwrap();
        assert_eq!(text.lines().count(), 1);
    }
}
