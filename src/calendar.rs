// Approximate calendar arithmetic for weekly API pagination.
//
// The rebas.tw API pages game data in 7-day blocks keyed by the block's start
// date, so the scan loop only ever needs "this date plus seven days". The
// arithmetic here reproduces the simplified month-table stepping the prior
// exports were built on: day overflow rolls the month, month overflow rolls
// the year, and February gets 29 days when `year % 4 == 0 && year % 100 != 0`.
// The Gregorian `% 400` century rule is NOT applied. Across a year rollover
// the result can drift from the true calendar; swapping in a real date
// library would change week boundaries and break comparability with existing
// exports, so the approximation is kept deliberately.

use std::fmt;

use serde::Deserialize;

// ---------------------------------------------------------------------------
// ScanDate
// ---------------------------------------------------------------------------

/// A calendar date at day resolution. Ordering is lexicographic on
/// (year, month, day), which matches chronological order for structurally
/// valid dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
pub struct ScanDate {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

impl ScanDate {
    pub fn new(year: u16, month: u8, day: u8) -> Self {
        Self { year, month, day }
    }

    /// Step forward by one API page (7 days) under the simplified calendar.
    pub fn advance_week(self) -> Self {
        let mut year = self.year;
        let mut month = self.month;
        let mut day = self.day + 7;

        let len = days_in_month(year, month);
        if day > len {
            day -= len;
            month += 1;
        }
        if month > 12 {
            month -= 12;
            year += 1;
        }

        Self { year, month, day }
    }
}

impl fmt::Display for ScanDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// Length of a month under the simplified rules. The leap check skips the
/// `% 400` century rule on purpose (see module header).
pub fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        _ => {
            if year % 4 == 0 && year % 100 != 0 {
                29
            } else {
                28
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Timestamp parsing
// ---------------------------------------------------------------------------

/// Extract the date portion of an API `started_at` timestamp
/// ("2025-06-30 18:35" or just "2025-06-30"). Returns `None` for anything
/// that does not carry three dash-separated integer fields.
pub fn parse_started_at(raw: &str) -> Option<ScanDate> {
    let date_part = raw.split_whitespace().next()?;
    let mut fields = date_part.split('-');
    let year = fields.next()?.parse().ok()?;
    let month = fields.next()?.parse().ok()?;
    let day = fields.next()?.parse().ok()?;
    if fields.next().is_some() {
        return None;
    }
    Some(ScanDate::new(year, month, day))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
