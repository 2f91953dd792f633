/// Query window derivation around the target date.
///
/// All windows are half-open `[start, end)` intervals of UTC timestamps.
/// The target date itself belongs to no before/after window: the before
/// window ends at target midnight, the after window starts the following
/// midnight. The on-day policy queries the wider nearest-day span and
/// separates exact-day candidates itself.
///
/// # Determinism
/// Windows are derived purely from the configured target date — nothing in
/// here reads the clock, so window math is fully deterministic in tests.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

use crate::model::TimePreference;

/// A half-open time interval plus the tie-break direction used when several
/// equally-cloudy candidates fall inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub preference: TimePreference,
}

/// UTC midnight at the start of a date.
fn day_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

impl SelectionWindow {
    /// Before-window: `[target - lookback_days, target)`, preferring the
    /// latest acquisition (closest to the target from below).
    pub fn before(target: NaiveDate, lookback_days: i64) -> SelectionWindow {
        let end = day_start(target);
        SelectionWindow {
            start: end - Duration::days(lookback_days),
            end,
            preference: TimePreference::Latest,
        }
    }

    /// After-window: `[target + 1d, target + 1d + lookahead_days)`,
    /// preferring the earliest acquisition (closest to the target from
    /// above).
    pub fn after(target: NaiveDate, lookahead_days: i64) -> SelectionWindow {
        let start = day_start(target) + Duration::days(1);
        SelectionWindow {
            start,
            end: start + Duration::days(lookahead_days),
            preference: TimePreference::Earliest,
        }
    }

    /// Nearest-day span for the on-target window: `[target - N, target + N + 1)`,
    /// i.e. every acquisition within ±N whole days of the target date,
    /// including the target date itself.
    pub fn nearest(target: NaiveDate, fallback_days: i64) -> SelectionWindow {
        let anchor = day_start(target);
        SelectionWindow {
            start: anchor - Duration::days(fallback_days),
            end: anchor + Duration::days(fallback_days + 1),
            preference: TimePreference::Earliest,
        }
    }

    /// Half-open membership test: `start <= t < end`.
    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.start <= t && t < self.end
    }

    /// RFC 3339 `start/end` pair for catalog `datetime` parameters.
    /// Z-suffixed so the interval stays clean inside a query string.
    pub fn datetime_interval(&self) -> String {
        let fmt = "%Y-%m-%dT%H:%M:%SZ";
        format!("{}/{}", self.start.format(fmt), self.end.format(fmt))
    }

    /// Number of whole days the window spans.
    pub fn span_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
