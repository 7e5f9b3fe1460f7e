use chrono::{NaiveDate, NaiveTime, SecondsFormat};
use serde::{Deserialize, Serialize};

/// Inclusive calendar-day range the view covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        // A reversed range is treated as the same days, not as empty.
        if to < from {
            DateRange { from: to, to: from }
        } else {
            DateRange { from, to }
        }
    }

    /// Parse two `YYYY-MM-DD` strings.
    pub fn parse(from: &str, to: &str) -> Result<Self, String> {
        let parse = |s: &str| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("Invalid date {s:?}: {e}"))
        };
        Ok(DateRange::new(parse(from)?, parse(to)?))
    }

    /// `(createdAtFrom, createdAtTo)`: UTC start of the first day and end of
    /// the last day, millisecond precision.
    pub fn query_window(&self) -> (String, String) {
        let start = self.from.and_time(NaiveTime::MIN).and_utc();
        let end = self
            .to
            .and_hms_milli_opt(23, 59, 59, 999)
            .unwrap_or_else(|| self.to.and_time(NaiveTime::MIN))
            .and_utc();
        (
            start.to_rfc3339_opts(SecondsFormat::Millis, true),
            end.to_rfc3339_opts(SecondsFormat::Millis, true),
        )
    }

    /// Number of calendar days covered.
    pub fn days(&self) -> i64 {
        (self.to - self.from).num_days() + 1
    }

    /// Path segment form used in routes.
    pub fn route_parts(&self) -> (String, String) {
        (
            self.from.format("%Y-%m-%d").to_string(),
            self.to.format("%Y-%m-%d").to_string(),
        )
    }
}
