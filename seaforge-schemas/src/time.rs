use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Index of one timestep in an environmental series.
///
/// LME data is indexed by calendar date (month ends), gridded climate-model
/// output by an integer month counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimeKey {
    Date(NaiveDate),
    Month(i64),
}

impl fmt::Display for TimeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeKey::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            TimeKey::Month(month) => write!(f, "{}", month),
        }
    }
}

impl FromStr for TimeKey {
    type Err = String;

    /// Parses `YYYY-MM-DD` as a date and a bare integer as a month.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(month) = s.parse::<i64>() {
            return Ok(TimeKey::Month(month));
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(TimeKey::Date)
            .map_err(|e| format!("'{}' is neither a month index nor a YYYY-MM-DD date: {}", s, e))
    }
}
