use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Target rep range for a planned exercise, e.g. "8-12"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepRange {
    pub low: u32,
    pub high: u32,
}

impl fmt::Display for RepRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.low == self.high {
            write!(f, "{}", self.low)
        } else {
            write!(f, "{}-{}", self.low, self.high)
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("unparseable rep range: {0:?}")]
pub struct RepRangeParseError(pub String);

impl FromStr for RepRange {
    type Err = RepRangeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || RepRangeParseError(s.to_string());
        let s = s.trim();
        let (low, high) = match s.split_once(['-', '–']) {
            Some((low, high)) => {
                (low.trim().parse().map_err(|_| err())?, high.trim().parse().map_err(|_| err())?)
            },
            None => {
                let n = s.parse().map_err(|_| err())?;
                (n, n)
            },
        };
        if low == 0 || high < low {
            return Err(err());
        }
        Ok(RepRange { low, high })
    }
}

/// One planned exercise for a user's plan day, as stored in the Plan tab.
/// Reference data, edited only in the spreadsheet itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanEntry {
    pub user_email: String,
    /// Weekday key selecting which exercises are scheduled
    pub day: String,
    pub exercise: String,
    /// Order within the day
    pub order: u32,
    pub planned_sets: u32,
    pub rep_range: RepRange,
    pub rest_secs: Option<u32>,
    pub video_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rep_range_parses_both_forms() {
        assert_eq!("8-12".parse::<RepRange>().unwrap(), RepRange { low: 8, high: 12 });
        assert_eq!("5".parse::<RepRange>().unwrap(), RepRange { low: 5, high: 5 });
        assert_eq!(" 6 - 10 ".parse::<RepRange>().unwrap(), RepRange { low: 6, high: 10 });
    }

    #[test]
    fn rep_range_rejects_nonsense() {
        assert!("".parse::<RepRange>().is_err());
        assert!("12-8".parse::<RepRange>().is_err());
        assert!("0".parse::<RepRange>().is_err());
        assert!("abc".parse::<RepRange>().is_err());
    }

    #[test]
    fn rep_range_displays_compactly() {
        assert_eq!(RepRange { low: 8, high: 12 }.to_string(), "8-12");
        assert_eq!(RepRange { low: 5, high: 5 }.to_string(), "5");
    }
}
