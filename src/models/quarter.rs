use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// A filing quarter such as `2024-Q3`.
///
/// Ordered numerically by `(year, quarter)`, so `2024-Q4 < 2025-Q1` holds
/// regardless of how the label happens to sort as a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quarter {
    year: u16,
    quarter: u8,
}

#[derive(Debug, Clone, Error, PartialEq)]
#[error("invalid quarter label: {0}")]
pub struct InvalidQuarter(pub String);

fn quarter_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{4})-Q([1-4])$").expect("static quarter pattern"))
}

impl Quarter {
    pub fn new(year: u16, quarter: u8) -> Result<Self, InvalidQuarter> {
        if !(1..=4).contains(&quarter) {
            return Err(InvalidQuarter(format!("{}-Q{}", year, quarter)));
        }
        Ok(Self { year, quarter })
    }

    pub fn parse(label: &str) -> Result<Self, InvalidQuarter> {
        let caps = quarter_regex()
            .captures(label.trim())
            .ok_or_else(|| InvalidQuarter(label.to_string()))?;

        let year = caps[1]
            .parse::<u16>()
            .map_err(|_| InvalidQuarter(label.to_string()))?;
        let quarter = caps[2]
            .parse::<u8>()
            .map_err(|_| InvalidQuarter(label.to_string()))?;

        Self::new(year, quarter)
    }

    pub fn year(&self) -> u16 {
        self.year
    }

    pub fn quarter(&self) -> u8 {
        self.quarter
    }

    /// Human-facing label, e.g. `Q3 2024`.
    pub fn label(&self) -> String {
        format!("Q{} {}", self.quarter, self.year)
    }

    pub fn previous(&self) -> Self {
        if self.quarter == 1 {
            Self { year: self.year.saturating_sub(1), quarter: 4 }
        } else {
            Self { year: self.year, quarter: self.quarter - 1 }
        }
    }

    pub fn next(&self) -> Self {
        if self.quarter == 4 {
            Self { year: self.year.saturating_add(1), quarter: 1 }
        } else {
            Self { year: self.year, quarter: self.quarter + 1 }
        }
    }

    /// The quarter whose holdings a filing made in this quarter reports.
    ///
    /// 13F filings are due 45 days after quarter end: a February filing
    /// (Q1) reports the previous year's Q4, a May filing reports Q1, etc.
    pub fn reported_period(&self) -> Self {
        self.previous()
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-Q{}", self.year, self.quarter)
    }
}

impl FromStr for Quarter {
    type Err = InvalidQuarter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Quarter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Quarter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Quarter::parse(&label).map_err(serde::de::Error::custom)
    }
}
