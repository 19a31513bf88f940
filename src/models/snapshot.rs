use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{MergedPosition, Quarter, RawPosition};

/// One filing as stored on disk: `<investor>/<YYYY-Qn>.json`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct HoldingsFile {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub positions: Vec<RawPosition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accession: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quarter_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub positions_count: Option<usize>,
}

/// One investor's merged holdings for one filing quarter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub quarter: Quarter,
    pub date: String,
    pub positions: Vec<MergedPosition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reported_total_value: Option<f64>,
}

impl Snapshot {
    pub fn new(quarter: Quarter, date: impl Into<String>, positions: Vec<MergedPosition>) -> Self {
        Self {
            quarter,
            date: date.into(),
            positions,
            reported_total_value: None,
        }
    }

    /// Sum of all position values; the denominator for portfolio weights.
    pub fn total_value(&self) -> f64 {
        self.positions.iter().map(|p| p.value).sum()
    }

    /// Value as reported by the filing when present, otherwise the summed value.
    pub fn portfolio_value(&self) -> f64 {
        match self.reported_total_value {
            Some(total) if total > 0.0 => total,
            _ => self.total_value(),
        }
    }

    pub fn filing_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").ok()
    }

    pub fn position(&self, cusip: &str) -> Option<&MergedPosition> {
        self.positions.iter().find(|p| p.cusip == cusip)
    }
}

/// An investor's snapshots, always ascending by quarter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InvestorHistory {
    pub investor: String,
    pub snapshots: Vec<Snapshot>,
}

impl InvestorHistory {
    pub fn new(investor: impl Into<String>, mut snapshots: Vec<Snapshot>) -> Self {
        snapshots.sort_by_key(|s| s.quarter);
        Self {
            investor: investor.into(),
            snapshots,
        }
    }

    pub fn latest(&self) -> Option<&Snapshot> {
        self.snapshots.last()
    }

    pub fn previous(&self) -> Option<&Snapshot> {
        self.snapshots.iter().rev().nth(1)
    }
}
