use serde::{Deserialize, Serialize};

use crate::models::Quarter;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PortfolioChangeType {
    NewPosition,
    Increased,
    Decreased,
    Sold,
    Unchanged,
}

/// Cut-offs used to flag a change as noteworthy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChangeThresholds {
    /// Absolute value change (USD) above which a move is "major"
    pub major_move_value: f64,
    /// Absolute value change (USD) above which a move is "significant"
    pub significant_value: f64,
    /// Absolute share change, in percent, above which a move is "significant"
    pub significant_percent: f64,
}

impl Default for ChangeThresholds {
    fn default() -> Self {
        Self {
            major_move_value: 1_000_000_000.0,
            significant_value: 100_000_000.0,
            significant_percent: 10.0,
        }
    }
}

/// Per-CUSIP change between two filings of one investor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioChange {
    #[serde(rename = "type")]
    pub change_type: PortfolioChangeType,
    pub cusip: String,
    pub name: String,
    pub ticker: String,
    pub previous_shares: u64,
    pub current_shares: u64,
    pub previous_value: f64,
    pub current_value: f64,
    pub share_change: i64,
    pub value_change: f64,
    pub percent_change: f64,
    pub is_major_move: bool,
    pub is_significant: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ChangeSummary {
    pub new_positions: usize,
    pub sold_positions: usize,
    pub increased_positions: usize,
    pub decreased_positions: usize,
    pub major_moves: usize,
    pub total_value_change: f64,
    pub portfolio_value_previous: f64,
    pub portfolio_value_current: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioAnalysis {
    pub investor: String,
    pub previous_quarter: Quarter,
    pub current_quarter: Quarter,
    pub changes: Vec<PortfolioChange>,
    pub summary: ChangeSummary,
}
