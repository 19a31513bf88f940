use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{ChangeType, MergedPosition, Quarter};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuarterlyChange {
    #[serde(rename = "type")]
    pub change_type: ChangeType,
    pub shares_delta: i64,
    pub percent_change: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TopHolding {
    pub cusip: String,
    pub ticker: String,
    pub name: String,
    pub shares: u64,
    pub value: f64,
    pub portfolio_percentage: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quarterly_change: Option<QuarterlyChange>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PositionDelta {
    #[serde(flatten)]
    pub position: MergedPosition,
    pub shares_delta: i64,
    pub percent_change: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClosedPosition {
    #[serde(flatten)]
    pub position: MergedPosition,
    pub previous_value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioChanges {
    pub new_positions: Vec<MergedPosition>,
    pub increased_positions: Vec<PositionDelta>,
    pub decreased_positions: Vec<PositionDelta>,
    pub closed_positions: Vec<ClosedPosition>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quarterly_return: Option<f64>,
    pub avg_position_size: f64,
    /// Combined portfolio percentage of the ten largest holdings
    pub concentration: f64,
}

/// Latest-quarter view of one investor's portfolio.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioOverview {
    pub investor: String,
    pub latest_quarter: Quarter,
    pub previous_quarter: Option<Quarter>,
    pub filing_date: String,
    pub total_value: f64,
    pub positions_count: usize,
    pub top_holdings: Vec<TopHolding>,
    pub portfolio_changes: PortfolioChanges,
    pub sector_allocation: BTreeMap<String, f64>,
    pub performance_metrics: PerformanceMetrics,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalValuePoint {
    pub quarter: Quarter,
    pub value: f64,
    #[serde(rename = "return", skip_serializing_if = "Option::is_none")]
    pub quarterly_return: Option<f64>,
}
