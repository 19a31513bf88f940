use serde::{Deserialize, Serialize};

use crate::models::Quarter;

/// A single security's footprint in one snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OwnershipHistoryPoint {
    pub quarter: Quarter,
    pub shares: u64,
    pub value: f64,
    /// Percent of the snapshot's total value (10.5 means 10.5%), 0 when the total is 0
    pub portfolio_percentage: f64,
    pub exists: bool,
}

/// Transition classification between two consecutive periods.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    New,
    Increased,
    Decreased,
    Sold,
    Unchanged,
}

/// Diff between two consecutive ownership points.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OwnershipChange {
    pub shares_change: i64,
    pub percentage_change: f64,
    pub value_change: f64,
    pub is_new: bool,
    pub is_sold: bool,
}

impl OwnershipChange {
    pub fn change_type(&self) -> ChangeType {
        if self.is_new {
            ChangeType::New
        } else if self.is_sold {
            ChangeType::Sold
        } else if self.shares_change > 0 {
            ChangeType::Increased
        } else if self.shares_change < 0 {
            ChangeType::Decreased
        } else {
            ChangeType::Unchanged
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OwnershipTimelineEntry {
    pub point: OwnershipHistoryPoint,
    pub change: OwnershipChange,
    pub change_type: ChangeType,
}
