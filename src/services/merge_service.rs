use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, warn};

use crate::models::{HoldingsFile, MergedPosition, Quarter, RawPosition, Snapshot};

/// A merge group whose line-items disagree on identity.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IdentityConflict {
    pub cusip: String,
    pub kept_ticker: Option<String>,
    pub other_ticker: Option<String>,
    pub kept_name: String,
    pub other_name: String,
}

#[derive(Debug, Clone, Default)]
pub struct MergeReport {
    pub positions: Vec<MergedPosition>,
    pub conflicts: Vec<IdentityConflict>,
}

/// Collapse raw line-items sharing a CUSIP into one position.
///
/// Shares and values are summed. Ticker and name come from the first record
/// in the group that has them set. Output follows first-appearance order.
pub fn merge_positions(raw: &[RawPosition]) -> Vec<MergedPosition> {
    merge_positions_with_report(raw).positions
}

pub fn merge_positions_with_report(raw: &[RawPosition]) -> MergeReport {
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(raw.len());
    let mut positions: Vec<MergedPosition> = Vec::with_capacity(raw.len());
    let mut conflicts = Vec::new();

    for item in raw {
        match index.get(item.cusip.as_str()) {
            Some(&i) => {
                let merged = &mut positions[i];
                merged.shares = merged.shares.saturating_add(item.shares);
                merged.value += item.value;

                if let Some(conflict) = absorb_identity(merged, item) {
                    conflicts.push(conflict);
                }
            }
            None => {
                index.insert(item.cusip.as_str(), positions.len());
                positions.push(MergedPosition::from(item));
            }
        }
    }

    if positions.len() < raw.len() {
        debug!("Merged {} line-items into {} positions", raw.len(), positions.len());
    }
    for conflict in &conflicts {
        warn!(
            "Conflicting identity for CUSIP {}: kept {:?}/{:?}, ignored {:?}/{:?}",
            conflict.cusip, conflict.kept_ticker, conflict.kept_name, conflict.other_ticker, conflict.other_name
        );
    }

    MergeReport { positions, conflicts }
}

// First-wins: fill gaps from later records, report disagreements.
fn absorb_identity(merged: &mut MergedPosition, item: &RawPosition) -> Option<IdentityConflict> {
    let mut conflicting = false;

    if merged.ticker.is_none() {
        merged.ticker = item.ticker.clone();
    } else if let (Some(kept), Some(other)) = (&merged.ticker, &item.ticker) {
        conflicting = !kept.eq_ignore_ascii_case(other);
    }

    let other_name = item.name.trim();
    if merged.name.trim().is_empty() {
        merged.name = item.name.clone();
    } else if !other_name.is_empty() && !merged.name.trim().eq_ignore_ascii_case(other_name) {
        conflicting = true;
    }

    conflicting.then(|| IdentityConflict {
        cusip: merged.cusip.clone(),
        kept_ticker: merged.ticker.clone(),
        other_ticker: item.ticker.clone(),
        kept_name: merged.name.clone(),
        other_name: item.name.clone(),
    })
}

/// Build a merged snapshot from one on-disk filing.
pub fn merge_snapshot(quarter: Quarter, file: &HoldingsFile) -> Snapshot {
    let positions = merge_positions(&file.positions);
    Snapshot {
        quarter,
        date: file.date.clone(),
        positions,
        reported_total_value: file.total_value.filter(|v| v.is_finite() && *v > 0.0),
    }
}
