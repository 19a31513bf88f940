use tracing::warn;

use crate::models::{OwnershipChange, OwnershipHistoryPoint, OwnershipTimelineEntry, Snapshot};

/// A position's value as a percentage of `total_value`; 0 for an empty portfolio.
pub fn calculate_portfolio_percentage(value: f64, total_value: f64) -> f64 {
    if total_value > 0.0 {
        (value / total_value) * 100.0
    } else {
        0.0
    }
}

/// Per-quarter footprint of `cusip`, one point per snapshot, in input order.
///
/// Snapshots are expected ascending by quarter. They are not re-sorted here;
/// an out-of-order input is logged so the resulting diff can be traced.
pub fn generate_ownership_history(snapshots: &[Snapshot], cusip: &str) -> Vec<OwnershipHistoryPoint> {
    if let Some(pair) = snapshots.windows(2).find(|w| w[0].quarter >= w[1].quarter) {
        warn!(
            "Snapshots for CUSIP {} are not in ascending quarter order ({} before {})",
            cusip, pair[0].quarter, pair[1].quarter
        );
    }

    snapshots
        .iter()
        .map(|snapshot| {
            let total_value = snapshot.total_value();
            match snapshot.position(cusip) {
                Some(position) => OwnershipHistoryPoint {
                    quarter: snapshot.quarter,
                    shares: position.shares,
                    value: position.value,
                    portfolio_percentage: calculate_portfolio_percentage(position.value, total_value),
                    exists: true,
                },
                None => OwnershipHistoryPoint {
                    quarter: snapshot.quarter,
                    shares: 0,
                    value: 0.0,
                    portfolio_percentage: 0.0,
                    exists: false,
                },
            }
        })
        .collect()
}

/// Diff `current` against `previous`; with no previous point the deltas are
/// the current absolute values.
pub fn calculate_ownership_changes(
    current: &OwnershipHistoryPoint,
    previous: Option<&OwnershipHistoryPoint>,
) -> OwnershipChange {
    match previous {
        None => OwnershipChange {
            shares_change: share_delta(0, current.shares),
            percentage_change: current.portfolio_percentage,
            value_change: current.value,
            is_new: current.exists,
            is_sold: false,
        },
        Some(previous) => OwnershipChange {
            shares_change: share_delta(previous.shares, current.shares),
            percentage_change: current.portfolio_percentage - previous.portfolio_percentage,
            value_change: current.value - previous.value,
            is_new: !previous.exists && current.exists,
            is_sold: previous.exists && !current.exists,
        },
    }
}

/// History points for `cusip` paired with the change from the preceding point.
pub fn ownership_timeline(snapshots: &[Snapshot], cusip: &str) -> Vec<OwnershipTimelineEntry> {
    let history = generate_ownership_history(snapshots, cusip);

    history
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let previous = if i > 0 { history.get(i - 1) } else { None };
            let change = calculate_ownership_changes(point, previous);
            OwnershipTimelineEntry {
                point: point.clone(),
                change_type: change.change_type(),
                change,
            }
        })
        .collect()
}

/// Signed change from `previous` to `current` shares, saturating at the `i64` bounds.
pub fn share_delta(previous: u64, current: u64) -> i64 {
    let delta = i128::from(current) - i128::from(previous);
    i64::try_from(delta).unwrap_or(if delta > 0 { i64::MAX } else { i64::MIN })
}
