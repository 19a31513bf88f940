use std::collections::{BTreeMap, HashMap};

use tracing::warn;

use crate::models::{
    ChangeType, ClosedPosition, HistoricalValuePoint, PerformanceMetrics, PortfolioChanges,
    PortfolioOverview, PositionDelta, QuarterlyChange, SecurityReference, Snapshot, TopHolding,
};
use crate::services::change_detection_service::share_percent_change;
use crate::services::identity_service::resolve_merged_identity;
use crate::services::ownership_service::{calculate_portfolio_percentage, share_delta};

const CONCENTRATION_HOLDINGS: usize = 10;
const UNKNOWN_SECTOR: &str = "Other";

/// Summarize the latest filing in `snapshots` against the one before it.
///
/// `snapshots` must be ascending by quarter; returns `None` when empty.
pub fn portfolio_overview(
    investor: &str,
    snapshots: &[Snapshot],
    reference: &SecurityReference,
    top_n: usize,
) -> Option<PortfolioOverview> {
    let Some(latest) = snapshots.last() else {
        warn!("No snapshots found for investor: {}", investor);
        return None;
    };
    let previous = snapshots.len().checked_sub(2).and_then(|i| snapshots.get(i));

    let previous_shares: HashMap<&str, u64> = previous
        .map(|p| p.positions.iter().map(|pos| (pos.cusip.as_str(), pos.shares)).collect())
        .unwrap_or_default();

    let total_value = latest.portfolio_value();

    let mut by_value: Vec<_> = latest.positions.iter().collect();
    by_value.sort_by(|a, b| b.value.total_cmp(&a.value));

    let top_holdings: Vec<TopHolding> = by_value
        .iter()
        .take(top_n)
        .map(|pos| {
            let identity = resolve_merged_identity(pos, reference);
            let prev_shares = previous_shares.get(pos.cusip.as_str()).copied().unwrap_or(0);
            let quarterly_change = previous.map(|_| quarterly_change(prev_shares, pos.shares));

            TopHolding {
                cusip: pos.cusip.clone(),
                ticker: identity.ticker,
                name: identity.display_name,
                shares: pos.shares,
                value: pos.value,
                portfolio_percentage: calculate_portfolio_percentage(pos.value, total_value),
                quarterly_change,
            }
        })
        .collect();

    let portfolio_changes = categorize_changes(latest, previous, &previous_shares);

    let mut sector_allocation: BTreeMap<String, f64> = BTreeMap::new();
    for holding in &top_holdings {
        let sector = reference
            .lookup(&holding.cusip)
            .and_then(|identity| identity.sector.clone())
            .unwrap_or_else(|| UNKNOWN_SECTOR.to_string());
        *sector_allocation.entry(sector).or_insert(0.0) += holding.portfolio_percentage;
    }

    let concentration = top_holdings
        .iter()
        .take(CONCENTRATION_HOLDINGS)
        .map(|h| h.portfolio_percentage)
        .sum();

    let quarterly_return = previous
        .map(|p| p.portfolio_value())
        .filter(|prev_value| *prev_value > 0.0)
        .map(|prev_value| (total_value - prev_value) / prev_value * 100.0);

    Some(PortfolioOverview {
        investor: investor.to_string(),
        latest_quarter: latest.quarter,
        previous_quarter: previous.map(|p| p.quarter),
        filing_date: latest.date.clone(),
        total_value,
        positions_count: latest.positions.len(),
        top_holdings,
        portfolio_changes,
        sector_allocation,
        performance_metrics: PerformanceMetrics {
            quarterly_return,
            avg_position_size: total_value / latest.positions.len().max(1) as f64,
            concentration,
        },
    })
}

fn quarterly_change(previous_shares: u64, current_shares: u64) -> QuarterlyChange {
    let shares_delta = share_delta(previous_shares, current_shares);
    let change_type = if previous_shares == 0 {
        ChangeType::New
    } else if shares_delta > 0 {
        ChangeType::Increased
    } else if shares_delta < 0 {
        ChangeType::Decreased
    } else {
        ChangeType::Unchanged
    };

    QuarterlyChange {
        change_type,
        shares_delta,
        percent_change: share_percent_change(previous_shares, current_shares),
    }
}

fn categorize_changes(
    latest: &Snapshot,
    previous: Option<&Snapshot>,
    previous_shares: &HashMap<&str, u64>,
) -> PortfolioChanges {
    let mut changes = PortfolioChanges::default();

    for pos in &latest.positions {
        let prev = previous_shares.get(pos.cusip.as_str()).copied().unwrap_or(0);
        let shares_delta = share_delta(prev, pos.shares);

        if prev == 0 {
            if pos.shares > 0 {
                changes.new_positions.push(pos.clone());
            }
        } else if shares_delta > 0 {
            changes.increased_positions.push(PositionDelta {
                position: pos.clone(),
                shares_delta,
                percent_change: share_percent_change(prev, pos.shares),
            });
        } else if shares_delta < 0 {
            changes.decreased_positions.push(PositionDelta {
                position: pos.clone(),
                shares_delta,
                percent_change: share_percent_change(prev, pos.shares),
            });
        }
    }

    if let Some(previous) = previous {
        changes.closed_positions = previous
            .positions
            .iter()
            .filter(|p| latest.position(&p.cusip).is_none())
            .map(|p| ClosedPosition {
                position: p.clone(),
                previous_value: p.value,
            })
            .collect();
    }

    changes
}

/// Portfolio value of the last `periods` snapshots with quarter-over-quarter return.
pub fn historical_values(snapshots: &[Snapshot], periods: usize) -> Vec<HistoricalValuePoint> {
    let start = snapshots.len().saturating_sub(periods);
    let recent = &snapshots[start..];

    recent
        .iter()
        .enumerate()
        .map(|(i, snapshot)| {
            let value = snapshot.portfolio_value();
            let quarterly_return = if i > 0 {
                let prev_value = recent[i - 1].portfolio_value();
                (prev_value > 0.0).then(|| (value - prev_value) / prev_value * 100.0)
            } else {
                None
            };

            HistoricalValuePoint {
                quarter: snapshot.quarter,
                value,
                quarterly_return,
            }
        })
        .collect()
}
