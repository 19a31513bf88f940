use std::collections::{BTreeSet, HashMap};

use tracing::info;

use crate::models::{
    ChangeSummary, ChangeThresholds, MergedPosition, PortfolioAnalysis, PortfolioChange,
    PortfolioChangeType, SecurityReference, Snapshot,
};
use crate::services::identity_service::resolve_merged_identity;
use crate::services::ownership_service::share_delta;

/// Percent change in share count, 0 when there was no prior baseline.
pub fn share_percent_change(previous_shares: u64, current_shares: u64) -> f64 {
    if previous_shares == 0 {
        return if current_shares > 0 { 100.0 } else { 0.0 };
    }
    (current_shares as f64 - previous_shares as f64) / previous_shares as f64 * 100.0
}

/// Compare two merged filings of one investor over the union of their CUSIPs.
pub fn detect_portfolio_changes(
    previous: &Snapshot,
    current: &Snapshot,
    investor: &str,
    reference: &SecurityReference,
    thresholds: &ChangeThresholds,
) -> PortfolioAnalysis {
    let previous_map: HashMap<&str, &MergedPosition> =
        previous.positions.iter().map(|p| (p.cusip.as_str(), p)).collect();
    let current_map: HashMap<&str, &MergedPosition> =
        current.positions.iter().map(|p| (p.cusip.as_str(), p)).collect();

    // BTreeSet keeps the pre-sort order deterministic
    let all_cusips: BTreeSet<&str> = previous_map.keys().chain(current_map.keys()).copied().collect();

    let mut changes: Vec<PortfolioChange> = all_cusips
        .into_iter()
        .filter_map(|cusip| {
            classify(
                previous_map.get(cusip).copied(),
                current_map.get(cusip).copied(),
                reference,
                thresholds,
            )
        })
        .collect();

    changes.sort_by(|a, b| {
        b.is_major_move
            .cmp(&a.is_major_move)
            .then_with(|| b.value_change.abs().total_cmp(&a.value_change.abs()))
    });

    let count = |t: PortfolioChangeType| changes.iter().filter(|c| c.change_type == t).count();
    let portfolio_value_previous = previous.portfolio_value();
    let portfolio_value_current = current.portfolio_value();

    let summary = ChangeSummary {
        new_positions: count(PortfolioChangeType::NewPosition),
        sold_positions: count(PortfolioChangeType::Sold),
        increased_positions: count(PortfolioChangeType::Increased),
        decreased_positions: count(PortfolioChangeType::Decreased),
        major_moves: changes.iter().filter(|c| c.is_major_move).count(),
        total_value_change: portfolio_value_current - portfolio_value_previous,
        portfolio_value_previous,
        portfolio_value_current,
    };

    info!(
        "{}: {} -> {}: {} new, {} sold, {} increased, {} decreased",
        investor,
        previous.quarter,
        current.quarter,
        summary.new_positions,
        summary.sold_positions,
        summary.increased_positions,
        summary.decreased_positions
    );

    PortfolioAnalysis {
        investor: investor.to_string(),
        previous_quarter: previous.quarter,
        current_quarter: current.quarter,
        changes,
        summary,
    }
}

fn classify(
    previous: Option<&MergedPosition>,
    current: Option<&MergedPosition>,
    reference: &SecurityReference,
    thresholds: &ChangeThresholds,
) -> Option<PortfolioChange> {
    match (previous, current) {
        (None, Some(cur)) => Some(build_change(
            PortfolioChangeType::NewPosition,
            cur,
            0,
            cur.shares,
            0.0,
            cur.value,
            100.0,
            cur.value > thresholds.major_move_value,
            cur.value > thresholds.significant_value,
            reference,
        )),
        (Some(prev), None) => Some(build_change(
            PortfolioChangeType::Sold,
            prev,
            prev.shares,
            0,
            prev.value,
            0.0,
            -100.0,
            prev.value.abs() > thresholds.major_move_value,
            prev.value.abs() > thresholds.significant_value,
            reference,
        )),
        (Some(prev), Some(cur)) => {
            let share_change = share_delta(prev.shares, cur.shares);
            let value_change = cur.value - prev.value;
            let percent_change = if prev.shares == 0 {
                0.0
            } else {
                share_percent_change(prev.shares, cur.shares)
            };

            let change_type = match share_change {
                d if d > 0 => PortfolioChangeType::Increased,
                d if d < 0 => PortfolioChangeType::Decreased,
                _ => PortfolioChangeType::Unchanged,
            };
            let is_major_move = value_change.abs() > thresholds.major_move_value;
            let is_significant = percent_change.abs() > thresholds.significant_percent
                || value_change.abs() > thresholds.significant_value;

            if change_type == PortfolioChangeType::Unchanged && !is_major_move && !is_significant {
                return None;
            }

            Some(build_change(
                change_type,
                cur,
                prev.shares,
                cur.shares,
                prev.value,
                cur.value,
                percent_change,
                is_major_move,
                is_significant,
                reference,
            ))
        }
        (None, None) => None,
    }
}

#[allow(clippy::too_many_arguments)]
fn build_change(
    change_type: PortfolioChangeType,
    position: &MergedPosition,
    previous_shares: u64,
    current_shares: u64,
    previous_value: f64,
    current_value: f64,
    percent_change: f64,
    is_major_move: bool,
    is_significant: bool,
    reference: &SecurityReference,
) -> PortfolioChange {
    let identity = resolve_merged_identity(position, reference);
    PortfolioChange {
        change_type,
        cusip: position.cusip.clone(),
        name: identity.display_name,
        ticker: identity.ticker,
        previous_shares,
        current_shares,
        previous_value,
        current_value,
        share_change: share_delta(previous_shares, current_shares),
        value_change: current_value - previous_value,
        percent_change,
        is_major_move,
        is_significant,
    }
}
