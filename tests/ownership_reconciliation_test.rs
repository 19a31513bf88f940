/// Holdings Reconciliation Tests
///
/// End-to-end checks of identity resolution, position merging and the
/// quarter-over-quarter ownership diff, driven through the public API the
/// way a presentation layer would call it.

use rustfolio_holdings::models::{
    ChangeThresholds, ChangeType, HoldingsFile, MergedPosition, Quarter, RawPosition, SecurityIdentity,
    SecurityReference, Snapshot,
};
use rustfolio_holdings::services::change_detection_service::detect_portfolio_changes;
use rustfolio_holdings::services::formatting::format_change;
use rustfolio_holdings::{
    calculate_ownership_changes, generate_ownership_history, get_all_companies, merge_positions,
    merge_snapshot, ownership_timeline, resolve_identity, resolve_ticker,
};

fn q(label: &str) -> Quarter {
    Quarter::parse(label).unwrap()
}

fn filing(quarter: &str, positions: Vec<RawPosition>) -> Snapshot {
    let file = HoldingsFile {
        date: "2024-11-14".to_string(),
        positions,
        ..Default::default()
    };
    merge_snapshot(q(quarter), &file)
}

// ---------------------------------------------------------------------------
// Worked scenarios
// ---------------------------------------------------------------------------

#[cfg(test)]
mod scenarios {
    use super::*;

    #[test]
    fn test_duplicate_rows_merge_into_one_position() {
        let raw = vec![
            RawPosition::new("037833100", "APPLE INC", 100, 18_000.0),
            RawPosition::new("037833100", "APPLE INC", 50, 9_000.0),
        ];
        let merged = merge_positions(&raw);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].cusip, "037833100");
        assert_eq!(merged[0].shares, 150);
        assert_eq!(merged[0].value, 27_000.0);
    }

    #[test]
    fn test_held_then_sold_then_rebought() {
        let other = || RawPosition::new("594918104", "MICROSOFT CORP", 10, 5_000.0);
        let snapshots = vec![
            filing("2024-Q1", vec![RawPosition::new("037833100", "APPLE INC", 100, 5_000.0), other()]),
            filing("2024-Q2", vec![other()]),
            filing("2024-Q3", vec![RawPosition::new("037833100", "APPLE INC", 80, 5_000.0), other()]),
        ];

        let history = generate_ownership_history(&snapshots, "037833100");
        let summary: Vec<(bool, u64)> = history.iter().map(|p| (p.exists, p.shares)).collect();
        assert_eq!(summary, vec![(true, 100), (false, 0), (true, 80)]);

        let q1_q2 = calculate_ownership_changes(&history[1], Some(&history[0]));
        assert!(q1_q2.is_sold);
        assert_eq!(q1_q2.change_type(), ChangeType::Sold);

        let q2_q3 = calculate_ownership_changes(&history[2], Some(&history[1]));
        assert!(q2_q3.is_new);
        assert_eq!(format_change(&q2_q3), "+80 shares (new)");
    }

    #[test]
    fn test_ticker_prefix_is_stripped_from_name() {
        let pos = RawPosition::new("037833100", "AAPL - Apple Inc", 1, 1.0).with_ticker("AAPL");
        let identity = resolve_identity(&pos, &SecurityReference::default());

        assert_eq!(identity.ticker, "AAPL");
        assert_eq!(identity.display_name, "Apple Inc");
    }

    #[test]
    fn test_unknown_cusip_falls_back_to_stripped_cusip() {
        let padded = RawPosition::new("084670200", "BERKSHIRE HATHAWAY", 1, 1.0);
        let identity = resolve_identity(&padded, &SecurityReference::default());
        assert_eq!(identity.ticker, "0846702");
        assert_eq!(identity.display_name, "BERKSHIRE HATHAWAY");

        let unpadded = RawPosition::new("084670207", "BERKSHIRE HATHAWAY", 1, 1.0);
        assert_eq!(resolve_identity(&unpadded, &SecurityReference::default()).ticker, "084670207");
    }

    #[test]
    fn test_zero_value_snapshot_has_zero_percentages() {
        let snapshots = vec![filing(
            "2024-Q3",
            vec![
                RawPosition::new("A", "Alpha", 10, 0.0),
                RawPosition::new("B", "Bravo", 20, 0.0),
            ],
        )];

        for cusip in ["A", "B"] {
            let history = generate_ownership_history(&snapshots, cusip);
            assert!(history[0].exists);
            assert_eq!(history[0].portfolio_percentage, 0.0);
        }
    }
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

#[cfg(test)]
mod properties {
    use super::*;

    fn sample_rows() -> Vec<RawPosition> {
        vec![
            RawPosition::new("A", "Alpha", 10, 100.0),
            RawPosition::new("B", "Bravo", 3, 30.5),
            RawPosition::new("A", "Alpha", 7, 70.0),
            RawPosition::new("C", "Charlie", 0, 0.0),
            RawPosition::new("B", "Bravo", 2, 19.5),
            RawPosition::new("A", "Alpha", 1, 10.0),
        ]
    }

    #[test]
    fn test_merge_conserves_shares_and_value_per_cusip() {
        let raw = sample_rows();
        let merged = merge_positions(&raw);

        for position in &merged {
            let shares: u64 = raw.iter().filter(|r| r.cusip == position.cusip).map(|r| r.shares).sum();
            let value: f64 = raw.iter().filter(|r| r.cusip == position.cusip).map(|r| r.value).sum();
            assert_eq!(position.shares, shares);
            assert_eq!(position.value, value);
        }

        let mut input_cusips: Vec<&str> = raw.iter().map(|r| r.cusip.as_str()).collect();
        input_cusips.sort();
        input_cusips.dedup();
        let mut output_cusips: Vec<&str> = merged.iter().map(|m| m.cusip.as_str()).collect();
        output_cusips.sort();
        assert_eq!(input_cusips, output_cusips);
        assert!(merged.len() <= raw.len());
    }

    #[test]
    fn test_merge_of_merged_rows_is_identity() {
        let merged = merge_positions(&sample_rows());
        let again: Vec<RawPosition> = merged
            .iter()
            .map(|m| RawPosition::new(m.cusip.clone(), m.name.clone(), m.shares, m.value))
            .collect();

        assert_eq!(merge_positions(&again), merged);
    }

    #[test]
    fn test_percentages_stay_within_bounds() {
        let snapshots = vec![
            filing("2024-Q1", sample_rows()),
            filing("2024-Q2", vec![RawPosition::new("A", "Alpha", 1, 1.0)]),
        ];

        for cusip in ["A", "B", "C", "MISSING"] {
            for point in generate_ownership_history(&snapshots, cusip) {
                assert!(point.portfolio_percentage >= 0.0);
                assert!(point.portfolio_percentage <= 100.0);
            }
        }
    }

    #[test]
    fn test_new_and_sold_never_both_set() {
        let snapshots = vec![
            filing("2023-Q3", vec![]),
            filing("2023-Q4", vec![RawPosition::new("A", "Alpha", 5, 5.0)]),
            filing("2024-Q1", vec![]),
            filing("2024-Q2", vec![]),
            filing("2024-Q3", vec![RawPosition::new("A", "Alpha", 9, 9.0)]),
            filing("2024-Q4", vec![RawPosition::new("A", "Alpha", 2, 2.0)]),
        ];

        for entry in ownership_timeline(&snapshots, "A") {
            assert!(!(entry.change.is_new && entry.change.is_sold));
        }
    }

    #[test]
    fn test_explicit_ticker_ignores_reference_table() {
        let reference = SecurityReference::new(vec![SecurityIdentity {
            cusip: "037833100".to_string(),
            ticker: Some("NOTAAPL".to_string()),
            name: "Something Else".to_string(),
            sector: None,
        }]);

        assert_eq!(resolve_ticker("037833100", Some("AAPL"), &reference), "AAPL");
        assert_eq!(resolve_ticker("037833100", None, &reference), "NOTAAPL");
    }
}

// ---------------------------------------------------------------------------
// Company universe and change detection
// ---------------------------------------------------------------------------

#[cfg(test)]
mod portfolio_views {
    use super::*;

    #[test]
    fn test_company_universe_spans_all_snapshots() {
        let snapshots = vec![
            filing("2024-Q1", vec![RawPosition::new("037833100", "APPLE INC", 1, 1.0)]),
            filing(
                "2024-Q2",
                vec![
                    RawPosition::new("037833100", "APPLE INC", 1, 1.0),
                    RawPosition::new("88160R101", "TSLA - Tesla Inc", 1, 1.0).with_ticker("TSLA"),
                ],
            ),
        ];
        let reference = SecurityReference::new(vec![SecurityIdentity {
            cusip: "037833100".to_string(),
            ticker: Some("AAPL".to_string()),
            name: "Apple Inc".to_string(),
            sector: None,
        }]);

        let companies = get_all_companies(&snapshots, &reference);
        let tickers: Vec<&str> = companies.iter().map(|c| c.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["AAPL", "TSLA"]);
        assert_eq!(companies[1].display_name, "TSLA - Tesla Inc");
    }

    #[test]
    fn test_change_detection_uses_merged_positions() {
        let previous = filing("2024-Q2", vec![RawPosition::new("A", "Alpha", 100, 1_000.0)]);
        let current = filing(
            "2024-Q3",
            vec![
                RawPosition::new("A", "Alpha", 60, 600.0),
                RawPosition::new("A", "Alpha", 60, 600.0),
            ],
        );

        let analysis = detect_portfolio_changes(
            &previous,
            &current,
            "investor",
            &SecurityReference::default(),
            &ChangeThresholds::default(),
        );

        assert_eq!(analysis.changes.len(), 1);
        assert_eq!(analysis.changes[0].share_change, 20);
        assert_eq!(analysis.changes[0].percent_change, 20.0);
        assert_eq!(analysis.summary.increased_positions, 1);
    }

    #[test]
    fn test_snapshot_positions_are_unique_per_cusip() {
        let snapshot = filing(
            "2024-Q3",
            vec![
                RawPosition::new("A", "Alpha", 1, 1.0),
                RawPosition::new("A", "Alpha", 1, 1.0),
                RawPosition::new("B", "Bravo", 1, 1.0),
            ],
        );
        let cusips: Vec<&MergedPosition> = snapshot.positions.iter().collect();
        assert_eq!(cusips.len(), 2);
    }
}
