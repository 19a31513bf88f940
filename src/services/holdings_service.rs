use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::errors::AppError;
use crate::external::holdings_source::HoldingsSource;
use crate::models::{HoldingsFile, InvestorHistory, Quarter, Snapshot};
use crate::services::holdings_cache::HoldingsCache;
use crate::services::merge_service::merge_snapshot;

/// Which quarters exist for an investor, newest first.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AvailableData {
    pub investor: String,
    pub quarters: Vec<Quarter>,
    pub latest_quarter: Quarter,
    pub previous_quarter: Option<Quarter>,
}

/// Fetch one filing, going through the cache.
pub async fn load_file(
    source: &dyn HoldingsSource,
    cache: &HoldingsCache,
    investor: &str,
    quarter: Quarter,
) -> Result<Option<Arc<HoldingsFile>>, AppError> {
    if let Some(file) = cache.get(investor, quarter) {
        debug!("Cache hit for {} {}", investor, quarter);
        return Ok(Some(file));
    }

    match source.load_quarter(investor, quarter).await? {
        Some(file) => {
            let file = Arc::new(file);
            cache.insert(investor, quarter, file.clone());
            Ok(Some(file))
        }
        None => Ok(None),
    }
}

pub async fn available_investors(source: &dyn HoldingsSource) -> Result<Vec<AvailableData>, AppError> {
    let investors = source.list_investors().await?;
    let mut available = Vec::with_capacity(investors.len());

    for investor in investors {
        let mut quarters = match source.list_quarters(&investor).await {
            Ok(quarters) => quarters,
            Err(e) => {
                warn!("Skipping investor {}: {}", investor, e);
                continue;
            }
        };
        if quarters.is_empty() {
            continue;
        }

        quarters.sort_by(|a, b| b.cmp(a));
        quarters.dedup();
        available.push(AvailableData {
            latest_quarter: quarters[0],
            previous_quarter: quarters.get(1).copied(),
            investor,
            quarters,
        });
    }

    info!("Found holdings for {} investors", available.len());
    Ok(available)
}

/// All of an investor's filings, merged and ascending by quarter.
///
/// Files that fail to load are logged and left out of the history.
pub async fn load_investor_history(
    source: &dyn HoldingsSource,
    cache: &HoldingsCache,
    investor: &str,
) -> Result<InvestorHistory, AppError> {
    let quarters = source.list_quarters(investor).await?;

    let loads = quarters.iter().map(|&quarter| async move {
        (quarter, load_file(source, cache, investor, quarter).await)
    });

    let snapshots: Vec<Snapshot> = join_all(loads)
        .await
        .into_iter()
        .filter_map(|(quarter, result)| match result {
            Ok(Some(file)) => Some(merge_snapshot(quarter, &file)),
            Ok(None) => None,
            Err(e) => {
                warn!("Skipping {} {}: {}", investor, quarter, e);
                None
            }
        })
        .collect();

    debug!("Loaded {} snapshots for {}", snapshots.len(), investor);
    Ok(InvestorHistory::new(investor, snapshots))
}

/// The newest and second-newest snapshot, as `(current, previous)`.
pub async fn load_latest_two_quarters(
    source: &dyn HoldingsSource,
    cache: &HoldingsCache,
    investor: &str,
) -> Result<(Option<Snapshot>, Option<Snapshot>), AppError> {
    let mut quarters = source.list_quarters(investor).await?;
    quarters.sort_by(|a, b| b.cmp(a));
    quarters.dedup();

    let mut latest = Vec::with_capacity(2);
    for quarter in quarters.into_iter().take(2) {
        let snapshot = load_file(source, cache, investor, quarter)
            .await?
            .map(|file| merge_snapshot(quarter, &file));
        latest.push(snapshot);
    }

    let mut latest = latest.into_iter();
    let current = latest.next().flatten();
    let previous = latest.next().flatten();
    Ok((current, previous))
}

/// Every investor's snapshot for one quarter, keyed by investor.
pub async fn load_all_investors_for_quarter(
    source: &dyn HoldingsSource,
    cache: &HoldingsCache,
    quarter: Quarter,
) -> Result<BTreeMap<String, Snapshot>, AppError> {
    let investors = source.list_investors().await?;

    let loads = investors.iter().map(|investor| async move {
        (investor, load_file(source, cache, investor, quarter).await)
    });

    let mut results = BTreeMap::new();
    for (investor, result) in join_all(loads).await {
        match result {
            Ok(Some(file)) => {
                results.insert(investor.clone(), merge_snapshot(quarter, &file));
            }
            Ok(None) => {}
            Err(e) => warn!("Skipping {} {}: {}", investor, quarter, e),
        }
    }

    Ok(results)
}

/// Load every investor's history concurrently; one failure does not affect the rest.
pub async fn load_all_histories(
    source: &dyn HoldingsSource,
    cache: &HoldingsCache,
) -> Result<Vec<InvestorHistory>, AppError> {
    let investors = source.list_investors().await?;

    let loads = investors
        .iter()
        .map(|investor| load_investor_history(source, cache, investor));

    let histories: Vec<InvestorHistory> = join_all(loads)
        .await
        .into_iter()
        .zip(investors.iter())
        .filter_map(|(result, investor)| match result {
            Ok(history) if !history.snapshots.is_empty() => Some(history),
            Ok(_) => None,
            Err(e) => {
                warn!("Failed to load history for {}: {}", investor, e);
                None
            }
        })
        .collect();

    info!("Loaded histories for {} of {} investors", histories.len(), investors.len());
    Ok(histories)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::holdings_source::HoldingsSourceError;
    use crate::models::RawPosition;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct MockSource {
        files: HashMap<String, HashMap<Quarter, Result<HoldingsFile, String>>>,
        loads: AtomicUsize,
    }

    impl MockSource {
        fn with_file(mut self, investor: &str, quarter: &str, positions: Vec<RawPosition>) -> Self {
            let file = HoldingsFile {
                date: format!("{}-date", quarter),
                positions,
                ..Default::default()
            };
            self.files
                .entry(investor.to_string())
                .or_default()
                .insert(Quarter::parse(quarter).unwrap(), Ok(file));
            self
        }

        fn with_broken_file(mut self, investor: &str, quarter: &str) -> Self {
            self.files
                .entry(investor.to_string())
                .or_default()
                .insert(Quarter::parse(quarter).unwrap(), Err("unexpected token".to_string()));
            self
        }
    }

    #[async_trait]
    impl HoldingsSource for MockSource {
        async fn list_investors(&self) -> Result<Vec<String>, HoldingsSourceError> {
            let mut investors: Vec<String> = self.files.keys().cloned().collect();
            investors.sort();
            Ok(investors)
        }

        async fn list_quarters(&self, investor: &str) -> Result<Vec<Quarter>, HoldingsSourceError> {
            self.files
                .get(investor)
                .map(|files| files.keys().copied().collect())
                .ok_or_else(|| HoldingsSourceError::InvestorNotFound(investor.to_string()))
        }

        async fn load_quarter(
            &self,
            investor: &str,
            quarter: Quarter,
        ) -> Result<Option<HoldingsFile>, HoldingsSourceError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            match self.files.get(investor).and_then(|files| files.get(&quarter)) {
                Some(Ok(file)) => Ok(Some(file.clone())),
                Some(Err(msg)) => Err(HoldingsSourceError::Parse(msg.clone())),
                None => Ok(None),
            }
        }
    }

    fn source() -> MockSource {
        MockSource::default()
            .with_file("buffett", "2024-Q2", vec![RawPosition::new("037833100", "APPLE INC", 100, 1_000.0)])
            .with_file(
                "buffett",
                "2024-Q3",
                vec![
                    RawPosition::new("037833100", "APPLE INC", 60, 600.0),
                    RawPosition::new("037833100", "APPLE INC", 20, 200.0),
                ],
            )
            .with_file("buffett", "2023-Q4", vec![])
            .with_file("ackman", "2024-Q3", vec![RawPosition::new("X", "X CORP", 1, 1.0)])
    }

    #[tokio::test]
    async fn test_history_is_sorted_and_merged() {
        let source = source();
        let cache = HoldingsCache::default();

        let history = load_investor_history(&source, &cache, "buffett").await.unwrap();
        let quarters: Vec<String> = history.snapshots.iter().map(|s| s.quarter.to_string()).collect();

        assert_eq!(quarters, vec!["2023-Q4", "2024-Q2", "2024-Q3"]);
        let latest = history.latest().unwrap();
        assert_eq!(latest.positions.len(), 1);
        assert_eq!(latest.positions[0].shares, 80);
    }

    #[tokio::test]
    async fn test_cache_prevents_repeat_loads() {
        let source = source();
        let cache = HoldingsCache::default();

        load_investor_history(&source, &cache, "buffett").await.unwrap();
        load_investor_history(&source, &cache, "buffett").await.unwrap();

        assert_eq!(source.loads.load(Ordering::SeqCst), 3);
        assert_eq!(cache.len(), 3);
    }

    #[tokio::test]
    async fn test_broken_file_is_skipped() {
        let source = source().with_broken_file("buffett", "2024-Q4");
        let cache = HoldingsCache::default();

        let history = load_investor_history(&source, &cache, "buffett").await.unwrap();
        assert_eq!(history.snapshots.len(), 3);
        assert_eq!(history.latest().unwrap().quarter.to_string(), "2024-Q3");
    }

    #[tokio::test]
    async fn test_unknown_investor_is_not_found() {
        let source = source();
        let cache = HoldingsCache::default();

        let result = load_investor_history(&source, &cache, "nobody").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_available_investors_newest_first() {
        let available = available_investors(&source()).await.unwrap();
        let buffett = available.iter().find(|a| a.investor == "buffett").unwrap();

        assert_eq!(buffett.latest_quarter.to_string(), "2024-Q3");
        assert_eq!(buffett.previous_quarter.map(|q| q.to_string()), Some("2024-Q2".to_string()));
        assert_eq!(buffett.quarters.len(), 3);

        let ackman = available.iter().find(|a| a.investor == "ackman").unwrap();
        assert_eq!(ackman.previous_quarter, None);
    }

    #[tokio::test]
    async fn test_latest_two_quarters() {
        let source = source();
        let cache = HoldingsCache::default();

        let (current, previous) = load_latest_two_quarters(&source, &cache, "buffett").await.unwrap();
        assert_eq!(current.unwrap().quarter.to_string(), "2024-Q3");
        assert_eq!(previous.unwrap().quarter.to_string(), "2024-Q2");

        let (current, previous) = load_latest_two_quarters(&source, &cache, "ackman").await.unwrap();
        assert!(current.is_some());
        assert!(previous.is_none());
    }

    #[tokio::test]
    async fn test_all_investors_for_quarter() {
        let source = source();
        let cache = HoldingsCache::default();

        let q3 = load_all_investors_for_quarter(&source, &cache, Quarter::parse("2024-Q3").unwrap())
            .await
            .unwrap();
        assert_eq!(q3.len(), 2);

        let q2 = load_all_investors_for_quarter(&source, &cache, Quarter::parse("2024-Q2").unwrap())
            .await
            .unwrap();
        assert_eq!(q2.keys().cloned().collect::<Vec<_>>(), vec!["buffett".to_string()]);
    }

    #[tokio::test]
    async fn test_all_histories() {
        let source = source();
        let cache = HoldingsCache::default();

        let histories = load_all_histories(&source, &cache).await.unwrap();
        assert_eq!(histories.len(), 2);
        assert_eq!(histories[0].investor, "ackman");
    }
}
