use std::sync::Arc;

use anyhow::Context;
use chrono::Duration;

use crate::config::HoldingsConfig;
use crate::external::filesystem::{load_reference_table, FileSystemSource};
use crate::external::holdings_source::HoldingsSource;
use crate::models::SecurityReference;
use crate::services::holdings_cache::HoldingsCache;

#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn HoldingsSource>,
    pub cache: HoldingsCache,
    pub reference: Arc<SecurityReference>,
    pub config: HoldingsConfig,
}

impl AppState {
    pub async fn from_config(config: HoldingsConfig) -> anyhow::Result<Self> {
        let reference = match &config.reference_data_path {
            Some(path) => load_reference_table(path).await?,
            None => SecurityReference::default(),
        };
        tracing::info!("Loaded {} reference securities", reference.len());

        let ttl = Duration::try_minutes(config.cache_ttl_minutes).with_context(|| {
            format!("Cache TTL of {} minutes is out of range", config.cache_ttl_minutes)
        })?;

        Ok(Self {
            source: Arc::new(FileSystemSource::new(config.holdings_data_path.clone())),
            cache: HoldingsCache::new(ttl),
            reference: Arc::new(reference),
            config,
        })
    }
}
