use async_trait::async_trait;
use thiserror::Error;

use crate::models::{HoldingsFile, Quarter};

#[derive(Debug, Error)]
pub enum HoldingsSourceError {
    #[error("io error: {0}")]
    Io(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("investor not found: {0}")]
    InvestorNotFound(String),
}

/// Where per-quarter 13F filings come from.
#[async_trait]
pub trait HoldingsSource: Send + Sync {
    async fn list_investors(&self) -> Result<Vec<String>, HoldingsSourceError>;

    /// Quarters available for `investor`, in no particular order
    async fn list_quarters(&self, investor: &str) -> Result<Vec<Quarter>, HoldingsSourceError>;

    /// `Ok(None)` when the investor has no filing for `quarter`
    async fn load_quarter(
        &self,
        investor: &str,
        quarter: Quarter,
    ) -> Result<Option<HoldingsFile>, HoldingsSourceError>;
}
