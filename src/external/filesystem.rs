use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::external::holdings_source::{HoldingsSource, HoldingsSourceError};
use crate::models::{HoldingsFile, Quarter, SecurityIdentity, SecurityReference};

/// Reads filings laid out as `<root>/<investor>/<YYYY-Qn>.json`.
#[derive(Debug, Clone)]
pub struct FileSystemSource {
    root: PathBuf,
}

impl FileSystemSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn quarter_path(&self, investor: &str, quarter: Quarter) -> PathBuf {
        self.root.join(investor).join(format!("{}.json", quarter))
    }
}

#[async_trait]
impl HoldingsSource for FileSystemSource {
    async fn list_investors(&self) -> Result<Vec<String>, HoldingsSourceError> {
        let mut entries = tokio::fs::read_dir(&self.root)
            .await
            .map_err(|e| HoldingsSourceError::Io(format!("{}: {}", self.root.display(), e)))?;

        let mut investors = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| HoldingsSourceError::Io(e.to_string()))?
        {
            let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
            if !is_dir {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if !name.starts_with('.') && name != "node_modules" {
                    investors.push(name.to_string());
                }
            }
        }

        investors.sort();
        Ok(investors)
    }

    async fn list_quarters(&self, investor: &str) -> Result<Vec<Quarter>, HoldingsSourceError> {
        let dir = self.root.join(investor);
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(HoldingsSourceError::InvestorNotFound(investor.to_string()));
            }
            Err(e) => return Err(HoldingsSourceError::Io(format!("{}: {}", dir.display(), e))),
        };

        let mut quarters = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| HoldingsSourceError::Io(e.to_string()))?
        {
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else { continue };
            let Some(stem) = name.strip_suffix(".json") else { continue };

            // load_quarter rebuilds the path from the label, so the name must match it exactly
            match Quarter::parse(stem) {
                Ok(quarter) if quarter.to_string() == stem => quarters.push(quarter),
                Ok(_) => warn!("Skipping {}/{}: not a canonical quarter file name", investor, name),
                Err(e) => warn!("Skipping {}/{}: {}", investor, name, e),
            }
        }

        debug!("{}: {} quarter files found", investor, quarters.len());
        Ok(quarters)
    }

    async fn load_quarter(
        &self,
        investor: &str,
        quarter: Quarter,
    ) -> Result<Option<HoldingsFile>, HoldingsSourceError> {
        let path = self.quarter_path(investor, quarter);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(HoldingsSourceError::Io(format!("{}: {}", path.display(), e))),
        };

        serde_json::from_str::<HoldingsFile>(&content)
            .map(Some)
            .map_err(|e| HoldingsSourceError::Parse(format!("{}: {}", path.display(), e)))
    }
}

/// Load the CUSIP reference table from a JSON array of securities.
///
/// A missing file is not an error: identity resolution falls back to
/// explicit tickers and CUSIP-derived pseudo-tickers.
pub async fn load_reference_table(path: &Path) -> Result<SecurityReference> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!("Reference table {} not found, continuing without it", path.display());
            return Ok(SecurityReference::default());
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read reference table: {}", path.display()));
        }
    };

    let entries: Vec<SecurityIdentity> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse reference table: {}", path.display()))?;

    Ok(SecurityReference::new(entries))
}
