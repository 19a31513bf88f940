use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Reference data for one security, keyed by CUSIP.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SecurityIdentity {
    pub cusip: String,
    #[serde(default)]
    pub ticker: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sector: Option<String>,
}

/// CUSIP-keyed reference table, loaded once from static data.
#[derive(Debug, Clone, Default)]
pub struct SecurityReference {
    by_cusip: HashMap<String, SecurityIdentity>,
}

impl SecurityReference {
    pub fn new(entries: Vec<SecurityIdentity>) -> Self {
        let mut by_cusip = HashMap::with_capacity(entries.len());
        for entry in entries {
            // Earlier entries win, matching a linear `find` over the list
            by_cusip.entry(entry.cusip.clone()).or_insert(entry);
        }
        Self { by_cusip }
    }

    pub fn lookup(&self, cusip: &str) -> Option<&SecurityIdentity> {
        self.by_cusip.get(cusip)
    }

    pub fn len(&self) -> usize {
        self.by_cusip.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_cusip.is_empty()
    }
}

/// Output of identity resolution for one position.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedIdentity {
    pub ticker: String,
    pub display_name: String,
}

/// One entry in the universe of securities an investor ever held.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CompanyInfo {
    pub cusip: String,
    pub ticker: String,
    pub name: String,
    pub display_name: String,
}
