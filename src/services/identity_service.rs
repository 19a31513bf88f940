use std::collections::HashMap;

use crate::models::{CompanyInfo, MergedPosition, RawPosition, ResolvedIdentity, SecurityReference, Snapshot};

/// Separators seen between a ticker prefix and the company name.
/// Upstream feeds use both a plain hyphen and an en dash.
const NAME_SEPARATORS: [&str; 2] = [" - ", " \u{2013} "];

/// Derive a pseudo-ticker from a CUSIP by dropping trailing `0`s.
///
/// A CUSIP made only of zeros would strip to nothing, so it is returned as-is.
pub fn fallback_ticker(cusip: &str) -> String {
    let stripped = cusip.trim_end_matches('0');
    if stripped.is_empty() {
        cusip.to_string()
    } else {
        stripped.to_string()
    }
}

/// Resolve a ticker: explicit ticker, then reference table, then CUSIP fallback.
pub fn resolve_ticker(cusip: &str, ticker: Option<&str>, reference: &SecurityReference) -> String {
    if let Some(t) = ticker.map(str::trim).filter(|t| !t.is_empty()) {
        return t.to_string();
    }

    if let Some(t) = reference
        .lookup(cusip)
        .and_then(|identity| identity.ticker.as_deref())
        .map(str::trim)
        .filter(|t| !t.is_empty())
    {
        return t.to_string();
    }

    fallback_ticker(cusip)
}

/// Strip a redundant `"{ticker} - "` prefix from a filing name.
pub fn clean_company_name(name: &str, ticker: &str) -> String {
    let name = name.trim();
    if name.is_empty() {
        return ticker.to_string();
    }
    if ticker.is_empty() || name == ticker {
        return name.to_string();
    }

    for separator in NAME_SEPARATORS {
        let prefix = format!("{}{}", ticker, separator);
        if let Some(rest) = name.strip_prefix(prefix.as_str()) {
            return rest.to_string();
        }
    }

    name.to_string()
}

pub fn resolve_identity(position: &RawPosition, reference: &SecurityReference) -> ResolvedIdentity {
    resolve_parts(&position.cusip, position.ticker.as_deref(), &position.name, reference)
}

pub fn resolve_merged_identity(position: &MergedPosition, reference: &SecurityReference) -> ResolvedIdentity {
    resolve_parts(&position.cusip, position.ticker.as_deref(), &position.name, reference)
}

fn resolve_parts(
    cusip: &str,
    ticker: Option<&str>,
    name: &str,
    reference: &SecurityReference,
) -> ResolvedIdentity {
    let ticker = resolve_ticker(cusip, ticker, reference);
    let display_name = clean_company_name(name, &ticker);
    ResolvedIdentity { ticker, display_name }
}

/// The de-duplicated universe of securities held across `snapshots`.
///
/// The first snapshot that mentions a CUSIP decides its identity. Output is
/// sorted by ticker, case-insensitively.
pub fn get_all_companies(snapshots: &[Snapshot], reference: &SecurityReference) -> Vec<CompanyInfo> {
    let mut seen: HashMap<&str, ResolvedIdentity> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();

    for snapshot in snapshots {
        for position in &snapshot.positions {
            if seen.contains_key(position.cusip.as_str()) {
                continue;
            }
            seen.insert(&position.cusip, resolve_merged_identity(position, reference));
            order.push(&position.cusip);
        }
    }

    let mut companies: Vec<CompanyInfo> = order
        .into_iter()
        .filter_map(|cusip| {
            seen.remove(cusip).map(|identity| {
                let display_name = if identity.ticker != identity.display_name {
                    format!("{} - {}", identity.ticker, identity.display_name)
                } else {
                    identity.display_name.clone()
                };
                CompanyInfo {
                    cusip: cusip.to_string(),
                    ticker: identity.ticker,
                    name: identity.display_name,
                    display_name,
                }
            })
        })
        .collect();

    companies.sort_by(|a, b| {
        a.ticker
            .to_lowercase()
            .cmp(&b.ticker.to_lowercase())
            .then_with(|| a.ticker.cmp(&b.ticker))
    });
    companies
}
