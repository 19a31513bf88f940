use serde::{Deserialize, Deserializer, Serialize};

/// One line-item from an institutional filing, exactly as ingested.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawPosition {
    pub cusip: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_shares")]
    pub shares: u64,
    #[serde(default, deserialize_with = "deserialize_value")]
    pub value: f64,
    #[serde(default, deserialize_with = "deserialize_ticker")]
    pub ticker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_of_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub put_call: Option<String>,
}

impl RawPosition {
    pub fn new(cusip: impl Into<String>, name: impl Into<String>, shares: u64, value: f64) -> Self {
        Self {
            cusip: cusip.into(),
            name: name.into(),
            shares,
            value: value.max(0.0),
            ticker: None,
            title_of_class: None,
            put_call: None,
        }
    }

    pub fn with_ticker(mut self, ticker: impl Into<String>) -> Self {
        let ticker = ticker.into();
        self.ticker = if ticker.trim().is_empty() { None } else { Some(ticker) };
        self
    }
}

/// All raw line-items for one CUSIP within one snapshot, summed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MergedPosition {
    pub cusip: String,
    pub name: String,
    pub shares: u64,
    pub value: f64,
    pub ticker: Option<String>,
}

impl From<&RawPosition> for MergedPosition {
    fn from(raw: &RawPosition) -> Self {
        Self {
            cusip: raw.cusip.clone(),
            name: raw.name.clone(),
            shares: raw.shares,
            value: raw.value,
            ticker: raw.ticker.clone(),
        }
    }
}

// Upstream files occasionally carry fractional or negative share counts;
// round and clamp so `shares >= 0` holds after ingestion.
fn deserialize_shares<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let raw = Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0);
    if !raw.is_finite() || raw <= 0.0 {
        return Ok(0);
    }
    Ok(raw.round() as u64)
}

fn deserialize_value<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let raw = Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0);
    Ok(if raw.is_finite() { raw.max(0.0) } else { 0.0 })
}

fn deserialize_ticker<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty()))
}
