use std::path::PathBuf;
use std::str::FromStr;

use crate::models::ChangeThresholds;

/// One year; longer TTLs are rejected by `validate`.
pub const MAX_CACHE_TTL_MINUTES: i64 = 365 * 24 * 60;

#[derive(Debug, Clone)]
pub struct HoldingsConfig {
    pub holdings_data_path: PathBuf,
    pub reference_data_path: Option<PathBuf>,
    pub cache_ttl_minutes: i64,
    pub top_holdings_limit: usize,
    pub history_periods: usize,
    pub thresholds: ChangeThresholds,
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl HoldingsConfig {
    pub fn from_env() -> Self {
        let defaults = ChangeThresholds::default();
        Self {
            holdings_data_path: std::env::var("HOLDINGS_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data/holdings")),
            reference_data_path: std::env::var("REFERENCE_DATA_PATH").ok().map(PathBuf::from),
            cache_ttl_minutes: env_or("HOLDINGS_CACHE_TTL_MINUTES", 30),
            top_holdings_limit: env_or("TOP_HOLDINGS_LIMIT", 20),
            history_periods: env_or("HISTORY_PERIODS", 8),
            thresholds: ChangeThresholds {
                major_move_value: env_or("MAJOR_MOVE_THRESHOLD", defaults.major_move_value),
                significant_value: env_or("SIGNIFICANT_VALUE_THRESHOLD", defaults.significant_value),
                significant_percent: env_or("SIGNIFICANT_PERCENT_THRESHOLD", defaults.significant_percent),
            },
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.cache_ttl_minutes < 0 {
            return Err("HOLDINGS_CACHE_TTL_MINUTES must not be negative".to_string());
        }
        if self.cache_ttl_minutes > MAX_CACHE_TTL_MINUTES {
            return Err(format!(
                "HOLDINGS_CACHE_TTL_MINUTES must be at most {}",
                MAX_CACHE_TTL_MINUTES
            ));
        }
        if self.top_holdings_limit == 0 {
            return Err("TOP_HOLDINGS_LIMIT must be at least 1".to_string());
        }
        let t = &self.thresholds;
        if t.major_move_value < 0.0 || t.significant_value < 0.0 || t.significant_percent < 0.0 {
            return Err("change thresholds must not be negative".to_string());
        }
        Ok(())
    }
}

impl Default for HoldingsConfig {
    fn default() -> Self {
        Self {
            holdings_data_path: PathBuf::from("data/holdings"),
            reference_data_path: None,
            cache_ttl_minutes: 30,
            top_holdings_limit: 20,
            history_periods: 8,
            thresholds: ChangeThresholds::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(HoldingsConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_top_limit() {
        let config = HoldingsConfig {
            top_holdings_limit: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_negative_thresholds() {
        let mut config = HoldingsConfig::default();
        config.thresholds.significant_percent = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_caps_cache_ttl() {
        let mut config = HoldingsConfig {
            cache_ttl_minutes: MAX_CACHE_TTL_MINUTES,
            ..Default::default()
        };
        assert!(config.validate().is_ok());

        config.cache_ttl_minutes = i64::MAX;
        assert!(config.validate().is_err());
    }
}
