use thiserror::Error;

use crate::external::holdings_source::HoldingsSourceError;
use crate::models::InvalidQuarter;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Holdings source error: {0}")]
    Source(HoldingsSourceError),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<HoldingsSourceError> for AppError {
    fn from(value: HoldingsSourceError) -> Self {
        match value {
            HoldingsSourceError::InvestorNotFound(investor) => {
                AppError::NotFound(format!("investor {}", investor))
            }
            other => AppError::Source(other),
        }
    }
}

impl From<InvalidQuarter> for AppError {
    fn from(value: InvalidQuarter) -> Self {
        AppError::Validation(value.to_string())
    }
}

impl From<String> for AppError {
    fn from(value: String) -> Self {
        AppError::Validation(value)
    }
}
