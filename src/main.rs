use anyhow::Context;
use serde_json::json;

use rustfolio_holdings::config::HoldingsConfig;
use rustfolio_holdings::errors::AppError;
use rustfolio_holdings::logging::{init_logging, LoggingConfig};
use rustfolio_holdings::services::{
    change_detection_service, holdings_service, identity_service, ownership_service,
    portfolio_summary_service,
};
use rustfolio_holdings::state::AppState;

/// Usage:
///   rustfolio-holdings                    list investors and their quarters
///   rustfolio-holdings <investor>         portfolio overview and latest changes
///   rustfolio-holdings <investor> <cusip> ownership timeline for one security
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    init_logging(LoggingConfig::from_env())?;

    let config = HoldingsConfig::from_env();
    config.validate()?;
    tracing::info!("📂 Reading holdings from {}", config.holdings_data_path.display());

    let state = AppState::from_config(config).await?;
    let args: Vec<String> = std::env::args().skip(1).collect();

    let report = match args.as_slice() {
        [] => list_investors(&state).await?,
        [investor] => investor_report(&state, investor).await?,
        [investor, cusip] => ownership_report(&state, investor, cusip).await?,
        _ => return Err("usage: rustfolio-holdings [<investor> [<cusip>]]".into()),
    };

    let output = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
    println!("{}", output);
    Ok(())
}

async fn list_investors(state: &AppState) -> Result<serde_json::Value, AppError> {
    let available = holdings_service::available_investors(state.source.as_ref()).await?;
    Ok(json!({ "investors": available }))
}

async fn investor_report(state: &AppState, investor: &str) -> Result<serde_json::Value, AppError> {
    let history = holdings_service::load_investor_history(state.source.as_ref(), &state.cache, investor).await?;

    let overview = portfolio_summary_service::portfolio_overview(
        investor,
        &history.snapshots,
        &state.reference,
        state.config.top_holdings_limit,
    )
    .ok_or_else(|| AppError::NotFound(format!("holdings for {}", investor)))?;

    let analysis = match (history.previous(), history.latest()) {
        (Some(previous), Some(latest)) => Some(change_detection_service::detect_portfolio_changes(
            previous,
            latest,
            investor,
            &state.reference,
            &state.config.thresholds,
        )),
        _ => None,
    };

    let performance =
        portfolio_summary_service::historical_values(&history.snapshots, state.config.history_periods);

    Ok(json!({
        "overview": overview,
        "analysis": analysis,
        "performanceHistory": performance,
    }))
}

async fn ownership_report(state: &AppState, investor: &str, cusip: &str) -> Result<serde_json::Value, AppError> {
    let history = holdings_service::load_investor_history(state.source.as_ref(), &state.cache, investor).await?;

    let company = identity_service::get_all_companies(&history.snapshots, &state.reference)
        .into_iter()
        .find(|c| c.cusip == cusip)
        .ok_or_else(|| AppError::NotFound(format!("CUSIP {} in holdings of {}", cusip, investor)))?;

    let timeline = ownership_service::ownership_timeline(&history.snapshots, cusip);

    Ok(json!({
        "company": company,
        "timeline": timeline,
    }))
}
