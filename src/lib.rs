pub mod config;
pub mod errors;
pub mod external;
pub mod logging;
pub mod models;
pub mod services;
pub mod state;

pub use services::identity_service::{get_all_companies, resolve_identity, resolve_ticker, clean_company_name};
pub use services::merge_service::{merge_positions, merge_positions_with_report, merge_snapshot};
pub use services::ownership_service::{
    calculate_ownership_changes, calculate_portfolio_percentage, generate_ownership_history, ownership_timeline,
};
