pub mod identity_service;
pub mod merge_service;
pub mod ownership_service;
pub mod change_detection_service;
pub mod portfolio_summary_service;
pub mod formatting;
pub mod holdings_cache;
pub mod holdings_service;
