pub mod holdings_source;
pub mod filesystem;
