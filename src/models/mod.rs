mod quarter;
mod security;
mod position;
mod snapshot;
mod ownership;
mod portfolio_change;
mod portfolio_summary;

pub use quarter::{Quarter, InvalidQuarter};
pub use security::{SecurityIdentity, SecurityReference, ResolvedIdentity, CompanyInfo};
pub use position::{RawPosition, MergedPosition};
pub use snapshot::{HoldingsFile, Snapshot, InvestorHistory};
pub use ownership::{OwnershipHistoryPoint, OwnershipChange, OwnershipTimelineEntry, ChangeType};
pub use portfolio_change::{
    PortfolioChangeType, PortfolioChange, ChangeSummary, PortfolioAnalysis, ChangeThresholds,
};
pub use portfolio_summary::{
    QuarterlyChange, TopHolding, PositionDelta, ClosedPosition, PortfolioChanges,
    PerformanceMetrics, PortfolioOverview, HistoricalValuePoint,
};
