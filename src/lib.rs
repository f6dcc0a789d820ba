//! DCF Valuation - intrinsic per-share value from projected free cash flow
//!
//! This library provides:
//! - Free cash flow projection with constant or decaying growth
//! - Gordon-growth terminal value and year-end discounting
//! - WACC from CAPM inputs
//! - Buy/hold/sell classification against market price
//! - Parallel sensitivity sweeps over growth and discount rates
//! - A market data provider contract with CSV and TTL-cached implementations

pub mod error;
pub mod valuation;
pub mod sensitivity;
pub mod market;
pub mod config;
pub mod analysis;

// Re-export commonly used types
pub use error::{ConfigError, ProviderError, ValuationError};
pub use valuation::{
    classify, compute_wacc, EngineConfig, GrowthDecay, Recommendation, TerminalGrowthPolicy, ValuationEngine,
    ValuationInput, ValuationResult, WaccInput,
};
pub use sensitivity::{SensitivityGrid, SensitivityRunner};
pub use market::{CachedProvider, CsvMarketData, MarketDataProvider, MarketSnapshot};
pub use config::ModelParameters;
pub use analysis::{analyze, analyze_snapshot, ValuationReport};
