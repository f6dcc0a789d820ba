//! DCF valuation engine
//!
//! Projects free cash flow over an explicit horizon, adds a Gordon-growth
//! terminal value, discounts both to present value and derives a per-share
//! intrinsic value. Every operation is a pure function of its inputs.

mod input;
mod growth;
mod wacc;
mod engine;
mod result;
mod recommendation;

pub use input::ValuationInput;
pub use growth::{GrowthDecay, DEFAULT_DECAY_RATE};
pub use wacc::{
    compute_wacc, WaccInput, DEFAULT_COST_OF_DEBT, DEFAULT_DEBT_TO_EQUITY, DEFAULT_MARKET_RETURN,
    DEFAULT_RISK_FREE_RATE, DEFAULT_TAX_RATE,
};
pub use engine::{
    EngineConfig, TerminalGrowthPolicy, ValuationEngine, MAX_PROJECTION_YEARS,
    TERMINAL_GROWTH_CLAMP_GAP,
};
pub use result::{ScheduleRow, ValuationResult, ValueBreakdown};
pub use recommendation::{classify, PriceGap, Recommendation};
