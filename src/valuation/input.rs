//! Valuation inputs

use serde::{Deserialize, Serialize};

/// Financial parameters for a single DCF valuation
///
/// Rates are fractional (0.05 = 5%). Constructed by value and never mutated by
/// the engine; preconditions are checked by [`ValuationEngine::value`].
///
/// [`ValuationEngine::value`]: super::ValuationEngine::value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValuationInput {
    /// Most recent free cash flow (currency units)
    pub base_fcf: f64,

    /// Initial annual growth rate of free cash flow
    pub growth_rate: f64,

    /// Perpetual growth rate after the projection horizon
    pub terminal_growth_rate: f64,

    /// Annual discount rate (WACC)
    pub discount_rate: f64,

    /// Number of explicitly projected years
    pub projection_years: u32,

    /// Share count used for the per-share value
    pub shares_outstanding: f64,
}

impl ValuationInput {
    pub fn new(
        base_fcf: f64,
        growth_rate: f64,
        terminal_growth_rate: f64,
        discount_rate: f64,
        projection_years: u32,
        shares_outstanding: f64,
    ) -> Self {
        Self {
            base_fcf,
            growth_rate,
            terminal_growth_rate,
            discount_rate,
            projection_years,
            shares_outstanding,
        }
    }

    /// Same input with a different growth rate
    pub fn with_growth_rate(self, growth_rate: f64) -> Self {
        Self { growth_rate, ..self }
    }

    /// Same input with a different discount rate
    pub fn with_discount_rate(self, discount_rate: f64) -> Self {
        Self { discount_rate, ..self }
    }
}
