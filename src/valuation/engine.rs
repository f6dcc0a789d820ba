//! Core DCF engine: projection, Gordon terminal value, discounting

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ValuationError};
use super::growth::GrowthDecay;
use super::input::ValuationInput;
use super::result::ValuationResult;
use super::wacc::WaccInput;

/// Percentage-point gap kept between discount rate and a clamped terminal growth rate
pub const TERMINAL_GROWTH_CLAMP_GAP: f64 = 0.01;

/// Longest explicit projection horizon accepted
pub const MAX_PROJECTION_YEARS: u32 = 100;

/// What to do when terminal growth is not strictly below the discount rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalGrowthPolicy {
    /// Use `max(0, discount_rate - 0.01)` instead
    Clamp,
    /// Fail with `InvalidInput`
    Reject,
}

impl Default for TerminalGrowthPolicy {
    fn default() -> Self {
        TerminalGrowthPolicy::Clamp
    }
}

/// Engine configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Growth-rate path over the projection horizon
    #[serde(default)]
    pub growth_decay: GrowthDecay,

    /// Handling of terminal growth >= discount rate
    #[serde(default)]
    pub terminal_growth_policy: TerminalGrowthPolicy,
}

/// Stateless DCF valuation engine
///
/// Holds only its configuration; every call recomputes from the input.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValuationEngine {
    config: EngineConfig,
}

impl ValuationEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Discount rate from CAPM/WACC inputs
    pub fn compute_wacc(&self, wacc: &WaccInput) -> f64 {
        wacc.discount_rate()
    }

    /// Value a company from its base free cash flow
    pub fn value(&self, input: &ValuationInput) -> Result<ValuationResult> {
        validate(input)?;

        let discount_rate = input.discount_rate;
        let (terminal_growth_rate, clamped) = self.resolve_terminal_growth(input)?;

        let spread = discount_rate - terminal_growth_rate;
        if spread <= 0.0 {
            return Err(ValuationError::Computation(format!(
                "terminal value denominator must be positive (discount {} - terminal growth {})",
                discount_rate, terminal_growth_rate
            )));
        }

        let years = input.projection_years;
        let projected_cash_flows: Vec<f64> = (1..=years)
            .map(|year| input.base_fcf * self.config.growth_decay.growth_factor(input.growth_rate, year))
            .collect();

        let present_values: Vec<f64> = projected_cash_flows
            .iter()
            .enumerate()
            .map(|(i, cf)| cf / (1.0 + discount_rate).powi(i as i32 + 1))
            .collect();

        // Gordon growth on the final projected year
        let final_cash_flow = projected_cash_flows.last().copied().unwrap_or(input.base_fcf);
        let terminal_value = final_cash_flow * (1.0 + terminal_growth_rate) / spread;
        let terminal_value_present = terminal_value / (1.0 + discount_rate).powi(years as i32);

        let enterprise_value = present_values.iter().sum::<f64>() + terminal_value_present;
        let intrinsic_value_per_share = enterprise_value / input.shares_outstanding;

        if !enterprise_value.is_finite() || !intrinsic_value_per_share.is_finite() {
            return Err(ValuationError::Computation(
                "valuation overflowed to a non-finite value".to_string(),
            ));
        }

        debug!(
            "valued {} years at {:.4} discount: EV={:.2} TV={:.2} per share={:.4}",
            years, discount_rate, enterprise_value, terminal_value, intrinsic_value_per_share
        );

        Ok(ValuationResult {
            intrinsic_value_per_share,
            enterprise_value,
            projected_cash_flows,
            present_values,
            terminal_value,
            terminal_value_present,
            discount_rate,
            terminal_growth_rate,
            terminal_growth_clamped: clamped,
        })
    }

    /// Terminal growth rate to use, and whether it was clamped
    fn resolve_terminal_growth(&self, input: &ValuationInput) -> Result<(f64, bool)> {
        if input.terminal_growth_rate < input.discount_rate {
            return Ok((input.terminal_growth_rate, false));
        }

        match self.config.terminal_growth_policy {
            TerminalGrowthPolicy::Clamp => {
                let clamped = (input.discount_rate - TERMINAL_GROWTH_CLAMP_GAP).max(0.0);
                warn!(
                    "terminal growth {:.4} >= discount rate {:.4}, clamping to {:.4}",
                    input.terminal_growth_rate, input.discount_rate, clamped
                );
                Ok((clamped, true))
            }
            TerminalGrowthPolicy::Reject => Err(ValuationError::invalid(format!(
                "terminal growth rate {} must be below discount rate {}",
                input.terminal_growth_rate, input.discount_rate
            ))),
        }
    }
}

/// Preconditions checked before any arithmetic
fn validate(input: &ValuationInput) -> Result<()> {
    let fields = [
        ("base cash flow", input.base_fcf),
        ("growth rate", input.growth_rate),
        ("terminal growth rate", input.terminal_growth_rate),
        ("discount rate", input.discount_rate),
        ("shares outstanding", input.shares_outstanding),
    ];
    if let Some((name, value)) = fields.iter().find(|(_, v)| !v.is_finite()) {
        return Err(ValuationError::invalid(format!("{} must be finite (got {})", name, value)));
    }

    if input.base_fcf <= 0.0 {
        return Err(ValuationError::invalid(format!(
            "non-positive base cash flow cannot be valued (got {})",
            input.base_fcf
        )));
    }
    if input.shares_outstanding <= 0.0 {
        return Err(ValuationError::invalid(format!(
            "shares outstanding must be positive (got {})",
            input.shares_outstanding
        )));
    }
    if input.discount_rate <= 0.0 {
        return Err(ValuationError::invalid(format!(
            "discount rate must be positive (got {})",
            input.discount_rate
        )));
    }
    if input.growth_rate <= -1.0 {
        return Err(ValuationError::invalid(format!(
            "growth rate must be above -100% (got {})",
            input.growth_rate
        )));
    }
    if input.projection_years == 0 {
        return Err(ValuationError::invalid("projection horizon must be at least one year"));
    }
    if input.projection_years > MAX_PROJECTION_YEARS {
        return Err(ValuationError::invalid(format!(
            "projection horizon must be at most {} years (got {})",
            MAX_PROJECTION_YEARS, input.projection_years
        )));
    }

    Ok(())
}
