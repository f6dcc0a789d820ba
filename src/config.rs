//! Model parameters with defaults and JSON loading

use log::warn;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;
use crate::market::MarketSnapshot;
use crate::sensitivity::{DEFAULT_DISCOUNT_MULTIPLIERS, DEFAULT_GROWTH_MULTIPLIERS};
use crate::valuation::{
    EngineConfig, GrowthDecay, TerminalGrowthPolicy, ValuationInput, WaccInput, DEFAULT_COST_OF_DEBT,
    DEFAULT_DEBT_TO_EQUITY, DEFAULT_MARKET_RETURN, DEFAULT_RISK_FREE_RATE, DEFAULT_TAX_RATE,
};

/// Valuation parameters chosen by the analyst
///
/// Every field has a default, so a partial JSON document is enough:
/// `{"growth_rate": 0.08, "projection_years": 7}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelParameters {
    /// Explicit projection horizon (typical range 5-15)
    pub projection_years: u32,

    /// Initial FCF growth rate (typical range 0-20%)
    pub growth_rate: f64,

    /// Perpetual growth rate (typical range 0-5%)
    pub terminal_growth_rate: f64,

    /// Explicit discount rate; WACC is computed from the CAPM inputs when absent
    pub discount_rate: Option<f64>,

    /// Debt/equity ratio (typical range 0-2)
    pub debt_to_equity: f64,

    /// Pre-tax cost of debt (typical range 2-10%)
    pub cost_of_debt: f64,

    pub risk_free_rate: f64,
    pub market_return: f64,
    pub tax_rate: f64,

    pub growth_decay: GrowthDecay,
    pub terminal_growth_policy: TerminalGrowthPolicy,

    /// Sensitivity rows, as multiples of `growth_rate`
    pub sensitivity_growth_multipliers: Vec<f64>,

    /// Sensitivity columns, as multiples of the discount rate
    pub sensitivity_discount_multipliers: Vec<f64>,
}

impl Default for ModelParameters {
    fn default() -> Self {
        Self {
            projection_years: 10,
            growth_rate: 0.05,
            terminal_growth_rate: 0.025,
            discount_rate: None,
            debt_to_equity: DEFAULT_DEBT_TO_EQUITY,
            cost_of_debt: DEFAULT_COST_OF_DEBT,
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
            market_return: DEFAULT_MARKET_RETURN,
            tax_rate: DEFAULT_TAX_RATE,
            growth_decay: GrowthDecay::default(),
            terminal_growth_policy: TerminalGrowthPolicy::default(),
            sensitivity_growth_multipliers: DEFAULT_GROWTH_MULTIPLIERS.to_vec(),
            sensitivity_discount_multipliers: DEFAULT_DISCOUNT_MULTIPLIERS.to_vec(),
        }
    }
}

impl ModelParameters {
    /// Load parameters from a JSON file, defaulting missing fields
    pub fn from_json_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Engine configuration implied by these parameters
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            growth_decay: self.growth_decay,
            terminal_growth_policy: self.terminal_growth_policy,
        }
    }

    /// WACC inputs for a company with the given beta
    pub fn wacc_input(&self, beta: f64) -> WaccInput {
        WaccInput {
            beta,
            risk_free_rate: self.risk_free_rate,
            market_return: self.market_return,
            debt_to_equity_ratio: self.debt_to_equity,
            cost_of_debt: self.cost_of_debt,
            tax_rate: self.tax_rate,
        }
    }

    /// Explicit discount rate, or WACC for the given beta
    pub fn discount_rate_for(&self, beta: f64) -> f64 {
        self.discount_rate
            .unwrap_or_else(|| self.wacc_input(beta).discount_rate())
    }

    /// Valuation input for a resolved market snapshot
    pub fn valuation_input(&self, snapshot: &MarketSnapshot) -> ValuationInput {
        ValuationInput::new(
            snapshot.base_fcf,
            self.growth_rate,
            self.terminal_growth_rate,
            self.discount_rate_for(snapshot.beta),
            self.projection_years,
            snapshot.shares_outstanding,
        )
    }

    /// Warn about values outside the usual analyst ranges
    ///
    /// Returns the names of the out-of-range parameters. Nothing is rejected here;
    /// hard preconditions are enforced by the engine.
    pub fn check_ranges(&self) -> Vec<&'static str> {
        let mut out_of_range = Vec::new();
        let mut check = |name: &'static str, value: f64, low: f64, high: f64| {
            if value < low || value > high {
                warn!("{} = {} is outside the usual range [{}, {}]", name, value, low, high);
                out_of_range.push(name);
            }
        };

        check("projection_years", self.projection_years as f64, 5.0, 15.0);
        check("growth_rate", self.growth_rate, 0.0, 0.20);
        check("terminal_growth_rate", self.terminal_growth_rate, 0.0, 0.05);
        if let Some(discount) = self.discount_rate {
            check("discount_rate", discount, 0.05, 0.15);
        }
        check("debt_to_equity", self.debt_to_equity, 0.0, 2.0);
        check("cost_of_debt", self.cost_of_debt, 0.02, 0.10);

        out_of_range
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let params: ModelParameters =
            serde_json::from_str(r#"{"growth_rate": 0.08, "growth_decay": {"kind": "exponential"}}"#).unwrap();

        assert_eq!(params.growth_rate, 0.08);
        assert_eq!(params.projection_years, 10);
        assert_eq!(params.terminal_growth_rate, 0.025);
        assert_eq!(params.growth_decay, GrowthDecay::exponential());
        assert_eq!(params.terminal_growth_policy, TerminalGrowthPolicy::Clamp);
        assert_eq!(params.sensitivity_discount_multipliers, vec![0.8, 1.0, 1.2]);
    }

    #[test]
    fn test_load_example_file() {
        let params = ModelParameters::from_json_path("data/params.example.json").unwrap();
        assert_eq!(params, ModelParameters::default());
    }

    #[test]
    fn test_load_errors_are_typed() {
        let missing = ModelParameters::from_json_path("data/does_not_exist.json").unwrap_err();
        assert!(matches!(missing, ConfigError::Io(_)));

        let path = std::env::temp_dir().join(format!("dcf_params_{}.json", std::process::id()));
        std::fs::write(&path, r#"{"growth_rate": "fast"}"#).unwrap();
        let malformed = ModelParameters::from_json_path(&path).unwrap_err();
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(malformed, ConfigError::Json(_)));

        // Send + Sync, so it converts into anyhow::Error with `?`
        let _: anyhow::Error = malformed.into();
    }

    #[test]
    fn test_reject_policy_from_json() {
        let params: ModelParameters = serde_json::from_str(r#"{"terminal_growth_policy": "reject"}"#).unwrap();
        assert_eq!(params.engine_config().terminal_growth_policy, TerminalGrowthPolicy::Reject);
    }

    #[test]
    fn test_discount_rate_falls_back_to_wacc() {
        let params = ModelParameters::default();
        assert!((params.discount_rate_for(1.0) - 0.0725).abs() < 1e-12);

        let explicit = ModelParameters {
            discount_rate: Some(0.11),
            ..ModelParameters::default()
        };
        assert_eq!(explicit.discount_rate_for(1.0), 0.11);
    }

    #[test]
    fn test_valuation_input_from_snapshot() {
        let snapshot = MarketSnapshot::resolve("ACME", 50.0, 2_000_000.0, None, Some(1.2)).unwrap();
        let params = ModelParameters {
            discount_rate: Some(0.09),
            ..ModelParameters::default()
        };
        let input = params.valuation_input(&snapshot);

        assert_eq!(input.base_fcf, 5_000_000.0);
        assert_eq!(input.shares_outstanding, 2_000_000.0);
        assert_eq!(input.discount_rate, 0.09);
        assert_eq!(input.projection_years, 10);
    }

    #[test]
    fn test_range_check() {
        assert!(ModelParameters::default().check_ranges().is_empty());

        let params = ModelParameters {
            projection_years: 30,
            growth_rate: 0.35,
            ..ModelParameters::default()
        };
        assert_eq!(params.check_ranges(), vec!["projection_years", "growth_rate"]);
    }
}
