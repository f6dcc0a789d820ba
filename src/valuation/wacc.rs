//! Weighted average cost of capital from CAPM inputs

use serde::{Deserialize, Serialize};

/// Default risk-free rate (10Y treasury proxy)
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.042;
/// Default expected market return
pub const DEFAULT_MARKET_RETURN: f64 = 0.09;
/// Default marginal tax rate
pub const DEFAULT_TAX_RATE: f64 = 0.25;
/// Default debt-to-equity ratio
pub const DEFAULT_DEBT_TO_EQUITY: f64 = 0.5;
/// Default pre-tax cost of debt
pub const DEFAULT_COST_OF_DEBT: f64 = 0.05;

/// Inputs for the WACC calculation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaccInput {
    pub beta: f64,
    pub risk_free_rate: f64,
    pub market_return: f64,
    pub debt_to_equity_ratio: f64,
    pub cost_of_debt: f64,
    pub tax_rate: f64,
}

impl WaccInput {
    /// Default market assumptions for a given equity beta
    pub fn with_beta(beta: f64) -> Self {
        Self {
            beta,
            ..Self::default()
        }
    }

    /// CAPM cost of equity: rf + beta * (rm - rf)
    pub fn cost_of_equity(&self) -> f64 {
        self.risk_free_rate + self.beta * (self.market_return - self.risk_free_rate)
    }

    /// Equity share of capital, E / (D + E)
    pub fn equity_weight(&self) -> f64 {
        1.0 / (1.0 + self.debt_to_equity_ratio)
    }

    /// Debt share of capital, D / (D + E)
    pub fn debt_weight(&self) -> f64 {
        self.debt_to_equity_ratio / (1.0 + self.debt_to_equity_ratio)
    }

    /// Blended discount rate
    pub fn discount_rate(&self) -> f64 {
        compute_wacc(
            self.beta,
            self.risk_free_rate,
            self.market_return,
            self.debt_to_equity_ratio,
            self.cost_of_debt,
            self.tax_rate,
        )
    }
}

impl Default for WaccInput {
    fn default() -> Self {
        Self {
            beta: 1.0,
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
            market_return: DEFAULT_MARKET_RETURN,
            debt_to_equity_ratio: DEFAULT_DEBT_TO_EQUITY,
            cost_of_debt: DEFAULT_COST_OF_DEBT,
            tax_rate: DEFAULT_TAX_RATE,
        }
    }
}

/// Weighted average cost of capital
///
/// `E/V * Re + D/V * Rd * (1 - Tc)` with `Re` from CAPM and weights derived
/// from the debt-to-equity ratio. Well defined for `debt_to_equity_ratio >= 0`.
pub fn compute_wacc(
    beta: f64,
    risk_free_rate: f64,
    market_return: f64,
    debt_to_equity_ratio: f64,
    cost_of_debt: f64,
    tax_rate: f64,
) -> f64 {
    let cost_of_equity = risk_free_rate + beta * (market_return - risk_free_rate);

    let equity_weight = 1.0 / (1.0 + debt_to_equity_ratio);
    let debt_weight = debt_to_equity_ratio / (1.0 + debt_to_equity_ratio);

    equity_weight * cost_of_equity + debt_weight * cost_of_debt * (1.0 - tax_rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_all_equity_is_cost_of_equity() {
        // beta 1.2: 0.042 + 1.2 * 0.048 = 0.0996
        let wacc = compute_wacc(1.2, 0.042, 0.09, 0.0, 0.05, 0.25);
        assert_relative_eq!(wacc, 0.0996, epsilon = 1e-12);
    }

    #[test]
    fn test_default_assumptions() {
        // Re = 0.09, Rd after tax = 0.0375, weights 2/3 and 1/3
        let wacc = WaccInput::with_beta(1.0).discount_rate();
        assert_relative_eq!(wacc, 0.09 * 2.0 / 3.0 + 0.0375 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(wacc, 0.0725, epsilon = 1e-12);
    }

    #[test]
    fn test_weights_sum_to_one() {
        for de in [0.0, 0.25, 0.5, 1.0, 2.0, 10.0] {
            let input = WaccInput {
                debt_to_equity_ratio: de,
                ..WaccInput::default()
            };
            assert_relative_eq!(input.equity_weight() + input.debt_weight(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_struct_matches_free_function() {
        let input = WaccInput {
            beta: 1.35,
            risk_free_rate: 0.04,
            market_return: 0.1,
            debt_to_equity_ratio: 0.8,
            cost_of_debt: 0.06,
            tax_rate: 0.21,
        };
        let expected = compute_wacc(1.35, 0.04, 0.1, 0.8, 0.06, 0.21);
        assert_relative_eq!(input.discount_rate(), expected);
        assert_relative_eq!(input.cost_of_equity(), 0.04 + 1.35 * 0.06, epsilon = 1e-12);
    }
}
