//! Valuation output structures

use serde::{Deserialize, Serialize};

/// Outcome of a DCF valuation
///
/// `projected_cash_flows` and `present_values` are indexed by year - 1 and
/// always have `projection_years` entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationResult {
    pub intrinsic_value_per_share: f64,
    pub enterprise_value: f64,
    pub projected_cash_flows: Vec<f64>,
    pub present_values: Vec<f64>,
    pub terminal_value: f64,
    pub terminal_value_present: f64,

    /// Discount rate applied
    pub discount_rate: f64,

    /// Terminal growth rate actually used in the Gordon formula
    pub terminal_growth_rate: f64,

    /// Whether the requested terminal growth rate was clamped below the discount rate
    pub terminal_growth_clamped: bool,
}

impl ValuationResult {
    pub fn projection_years(&self) -> u32 {
        self.projected_cash_flows.len() as u32
    }

    /// Sum of discounted projected cash flows
    pub fn pv_of_cash_flows(&self) -> f64 {
        self.present_values.iter().sum()
    }

    /// Split of enterprise value between the projection horizon and the terminal value
    pub fn breakdown(&self) -> ValueBreakdown {
        let pv_cash_flows = self.pv_of_cash_flows();
        let total = pv_cash_flows + self.terminal_value_present;
        let share = |part: f64| if total.abs() > 0.0 { part / total * 100.0 } else { 0.0 };

        ValueBreakdown {
            pv_cash_flows,
            pv_terminal: self.terminal_value_present,
            cash_flows_pct: share(pv_cash_flows),
            terminal_pct: share(self.terminal_value_present),
        }
    }

    /// Year-by-year projection schedule
    pub fn schedule(&self) -> Vec<ScheduleRow> {
        self.projected_cash_flows
            .iter()
            .zip(&self.present_values)
            .enumerate()
            .map(|(i, (&cash_flow, &present_value))| ScheduleRow {
                year: i as u32 + 1,
                cash_flow,
                discount_factor: (1.0 + self.discount_rate).powi(-(i as i32 + 1)),
                present_value,
            })
            .collect()
    }
}

/// Enterprise value split into its two components
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueBreakdown {
    pub pv_cash_flows: f64,
    pub pv_terminal: f64,
    pub cash_flows_pct: f64,
    pub terminal_pct: f64,
}

/// A single projected year
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub year: u32,
    pub cash_flow: f64,
    pub discount_factor: f64,
    pub present_value: f64,
}
