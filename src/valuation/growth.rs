//! Growth-rate strategies for the explicit projection horizon

use serde::{Deserialize, Serialize};

/// Default decay constant for the exponential strategy
pub const DEFAULT_DECAY_RATE: f64 = 0.1;

/// How the initial growth rate evolves across projection years
///
/// `Constant` compounds the same rate every year. `Exponential` shrinks the
/// applied rate toward zero as `growth_rate * e^(-rate * t)` and compounds that
/// year's rate over `t` years.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GrowthDecay {
    /// Same growth rate in every year
    Constant,
    /// Geometric decay of the growth rate toward zero
    Exponential {
        #[serde(default = "default_decay_rate")]
        rate: f64,
    },
}

fn default_decay_rate() -> f64 {
    DEFAULT_DECAY_RATE
}

impl Default for GrowthDecay {
    fn default() -> Self {
        GrowthDecay::Constant
    }
}

impl GrowthDecay {
    /// Exponential decay with the standard 0.1 constant
    pub fn exponential() -> Self {
        GrowthDecay::Exponential { rate: DEFAULT_DECAY_RATE }
    }

    /// Growth rate applied in year `year` (1-based)
    pub fn effective_growth(&self, growth_rate: f64, year: u32) -> f64 {
        match *self {
            GrowthDecay::Constant => growth_rate,
            GrowthDecay::Exponential { rate } => growth_rate * (-rate * year as f64).exp(),
        }
    }

    /// Cumulative growth factor from the base year to the end of `year`
    pub fn growth_factor(&self, growth_rate: f64, year: u32) -> f64 {
        (1.0 + self.effective_growth(growth_rate, year)).powi(year as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_constant_growth_compounds() {
        let decay = GrowthDecay::Constant;
        assert_relative_eq!(decay.effective_growth(0.05, 7), 0.05);
        assert_relative_eq!(decay.growth_factor(0.05, 3), 1.157625, epsilon = 1e-12);
    }

    #[test]
    fn test_exponential_decay_shrinks_rate() {
        let decay = GrowthDecay::exponential();
        let year1 = decay.effective_growth(0.05, 1);
        let year10 = decay.effective_growth(0.05, 10);

        assert_relative_eq!(year1, 0.05 * (-0.1_f64).exp(), epsilon = 1e-15);
        assert_relative_eq!(year10, 0.05 * (-1.0_f64).exp(), epsilon = 1e-15);
        assert!(year10 < year1);

        // Year-1 factor: 1 + 0.05 * e^-0.1 ≈ 1.045242
        assert!((decay.growth_factor(0.05, 1) - 1.0452418709).abs() < 1e-9);
    }

    #[test]
    fn test_deserialize_exponential_defaults_rate() {
        let decay: GrowthDecay = serde_json::from_str(r#"{"kind":"exponential"}"#).unwrap();
        assert_eq!(decay, GrowthDecay::exponential());

        let constant: GrowthDecay = serde_json::from_str(r#"{"kind":"constant"}"#).unwrap();
        assert_eq!(constant, GrowthDecay::Constant);
    }
}
