//! Sensitivity sweep over growth and discount rates
//!
//! Re-runs the valuation for every (growth, discount) pair while holding the
//! rest of the input fixed. Cells are independent and computed in parallel.

use log::{debug, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::valuation::{ValuationEngine, ValuationInput};

/// Default growth-rate multipliers (rows)
pub const DEFAULT_GROWTH_MULTIPLIERS: [f64; 3] = [0.5, 1.0, 1.5];
/// Default discount-rate multipliers (columns)
pub const DEFAULT_DISCOUNT_MULTIPLIERS: [f64; 3] = [0.8, 1.0, 1.2];

/// One cell of the grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensitivityCell {
    /// Intrinsic value per share
    Value(f64),
    /// Valuation failed for this pair
    Failed(String),
}

impl SensitivityCell {
    pub fn value(&self) -> Option<f64> {
        match self {
            SensitivityCell::Value(v) => Some(*v),
            SensitivityCell::Failed(_) => None,
        }
    }
}

/// Intrinsic value per share by growth rate (rows) and discount rate (columns)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityGrid {
    pub growth_rates: Vec<f64>,
    pub discount_rates: Vec<f64>,
    pub cells: Vec<Vec<SensitivityCell>>,
}

impl SensitivityGrid {
    pub fn get(&self, row: usize, col: usize) -> Option<&SensitivityCell> {
        self.cells.get(row).and_then(|r| r.get(col))
    }

    /// Row labels, e.g. "5.0%"
    pub fn row_labels(&self) -> Vec<String> {
        self.growth_rates.iter().map(|g| format!("{:.1}%", g * 100.0)).collect()
    }

    /// Column labels, e.g. "10.0%"
    pub fn column_labels(&self) -> Vec<String> {
        self.discount_rates.iter().map(|d| format!("{:.1}%", d * 100.0)).collect()
    }

    /// (row, col, value) of the highest valued cell
    pub fn max_cell(&self) -> Option<(usize, usize, f64)> {
        self.valued_cells()
            .max_by(|a, b| a.2.total_cmp(&b.2))
    }

    /// (row, col, value) of the lowest valued cell
    pub fn min_cell(&self) -> Option<(usize, usize, f64)> {
        self.valued_cells()
            .min_by(|a, b| a.2.total_cmp(&b.2))
    }

    fn valued_cells(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.cells.iter().enumerate().flat_map(|(i, row)| {
            row.iter()
                .enumerate()
                .filter_map(move |(j, cell)| cell.value().map(|v| (i, j, v)))
        })
    }
}

/// Runs sensitivity sweeps around a base valuation input
#[derive(Debug, Clone)]
pub struct SensitivityRunner {
    engine: ValuationEngine,
    base: ValuationInput,
}

impl SensitivityRunner {
    pub fn new(engine: ValuationEngine, base: ValuationInput) -> Self {
        Self { engine, base }
    }

    pub fn base(&self) -> &ValuationInput {
        &self.base
    }

    /// Value every (growth, discount) pair
    pub fn sweep(&self, growth_rates: &[f64], discount_rates: &[f64]) -> SensitivityGrid {
        let pairs: Vec<(usize, usize)> = (0..growth_rates.len())
            .flat_map(|i| (0..discount_rates.len()).map(move |j| (i, j)))
            .collect();

        let values: Vec<SensitivityCell> = pairs
            .par_iter()
            .map(|&(i, j)| {
                let input = self
                    .base
                    .with_growth_rate(growth_rates[i])
                    .with_discount_rate(discount_rates[j]);
                match self.engine.value(&input) {
                    Ok(result) => SensitivityCell::Value(result.intrinsic_value_per_share),
                    Err(e) => {
                        warn!(
                            "sensitivity cell growth={:.4} discount={:.4} failed: {}",
                            growth_rates[i], discount_rates[j], e
                        );
                        SensitivityCell::Failed(e.to_string())
                    }
                }
            })
            .collect();

        let cells = values
            .chunks(discount_rates.len().max(1))
            .take(growth_rates.len())
            .map(|row| row.to_vec())
            .collect::<Vec<_>>();

        debug!("sensitivity grid {}x{} computed", growth_rates.len(), discount_rates.len());

        SensitivityGrid {
            growth_rates: growth_rates.to_vec(),
            discount_rates: discount_rates.to_vec(),
            cells: pad_rows(cells, growth_rates.len()),
        }
    }

    /// Sweep scaled versions of the base growth and discount rates
    pub fn sweep_multipliers(&self, growth_multipliers: &[f64], discount_multipliers: &[f64]) -> SensitivityGrid {
        let growth_rates: Vec<f64> = growth_multipliers
            .iter()
            .map(|m| self.base.growth_rate * m)
            .collect();
        let discount_rates: Vec<f64> = discount_multipliers
            .iter()
            .map(|m| self.base.discount_rate * m)
            .collect();
        self.sweep(&growth_rates, &discount_rates)
    }

    /// 3x3 sweep with the default multipliers
    pub fn default_sweep(&self) -> SensitivityGrid {
        self.sweep_multipliers(&DEFAULT_GROWTH_MULTIPLIERS, &DEFAULT_DISCOUNT_MULTIPLIERS)
    }
}

// An empty discount axis yields no chunks; keep one (empty) row per growth rate.
fn pad_rows(mut cells: Vec<Vec<SensitivityCell>>, rows: usize) -> Vec<Vec<SensitivityCell>> {
    cells.resize(rows, Vec::new());
    cells
}
