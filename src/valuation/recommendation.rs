//! Buy/hold/sell classification of intrinsic value against market price

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, ValuationError};

/// Intrinsic value above this multiple of price is a strong buy
pub const STRONG_BUY_MULTIPLE: f64 = 1.2;
/// Intrinsic value at or above this multiple of price (up to 1.0) is a hold
pub const HOLD_FLOOR_MULTIPLE: f64 = 0.8;

/// Signal derived from intrinsic value / current price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    /// ratio > 1.2
    StrongBuy,
    /// 1.0 < ratio <= 1.2
    Buy,
    /// 0.8 <= ratio <= 1.0
    Hold,
    /// ratio < 0.8
    Sell,
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Recommendation::StrongBuy => "STRONG BUY",
            Recommendation::Buy => "BUY",
            Recommendation::Hold => "HOLD",
            Recommendation::Sell => "SELL",
        };
        f.write_str(label)
    }
}

/// Classify an intrinsic value against the current market price
///
/// Thresholds are applied as multiples of the price, so a value of exactly
/// `1.2 * current_price` is a `Buy`, not a `StrongBuy`.
pub fn classify(intrinsic_value_per_share: f64, current_price: f64) -> Result<Recommendation> {
    if !current_price.is_finite() || current_price <= 0.0 {
        return Err(ValuationError::invalid(format!(
            "current price must be positive (got {})",
            current_price
        )));
    }
    if !intrinsic_value_per_share.is_finite() {
        return Err(ValuationError::invalid("intrinsic value per share must be finite"));
    }

    let recommendation = if intrinsic_value_per_share > current_price * STRONG_BUY_MULTIPLE {
        Recommendation::StrongBuy
    } else if intrinsic_value_per_share > current_price {
        Recommendation::Buy
    } else if intrinsic_value_per_share >= current_price * HOLD_FLOOR_MULTIPLE {
        Recommendation::Hold
    } else {
        Recommendation::Sell
    };

    Ok(recommendation)
}

/// Distance between intrinsic value and market price
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceGap {
    /// intrinsic - price
    pub difference: f64,
    /// difference as a percentage of price
    pub difference_pct: f64,
}

impl PriceGap {
    pub fn new(intrinsic_value_per_share: f64, current_price: f64) -> Result<Self> {
        if !current_price.is_finite() || current_price <= 0.0 {
            return Err(ValuationError::invalid(format!(
                "current price must be positive (got {})",
                current_price
            )));
        }
        let difference = intrinsic_value_per_share - current_price;
        Ok(Self {
            difference,
            difference_pct: difference / current_price * 100.0,
        })
    }
}
