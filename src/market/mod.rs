//! Market data provider contract and implementations
//!
//! The valuation engine never performs I/O itself. Callers resolve a
//! [`MarketSnapshot`] through a [`MarketDataProvider`] and feed its numbers in.

mod cache;
pub mod loader;

pub use cache::{CachedProvider, DEFAULT_CACHE_TTL_SECS};
pub use loader::CsvMarketData;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// Share of market capitalization used as a free cash flow estimate when none is reported
pub const MARKET_CAP_FCF_FALLBACK: f64 = 0.05;

/// Beta assumed when the provider does not report one
pub const DEFAULT_BETA: f64 = 1.0;

/// Where the base free cash flow came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FcfSource {
    /// Reported free cash flow line item
    Reported,
    /// 5% of market capitalization
    MarketCapEstimate,
}

/// Plain market data record consumed by the valuation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub ticker: String,
    pub current_price: f64,
    pub shares_outstanding: f64,
    pub base_fcf: f64,
    pub beta: f64,
    pub fcf_source: FcfSource,

    /// Total debt, when reported
    #[serde(default)]
    pub total_debt: Option<f64>,

    /// Cash and equivalents, when reported
    #[serde(default)]
    pub cash: Option<f64>,
}

impl MarketSnapshot {
    /// Build a snapshot, resolving free cash flow and beta defaults
    pub fn resolve(
        ticker: &str,
        current_price: f64,
        shares_outstanding: f64,
        reported_fcf: Option<f64>,
        beta: Option<f64>,
    ) -> Result<Self, ProviderError> {
        let malformed = |reason: String| ProviderError::Malformed {
            ticker: ticker.to_string(),
            reason,
        };
        if !current_price.is_finite() || current_price <= 0.0 {
            return Err(malformed(format!("current price must be positive (got {})", current_price)));
        }
        if !shares_outstanding.is_finite() || shares_outstanding <= 0.0 {
            return Err(malformed(format!(
                "shares outstanding must be positive (got {})",
                shares_outstanding
            )));
        }

        let (base_fcf, fcf_source) = resolve_base_fcf(reported_fcf, current_price, shares_outstanding);
        if fcf_source == FcfSource::MarketCapEstimate {
            warn!(
                "{}: no free cash flow reported, estimating {:.0} from market cap",
                ticker, base_fcf
            );
        }

        Ok(Self {
            ticker: ticker.to_string(),
            current_price,
            shares_outstanding,
            base_fcf,
            beta: beta.filter(|b| b.is_finite()).unwrap_or(DEFAULT_BETA),
            fcf_source,
            total_debt: None,
            cash: None,
        })
    }

    /// Attach balance-sheet figures; non-finite values are treated as unreported
    pub fn with_balance_sheet(self, total_debt: Option<f64>, cash: Option<f64>) -> Self {
        Self {
            total_debt: total_debt.filter(|d| d.is_finite()),
            cash: cash.filter(|c| c.is_finite()),
            ..self
        }
    }

    pub fn market_cap(&self) -> f64 {
        self.current_price * self.shares_outstanding
    }

    /// Total debt less cash, with an unreported side counted as zero
    ///
    /// `None` only when neither figure is reported.
    pub fn net_debt(&self) -> Option<f64> {
        match (self.total_debt, self.cash) {
            (None, None) => None,
            (debt, cash) => Some(debt.unwrap_or(0.0) - cash.unwrap_or(0.0)),
        }
    }
}

/// Reported free cash flow, or 5% of market cap when it cannot be located
pub fn resolve_base_fcf(reported: Option<f64>, current_price: f64, shares_outstanding: f64) -> (f64, FcfSource) {
    match reported.filter(|fcf| fcf.is_finite()) {
        Some(fcf) => (fcf, FcfSource::Reported),
        None => (
            current_price * shares_outstanding * MARKET_CAP_FCF_FALLBACK,
            FcfSource::MarketCapEstimate,
        ),
    }
}

/// Source of market data for a ticker
///
/// Implementations may block on I/O; retry and caching policy belong to the
/// caller or to wrappers such as [`CachedProvider`].
pub trait MarketDataProvider {
    fn fetch(&self, ticker: &str) -> Result<MarketSnapshot, ProviderError>;
}

impl<P: MarketDataProvider + ?Sized> MarketDataProvider for &P {
    fn fetch(&self, ticker: &str) -> Result<MarketSnapshot, ProviderError> {
        (**self).fetch(ticker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_is_five_percent_of_market_cap() {
        let (fcf, source) = resolve_base_fcf(None, 50.0, 2_000_000.0);
        assert_eq!(fcf, 5_000_000.0);
        assert_eq!(source, FcfSource::MarketCapEstimate);
    }

    #[test]
    fn test_reported_fcf_wins() {
        let (fcf, source) = resolve_base_fcf(Some(-1.5e6), 50.0, 2_000_000.0);
        assert_eq!(fcf, -1.5e6);
        assert_eq!(source, FcfSource::Reported);

        let (nan_fcf, nan_source) = resolve_base_fcf(Some(f64::NAN), 50.0, 2_000_000.0);
        assert_eq!(nan_fcf, 5_000_000.0);
        assert_eq!(nan_source, FcfSource::MarketCapEstimate);
    }

    #[test]
    fn test_snapshot_defaults_beta() {
        let snapshot = MarketSnapshot::resolve("ACME", 50.0, 2_000_000.0, None, None).unwrap();
        assert_eq!(snapshot.beta, DEFAULT_BETA);
        assert_eq!(snapshot.base_fcf, 5_000_000.0);
        assert_eq!(snapshot.market_cap(), 100_000_000.0);
        assert_eq!(snapshot.net_debt(), None);
    }

    #[test]
    fn test_net_debt() {
        let snapshot = MarketSnapshot::resolve("ACME", 50.0, 2_000_000.0, Some(4.0e6), None).unwrap();

        let both = snapshot.clone().with_balance_sheet(Some(30.0e6), Some(12.0e6));
        assert_eq!(both.net_debt(), Some(18.0e6));

        let net_cash = snapshot.clone().with_balance_sheet(Some(5.0e6), Some(12.0e6));
        assert_eq!(net_cash.net_debt(), Some(-7.0e6));

        let debt_only = snapshot.clone().with_balance_sheet(Some(30.0e6), None);
        assert_eq!(debt_only.net_debt(), Some(30.0e6));

        let nan_debt = snapshot.with_balance_sheet(Some(f64::NAN), None);
        assert_eq!(nan_debt.total_debt, None);
        assert_eq!(nan_debt.net_debt(), None);
    }

    #[test]
    fn test_snapshot_rejects_bad_price_and_shares() {
        assert!(matches!(
            MarketSnapshot::resolve("ACME", 0.0, 1.0, Some(1.0), None),
            Err(ProviderError::Malformed { .. })
        ));
        assert!(matches!(
            MarketSnapshot::resolve("ACME", 10.0, -3.0, Some(1.0), None),
            Err(ProviderError::Malformed { .. })
        ));
    }
}
