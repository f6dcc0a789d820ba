//! End-to-end valuation of a ticker: fetch, value, classify, sweep

use log::info;
use serde::{Deserialize, Serialize};

use crate::config::ModelParameters;
use crate::error::Result;
use crate::market::{MarketDataProvider, MarketSnapshot};
use crate::sensitivity::{SensitivityGrid, SensitivityRunner};
use crate::valuation::{
    classify, PriceGap, Recommendation, ValuationEngine, ValuationInput, ValuationResult, ValueBreakdown,
};

/// Everything produced for one ticker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationReport {
    pub snapshot: MarketSnapshot,
    pub input: ValuationInput,
    pub result: ValuationResult,
    pub recommendation: Recommendation,
    pub price_gap: PriceGap,
    pub breakdown: ValueBreakdown,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensitivity: Option<SensitivityGrid>,
}

/// Value a resolved snapshot with the given parameters
pub fn analyze_snapshot(
    snapshot: MarketSnapshot,
    params: &ModelParameters,
    with_sensitivity: bool,
) -> Result<ValuationReport> {
    let engine = ValuationEngine::new(params.engine_config());
    let input = params.valuation_input(&snapshot);

    let result = engine.value(&input)?;
    let recommendation = classify(result.intrinsic_value_per_share, snapshot.current_price)?;
    let price_gap = PriceGap::new(result.intrinsic_value_per_share, snapshot.current_price)?;
    let breakdown = result.breakdown();

    let sensitivity = with_sensitivity.then(|| {
        SensitivityRunner::new(engine, input).sweep_multipliers(
            &params.sensitivity_growth_multipliers,
            &params.sensitivity_discount_multipliers,
        )
    });

    info!(
        "{}: intrinsic {:.2} vs price {:.2} -> {}",
        snapshot.ticker, result.intrinsic_value_per_share, snapshot.current_price, recommendation
    );

    Ok(ValuationReport {
        snapshot,
        input,
        result,
        recommendation,
        price_gap,
        breakdown,
        sensitivity,
    })
}

/// Fetch a ticker from a provider and value it
pub fn analyze<P: MarketDataProvider + ?Sized>(
    provider: &P,
    ticker: &str,
    params: &ModelParameters,
    with_sensitivity: bool,
) -> Result<ValuationReport> {
    let snapshot = provider.fetch(ticker)?;
    analyze_snapshot(snapshot, params, with_sensitivity)
}
