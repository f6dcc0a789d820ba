//! Load market snapshots from a CSV file
//!
//! Expected columns: `Ticker,CurrentPrice,SharesOutstanding,FreeCashFlow,Beta,TotalDebt,Cash`.
//! Every column after `SharesOutstanding` may be left empty; `TotalDebt` and
//! `Cash` may also be omitted entirely.

use csv::Reader;
use std::collections::HashMap;
use std::path::Path;

use super::{MarketDataProvider, MarketSnapshot};
use crate::error::ProviderError;

/// Default location of the snapshot file
pub const DEFAULT_SNAPSHOT_PATH: &str = "data/market_snapshot.csv";

/// Raw CSV row
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "Ticker")]
    ticker: String,
    #[serde(rename = "CurrentPrice")]
    current_price: f64,
    #[serde(rename = "SharesOutstanding")]
    shares_outstanding: f64,
    #[serde(rename = "FreeCashFlow", default)]
    free_cash_flow: Option<f64>,
    #[serde(rename = "Beta", default)]
    beta: Option<f64>,
    #[serde(rename = "TotalDebt", default)]
    total_debt: Option<f64>,
    #[serde(rename = "Cash", default)]
    cash: Option<f64>,
}

impl CsvRow {
    fn into_snapshot(self) -> Result<MarketSnapshot, ProviderError> {
        let ticker = self.ticker.trim().to_uppercase();
        if ticker.is_empty() {
            return Err(ProviderError::Malformed {
                ticker: self.ticker,
                reason: "empty ticker".to_string(),
            });
        }
        MarketSnapshot::resolve(
            &ticker,
            self.current_price,
            self.shares_outstanding,
            self.free_cash_flow,
            self.beta,
        )
        .map(|snapshot| snapshot.with_balance_sheet(self.total_debt, self.cash))
    }
}

/// In-memory provider backed by a snapshot file
#[derive(Debug, Clone, Default)]
pub struct CsvMarketData {
    snapshots: HashMap<String, MarketSnapshot>,
}

impl CsvMarketData {
    /// Load snapshots from a CSV file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ProviderError> {
        let reader = Reader::from_path(path)?;
        Self::from_csv(reader)
    }

    /// Load snapshots from any reader (e.g. string buffer, network stream)
    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self, ProviderError> {
        Self::from_csv(Reader::from_reader(reader))
    }

    /// Load from the default snapshot location
    pub fn load_default() -> Result<Self, ProviderError> {
        Self::from_path(DEFAULT_SNAPSHOT_PATH)
    }

    fn from_csv<R: std::io::Read>(mut reader: Reader<R>) -> Result<Self, ProviderError> {
        let mut snapshots = HashMap::new();

        for result in reader.deserialize() {
            let row: CsvRow = result?;
            let snapshot = row.into_snapshot()?;
            snapshots.insert(snapshot.ticker.clone(), snapshot);
        }

        Ok(Self { snapshots })
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Tickers in sorted order
    pub fn tickers(&self) -> Vec<String> {
        let mut tickers: Vec<String> = self.snapshots.keys().cloned().collect();
        tickers.sort();
        tickers
    }
}

impl MarketDataProvider for CsvMarketData {
    fn fetch(&self, ticker: &str) -> Result<MarketSnapshot, ProviderError> {
        let key = ticker.trim().to_uppercase();
        self.snapshots
            .get(&key)
            .cloned()
            .ok_or(ProviderError::UnknownTicker(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::FcfSource;

    const SAMPLE: &str = "\
Ticker,CurrentPrice,SharesOutstanding,FreeCashFlow,Beta,TotalDebt,Cash
AAPL,190.5,15500000000,99580000000,1.29,104590000000,29965000000
acme,50,2000000,,,,
";

    #[test]
    fn test_load_and_fetch() {
        let data = CsvMarketData::from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data.tickers(), vec!["AAPL", "ACME"]);

        let aapl = data.fetch("aapl").unwrap();
        assert_eq!(aapl.base_fcf, 99_580_000_000.0);
        assert_eq!(aapl.beta, 1.29);
        assert_eq!(aapl.fcf_source, FcfSource::Reported);
    }

    #[test]
    fn test_balance_sheet_columns() {
        let data = CsvMarketData::from_reader(SAMPLE.as_bytes()).unwrap();

        let aapl = data.fetch("AAPL").unwrap();
        assert_eq!(aapl.total_debt, Some(104_590_000_000.0));
        assert_eq!(aapl.cash, Some(29_965_000_000.0));
        assert_eq!(aapl.net_debt(), Some(74_625_000_000.0));

        let acme = data.fetch("ACME").unwrap();
        assert_eq!(acme.total_debt, None);
        assert_eq!(acme.net_debt(), None);
    }

    #[test]
    fn test_balance_sheet_columns_optional() {
        let legacy = "Ticker,CurrentPrice,SharesOutstanding,FreeCashFlow,Beta\nKO,60.1,4310000000,9750000000,0.59\n";
        let data = CsvMarketData::from_reader(legacy.as_bytes()).unwrap();
        let ko = data.fetch("KO").unwrap();
        assert_eq!(ko.cash, None);
        assert_eq!(ko.net_debt(), None);
    }

    #[test]
    fn test_missing_fcf_falls_back_to_market_cap() {
        let data = CsvMarketData::from_reader(SAMPLE.as_bytes()).unwrap();
        let acme = data.fetch("ACME").unwrap();

        assert_eq!(acme.base_fcf, 5_000_000.0);
        assert_eq!(acme.fcf_source, FcfSource::MarketCapEstimate);
        assert_eq!(acme.beta, 1.0);
    }

    #[test]
    fn test_unknown_ticker() {
        let data = CsvMarketData::from_reader(SAMPLE.as_bytes()).unwrap();
        assert!(matches!(data.fetch("MSFT"), Err(ProviderError::UnknownTicker(t)) if t == "MSFT"));
    }

    #[test]
    fn test_bad_rows_are_errors() {
        let zero_price = "Ticker,CurrentPrice,SharesOutstanding,FreeCashFlow,Beta\nBAD,0,100,5,1\n";
        assert!(matches!(
            CsvMarketData::from_reader(zero_price.as_bytes()),
            Err(ProviderError::Malformed { .. })
        ));

        let not_a_number = "Ticker,CurrentPrice,SharesOutstanding,FreeCashFlow,Beta\nBAD,abc,100,5,1\n";
        assert!(matches!(
            CsvMarketData::from_reader(not_a_number.as_bytes()),
            Err(ProviderError::Csv(_))
        ));
    }
}
