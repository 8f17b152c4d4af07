use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One daily OHLCV bar as returned by a market-data provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Raw per-symbol data handed from acquisition to feature derivation.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolHistory {
    pub symbol: String,
    /// Oldest first.
    pub bars: Vec<DailyBar>,
    pub market_cap: Option<f64>,
}
