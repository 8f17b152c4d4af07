/// Derived features for one successfully fetched symbol.
///
/// Averages and the 5-day change are `None` when the history is too short to
/// compute them. Such records never pass the screen.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolRecord {
    pub symbol: String,
    pub price: f64,
    pub market_cap: f64,
    pub avg_volume: f64,
    pub ma20: Option<f64>,
    pub ma50: Option<f64>,
    pub prev_ma20: Option<f64>,
    pub prev_ma50: Option<f64>,
    pub price_change_5d: Option<f64>,
    pub bullish_crossover: bool,
}
