use crate::domain::bar::{DailyBar, SymbolHistory};
use crate::ingest::error::{FetchStage, ProviderFetchError};
use crate::time::lookback::LookbackWindow;
use anyhow::Result;
use chrono::NaiveDate;

#[async_trait::async_trait]
pub trait MarketDataProvider: Send + Sync {
    fn provider_name(&self) -> &'static str;

    /// Daily bars with `start <= date <= end`, in any order.
    async fn fetch_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyBar>>;

    /// `Ok(None)` when the provider answered but has no market cap for the symbol.
    async fn fetch_market_cap(&self, symbol: &str) -> Result<Option<f64>>;
}

/// Fetches one symbol's bars and market cap, turning any provider failure into a value.
pub async fn fetch_symbol(
    provider: &dyn MarketDataProvider,
    symbol: &str,
    window: &LookbackWindow,
) -> std::result::Result<SymbolHistory, ProviderFetchError> {
    let history_err = |e: anyhow::Error| ProviderFetchError::new(symbol, FetchStage::History, &e);

    if symbol.trim().is_empty() {
        return Err(history_err(anyhow::anyhow!("symbol must be non-empty")));
    }

    let mut bars = provider
        .fetch_history(symbol, window.start, window.end)
        .await
        .map_err(history_err)?;

    if bars.is_empty() {
        return Err(history_err(anyhow::anyhow!(
            "no bars returned between {} and {}",
            window.start,
            window.end
        )));
    }

    // Oldest first; a repeated date keeps the later row.
    bars.sort_by_key(|b| b.date);
    bars.reverse();
    bars.dedup_by_key(|b| b.date);
    bars.reverse();

    let market_cap = provider
        .fetch_market_cap(symbol)
        .await
        .map_err(|e| ProviderFetchError::new(symbol, FetchStage::MarketCap, &e))?;

    Ok(SymbolHistory {
        symbol: symbol.to_string(),
        bars,
        market_cap,
    })
}
