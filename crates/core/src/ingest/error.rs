use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStage {
    History,
    MarketCap,
}

impl fmt::Display for FetchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchStage::History => f.write_str("history"),
            FetchStage::MarketCap => f.write_str("market_cap"),
        }
    }
}

/// A symbol the provider could not serve. The run drops the symbol and continues.
#[derive(Debug, Clone)]
pub struct ProviderFetchError {
    pub symbol: String,
    pub stage: FetchStage,
    pub detail: String,
}

impl ProviderFetchError {
    pub fn new(symbol: &str, stage: FetchStage, err: &anyhow::Error) -> Self {
        Self {
            symbol: symbol.to_string(),
            stage,
            detail: format!("{err:#}"),
        }
    }
}

impl fmt::Display for ProviderFetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to fetch {} for {}: {}",
            self.stage, self.symbol, self.detail
        )
    }
}

impl std::error::Error for ProviderFetchError {}
