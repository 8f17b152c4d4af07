use crate::domain::bar::DailyBar;
use crate::ingest::provider::MarketDataProvider;
use crate::time::lookback::LookbackWindow;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FixtureFile {
    #[serde(default)]
    pub symbols: BTreeMap<String, FixtureSymbol>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FixtureSymbol {
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub bars: Vec<DailyBar>,
}

/// Serves frozen bars and market caps, keyed by upper-cased symbol.
#[derive(Debug, Clone, Default)]
pub struct FixtureProvider {
    symbols: BTreeMap<String, FixtureSymbol>,
}

impl FixtureProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_symbol(
        mut self,
        symbol: &str,
        market_cap: Option<f64>,
        bars: Vec<DailyBar>,
    ) -> Self {
        self.symbols.insert(
            symbol.trim().to_ascii_uppercase(),
            FixtureSymbol { market_cap, bars },
        );
        self
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        let file: FixtureFile =
            serde_json::from_str(s).context("failed to parse market data fixture")?;

        let symbols = file
            .symbols
            .into_iter()
            .map(|(k, v)| (k.trim().to_ascii_uppercase(), v))
            .collect();
        Ok(Self { symbols })
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read fixture {}", path.display()))?;
        Self::from_json_str(&text)
    }

    fn lookup(&self, symbol: &str) -> Result<&FixtureSymbol> {
        self.symbols
            .get(&symbol.trim().to_ascii_uppercase())
            .with_context(|| format!("unknown symbol {symbol}"))
    }
}

#[async_trait::async_trait]
impl MarketDataProvider for FixtureProvider {
    fn provider_name(&self) -> &'static str {
        "fixture"
    }

    async fn fetch_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyBar>> {
        let window = LookbackWindow { start, end };
        let entry = self.lookup(symbol)?;
        Ok(entry
            .bars
            .iter()
            .filter(|b| window.contains(b.date))
            .cloned()
            .collect())
    }

    async fn fetch_market_cap(&self, symbol: &str) -> Result<Option<f64>> {
        Ok(self.lookup(symbol)?.market_cap)
    }
}
