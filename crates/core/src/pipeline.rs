use crate::domain::record::SymbolRecord;
use crate::features::derive_record;
use crate::ingest::error::{FetchStage, ProviderFetchError};
use crate::ingest::provider::{fetch_symbol, MarketDataProvider};
use crate::screen::{screen, ScreenCriteria};
use crate::time::lookback::LookbackWindow;

#[derive(Debug, Clone)]
pub struct ScreenReport {
    /// Passing records, best 5-day change first.
    pub matches: Vec<SymbolRecord>,
    pub failures: Vec<ProviderFetchError>,
    /// Symbols that produced a record (matching or not).
    pub evaluated: usize,
}

/// Fetches, derives and screens each symbol in turn.
///
/// Per-symbol failures are logged once and reported in `failures`; they never abort the run.
pub async fn run_screen(
    provider: &dyn MarketDataProvider,
    symbols: &[String],
    window: &LookbackWindow,
    criteria: &ScreenCriteria,
) -> ScreenReport {
    let total = symbols.len();
    let mut outcomes: Vec<Result<SymbolRecord, ProviderFetchError>> = Vec::with_capacity(total);

    for (idx, symbol) in symbols.iter().enumerate() {
        let outcome = match fetch_symbol(provider, symbol, window).await {
            Ok(history) => derive_record(&history)
                .map_err(|e| ProviderFetchError::new(symbol, FetchStage::History, &e)),
            Err(err) => Err(err),
        };

        match &outcome {
            Ok(record) => tracing::debug!(
                idx,
                total,
                symbol = %record.symbol,
                price = record.price,
                bullish_crossover = record.bullish_crossover,
                "derived features"
            ),
            Err(err) => tracing::warn!(
                idx,
                symbol = %err.symbol,
                stage = %err.stage,
                error = %err.detail,
                "market data fetch failed; skipping symbol"
            ),
        }

        outcomes.push(outcome);
    }

    let mut records = Vec::with_capacity(outcomes.len());
    let mut failures = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(record) => records.push(record),
            Err(err) => failures.push(err),
        }
    }

    for record in &records {
        if let Some(reason) = criteria.first_failure(record) {
            tracing::debug!(symbol = %record.symbol, %reason, "excluded by screen");
        }
    }

    let evaluated = records.len();
    let matches = screen(records, criteria);

    tracing::info!(
        provider = provider.provider_name(),
        total,
        evaluated,
        failures = failures.len(),
        matches = matches.len(),
        start = %window.start,
        end = %window.end,
        "screen complete"
    );

    ScreenReport {
        matches,
        failures,
        evaluated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::bar::DailyBar;
    use crate::features::tests::{crossing_closes, history_from_closes};
    use crate::ingest::fixture::FixtureProvider;
    use chrono::NaiveDate;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    const CAP: Option<f64> = Some(100e6);
    const VOLUME: f64 = 500_000.0;

    fn add(
        provider: FixtureProvider,
        symbol: &str,
        closes: &[f64],
        cap: Option<f64>,
    ) -> FixtureProvider {
        let h = history_from_closes(symbol, closes, VOLUME, cap);
        provider.with_symbol(symbol, h.market_cap, h.bars)
    }

    fn provider() -> FixtureProvider {
        let mut short = vec![1.0; 19];
        short.push(2.0);

        let p = FixtureProvider::new();
        let p = add(p, "BBB", &crossing_closes(1.0, 1.02), CAP);
        let p = add(p, "AAA", &crossing_closes(2.5, 2.7), CAP);
        let p = add(p, "PRICEY", &crossing_closes(9.5, 10.0), CAP);
        let p = add(p, "SHORT", &short, CAP);
        add(p, "NOCAP", &crossing_closes(1.0, 1.5), None)
    }

    // Bars run 2026-01-01..=2026-02-20.
    fn window() -> LookbackWindow {
        LookbackWindow::ending_at(NaiveDate::from_ymd_opt(2026, 2, 20).unwrap(), 50).unwrap()
    }

    fn symbols(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    struct MarketCapDown(FixtureProvider);

    #[async_trait::async_trait]
    impl MarketDataProvider for MarketCapDown {
        fn provider_name(&self) -> &'static str {
            "market_cap_down"
        }

        async fn fetch_history(
            &self,
            symbol: &str,
            start: NaiveDate,
            end: NaiveDate,
        ) -> anyhow::Result<Vec<DailyBar>> {
            self.0.fetch_history(symbol, start, end).await
        }

        async fn fetch_market_cap(&self, symbol: &str) -> anyhow::Result<Option<f64>> {
            anyhow::bail!("quote service unavailable for {symbol}")
        }
    }

    #[tokio::test]
    async fn screens_and_ranks_candidates() {
        let all = symbols(&["BBB", "ZZZZ", "AAA", "PRICEY", "SHORT", "NOCAP"]);
        let report = run_screen(&provider(), &all, &window(), &ScreenCriteria::default()).await;

        let matched: Vec<&str> = report.matches.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(matched, vec!["AAA", "BBB"]);

        let top = &report.matches[0];
        assert_eq!(top.price, 2.7);
        let change = top.price_change_5d.unwrap();
        assert!((change - 8.0).abs() < 1e-9);

        assert_eq!(report.evaluated, 5);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].symbol, "ZZZZ");
        assert!(report.matches.len() <= all.len());

        let criteria = ScreenCriteria::default();
        assert!(report.matches.iter().all(|r| criteria.passes(r)));
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    impl CapturedLogs {
        fn lines(&self) -> Vec<String> {
            let buf = self.0.lock().unwrap();
            String::from_utf8_lossy(&buf).lines().map(str::to_string).collect()
        }
    }

    #[tokio::test]
    async fn warns_once_per_failed_symbol() {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let all = symbols(&["AAA", "ZZZZ", "BBB", "SHORT"]);
        let report = run_screen(&provider(), &all, &window(), &ScreenCriteria::default()).await;
        assert_eq!(report.failures.len(), 1);

        let warnings: Vec<String> = logs
            .lines()
            .into_iter()
            .filter(|l| l.contains("WARN"))
            .collect();
        assert_eq!(warnings.len(), 1, "{warnings:?}");
        assert!(warnings[0].contains("symbol=ZZZZ"));
        assert!(warnings[0].contains("unknown symbol"));
    }

    #[tokio::test]
    async fn repeated_runs_are_identical() {
        let p = provider();
        let all = symbols(&["AAA", "BBB", "PRICEY", "SHORT"]);
        let c = ScreenCriteria::default();

        let first = run_screen(&p, &all, &window(), &c).await;
        let second = run_screen(&p, &all, &window(), &c).await;
        assert_eq!(first.matches, second.matches);
    }

    #[tokio::test]
    async fn market_cap_failure_drops_only_that_stage() {
        let p = MarketCapDown(provider());
        let all = symbols(&["AAA", "BBB"]);
        let report = run_screen(&p, &all, &window(), &ScreenCriteria::default()).await;

        assert!(report.matches.is_empty());
        assert_eq!(report.evaluated, 0);
        assert_eq!(report.failures.len(), 2);
        assert!(report
            .failures
            .iter()
            .all(|f| f.stage == FetchStage::MarketCap && f.detail.contains("unavailable")));
    }

    #[tokio::test]
    async fn empty_universe_is_a_valid_empty_result() {
        let report = run_screen(&provider(), &[], &window(), &ScreenCriteria::default()).await;
        assert!(report.matches.is_empty());
        assert!(report.failures.is_empty());
        assert_eq!(report.evaluated, 0);
    }
}
