use crate::config::Settings;
use crate::domain::bar::DailyBar;
use crate::ingest::provider::MarketDataProvider;
use crate::ingest::types::{
    ApiError, ChartEnvelope, ChartResult, ErrorEnvelope, QuoteSummaryEnvelope,
};
use crate::time::lookback::LookbackWindow;
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, NaiveDate};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration as StdDuration;

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
const DEFAULT_COOKIE_URL: &str = "https://fc.yahoo.com";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Daily bars from the v8 chart endpoint, market cap from the v10 quoteSummary `price` module.
///
/// quoteSummary only answers requests carrying a session cookie plus the matching crumb,
/// so the first market-cap lookup performs that handshake.
#[derive(Debug)]
pub struct YahooChartProvider {
    http: reqwest::Client,
    base_url: String,
    cookie_url: String,

    // Reused for the rest of the run; cleared when the API answers 401.
    crumb: tokio::sync::Mutex<Option<String>>,
}

impl YahooChartProvider {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let base_url = settings
            .market_data_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let cookie_url = settings
            .market_data_cookie_url
            .clone()
            .unwrap_or_else(|| DEFAULT_COOKIE_URL.to_string());
        let timeout_secs = settings
            .market_data_timeout_secs
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self::new(base_url, cookie_url, StdDuration::from_secs(timeout_secs))
    }

    pub fn new(base_url: String, cookie_url: String, timeout: StdDuration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .cookie_store(true)
            .build()
            .context("failed to build market data http client")?;

        Ok(Self {
            http,
            base_url,
            cookie_url,
            crumb: tokio::sync::Mutex::new(None),
        })
    }

    fn url(&self, path: &str, symbol: &str) -> String {
        format!("{}{}/{}", self.base_url.trim_end_matches('/'), path, symbol)
    }

    async fn crumb(&self) -> Result<String> {
        let mut cached = self.crumb.lock().await;
        if let Some(crumb) = cached.as_ref() {
            return Ok(crumb.clone());
        }

        // Only the Set-Cookie matters here; the host itself answers 404.
        if let Err(err) = self.http.get(self.cookie_url.as_str()).send().await {
            tracing::debug!(error = %err, "cookie handshake request failed");
        }

        let url = format!("{}/v1/test/getcrumb", self.base_url.trim_end_matches('/'));
        let res = self
            .http
            .get(url)
            .send()
            .await
            .context("crumb request failed")?;

        let status = res.status();
        let text = res.text().await.context("failed to read crumb response")?;
        anyhow::ensure!(
            status.is_success(),
            "crumb HTTP {status}: {}",
            truncate(&text, 200)
        );

        let crumb = parse_crumb(&text)
            .with_context(|| format!("unexpected crumb response: {}", truncate(&text, 200)))?;
        tracing::debug!("acquired quoteSummary crumb");

        *cached = Some(crumb.clone());
        Ok(crumb)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: String,
        query: &[(&str, String)],
    ) -> Result<T> {
        let res = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .context("market data request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read market data response")?;

        if status == StatusCode::UNAUTHORIZED {
            self.crumb.lock().await.take();
        }

        // Error bodies usually still carry an envelope with a description.
        if let Some(err) = api_error_in(&text) {
            anyhow::bail!("HTTP {status}: {}: {}", err.code, err.description);
        }
        if !status.is_success() {
            anyhow::bail!("HTTP {status}: {}", truncate(&text, 200));
        }

        serde_json::from_str::<T>(&text).with_context(|| {
            format!("unexpected market data response: {}", truncate(&text, 200))
        })
    }
}

#[async_trait::async_trait]
impl MarketDataProvider for YahooChartProvider {
    fn provider_name(&self) -> &'static str {
        "yahoo_chart"
    }

    async fn fetch_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyBar>> {
        let period1 = start.and_hms_opt(0, 0, 0).context("invalid start")?.and_utc();
        // period2 is exclusive.
        let period2 = (end + Duration::days(1))
            .and_hms_opt(0, 0, 0)
            .context("invalid end")?
            .and_utc();

        let query = [
            ("period1", period1.timestamp().to_string()),
            ("period2", period2.timestamp().to_string()),
            ("interval", "1d".to_string()),
            ("includePrePost", "false".to_string()),
        ];

        let body: ChartEnvelope = self
            .get_json(self.url("/v8/finance/chart", symbol), &query)
            .await?;

        let result = body
            .chart
            .result
            .and_then(|r| r.into_iter().next())
            .context("chart response has no result")?;

        let window = LookbackWindow { start, end };
        let bars = chart_to_bars(&result)?;
        Ok(bars.into_iter().filter(|b| window.contains(b.date)).collect())
    }

    async fn fetch_market_cap(&self, symbol: &str) -> Result<Option<f64>> {
        let crumb = self.crumb().await?;
        let query = [("modules", "price".to_string()), ("crumb", crumb)];
        let body: QuoteSummaryEnvelope = self
            .get_json(self.url("/v10/finance/quoteSummary", symbol), &query)
            .await?;

        Ok(market_cap_from_summary(&body))
    }
}

/// Zips the parallel quote arrays into bars, skipping rows without a close or volume.
pub fn chart_to_bars(result: &ChartResult) -> Result<Vec<DailyBar>> {
    let Some(quote) = result.indicators.quote.first() else {
        return Ok(Vec::new());
    };

    let at = |series: &[Option<f64>], i: usize| series.get(i).copied().flatten();

    let mut out = Vec::with_capacity(result.timestamp.len());
    for (i, ts) in result.timestamp.iter().enumerate() {
        let (Some(close), Some(volume)) = (at(&quote.close, i), at(&quote.volume, i)) else {
            continue;
        };

        let local_ts = ts
            .checked_add(result.meta.gmt_offset)
            .with_context(|| format!("bar timestamp out of range: {ts}"))?;
        let date = DateTime::from_timestamp(local_ts, 0)
            .with_context(|| format!("bar timestamp out of range: {ts}"))?
            .date_naive();

        out.push(DailyBar {
            date,
            open: at(&quote.open, i).unwrap_or(close),
            high: at(&quote.high, i).unwrap_or(close),
            low: at(&quote.low, i).unwrap_or(close),
            close,
            volume,
        });
    }

    Ok(out)
}

pub fn market_cap_from_summary(body: &QuoteSummaryEnvelope) -> Option<f64> {
    body.quote_summary
        .result
        .as_ref()?
        .first()?
        .price
        .as_ref()?
        .market_cap
        .as_ref()?
        .raw
}

/// The `error` member of whichever envelope the body uses, if it is set.
pub fn api_error_in(body: &str) -> Option<ApiError> {
    serde_json::from_str::<ErrorEnvelope>(body).ok()?.into_error()
}

/// A crumb is a short opaque token; anything else is an HTML or JSON error page.
pub fn parse_crumb(text: &str) -> Option<String> {
    let crumb = text.trim();
    let looks_valid = !crumb.is_empty()
        && crumb.len() <= 64
        && !crumb
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '<' | '{' | '"'));
    looks_valid.then(|| crumb.to_string())
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max_chars).collect();
    out.push_str("...");
    out
}
