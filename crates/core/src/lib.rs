pub mod domain;
pub mod features;
pub mod ingest;
pub mod pipeline;
pub mod report;
pub mod screen;
pub mod time;

pub mod config {
    #[derive(Debug, Clone, Default)]
    pub struct Settings {
        pub sentry_dsn: Option<String>,
        pub market_data_base_url: Option<String>,
        pub market_data_cookie_url: Option<String>,
        pub market_data_timeout_secs: Option<u64>,
        pub screener_symbols: Option<String>,
        pub lookback_days: Option<i64>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                sentry_dsn: non_empty_var("SENTRY_DSN"),
                market_data_base_url: non_empty_var("MARKET_DATA_BASE_URL"),
                market_data_cookie_url: non_empty_var("MARKET_DATA_COOKIE_URL"),
                market_data_timeout_secs: non_empty_var("MARKET_DATA_TIMEOUT_SECS")
                    .and_then(|s| s.parse::<u64>().ok()),
                screener_symbols: non_empty_var("SCREENER_SYMBOLS"),
                lookback_days: non_empty_var("SCREEN_LOOKBACK_DAYS")
                    .and_then(|s| s.parse::<i64>().ok()),
            })
        }
    }

    fn non_empty_var(key: &str) -> Option<String> {
        std::env::var(key)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }
}
