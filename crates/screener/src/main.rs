use anyhow::Context;
use clap::Parser;
use penny_core::ingest::fixture::FixtureProvider;
use penny_core::ingest::provider::MarketDataProvider;
use penny_core::ingest::yahoo::YahooChartProvider;
use penny_core::screen::ScreenCriteria;
use penny_core::time::lookback::{resolve_as_of_date, LookbackWindow, DEFAULT_LOOKBACK_DAYS};
use std::path::PathBuf;
use tracing::Instrument;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod universe;

#[derive(Debug, Parser)]
#[command(name = "penny_screener")]
struct Args {
    /// Comma-separated tickers to screen. Overrides SCREENER_SYMBOLS.
    #[arg(long)]
    symbols: Option<String>,

    /// File with one ticker per line.
    #[arg(long, conflicts_with = "symbols")]
    symbols_file: Option<PathBuf>,

    /// Last day of the lookback window (YYYY-MM-DD). Defaults to today's UTC date.
    #[arg(long)]
    as_of_date: Option<String>,

    /// Calendar days of history to fetch per symbol.
    #[arg(long)]
    lookback_days: Option<i64>,

    /// Read bars and market caps from a JSON fixture instead of the live provider.
    #[arg(long)]
    fixture: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = penny_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    if let Err(err) = run(args, &settings).await {
        sentry_anyhow::capture_anyhow(&err);
        tracing::error!(error = %err, "screen run failed");
        return Err(err);
    }

    Ok(())
}

async fn run(args: Args, settings: &penny_core::config::Settings) -> anyhow::Result<()> {
    let as_of_date = resolve_as_of_date(args.as_of_date.as_deref(), chrono::Utc::now())?;
    let lookback_days = args
        .lookback_days
        .or(settings.lookback_days)
        .unwrap_or(DEFAULT_LOOKBACK_DAYS);
    let window = LookbackWindow::ending_at(as_of_date, lookback_days)?;

    let criteria = ScreenCriteria::from_env().context("invalid screen thresholds")?;

    let symbols = universe::resolve_universe(&universe::UniverseOptions {
        symbols_arg: args.symbols,
        symbols_file: args.symbols_file,
        symbols_env: settings.screener_symbols.clone(),
    })?;

    let provider: Box<dyn MarketDataProvider> = match args.fixture.as_deref() {
        Some(path) => Box::new(FixtureProvider::load(path).await?),
        None => Box::new(YahooChartProvider::from_settings(settings)?),
    };

    let run_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("screen", %run_id, provider = provider.provider_name());
    tracing::info!(
        %run_id,
        %as_of_date,
        lookback_days,
        symbols = symbols.len(),
        "starting screen"
    );

    println!("Screening penny stocks for potential price increases...");
    let report = penny_core::pipeline::run_screen(provider.as_ref(), &symbols, &window, &criteria)
        .instrument(span)
        .await;

    println!("{}", penny_core::report::render_report(&report));
    Ok(())
}

fn init_sentry(settings: &penny_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
