use crate::domain::bar::SymbolHistory;
use crate::domain::record::SymbolRecord;
use anyhow::Result;

pub const SHORT_MA_WINDOW: usize = 20;
pub const LONG_MA_WINDOW: usize = 50;
pub const CHANGE_LOOKBACK_BARS: usize = 5;

/// Simple moving average over the `window` closes ending at index `end` (inclusive).
///
/// Returns `None` until `window` closes exist at `end`.
pub fn sma_at(closes: &[f64], window: usize, end: usize) -> Option<f64> {
    if window == 0 || end >= closes.len() || end + 1 < window {
        return None;
    }

    let sum: f64 = closes[end + 1 - window..=end].iter().sum();
    Some(sum / window as f64)
}

/// Percentage change between the last close and the close `lag` bars earlier.
pub fn pct_change(closes: &[f64], lag: usize) -> Option<f64> {
    let last = closes.len().checked_sub(1)?;
    let base = closes[last.checked_sub(lag)?];
    if base == 0.0 || !base.is_finite() {
        return None;
    }

    Some((closes[last] - base) / base * 100.0)
}

pub fn derive_record(history: &SymbolHistory) -> Result<SymbolRecord> {
    let bars = &history.bars;
    anyhow::ensure!(
        !bars.is_empty(),
        "cannot derive features for {} without bars",
        history.symbol
    );

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let last = closes.len() - 1;
    let prev = last.checked_sub(1);

    let ma20 = sma_at(&closes, SHORT_MA_WINDOW, last);
    let ma50 = sma_at(&closes, LONG_MA_WINDOW, last);
    let prev_ma20 = prev.and_then(|i| sma_at(&closes, SHORT_MA_WINDOW, i));
    let prev_ma50 = prev.and_then(|i| sma_at(&closes, LONG_MA_WINDOW, i));

    let avg_volume = bars.iter().map(|b| b.volume).sum::<f64>() / bars.len() as f64;

    let market_cap = history
        .market_cap
        .filter(|v| v.is_finite() && *v >= 0.0)
        .unwrap_or(0.0);

    Ok(SymbolRecord {
        symbol: history.symbol.clone(),
        price: closes[last],
        market_cap,
        avg_volume,
        ma20,
        ma50,
        prev_ma20,
        prev_ma50,
        price_change_5d: pct_change(&closes, CHANGE_LOOKBACK_BARS),
        bullish_crossover: is_golden_cross(ma20, ma50, prev_ma20, prev_ma50),
    })
}

// Only the bar where the short average overtakes the long one counts.
fn is_golden_cross(
    ma_short: Option<f64>,
    ma_long: Option<f64>,
    prev_short: Option<f64>,
    prev_long: Option<f64>,
) -> bool {
    match (ma_short, ma_long, prev_short, prev_long) {
        (Some(s), Some(l), Some(ps), Some(pl)) => s > l && ps <= pl,
        _ => false,
    }
}
