use crate::domain::record::SymbolRecord;
use std::cmp::Ordering;
use std::fmt;

pub const PRICE_MAX: f64 = 5.00;
pub const MIN_MARKET_CAP: f64 = 50e6;
pub const MAX_MARKET_CAP: f64 = 300e6;
pub const MIN_AVG_VOLUME: f64 = 200_000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct ScreenCriteria {
    pub price_max: f64,
    pub min_market_cap: f64,
    pub max_market_cap: f64,
    pub min_avg_volume: f64,
}

impl Default for ScreenCriteria {
    fn default() -> Self {
        Self {
            price_max: PRICE_MAX,
            min_market_cap: MIN_MARKET_CAP,
            max_market_cap: MAX_MARKET_CAP,
            min_avg_volume: MIN_AVG_VOLUME,
        }
    }
}

/// The predicate a record failed first, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    PriceAboveMax,
    MarketCapOutOfBand,
    AvgVolumeTooLow,
    NoPositiveMomentum,
    NoBullishCrossover,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Rejection::PriceAboveMax => "price above ceiling",
            Rejection::MarketCapOutOfBand => "market cap outside band",
            Rejection::AvgVolumeTooLow => "average volume below floor",
            Rejection::NoPositiveMomentum => "5-day change not positive",
            Rejection::NoBullishCrossover => "no golden cross on latest bar",
        };
        f.write_str(s)
    }
}

impl ScreenCriteria {
    pub fn from_env() -> anyhow::Result<Self> {
        let mut out = Self::default();

        if let Some(v) = env_f64("SCREEN_PRICE_MAX") {
            out.price_max = v;
        }
        if let Some(v) = env_f64("SCREEN_MIN_MARKET_CAP") {
            out.min_market_cap = v;
        }
        if let Some(v) = env_f64("SCREEN_MAX_MARKET_CAP") {
            out.max_market_cap = v;
        }
        if let Some(v) = env_f64("SCREEN_MIN_AVG_VOLUME") {
            out.min_avg_volume = v;
        }

        out.validate()?;
        Ok(out)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.price_max > 0.0,
            "price ceiling must be positive (got {})",
            self.price_max
        );
        anyhow::ensure!(
            self.min_market_cap <= self.max_market_cap,
            "market cap band is empty: min {} > max {}",
            self.min_market_cap,
            self.max_market_cap
        );
        anyhow::ensure!(
            self.min_avg_volume >= 0.0,
            "average volume floor must be non-negative (got {})",
            self.min_avg_volume
        );
        Ok(())
    }

    /// First predicate `record` fails, or `None` when it passes all of them.
    ///
    /// Undefined features compare as false, so short histories are rejected
    /// instead of slipping through.
    pub fn first_failure(&self, record: &SymbolRecord) -> Option<Rejection> {
        let price_ok = record.price <= self.price_max;
        if !price_ok {
            return Some(Rejection::PriceAboveMax);
        }
        let cap_ok = (self.min_market_cap..=self.max_market_cap).contains(&record.market_cap);
        if !cap_ok {
            return Some(Rejection::MarketCapOutOfBand);
        }
        let volume_ok = record.avg_volume >= self.min_avg_volume;
        if !volume_ok {
            return Some(Rejection::AvgVolumeTooLow);
        }
        if !record.price_change_5d.is_some_and(|c| c > 0.0) {
            return Some(Rejection::NoPositiveMomentum);
        }
        if !record.bullish_crossover {
            return Some(Rejection::NoBullishCrossover);
        }
        None
    }

    pub fn passes(&self, record: &SymbolRecord) -> bool {
        self.first_failure(record).is_none()
    }
}

/// Keeps records passing every predicate, best 5-day change first.
///
/// The sort is stable, so ties keep their input order.
pub fn screen(records: Vec<SymbolRecord>, criteria: &ScreenCriteria) -> Vec<SymbolRecord> {
    let mut out: Vec<SymbolRecord> = records.into_iter().filter(|r| criteria.passes(r)).collect();

    out.sort_by(|a, b| {
        let a = a.price_change_5d.unwrap_or(f64::NEG_INFINITY);
        let b = b.price_change_5d.unwrap_or(f64::NEG_INFINITY);
        b.partial_cmp(&a).unwrap_or(Ordering::Equal)
    });

    out
}

fn env_f64(key: &str) -> Option<f64> {
    std::env::var(key)
        .ok()
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn qualifying(symbol: &str, change: f64) -> SymbolRecord {
        SymbolRecord {
            symbol: symbol.to_string(),
            price: 3.0,
            market_cap: 100e6,
            avg_volume: 500_000.0,
            ma20: Some(2.51),
            ma50: Some(2.504),
            prev_ma20: Some(2.5),
            prev_ma50: Some(2.5),
            price_change_5d: Some(change),
            bullish_crossover: true,
        }
    }

    #[test]
    fn passes_fully_qualifying_record() {
        let c = ScreenCriteria::default();
        assert_eq!(c.first_failure(&qualifying("AAA", 8.0)), None);
    }

    #[test]
    fn excludes_solely_on_price() {
        let c = ScreenCriteria::default();
        let mut rec = qualifying("AAA", 8.0);
        rec.price = 10.0;
        assert_eq!(c.first_failure(&rec), Some(Rejection::PriceAboveMax));
        assert!(screen(vec![rec], &c).is_empty());
    }

    #[test]
    fn market_cap_band_is_inclusive() {
        let c = ScreenCriteria::default();
        let mut rec = qualifying("AAA", 1.0);

        rec.market_cap = MIN_MARKET_CAP;
        assert!(c.passes(&rec));
        rec.market_cap = MAX_MARKET_CAP;
        assert!(c.passes(&rec));
        rec.market_cap = MAX_MARKET_CAP + 1.0;
        assert_eq!(c.first_failure(&rec), Some(Rejection::MarketCapOutOfBand));
        rec.market_cap = 0.0;
        assert_eq!(c.first_failure(&rec), Some(Rejection::MarketCapOutOfBand));
    }

    #[test]
    fn volume_floor_and_momentum() {
        let c = ScreenCriteria::default();

        let mut rec = qualifying("AAA", 1.0);
        rec.avg_volume = MIN_AVG_VOLUME - 1.0;
        assert_eq!(c.first_failure(&rec), Some(Rejection::AvgVolumeTooLow));

        let rec = qualifying("AAA", 0.0);
        assert_eq!(c.first_failure(&rec), Some(Rejection::NoPositiveMomentum));

        let mut rec = qualifying("AAA", 1.0);
        rec.price_change_5d = None;
        assert_eq!(c.first_failure(&rec), Some(Rejection::NoPositiveMomentum));

        let mut rec = qualifying("AAA", 1.0);
        rec.bullish_crossover = false;
        assert_eq!(c.first_failure(&rec), Some(Rejection::NoBullishCrossover));
    }

    #[test]
    fn nan_features_fail_instead_of_passing() {
        let c = ScreenCriteria::default();
        let mut rec = qualifying("AAA", 1.0);
        rec.price = f64::NAN;
        assert_eq!(c.first_failure(&rec), Some(Rejection::PriceAboveMax));

        let mut rec = qualifying("AAA", 1.0);
        rec.price_change_5d = Some(f64::NAN);
        assert_eq!(c.first_failure(&rec), Some(Rejection::NoPositiveMomentum));
    }

    #[test]
    fn ranks_by_change_descending_with_stable_ties() {
        let c = ScreenCriteria::default();
        let mut too_pricey = qualifying("PRICEY", 50.0);
        too_pricey.price = 6.0;

        let out = screen(
            vec![
                qualifying("LOW", 1.0),
                qualifying("TIE_A", 4.0),
                too_pricey,
                qualifying("TOP", 12.5),
                qualifying("TIE_B", 4.0),
            ],
            &c,
        );

        let symbols: Vec<&str> = out.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["TOP", "TIE_A", "TIE_B", "LOW"]);
        for pair in out.windows(2) {
            assert!(pair[0].price_change_5d >= pair[1].price_change_5d);
        }
    }

    #[test]
    fn validate_rejects_empty_band() {
        let c = ScreenCriteria {
            min_market_cap: 10.0,
            max_market_cap: 1.0,
            ..ScreenCriteria::default()
        };
        assert!(c.validate().is_err());
        assert!(ScreenCriteria::default().validate().is_ok());
    }
}
