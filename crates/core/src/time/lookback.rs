use chrono::{DateTime, Duration, NaiveDate, Utc};

pub const DEFAULT_LOOKBACK_DAYS: i64 = 50;

/// Inclusive calendar-day range of history requested per symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookbackWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl LookbackWindow {
    pub fn ending_at(end: NaiveDate, days: i64) -> anyhow::Result<Self> {
        anyhow::ensure!(days > 0, "lookback window must be > 0 days (got {days})");
        let start = end
            .checked_sub_signed(Duration::days(days))
            .ok_or_else(|| {
                anyhow::anyhow!("lookback of {days} days before {end} is out of range")
            })?;
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

pub fn resolve_as_of_date(
    as_of_date_arg: Option<&str>,
    now_utc: DateTime<Utc>,
) -> anyhow::Result<NaiveDate> {
    if let Some(s) = as_of_date_arg {
        return Ok(NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")?);
    }

    Ok(now_utc.date_naive())
}
