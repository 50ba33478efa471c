//! Scan parameters shared by every instrument in a run.

use chrono::{Days, NaiveDate};

pub const DEFAULT_FORWARD_MONTHS: [u32; 3] = [1, 2, 3];
pub const DEFAULT_LOOKBACK_YEARS: [u32; 3] = [20, 10, 5];
pub const DEFAULT_MAX_WORKERS: usize = 8;
pub const DEFAULT_TRADING_PERIODS_PER_MONTH: u32 = 21;

#[derive(Debug, Clone, PartialEq)]
pub struct ScanConfig {
    /// Ascending, no duplicates.
    pub forward_periods_months: Vec<u32>,
    /// Descending, no duplicates.
    pub lookback_periods_years: Vec<u32>,
    pub max_workers: usize,
    pub reference_date: NaiveDate,
}

impl ScanConfig {
    /// Normalizes period ordering; `max_workers` is clamped to at least one.
    pub fn new(
        forward_months: impl IntoIterator<Item = u32>,
        lookback_years: impl IntoIterator<Item = u32>,
        max_workers: usize,
        reference_date: NaiveDate,
    ) -> Self {
        let mut forward_periods_months: Vec<u32> = forward_months.into_iter().collect();
        forward_periods_months.sort_unstable();
        forward_periods_months.dedup();

        let mut lookback_periods_years: Vec<u32> = lookback_years.into_iter().collect();
        lookback_periods_years.sort_unstable_by(|a, b| b.cmp(a));
        lookback_periods_years.dedup();

        Self {
            forward_periods_months,
            lookback_periods_years,
            max_workers: max_workers.max(1),
            reference_date,
        }
    }

    pub fn with_defaults(reference_date: NaiveDate) -> Self {
        Self::new(
            DEFAULT_FORWARD_MONTHS,
            DEFAULT_LOOKBACK_YEARS,
            DEFAULT_MAX_WORKERS,
            reference_date,
        )
    }

    pub fn max_lookback_years(&self) -> Option<u32> {
        self.lookback_periods_years.first().copied()
    }

    /// First date of the history fetched for every instrument.
    pub fn fetch_start(&self) -> NaiveDate {
        self.max_lookback_years()
            .map(|years| lookback_cutoff(self.reference_date, years))
            .unwrap_or(self.reference_date)
    }
}

/// `reference - floor(years * 365.25)` days.
pub fn lookback_cutoff(reference: NaiveDate, years: u32) -> NaiveDate {
    let days = u64::from(years) * 1461 / 4;
    reference
        .checked_sub_days(Days::new(days))
        .unwrap_or(NaiveDate::MIN)
}
