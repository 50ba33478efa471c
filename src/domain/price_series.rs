//! Date-sorted closing price series for one instrument.
//!
//! A `PriceSeries` is built once per instrument from the provider's raw
//! `(date, close)` pairs: non-finite and non-positive prices are dropped, the
//! samples are sorted by date and duplicate dates collapse to the first
//! occurrence. After construction the series is never mutated; lookback
//! windows are taken with [`PriceSeries::slice_from`].

use crate::domain::error::SeasonalityError;
use chrono::{DateTime, NaiveDate, NaiveDateTime};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceSample {
    pub date: NaiveDate,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    ticker: String,
    samples: Vec<PriceSample>,
}

impl PriceSeries {
    /// Build a series from raw provider output.
    ///
    /// Fails with [`SeasonalityError::NoData`] when nothing usable remains.
    pub fn from_raw(
        ticker: &str,
        raw: impl IntoIterator<Item = (NaiveDate, f64)>,
    ) -> Result<Self, SeasonalityError> {
        let mut samples: Vec<PriceSample> = raw
            .into_iter()
            .filter(|(_, price)| price.is_finite() && *price > 0.0)
            .map(|(date, price)| PriceSample { date, price })
            .collect();

        if samples.is_empty() {
            return Err(SeasonalityError::NoData {
                ticker: ticker.to_string(),
            });
        }

        // stable: the first sample seen for a date survives the dedup
        samples.sort_by_key(|s| s.date);
        samples.dedup_by_key(|s| s.date);

        Ok(Self {
            ticker: ticker.to_string(),
            samples,
        })
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[PriceSample] {
        &self.samples
    }

    pub fn get(&self, index: usize) -> Option<&PriceSample> {
        self.samples.get(index)
    }

    /// Earliest sample date; `None` only for an empty slice.
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.samples.first().map(|s| s.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.samples.last().map(|s| s.date)
    }

    /// Samples dated on or after `cutoff`, in order. The result may be empty
    /// when the cutoff is past the last sample.
    pub fn slice_from(&self, cutoff: NaiveDate) -> PriceSeries {
        let start = self.anniversary_index(cutoff);
        PriceSeries {
            ticker: self.ticker.clone(),
            samples: self.samples[start..].to_vec(),
        }
    }

    /// Index of the first sample dated on or after `target`, or `len()` if
    /// every sample is earlier.
    pub fn anniversary_index(&self, target: NaiveDate) -> usize {
        self.samples.partition_point(|s| s.date < target)
    }
}

/// Normalize a provider date cell to a calendar date.
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS`, offset-carrying timestamps
/// (`2024-01-02 00:00:00-05:00`) and RFC 3339. The offset is stripped, not
/// applied: the calendar date written in the cell is the one kept.
pub fn normalize_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local().date());
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%:z") {
        return Some(dt.naive_local().date());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|dt| dt.date())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn sample_series() -> PriceSeries {
        PriceSeries::from_raw(
            "SPY",
            vec![
                (d(2024, 1, 2), 100.0),
                (d(2024, 1, 3), 101.0),
                (d(2024, 1, 5), 102.0),
                (d(2024, 1, 8), 103.0),
            ],
        )
        .unwrap()
    }

    #[test]
    fn from_raw_sorts_and_dedups() {
        let series = PriceSeries::from_raw(
            "SPY",
            vec![
                (d(2024, 1, 3), 101.0),
                (d(2024, 1, 2), 100.0),
                (d(2024, 1, 3), 999.0),
            ],
        )
        .unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series.samples()[0].date, d(2024, 1, 2));
        assert_eq!(series.samples()[1].price, 101.0);
    }

    #[test]
    fn from_raw_drops_nan_and_non_positive() {
        let series = PriceSeries::from_raw(
            "SPY",
            vec![
                (d(2024, 1, 2), f64::NAN),
                (d(2024, 1, 3), 0.0),
                (d(2024, 1, 4), -5.0),
                (d(2024, 1, 5), 50.0),
                (d(2024, 1, 8), f64::INFINITY),
            ],
        )
        .unwrap();

        assert_eq!(series.len(), 1);
        assert_eq!(series.first_date(), Some(d(2024, 1, 5)));
    }

    #[test]
    fn from_raw_all_nan_is_no_data() {
        let result = PriceSeries::from_raw("BAD", vec![(d(2024, 1, 2), f64::NAN)]);
        assert!(matches!(result, Err(SeasonalityError::NoData { ticker }) if ticker == "BAD"));
    }

    #[test]
    fn from_raw_empty_is_no_data() {
        let result = PriceSeries::from_raw("BAD", Vec::new());
        assert!(matches!(result, Err(SeasonalityError::NoData { .. })));
    }

    #[test]
    fn anniversary_index_exact_match() {
        assert_eq!(sample_series().anniversary_index(d(2024, 1, 3)), 1);
    }

    #[test]
    fn anniversary_index_rolls_forward_over_gap() {
        // Jan 4 is missing, the next sample is Jan 5
        assert_eq!(sample_series().anniversary_index(d(2024, 1, 4)), 2);
    }

    #[test]
    fn anniversary_index_before_start() {
        assert_eq!(sample_series().anniversary_index(d(2023, 6, 1)), 0);
    }

    #[test]
    fn anniversary_index_past_end_is_sentinel() {
        let series = sample_series();
        assert_eq!(series.anniversary_index(d(2024, 2, 1)), series.len());
    }

    #[test]
    fn slice_from_keeps_tail() {
        let sliced = sample_series().slice_from(d(2024, 1, 4));
        assert_eq!(sliced.len(), 2);
        assert_eq!(sliced.first_date(), Some(d(2024, 1, 5)));
        assert_eq!(sliced.last_date(), Some(d(2024, 1, 8)));
        assert_eq!(sliced.ticker(), "SPY");
    }

    #[test]
    fn slice_from_past_end_is_empty() {
        let sliced = sample_series().slice_from(d(2025, 1, 1));
        assert!(sliced.is_empty());
        assert_eq!(sliced.first_date(), None);
    }

    #[test]
    fn normalize_plain_date() {
        assert_eq!(normalize_date("2024-01-02"), Some(d(2024, 1, 2)));
    }

    #[test]
    fn normalize_strips_offset() {
        assert_eq!(
            normalize_date("2024-01-02 00:00:00-05:00"),
            Some(d(2024, 1, 2))
        );
        assert_eq!(
            normalize_date("2024-01-02T23:30:00+09:00"),
            Some(d(2024, 1, 2))
        );
    }

    #[test]
    fn normalize_naive_timestamp() {
        assert_eq!(normalize_date("2024-01-02 16:00:00"), Some(d(2024, 1, 2)));
    }

    #[test]
    fn normalize_rejects_garbage() {
        assert_eq!(normalize_date("yesterday"), None);
    }
}
