//! Per-instrument scan: one fetch, every permutation.
//!
//! The longest lookback window is fetched once and sliced in memory for the
//! shorter windows, so every permutation of an instrument is computed from the
//! same snapshot.

use crate::domain::error::SeasonalityError;
use crate::domain::orchestrator::CancelToken;
use crate::domain::permutation::PermutationGrid;
use crate::domain::price_series::PriceSeries;
use crate::domain::returns::{compute_seasonal_stats, MetricsRecord};
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;

/// A metrics record together with the permutation key it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedRecord {
    pub key: String,
    pub record: MetricsRecord,
}

#[derive(Debug)]
pub struct InstrumentOutcome {
    pub ticker: String,
    pub result: Result<Vec<KeyedRecord>, SeasonalityError>,
}

impl InstrumentOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

pub struct InstrumentScanner<'a> {
    data_port: &'a (dyn DataPort + Sync),
    grid: &'a PermutationGrid,
    fetch_start: NaiveDate,
    reference_date: NaiveDate,
    cancel: &'a CancelToken,
}

impl<'a> InstrumentScanner<'a> {
    pub fn new(
        data_port: &'a (dyn DataPort + Sync),
        grid: &'a PermutationGrid,
        fetch_start: NaiveDate,
        reference_date: NaiveDate,
        cancel: &'a CancelToken,
    ) -> Self {
        Self {
            data_port,
            grid,
            fetch_start,
            reference_date,
            cancel,
        }
    }

    pub fn scan(&self, ticker: &str) -> InstrumentOutcome {
        InstrumentOutcome {
            ticker: ticker.to_string(),
            result: self.try_scan(ticker),
        }
    }

    fn try_scan(&self, ticker: &str) -> Result<Vec<KeyedRecord>, SeasonalityError> {
        self.check_cancelled(ticker)?;
        let raw = self
            .data_port
            .fetch_history(ticker, self.fetch_start, self.reference_date)?;
        // the fetch may have outlived the run
        self.check_cancelled(ticker)?;

        let series = PriceSeries::from_raw(ticker, raw)?;
        Ok(scan_series(&series, self.grid, self.reference_date))
    }

    fn check_cancelled(&self, ticker: &str) -> Result<(), SeasonalityError> {
        if self.cancel.is_cancelled() {
            return Err(SeasonalityError::Cancelled {
                ticker: ticker.to_string(),
            });
        }
        Ok(())
    }
}

/// Run every permutation of `grid` against an already fetched series.
pub fn scan_series(
    series: &PriceSeries,
    grid: &PermutationGrid,
    reference_date: NaiveDate,
) -> Vec<KeyedRecord> {
    let mut records = Vec::with_capacity(grid.len());

    for window in grid.windows() {
        let sliced = series.slice_from(window.cutoff);
        for permutation in &window.permutations {
            match compute_seasonal_stats(&sliced, reference_date, permutation.forward_periods) {
                Some(stats) => records.push(KeyedRecord {
                    key: permutation.key(),
                    record: MetricsRecord::from_stats(series.ticker(), stats),
                }),
                None => tracing::debug!(
                    ticker = series.ticker(),
                    permutation = %permutation.key(),
                    "no eligible years"
                ),
            }
        }
    }

    records
}
