//! Forward-return statistics over anniversary dates.
//!
//! For every year from the first sample's year up to (excluding) the
//! reference year, the anniversary of the reference date is located in the
//! series and the log return over the next `forward_periods` samples is
//! taken. Years that cannot supply a full forward window contribute nothing.
//! The log returns are converted back to simple percentages before the
//! statistics are aggregated.

use crate::domain::price_series::PriceSeries;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Aggregate statistics for one (instrument, lookback, forward) triple.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonalStats {
    pub win_rate: f64,
    pub avg_return: f64,
    pub max_profit: f64,
    pub max_loss: f64,
    pub years_of_data: usize,
}

/// One output row: the statistics tagged with their ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsRecord {
    pub ticker: String,
    pub win_rate: f64,
    pub avg_return: f64,
    pub max_profit: f64,
    pub max_loss: f64,
    pub years_of_data: usize,
}

impl MetricsRecord {
    pub fn from_stats(ticker: &str, stats: SeasonalStats) -> Self {
        Self {
            ticker: ticker.to_string(),
            win_rate: stats.win_rate,
            avg_return: stats.avg_return,
            max_profit: stats.max_profit,
            max_loss: stats.max_loss,
            years_of_data: stats.years_of_data,
        }
    }
}

/// The reference date's month/day in `year`. Feb 29 falls back to Feb 28 in
/// non-leap years.
pub fn anniversary_date(reference: NaiveDate, year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, reference.month(), reference.day()).or_else(|| {
        if reference.month() == 2 && reference.day() == 29 {
            NaiveDate::from_ymd_opt(year, 2, 28)
        } else {
            None
        }
    })
}

/// Log return from the first sample on/after `target` to the sample
/// `forward_periods` positions later. `None` when the window does not fit.
pub fn forward_log_return(
    series: &PriceSeries,
    target: NaiveDate,
    forward_periods: usize,
) -> Option<f64> {
    let start_idx = series.anniversary_index(target);
    if start_idx >= series.len() {
        return None;
    }
    let end_idx = start_idx.checked_add(forward_periods)?;
    if end_idx >= series.len() {
        return None;
    }

    let start_price = series.get(start_idx)?.price;
    let end_price = series.get(end_idx)?.price;
    if start_price <= 0.0 {
        return None;
    }

    Some((end_price / start_price).ln())
}

/// Collect one forward log return per eligible anniversary year.
pub fn anniversary_log_returns(
    series: &PriceSeries,
    reference: NaiveDate,
    forward_periods: usize,
) -> Vec<f64> {
    let Some(first) = series.first_date() else {
        return Vec::new();
    };

    (first.year()..reference.year())
        .filter_map(|year| anniversary_date(reference, year))
        .filter_map(|target| forward_log_return(series, target, forward_periods))
        .collect()
}

/// Compute the seasonal statistics, or `None` if no year produced a return.
pub fn compute_seasonal_stats(
    series: &PriceSeries,
    reference: NaiveDate,
    forward_periods: usize,
) -> Option<SeasonalStats> {
    let log_returns = anniversary_log_returns(series, reference, forward_periods);
    summarize(&log_returns)
}

/// Aggregate log returns into percentage-return statistics.
pub fn summarize(log_returns: &[f64]) -> Option<SeasonalStats> {
    if log_returns.is_empty() {
        return None;
    }

    let pct: Vec<f64> = log_returns
        .iter()
        .map(|lr| (lr.exp() - 1.0) * 100.0)
        .collect();
    let n = pct.len() as f64;

    let wins = pct.iter().filter(|&&r| r > 0.0).count();
    let avg_return = pct.iter().sum::<f64>() / n;
    let max_profit = pct.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let max_loss = pct.iter().copied().fold(f64::INFINITY, f64::min);

    Some(SeasonalStats {
        win_rate: wins as f64 / n * 100.0,
        avg_return,
        max_profit,
        max_loss,
        years_of_data: pct.len(),
    })
}
