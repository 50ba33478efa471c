#![allow(dead_code)]

use chrono::{Days, NaiveDate};
use seasonality::domain::error::SeasonalityError;
use seasonality::domain::price_series::PriceSeries;
use seasonality::domain::universe::{AssetClass, AssetClassEntry};
use seasonality::ports::data_port::DataPort;
use std::collections::HashMap;
use std::sync::Mutex;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<(NaiveDate, f64)>>,
    pub errors: HashMap<String, String>,
    pub calls: Mutex<Vec<String>>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_history(mut self, ticker: &str, history: Vec<(NaiveDate, f64)>) -> Self {
        self.data.insert(ticker.to_string(), history);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }

    pub fn calls_for(&self, ticker: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.as_str() == ticker)
            .count()
    }
}

impl DataPort for MockDataPort {
    fn fetch_history(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<(NaiveDate, f64)>, SeasonalityError> {
        self.calls.lock().unwrap().push(symbol.to_string());
        if let Some(reason) = self.errors.get(symbol) {
            return Err(SeasonalityError::Provider {
                reason: reason.clone(),
            });
        }
        match self.data.get(symbol) {
            Some(history) => Ok(history
                .iter()
                .copied()
                .filter(|(d, _)| *d >= start_date && *d <= end_date)
                .collect()),
            None => Err(SeasonalityError::NotFound {
                ticker: symbol.to_string(),
            }),
        }
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// One sample per calendar day from `start` to `end` inclusive.
pub fn daily_history(
    start: NaiveDate,
    end: NaiveDate,
    price: impl Fn(usize, NaiveDate) -> f64,
) -> Vec<(NaiveDate, f64)> {
    start
        .iter_days()
        .take_while(|d| *d <= end)
        .enumerate()
        .map(|(i, d)| (d, price(i, d)))
        .collect()
}

/// Price that doubles every 365.25 days.
pub fn doubling_history(start: NaiveDate, end: NaiveDate) -> Vec<(NaiveDate, f64)> {
    daily_history(start, end, |i, _| 100.0 * 2f64.powf(i as f64 / 365.25))
}

pub fn flat_history(start: NaiveDate, end: NaiveDate, price: f64) -> Vec<(NaiveDate, f64)> {
    daily_history(start, end, |_, _| price)
}

pub fn series(ticker: &str, history: Vec<(NaiveDate, f64)>) -> PriceSeries {
    PriceSeries::from_raw(ticker, history).unwrap()
}

pub fn asset_class(name: &str, tickers: &[&str], periods: u32) -> AssetClassEntry {
    AssetClassEntry::Ready(AssetClass {
        name: name.to_string(),
        tickers: tickers.iter().map(|t| t.to_string()).collect(),
        trading_periods_per_month: periods,
    })
}

pub fn business_days(start: NaiveDate, count: usize) -> Vec<NaiveDate> {
    use chrono::{Datelike, Weekday};
    let mut out = Vec::with_capacity(count);
    let mut d = start;
    while out.len() < count {
        if !matches!(d.weekday(), Weekday::Sat | Weekday::Sun) {
            out.push(d);
        }
        d = d + Days::new(1);
    }
    out
}
