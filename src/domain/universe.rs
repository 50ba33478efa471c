//! Asset classes and their ticker lists.
//!
//! Ticker files hold one symbol per line. Symbols are trimmed and uppercased,
//! blank lines are ignored and repeated symbols keep their first position.

use crate::domain::error::SeasonalityError;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq)]
pub struct AssetClass {
    pub name: String,
    pub tickers: Vec<String>,
    pub trading_periods_per_month: u32,
}

impl AssetClass {
    pub fn count(&self) -> usize {
        self.tickers.len()
    }
}

/// An asset class as resolved from configuration. Invalid entries still
/// appear in the output, with no permutations.
#[derive(Debug)]
pub enum AssetClassEntry {
    Ready(AssetClass),
    Invalid {
        name: String,
        error: SeasonalityError,
    },
}

impl AssetClassEntry {
    pub fn name(&self) -> &str {
        match self {
            AssetClassEntry::Ready(class) => &class.name,
            AssetClassEntry::Invalid { name, .. } => name,
        }
    }
}

pub fn parse_tickers(input: &str) -> Vec<String> {
    let mut tickers = Vec::new();
    let mut seen = HashSet::new();

    for line in input.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let ticker = trimmed.to_uppercase();
        if !seen.insert(ticker.clone()) {
            tracing::debug!(ticker = %ticker, "dropping duplicate ticker");
            continue;
        }
        tickers.push(ticker);
    }

    tickers
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedTicker {
    pub asset_class: String,
    pub ticker: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    NotFound,
    NoData,
    Provider(String),
    Cancelled,
}

impl From<&SeasonalityError> for SkipReason {
    fn from(err: &SeasonalityError) -> Self {
        match err {
            SeasonalityError::NotFound { .. } => SkipReason::NotFound,
            SeasonalityError::NoData { .. } => SkipReason::NoData,
            SeasonalityError::Cancelled { .. } => SkipReason::Cancelled,
            other => SkipReason::Provider(other.to_string()),
        }
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::NotFound => write!(f, "not found"),
            SkipReason::NoData => write!(f, "no data"),
            SkipReason::Provider(reason) => write!(f, "provider error: {}", reason),
            SkipReason::Cancelled => write!(f, "cancelled"),
        }
    }
}
