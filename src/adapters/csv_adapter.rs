//! CSV file price-history adapter.
//!
//! Reads `<TICKER>.csv` from a base directory. The header row must contain a
//! `date` column and an `adj close` or `close` column (case-insensitive);
//! other columns are ignored.

use crate::domain::error::SeasonalityError;
use crate::domain::price_series::normalize_date;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }

    fn parse_price(cell: &str) -> Result<f64, SeasonalityError> {
        let cell = cell.trim();
        if cell.is_empty() || cell.eq_ignore_ascii_case("nan") || cell.eq_ignore_ascii_case("null")
        {
            return Ok(f64::NAN);
        }
        cell.parse().map_err(|e| SeasonalityError::Provider {
            reason: format!("invalid close value '{}': {}", cell, e),
        })
    }
}

impl DataPort for CsvAdapter {
    fn fetch_history(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<(NaiveDate, f64)>, SeasonalityError> {
        let path = self.csv_path(symbol);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SeasonalityError::NotFound {
                    ticker: symbol.to_string(),
                });
            }
            Err(e) => {
                return Err(SeasonalityError::Provider {
                    reason: format!("failed to read {}: {}", path.display(), e),
                });
            }
        };

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| SeasonalityError::Provider {
                reason: format!("CSV header error in {}: {}", path.display(), e),
            })?
            .clone();

        // first listed name wins, so adjusted closes are preferred
        let column = |names: &[&str]| {
            names.iter().find_map(|n| {
                headers
                    .iter()
                    .position(|h| h.trim().eq_ignore_ascii_case(n))
            })
        };
        let date_col = column(&["date", "datetime"]).ok_or_else(|| SeasonalityError::Provider {
            reason: format!("missing date column in {}", path.display()),
        })?;
        let close_col = column(&["adj close", "adj_close", "close"])
            .ok_or_else(|| SeasonalityError::Provider {
                reason: format!("missing close column in {}", path.display()),
            })?;

        let mut history = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| SeasonalityError::Provider {
                reason: format!("CSV parse error: {}", e),
            })?;

            let date_str = record.get(date_col).ok_or_else(|| SeasonalityError::Provider {
                reason: "missing date cell".into(),
            })?;
            let date = normalize_date(date_str).ok_or_else(|| SeasonalityError::Provider {
                reason: format!("invalid date '{}'", date_str),
            })?;

            if date < start_date || date > end_date {
                continue;
            }

            let close = Self::parse_price(record.get(close_col).unwrap_or(""))?;
            history.push((date, close));
        }

        history.sort_by_key(|(date, _)| *date);
        Ok(history)
    }
}
