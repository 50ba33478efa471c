//! Configuration validation.
//!
//! Validates the `[scan]` section before any provider call is made. Asset
//! class sections are checked separately by the loader, since a bad asset
//! class only removes that class from the run.

use crate::domain::error::SeasonalityError;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub const SCAN_SECTION: &str = "scan";

pub fn validate_scan_config(config: &dyn ConfigPort) -> Result<(), SeasonalityError> {
    validate_periods(config, "forward_months")?;
    validate_periods(config, "lookback_years")?;
    validate_max_workers(config)?;
    validate_reference_date(config)?;
    validate_timeout(config)?;
    Ok(())
}

/// Parse a comma-separated list of positive integers. A missing key yields
/// `None` so callers can fall back to defaults.
pub fn parse_periods(
    config: &dyn ConfigPort,
    key: &str,
) -> Result<Option<Vec<u32>>, SeasonalityError> {
    let Some(items) = config.get_list(SCAN_SECTION, key) else {
        return Ok(None);
    };

    let invalid = |reason: String| SeasonalityError::ConfigInvalid {
        section: SCAN_SECTION.to_string(),
        key: key.to_string(),
        reason,
    };

    if items.is_empty() {
        return Err(invalid(format!("{} must list at least one period", key)));
    }

    items
        .iter()
        .map(|item| match item.parse::<u32>() {
            Ok(0) => Err(invalid(format!("{} periods must be positive", key))),
            Ok(v) => Ok(v),
            Err(_) => Err(invalid(format!("invalid period '{}'", item))),
        })
        .collect::<Result<Vec<u32>, _>>()
        .map(Some)
}

fn validate_periods(config: &dyn ConfigPort, key: &str) -> Result<(), SeasonalityError> {
    parse_periods(config, key).map(|_| ())
}

/// Integer value of `[section] key`. A missing key yields `None`; a value
/// that is present but not an integer yields the reason it was rejected.
pub fn parse_int(config: &dyn ConfigPort, section: &str, key: &str) -> Result<Option<i64>, String> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| format!("{} must be an integer, got '{}'", key, raw.trim())),
    }
}

/// [`parse_int`] for a `[scan]` key, failing with `ConfigInvalid`.
pub fn parse_scan_int(config: &dyn ConfigPort, key: &str) -> Result<Option<i64>, SeasonalityError> {
    parse_int(config, SCAN_SECTION, key).map_err(|reason| SeasonalityError::ConfigInvalid {
        section: SCAN_SECTION.to_string(),
        key: key.to_string(),
        reason,
    })
}

fn validate_max_workers(config: &dyn ConfigPort) -> Result<(), SeasonalityError> {
    let value = parse_scan_int(config, "max_workers")?.unwrap_or(1);
    if value < 1 {
        return Err(SeasonalityError::ConfigInvalid {
            section: SCAN_SECTION.to_string(),
            key: "max_workers".to_string(),
            reason: "max_workers must be at least 1".to_string(),
        });
    }
    Ok(())
}

fn validate_reference_date(config: &dyn ConfigPort) -> Result<(), SeasonalityError> {
    match config.get_string(SCAN_SECTION, "reference_date") {
        None => Ok(()),
        Some(s) => parse_date(&s, "reference_date").map(|_| ()),
    }
}

fn validate_timeout(config: &dyn ConfigPort) -> Result<(), SeasonalityError> {
    let value = parse_scan_int(config, "timeout_secs")?.unwrap_or(0);
    if value < 0 {
        return Err(SeasonalityError::ConfigInvalid {
            section: SCAN_SECTION.to_string(),
            key: "timeout_secs".to_string(),
            reason: "timeout_secs must be non-negative".to_string(),
        });
    }
    Ok(())
}

pub fn parse_date(value: &str, field: &str) -> Result<NaiveDate, SeasonalityError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        SeasonalityError::ConfigInvalid {
            section: SCAN_SECTION.to_string(),
            key: field.to_string(),
            reason: format!("invalid {} format, expected YYYY-MM-DD", field),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn adapter(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn valid_config_passes() {
        let cfg = adapter(
            "[scan]\nforward_months = 1,2,3\nlookback_years = 5, 10, 20\nmax_workers = 8\nreference_date = 2024-06-15\n",
        );
        assert!(validate_scan_config(&cfg).is_ok());
    }

    #[test]
    fn missing_keys_use_defaults() {
        let cfg = adapter("[scan]\n");
        assert!(validate_scan_config(&cfg).is_ok());
        assert_eq!(parse_periods(&cfg, "forward_months").unwrap(), None);
    }

    #[test]
    fn zero_period_rejected() {
        let cfg = adapter("[scan]\nforward_months = 1, 0\n");
        let err = validate_scan_config(&cfg).unwrap_err();
        assert!(matches!(err, SeasonalityError::ConfigInvalid { key, .. } if key == "forward_months"));
    }

    #[test]
    fn non_numeric_period_rejected() {
        let cfg = adapter("[scan]\nlookback_years = 5, ten\n");
        let err = validate_scan_config(&cfg).unwrap_err();
        assert!(matches!(err, SeasonalityError::ConfigInvalid { key, .. } if key == "lookback_years"));
    }

    #[test]
    fn empty_period_list_rejected() {
        let cfg = adapter("[scan]\nlookback_years = ,\n");
        assert!(validate_scan_config(&cfg).is_err());
    }

    #[test]
    fn zero_workers_rejected() {
        let cfg = adapter("[scan]\nmax_workers = 0\n");
        let err = validate_scan_config(&cfg).unwrap_err();
        assert!(matches!(err, SeasonalityError::ConfigInvalid { key, .. } if key == "max_workers"));
    }

    #[test]
    fn non_numeric_workers_rejected() {
        let cfg = adapter("[scan]\nmax_workers = eight\n");
        let err = validate_scan_config(&cfg).unwrap_err();
        assert!(matches!(err, SeasonalityError::ConfigInvalid { key, .. } if key == "max_workers"));
    }

    #[test]
    fn non_numeric_timeout_rejected() {
        let cfg = adapter("[scan]\ntimeout_secs = ten\n");
        let err = validate_scan_config(&cfg).unwrap_err();
        assert!(matches!(err, SeasonalityError::ConfigInvalid { key, .. } if key == "timeout_secs"));
    }

    #[test]
    fn parse_int_distinguishes_missing_from_malformed() {
        let cfg = adapter("[crypto]\ntrading_periods_per_month = 30\nbad = thirty\n");
        assert_eq!(parse_int(&cfg, "crypto", "trading_periods_per_month"), Ok(Some(30)));
        assert_eq!(parse_int(&cfg, "crypto", "missing"), Ok(None));
        assert!(parse_int(&cfg, "crypto", "bad").is_err());
    }

    #[test]
    fn bad_reference_date_rejected() {
        let cfg = adapter("[scan]\nreference_date = 15/06/2024\n");
        let err = validate_scan_config(&cfg).unwrap_err();
        assert!(matches!(err, SeasonalityError::ConfigInvalid { key, .. } if key == "reference_date"));
    }

    #[test]
    fn negative_timeout_rejected() {
        let cfg = adapter("[scan]\ntimeout_secs = -5\n");
        assert!(validate_scan_config(&cfg).is_err());
    }
}
