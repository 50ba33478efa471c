//! JSON snapshot writer implementing ReportPort.
//!
//! The snapshot is written to a sibling temp file and renamed over the
//! target, so readers never observe a half-written file.

use crate::domain::error::SeasonalityError;
use crate::domain::orchestrator::ScanResult;
use crate::ports::report_port::ReportPort;
use std::fs;
use std::path::Path;

#[derive(Debug, Default, Clone, Copy)]
pub struct JsonReportAdapter;

impl JsonReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl ReportPort for JsonReportAdapter {
    fn write(&self, result: &ScanResult, output_path: &Path) -> Result<(), SeasonalityError> {
        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let body = serde_json::to_string_pretty(result)?;

        let mut tmp_name = output_path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = Path::new(&tmp_name);

        fs::write(tmp_path, body)?;
        fs::rename(tmp_path, output_path)?;

        tracing::info!(path = %output_path.display(), "wrote scan results");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::orchestrator::PermutationBuckets;
    use crate::domain::returns::MetricsRecord;
    use tempfile::TempDir;

    fn sample_result() -> ScanResult {
        let mut buckets = PermutationBuckets::new();
        buckets.insert(
            "1m_20y".to_string(),
            vec![MetricsRecord {
                ticker: "SPY".into(),
                win_rate: 75.0,
                avg_return: 1.5,
                max_profit: 6.25,
                max_loss: -3.5,
                years_of_data: 4,
            }],
        );
        buckets.insert("1m_5y".to_string(), Vec::new());

        let mut result = ScanResult::default();
        result.asset_classes.insert("equities".into(), buckets);
        result
            .asset_classes
            .insert("crypto".into(), PermutationBuckets::new());
        result
    }

    #[test]
    fn writes_nested_mapping_in_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("public").join("scan_results.json");

        JsonReportAdapter::new().write(&sample_result(), &path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        let record = &value["equities"]["1m_20y"][0];
        assert_eq!(record["ticker"], "SPY");
        assert_eq!(record["winRate"], 75.0);
        assert_eq!(record["avgReturn"], 1.5);
        assert_eq!(record["maxProfit"], 6.25);
        assert_eq!(record["maxLoss"], -3.5);
        assert_eq!(record["yearsOfData"], 4);
        assert_eq!(value["equities"]["1m_5y"], serde_json::json!([]));
        assert_eq!(value["crypto"], serde_json::json!({}));

        // key order follows insertion, not alphabetical
        assert!(text.find("\"equities\"").unwrap() < text.find("\"crypto\"").unwrap());
        assert!(text.find("1m_20y").unwrap() < text.find("1m_5y").unwrap());
    }

    #[test]
    fn overwrites_previous_snapshot() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scan_results.json");
        fs::write(&path, "stale").unwrap();

        JsonReportAdapter::new().write(&ScanResult::default(), &path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "{}");
        assert!(!dir.path().join("scan_results.json.tmp").exists());
    }

    #[test]
    fn round_trips_through_serde() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.json");
        let result = sample_result();

        JsonReportAdapter::new().write(&result, &path).unwrap();
        let parsed: ScanResult =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();

        assert_eq!(parsed, result);
    }
}
