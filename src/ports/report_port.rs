//! Scan result output port.

use crate::domain::error::SeasonalityError;
use crate::domain::orchestrator::ScanResult;
use std::path::Path;

/// Port for publishing the scan snapshot. Each write replaces the previous
/// snapshot at `output_path`.
pub trait ReportPort {
    fn write(&self, result: &ScanResult, output_path: &Path) -> Result<(), SeasonalityError>;
}
