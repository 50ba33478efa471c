//! Price-history provider port.

use crate::domain::error::SeasonalityError;
use chrono::NaiveDate;

pub trait DataPort {
    /// Daily `(date, close)` pairs for `symbol` within `[start_date, end_date]`,
    /// adjusted for splits and dividends. Missing closes are reported as NaN.
    ///
    /// Unknown symbols fail with [`SeasonalityError::NotFound`].
    fn fetch_history(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<(NaiveDate, f64)>, SeasonalityError>;
}
