//! Domain error types.

/// Top-level error type for seasonality scans.
#[derive(Debug, thiserror::Error)]
pub enum SeasonalityError {
    #[error("price provider error: {reason}")]
    Provider { reason: String },

    #[error("ticker not found: {ticker}")]
    NotFound { ticker: String },

    #[error("no price data for {ticker}")]
    NoData { ticker: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("invalid asset class {asset_class}: {reason}")]
    InvalidAssetClass { asset_class: String, reason: String },

    #[error("no asset classes configured")]
    NoAssetClasses,

    #[error("scan cancelled before {ticker} completed")]
    Cancelled { ticker: String },

    #[error("scan has already been run")]
    ScanAlreadyRun,

    #[error("worker pool error: {reason}")]
    WorkerPool { reason: String },

    #[error(transparent)]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&SeasonalityError> for std::process::ExitCode {
    fn from(err: &SeasonalityError) -> Self {
        let code: u8 = match err {
            SeasonalityError::Io(_) | SeasonalityError::Serialize(_) => 1,
            SeasonalityError::ConfigParse { .. }
            | SeasonalityError::ConfigMissing { .. }
            | SeasonalityError::ConfigInvalid { .. }
            | SeasonalityError::InvalidAssetClass { .. }
            | SeasonalityError::NoAssetClasses => 2,
            SeasonalityError::Provider { .. } | SeasonalityError::NotFound { .. } => 3,
            SeasonalityError::NoData { .. } => 5,
            SeasonalityError::Cancelled { .. }
            | SeasonalityError::ScanAlreadyRun
            | SeasonalityError::WorkerPool { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
