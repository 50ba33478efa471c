//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use indexmap::IndexMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report_adapter::JsonReportAdapter;
use crate::domain::config_validation::{
    parse_date, parse_int, parse_periods, parse_scan_int, validate_scan_config, SCAN_SECTION,
};
use crate::domain::error::SeasonalityError;
use crate::domain::orchestrator::{CancelToken, ScanOrchestrator, ScanResult};
use crate::domain::permutation::PermutationGrid;
use crate::domain::price_series::PriceSeries;
use crate::domain::scan_config::{
    ScanConfig, DEFAULT_FORWARD_MONTHS, DEFAULT_LOOKBACK_YEARS, DEFAULT_MAX_WORKERS,
    DEFAULT_TRADING_PERIODS_PER_MONTH,
};
use crate::domain::universe::{parse_tickers, AssetClass, AssetClassEntry};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

const DEFAULT_OUTPUT: &str = "public/scan_results.json";
const DEFAULT_DATA_DIR: &str = "data";

#[derive(Parser, Debug)]
#[command(name = "seasonality", about = "Historical seasonality scanner")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a full seasonality scan and write the JSON snapshot
    Scan {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Anniversary reference date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        reference_date: Option<String>,
        #[arg(long)]
        workers: Option<usize>,
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
    /// Validate configuration and list permutations without fetching prices
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Print the price history of one ticker as JSON
    History {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        ticker: String,
        #[arg(long)]
        start_year: i32,
    },
}

/// CLI overrides applied on top of the `[scan]` section.
#[derive(Debug, Clone, Default)]
pub struct ScanOverrides {
    pub reference_date: Option<NaiveDate>,
    pub workers: Option<usize>,
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Scan {
            config,
            output,
            reference_date,
            workers,
            timeout_secs,
        } => {
            let reference_date = match reference_date
                .as_deref()
                .map(|s| parse_date(s, "reference_date"))
                .transpose()
            {
                Ok(d) => d,
                Err(e) => {
                    tracing::error!("{e}");
                    return (&e).into();
                }
            };
            let overrides = ScanOverrides {
                reference_date,
                workers,
            };
            run_scan(&config, output.as_deref(), &overrides, timeout_secs)
        }
        Command::Validate { config } => run_validate(&config),
        Command::History {
            config,
            ticker,
            start_year,
        } => run_history(&config, &ticker, start_year),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|err| {
        tracing::error!("{err}");
        ExitCode::from(&err)
    })
}

/// Directory that relative paths in the config file are resolved against.
fn config_dir(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default()
}

fn resolve_path(base: &Path, value: &str) -> PathBuf {
    let path = Path::new(value.trim());
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Build the immutable scan configuration. The reference date is captured
/// here, once per run.
pub fn build_scan_config(
    adapter: &dyn ConfigPort,
    overrides: &ScanOverrides,
) -> Result<ScanConfig, SeasonalityError> {
    validate_scan_config(adapter)?;

    let forward = parse_periods(adapter, "forward_months")?
        .unwrap_or_else(|| DEFAULT_FORWARD_MONTHS.to_vec());
    let lookback = parse_periods(adapter, "lookback_years")?
        .unwrap_or_else(|| DEFAULT_LOOKBACK_YEARS.to_vec());

    let max_workers = match overrides.workers {
        Some(0) => {
            return Err(SeasonalityError::ConfigInvalid {
                section: SCAN_SECTION.into(),
                key: "max_workers".into(),
                reason: "max_workers must be at least 1".into(),
            });
        }
        Some(w) => w,
        None => match parse_scan_int(adapter, "max_workers")? {
            Some(w) => usize::try_from(w).map_err(|_| SeasonalityError::ConfigInvalid {
                section: SCAN_SECTION.into(),
                key: "max_workers".into(),
                reason: format!("max_workers must be at least 1, got {}", w),
            })?,
            None => DEFAULT_MAX_WORKERS,
        },
    };

    let reference_date = match overrides.reference_date {
        Some(d) => d,
        None => match adapter.get_string(SCAN_SECTION, "reference_date") {
            Some(s) => parse_date(&s, "reference_date")?,
            None => chrono::Local::now().date_naive(),
        },
    };

    Ok(ScanConfig::new(forward, lookback, max_workers, reference_date))
}

/// Resolve every name in `[scan] asset_classes`. Problems with one asset
/// class produce an `Invalid` entry instead of an error.
pub fn load_asset_classes(adapter: &dyn ConfigPort, base_dir: &Path) -> Vec<AssetClassEntry> {
    adapter
        .get_list(SCAN_SECTION, "asset_classes")
        .unwrap_or_default()
        .into_iter()
        .map(|name| match load_asset_class(adapter, base_dir, &name) {
            Ok(class) => AssetClassEntry::Ready(class),
            Err(error) => AssetClassEntry::Invalid { name, error },
        })
        .collect()
}

fn load_asset_class(
    adapter: &dyn ConfigPort,
    base_dir: &Path,
    name: &str,
) -> Result<AssetClass, SeasonalityError> {
    let invalid = |reason: String| SeasonalityError::InvalidAssetClass {
        asset_class: name.to_string(),
        reason,
    };

    let tickers_file = adapter
        .get_string(name, "tickers_file")
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| invalid(format!("[{}] tickers_file is required", name)))?;
    let path = resolve_path(base_dir, &tickers_file);
    let content = fs::read_to_string(&path)
        .map_err(|e| invalid(format!("failed to read {}: {}", path.display(), e)))?;

    let periods = parse_int(adapter, name, "trading_periods_per_month")
        .map_err(invalid)?
        .unwrap_or(i64::from(DEFAULT_TRADING_PERIODS_PER_MONTH));
    let trading_periods_per_month = u32::try_from(periods)
        .ok()
        .filter(|p| *p > 0)
        .ok_or_else(|| invalid(format!("trading_periods_per_month must be positive, got {}", periods)))?;

    Ok(AssetClass {
        name: name.to_string(),
        tickers: parse_tickers(&content),
        trading_periods_per_month,
    })
}

pub fn output_path(
    adapter: &dyn ConfigPort,
    base_dir: &Path,
    override_path: Option<&Path>,
) -> PathBuf {
    match override_path {
        Some(p) => p.to_path_buf(),
        None => resolve_path(
            base_dir,
            &adapter
                .get_string(SCAN_SECTION, "output")
                .unwrap_or_else(|| DEFAULT_OUTPUT.to_string()),
        ),
    }
}

fn data_port_from_config(adapter: &dyn ConfigPort, base_dir: &Path) -> CsvAdapter {
    let data_dir = adapter
        .get_string(SCAN_SECTION, "data_dir")
        .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());
    CsvAdapter::new(resolve_path(base_dir, &data_dir))
}

fn run_scan(
    config_path: &Path,
    output_override: Option<&Path>,
    overrides: &ScanOverrides,
    timeout_override: Option<u64>,
) -> ExitCode {
    tracing::info!(path = %config_path.display(), "loading config");
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let scan_config = match build_scan_config(&adapter, overrides) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("{e}");
            return (&e).into();
        }
    };

    let base_dir = config_dir(config_path);
    let universe = load_asset_classes(&adapter, &base_dir);
    let output = output_path(&adapter, &base_dir, output_override);
    let data_port = data_port_from_config(&adapter, &base_dir);

    let file_timeout = match parse_scan_int(&adapter, "timeout_secs") {
        Ok(t) => t.and_then(|t| u64::try_from(t).ok()),
        Err(e) => {
            tracing::error!("{e}");
            return (&e).into();
        }
    };
    let timeout_secs = timeout_override.or(file_timeout).filter(|s| *s > 0);
    let cancel = match timeout_secs {
        Some(secs) => CancelToken::with_timeout(Duration::from_secs(secs)),
        None => CancelToken::new(),
    };

    run_scan_pipeline(&scan_config, &data_port, &universe, &output, cancel)
}

/// Run the orchestrator and publish its result. With no asset classes an
/// empty snapshot is still written.
pub fn run_scan_pipeline(
    scan_config: &ScanConfig,
    data_port: &(dyn DataPort + Sync),
    universe: &[AssetClassEntry],
    output: &Path,
    cancel: CancelToken,
) -> ExitCode {
    let mut orchestrator = ScanOrchestrator::new(scan_config, data_port).with_cancel_token(cancel);

    let (result, exit) = match orchestrator.run(universe) {
        Ok(report) => {
            for skipped in &report.skipped {
                tracing::warn!(
                    asset_class = %skipped.asset_class,
                    ticker = %skipped.ticker,
                    reason = %skipped.reason,
                    "instrument skipped"
                );
            }
            if report.cancelled {
                tracing::warn!("scan was cancelled before every instrument completed");
            }
            (report.result, ExitCode::SUCCESS)
        }
        Err(e) => {
            tracing::error!("{e}");
            (ScanResult::default(), ExitCode::from(&e))
        }
    };

    match JsonReportAdapter::new().write(&result, output) {
        Ok(()) => exit,
        Err(e) => {
            tracing::error!("failed to write results: {e}");
            (&e).into()
        }
    }
}

fn run_validate(config_path: &Path) -> ExitCode {
    tracing::info!(path = %config_path.display(), "validating config");
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let scan_config = match build_scan_config(&adapter, &ScanOverrides::default()) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("{e}");
            return (&e).into();
        }
    };

    let base_dir = config_dir(config_path);
    let universe = load_asset_classes(&adapter, &base_dir);
    if universe.is_empty() {
        let err = SeasonalityError::NoAssetClasses;
        tracing::error!("{err}");
        return (&err).into();
    }

    println!("reference date: {}", scan_config.reference_date);
    println!("fetch start:    {}", scan_config.fetch_start());
    println!("max workers:    {}", scan_config.max_workers);

    for entry in &universe {
        match entry {
            AssetClassEntry::Ready(class) => {
                let grid = PermutationGrid::new(&scan_config, class.trading_periods_per_month);
                println!(
                    "\n[{}] {} tickers, {} periods/month",
                    class.name,
                    class.count(),
                    class.trading_periods_per_month
                );
                println!("  permutations: {}", grid.keys().join(", "));
            }
            AssetClassEntry::Invalid { name, error } => {
                println!("\n[{}] INVALID: {}", name, error);
            }
        }
    }

    ExitCode::SUCCESS
}

fn run_history(config_path: &Path, ticker: &str, start_year: i32) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let scan_config = match build_scan_config(&adapter, &ScanOverrides::default()) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("{e}");
            return (&e).into();
        }
    };

    let Some(start) = NaiveDate::from_ymd_opt(start_year, 1, 1) else {
        let err = SeasonalityError::ConfigInvalid {
            section: "history".into(),
            key: "start_year".into(),
            reason: format!("{} is not a valid year", start_year),
        };
        tracing::error!("{err}");
        return (&err).into();
    };

    let data_port = data_port_from_config(&adapter, &config_dir(config_path));
    match history_json(&data_port, &ticker.to_uppercase(), start, scan_config.reference_date) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{e}");
            (&e).into()
        }
    }
}

/// `{ "YYYY-MM-DD": { "close": price }, ... }` for the usable samples of
/// `ticker` between `start` and `end`.
pub fn history_json(
    data_port: &dyn DataPort,
    ticker: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<String, SeasonalityError> {
    let history = data_port.fetch_history(ticker, start, end)?;
    let series = PriceSeries::from_raw(ticker, history)?;

    let rows: IndexMap<String, IndexMap<&str, f64>> = series
        .samples()
        .iter()
        .map(|s| {
            let mut row = IndexMap::new();
            row.insert("close", s.price);
            (s.date.format("%Y-%m-%d").to_string(), row)
        })
        .collect();

    Ok(serde_json::to_string(&rows)?)
}
