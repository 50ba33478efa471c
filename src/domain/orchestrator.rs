//! Scan orchestration across asset classes.
//!
//! Instruments of an asset class run on a bounded rayon pool. Each task owns
//! its [`InstrumentOutcome`]; outcomes come back in ticker order and are
//! merged sequentially, so bucket order is ticker order whatever the worker
//! count. A failing instrument becomes a [`SkippedTicker`] and an invalid
//! asset class an empty entry; only a configuration with no asset classes at
//! all fails the run.

use crate::domain::error::SeasonalityError;
use crate::domain::permutation::PermutationGrid;
use crate::domain::returns::MetricsRecord;
use crate::domain::scan_config::ScanConfig;
use crate::domain::scanner::{InstrumentOutcome, InstrumentScanner};
use crate::domain::universe::{AssetClass, AssetClassEntry, SkipReason, SkippedTicker};
use crate::ports::data_port::DataPort;
use indexmap::IndexMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Permutation key -> records, in instrument order.
pub type PermutationBuckets = IndexMap<String, Vec<MetricsRecord>>;

/// Asset class -> permutation buckets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScanResult {
    pub asset_classes: IndexMap<String, PermutationBuckets>,
}

impl ScanResult {
    pub fn get(&self, asset_class: &str, key: &str) -> Option<&[MetricsRecord]> {
        self.asset_classes
            .get(asset_class)
            .and_then(|buckets| buckets.get(key))
            .map(Vec::as_slice)
    }

    pub fn record_count(&self) -> usize {
        self.asset_classes
            .values()
            .flat_map(|buckets| buckets.values())
            .map(Vec::len)
            .sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanReport {
    pub result: ScanResult,
    pub skipped: Vec<SkippedTicker>,
    pub invalid_asset_classes: Vec<String>,
    pub instruments_scanned: usize,
    pub cancelled: bool,
}

/// Cooperative cancellation shared by all tasks of a run.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            deadline: Instant::now().checked_add(timeout),
        }
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        if self.flag.load(Ordering::SeqCst) {
            return true;
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => {
                self.flag.store(true, Ordering::SeqCst);
                true
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Done,
}

pub struct ScanOrchestrator<'a> {
    config: &'a ScanConfig,
    data_port: &'a (dyn DataPort + Sync),
    cancel: CancelToken,
    state: RunState,
}

impl<'a> ScanOrchestrator<'a> {
    pub fn new(config: &'a ScanConfig, data_port: &'a (dyn DataPort + Sync)) -> Self {
        Self {
            config,
            data_port,
            cancel: CancelToken::new(),
            state: RunState::Idle,
        }
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn run(&mut self, universe: &[AssetClassEntry]) -> Result<ScanReport, SeasonalityError> {
        if self.state != RunState::Idle {
            return Err(SeasonalityError::ScanAlreadyRun);
        }
        if universe.is_empty() {
            tracing::error!("no asset classes configured, nothing to scan");
            self.state = RunState::Done;
            return Err(SeasonalityError::NoAssetClasses);
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.max_workers)
            .thread_name(|i| format!("scan-worker-{}", i))
            .build()
            .map_err(|e| SeasonalityError::WorkerPool {
                reason: e.to_string(),
            })?;

        self.state = RunState::Running;
        tracing::info!(
            reference_date = %self.config.reference_date,
            asset_classes = universe.len(),
            max_workers = self.config.max_workers,
            "starting seasonality scan"
        );

        let mut report = ScanReport::default();

        for entry in universe {
            match entry {
                AssetClassEntry::Ready(class) => {
                    let buckets = self.scan_asset_class(&pool, class, &mut report);
                    report.result.asset_classes.insert(class.name.clone(), buckets);
                }
                AssetClassEntry::Invalid { name, error } => {
                    tracing::warn!(asset_class = %name, error = %error, "skipping asset class");
                    report
                        .result
                        .asset_classes
                        .insert(name.clone(), PermutationBuckets::new());
                    report.invalid_asset_classes.push(name.clone());
                }
            }
        }

        report.cancelled = self.cancel.is_cancelled();
        self.state = RunState::Done;

        tracing::info!(
            instruments = report.instruments_scanned,
            skipped = report.skipped.len(),
            records = report.result.record_count(),
            cancelled = report.cancelled,
            "scan complete"
        );

        Ok(report)
    }

    fn scan_asset_class(
        &self,
        pool: &rayon::ThreadPool,
        class: &AssetClass,
        report: &mut ScanReport,
    ) -> PermutationBuckets {
        let grid = PermutationGrid::new(self.config, class.trading_periods_per_month);
        let mut buckets: PermutationBuckets =
            grid.keys().into_iter().map(|k| (k, Vec::new())).collect();

        tracing::info!(
            asset_class = %class.name,
            tickers = class.count(),
            permutations = grid.len(),
            "scanning asset class"
        );

        let scanner = InstrumentScanner::new(
            self.data_port,
            &grid,
            self.config.fetch_start(),
            self.config.reference_date,
            &self.cancel,
        );

        let outcomes: Vec<InstrumentOutcome> = pool.install(|| {
            class
                .tickers
                .par_iter()
                .map(|ticker| scanner.scan(ticker))
                .collect()
        });

        let skipped_before = report.skipped.len();
        for outcome in outcomes {
            merge_outcome(&mut buckets, &class.name, outcome, report);
        }

        tracing::info!(
            asset_class = %class.name,
            records = buckets.values().map(Vec::len).sum::<usize>(),
            skipped = report.skipped.len() - skipped_before,
            "finished asset class"
        );

        buckets
    }
}

fn merge_outcome(
    buckets: &mut PermutationBuckets,
    asset_class: &str,
    outcome: InstrumentOutcome,
    report: &mut ScanReport,
) {
    match outcome.result {
        Ok(records) => {
            tracing::info!(
                asset_class,
                ticker = %outcome.ticker,
                records = records.len(),
                "finished all permutations"
            );
            for keyed in records {
                buckets.entry(keyed.key).or_default().push(keyed.record);
            }
            report.instruments_scanned += 1;
        }
        Err(e) => {
            tracing::warn!(asset_class, ticker = %outcome.ticker, error = %e, "skipping instrument");
            report.skipped.push(SkippedTicker {
                asset_class: asset_class.to_string(),
                ticker: outcome.ticker,
                reason: SkipReason::from(&e),
            });
        }
    }
}
