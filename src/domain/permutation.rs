//! Lookback x forward permutation grid for one asset class.

use crate::domain::scan_config::{lookback_cutoff, ScanConfig};
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permutation {
    pub forward_months: u32,
    pub lookback_years: u32,
    /// Forward window length in samples.
    pub forward_periods: usize,
}

impl Permutation {
    pub fn key(&self) -> String {
        permutation_key(self.forward_months, self.lookback_years)
    }
}

/// All permutations sharing one lookback window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookbackWindow {
    pub years: u32,
    pub cutoff: NaiveDate,
    pub permutations: Vec<Permutation>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermutationGrid {
    windows: Vec<LookbackWindow>,
}

impl PermutationGrid {
    pub fn new(config: &ScanConfig, trading_periods_per_month: u32) -> Self {
        let windows = config
            .lookback_periods_years
            .iter()
            .map(|&years| LookbackWindow {
                years,
                cutoff: lookback_cutoff(config.reference_date, years),
                permutations: config
                    .forward_periods_months
                    .iter()
                    .map(|&forward_months| Permutation {
                        forward_months,
                        lookback_years: years,
                        forward_periods: forward_months as usize
                            * trading_periods_per_month as usize,
                    })
                    .collect(),
            })
            .collect();
        Self { windows }
    }

    /// Lookback windows, longest first.
    pub fn windows(&self) -> &[LookbackWindow] {
        &self.windows
    }

    pub fn permutations(&self) -> impl Iterator<Item = &Permutation> {
        self.windows.iter().flat_map(|w| w.permutations.iter())
    }

    /// Keys in output order: lookback descending, then forward ascending.
    pub fn keys(&self) -> Vec<String> {
        self.permutations().map(Permutation::key).collect()
    }

    pub fn len(&self) -> usize {
        self.windows.iter().map(|w| w.permutations.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn permutation_key(forward_months: u32, lookback_years: u32) -> String {
    format!("{}m_{}y", forward_months, lookback_years)
}
