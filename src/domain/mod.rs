//! Core domain types and logic.

pub mod price_series;
pub mod returns;
pub mod scan_config;
pub mod permutation;
pub mod universe;
pub mod scanner;
pub mod orchestrator;
pub mod config_validation;
pub mod error;
