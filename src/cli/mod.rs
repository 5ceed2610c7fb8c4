//! Command-line parsing for the sales feature-assembly tool.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the feature/model code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::domain::EntityKind;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "salesfc", version, about = "Daily sales feature assembly and forecasting")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Assemble the training matrix from a purchase-history CSV and fit the
    /// baseline model.
    Train(TrainArgs),
    /// Build horizon features from an exported matrix and predict daily sales.
    Forecast(ForecastArgs),
    /// Run the full train + forecast loop on seeded synthetic purchases.
    Demo(DemoArgs),
}

/// Options for `salesfc train`.
#[derive(Debug, Parser, Clone)]
pub struct TrainArgs {
    /// Purchase-history CSV (raw export or preprocessed).
    #[arg(short = 'p', long, value_name = "CSV")]
    pub purchases: PathBuf,

    /// Optional pre-2022 holiday table CSV with a `Date` column.
    #[arg(long, value_name = "CSV")]
    pub holidays: Option<PathBuf>,

    /// Optional inflation-series CSV (`observation_date` plus `inflation_rate`
    /// or `T10YIEM`).
    #[arg(long, value_name = "CSV")]
    pub inflation: Option<PathBuf>,

    /// Restrict the run to a single entity before aggregation.
    #[arg(long, value_name = "NAME")]
    pub entity: Option<String>,

    /// Entity dimension for the reduced signal columns.
    #[arg(long, value_enum, default_value_t = EntityKind::State)]
    pub entity_kind: EntityKind,

    /// Export the assembled matrix to CSV (needed later by `forecast`).
    #[arg(long = "export-matrix", value_name = "CSV")]
    pub export_matrix: Option<PathBuf>,

    /// Export the run summary to JSON.
    #[arg(long = "export-summary", value_name = "JSON")]
    pub export_summary: Option<PathBuf>,

    /// Show the top-N coefficients by magnitude.
    #[arg(long, default_value_t = 15)]
    pub top: usize,
}

/// Options for `salesfc forecast`.
#[derive(Debug, Parser, Clone)]
pub struct ForecastArgs {
    /// Training matrix CSV previously written by `train --export-matrix`.
    #[arg(short = 'm', long, value_name = "CSV")]
    pub matrix: PathBuf,

    /// First day of the forecast horizon (YYYY-MM-DD).
    #[arg(long)]
    pub start: NaiveDate,

    /// Last day of the forecast horizon, inclusive (YYYY-MM-DD).
    #[arg(long)]
    pub end: NaiveDate,

    /// Expected inflation rate assumed across the horizon. Required when the
    /// matrix carries an `inflation_rate` column.
    #[arg(long = "expected-inflation", value_name = "RATE")]
    pub expected_inflation: Option<f64>,

    /// Export per-day predictions to CSV.
    #[arg(long = "export-predictions", value_name = "CSV")]
    pub export_predictions: Option<PathBuf>,
}

/// Options for `salesfc demo`.
#[derive(Debug, Parser, Clone)]
pub struct DemoArgs {
    /// First synthetic purchase day.
    #[arg(long, default_value = "2018-01-01")]
    pub start: NaiveDate,

    /// Last synthetic purchase day, inclusive.
    #[arg(long, default_value = "2022-12-31")]
    pub end: NaiveDate,

    /// Days to forecast past the training cutoff.
    #[arg(long, default_value_t = 30)]
    pub horizon_days: u32,

    /// Random seed for sample generation.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Entity dimension for the reduced signal columns.
    #[arg(long, value_enum, default_value_t = EntityKind::State)]
    pub entity_kind: EntityKind,

    /// Show the top-N coefficients by magnitude.
    #[arg(long, default_value_t = 15)]
    pub top: usize,
}
