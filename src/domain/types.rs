//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during feature assembly
//! - exported to JSON/CSV
//! - reloaded later for forecasting or comparisons

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Training data is truncated to calendar years strictly before this year;
/// everything at or after it belongs to the forecast horizon.
pub const TRAIN_CUTOFF_YEAR: i32 = 2023;

/// Guard subtracted from every positional shift offset so that lagged columns
/// stay clear of the very tail of the in-range history.
pub const SHIFT_GUARD: usize = 10;

/// The regression target: per-day aggregate sales.
pub const TARGET_COLUMN: &str = "total_sales";

/// Names of the three reduced entity-signal components.
pub const SIGNAL_COLUMNS: [&str; 3] = ["S1", "S2", "S3"];

/// The merged federal-holiday flag. The spelling is kept as-is because
/// previously exported datasets already carry this column name.
pub const HOLIDAY_COLUMN: &str = "fedral_holiday";

/// Raw promotional-event label column (before one-hot encoding).
pub const EVENT_COLUMN: &str = "Amazon Events";

/// Expected-inflation column merged from an external series during training
/// and held at a caller-supplied rate across forecast horizons.
pub const INFLATION_COLUMN: &str = "inflation_rate";

/// Sentinel label for days with no promotional event.
pub const NO_EVENTS_LABEL: &str = "No Events";

/// Internal marker column separating history from the forecast horizon inside
/// a combined frame. Never part of the feature contract.
pub const FORECAST_FLAG_COLUMN: &str = "forecasting";

/// Historic-lag steps: (column suffix, cutoff year fed to the lag engine).
///
/// "NYA" reads "N years ago". The cutoffs are positional anchors, not
/// calendar subtractions: `Sales 1YA` right-aligns the subsequence of rows
/// with year <= 2021 into the full series, and so on.
pub const LAG_STEPS: [(&str, i32); 3] = [("1YA", 2021), ("2YA", 2020), ("3YA", 2019)];

/// Which entity dimension drives the reduced sales-signal components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    State,
    Category,
}

impl EntityKind {
    /// Column holding this entity in the preprocessed purchases table.
    pub fn column_name(self) -> &'static str {
        match self {
            EntityKind::State => "Shipping Address State",
            EntityKind::Category => "Category",
        }
    }
}

/// A single preprocessed purchase record.
///
/// The preprocessing collaborator has already resolved product/category joins
/// and removed malformed rows; here we only need the date, the sale amount,
/// and the entity labels used for the pivoted signal features.
#[derive(Debug, Clone)]
pub struct PurchaseRow {
    pub date: NaiveDate,
    pub state: Option<String>,
    pub category: Option<String>,
    pub total_sales: f64,
}

/// Configuration for a `train` run, derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct TrainConfig {
    pub purchases_path: PathBuf,
    /// Optional pre-2022 holiday table CSV (`Date` column). When absent, only
    /// the built-in post-2021 federal list contributes to `fedral_holiday`.
    pub holidays_path: Option<PathBuf>,
    /// Optional inflation-series CSV (`observation_date` plus a rate column).
    /// When absent, the matrix carries no `inflation_rate` column.
    pub inflation_path: Option<PathBuf>,
    /// Restrict the run to a single state or category before aggregation.
    pub entity_name: Option<String>,
    pub entity_kind: EntityKind,
    pub export_matrix: Option<PathBuf>,
    pub export_summary: Option<PathBuf>,
}

/// Configuration for a `forecast` run.
#[derive(Debug, Clone)]
pub struct ForecastConfig {
    /// Previously exported training matrix CSV.
    pub processed_path: PathBuf,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Expected inflation rate assumed across the horizon. Required when the
    /// historical matrix carries an `inflation_rate` column.
    pub expected_inflation: Option<f64>,
    pub export_predictions: Option<PathBuf>,
}

/// Portable description of one assembly run (exported as JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub tool: String,
    pub mode: RunMode,
    pub rows: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    /// The sorted feature contract handed to the model layer.
    pub feature_columns: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    Train,
    Forecast,
}
