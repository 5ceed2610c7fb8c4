//! Formatted terminal output for train and forecast runs.
//!
//! We keep formatting code in one place so:
//! - the assembly/model code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

pub mod format;

pub use format::{format_forecast_summary, format_train_summary, rank_coefficients};
