//! CSV/JSON input and output.

pub mod export;
pub mod ingest;

pub use export::{write_matrix_csv, write_predictions_csv, write_summary_json};
pub use ingest::{load_holiday_table, load_processed_frame, load_purchases, IngestedPurchases};
