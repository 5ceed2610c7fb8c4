//! Export feature matrices, predictions, and run summaries.
//!
//! The matrix CSV round-trips through `ingest::load_processed_frame`: the
//! first column is `date`, missing values are empty cells, and the remaining
//! headers are the frame's sorted column names verbatim.

use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;

use crate::domain::{FeatureFrame, RunSummary};
use crate::error::AppError;

/// Write a feature frame to CSV.
pub fn write_matrix_csv(path: &Path, frame: &FeatureFrame) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::schema(format!("Failed to create matrix CSV '{}': {e}", path.display()))
    })?;
    let mut writer = csv::Writer::from_writer(file);

    let names = frame.column_names();
    let mut header: Vec<&str> = vec!["date"];
    header.extend(names.iter().map(String::as_str));
    writer
        .write_record(&header)
        .map_err(|e| AppError::schema(format!("Failed to write matrix CSV header: {e}")))?;

    let columns: Vec<&[Option<f64>]> = names
        .iter()
        .map(|name| frame.require_column(name))
        .collect::<Result<_, _>>()?;

    for (row, date) in frame.dates().iter().enumerate() {
        let mut record: Vec<String> = Vec::with_capacity(1 + columns.len());
        record.push(date.to_string());
        for col in &columns {
            record.push(match col[row] {
                Some(v) => format_cell(v),
                None => String::new(),
            });
        }
        writer
            .write_record(&record)
            .map_err(|e| AppError::schema(format!("Failed to write matrix CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::schema(format!("Failed to flush matrix CSV: {e}")))
}

/// Write per-day predictions to CSV.
pub fn write_predictions_csv(
    path: &Path,
    dates: &[NaiveDate],
    predictions: &[f64],
) -> Result<(), AppError> {
    if dates.len() != predictions.len() {
        return Err(AppError::internal(
            "Prediction export length mismatch between dates and values.",
        ));
    }

    let file = File::create(path).map_err(|e| {
        AppError::schema(format!("Failed to create predictions CSV '{}': {e}", path.display()))
    })?;
    let mut writer = csv::Writer::from_writer(file);

    writer
        .write_record(["date", "predicted_sales"])
        .map_err(|e| AppError::schema(format!("Failed to write predictions header: {e}")))?;
    for (date, value) in dates.iter().zip(predictions) {
        writer
            .write_record([date.to_string(), format!("{value:.4}")])
            .map_err(|e| AppError::schema(format!("Failed to write predictions row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::schema(format!("Failed to flush predictions CSV: {e}")))
}

/// Write the run summary as pretty-printed JSON.
pub fn write_summary_json(path: &Path, summary: &RunSummary) -> Result<(), AppError> {
    let json = serde_json::to_string_pretty(summary)
        .map_err(|e| AppError::internal(format!("Failed to serialize run summary: {e}")))?;
    std::fs::write(path, json).map_err(|e| {
        AppError::schema(format!("Failed to write run summary '{}': {e}", path.display()))
    })
}

/// Full-precision for round-tripping, but trim integral values so the flag
/// and calendar columns stay readable.
fn format_cell(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        let mut s = format!("{v:.10}");
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::ingest::load_processed_frame;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn cell_formatting() {
        assert_eq!(format_cell(1.0), "1");
        assert_eq!(format_cell(0.0), "0");
        assert_eq!(format_cell(12.5), "12.5");
        assert_eq!(format_cell(0.3333333333), "0.3333333333");
    }

    #[test]
    fn matrix_round_trip() {
        let mut frame = FeatureFrame::new(vec![d(2023, 1, 1), d(2023, 1, 2)]).unwrap();
        frame
            .insert("Sales 1YA", vec![None, Some(10.25)])
            .unwrap();
        frame
            .insert("fedral_holiday", vec![Some(1.0), Some(0.0)])
            .unwrap();

        let path = std::env::temp_dir().join("salesfc-matrix-round-trip.csv");
        write_matrix_csv(&path, &frame).unwrap();
        let loaded = load_processed_frame(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.dates(), frame.dates());
        assert_eq!(loaded.column("Sales 1YA"), frame.column("Sales 1YA"));
        assert_eq!(loaded.column("fedral_holiday"), frame.column("fedral_holiday"));
    }
}
