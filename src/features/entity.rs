//! Dimensionality-reduced entity signal engine.
//!
//! Per-state (or per-category) daily sales carry signal the aggregate series
//! loses, but one column per entity would explode the feature count. Instead
//! the raw transactions are pivoted to a (date × entity) matrix, min-max
//! scaled per entity, and projected onto three principal components named
//! `S1`/`S2`/`S3`. Lagged variants of the components are produced with the
//! same positional-shift mechanism as the sales lags.
//!
//! The scaler and PCA are fit once on the window they transform and are not
//! persisted; this is a deliberate simplification, not a leakage guard.

use std::collections::{BTreeMap, BTreeSet};

use chrono::Datelike;
use nalgebra::DMatrix;

use crate::domain::{EntityKind, FeatureFrame, LAG_STEPS, PurchaseRow, SIGNAL_COLUMNS};
use crate::error::AppError;
use crate::features::lags::{shift_column, shift_offset};
use crate::math::{MinMaxScaler, Pca};

/// Pivot, scale, and reduce per-entity sales into the `S1`/`S2`/`S3` frame.
///
/// Only rows dated strictly before `cutoff_year` participate; rows without an
/// entity label are skipped (the preprocessing collaborator drops those, but
/// the pivot tolerates them regardless).
pub fn entity_signal_frame(
    purchases: &[PurchaseRow],
    kind: EntityKind,
    cutoff_year: i32,
) -> Result<FeatureFrame, AppError> {
    let mut dates = BTreeSet::new();
    let mut entities = BTreeSet::new();
    for row in purchases {
        if row.date.year() >= cutoff_year {
            continue;
        }
        if let Some(label) = entity_label(row, kind) {
            dates.insert(row.date);
            entities.insert(label.to_string());
        }
    }

    if dates.is_empty() || entities.is_empty() {
        return Err(AppError::degenerate(
            format!(
                "No `{}` labels available to build entity signal features.",
                kind.column_name()
            ),
        ));
    }

    let date_pos: BTreeMap<_, _> = dates.iter().enumerate().map(|(i, d)| (*d, i)).collect();
    let entity_pos: BTreeMap<_, _> = entities.iter().enumerate().map(|(j, e)| (e.clone(), j)).collect();

    // (date × entity) summed sales; missing combinations stay zero.
    let mut pivot = DMatrix::<f64>::zeros(dates.len(), entities.len());
    for row in purchases {
        if row.date.year() >= cutoff_year {
            continue;
        }
        let Some(label) = entity_label(row, kind) else {
            continue;
        };
        let i = date_pos[&row.date];
        let j = entity_pos[label];
        pivot[(i, j)] += row.total_sales;
    }

    let scaled = MinMaxScaler::fit_transform(&pivot);
    let scores = Pca::fit_transform(&scaled, SIGNAL_COLUMNS.len())?;

    let mut frame = FeatureFrame::new(dates.into_iter().collect())?;
    for (k, name) in SIGNAL_COLUMNS.iter().enumerate() {
        let column: Vec<Option<f64>> = (0..scores.nrows()).map(|i| Some(scores[(i, k)])).collect();
        frame.insert(name, column)?;
    }
    Ok(frame)
}

/// Add `S{k} 1YA` / `2YA` / `3YA` columns by positionally shifting each
/// component column.
///
/// `last_hist_pos` is the index of the last in-range historical row: the last
/// row overall during training, the last pre-horizon row when the frame is a
/// combined history+horizon series. A degenerate cutoff (no date at or
/// before it) yields all-missing lag columns.
pub fn add_signal_lags(
    mut frame: FeatureFrame,
    last_hist_pos: usize,
) -> Result<FeatureFrame, AppError> {
    for (suffix, year_till) in LAG_STEPS {
        let offset = shift_offset(frame.dates(), year_till, last_hist_pos);
        for name in SIGNAL_COLUMNS {
            let values = frame.require_column(name)?;
            let shifted = match offset {
                Some(n) => shift_column(values, n),
                None => vec![None; values.len()],
            };
            frame.insert(&format!("{name} {suffix}"), shifted)?;
        }
    }
    Ok(frame)
}

fn entity_label(row: &PurchaseRow, kind: EntityKind) -> Option<&str> {
    match kind {
        EntityKind::State => row.state.as_deref(),
        EntityKind::Category => row.category.as_deref(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn purchase(date: NaiveDate, state: &str, amount: f64) -> PurchaseRow {
        PurchaseRow {
            date,
            state: Some(state.to_string()),
            category: Some("ABIS_BOOK".to_string()),
            total_sales: amount,
        }
    }

    #[test]
    fn signal_frame_has_three_components_per_date() {
        let rows = vec![
            purchase(d(2020, 1, 1), "CA", 10.0),
            purchase(d(2020, 1, 1), "NY", 5.0),
            purchase(d(2020, 1, 2), "CA", 20.0),
            purchase(d(2020, 1, 3), "TX", 7.0),
        ];
        let frame = entity_signal_frame(&rows, EntityKind::State, 2023).unwrap();
        assert_eq!(frame.len(), 3);
        for name in SIGNAL_COLUMNS {
            assert!(frame.column(name).unwrap().iter().all(Option::is_some));
        }
    }

    #[test]
    fn cutoff_excludes_recent_years_from_the_pivot() {
        let rows = vec![
            purchase(d(2020, 1, 1), "CA", 10.0),
            purchase(d(2023, 1, 1), "CA", 99.0),
        ];
        let frame = entity_signal_frame(&rows, EntityKind::State, 2023).unwrap();
        assert_eq!(frame.dates(), &[d(2020, 1, 1)]);
    }

    #[test]
    fn missing_labels_are_a_degenerate_data_error() {
        let rows = vec![PurchaseRow {
            date: d(2020, 1, 1),
            state: None,
            category: None,
            total_sales: 1.0,
        }];
        assert!(entity_signal_frame(&rows, EntityKind::State, 2023).is_err());
    }

    #[test]
    fn signal_lags_are_fully_missing_without_enough_history() {
        // Three dates, all in 2020: the 3YA cutoff (2019) precedes the data,
        // so every `S* 3YA` cell must be missing.
        let rows = vec![
            purchase(d(2020, 1, 1), "CA", 10.0),
            purchase(d(2020, 1, 2), "NY", 5.0),
            purchase(d(2020, 1, 3), "TX", 7.0),
        ];
        let frame = entity_signal_frame(&rows, EntityKind::State, 2023).unwrap();
        let last = frame.len() - 1;
        let frame = add_signal_lags(frame, last).unwrap();
        for name in SIGNAL_COLUMNS {
            let lag = frame.column(&format!("{name} 3YA")).unwrap();
            assert!(lag.iter().all(Option::is_none));
        }
    }
}
