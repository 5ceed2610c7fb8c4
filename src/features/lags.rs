//! Historic sales lag engine.
//!
//! Lags here are POSITIONAL: "the sales value from N years ago" means the
//! value at the same index position inside the subsequence of rows whose
//! calendar year is at or before a cutoff, right-aligned into the full
//! series. Calendar-day subtraction would drift away from these columns
//! whenever the history has gaps, and the shift-offset arithmetic for the
//! reduced signal columns is calibrated against the positional form, so both
//! must use the same mechanism.

use chrono::{Datelike, NaiveDate};

use crate::domain::{FeatureFrame, LAG_STEPS, SHIFT_GUARD, TARGET_COLUMN};
use crate::error::AppError;

/// Build a positional lag column for `target`.
///
/// The values of rows with `year <= year_till` are right-aligned into the
/// series; the first `len - m` cells are missing. A cutoff older than all
/// data yields an all-missing column, not an error.
pub fn historic_sales_lag(
    frame: &FeatureFrame,
    target: &str,
    year_till: i32,
) -> Result<Vec<Option<f64>>, AppError> {
    let values = frame.require_column(target)?;
    let past: Vec<Option<f64>> = frame
        .dates()
        .iter()
        .zip(values)
        .filter(|(d, _)| d.year() <= year_till)
        .map(|(_, v)| *v)
        .collect();

    let mut lag: Vec<Option<f64>> = vec![None; frame.len() - past.len()];
    lag.extend(past);
    Ok(lag)
}

/// Add the `Sales 1YA` / `Sales 2YA` / `Sales 3YA` columns.
pub fn add_sales_lags(mut frame: FeatureFrame) -> Result<FeatureFrame, AppError> {
    for (suffix, year_till) in LAG_STEPS {
        let lag = historic_sales_lag(&frame, TARGET_COLUMN, year_till)?;
        frame.insert(&format!("Sales {suffix}"), lag)?;
    }
    Ok(frame)
}

/// Positional shift used for the reduced signal columns.
///
/// The offset is the index distance from the last date at-or-before
/// `year_till` to the last in-range historical row (`last_hist_pos`), minus
/// the guard constant. The result can be negative when the history is
/// shorter than the requested lag; a negative shift moves values up and
/// leaves the tail missing, so a history much shorter than the lag produces
/// an all-missing column. `None` when no date falls at or before the cutoff.
pub fn shift_offset(dates: &[NaiveDate], year_till: i32, last_hist_pos: usize) -> Option<isize> {
    let cut = dates.iter().rposition(|d| d.year() <= year_till)?;
    Some(last_hist_pos as isize - cut as isize - SHIFT_GUARD as isize)
}

/// Shift a column by `n` positions: positive shifts move values down (the
/// first `n` cells become missing), negative shifts move values up (the last
/// `|n|` cells become missing).
pub fn shift_column(values: &[Option<f64>], n: isize) -> Vec<Option<f64>> {
    let len = values.len() as isize;
    (0..len)
        .map(|i| {
            let src = i - n;
            if src >= 0 && src < len {
                values[src as usize]
            } else {
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn sales_frame() -> FeatureFrame {
        FeatureFrame::from_series(
            TARGET_COLUMN,
            vec![
                (d(2018, 1, 1), 100.0),
                (d(2019, 1, 1), 200.0),
                (d(2020, 1, 1), 300.0),
                (d(2021, 1, 2), 400.0),
                (d(2022, 1, 3), 500.0),
            ],
        )
        .unwrap()
    }

    #[test]
    fn lag_right_aligns_in_range_subsequence() {
        // 4 of 5 rows fall at or before 2021: one leading missing cell, then
        // the in-range values order-preserved.
        let lag = historic_sales_lag(&sales_frame(), TARGET_COLUMN, 2021).unwrap();
        assert_eq!(
            lag,
            vec![None, Some(100.0), Some(200.0), Some(300.0), Some(400.0)]
        );
    }

    #[test]
    fn lag_pads_exactly_len_minus_m_cells() {
        let lag = historic_sales_lag(&sales_frame(), TARGET_COLUMN, 2019).unwrap();
        assert_eq!(lag, vec![None, None, None, Some(100.0), Some(200.0)]);
    }

    #[test]
    fn cutoff_before_all_data_yields_all_missing() {
        let lag = historic_sales_lag(&sales_frame(), TARGET_COLUMN, 2016).unwrap();
        assert_eq!(lag, vec![None; 5]);
    }

    #[test]
    fn cutoff_covering_everything_returns_the_series() {
        let lag = historic_sales_lag(&sales_frame(), TARGET_COLUMN, 2022).unwrap();
        assert_eq!(
            lag,
            vec![Some(100.0), Some(200.0), Some(300.0), Some(400.0), Some(500.0)]
        );
    }

    #[test]
    fn add_sales_lags_emits_all_three_columns() {
        let frame = add_sales_lags(sales_frame()).unwrap();
        assert!(frame.has_column("Sales 1YA"));
        assert!(frame.has_column("Sales 2YA"));
        assert!(frame.has_column("Sales 3YA"));
    }

    #[test]
    fn shift_offset_subtracts_guard_and_can_go_negative() {
        // 30 daily rows in 2021, then 20 in 2022: distance from the last 2021
        // row (position 29) to the last row (position 49) is 20, minus the
        // guard of 10 leaves 10.
        let mut dates: Vec<NaiveDate> = (1..=30).map(|day| d(2021, 1, day)).collect();
        dates.extend((1..=20).map(|day| d(2022, 1, day)));

        assert_eq!(shift_offset(&dates, 2021, 49), Some(10));
        // Distance smaller than the guard goes negative (upward shift).
        assert_eq!(shift_offset(&dates, 2022, 49), Some(-10));
        // Cutoff before all data: degenerate.
        assert_eq!(shift_offset(&dates, 2019, 49), None);
    }

    #[test]
    fn shift_column_moves_values_both_directions() {
        let values = vec![Some(1.0), Some(2.0), Some(3.0)];
        assert_eq!(shift_column(&values, 0), values);
        assert_eq!(shift_column(&values, 2), vec![None, None, Some(1.0)]);
        assert_eq!(shift_column(&values, 5), vec![None, None, None]);
        assert_eq!(shift_column(&values, -1), vec![Some(2.0), Some(3.0), None]);
        assert_eq!(shift_column(&values, -4), vec![None, None, None]);
    }
}
