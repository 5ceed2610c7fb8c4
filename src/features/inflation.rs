//! Expected-inflation merge.
//!
//! The inflation input is a sparse dated series (typically one observation
//! per month). It is left-joined onto the daily matrix by exact date and the
//! gaps are then filled by positional linear interpolation: rows before the
//! first observation stay missing, rows between two observations interpolate
//! linearly by row position, and rows after the last observation hold its
//! value. Forecast horizons carry a single caller-supplied expected rate
//! instead of a series.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::{FeatureFrame, INFLATION_COLUMN};
use crate::error::AppError;

/// A dated expected-inflation series.
#[derive(Debug, Clone, Default)]
pub struct InflationSeries {
    rates: BTreeMap<NaiveDate, f64>,
}

impl InflationSeries {
    /// Build a series from dated observations. Duplicate dates keep the last
    /// observation.
    pub fn from_observations(observations: impl IntoIterator<Item = (NaiveDate, f64)>) -> Self {
        Self {
            rates: observations.into_iter().collect(),
        }
    }

    /// The rate observed exactly on `date`, if any.
    pub fn rate_on(&self, date: NaiveDate) -> Option<f64> {
        self.rates.get(&date).copied()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

/// Left-join the series onto the frame as an `inflation_rate` column and
/// interpolate the gaps between observations.
pub fn merge_inflation(
    mut frame: FeatureFrame,
    series: &InflationSeries,
) -> Result<FeatureFrame, AppError> {
    if series.is_empty() {
        return Err(AppError::degenerate("Inflation series has no observations."));
    }
    let joined: Vec<Option<f64>> = frame.dates().iter().map(|d| series.rate_on(*d)).collect();
    frame.insert(INFLATION_COLUMN, interpolate_gaps(joined))?;
    Ok(frame)
}

/// Fill the `inflation_rate` column with one expected rate for every row.
///
/// Forecast horizons have no observed series yet, so the caller supplies the
/// rate to assume across the whole range.
pub fn constant_inflation(mut frame: FeatureFrame, rate: f64) -> Result<FeatureFrame, AppError> {
    let n = frame.len();
    frame.insert(INFLATION_COLUMN, vec![Some(rate); n])?;
    Ok(frame)
}

/// Positional linear interpolation over the missing cells.
///
/// Leading missing cells stay missing; interior runs interpolate between the
/// surrounding observations by row position; trailing cells hold the last
/// observed value.
fn interpolate_gaps(mut values: Vec<Option<f64>>) -> Vec<Option<f64>> {
    let known: Vec<(usize, f64)> = values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|v| (i, v)))
        .collect();
    let Some(&(last_pos, last_value)) = known.last() else {
        return values;
    };

    for pair in known.windows(2) {
        let (left, left_value) = pair[0];
        let (right, right_value) = pair[1];
        let span = (right - left) as f64;
        for (i, slot) in values.iter_mut().enumerate().take(right).skip(left + 1) {
            let t = (i - left) as f64 / span;
            *slot = Some(left_value + (right_value - left_value) * t);
        }
    }
    for slot in values.iter_mut().skip(last_pos + 1) {
        *slot = Some(last_value);
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn daily_frame(start: NaiveDate, days: usize) -> FeatureFrame {
        let dates: Vec<NaiveDate> = (0..days)
            .map(|i| start + chrono::Days::new(i as u64))
            .collect();
        FeatureFrame::new(dates).unwrap()
    }

    #[test]
    fn interior_gaps_interpolate_by_row_position() {
        let frame = daily_frame(d(2022, 1, 1), 5);
        let series = InflationSeries::from_observations([
            (d(2022, 1, 1), 2.0),
            (d(2022, 1, 5), 4.0),
        ]);
        let merged = merge_inflation(frame, &series).unwrap();
        assert_eq!(
            merged.column(INFLATION_COLUMN).unwrap(),
            &[Some(2.0), Some(2.5), Some(3.0), Some(3.5), Some(4.0)]
        );
    }

    #[test]
    fn leading_rows_stay_missing_and_trailing_rows_hold_the_last_rate() {
        let frame = daily_frame(d(2022, 1, 1), 6);
        let series = InflationSeries::from_observations([(d(2022, 1, 3), 2.5)]);
        let merged = merge_inflation(frame, &series).unwrap();
        assert_eq!(
            merged.column(INFLATION_COLUMN).unwrap(),
            &[None, None, Some(2.5), Some(2.5), Some(2.5), Some(2.5)]
        );
    }

    #[test]
    fn observations_outside_the_index_do_not_anchor_anything() {
        let frame = daily_frame(d(2022, 1, 1), 3);
        let series = InflationSeries::from_observations([
            (d(2022, 1, 2), 3.0),
            (d(2023, 6, 1), 9.0),
        ]);
        let merged = merge_inflation(frame, &series).unwrap();
        assert_eq!(
            merged.column(INFLATION_COLUMN).unwrap(),
            &[None, Some(3.0), Some(3.0)]
        );
    }

    #[test]
    fn empty_series_is_rejected() {
        let frame = daily_frame(d(2022, 1, 1), 2);
        let err = merge_inflation(frame, &InflationSeries::default()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn constant_rate_fills_every_row() {
        let frame = daily_frame(d(2023, 1, 1), 4);
        let filled = constant_inflation(frame, 2.75).unwrap();
        assert_eq!(
            filled.column(INFLATION_COLUMN).unwrap(),
            &[Some(2.75); 4]
        );
    }
}
