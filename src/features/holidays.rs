//! Federal-holiday flag merge.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::data::HolidayTable;
use crate::domain::{FeatureFrame, HOLIDAY_COLUMN};
use crate::error::AppError;

/// Merge both holiday sources into the single `fedral_holiday` flag.
///
/// A date is a federal holiday when either the pre-2022 table or the post-2021
/// hand list flags it; absence from a source counts as false, so the merged
/// column is never missing. The sources cover disjoint year ranges, so at
/// most one claims any date.
pub fn merge_holiday_flags(
    mut frame: FeatureFrame,
    table: &HolidayTable,
    from_2022: &[NaiveDate],
) -> Result<FeatureFrame, AppError> {
    let hand_list: BTreeSet<NaiveDate> = from_2022.iter().copied().collect();
    let flags: Vec<bool> = frame
        .dates()
        .iter()
        .map(|d| table.contains(*d) || hand_list.contains(d))
        .collect();
    frame.insert_flags(HOLIDAY_COLUMN, flags)?;
    Ok(frame)
}

/// Forecast-mode merge: the pre-2022 table is unavailable, so the hand list
/// alone becomes the `fedral_holiday` flag.
pub fn merge_holiday_flags_forecast(
    frame: FeatureFrame,
    from_2022: &[NaiveDate],
) -> Result<FeatureFrame, AppError> {
    merge_holiday_flags(frame, &HolidayTable::default(), from_2022)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn or_merge_with_null_as_false() {
        let frame = FeatureFrame::new(vec![
            d(2021, 7, 4),  // pre-2022 table only
            d(2021, 7, 5),  // neither
            d(2022, 7, 4),  // hand list only
        ])
        .unwrap();
        let table = HolidayTable::from_dates([d(2021, 7, 4)]);
        let hand = vec![d(2022, 7, 4)];

        let frame = merge_holiday_flags(frame, &table, &hand).unwrap();
        assert_eq!(
            frame.column(HOLIDAY_COLUMN).unwrap(),
            &[Some(1.0), Some(0.0), Some(1.0)]
        );
    }

    #[test]
    fn merged_flag_is_never_missing() {
        let frame = FeatureFrame::new((1..=28).map(|day| d(2021, 2, day)).collect()).unwrap();
        let frame = merge_holiday_flags(frame, &HolidayTable::default(), &[]).unwrap();
        assert!(frame
            .column(HOLIDAY_COLUMN)
            .unwrap()
            .iter()
            .all(Option::is_some));
    }

    #[test]
    fn forecast_mode_uses_hand_list_only() {
        let frame = FeatureFrame::new(vec![d(2023, 1, 2), d(2023, 1, 3)]).unwrap();
        let frame = merge_holiday_flags_forecast(frame, &[d(2023, 1, 2)]).unwrap();
        assert_eq!(
            frame.column(HOLIDAY_COLUMN).unwrap(),
            &[Some(1.0), Some(0.0)]
        );
    }
}
