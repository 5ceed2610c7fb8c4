//! Promotional-event alignment and one-hot encoding.

use std::collections::BTreeSet;

use crate::data::EventCalendar;
use crate::domain::{EVENT_COLUMN, FeatureFrame, NO_EVENTS_LABEL};
use crate::error::AppError;

/// Column emitted even when its window never intersects the frame, so train
/// and forecast matrices keep compatible column sets.
const SPRING_SALE_COLUMN: &str = "Amazon Events_Big Spring Sale";

/// Left-join the event calendar onto the frame and one-hot encode the labels.
///
/// Days without a known promotion get the `"No Events"` sentinel before
/// encoding. The alphabetically first observed category is dropped to avoid
/// the dummy-variable trap; re-merging the same calendar is idempotent since
/// columns are keyed by name and dates are unique.
pub fn merge_event_features(
    mut frame: FeatureFrame,
    calendar: &EventCalendar,
) -> Result<FeatureFrame, AppError> {
    let labels: Vec<&str> = frame
        .dates()
        .iter()
        .map(|d| calendar.label_on(*d).unwrap_or(NO_EVENTS_LABEL))
        .collect();

    let mut categories: BTreeSet<&str> = labels.iter().copied().collect();
    // Drop the first category alphabetically.
    if let Some(first) = categories.iter().next().copied() {
        categories.remove(first);
    }

    for category in categories {
        let flags: Vec<bool> = labels.iter().map(|l| *l == category).collect();
        frame.insert_flags(&one_hot_name(category), flags)?;
    }

    // The spring sale only exists from 2024; histories that end earlier never
    // observe it, but downstream models expect the column.
    if !frame.has_column(SPRING_SALE_COLUMN) {
        let zeros = vec![false; frame.len()];
        frame.insert_flags(SPRING_SALE_COLUMN, zeros)?;
    }

    Ok(frame)
}

fn one_hot_name(category: &str) -> String {
    format!("{EVENT_COLUMN}_{category}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn calendar() -> EventCalendar {
        EventCalendar::from_entries([
            (d(2021, 6, 21), "Amazon Prime Day".to_string()),
            (d(2021, 11, 19), "Black Friday".to_string()),
        ])
    }

    #[test]
    fn one_hot_drops_first_category_and_fills_sentinel() {
        let frame =
            FeatureFrame::new(vec![d(2021, 6, 20), d(2021, 6, 21), d(2021, 11, 19)]).unwrap();
        let frame = merge_event_features(frame, &calendar()).unwrap();

        // Observed categories sorted: Amazon Prime Day, Black Friday, No Events.
        // The first is dropped.
        assert!(!frame.has_column("Amazon Events_Amazon Prime Day"));
        assert_eq!(
            frame.column("Amazon Events_Black Friday").unwrap(),
            &[Some(0.0), Some(0.0), Some(1.0)]
        );
        assert_eq!(
            frame.column("Amazon Events_No Events").unwrap(),
            &[Some(1.0), Some(0.0), Some(0.0)]
        );
    }

    #[test]
    fn merge_is_idempotent() {
        let frame = FeatureFrame::new(vec![d(2021, 6, 21), d(2021, 6, 22)]).unwrap();
        let once = merge_event_features(frame.clone(), &calendar()).unwrap();
        let twice = merge_event_features(once.clone(), &calendar()).unwrap();
        assert_eq!(once.column_names(), twice.column_names());
        for name in once.column_names() {
            assert_eq!(once.column(&name).unwrap(), twice.column(&name).unwrap());
        }
    }

    #[test]
    fn spring_sale_column_exists_even_without_2024_dates() {
        let frame = FeatureFrame::new(vec![d(2021, 1, 1)]).unwrap();
        let frame = merge_event_features(frame, &calendar()).unwrap();
        assert_eq!(frame.column(SPRING_SALE_COLUMN).unwrap(), &[Some(0.0)]);
    }
}
