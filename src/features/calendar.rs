//! Calendar features derived purely from the date index.

use chrono::{Datelike, NaiveDate};

use crate::domain::FeatureFrame;
use crate::error::AppError;

/// Augment the frame with day/month/year/weekday/quarter and boundary flags.
///
/// Weekday numbering is Monday = 0 .. Sunday = 6. The weekend flag is
/// `weekday > 5`, i.e. true only on Sunday; previously exported datasets and
/// fitted models encode exactly this convention, so it is preserved verbatim.
pub fn add_calendar_features(mut frame: FeatureFrame) -> Result<FeatureFrame, AppError> {
    let dates: Vec<NaiveDate> = frame.dates().to_vec();

    let number =
        |f: &dyn Fn(NaiveDate) -> f64| dates.iter().map(|d| Some(f(*d))).collect::<Vec<_>>();
    let flag = |f: &dyn Fn(NaiveDate) -> bool| dates.iter().map(|d| f(*d)).collect::<Vec<_>>();

    frame.insert("day", number(&|d| f64::from(d.day())))?;
    frame.insert("month", number(&|d| f64::from(d.month())))?;
    frame.insert("year", number(&|d| f64::from(d.year())))?;
    frame.insert_flags("is_weekend", flag(&|d| weekday_index(d) > 5))?;
    frame.insert("day_of_week", number(&|d| f64::from(weekday_index(d))))?;
    frame.insert("day_of_year", number(&|d| f64::from(d.ordinal())))?;
    frame.insert("quarter", number(&|d| f64::from((d.month() - 1) / 3 + 1)))?;
    frame.insert_flags("is_month_start", flag(&|d| d.day() == 1))?;
    frame.insert_flags("is_month_end", flag(&is_month_end))?;
    frame.insert_flags("is_year_start", flag(&|d| d.ordinal() == 1))?;
    frame.insert_flags("is_year_end", flag(&|d| d.month() == 12 && d.day() == 31))?;

    Ok(frame)
}

fn weekday_index(d: NaiveDate) -> u32 {
    d.weekday().num_days_from_monday()
}

fn is_month_end(d: NaiveDate) -> bool {
    match d.succ_opt() {
        Some(next) => next.month() != d.month(),
        None => true,
    }
}
