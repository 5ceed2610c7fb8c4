//! Recurring promotional-event calendar.
//!
//! The calendar is a declarative table of date windows rather than imperative
//! year-by-year range appends: fixed windows list their literal dates, and
//! yearly-repeating windows are a base window plus a year range. Expansion
//! produces one `(date, label)` entry per covered day.
//!
//! Windows of different labels can collide on a day (e.g. a clearance window
//! touching a deal window); the last table entry wins, which is acceptable
//! because the promotions are mutually exclusive in practice.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::error::AppError;

/// A literal event window, inclusive on both ends.
struct FixedWindow {
    label: &'static str,
    start: (i32, u32, u32),
    end: (i32, u32, u32),
}

/// A window that repeats every year at the same month/day span.
struct RecurringWindow {
    label: &'static str,
    /// Base window in the first covered year.
    start: (i32, u32, u32),
    end: (i32, u32, u32),
    /// Inclusive range of years the window repeats over.
    years: (i32, i32),
}

const FIXED_WINDOWS: &[FixedWindow] = &[
    FixedWindow { label: "Big Spring Sale", start: (2024, 3, 20), end: (2024, 3, 25) },
    FixedWindow { label: "Big Spring Sale", start: (2025, 3, 25), end: (2025, 3, 31) },
    FixedWindow { label: "Amazon Prime Day", start: (2018, 7, 16), end: (2018, 7, 17) },
    FixedWindow { label: "Amazon Prime Day", start: (2019, 7, 15), end: (2019, 7, 16) },
    FixedWindow { label: "Amazon Prime Day", start: (2020, 10, 13), end: (2020, 10, 14) },
    FixedWindow { label: "Amazon Prime Day", start: (2021, 6, 21), end: (2021, 6, 22) },
    FixedWindow { label: "Amazon Prime Day", start: (2022, 7, 12), end: (2022, 7, 13) },
    FixedWindow { label: "Amazon Prime Day", start: (2023, 7, 11), end: (2023, 7, 12) },
    FixedWindow { label: "Amazon Prime Day", start: (2024, 7, 16), end: (2024, 7, 17) },
    FixedWindow { label: "Amazon Prime Day", start: (2025, 7, 23), end: (2025, 7, 24) },
    // 2022 was the Prime Early Access Sale; folded under the same label.
    FixedWindow { label: "Prime Big Deal Days", start: (2022, 10, 11), end: (2022, 10, 12) },
    FixedWindow { label: "Prime Big Deal Days", start: (2023, 10, 10), end: (2023, 10, 11) },
    FixedWindow { label: "Prime Big Deal Days", start: (2024, 10, 8), end: (2024, 10, 9) },
    FixedWindow { label: "Prime Big Deal Days", start: (2025, 10, 14), end: (2025, 10, 15) },
    FixedWindow { label: "Black Friday", start: (2018, 11, 16), end: (2018, 11, 23) },
    FixedWindow { label: "Black Friday", start: (2019, 11, 22), end: (2019, 11, 29) },
    FixedWindow { label: "Black Friday", start: (2020, 11, 20), end: (2020, 11, 27) },
    FixedWindow { label: "Black Friday", start: (2021, 11, 19), end: (2021, 11, 26) },
    FixedWindow { label: "Black Friday", start: (2022, 11, 24), end: (2022, 11, 25) },
    FixedWindow { label: "Black Friday", start: (2023, 11, 17), end: (2023, 11, 24) },
    FixedWindow { label: "Black Friday", start: (2024, 11, 21), end: (2024, 11, 29) },
    FixedWindow { label: "Black Friday", start: (2025, 11, 28), end: (2025, 12, 1) },
];

const RECURRING_WINDOWS: &[RecurringWindow] = &[
    RecurringWindow {
        label: "12 Days of Deals",
        start: (2018, 12, 2),
        end: (2018, 12, 13),
        years: (2018, 2026),
    },
    RecurringWindow {
        label: "Year-End Clearance Sale",
        start: (2018, 12, 26),
        end: (2018, 12, 31),
        years: (2018, 2026),
    },
];

/// Promotional-event calendar: one label per covered calendar day.
#[derive(Debug, Clone)]
pub struct EventCalendar {
    entries: BTreeMap<NaiveDate, String>,
}

impl EventCalendar {
    /// Expand the built-in declarative window tables.
    pub fn builtin() -> Result<Self, AppError> {
        let mut entries = BTreeMap::new();

        for w in FIXED_WINDOWS {
            insert_window(&mut entries, w.label, w.start, w.end)?;
        }

        for w in RECURRING_WINDOWS {
            let base_year = w.start.0;
            for year in w.years.0..=w.years.1 {
                let offset = year - base_year;
                let start = (w.start.0 + offset, w.start.1, w.start.2);
                let end = (w.end.0 + offset, w.end.1, w.end.2);
                insert_window(&mut entries, w.label, start, end)?;
            }
        }

        Ok(Self { entries })
    }

    /// Build a calendar from explicit `(date, label)` pairs (used in tests and
    /// by callers supplying their own promotions).
    pub fn from_entries(pairs: impl IntoIterator<Item = (NaiveDate, String)>) -> Self {
        Self {
            entries: pairs.into_iter().collect(),
        }
    }

    pub fn label_on(&self, date: NaiveDate) -> Option<&str> {
        self.entries.get(&date).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn insert_window(
    entries: &mut BTreeMap<NaiveDate, String>,
    label: &str,
    start: (i32, u32, u32),
    end: (i32, u32, u32),
) -> Result<(), AppError> {
    let start = make_date(start)?;
    let end = make_date(end)?;
    if end < start {
        return Err(AppError::internal(
            format!("Event window for `{label}` ends before it starts ({start}..{end})."),
        ));
    }
    let mut day = start;
    while day <= end {
        entries.insert(day, label.to_string());
        day = day.succ_opt().ok_or_else(|| {
            AppError::internal(format!("Event window for `{label}` overflows the calendar."))
        })?;
    }
    Ok(())
}

fn make_date((y, m, d): (i32, u32, u32)) -> Result<NaiveDate, AppError> {
    NaiveDate::from_ymd_opt(y, m, d)
        .ok_or_else(|| AppError::internal(format!("Invalid event table date {y}-{m:02}-{d:02}.")))
}
