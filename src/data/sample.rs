//! Synthetic purchase-history generation.
//!
//! The `demo` command (and the end-to-end tests) need a realistic multi-year
//! purchase history without downloading anything. The generator is fully
//! deterministic for a given seed: weekly and annual seasonality on top of a
//! slow trend, log-normal order sizes, and a small fixed universe of states
//! and categories.

use chrono::{Datelike, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::{LogNormal, Normal};

use crate::domain::PurchaseRow;
use crate::error::AppError;

const STATES: &[&str] = &["CA", "GA", "NY", "TX", "WA"];
const CATEGORIES: &[&str] = &["ABIS_BOOK", "ELECTRONICS", "GROCERY", "PET_FOOD"];

/// Generate a synthetic purchase history covering `[start, end]`.
pub fn generate_sample_purchases(
    start: NaiveDate,
    end: NaiveDate,
    seed: u64,
) -> Result<Vec<PurchaseRow>, AppError> {
    if end < start {
        return Err(AppError::schema("Sample range ends before it starts."));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let order_size = LogNormal::new(3.0, 0.6)
        .map_err(|e| AppError::internal(format!("Order size distribution error: {e}")))?;
    let noise = Normal::new(0.0, 0.15)
        .map_err(|e| AppError::internal(format!("Noise distribution error: {e}")))?;

    let mut rows = Vec::new();
    let mut day = start;
    while day <= end {
        let orders = orders_for_day(day, &mut rng, &noise);
        for _ in 0..orders {
            let state = STATES[rng.gen_range(0..STATES.len())];
            let category = CATEGORIES[rng.gen_range(0..CATEGORIES.len())];
            let amount: f64 = order_size.sample(&mut rng);
            rows.push(PurchaseRow {
                date: day,
                state: Some(state.to_string()),
                category: Some(category.to_string()),
                total_sales: (amount * 100.0).round() / 100.0,
            });
        }
        day = day
            .succ_opt()
            .ok_or_else(|| AppError::internal("Sample range overflows the calendar."))?;
    }

    Ok(rows)
}

fn orders_for_day(day: NaiveDate, rng: &mut StdRng, noise: &Normal<f64>) -> usize {
    // Baseline order count with weekly and annual seasonality plus a slow
    // year-over-year trend; December gets a holiday bump.
    let weekday = day.weekday().num_days_from_monday() as f64;
    let weekly = 1.0 + 0.2 * ((weekday / 6.0) * std::f64::consts::PI).sin();
    let annual = 1.0
        + 0.3
            * ((day.ordinal() as f64 / 365.0) * 2.0 * std::f64::consts::PI).cos().abs();
    let december = if day.month() == 12 { 1.5 } else { 1.0 };
    let trend = 1.0 + 0.1 * (day.year() - 2018) as f64;

    let base = 6.0 * weekly * annual * december * trend;
    let jitter: f64 = noise.sample(rng);
    (base * (1.0 + jitter)).round().max(1.0) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn generation_is_deterministic_for_a_seed() {
        let a = generate_sample_purchases(d(2020, 1, 1), d(2020, 1, 31), 42).unwrap();
        let b = generate_sample_purchases(d(2020, 1, 1), d(2020, 1, 31), 42).unwrap();
        assert_eq!(a.len(), b.len());
        assert!(a
            .iter()
            .zip(&b)
            .all(|(x, y)| x.date == y.date && x.total_sales == y.total_sales));
    }

    #[test]
    fn every_day_in_range_has_orders() {
        let rows = generate_sample_purchases(d(2021, 6, 1), d(2021, 6, 7), 7).unwrap();
        for offset in 0..7 {
            let day = d(2021, 6, 1 + offset);
            assert!(rows.iter().any(|r| r.date == day), "no orders on {day}");
        }
    }

    #[test]
    fn inverted_range_is_rejected() {
        assert!(generate_sample_purchases(d(2021, 1, 2), d(2021, 1, 1), 1).is_err());
    }
}
