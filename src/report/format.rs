//! Report formatting.

use chrono::NaiveDate;

use crate::features::assemble::AssembledMatrix;
use crate::io::ingest::IngestedPurchases;

/// A feature name paired with its fitted coefficient.
#[derive(Debug, Clone)]
pub struct RankedCoefficient {
    pub name: String,
    pub value: f64,
}

/// Rank contract columns by coefficient magnitude, largest first.
pub fn rank_coefficients(names: &[String], coefficients: &[f64]) -> Vec<RankedCoefficient> {
    let mut ranked: Vec<RankedCoefficient> = names
        .iter()
        .zip(coefficients)
        .map(|(name, value)| RankedCoefficient {
            name: name.clone(),
            value: *value,
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.value
            .abs()
            .partial_cmp(&a.value.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked
}

/// Format the training run summary (ingest stats + contract + top drivers).
pub fn format_train_summary(
    ingest: &IngestedPurchases,
    assembled: &AssembledMatrix,
    intercept: f64,
    ranked: &[RankedCoefficient],
    top_n: usize,
) -> String {
    let mut out = String::new();

    out.push_str("=== salesfc - Sales Feature Assembly (train) ===\n");
    out.push_str(&format!(
        "Rows: read={} used={} skipped={}\n",
        ingest.rows_read,
        ingest.rows_used,
        ingest.row_errors.len()
    ));
    out.push_str(&format!(
        "Matrix: {} days x {} features | span {}..{}\n",
        assembled.features.len(),
        assembled.feature_columns.len(),
        first_date(&assembled.features),
        last_date(&assembled.features),
    ));

    out.push_str(&format!("\nFit: intercept={intercept:.4}\n"));
    out.push_str("Top drivers by |coefficient|:\n");
    for rc in ranked.iter().take(top_n) {
        out.push_str(&format!("  {:<32} {:>12.4}\n", rc.name, rc.value));
    }

    if !ingest.row_errors.is_empty() {
        out.push_str(&format!("\nSkipped rows ({}):\n", ingest.row_errors.len()));
        for err in ingest.row_errors.iter().take(10) {
            out.push_str(&format!("  line {}: {}\n", err.line, err.message));
        }
        if ingest.row_errors.len() > 10 {
            out.push_str(&format!("  ... and {} more\n", ingest.row_errors.len() - 10));
        }
    }

    out.push('\n');
    out
}

/// Format the forecast run summary plus per-day predictions.
pub fn format_forecast_summary(
    assembled: &AssembledMatrix,
    dates: &[NaiveDate],
    predictions: &[f64],
) -> String {
    let mut out = String::new();

    out.push_str("=== salesfc - Sales Feature Assembly (forecast) ===\n");
    out.push_str(&format!(
        "Horizon: {} days x {} features | span {}..{}\n",
        assembled.features.len(),
        assembled.feature_columns.len(),
        first_date(&assembled.features),
        last_date(&assembled.features),
    ));

    out.push_str("\nPredicted sales:\n");
    for (date, value) in dates.iter().zip(predictions) {
        out.push_str(&format!("  {date}  {value:>12.2}\n"));
    }

    out.push('\n');
    out
}

fn first_date(frame: &crate::domain::FeatureFrame) -> String {
    frame
        .dates()
        .first()
        .map(|d| d.to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn last_date(frame: &crate::domain::FeatureFrame) -> String {
    frame
        .dates()
        .last()
        .map(|d| d.to_string())
        .unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranking_is_by_magnitude() {
        let names = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let coefs = [0.5, -3.0, 1.5];
        let ranked = rank_coefficients(&names, &coefs);
        assert_eq!(ranked[0].name, "b");
        assert_eq!(ranked[1].name, "c");
        assert_eq!(ranked[2].name, "a");
    }
}
