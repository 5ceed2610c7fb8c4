//! Shared pipeline logic used by the `train`, `forecast`, and `demo` commands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! ingest -> assembly -> fit -> predictions
//!
//! The CLI layer then focuses on presentation and exports.

use crate::data::{federal_holidays_from_2022, EventCalendar, HolidayTable};
use crate::domain::{
    EntityKind, ForecastConfig, PurchaseRow, TrainConfig, TARGET_COLUMN,
};
use crate::error::AppError;
use crate::features::assemble::{
    assemble_forecast, assemble_training, feature_columns_of, AssembledMatrix, ForecastInputs,
    TrainInputs,
};
use crate::features::inflation::InflationSeries;
use crate::io::ingest::{
    load_holiday_table, load_inflation_series, load_processed_frame, load_purchases,
    IngestedPurchases,
};
use crate::models::{LinearModel, Regressor};

/// All computed outputs of a single `salesfc train` run.
#[derive(Debug, Clone)]
pub struct TrainOutput {
    pub ingest: IngestedPurchases,
    pub assembled: AssembledMatrix,
    pub model: LinearModel,
}

/// All computed outputs of a single `salesfc forecast` run.
#[derive(Debug, Clone)]
pub struct ForecastOutput {
    pub assembled: AssembledMatrix,
    pub predictions: Vec<f64>,
}

/// Execute the full training pipeline from a purchases CSV.
pub fn run_train(config: &TrainConfig) -> Result<TrainOutput, AppError> {
    let mut ingest = load_purchases(&config.purchases_path)?;

    if let Some(name) = &config.entity_name {
        filter_by_entity(&mut ingest.rows, config.entity_kind, name);
        ingest.rows_used = ingest.rows.len();
        if ingest.rows.is_empty() {
            return Err(AppError::degenerate(
                format!("No purchases match {} `{name}`.", config.entity_kind.column_name()),
            ));
        }
    }

    let holidays = match &config.holidays_path {
        Some(path) => load_holiday_table(path)?,
        None => HolidayTable::default(),
    };
    let inflation = match &config.inflation_path {
        Some(path) => Some(load_inflation_series(path)?),
        None => None,
    };

    run_train_with_purchases(ingest, &holidays, inflation.as_ref(), config.entity_kind)
}

/// Execute the training pipeline on already-ingested purchases.
///
/// `demo` uses this to skip the CSV round trip for synthetic data.
pub fn run_train_with_purchases(
    ingest: IngestedPurchases,
    holidays: &HolidayTable,
    inflation: Option<&InflationSeries>,
    entity_kind: EntityKind,
) -> Result<TrainOutput, AppError> {
    let hand_list = federal_holidays_from_2022()?;
    let events = EventCalendar::builtin()?;

    let inputs = TrainInputs {
        holidays,
        holidays_from_2022: &hand_list,
        events: &events,
        inflation,
        signal_entity: entity_kind,
    };
    let assembled = assemble_training(&ingest.rows, &inputs)?;

    let x = assembled.features.to_design_matrix(&assembled.feature_columns)?;
    let y = assembled.frame.to_target_vector(TARGET_COLUMN)?;
    let mut model = LinearModel::new();
    model.fit(&x, &y)?;

    Ok(TrainOutput {
        ingest,
        assembled,
        model,
    })
}

/// Execute the forecasting pipeline from an exported matrix CSV.
pub fn run_forecast(config: &ForecastConfig) -> Result<ForecastOutput, AppError> {
    let history = load_processed_frame(&config.processed_path)?;
    forecast_from_history(&history, config.start, config.end, config.expected_inflation)
}

/// Fit on the historical matrix, assemble the horizon, and predict.
pub fn forecast_from_history(
    history: &crate::domain::FeatureFrame,
    start: chrono::NaiveDate,
    end: chrono::NaiveDate,
    expected_inflation: Option<f64>,
) -> Result<ForecastOutput, AppError> {
    let hand_list = federal_holidays_from_2022()?;
    let events = EventCalendar::builtin()?;

    let contract = feature_columns_of(history);
    let x = history.to_design_matrix(&contract)?;
    let y = history.to_target_vector(TARGET_COLUMN)?;
    let mut model = LinearModel::new();
    model.fit(&x, &y)?;

    let inputs = ForecastInputs {
        history,
        holidays_from_2022: &hand_list,
        events: &events,
        start,
        end,
        expected_inflation,
    };
    let assembled = assemble_forecast(&inputs)?;

    let horizon_x = assembled.features.to_design_matrix(&assembled.feature_columns)?;
    let predictions = model.predict(&horizon_x)?;

    Ok(ForecastOutput {
        assembled,
        predictions: predictions.iter().copied().collect(),
    })
}

fn filter_by_entity(rows: &mut Vec<PurchaseRow>, kind: EntityKind, name: &str) {
    rows.retain(|row| {
        let label = match kind {
            EntityKind::State => row.state.as_deref(),
            EntityKind::Category => row.category.as_deref(),
        };
        label.is_some_and(|l| l.trim().eq_ignore_ascii_case(name.trim()))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn rows() -> Vec<PurchaseRow> {
        ["CA", "ca ", "NY"]
            .iter()
            .enumerate()
            .map(|(i, state)| PurchaseRow {
                date: NaiveDate::from_ymd_opt(2021, 1, 1 + i as u32).unwrap(),
                state: Some(state.to_string()),
                category: None,
                total_sales: 1.0,
            })
            .collect()
    }

    #[test]
    fn entity_filter_is_case_and_whitespace_insensitive() {
        let mut purchases = rows();
        filter_by_entity(&mut purchases, EntityKind::State, "CA");
        assert_eq!(purchases.len(), 2);
    }

    #[test]
    fn entity_filter_on_missing_label_drops_row() {
        let mut purchases = rows();
        filter_by_entity(&mut purchases, EntityKind::Category, "ABIS_BOOK");
        assert!(purchases.is_empty());
    }
}
