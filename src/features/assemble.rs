//! Feature assembly and the column contract.
//!
//! This module owns the one place where stage order matters. Training:
//!
//! daily aggregation -> calendar -> year truncation -> events -> holidays ->
//! sales lags -> entity signal + signal lags -> inflation -> sorted column
//! reindex
//!
//! Forecasting builds the horizon frame (calendar/events/holidays only),
//! concatenates it below the historical matrix, computes every lag column
//! over the combined series, and extracts the horizon rows back out. The
//! horizon therefore sees historical lag values while historical rows stay
//! untouched by the concatenation.

use chrono::NaiveDate;

use crate::data::{EventCalendar, HolidayTable};
use crate::domain::{
    EntityKind, FORECAST_FLAG_COLUMN, FeatureFrame, INFLATION_COLUMN, PurchaseRow, SIGNAL_COLUMNS,
    TARGET_COLUMN, TRAIN_CUTOFF_YEAR,
};
use crate::error::AppError;
use crate::features::calendar::add_calendar_features;
use crate::features::entity::{add_signal_lags, entity_signal_frame};
use crate::features::events::merge_event_features;
use crate::features::holidays::{merge_holiday_flags, merge_holiday_flags_forecast};
use crate::features::inflation::{constant_inflation, merge_inflation, InflationSeries};
use crate::features::lags::add_sales_lags;

/// Everything the training assembly needs besides the purchases themselves.
pub struct TrainInputs<'a> {
    pub holidays: &'a HolidayTable,
    pub holidays_from_2022: &'a [NaiveDate],
    pub events: &'a EventCalendar,
    /// Optional expected-inflation series, merged as the last stage.
    pub inflation: Option<&'a InflationSeries>,
    /// Which entity dimension drives the `S1`/`S2`/`S3` signal columns.
    pub signal_entity: EntityKind,
}

/// Inputs for horizon assembly: the previously assembled (exported) training
/// matrix plus the forecast date range.
pub struct ForecastInputs<'a> {
    pub history: &'a FeatureFrame,
    pub holidays_from_2022: &'a [NaiveDate],
    pub events: &'a EventCalendar,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Expected inflation rate assumed across the horizon. Required when the
    /// history carries an `inflation_rate` column.
    pub expected_inflation: Option<f64>,
}

/// Output of either assembly mode.
#[derive(Debug, Clone)]
pub struct AssembledMatrix {
    /// The full frame (still carrying `total_sales` and the raw signal
    /// columns); this is what gets exported for later forecast runs.
    pub frame: FeatureFrame,
    /// The sorted feature contract.
    pub feature_columns: Vec<String>,
    /// The frame reindexed to exactly `feature_columns`.
    pub features: FeatureFrame,
}

/// Sum per-transaction sales into the daily aggregate series.
pub fn daily_sales_series(purchases: &[PurchaseRow]) -> Result<FeatureFrame, AppError> {
    if purchases.is_empty() {
        return Err(AppError::degenerate("No purchase rows to aggregate."));
    }
    let mut by_date = std::collections::BTreeMap::<NaiveDate, f64>::new();
    for row in purchases {
        *by_date.entry(row.date).or_insert(0.0) += row.total_sales;
    }
    FeatureFrame::from_series(TARGET_COLUMN, by_date.into_iter().collect())
}

/// Assemble the training feature matrix.
pub fn assemble_training(
    purchases: &[PurchaseRow],
    inputs: &TrainInputs<'_>,
) -> Result<AssembledMatrix, AppError> {
    let frame = daily_sales_series(purchases)?;
    let frame = add_calendar_features(frame)?;
    let frame = frame.truncate_before_year(TRAIN_CUTOFF_YEAR);
    if frame.is_empty() {
        return Err(AppError::degenerate(
            format!("No rows remain before the {TRAIN_CUTOFF_YEAR} training cutoff."),
        ));
    }

    let frame = merge_event_features(frame, inputs.events)?;
    let mut frame = merge_holiday_flags(frame, inputs.holidays, inputs.holidays_from_2022)?;

    let signal = entity_signal_frame(purchases, inputs.signal_entity, TRAIN_CUTOFF_YEAR)?;
    frame.left_join(&signal)?;

    let frame = add_sales_lags(frame)?;
    // Training data is entirely historical: the last in-range row is the last
    // row of the frame.
    let last_hist_pos = frame.len() - 1;
    let frame = add_signal_lags(frame, last_hist_pos)?;

    let frame = match inputs.inflation {
        Some(series) => merge_inflation(frame, series)?,
        None => frame,
    };

    let feature_columns = feature_columns_of(&frame);
    let features = frame.reindex_columns(&feature_columns);
    Ok(AssembledMatrix {
        frame,
        feature_columns,
        features,
    })
}

/// Assemble the forecast-horizon feature matrix.
pub fn assemble_forecast(inputs: &ForecastInputs<'_>) -> Result<AssembledMatrix, AppError> {
    if inputs.end < inputs.start {
        return Err(AppError::schema("Forecast range ends before it starts."));
    }
    if inputs.history.is_empty() {
        return Err(AppError::degenerate("Historical matrix is empty."));
    }
    let last_hist_date = *inputs
        .history
        .dates()
        .last()
        .ok_or_else(|| AppError::degenerate("Historical matrix is empty."))?;
    if inputs.start <= last_hist_date {
        return Err(AppError::schema(
            format!(
                "Forecast start {} does not follow the last historical date {last_hist_date}.",
                inputs.start
            ),
        ));
    }

    // Horizon rows exist for every date in the range, including dates that
    // never appeared in history.
    let horizon_dates: Vec<NaiveDate> = date_range(inputs.start, inputs.end)?;
    let horizon = FeatureFrame::new(horizon_dates)?;
    let horizon = add_calendar_features(horizon)?;
    let horizon = merge_event_features(horizon, inputs.events)?;
    let horizon = merge_holiday_flags_forecast(horizon, inputs.holidays_from_2022)?;
    let mut horizon = match (inputs.history.has_column(INFLATION_COLUMN), inputs.expected_inflation) {
        (true, Some(rate)) => constant_inflation(horizon, rate)?,
        (true, None) => {
            return Err(AppError::schema(
                "Historical matrix carries `inflation_rate`; pass --expected-inflation for the horizon.",
            ));
        }
        (false, _) => horizon,
    };
    horizon.insert_flags(FORECAST_FLAG_COLUMN, vec![true; horizon.len()])?;

    let mut history = inputs.history.clone();
    history.insert_flags(FORECAST_FLAG_COLUMN, vec![false; history.len()])?;
    let last_hist_pos = history.len() - 1;

    // Compute every lag column over the combined series so horizon rows see
    // historical values, then pull the horizon rows back out.
    let combined = history.concat_rows(horizon)?;
    let combined = add_sales_lags(combined)?;
    let mut combined = add_signal_lags(combined, last_hist_pos)?;

    let flags = combined.require_column(FORECAST_FLAG_COLUMN)?.to_vec();
    let mask: Vec<bool> = flags.iter().map(|v| *v == Some(1.0)).collect();
    combined.remove_column(FORECAST_FLAG_COLUMN);
    let frame = combined.retain_rows(&mask);

    // Forecast contract: derived from the columns of the preprocessed input,
    // not from the combined frame. Callers must supply a history whose
    // columns are a superset of the train-time contract, or the reindex
    // introduces all-missing columns.
    let feature_columns = feature_columns_of(inputs.history);
    let features = frame.reindex_columns(&feature_columns);
    Ok(AssembledMatrix {
        frame,
        feature_columns,
        features,
    })
}

/// The canonical sorted feature list: every column except the regression
/// target and the three raw reduced-signal columns.
pub fn feature_columns_of(frame: &FeatureFrame) -> Vec<String> {
    frame
        .column_names()
        .into_iter()
        .filter(|name| name != TARGET_COLUMN && !SIGNAL_COLUMNS.contains(&name.as_str()))
        .collect()
}

fn date_range(start: NaiveDate, end: NaiveDate) -> Result<Vec<NaiveDate>, AppError> {
    let mut out = Vec::new();
    let mut day = start;
    while day <= end {
        out.push(day);
        day = day
            .succ_opt()
            .ok_or_else(|| AppError::schema("Forecast range overflows the calendar."))?;
    }
    Ok(out)
}
