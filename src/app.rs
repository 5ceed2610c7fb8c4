//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - runs the ingest/assembly/fit pipeline
//! - prints reports
//! - writes optional exports

use clap::Parser;

use crate::cli::{Command, DemoArgs, ForecastArgs, TrainArgs};
use crate::domain::{ForecastConfig, RunMode, RunSummary, TrainConfig};
use crate::error::AppError;
use crate::io::ingest::IngestedPurchases;

pub mod pipeline;

/// Entry point for the `salesfc` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Train(args) => handle_train(args),
        Command::Forecast(args) => handle_forecast(args),
        Command::Demo(args) => handle_demo(args),
    }
}

fn handle_train(args: TrainArgs) -> Result<(), AppError> {
    let config = train_config_from_args(&args);
    let run = pipeline::run_train(&config)?;
    report_training(&run, args.top);
    export_training(&run, &config)
}

fn handle_forecast(args: ForecastArgs) -> Result<(), AppError> {
    let config = ForecastConfig {
        processed_path: args.matrix.clone(),
        start: args.start,
        end: args.end,
        expected_inflation: args.expected_inflation,
        export_predictions: args.export_predictions.clone(),
    };
    let run = pipeline::run_forecast(&config)?;
    report_forecast(&run);

    if let Some(path) = &config.export_predictions {
        crate::io::export::write_predictions_csv(path, run.assembled.frame.dates(), &run.predictions)?;
    }
    Ok(())
}

fn handle_demo(args: DemoArgs) -> Result<(), AppError> {
    let rows = crate::data::generate_sample_purchases(args.start, args.end, args.seed)?;
    let ingest = IngestedPurchases {
        rows_read: rows.len(),
        rows_used: rows.len(),
        rows,
        row_errors: Vec::new(),
    };

    let holidays = crate::data::HolidayTable::default();
    let train = pipeline::run_train_with_purchases(ingest, &holidays, None, args.entity_kind)?;
    report_training(&train, args.top);

    let last = *train
        .assembled
        .frame
        .dates()
        .last()
        .ok_or_else(|| AppError::degenerate("Training produced an empty matrix."))?;
    let start = last
        .succ_opt()
        .ok_or_else(|| AppError::internal("Forecast start overflows the calendar."))?;
    let end = start
        .checked_add_days(chrono::Days::new(u64::from(args.horizon_days.saturating_sub(1))))
        .ok_or_else(|| AppError::schema("Forecast horizon overflows the calendar."))?;

    let forecast = pipeline::forecast_from_history(&train.assembled.frame, start, end, None)?;
    report_forecast(&forecast);
    Ok(())
}

fn report_training(run: &pipeline::TrainOutput, top: usize) {
    let ranked = crate::report::rank_coefficients(
        &run.assembled.feature_columns,
        run.model.feature_coefficients().unwrap_or(&[]),
    );
    let intercept = run.model.intercept().unwrap_or(0.0);
    println!(
        "{}",
        crate::report::format_train_summary(&run.ingest, &run.assembled, intercept, &ranked, top)
    );
}

fn report_forecast(run: &pipeline::ForecastOutput) {
    println!(
        "{}",
        crate::report::format_forecast_summary(
            &run.assembled,
            run.assembled.frame.dates(),
            &run.predictions
        )
    );
}

fn export_training(run: &pipeline::TrainOutput, config: &TrainConfig) -> Result<(), AppError> {
    if let Some(path) = &config.export_matrix {
        crate::io::export::write_matrix_csv(path, &run.assembled.frame)?;
    }
    if let Some(path) = &config.export_summary {
        let dates = run.assembled.frame.dates();
        let (first_date, last_date) = match (dates.first(), dates.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return Err(AppError::degenerate("Training produced an empty matrix.")),
        };
        let summary = RunSummary {
            tool: "salesfc".to_string(),
            mode: RunMode::Train,
            rows: run.assembled.frame.len(),
            first_date,
            last_date,
            feature_columns: run.assembled.feature_columns.clone(),
        };
        crate::io::export::write_summary_json(path, &summary)?;
    }
    Ok(())
}

pub fn train_config_from_args(args: &TrainArgs) -> TrainConfig {
    TrainConfig {
        purchases_path: args.purchases.clone(),
        holidays_path: args.holidays.clone(),
        inflation_path: args.inflation.clone(),
        entity_name: args.entity.clone(),
        entity_kind: args.entity_kind,
        export_matrix: args.export_matrix.clone(),
        export_summary: args.export_summary.clone(),
    }
}
