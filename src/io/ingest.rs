//! CSV ingest and normalization.
//!
//! This module turns the heterogeneous purchase-history CSV into clean
//! `PurchaseRow`s that are safe to aggregate, and reloads previously exported
//! artifacts (feature matrices, holiday tables).
//!
//! Design goals:
//! - **Strict schema** for required fields (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Deterministic behavior** (no hidden randomness)
//! - **Separation of concerns**: no feature logic here

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;

use crate::data::HolidayTable;
use crate::domain::{FeatureFrame, PurchaseRow};
use crate::error::AppError;
use crate::features::inflation::InflationSeries;

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: normalized purchase rows + row errors.
#[derive(Debug, Clone)]
pub struct IngestedPurchases {
    pub rows: Vec<PurchaseRow>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

/// How the per-row sale amount is sourced from the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SalesSource {
    /// A precomputed `total_sales` column.
    Direct,
    /// `Purchase Price Per Unit` multiplied by `Quantity`.
    PriceTimesQuantity,
}

/// Load and normalize the purchase-history CSV.
///
/// Accepts either a preprocessed file carrying `total_sales` directly, or the
/// raw export carrying `Purchase Price Per Unit` and `Quantity`.
pub fn load_purchases(path: &Path) -> Result<IngestedPurchases, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::schema(format!("Failed to open CSV '{}': {e}", path.display()))
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::schema(format!("Failed to read CSV headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);
    let source = resolve_sales_source(&header_map)?;

    if !header_map.contains_key("order date") {
        return Err(AppError::schema("Missing required column: `Order Date`"));
    }

    let mut rows = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2 because:
        // - records() starts at line 1 after headers
        // - CSV is 1-based line numbers
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_purchase_row(&record, &header_map, source) {
            Ok(row) => rows.push(row),
            Err(e) => row_errors.push(RowError { line, message: e }),
        }
    }

    let rows_used = rows.len();
    if rows_used == 0 {
        return Err(AppError::degenerate("No valid purchase rows remain after ingest."));
    }

    Ok(IngestedPurchases {
        rows,
        row_errors,
        rows_read,
        rows_used,
    })
}

/// Load a pre-2022 holiday table: a CSV with a `Date` column.
pub fn load_holiday_table(path: &Path) -> Result<HolidayTable, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::schema(format!("Failed to open holiday CSV '{}': {e}", path.display()))
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::schema(format!("Failed to read holiday CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);
    let date_idx = *header_map
        .get("date")
        .ok_or_else(|| AppError::schema("Holiday CSV is missing required column: `Date`"))?;

    let mut dates = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        let record = result
            .map_err(|e| AppError::schema(format!("Holiday CSV parse error at line {line}: {e}")))?;
        let raw = record
            .get(date_idx)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::schema(format!("Holiday CSV line {line}: empty `Date` value")))?;
        let date = parse_date(raw)
            .map_err(|e| AppError::schema(format!("Holiday CSV line {line}: {e}")))?;
        dates.push(date);
    }

    Ok(HolidayTable::from_dates(dates))
}

/// Load an expected-inflation series CSV.
///
/// Requires an `observation_date` column plus a rate column named either
/// `inflation_rate` or `T10YIEM` (the FRED export header). FRED writes `.`
/// for missing observations; those rows and blank cells are skipped.
pub fn load_inflation_series(path: &Path) -> Result<InflationSeries, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::schema(format!("Failed to open inflation CSV '{}': {e}", path.display()))
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::schema(format!("Failed to read inflation CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);
    let date_idx = *header_map.get("observation_date").ok_or_else(|| {
        AppError::schema("Inflation CSV is missing required column: `observation_date`")
    })?;
    let rate_idx = *header_map
        .get("inflation_rate")
        .or_else(|| header_map.get("t10yiem"))
        .ok_or_else(|| {
            AppError::schema(
                "Inflation CSV is missing a rate column (`inflation_rate` or `T10YIEM`)",
            )
        })?;

    let mut observations = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        let record = result.map_err(|e| {
            AppError::schema(format!("Inflation CSV parse error at line {line}: {e}"))
        })?;
        let raw_date = record
            .get(date_idx)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                AppError::schema(format!("Inflation CSV line {line}: empty `observation_date` value"))
            })?;
        let date = parse_date(raw_date)
            .map_err(|e| AppError::schema(format!("Inflation CSV line {line}: {e}")))?;

        let cell = record.get(rate_idx).map(str::trim).unwrap_or("");
        if cell.is_empty() || cell == "." {
            continue;
        }
        let rate = cell.parse::<f64>().map_err(|_| {
            AppError::schema(format!("Inflation CSV line {line}: invalid rate '{cell}'"))
        })?;
        observations.push((date, rate));
    }

    if observations.is_empty() {
        return Err(AppError::degenerate("Inflation CSV has no usable observations."));
    }
    Ok(InflationSeries::from_observations(observations))
}

/// Reload a previously exported feature matrix.
///
/// The first column must be `date` (as written by `write_matrix_csv`); the
/// remaining header names are taken verbatim. Empty cells read back as
/// missing values.
pub fn load_processed_frame(path: &Path) -> Result<FeatureFrame, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::schema(format!("Failed to open matrix CSV '{}': {e}", path.display()))
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::schema(format!("Failed to read matrix CSV headers: {e}")))?
        .clone();

    let first = headers
        .get(0)
        .map(normalize_header_name)
        .unwrap_or_default();
    if first != "date" {
        return Err(AppError::schema(
            "Matrix CSV must start with a `date` column.",
        ));
    }
    let names: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();

    let mut dates = Vec::new();
    let mut columns: Vec<Vec<Option<f64>>> = vec![Vec::new(); names.len()];

    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        let record = result
            .map_err(|e| AppError::schema(format!("Matrix CSV parse error at line {line}: {e}")))?;
        let raw_date = record
            .get(0)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::schema(format!("Matrix CSV line {line}: empty date cell")))?;
        dates.push(
            parse_date(raw_date)
                .map_err(|e| AppError::schema(format!("Matrix CSV line {line}: {e}")))?,
        );

        for (col, values) in columns.iter_mut().enumerate() {
            let cell = record.get(col + 1).map(str::trim).unwrap_or("");
            if cell.is_empty() {
                values.push(None);
            } else {
                let v = cell.parse::<f64>().map_err(|_| {
                    AppError::schema(
                        format!("Matrix CSV line {line}: invalid number '{cell}' in `{}`", names[col]),
                    )
                })?;
                values.push(Some(v));
            }
        }
    }

    let mut frame = FeatureFrame::new(dates)?;
    for (name, values) in names.iter().zip(columns) {
        frame.insert(name, values)?;
    }
    Ok(frame)
}

fn resolve_sales_source(header_map: &HashMap<String, usize>) -> Result<SalesSource, AppError> {
    if header_map.contains_key("total_sales") || header_map.contains_key("total sales") {
        return Ok(SalesSource::Direct);
    }
    if header_map.contains_key("purchase price per unit") && header_map.contains_key("quantity") {
        return Ok(SalesSource::PriceTimesQuantity);
    }
    Err(AppError::schema(
        "Purchase CSV needs either a `total_sales` column or both `Purchase Price Per Unit` and `Quantity`.",
    ))
}

fn parse_purchase_row(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    source: SalesSource,
) -> Result<PurchaseRow, String> {
    let date = parse_date(get_required(record, header_map, "order date")?)?;

    let total_sales = match source {
        SalesSource::Direct => {
            let raw = get_optional(record, header_map, "total_sales")
                .or_else(|| get_optional(record, header_map, "total sales"))
                .ok_or_else(|| "Missing `total_sales` value.".to_string())?;
            parse_f64(raw, "total_sales")?
        }
        SalesSource::PriceTimesQuantity => {
            let price = parse_f64(
                get_required(record, header_map, "purchase price per unit")?,
                "Purchase Price Per Unit",
            )?;
            let quantity = parse_f64(get_required(record, header_map, "quantity")?, "Quantity")?;
            price * quantity
        }
    };
    if total_sales < 0.0 {
        return Err("Negative sale amount.".to_string());
    }

    let state = get_optional(record, header_map, "shipping address state").map(str::to_string);
    let category = get_optional(record, header_map, "category").map(str::to_string);

    Ok(PurchaseRow {
        date,
        state,
        category,
        total_sales,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header. If we don't strip it, schema validation will incorrectly
    // report missing columns.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("Missing required column: `{name}`"))?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn get_optional<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    // Purchase exports use ISO dates, sometimes with a time suffix; holiday
    // tables occasionally use US-style slashes.
    const DATE_FMTS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
    const DATETIME_FMTS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
    for fmt in DATE_FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    for fmt in DATETIME_FMTS {
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.date());
        }
    }
    Err(format!(
        "Invalid date '{s}'. Expected one of: YYYY-MM-DD, YYYY/MM/DD, MM/DD/YYYY (optionally with a time)."
    ))
}

fn parse_f64(s: &str, name: &str) -> Result<f64, String> {
    let v = s
        .parse::<f64>()
        .map_err(|_| format!("Invalid `{name}` value '{s}'."))?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(format!("Non-finite `{name}` value."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(cells: &[&str]) -> StringRecord {
        StringRecord::from(cells.to_vec())
    }

    fn header_map(names: &[&str]) -> HashMap<String, usize> {
        build_header_map(&record(names))
    }

    #[test]
    fn inflation_series_reads_fred_style_exports() {
        let path = std::env::temp_dir().join("salesfc-inflation-ingest.csv");
        std::fs::write(
            &path,
            "observation_date,T10YIEM\n2022-01-01,2.44\n2022-02-01,.\n2022-03-01,2.87\n",
        )
        .unwrap();
        let series = load_inflation_series(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(series.len(), 2);
        let jan = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
        let feb = NaiveDate::from_ymd_opt(2022, 2, 1).unwrap();
        let mar = NaiveDate::from_ymd_opt(2022, 3, 1).unwrap();
        assert_eq!(series.rate_on(jan), Some(2.44));
        assert_eq!(series.rate_on(feb), None);
        assert_eq!(series.rate_on(mar), Some(2.87));
    }

    #[test]
    fn inflation_series_requires_a_rate_column() {
        let path = std::env::temp_dir().join("salesfc-inflation-no-rate.csv");
        std::fs::write(&path, "observation_date,value\n2022-01-01,2.44\n").unwrap();
        let err = load_inflation_series(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn date_formats() {
        let expected = NaiveDate::from_ymd_opt(2021, 3, 4).unwrap();
        assert_eq!(parse_date("2021-03-04").unwrap(), expected);
        assert_eq!(parse_date("2021/03/04").unwrap(), expected);
        assert_eq!(parse_date("03/04/2021").unwrap(), expected);
        assert_eq!(parse_date("2021-03-04 13:22:01").unwrap(), expected);
        assert!(parse_date("4th of March").is_err());
    }

    #[test]
    fn row_from_price_and_quantity() {
        let map = header_map(&[
            "Order Date",
            "Purchase Price Per Unit",
            "Quantity",
            "Shipping Address State",
            "Category",
        ]);
        let row = parse_purchase_row(
            &record(&["2021-06-21", "12.50", "2", "CA", "ABIS_BOOK"]),
            &map,
            SalesSource::PriceTimesQuantity,
        )
        .unwrap();
        assert_eq!(row.date, NaiveDate::from_ymd_opt(2021, 6, 21).unwrap());
        assert!((row.total_sales - 25.0).abs() < 1e-12);
        assert_eq!(row.state.as_deref(), Some("CA"));
        assert_eq!(row.category.as_deref(), Some("ABIS_BOOK"));
    }

    #[test]
    fn row_with_direct_sales_and_blank_labels() {
        let map = header_map(&["Order Date", "total_sales", "Shipping Address State"]);
        let row = parse_purchase_row(
            &record(&["2021-06-21", "99.0", ""]),
            &map,
            SalesSource::Direct,
        )
        .unwrap();
        assert!((row.total_sales - 99.0).abs() < 1e-12);
        assert_eq!(row.state, None);
        assert_eq!(row.category, None);
    }

    #[test]
    fn sales_source_resolution() {
        assert_eq!(
            resolve_sales_source(&header_map(&["Order Date", "total_sales"])).unwrap(),
            SalesSource::Direct
        );
        assert_eq!(
            resolve_sales_source(&header_map(&[
                "Order Date",
                "Purchase Price Per Unit",
                "Quantity"
            ]))
            .unwrap(),
            SalesSource::PriceTimesQuantity
        );
        assert!(resolve_sales_source(&header_map(&["Order Date"])).is_err());
    }

    #[test]
    fn negative_amount_rejected() {
        let map = header_map(&["Order Date", "total_sales"]);
        assert!(parse_purchase_row(
            &record(&["2021-06-21", "-5.0"]),
            &map,
            SalesSource::Direct
        )
        .is_err());
    }
}
