//! Date-indexed columnar feature table.
//!
//! `FeatureFrame` is the one data structure threaded through the feature
//! pipeline. Design goals:
//!
//! - **Strict index invariant**: dates strictly increasing, no duplicates.
//!   Positional-lag semantics depend on this, so it is validated at every
//!   construction/concatenation point rather than assumed.
//! - **Deterministic column order**: columns live in a `BTreeMap`, so
//!   iteration order is the sorted order the final feature contract requires.
//! - **Explicit missingness**: cells are `Option<f64>`; boolean features are
//!   stored as 0.0/1.0. Missing values only become 0.0 at the model seam
//!   (`to_design_matrix`), never earlier.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate};
use nalgebra::{DMatrix, DVector};

use crate::error::AppError;

#[derive(Debug, Clone, Default)]
pub struct FeatureFrame {
    index: Vec<NaiveDate>,
    columns: BTreeMap<String, Vec<Option<f64>>>,
}

impl FeatureFrame {
    /// Create an empty frame over the given date index.
    ///
    /// Fails with an alignment error if the index is not strictly increasing.
    pub fn new(index: Vec<NaiveDate>) -> Result<Self, AppError> {
        ensure_strictly_increasing(&index)?;
        Ok(Self {
            index,
            columns: BTreeMap::new(),
        })
    }

    /// Build a one-column frame from `(date, value)` pairs.
    ///
    /// The pairs are sorted by date here; duplicate dates are still rejected.
    pub fn from_series(
        name: &str,
        mut pairs: Vec<(NaiveDate, f64)>,
    ) -> Result<Self, AppError> {
        pairs.sort_by_key(|(d, _)| *d);
        let index: Vec<NaiveDate> = pairs.iter().map(|(d, _)| *d).collect();
        let mut frame = Self::new(index)?;
        let values = pairs.into_iter().map(|(_, v)| Some(v)).collect();
        frame.insert(name, values)?;
        Ok(frame)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.index
    }

    /// Column names in sorted order.
    pub fn column_names(&self) -> Vec<String> {
        self.columns.keys().cloned().collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// Look up a column that the pipeline requires, with a schema error naming
    /// the missing column on failure.
    pub fn require_column(&self, name: &str) -> Result<&[Option<f64>], AppError> {
        self.column(name)
            .ok_or_else(|| AppError::schema(format!("Missing required column: `{name}`")))
    }

    /// Insert (or overwrite) a column. The length must match the index.
    pub fn insert(&mut self, name: &str, values: Vec<Option<f64>>) -> Result<(), AppError> {
        if values.len() != self.index.len() {
            return Err(AppError::internal(
                format!(
                    "Column `{name}` has {} values for {} index rows.",
                    values.len(),
                    self.index.len()
                ),
            ));
        }
        self.columns.insert(name.to_string(), values);
        Ok(())
    }

    /// Insert a boolean column stored as 0.0/1.0.
    pub fn insert_flags(&mut self, name: &str, values: Vec<bool>) -> Result<(), AppError> {
        self.insert(
            name,
            values
                .into_iter()
                .map(|b| Some(if b { 1.0 } else { 0.0 }))
                .collect(),
        )
    }

    pub fn remove_column(&mut self, name: &str) -> Option<Vec<Option<f64>>> {
        self.columns.remove(name)
    }

    /// Left-join every column of `other` onto this frame by date.
    ///
    /// Rows of `self` without a matching date in `other` get `None`;
    /// same-named columns are overwritten (last merge wins).
    pub fn left_join(&mut self, other: &FeatureFrame) -> Result<(), AppError> {
        let positions: HashMap<NaiveDate, usize> = other
            .index
            .iter()
            .enumerate()
            .map(|(i, d)| (*d, i))
            .collect();

        let row_map: Vec<Option<usize>> = self
            .index
            .iter()
            .map(|d| positions.get(d).copied())
            .collect();

        for (name, values) in &other.columns {
            let aligned: Vec<Option<f64>> = row_map
                .iter()
                .map(|pos| pos.and_then(|i| values[i]))
                .collect();
            self.columns.insert(name.clone(), aligned);
        }
        Ok(())
    }

    /// Keep only rows whose date satisfies the predicate.
    pub fn filter_rows(&self, keep: impl Fn(NaiveDate) -> bool) -> FeatureFrame {
        let mask: Vec<bool> = self.index.iter().map(|d| keep(*d)).collect();
        self.retain_rows(&mask)
    }

    /// Keep only rows where the mask is true. The mask length must match.
    pub fn retain_rows(&self, mask: &[bool]) -> FeatureFrame {
        let index: Vec<NaiveDate> = self
            .index
            .iter()
            .zip(mask)
            .filter(|(_, m)| **m)
            .map(|(d, _)| *d)
            .collect();
        let columns = self
            .columns
            .iter()
            .map(|(name, values)| {
                let kept: Vec<Option<f64>> = values
                    .iter()
                    .zip(mask)
                    .filter(|(_, m)| **m)
                    .map(|(v, _)| *v)
                    .collect();
                (name.clone(), kept)
            })
            .collect();
        FeatureFrame { index, columns }
    }

    /// Keep only rows with `date.year() < year`.
    pub fn truncate_before_year(&self, year: i32) -> FeatureFrame {
        self.filter_rows(|d| d.year() < year)
    }

    /// Append `other` below this frame.
    ///
    /// The column set becomes the union (missing cells are `None`), and the
    /// combined index must still be strictly increasing; history and horizon
    /// may not overlap.
    pub fn concat_rows(mut self, other: FeatureFrame) -> Result<FeatureFrame, AppError> {
        let n_top = self.index.len();
        let n_bottom = other.index.len();

        let mut index = self.index;
        index.extend(other.index.iter().copied());
        ensure_strictly_increasing(&index)?;

        let mut columns: BTreeMap<String, Vec<Option<f64>>> = BTreeMap::new();
        for (name, mut values) in std::mem::take(&mut self.columns) {
            match other.columns.get(&name) {
                Some(bottom) => values.extend(bottom.iter().copied()),
                None => values.extend(std::iter::repeat(None).take(n_bottom)),
            }
            columns.insert(name, values);
        }
        for (name, bottom) in &other.columns {
            if !columns.contains_key(name) {
                let mut values: Vec<Option<f64>> = vec![None; n_top];
                values.extend(bottom.iter().copied());
                columns.insert(name.clone(), values);
            }
        }

        Ok(FeatureFrame { index, columns })
    }

    /// Reindex to exactly the given column set, in the given order's sorted
    /// form (the map keeps names sorted regardless).
    ///
    /// Names absent from the frame become all-`None` columns. Downstream
    /// callers therefore must supply frames whose columns are a superset of
    /// the contract, or they will silently feed missing features to the model.
    pub fn reindex_columns(&self, names: &[String]) -> FeatureFrame {
        let n = self.index.len();
        let columns = names
            .iter()
            .map(|name| {
                let values = self
                    .columns
                    .get(name)
                    .cloned()
                    .unwrap_or_else(|| vec![None; n]);
                (name.clone(), values)
            })
            .collect();
        FeatureFrame {
            index: self.index.clone(),
            columns,
        }
    }

    /// Build the dense design matrix handed to a regressor.
    ///
    /// Missing cells are imputed as 0.0 at this seam only; the regressors in
    /// this crate treat absent lags as "no signal" rather than erroring.
    pub fn to_design_matrix(&self, names: &[String]) -> Result<DMatrix<f64>, AppError> {
        let n = self.index.len();
        let mut x = DMatrix::<f64>::zeros(n, names.len());
        for (j, name) in names.iter().enumerate() {
            let values = self.require_column(name)?;
            for (i, v) in values.iter().enumerate() {
                x[(i, j)] = v.unwrap_or(0.0);
            }
        }
        Ok(x)
    }

    /// Extract a column as a target vector; missing target values are a
    /// degenerate-data error rather than silently imputed.
    pub fn to_target_vector(&self, name: &str) -> Result<DVector<f64>, AppError> {
        let values = self.require_column(name)?;
        let mut y = DVector::<f64>::zeros(values.len());
        for (i, v) in values.iter().enumerate() {
            y[i] = v.ok_or_else(|| {
                AppError::degenerate(format!("Target column `{name}` has a missing value."))
            })?;
        }
        Ok(y)
    }
}

fn ensure_strictly_increasing(index: &[NaiveDate]) -> Result<(), AppError> {
    for pair in index.windows(2) {
        if pair[1] <= pair[0] {
            return Err(AppError::schema(
                format!(
                    "Date index is not strictly increasing: {} followed by {}.",
                    pair[0], pair[1]
                ),
            ));
        }
    }
    Ok(())
}
