//! The model seam.
//!
//! Feature assembly hands the model layer a design matrix built from the
//! sorted column contract; anything that can fit on one and predict from
//! another implements [`Regressor`]. The built-in [`LinearModel`] is an
//! ordinary-least-squares fit with an intercept, which is enough to exercise
//! the full train/forecast loop end to end.

use nalgebra::{DMatrix, DVector};

use crate::error::AppError;
use crate::math::solve_least_squares;

/// Anything that fits a design matrix against a target vector and predicts
/// from a matrix with the same column contract.
pub trait Regressor {
    fn fit(&mut self, x: &DMatrix<f64>, y: &DVector<f64>) -> Result<(), AppError>;
    fn predict(&self, x: &DMatrix<f64>) -> Result<DVector<f64>, AppError>;
}

/// OLS with an intercept column.
#[derive(Debug, Clone, Default)]
pub struct LinearModel {
    /// Intercept first, then one coefficient per contract column.
    coefficients: Option<DVector<f64>>,
}

impl LinearModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fitted coefficients excluding the intercept, or `None` before `fit`.
    pub fn feature_coefficients(&self) -> Option<&[f64]> {
        self.coefficients
            .as_ref()
            .map(|beta| &beta.as_slice()[1..])
    }

    pub fn intercept(&self) -> Option<f64> {
        self.coefficients.as_ref().map(|beta| beta[0])
    }

    fn with_intercept(x: &DMatrix<f64>) -> DMatrix<f64> {
        let mut out = DMatrix::<f64>::from_element(x.nrows(), x.ncols() + 1, 1.0);
        out.view_mut((0, 1), (x.nrows(), x.ncols())).copy_from(x);
        out
    }
}

impl Regressor for LinearModel {
    fn fit(&mut self, x: &DMatrix<f64>, y: &DVector<f64>) -> Result<(), AppError> {
        if x.nrows() != y.len() {
            return Err(AppError::internal(
                "Design matrix and target vector disagree on row count.",
            ));
        }
        if x.nrows() == 0 {
            return Err(AppError::degenerate("Cannot fit a model on zero rows."));
        }
        let design = Self::with_intercept(x);
        let beta = solve_least_squares(&design, y)
            .ok_or_else(|| AppError::internal("Least-squares solve failed (SVD did not converge)."))?;
        self.coefficients = Some(beta);
        Ok(())
    }

    fn predict(&self, x: &DMatrix<f64>) -> Result<DVector<f64>, AppError> {
        let beta = self
            .coefficients
            .as_ref()
            .ok_or_else(|| AppError::internal("Model queried before fitting."))?;
        if x.ncols() + 1 != beta.len() {
            return Err(AppError::internal(
                format!(
                    "Prediction matrix has {} columns but the model was fit on {}.",
                    x.ncols(),
                    beta.len() - 1
                ),
            ));
        }
        Ok(Self::with_intercept(x) * beta)
    }
}
