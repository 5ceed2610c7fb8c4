//! Least squares solver.
//!
//! The linear model seam solves a single tall regression problem
//! `minimize Σ (y_i - x_i^T β)^2` over the assembled feature matrix.
//!
//! Implementation choices:
//! - SVD solve, because the design matrix is tall (many daily rows, few
//!   dozen feature columns) and one-hot event blocks can be collinear with
//!   the calendar features for sparse histories.
//! - Progressively looser tolerances: a strict solve fails on near-singular
//!   designs that are still perfectly usable for point forecasts.

use nalgebra::{DMatrix, DVector};

/// Singular-value cutoffs tried in order, strictest first. The loosest step
/// still rejects the near-null directions a collinear one-hot block produces
/// while keeping the calendar and lag coefficients usable.
const RANK_TOLERANCES: [f64; 3] = [1e-10, 1e-8, 1e-6];

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    for &tol in &RANK_TOLERANCES {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn collinear_columns_still_solve() {
        // Second column duplicates the first, as when a one-hot block is
        // linearly dependent on the intercept.
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 1.0, 2.0, 2.0, 3.0, 3.0]);
        let y = DVector::from_row_slice(&[2.0, 4.0, 6.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        let fitted = &x * &beta;
        for i in 0..3 {
            assert!((fitted[i] - y[i]).abs() < 1e-8);
        }
    }
}
