//! Per-column min-max scaling to [0, 1].
//!
//! The pivoted entity matrix mixes states (or categories) with very different
//! sales volumes; scaling each column before the PCA keeps high-volume
//! entities from dominating every component.
//!
//! The scaler is fit once on the window it will transform and holds its
//! parameters only for the duration of one pipeline run.

use nalgebra::DMatrix;

#[derive(Debug, Clone)]
pub struct MinMaxScaler {
    mins: Vec<f64>,
    maxs: Vec<f64>,
}

impl MinMaxScaler {
    /// Learn per-column minima and maxima.
    pub fn fit(x: &DMatrix<f64>) -> Self {
        let mut mins = vec![f64::INFINITY; x.ncols()];
        let mut maxs = vec![f64::NEG_INFINITY; x.ncols()];
        for j in 0..x.ncols() {
            for i in 0..x.nrows() {
                let v = x[(i, j)];
                mins[j] = mins[j].min(v);
                maxs[j] = maxs[j].max(v);
            }
        }
        Self { mins, maxs }
    }

    /// Map each column into [0, 1] using the fitted statistics.
    ///
    /// Constant columns (max == min) map to 0.0; values outside the fitted
    /// range are clamped into [0, 1] so previously unseen extremes cannot
    /// push a component outside its fitted span.
    pub fn transform(&self, x: &DMatrix<f64>) -> DMatrix<f64> {
        let mut out = x.clone();
        for j in 0..x.ncols() {
            let span = self.maxs[j] - self.mins[j];
            for i in 0..x.nrows() {
                out[(i, j)] = if span > 0.0 {
                    ((x[(i, j)] - self.mins[j]) / span).clamp(0.0, 1.0)
                } else {
                    0.0
                };
            }
        }
        out
    }

    pub fn fit_transform(x: &DMatrix<f64>) -> DMatrix<f64> {
        Self::fit(x).transform(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scales_each_column_into_unit_interval() {
        let x = DMatrix::from_row_slice(3, 2, &[0.0, 10.0, 5.0, 20.0, 10.0, 30.0]);
        let scaled = MinMaxScaler::fit_transform(&x);
        assert_eq!(scaled[(0, 0)], 0.0);
        assert_eq!(scaled[(1, 0)], 0.5);
        assert_eq!(scaled[(2, 0)], 1.0);
        assert_eq!(scaled[(0, 1)], 0.0);
        assert_eq!(scaled[(2, 1)], 1.0);
    }

    #[test]
    fn constant_column_maps_to_zero() {
        let x = DMatrix::from_row_slice(2, 1, &[7.0, 7.0]);
        let scaled = MinMaxScaler::fit_transform(&x);
        assert_eq!(scaled[(0, 0)], 0.0);
        assert_eq!(scaled[(1, 0)], 0.0);
    }

    #[test]
    fn transform_clamps_out_of_range_values() {
        let train = DMatrix::from_row_slice(2, 1, &[0.0, 10.0]);
        let scaler = MinMaxScaler::fit(&train);
        let wild = DMatrix::from_row_slice(2, 1, &[-5.0, 25.0]);
        let scaled = scaler.transform(&wild);
        assert_eq!(scaled[(0, 0)], 0.0);
        assert_eq!(scaled[(1, 0)], 1.0);
    }
}
