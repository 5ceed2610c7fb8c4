//! Principal component analysis via SVD.
//!
//! The entity-signal engine projects the scaled (date × entity) sales matrix
//! onto a fixed number of components. Requirements that shaped this
//! implementation:
//!
//! - **Deterministic**: no RNG. SVD sign ambiguity is resolved by forcing the
//!   largest-magnitude loading of each component to be positive, so repeated
//!   runs produce byte-identical features.
//! - **Rank-tolerant**: short histories can have rank below the requested
//!   component count; surplus components are zero rather than an error, so
//!   the `S1`/`S2`/`S3` columns always exist.

use nalgebra::{DMatrix, DVector};

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct Pca {
    mean: DVector<f64>,
    /// One row per component (k × p), ordered by decreasing singular value.
    components: DMatrix<f64>,
}

impl Pca {
    /// Fit `n_components` principal components on the given matrix.
    pub fn fit(x: &DMatrix<f64>, n_components: usize) -> Result<Self, AppError> {
        if n_components == 0 {
            return Err(AppError::internal("PCA requires at least one component."));
        }
        if x.nrows() == 0 || x.ncols() == 0 {
            return Err(AppError::degenerate("PCA input matrix is empty."));
        }

        let mean = column_means(x);
        let centered = center(x, &mean);

        let svd = centered.svd(true, true);
        let v_t = svd
            .v_t
            .ok_or_else(|| AppError::internal("SVD failed to produce right singular vectors."))?;

        // Order components by decreasing singular value; nalgebra does not
        // guarantee an ordering, so we sort explicitly (ties keep original
        // order for determinism).
        let mut order: Vec<usize> = (0..svd.singular_values.len()).collect();
        order.sort_by(|&a, &b| {
            svd.singular_values[b]
                .partial_cmp(&svd.singular_values[a])
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.cmp(&b))
        });

        let p = x.ncols();
        let mut components = DMatrix::<f64>::zeros(n_components, p);
        for (row, &src) in order.iter().take(n_components).enumerate() {
            // Skip numerically null directions; their rows stay zero.
            if svd.singular_values[src] <= 1e-12 {
                continue;
            }
            for j in 0..p {
                components[(row, j)] = v_t[(src, j)];
            }
            fix_sign(&mut components, row);
        }

        Ok(Self { mean, components })
    }

    /// Project a matrix with the same column layout onto the fitted components.
    pub fn transform(&self, x: &DMatrix<f64>) -> Result<DMatrix<f64>, AppError> {
        if x.ncols() != self.mean.len() {
            return Err(AppError::internal(
                format!(
                    "PCA transform expects {} columns, got {}.",
                    self.mean.len(),
                    x.ncols()
                ),
            ));
        }
        let centered = center(x, &self.mean);
        Ok(&centered * self.components.transpose())
    }

    pub fn fit_transform(x: &DMatrix<f64>, n_components: usize) -> Result<DMatrix<f64>, AppError> {
        Self::fit(x, n_components)?.transform(x)
    }

    pub fn n_components(&self) -> usize {
        self.components.nrows()
    }
}

fn column_means(x: &DMatrix<f64>) -> DVector<f64> {
    let n = x.nrows() as f64;
    DVector::from_iterator(x.ncols(), (0..x.ncols()).map(|j| x.column(j).sum() / n))
}

fn center(x: &DMatrix<f64>, mean: &DVector<f64>) -> DMatrix<f64> {
    let mut out = x.clone();
    for j in 0..x.ncols() {
        for i in 0..x.nrows() {
            out[(i, j)] -= mean[j];
        }
    }
    out
}

/// Force the largest-magnitude loading of component `row` to be positive.
fn fix_sign(components: &mut DMatrix<f64>, row: usize) {
    let mut pivot = 0.0_f64;
    for j in 0..components.ncols() {
        let v = components[(row, j)];
        if v.abs() > pivot.abs() {
            pivot = v;
        }
    }
    if pivot < 0.0 {
        for j in 0..components.ncols() {
            components[(row, j)] = -components[(row, j)];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_component_captures_dominant_direction() {
        // Points spread along the x-axis with small y noise: PC1 must be
        // essentially the x direction.
        let x = DMatrix::from_row_slice(
            4,
            2,
            &[-3.0, 0.1, -1.0, -0.1, 1.0, 0.1, 3.0, -0.1],
        );
        let pca = Pca::fit(&x, 2).unwrap();
        let scores = pca.transform(&x).unwrap();

        // Projections onto PC1 recover the spread order of the x coordinate.
        assert!(scores[(0, 0)] < scores[(1, 0)]);
        assert!(scores[(1, 0)] < scores[(2, 0)]);
        assert!(scores[(2, 0)] < scores[(3, 0)]);
    }

    #[test]
    fn fit_is_deterministic_across_runs() {
        let x = DMatrix::from_row_slice(3, 3, &[1.0, 2.0, 3.0, 4.0, 6.0, 5.0, 7.0, 8.0, 10.0]);
        let a = Pca::fit_transform(&x, 3).unwrap();
        let b = Pca::fit_transform(&x, 3).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rank_deficient_input_yields_zero_surplus_components() {
        // Two identical rows: rank 0 after centering on the second axis.
        let x = DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 2.0, 2.0]);
        let pca = Pca::fit(&x, 3).unwrap();
        let scores = pca.transform(&x).unwrap();
        assert_eq!(pca.n_components(), 3);
        // Component 2 and 3 are null directions: all scores zero.
        for i in 0..2 {
            assert_eq!(scores[(i, 2)], 0.0);
        }
    }

    #[test]
    fn empty_input_is_rejected() {
        let x = DMatrix::<f64>::zeros(0, 3);
        assert!(Pca::fit(&x, 3).is_err());
    }
}
