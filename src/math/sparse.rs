//! Compressed sparse column (CSC) helpers.
//!
//! Kept as plain callable functions with no construction-time side effects so
//! they can be unit tested and reused by preprocessing code.

use crate::error::AppError;

/// A compressed sparse column matrix over `f64` values.
///
/// `ptr` has `ncol + 1` entries; column `j` owns `data[ptr[j]..ptr[j + 1]]`.
#[derive(Debug, Clone)]
pub struct CscMatrix {
    pub nrow: usize,
    pub ncol: usize,
    pub data: Vec<f64>,
    pub ind: Vec<usize>,
    pub ptr: Vec<usize>,
}

impl CscMatrix {
    pub fn new(
        data: Vec<f64>,
        ind: Vec<usize>,
        ptr: Vec<usize>,
        shape: (usize, usize),
    ) -> Result<Self, AppError> {
        let (nrow, ncol) = shape;
        if ptr.len() != ncol + 1 {
            return Err(AppError::internal(
                format!("CSC pointer array has {} entries for {ncol} columns.", ptr.len()),
            ));
        }
        if data.len() != ind.len() {
            return Err(AppError::internal(
                "CSC data and index arrays must have equal length.",
            ));
        }
        if ptr.last().copied().unwrap_or(0) != data.len() {
            return Err(AppError::internal("CSC pointer array does not cover all data."));
        }
        Ok(Self {
            nrow,
            ncol,
            data,
            ind,
            ptr,
        })
    }

    /// Mean of the stored (nonzero) entries of each column.
    ///
    /// Columns with no stored entries report 0.0.
    pub fn col_means(&self) -> Vec<f64> {
        (0..self.ncol)
            .map(|j| {
                let start = self.ptr[j];
                let end = self.ptr[j + 1];
                if end == start {
                    0.0
                } else {
                    self.data[start..end].iter().sum::<f64>() / (end - start) as f64
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn col_means_over_stored_entries() {
        let m = CscMatrix::new(
            vec![33.0, 11.0, 55.0, 22.0, 44.0],
            vec![1, 0, 2, 0, 1],
            vec![0, 1, 3, 3, 5],
            (3, 4),
        )
        .unwrap();
        let means = m.col_means();
        assert_eq!(means, vec![33.0, 33.0, 0.0, 33.0]);
    }

    #[test]
    fn invalid_pointer_length_is_rejected() {
        assert!(CscMatrix::new(vec![1.0], vec![0], vec![0, 1], (1, 2)).is_err());
    }
}
