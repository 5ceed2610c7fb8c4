//! Numeric building blocks: least squares, scaling, PCA, sparse helpers.

pub mod ols;
pub mod pca;
pub mod scale;
pub mod sparse;

pub use ols::solve_least_squares;
pub use pca::Pca;
pub use scale::MinMaxScaler;
