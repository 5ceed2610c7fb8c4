//! Shared domain types for the sales-forecast pipeline.

mod frame;
mod types;

pub use frame::FeatureFrame;
pub use types::*;
