//! Pipeline error type.
//!
//! Every failure in the crate falls into one of three buckets, and the bucket
//! decides the process exit code:
//!
//! - [`AppError::schema`] (exit 2): the input cannot be understood. Missing
//!   CSV columns, unparseable dates, a non-monotonic date index, a forecast
//!   range that precedes the history.
//! - [`AppError::degenerate`] (exit 3): the input parses but carries nothing
//!   to work with. No valid purchase rows, no entity labels for the signal
//!   pivot, an empty matrix after the training cutoff.
//! - [`AppError::internal`] (exit 4): a numeric or invariant failure inside
//!   the pipeline. SVD non-convergence, a column whose length disagrees with
//!   the date index, a model queried before fitting.
//!
//! Scripts driving `salesfc` branch on the exit code; the message is for the
//! human reading stderr.

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    /// Input/schema error (exit 2).
    pub fn schema(message: impl Into<String>) -> Self {
        Self {
            exit_code: 2,
            message: message.into(),
        }
    }

    /// Degenerate-data error (exit 3).
    pub fn degenerate(message: impl Into<String>) -> Self {
        Self {
            exit_code: 3,
            message: message.into(),
        }
    }

    /// Numeric/internal error (exit 4).
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            exit_code: 4,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_carry_their_exit_codes() {
        assert_eq!(AppError::schema("x").exit_code(), 2);
        assert_eq!(AppError::degenerate("x").exit_code(), 3);
        assert_eq!(AppError::internal("x").exit_code(), 4);
    }

    #[test]
    fn display_shows_the_message_only() {
        let err = AppError::schema("Missing required column: `Order Date`");
        assert_eq!(err.to_string(), "Missing required column: `Order Date`");
    }
}
