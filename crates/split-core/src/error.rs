use thiserror::Error;

/// Errors from the allocation engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SplitError {
    /// Malformed or out-of-range input. Raised before any computation.
    #[error("invalid input for {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    /// The remainder correction could not be placed within the pass limit.
    ///
    /// Never produced for valid input; exists as a guarded assertion.
    #[error("allocation unstable: {units} correction units across {entries} entries")]
    AllocationUnstable { units: i64, entries: usize },
}

impl SplitError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, SplitError::InvalidInput { .. })
    }

    pub fn is_unstable(&self) -> bool {
        matches!(self, SplitError::AllocationUnstable { .. })
    }
}
