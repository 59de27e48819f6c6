use thiserror::Error;

/// Errors raised by the standardizer and the PCA / LDA transforms.
///
/// None of these are retryable: they describe the input, not a transient
/// condition, so the same call fails the same way until the data or `k`
/// changes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReductionError {
    /// Shape, component count or label vector out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A feature column has zero variance and cannot be standardized.
    #[error("degenerate input: feature {feature} has zero variance")]
    DegenerateInput { feature: usize },

    #[error("singular matrix in step `{step}`: matrix is not invertible")]
    SingularMatrix { step: &'static str },

    /// The eigensolver or SVD backend did not produce a usable result.
    #[error("decomposition failed: {0}")]
    Decomposition(String),
}

pub type Result<T> = std::result::Result<T, ReductionError>;

impl ReductionError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        ReductionError::InvalidArgument(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_cause() {
        let err = ReductionError::DegenerateInput { feature: 3 };
        assert_eq!(err.to_string(), "degenerate input: feature 3 has zero variance");

        let err = ReductionError::SingularMatrix { step: "within-class scatter inverse" };
        assert!(err.to_string().contains("within-class scatter inverse"));

        let err = ReductionError::invalid("k must be positive");
        assert_eq!(err.to_string(), "invalid argument: k must be positive");
    }
}
