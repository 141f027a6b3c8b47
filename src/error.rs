use thiserror::Error;

/// Error types for the clustering primitives
#[derive(Error, Debug)]
pub enum ClusterError {
    /// A parameter is out of range or otherwise malformed
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Not enough data points for the requested number of clusters
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Model has not been fitted yet
    #[error("Model has not been fitted. Call fit() first.")]
    NotFitted,

    /// Dimension mismatch between inputs
    #[error("Dimension mismatch: {0}")]
    InvalidDimensions(String),

    /// A validation-metric collaborator failed to score a labeling
    #[error("Validation failed: {0}")]
    Validation(String),
}
