//! Error types for facet and hierarchy construction.

use thiserror::Error;

/// Errors that can occur while building a facet set or its hierarchy.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BvhError {
    /// The input has no faces, nodes or triangles to work with.
    #[error("input is empty: {0}")]
    EmptyInput(&'static str),

    /// Invalid build parameters.
    #[error("invalid build parameters: {0}")]
    InvalidParams(String),
}

/// Result type for hierarchy operations.
pub type Result<T> = std::result::Result<T, BvhError>;
