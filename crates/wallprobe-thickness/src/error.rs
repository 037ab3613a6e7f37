//! Error types for thickness probing.

use thiserror::Error;

/// Errors that can occur while probing wall thickness.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ThicknessError {
    /// Input has no faces, nodes or triangles.
    #[error("input mesh is empty")]
    EmptyMesh,

    /// Settings failed validation or could not be parsed.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// The requested probing method has no implementation.
    #[error("unsupported probing method: {0}")]
    UnsupportedMethod(&'static str),
}

/// Result type for thickness operations.
pub type Result<T> = std::result::Result<T, ThicknessError>;
