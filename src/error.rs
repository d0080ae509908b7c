use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the clashcut engine.
#[derive(Debug, Error)]
pub enum ClashcutError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Placement(#[from] PlacementError),
}

/// Errors in the operator-supplied configuration.
///
/// These abort a run before any document mutation has happened.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("document has no saved path; save it next to the model files first")]
    DocumentNotSaved,

    #[error("view not found: {0}")]
    ViewNotFound(String),

    #[error("section region is not active in view '{0}'")]
    SectionRegionInactive(String),

    #[error("template '{name}' with type '{type_label}' not found on the search path")]
    TemplateNotFound { name: String, type_label: String },

    #[error("role keyword must not be empty")]
    EmptyKeyword,
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("zero-length vector")]
    ZeroVector,

    #[error("triangulation failed: {0}")]
    Triangulation(String),
}

/// Errors raised by the host document model.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("entity not found: {0}")]
    EntityNotFound(&'static str),

    #[error("failed to load model '{path}': {reason}")]
    ModelLoadFailed { path: PathBuf, reason: String },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while instantiating an opening.
///
/// These are recovered per clash record (fallback, then recorded failure)
/// and only escape a batch when the document itself is inconsistent.
#[derive(Debug, Error)]
pub enum PlacementError {
    #[error("template instantiation failed: {0}")]
    Instantiation(String),

    #[error("no building story available for fallback placement")]
    NoLevels,
}

/// Convenience type alias for results using [`ClashcutError`].
pub type Result<T> = std::result::Result<T, ClashcutError>;
