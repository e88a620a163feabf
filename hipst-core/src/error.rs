use thiserror::Error;

/// Errors raised while building or driving a component tree.
#[derive(Debug, Error)]
pub enum Error {
    #[error("operation `{0}` is already defined")]
    DuplicateOperation(String),

    #[error("`{tag}` has no operation named `{name}`")]
    UnknownOperation { tag: String, name: String },

    #[error("appending `{tag}` would make it its own ancestor")]
    Cycle { tag: String },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias using the crate's Error.
pub type Result<T> = std::result::Result<T, Error>;
