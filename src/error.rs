use std::path::PathBuf;

use thiserror::Error;

pub type StackResult<T> = Result<T, StackError>;

#[derive(Debug, Error)]
pub enum StackError {
    /// the package the stack serves is not part of the workspace.
    /// nothing gets declared when this happens.
    #[error("Failed to find workspace path for package '{package}'")]
    PackageNotFound { package: String },

    #[error("Validation failed on resource '{name}'\n{reason}")]
    InvalidResource { name: String, reason: String },

    #[error("Resource '{0}' was declared more than once")]
    DuplicateResource(String),

    #[error("Invalid stack name {name}\n{reason}")]
    InvalidStackName { name: String, reason: String },

    #[error("Failed to read {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path:?}\n{reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("Failed to serialize template")]
    Serialize(#[from] serde_json::Error),
}
