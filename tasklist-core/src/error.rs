//! Core error types for tasklist domain logic
//!
//! The codec itself never fails; these errors cover collection lookups,
//! edits that would break a task invariant, and loading a list.

use std::path::PathBuf;

use thiserror::Error;

use crate::task::TaskId;

/// Failure to load a task list into a collection.
///
/// A failed load never leaves partial state behind.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Task list {} does not exist", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read task list: {source}")]
    Io {
        #[source]
        source: std::io::Error,
    },
}

/// Core domain errors
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Task #{0} not found")]
    TaskNotFound(TaskId),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },
}

impl CoreError {
    /// Create a validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
