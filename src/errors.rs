// /src/errors.rs
//! Error type shared by every stage of the reconciliation pipeline
use crate::types::Identity;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReconcilerError {
    #[error("Duplicate section identity '{id}' at index {index}")]
    DuplicateSection { id: Identity, index: usize },

    #[error("Duplicate cell identity '{id}' at item {index} of section {section}")]
    DuplicateCell {
        section: usize,
        id: Identity,
        index: usize,
    },

    #[error("Component kind mismatch: instance holds '{expected}', got '{actual}'")]
    KindMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Component '{component}' can only render into '{content}'")]
    ContentMismatch {
        component: &'static str,
        content: &'static str,
    },

    #[error("Index out of range: {details}")]
    IndexOutOfRange { details: String },

    #[error("Container failed: {0}")]
    Container(String),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

/// Turns an `Option` lookup into an `IndexOutOfRange` error.
#[macro_export]
macro_rules! ensure_index {
    ($lookup:expr, $($fmt:tt)+) => {{
        ($lookup).ok_or_else(|| $crate::errors::ReconcilerError::IndexOutOfRange {
            details: format!($($fmt)+),
        })?
    }};
}
