//! Virtual filesystem layer.
//!
//! Maps the `(dir, file_name)` address space onto the flat `files` table:
//! - [`address`] turns request paths into tagged addresses (file vs. directory)
//! - [`listing`] validates listing parameters and builds the listing query

pub mod address;
pub mod listing;

use thiserror::Error;

/// Rejected input, raised before the store is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("[orderBy] field {0} is not allowed")]
    OrderByNotAllowed(String),
    #[error("[orderDirection] field {0} is not allowed")]
    OrderDirectionNotAllowed(String),
    #[error("Both [orderBy] and [orderDirection] fields must be specified")]
    UnpairedOrdering,
    #[error("file {0} must be a file")]
    NotAFile(String),
    #[error("invalid path `{path}`: {reason}")]
    InvalidPath { path: String, reason: &'static str },
    #[error("multipart field `{0}` is missing")]
    MissingUpload(&'static str),
}
