//! Shared types and utilities for rusty-artifactory.
//!
//! This crate provides common functionality used across all rusty-artifactory crates:
//! - Constants for bundle probing and property validation
//! - URI and file name parsing helpers
//! - Case-insensitive source file resolution for uploads
//! - Shared error types

pub mod constants;
pub mod error;
pub mod path_utils;

// Re-export commonly used items at crate root
pub use constants::*;
pub use error::PathError;
pub use path_utils::{
    artifact_name_from_uri, artifact_uri_from_download_uri, ensure_trailing_slash,
    file_extension, file_name_from_uri, image_name_from_file_name, insert_suffix_after_prefix,
    insert_suffix_before_extension, list_file_names, parent_uri, require_source_file_name,
    resolve_source_file_name,
};
