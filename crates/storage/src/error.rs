//! Error types for repository operations.

use rusty_artifactory_common::PathError;
use thiserror::Error;

/// Errors that can occur during repository operations.
#[derive(Error, Debug, Clone)]
pub enum RepositoryError {
    /// Required input was empty or malformed. Detected before any network call.
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// A search, listing or lookup produced nothing.
    #[error("Not found: {what}")]
    NotFound { what: String },

    /// Several candidates remain and none of the rules could pick one.
    #[error("Ambiguous result: {message}")]
    AmbiguousResult { message: String },

    /// The remote call failed.
    ///
    /// `status` is `None` when no response was received at all.
    #[error("Transport error{}: {message}", .status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default())]
    Transport { message: String, status: Option<u16> },

    /// A required local source file does not exist.
    #[error("Source file missing: {path}")]
    SourceFileMissing { path: String },

    /// A multi-file transfer stopped partway. Files already transferred stay in place.
    #[error("Bundle transfer failed at {stage} after {} file(s): {source}", .completed.len())]
    PartialBundleFailure {
        stage: String,
        completed: Vec<String>,
        source: Box<RepositoryError>,
    },

    /// Local I/O error.
    #[error("I/O error for {path}: {message}")]
    IoError { path: String, message: String },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl RepositoryError {
    /// Shorthand for an `InvalidArgument` error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        RepositoryError::InvalidArgument {
            message: message.into(),
        }
    }

    /// Shorthand for a `NotFound` error.
    pub fn not_found(what: impl Into<String>) -> Self {
        RepositoryError::NotFound { what: what.into() }
    }

    /// True for `NotFound`.
    pub fn is_not_found(&self) -> bool {
        matches!(self, RepositoryError::NotFound { .. })
    }

    /// True when the remote could not be reached at all (no HTTP status).
    ///
    /// Per-candidate lookups treat HTTP-level failures as "no match" but
    /// abort on these.
    pub fn is_network_failure(&self) -> bool {
        matches!(self, RepositoryError::Transport { status: None, .. })
    }
}

impl From<std::io::Error> for RepositoryError {
    fn from(err: std::io::Error) -> Self {
        RepositoryError::IoError {
            path: String::new(),
            message: err.to_string(),
        }
    }
}

impl From<PathError> for RepositoryError {
    fn from(err: PathError) -> Self {
        match err {
            PathError::FileNotFound { path } => RepositoryError::SourceFileMissing { path },
            PathError::IoError { path, message } => RepositoryError::IoError { path, message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_display_with_status() {
        let err = RepositoryError::Transport {
            message: "unexpected response".into(),
            status: Some(500),
        };
        assert_eq!(err.to_string(), "Transport error (HTTP 500): unexpected response");
        assert!(!err.is_network_failure());
    }

    #[test]
    fn test_transport_display_without_status() {
        let err = RepositoryError::Transport {
            message: "connection refused".into(),
            status: None,
        };
        assert_eq!(err.to_string(), "Transport error: connection refused");
        assert!(err.is_network_failure());
    }

    #[test]
    fn test_partial_bundle_failure_display() {
        let err = RepositoryError::PartialBundleFailure {
            stage: "image.mf".into(),
            completed: vec!["image.ovf".into()],
            source: Box::new(RepositoryError::not_found("image.mf")),
        };
        assert_eq!(
            err.to_string(),
            "Bundle transfer failed at image.mf after 1 file(s): Not found: image.mf"
        );
    }

    #[test]
    fn test_path_error_conversion() {
        let err: RepositoryError = PathError::FileNotFound {
            path: "/src/image.mf".into(),
        }
        .into();
        assert!(matches!(err, RepositoryError::SourceFileMissing { .. }));
    }
}
