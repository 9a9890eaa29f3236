//! Shared data structures for repository operations.

use std::fmt;

use log::LevelFilter;
use serde::{Deserialize, Serialize};

use crate::error::RepositoryError;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration settings for talking to the repository server.
#[derive(Clone)]
pub struct RepositorySettings {
    /// API root, e.g. `https://host/artifactory/api` (no trailing slash).
    pub server_api: String,
    /// Bearer token.
    pub token: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Maximum log level for this library's messages.
    pub log_level: LevelFilter,
}

impl fmt::Debug for RepositorySettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepositorySettings")
            .field("server_api", &self.server_api)
            .field("token", &"[REDACTED]")
            .field("timeout_secs", &self.timeout_secs)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl RepositorySettings {
    /// Create settings with default timeout and `INFO` logging.
    pub fn new(server_api: impl Into<String>, token: impl Into<String>) -> Self {
        let server_api: String = server_api.into();
        Self {
            server_api: server_api.trim_end_matches('/').to_string(),
            token: token.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            log_level: LevelFilter::Info,
        }
    }

    /// Load settings from environment variables.
    ///
    /// Variables:
    /// - `ARTIFACTORY_SERVER` (required)
    /// - `ARTIFACTORY_TOKEN` (required)
    /// - `ARTIFACTORY_LOGGING` (`DEBUG`, `INFO`, `WARN` or `ERROR`; default `INFO`)
    /// - `ARTIFACTORY_TIMEOUT_SECS` (default 30)
    pub fn from_env() -> Result<Self, RepositoryError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary variable lookup.
    ///
    /// # Arguments
    /// * `lookup` - Returns the value for a variable name, if set
    pub fn from_lookup<F>(lookup: F) -> Result<Self, RepositoryError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server_api: String = lookup("ARTIFACTORY_SERVER")
            .filter(|s| !s.is_empty())
            .ok_or_else(|| RepositoryError::InvalidConfig {
                message: "ARTIFACTORY_SERVER environment variable is required".into(),
            })?;
        let token: String = lookup("ARTIFACTORY_TOKEN")
            .filter(|s| !s.is_empty())
            .ok_or_else(|| RepositoryError::InvalidConfig {
                message: "ARTIFACTORY_TOKEN environment variable is required".into(),
            })?;

        let mut settings = Self::new(server_api, token);
        if let Some(level) = lookup("ARTIFACTORY_LOGGING") {
            settings.log_level = parse_log_level(&level);
        }
        if let Some(raw) = lookup("ARTIFACTORY_TIMEOUT_SECS") {
            settings.timeout_secs = raw.parse().map_err(|_| RepositoryError::InvalidConfig {
                message: format!("ARTIFACTORY_TIMEOUT_SECS is not a number: {}", raw),
            })?;
        }
        Ok(settings)
    }

    /// Set the request timeout.
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Set the log level.
    pub fn with_log_level(mut self, log_level: LevelFilter) -> Self {
        self.log_level = log_level;
        self
    }

    /// Apply the configured level to the `log` facade.
    pub fn apply_log_level(&self) {
        log::set_max_level(self.log_level);
    }
}

/// Map `DEBUG`/`INFO`/`WARN`/`ERROR` to a level filter. Anything else is `INFO`.
pub fn parse_log_level(level: &str) -> LevelFilter {
    match level.trim().to_uppercase().as_str() {
        "DEBUG" => LevelFilter::Debug,
        "WARN" => LevelFilter::Warn,
        "ERROR" => LevelFilter::Error,
        _ => LevelFilter::Info,
    }
}

/// One child of a repository container, as returned by a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryEntry {
    /// Child segment with its leading slash, e.g. `/folder` or `/image.ovf`.
    pub child: String,
    /// Whether the child is a folder.
    pub is_folder: bool,
}

impl RepositoryEntry {
    /// A folder entry.
    pub fn folder(child: impl Into<String>) -> Self {
        Self {
            child: child.into(),
            is_folder: true,
        }
    }

    /// A file entry.
    pub fn file(child: impl Into<String>) -> Self {
        Self {
            child: child.into(),
            is_folder: false,
        }
    }
}

/// A property name and value, compared in canonical `name=value` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertyPair {
    pub name: String,
    pub value: String,
}

impl PropertyPair {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Parse `name=value`. A pair without `=` has an empty value.
    pub fn parse(pair: &str) -> Self {
        match pair.split_once('=') {
            Some((name, value)) => Self::new(name, value),
            None => Self::new(pair, ""),
        }
    }

    /// Canonical `name=value` form.
    pub fn canonical(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}

impl fmt::Display for PropertyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

/// An artifact URI paired with its creation timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArtifact {
    /// Artifact (storage API) URI.
    pub uri: String,
    /// ISO-8601 creation timestamp; lexicographic order is chronological.
    pub created: String,
}

/// Details of a resolved image artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDetails {
    /// Artifact (storage API) URI.
    pub uri: String,
    /// File name without extension.
    pub name: String,
    /// ISO-8601 creation timestamp.
    pub created_date: String,
    /// URI the artifact content is downloaded from.
    pub download_uri: String,
}

/// Outcome of a request that only reports an HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStatus {
    /// The server accepted the request.
    Completed { status: u16 },
    /// The server answered but refused the request.
    Rejected { status: u16 },
}

impl RequestStatus {
    /// Classify an HTTP status: any 2xx is `Completed`.
    pub fn from_status(status: u16) -> Self {
        if (200..300).contains(&status) {
            RequestStatus::Completed { status }
        } else {
            RequestStatus::Rejected { status }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RequestStatus::Completed { .. })
    }

    /// The raw HTTP status code.
    pub fn code(&self) -> u16 {
        match self {
            RequestStatus::Completed { status } | RequestStatus::Rejected { status } => *status,
        }
    }
}

/// One file moved by a bundle transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferredFile {
    /// File name as stored at the destination.
    pub file_name: String,
    /// Local path (downloads) or download URI (uploads).
    pub location: String,
    /// Bytes moved.
    pub bytes: u64,
}

/// How to handle local files that already exist when downloading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictResolution {
    /// Keep the existing local file.
    Skip,
    /// Overwrite existing files.
    #[default]
    Overwrite,
}
