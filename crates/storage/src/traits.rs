//! Repository client interface.

use std::path::Path;

use async_trait::async_trait;

use crate::error::RepositoryError;
use crate::types::{PropertyPair, RepositoryEntry, RequestStatus};

/// Low-level repository operations - implemented by each backend.
///
/// Each method is a single request/response exchange. The resolution and
/// transfer logic in this crate only ever talks to the server through here.
#[async_trait]
pub trait RepositoryClient: Send + Sync {
    /// Keys of every repository visible to the caller.
    async fn list_repositories(&self) -> Result<Vec<String>, RepositoryError>;

    /// Children of a repository or folder (`repo`, `repo/folder`, ...).
    /// An empty container yields an empty list.
    async fn list_children(&self, path: &str) -> Result<Vec<RepositoryEntry>, RepositoryError>;

    /// Server-side, case-insensitive partial name search. Returns artifact URIs.
    async fn search_by_name(&self, name: &str) -> Result<Vec<String>, RepositoryError>;

    /// Search by `name` or `name=value` pairs. Returns artifact URIs.
    async fn search_by_property(&self, pairs: &[String]) -> Result<Vec<String>, RepositoryError>;

    /// Every property set on an artifact.
    async fn get_all_properties(&self, uri: &str) -> Result<Vec<PropertyPair>, RepositoryError>;

    /// Only the named properties of an artifact.
    async fn get_property_values(
        &self,
        uri: &str,
        names: &[String],
    ) -> Result<Vec<PropertyPair>, RepositoryError>;

    /// ISO-8601 creation timestamp of an artifact.
    async fn get_created_date(&self, uri: &str) -> Result<String, RepositoryError>;

    /// Download URI of an artifact.
    async fn get_download_uri(&self, uri: &str) -> Result<String, RepositoryError>;

    /// Whether a download URI answers 200 (true) or 404 (false).
    async fn check_exists(&self, uri: &str) -> Result<bool, RepositoryError>;

    /// Content behind a download URI. Missing content is `NotFound`.
    async fn fetch_bytes(&self, uri: &str) -> Result<Vec<u8>, RepositoryError>;

    /// Stream the content behind a download URI into `destination`, replacing
    /// any existing file. Returns the number of bytes written.
    ///
    /// Missing content is `NotFound` and leaves `destination` untouched.
    async fn fetch_to_file(&self, uri: &str, destination: &Path) -> Result<u64, RepositoryError>;

    /// Upload a local file to `target_path` (`/repo/folder/file.ext`).
    /// The file is streamed, never read whole into memory.
    /// Returns the download URI of the stored artifact.
    async fn put_file(&self, target_path: &str, source: &Path) -> Result<String, RepositoryError>;

    /// Set `name=value` pairs on an artifact.
    async fn set_properties(
        &self,
        uri: &str,
        pairs: &[String],
    ) -> Result<RequestStatus, RepositoryError>;

    /// Remove the named properties from an artifact.
    async fn delete_properties(
        &self,
        uri: &str,
        names: &[String],
    ) -> Result<RequestStatus, RepositoryError>;

    /// Delete an artifact.
    async fn delete_artifact(&self, uri: &str) -> Result<RequestStatus, RepositoryError>;
}
