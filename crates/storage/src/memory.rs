//! In-memory repository for tests and offline use.
//!
//! `MemoryRepositoryClient` implements [`RepositoryClient`] over plain maps and
//! records every call it receives, so callers can check exactly which remote
//! requests an operation would have made.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::{Mutex, RwLock};

use async_trait::async_trait;

use crate::error::RepositoryError;
use crate::traits::RepositoryClient;
use crate::types::{PropertyPair, RepositoryEntry, RequestStatus};

/// Base of the download URIs handed out by [`MemoryRepositoryClient::put_file`].
pub const MEMORY_DOWNLOAD_BASE: &str = "memory://artifactory";

/// An artifact known to the in-memory repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryArtifact {
    /// Artifact (storage API) URI.
    pub uri: String,
    /// ISO-8601 creation timestamp.
    pub created: String,
    /// Download URI; empty when the artifact has none.
    pub download_uri: String,
    /// Properties in insertion order.
    pub properties: Vec<PropertyPair>,
}

impl MemoryArtifact {
    /// Create an artifact without download URI or properties.
    pub fn new(uri: impl Into<String>, created: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            created: created.into(),
            download_uri: String::new(),
            properties: Vec::new(),
        }
    }

    pub fn with_download_uri(mut self, download_uri: impl Into<String>) -> Self {
        self.download_uri = download_uri.into();
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.push(PropertyPair::new(name, value));
        self
    }

    fn file_name(&self) -> &str {
        rusty_artifactory_common::file_name_from_uri(&self.uri)
    }

    fn matches_pair(&self, pair: &str) -> bool {
        match pair.split_once('=') {
            Some((name, value)) => self
                .properties
                .iter()
                .any(|p| p.name == name && p.value == value),
            None => self.properties.iter().any(|p| p.name == pair),
        }
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    repositories: Vec<String>,
    children: BTreeMap<String, Vec<RepositoryEntry>>,
    artifacts: Vec<MemoryArtifact>,
    content: BTreeMap<String, Vec<u8>>,
    property_failures: HashMap<String, RepositoryError>,
}

/// Repository held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryRepositoryClient {
    state: RwLock<MemoryState>,
    requests: Mutex<Vec<String>>,
}

impl MemoryRepositoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a repository with no children.
    pub fn add_repository(&self, key: impl Into<String>) {
        let key: String = key.into();
        let mut state = self.write_state();
        state.children.entry(key.clone()).or_default();
        state.repositories.push(key);
    }

    /// Add a child under `parent` (`repo` or `repo/folder`).
    ///
    /// Folders get their own empty listing so they can be walked.
    pub fn add_entry(&self, parent: &str, entry: RepositoryEntry) {
        let parent: String = normalize_container(parent);
        let mut state = self.write_state();
        if entry.is_folder {
            let folder: String = format!("{}{}", parent, entry.child);
            state.children.entry(folder).or_default();
        }
        state.children.entry(parent).or_default().push(entry);
    }

    /// Register artifact metadata.
    pub fn add_artifact(&self, artifact: MemoryArtifact) {
        self.write_state().artifacts.push(artifact);
    }

    /// Store content behind a download URI.
    pub fn add_content(&self, download_uri: impl Into<String>, data: impl Into<Vec<u8>>) {
        self.write_state()
            .content
            .insert(download_uri.into(), data.into());
    }

    /// Make property lookups for `uri` fail with `error`.
    pub fn fail_properties(&self, uri: impl Into<String>, error: RepositoryError) {
        self.write_state()
            .property_failures
            .insert(uri.into(), error);
    }

    /// Content stored behind a download URI.
    pub fn content(&self, download_uri: &str) -> Option<Vec<u8>> {
        self.read_state().content.get(download_uri).cloned()
    }

    /// Properties currently set on an artifact.
    pub fn properties(&self, uri: &str) -> Option<Vec<PropertyPair>> {
        self.read_state()
            .artifacts
            .iter()
            .find(|a| a.uri == uri)
            .map(|a| a.properties.clone())
    }

    /// Every request received so far, as `"operation argument"` strings.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Number of requests received for one operation.
    pub fn request_count(&self, operation: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.split(' ').next() == Some(operation))
            .count()
    }

    fn record(&self, operation: &str, argument: &str) {
        let entry: String = if argument.is_empty() {
            operation.to_string()
        } else {
            format!("{} {}", operation, argument)
        };
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(entry);
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, MemoryState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, MemoryState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    fn artifact(&self, uri: &str) -> Result<MemoryArtifact, RepositoryError> {
        self.read_state()
            .artifacts
            .iter()
            .find(|a| a.uri == uri)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found(uri))
    }
}

fn normalize_container(path: &str) -> String {
    path.trim_start_matches('/').trim_end_matches('/').to_string()
}

#[async_trait]
impl RepositoryClient for MemoryRepositoryClient {
    async fn list_repositories(&self) -> Result<Vec<String>, RepositoryError> {
        self.record("list_repositories", "");
        Ok(self.read_state().repositories.clone())
    }

    async fn list_children(&self, path: &str) -> Result<Vec<RepositoryEntry>, RepositoryError> {
        self.record("list_children", path);
        self.read_state()
            .children
            .get(&normalize_container(path))
            .cloned()
            .ok_or_else(|| RepositoryError::not_found(path))
    }

    async fn search_by_name(&self, name: &str) -> Result<Vec<String>, RepositoryError> {
        self.record("search_by_name", name);
        let wanted: String = name.to_lowercase();
        Ok(self
            .read_state()
            .artifacts
            .iter()
            .filter(|a| a.file_name().to_lowercase().contains(&wanted))
            .map(|a| a.uri.clone())
            .collect())
    }

    async fn search_by_property(&self, pairs: &[String]) -> Result<Vec<String>, RepositoryError> {
        self.record("search_by_property", &pairs.join("&"));
        Ok(self
            .read_state()
            .artifacts
            .iter()
            .filter(|a| pairs.iter().all(|p| a.matches_pair(p)))
            .map(|a| a.uri.clone())
            .collect())
    }

    async fn get_all_properties(&self, uri: &str) -> Result<Vec<PropertyPair>, RepositoryError> {
        self.record("get_all_properties", uri);
        if let Some(err) = self.read_state().property_failures.get(uri) {
            return Err(err.clone());
        }
        let artifact: MemoryArtifact = self.artifact(uri)?;
        if artifact.properties.is_empty() {
            return Err(RepositoryError::not_found(format!("properties of {}", uri)));
        }
        Ok(artifact.properties)
    }

    async fn get_property_values(
        &self,
        uri: &str,
        names: &[String],
    ) -> Result<Vec<PropertyPair>, RepositoryError> {
        self.record("get_property_values", uri);
        if let Some(err) = self.read_state().property_failures.get(uri) {
            return Err(err.clone());
        }
        let selected: Vec<PropertyPair> = self
            .artifact(uri)?
            .properties
            .into_iter()
            .filter(|p| names.contains(&p.name))
            .collect();
        if selected.is_empty() {
            return Err(RepositoryError::not_found(format!("properties of {}", uri)));
        }
        Ok(selected)
    }

    async fn get_created_date(&self, uri: &str) -> Result<String, RepositoryError> {
        self.record("get_created_date", uri);
        let artifact: MemoryArtifact = self.artifact(uri)?;
        if artifact.created.is_empty() {
            return Err(RepositoryError::not_found(format!("created date of {}", uri)));
        }
        Ok(artifact.created)
    }

    async fn get_download_uri(&self, uri: &str) -> Result<String, RepositoryError> {
        self.record("get_download_uri", uri);
        let artifact: MemoryArtifact = self.artifact(uri)?;
        if artifact.download_uri.is_empty() {
            return Err(RepositoryError::not_found(format!("download URI of {}", uri)));
        }
        Ok(artifact.download_uri)
    }

    async fn check_exists(&self, uri: &str) -> Result<bool, RepositoryError> {
        self.record("check_exists", uri);
        Ok(self.read_state().content.contains_key(uri))
    }

    async fn fetch_bytes(&self, uri: &str) -> Result<Vec<u8>, RepositoryError> {
        self.record("fetch_bytes", uri);
        self.read_state()
            .content
            .get(uri)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found(uri))
    }

    async fn fetch_to_file(&self, uri: &str, destination: &Path) -> Result<u64, RepositoryError> {
        self.record("fetch_to_file", uri);
        let data: Vec<u8> = self
            .read_state()
            .content
            .get(uri)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found(uri))?;
        tokio::fs::write(destination, &data)
            .await
            .map_err(|e| RepositoryError::IoError {
                path: destination.display().to_string(),
                message: e.to_string(),
            })?;
        Ok(data.len() as u64)
    }

    async fn put_file(&self, target_path: &str, source: &Path) -> Result<String, RepositoryError> {
        self.record("put_file", target_path);
        let data: Vec<u8> = tokio::fs::read(source)
            .await
            .map_err(|e| RepositoryError::IoError {
                path: source.display().to_string(),
                message: e.to_string(),
            })?;
        let download_uri: String = format!(
            "{}/{}",
            MEMORY_DOWNLOAD_BASE,
            target_path.trim_start_matches('/')
        );
        self.write_state().content.insert(download_uri.clone(), data);
        Ok(download_uri)
    }

    async fn set_properties(
        &self,
        uri: &str,
        pairs: &[String],
    ) -> Result<RequestStatus, RepositoryError> {
        self.record("set_properties", uri);
        let mut state = self.write_state();
        let Some(artifact) = state.artifacts.iter_mut().find(|a| a.uri == uri) else {
            return Ok(RequestStatus::Rejected { status: 404 });
        };
        for pair in pairs.iter().map(|p| PropertyPair::parse(p)) {
            artifact.properties.retain(|p| p.name != pair.name);
            artifact.properties.push(pair);
        }
        Ok(RequestStatus::Completed { status: 204 })
    }

    async fn delete_properties(
        &self,
        uri: &str,
        names: &[String],
    ) -> Result<RequestStatus, RepositoryError> {
        self.record("delete_properties", uri);
        let mut state = self.write_state();
        let Some(artifact) = state.artifacts.iter_mut().find(|a| a.uri == uri) else {
            return Ok(RequestStatus::Rejected { status: 404 });
        };
        artifact.properties.retain(|p| !names.contains(&p.name));
        Ok(RequestStatus::Completed { status: 204 })
    }

    async fn delete_artifact(&self, uri: &str) -> Result<RequestStatus, RepositoryError> {
        self.record("delete_artifact", uri);
        let mut state = self.write_state();
        let before: usize = state.artifacts.len();
        state.artifacts.retain(|a| a.uri != uri);
        if state.artifacts.len() == before {
            Ok(RequestStatus::Rejected { status: 404 })
        } else {
            Ok(RequestStatus::Completed { status: 204 })
        }
    }
}
