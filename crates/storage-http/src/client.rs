//! Artifactory REST client implementation.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_LENGTH};
use reqwest::{Body, RequestBuilder, Response};
use rusty_artifactory_common::artifact_uri_from_download_uri;
use rusty_artifactory_storage::{
    join_for_set, join_names, validate_property_pairs, PropertyPair, RepositoryClient,
    RepositoryEntry, RepositoryError, RepositorySettings, RequestStatus,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;

use crate::error::HttpError;

#[derive(Debug, Deserialize)]
struct RepositoryInfo {
    key: String,
}

#[derive(Debug, Deserialize)]
struct FolderInfo {
    #[serde(default)]
    children: Vec<ChildInfo>,
}

#[derive(Debug, Deserialize)]
struct ChildInfo {
    uri: String,
    #[serde(default)]
    folder: bool,
}

#[derive(Debug, Deserialize)]
struct SearchResults {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    uri: String,
}

#[derive(Debug, Deserialize)]
struct PropertiesInfo {
    #[serde(default)]
    properties: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemInfo {
    #[serde(default)]
    created: String,
    #[serde(default)]
    download_uri: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadInfo {
    #[serde(default)]
    download_uri: String,
}

/// `RepositoryClient` implementation over the Artifactory REST API.
///
/// Every request carries the bearer token from [`RepositorySettings`] and
/// uses its timeout. One request is in flight per call.
#[derive(Debug, Clone)]
pub struct HttpRepositoryClient {
    http: reqwest::Client,
    /// API root without trailing slash, e.g. `https://host/artifactory/api`.
    server_api: String,
}

impl HttpRepositoryClient {
    /// Create a new HTTP repository client.
    ///
    /// # Arguments
    /// * `settings` - Server API root, token and timeout
    pub fn new(settings: RepositorySettings) -> Result<Self, RepositoryError> {
        if settings.server_api.is_empty() {
            return Err(HttpError::ConfigError("server API URL is empty".into()).into());
        }

        let mut bearer: HeaderValue = HeaderValue::from_str(&format!("Bearer {}", settings.token))
            .map_err(|_| HttpError::ConfigError("token is not a valid header value".into()))?;
        bearer.set_sensitive(true);
        let mut headers: HeaderMap = HeaderMap::new();
        headers.insert(AUTHORIZATION, bearer);

        let http: reqwest::Client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(HttpError::from)?;

        Ok(Self {
            http,
            server_api: settings.server_api.trim_end_matches('/').to_string(),
        })
    }

    /// Create a client from environment variables.
    ///
    /// Also applies the configured log level.
    pub fn from_env() -> Result<Self, RepositoryError> {
        let settings: RepositorySettings = RepositorySettings::from_env()?;
        settings.apply_log_level();
        Self::new(settings)
    }

    /// API root this client talks to.
    pub fn server_api(&self) -> &str {
        &self.server_api
    }

    /// Storage-API URI for an artifact's download URI.
    pub fn artifact_uri(&self, download_uri: &str) -> String {
        artifact_uri_from_download_uri(&self.server_api, download_uri)
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.server_api, path.trim_start_matches('/'))
    }

    /// Base for upload paths: the API root without its `/api` segment.
    fn upload_base(&self) -> &str {
        self.server_api
            .strip_suffix("/api")
            .unwrap_or(&self.server_api)
    }

    async fn send(&self, request: RequestBuilder, url: &str) -> Result<Response, HttpError> {
        let response: Response = request.send().await?;
        let status: u16 = response.status().as_u16();
        debug!("{} -> HTTP {}", url, status);
        if !response.status().is_success() {
            return Err(HttpError::UnexpectedStatus {
                url: url.to_string(),
                status,
            });
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, HttpError> {
        self.get_json_with(self.http.get(url), url).await
    }

    /// GET with a prepared request, e.g. one carrying encoded query parameters.
    async fn get_json_with<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        url: &str,
    ) -> Result<T, HttpError> {
        debug!("GET {}", url);
        let response: Response = self.send(request, url).await?;
        let status: u16 = response.status().as_u16();
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| HttpError::InvalidResponse {
            url: url.to_string(),
            status,
            message: e.to_string(),
        })
    }

    async fn status_of(&self, request: RequestBuilder, url: &str) -> Result<RequestStatus, HttpError> {
        let response: Response = request.send().await?;
        let status: RequestStatus = RequestStatus::from_status(response.status().as_u16());
        debug!("{} -> HTTP {}", url, status.code());
        Ok(status)
    }

    async fn item_info(&self, uri: &str) -> Result<ItemInfo, RepositoryError> {
        Ok(self.get_json(uri).await?)
    }
}

fn flatten_properties(properties: BTreeMap<String, Vec<String>>) -> Vec<PropertyPair> {
    properties
        .into_iter()
        .map(|(name, values)| PropertyPair::new(name, values.join(",")))
        .collect()
}

/// `name=value` (or bare `name`) pairs as query parameters.
fn property_query(pairs: &[String]) -> Vec<(&str, &str)> {
    pairs
        .iter()
        .map(|pair| pair.split_once('=').unwrap_or((pair.as_str(), "")))
        .collect()
}

fn io_error(path: &Path, err: std::io::Error) -> RepositoryError {
    RepositoryError::IoError {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

fn require_non_empty(value: &str, what: &str) -> Result<(), RepositoryError> {
    if value.is_empty() {
        return Err(RepositoryError::invalid_argument(format!("{} is required", what)));
    }
    Ok(())
}

#[async_trait]
impl RepositoryClient for HttpRepositoryClient {
    async fn list_repositories(&self) -> Result<Vec<String>, RepositoryError> {
        let repositories: Vec<RepositoryInfo> = self.get_json(&self.api_url("repositories")).await?;
        Ok(repositories.into_iter().map(|r| r.key).collect())
    }

    async fn list_children(&self, path: &str) -> Result<Vec<RepositoryEntry>, RepositoryError> {
        require_non_empty(path, "a repository path")?;
        let url: String = self.api_url(&format!("storage/{}", path.trim_start_matches('/')));
        let folder: FolderInfo = self.get_json(&url).await?;
        Ok(folder
            .children
            .into_iter()
            .map(|c| RepositoryEntry {
                child: c.uri,
                is_folder: c.folder,
            })
            .collect())
    }

    async fn search_by_name(&self, name: &str) -> Result<Vec<String>, RepositoryError> {
        require_non_empty(name, "an artifact name")?;
        let url: String = self.api_url("search/artifact");
        let request: RequestBuilder = self.http.get(&url).query(&[("name", name)]);
        let results: SearchResults = self.get_json_with(request, &url).await?;
        Ok(results.results.into_iter().map(|r| r.uri).collect())
    }

    async fn search_by_property(&self, pairs: &[String]) -> Result<Vec<String>, RepositoryError> {
        if pairs.is_empty() {
            return Err(RepositoryError::invalid_argument("at least one property is required"));
        }
        let url: String = self.api_url("search/prop");
        let request: RequestBuilder = self.http.get(&url).query(&property_query(pairs));
        let results: SearchResults = self.get_json_with(request, &url).await?;
        Ok(results.results.into_iter().map(|r| r.uri).collect())
    }

    async fn get_all_properties(&self, uri: &str) -> Result<Vec<PropertyPair>, RepositoryError> {
        require_non_empty(uri, "an artifact URI")?;
        let info: PropertiesInfo = self.get_json(&format!("{}?properties", uri)).await?;
        if info.properties.is_empty() {
            return Err(RepositoryError::not_found(format!("properties of {}", uri)));
        }
        Ok(flatten_properties(info.properties))
    }

    async fn get_property_values(
        &self,
        uri: &str,
        names: &[String],
    ) -> Result<Vec<PropertyPair>, RepositoryError> {
        require_non_empty(uri, "an artifact URI")?;
        let url: String = format!("{}?properties={}", uri, join_names(names));
        let info: PropertiesInfo = self.get_json(&url).await?;
        if info.properties.is_empty() {
            return Err(RepositoryError::not_found(format!("properties of {}", uri)));
        }
        Ok(flatten_properties(info.properties))
    }

    async fn get_created_date(&self, uri: &str) -> Result<String, RepositoryError> {
        require_non_empty(uri, "an artifact URI")?;
        let info: ItemInfo = self.item_info(uri).await?;
        if info.created.is_empty() {
            return Err(RepositoryError::not_found(format!("created date of {}", uri)));
        }
        Ok(info.created)
    }

    async fn get_download_uri(&self, uri: &str) -> Result<String, RepositoryError> {
        require_non_empty(uri, "an artifact URI")?;
        let info: ItemInfo = self.item_info(uri).await?;
        if info.download_uri.is_empty() {
            return Err(RepositoryError::not_found(format!("download URI of {}", uri)));
        }
        Ok(info.download_uri)
    }

    async fn check_exists(&self, uri: &str) -> Result<bool, RepositoryError> {
        debug!("GET {} (existence check)", uri);
        match self.send(self.http.get(uri), uri).await {
            Ok(_) => Ok(true),
            Err(HttpError::UnexpectedStatus { status: 404, .. }) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    async fn fetch_bytes(&self, uri: &str) -> Result<Vec<u8>, RepositoryError> {
        debug!("GET {}", uri);
        let response: Response = self.send(self.http.get(uri), uri).await?;
        let body = response.bytes().await.map_err(HttpError::from)?;
        Ok(body.to_vec())
    }

    async fn fetch_to_file(&self, uri: &str, destination: &Path) -> Result<u64, RepositoryError> {
        debug!("GET {} -> {}", uri, destination.display());
        let mut response: Response = self.send(self.http.get(uri), uri).await?;

        let mut file: File = File::create(destination)
            .await
            .map_err(|e| io_error(destination, e))?;
        let mut written: u64 = 0;
        while let Some(chunk) = response.chunk().await.map_err(HttpError::from)? {
            file.write_all(&chunk)
                .await
                .map_err(|e| io_error(destination, e))?;
            written += chunk.len() as u64;
        }
        file.flush().await.map_err(|e| io_error(destination, e))?;
        Ok(written)
    }

    async fn put_file(&self, target_path: &str, source: &Path) -> Result<String, RepositoryError> {
        require_non_empty(target_path, "a target path")?;
        let file: File = File::open(source).await.map_err(|e| io_error(source, e))?;
        let length: u64 = file
            .metadata()
            .await
            .map_err(|e| io_error(source, e))?
            .len();

        let url: String = format!(
            "{}/{}",
            self.upload_base(),
            target_path.trim_start_matches('/')
        );
        debug!("PUT {} ({} bytes)", url, length);
        let request: RequestBuilder = self
            .http
            .put(&url)
            .header(CONTENT_LENGTH, length)
            .body(Body::wrap_stream(ReaderStream::new(file)));
        let response: Response = self.send(request, &url).await?;
        let status: u16 = response.status().as_u16();
        let body = response.bytes().await.map_err(HttpError::from)?;
        let info: UploadInfo = serde_json::from_slice(&body).map_err(|e| HttpError::InvalidResponse {
            url: url.clone(),
            status,
            message: e.to_string(),
        })?;
        if info.download_uri.is_empty() {
            return Err(RepositoryError::not_found(format!("download URI of {}", url)));
        }
        Ok(info.download_uri)
    }

    async fn set_properties(
        &self,
        uri: &str,
        pairs: &[String],
    ) -> Result<RequestStatus, RepositoryError> {
        require_non_empty(uri, "an artifact URI")?;
        validate_property_pairs(pairs)?;
        let url: String = format!("{}?properties={}", uri, join_for_set(pairs));
        debug!("PUT {}", url);
        Ok(self.status_of(self.http.put(&url), &url).await?)
    }

    async fn delete_properties(
        &self,
        uri: &str,
        names: &[String],
    ) -> Result<RequestStatus, RepositoryError> {
        require_non_empty(uri, "an artifact URI")?;
        let url: String = format!("{}?properties={}", uri, join_names(names));
        debug!("DELETE {}", url);
        Ok(self.status_of(self.http.delete(&url), &url).await?)
    }

    async fn delete_artifact(&self, uri: &str) -> Result<RequestStatus, RepositoryError> {
        require_non_empty(uri, "an artifact URI")?;
        debug!("DELETE {}", uri);
        Ok(self.status_of(self.http.delete(uri), uri).await?)
    }
}
