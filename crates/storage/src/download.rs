//! Bundle download orchestration.
//!
//! Given the download URI of a primary image file, fetches the whole bundle
//! described by its [`TransferPlan`] into `{output_dir}/{image_name}/`:
//!
//! - Required files are fetched in order. Any failure aborts the bundle
//!   before optional files or numbered series are probed.
//! - Optional files and numbered-series entries are probed with an existence
//!   check first. A missing optional file is skipped; a missing series index
//!   ends that series.
//!
//! Companion files are looked up next to the primary file. Requests are made
//! one at a time. Nothing is rolled back on failure; once a file has been
//! written, errors are reported as `PartialBundleFailure`.
//!
//! # Example
//!
//! ```ignore
//! use rusty_artifactory_storage::{BundleDownloader, ConflictResolution, DownloadOptions};
//!
//! let downloader = BundleDownloader::new(&client)
//!     .with_options(DownloadOptions::new().with_conflict(ConflictResolution::Skip));
//! let summary = downloader
//!     .download_bundle("https://host/artifactory/templates/win22/win22.vmtx", "/var/images")
//!     .await?;
//! ```

use std::path::{Path, PathBuf};

use log::{debug, info};
use rusty_artifactory_common::{file_extension, file_name_from_uri, image_name_from_file_name, parent_uri};

use crate::bundle::{BundleSummary, ImageType, NumberedSeries, TransferPlan};
use crate::error::RepositoryError;
use crate::traits::RepositoryClient;
use crate::types::{ConflictResolution, TransferredFile};

/// Options for bundle downloads.
#[derive(Debug, Clone, Default)]
pub struct DownloadOptions {
    /// What to do with local files that already exist.
    pub conflict: ConflictResolution,
}

impl DownloadOptions {
    /// Create options that overwrite existing files (default).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set conflict resolution for existing local files.
    pub fn with_conflict(mut self, conflict: ConflictResolution) -> Self {
        self.conflict = conflict;
        self
    }
}

/// Outcome of handling one optional file.
enum Probe {
    Transferred,
    Skipped,
    Missing,
}

/// Downloads image bundles through any `RepositoryClient`.
pub struct BundleDownloader<'a, C: RepositoryClient + ?Sized> {
    client: &'a C,
    options: DownloadOptions,
}

impl<'a, C: RepositoryClient + ?Sized> BundleDownloader<'a, C> {
    /// Create a new bundle downloader.
    ///
    /// # Arguments
    /// * `client` - Repository client used for every request
    pub fn new(client: &'a C) -> Self {
        Self {
            client,
            options: DownloadOptions::default(),
        }
    }

    /// Set download options.
    pub fn with_options(mut self, options: DownloadOptions) -> Self {
        self.options = options;
        self
    }

    /// Download a bundle.
    ///
    /// # Arguments
    /// * `download_uri` - Download URI of the primary file (`.ova`, `.ovf`, `.vmtx` or `.vmxt`)
    /// * `output_dir` - Directory that receives the `{image_name}/` subdirectory
    ///
    /// # Returns
    /// Summary of the files written.
    pub async fn download_bundle(
        &self,
        download_uri: &str,
        output_dir: impl AsRef<Path>,
    ) -> Result<BundleSummary, RepositoryError> {
        if download_uri.is_empty() {
            return Err(RepositoryError::invalid_argument(
                "a download URI is required to download a bundle",
            ));
        }
        let file_name: &str = file_name_from_uri(download_uri);
        let image_type: ImageType = ImageType::from_extension(file_extension(file_name))
            .ok_or_else(|| {
                RepositoryError::invalid_argument(format!(
                    "cannot determine the image type of '{}'",
                    file_name
                ))
            })?;
        let image_name: &str = image_name_from_file_name(file_name);
        if image_name.is_empty() {
            return Err(RepositoryError::invalid_argument(format!(
                "'{}' has no image name",
                file_name
            )));
        }

        let target_dir: PathBuf = output_dir.as_ref().join(image_name);
        tokio::fs::create_dir_all(&target_dir)
            .await
            .map_err(|e| RepositoryError::IoError {
                path: target_dir.display().to_string(),
                message: e.to_string(),
            })?;

        let plan: TransferPlan =
            TransferPlan::for_image(image_type, image_name).with_primary(file_name);
        let base_uri: &str = parent_uri(download_uri);
        let mut summary: BundleSummary = BundleSummary::new(image_type, image_name);
        info!(
            "Downloading {} bundle {} to {}",
            image_type,
            image_name,
            target_dir.display()
        );

        for name in &plan.required {
            self.download_required(base_uri, name, &target_dir, &mut summary)
                .await
                .map_err(|e| summary.failure(name, e))?;
        }
        debug!("Required files of {} complete", image_name);

        for name in &plan.optional {
            self.probe_file(base_uri, name, &target_dir, &mut summary)
                .await
                .map_err(|e| summary.failure(name, e))?;
        }

        for series in &plan.series {
            self.probe_series(series, base_uri, image_name, &target_dir, &mut summary)
                .await?;
        }

        for name in &plan.trailing {
            self.probe_file(base_uri, name, &target_dir, &mut summary)
                .await
                .map_err(|e| summary.failure(name, e))?;
        }

        info!(
            "Downloaded {} file(s) ({} bytes) for {}, skipped {}",
            summary.files.len(),
            summary.bytes_transferred,
            image_name,
            summary.files_skipped
        );
        Ok(summary)
    }

    /// Probe `series` from index 1 until the first missing index.
    async fn probe_series(
        &self,
        series: &NumberedSeries,
        base_uri: &str,
        image_name: &str,
        target_dir: &Path,
        summary: &mut BundleSummary,
    ) -> Result<(), RepositoryError> {
        for index in NumberedSeries::indices() {
            let name: String = series.file_name(image_name, index);
            let outcome: Probe = self
                .probe_file(base_uri, &name, target_dir, summary)
                .await
                .map_err(|e| summary.failure(&name, e))?;
            if let Probe::Missing = outcome {
                debug!("Series {}{{i}}{} ends at index {}", series.prefix, series.suffix, index);
                break;
            }
        }
        Ok(())
    }

    async fn download_required(
        &self,
        base_uri: &str,
        name: &str,
        target_dir: &Path,
        summary: &mut BundleSummary,
    ) -> Result<(), RepositoryError> {
        let local: PathBuf = target_dir.join(name);
        if self.keep_existing(&local).await {
            summary.files_skipped += 1;
            return Ok(());
        }
        let file: TransferredFile = self
            .fetch_to(&format!("{}{}", base_uri, name), name, &local)
            .await?;
        summary.record(file);
        Ok(())
    }

    async fn probe_file(
        &self,
        base_uri: &str,
        name: &str,
        target_dir: &Path,
        summary: &mut BundleSummary,
    ) -> Result<Probe, RepositoryError> {
        let local: PathBuf = target_dir.join(name);
        if self.keep_existing(&local).await {
            summary.files_skipped += 1;
            return Ok(Probe::Skipped);
        }

        let uri: String = format!("{}{}", base_uri, name);
        debug!("Probing {}", uri);
        if !self.client.check_exists(&uri).await? {
            return Ok(Probe::Missing);
        }
        let file: TransferredFile = self.fetch_to(&uri, name, &local).await?;
        summary.record(file);
        Ok(Probe::Transferred)
    }

    async fn keep_existing(&self, local: &Path) -> bool {
        self.options.conflict == ConflictResolution::Skip
            && tokio::fs::try_exists(local).await.unwrap_or(false)
    }

    async fn fetch_to(
        &self,
        uri: &str,
        name: &str,
        local: &Path,
    ) -> Result<TransferredFile, RepositoryError> {
        debug!("Fetching {}", uri);
        let bytes: u64 = self.client.fetch_to_file(uri, local).await?;
        Ok(TransferredFile {
            file_name: name.to_string(),
            location: local.display().to_string(),
            bytes,
        })
    }
}
