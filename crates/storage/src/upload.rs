//! Bundle and single-file upload orchestration.
//!
//! Uploads follow the same [`TransferPlan`] as downloads, reading files from
//! a local source directory. The repository is case-sensitive while source
//! directories often are not, so every requested file name is matched
//! case-insensitively against the directory listing and uploaded under its
//! on-disk casing.
//!
//! - Every required file is resolved before the first request; a missing one
//!   fails the upload with `SourceFileMissing` and nothing is sent.
//! - Optional files that are not present are skipped.
//! - A numbered series ends at its first missing local index.
//!
//! An upload suffix is inserted right after the image name
//! (`win22-disk1.vmdk` with suffix `v2` becomes `win22-v2-disk1.vmdk`), so
//! the uploaded bundle can be downloaded again as image `win22-v2`.
//! `vmware.log` keeps its name.
//!
//! # Example
//!
//! ```ignore
//! use rusty_artifactory_storage::{BundleUploader, ImageType};
//!
//! let uploader = BundleUploader::new(&client);
//! let summary = uploader
//!     .upload_bundle(ImageType::Ovf, "web", "/images/web", "/templates/web", "2024.06")
//!     .await?;
//! ```

use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use rusty_artifactory_common::{
    ensure_trailing_slash, file_extension, insert_suffix_after_prefix,
    insert_suffix_before_extension, list_file_names, require_source_file_name,
    resolve_source_file_name,
};

use crate::bundle::{BundleSummary, ImageType, NumberedSeries, TransferPlan, VMWARE_LOG_FILE};
use crate::error::RepositoryError;
use crate::traits::RepositoryClient;
use crate::types::TransferredFile;

/// Uploads image bundles and single files through any `RepositoryClient`.
pub struct BundleUploader<'a, C: RepositoryClient + ?Sized> {
    client: &'a C,
}

impl<'a, C: RepositoryClient + ?Sized> BundleUploader<'a, C> {
    /// Create a new bundle uploader.
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Upload a bundle.
    ///
    /// # Arguments
    /// * `image_type` - Bundle layout to upload
    /// * `image_name` - Image name (file names without extension)
    /// * `source_dir` - Local directory holding the bundle files
    /// * `target_dir` - Repository folder, e.g. `/templates/windows`
    /// * `suffix` - Optional text added to every uploaded name; may be empty
    ///
    /// # Returns
    /// Summary listing the download URI of every uploaded file.
    pub async fn upload_bundle(
        &self,
        image_type: ImageType,
        image_name: &str,
        source_dir: impl AsRef<Path>,
        target_dir: &str,
        suffix: &str,
    ) -> Result<BundleSummary, RepositoryError> {
        let source_dir: &Path = source_dir.as_ref();
        if image_name.is_empty() {
            return Err(RepositoryError::invalid_argument(
                "an image name is required to upload a bundle",
            ));
        }
        let target_dir: String = normalize_target_dir(target_dir)?;

        let available: Vec<String> = list_file_names(source_dir)?;
        let plan: TransferPlan = TransferPlan::for_image(image_type, image_name);

        let mut required: Vec<String> = Vec::with_capacity(plan.required.len());
        for name in &plan.required {
            required.push(require_source_file_name(source_dir, &available, name)?);
        }

        let mut summary: BundleSummary = BundleSummary::new(image_type, image_name);
        info!(
            "Uploading {} bundle {} from {} to {}",
            image_type,
            image_name,
            source_dir.display(),
            target_dir
        );

        for actual in &required {
            let target_name: String = insert_suffix_after_prefix(actual, image_name, suffix);
            let file: TransferredFile = self
                .put(source_dir, actual, &target_dir, &target_name)
                .await
                .map_err(|e| summary.failure(actual, e))?;
            summary.record(file);
        }

        for name in &plan.optional {
            match resolve_source_file_name(&available, name) {
                Some(actual) => {
                    let target_name: String = insert_suffix_after_prefix(&actual, image_name, suffix);
                    let file: TransferredFile = self
                        .put(source_dir, &actual, &target_dir, &target_name)
                        .await
                        .map_err(|e| summary.failure(&actual, e))?;
                    summary.record(file);
                }
                None => debug!("Optional file {} not present, skipping", name),
            }
        }

        for series in &plan.series {
            self.upload_series(
                series,
                &available,
                source_dir,
                &target_dir,
                image_name,
                suffix,
                &mut summary,
            )
            .await?;
        }

        for name in &plan.trailing {
            match resolve_source_file_name(&available, name) {
                Some(actual) => {
                    let target_name: String = if name == VMWARE_LOG_FILE {
                        actual.clone()
                    } else {
                        insert_suffix_after_prefix(&actual, image_name, suffix)
                    };
                    let file: TransferredFile = self
                        .put(source_dir, &actual, &target_dir, &target_name)
                        .await
                        .map_err(|e| summary.failure(&actual, e))?;
                    summary.record(file);
                }
                None => debug!("Optional file {} not present, skipping", name),
            }
        }

        info!(
            "Uploaded {} file(s) ({} bytes) for {}",
            summary.files.len(),
            summary.bytes_transferred,
            image_name
        );
        Ok(summary)
    }

    /// Upload a single file, adding `-{suffix}` before its extension.
    ///
    /// The file name is matched case-insensitively inside its directory.
    ///
    /// # Errors
    /// - `InvalidArgument` if the file has no extension or `target_dir` is empty
    /// - `SourceFileMissing` if no file in the directory matches
    pub async fn upload_file(
        &self,
        source_path: impl AsRef<Path>,
        target_dir: &str,
        suffix: &str,
    ) -> Result<TransferredFile, RepositoryError> {
        let source_path: &Path = source_path.as_ref();
        let requested: String = source_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                RepositoryError::invalid_argument(format!(
                    "'{}' does not name a file",
                    source_path.display()
                ))
            })?;
        if file_extension(&requested).is_empty() {
            return Err(RepositoryError::invalid_argument(format!(
                "'{}' has no file extension",
                requested
            )));
        }
        let target_dir: String = normalize_target_dir(target_dir)?;

        let listing_dir: PathBuf = match source_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let available: Vec<String> = list_file_names(&listing_dir)?;
        let actual: String = require_source_file_name(&listing_dir, &available, &requested)?;
        if actual != requested {
            warn!("Using on-disk name {} for requested {}", actual, requested);
        }

        let target_name: String = insert_suffix_before_extension(&actual, suffix);
        self.put(&listing_dir, &actual, &target_dir, &target_name)
            .await
    }

    #[allow(clippy::too_many_arguments)]
    async fn upload_series(
        &self,
        series: &NumberedSeries,
        available: &[String],
        source_dir: &Path,
        target_dir: &str,
        image_name: &str,
        suffix: &str,
        summary: &mut BundleSummary,
    ) -> Result<(), RepositoryError> {
        for index in NumberedSeries::indices() {
            let name: String = series.file_name(image_name, index);
            let Some(actual) = resolve_source_file_name(available, &name) else {
                debug!("No local {}, series complete", name);
                break;
            };
            let target_name: String = insert_suffix_after_prefix(&actual, image_name, suffix);
            let file: TransferredFile = self
                .put(source_dir, &actual, target_dir, &target_name)
                .await
                .map_err(|e| summary.failure(&actual, e))?;
            summary.record(file);
        }
        Ok(())
    }

    async fn put(
        &self,
        source_dir: &Path,
        actual: &str,
        target_dir: &str,
        target_name: &str,
    ) -> Result<TransferredFile, RepositoryError> {
        let source: PathBuf = source_dir.join(actual);
        let bytes: u64 = tokio::fs::metadata(&source)
            .await
            .map_err(|e| RepositoryError::IoError {
                path: source.display().to_string(),
                message: e.to_string(),
            })?
            .len();

        let target_path: String = format!("{}{}", target_dir, target_name);
        debug!("Uploading {} to {}", source.display(), target_path);
        let download_uri: String = self.client.put_file(&target_path, &source).await?;
        Ok(TransferredFile {
            file_name: target_name.to_string(),
            location: download_uri,
            bytes,
        })
    }
}

/// `/repo/folder/` form of a target folder.
fn normalize_target_dir(target_dir: &str) -> Result<String, RepositoryError> {
    let trimmed: &str = target_dir.trim().trim_matches('/');
    if trimmed.is_empty() {
        return Err(RepositoryError::invalid_argument(
            "a target repository path is required to upload",
        ));
    }
    Ok(ensure_trailing_slash(&format!("/{}", trimmed)))
}
