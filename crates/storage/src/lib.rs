//! Artifact resolution and image bundle transfer for Artifactory-style repositories.
//!
//! This crate talks to the repository only through the [`RepositoryClient`]
//! trait, so the same logic runs against the HTTP backend
//! (`rusty-artifactory-storage-http`) or the in-memory [`MemoryRepositoryClient`].
//!
//! # Resolution
//!
//! - [`PathResolver`] walks every repository's folder tree to find the folders
//!   holding a matching file.
//! - [`find_by_name_and_type`] uses the server search index and filters by
//!   file extension.
//! - [`PropertyDisambiguator`] narrows candidates to one artifact by required
//!   properties, preferring the most recently created.
//! - [`get_image_details`] chains the three steps above and describes the result.
//!
//! # Transfer
//!
//! [`BundleDownloader`] and [`BundleUploader`] move OVA, OVF and VMTX bundles:
//! a fixed set of required files plus optional files and numbered disk series
//! probed until the first gap.
//!
//! # Logging
//!
//! Messages go through the `log` facade. Install any logger; the level from
//! [`RepositorySettings`] is applied with [`RepositorySettings::apply_log_level`].

mod bundle;
mod details;
mod disambiguate;
mod download;
mod error;
pub mod memory;
mod path_resolver;
mod properties;
mod search;
mod traits;
mod types;
mod upload;

pub use bundle::{BundleSummary, ImageType, NumberedSeries, TransferPlan, VMWARE_LOG_FILE};
pub use details::get_image_details;
pub use disambiguate::{latest_created, PropertyDisambiguator};
pub use download::{BundleDownloader, DownloadOptions};
pub use error::RepositoryError;
pub use memory::{MemoryArtifact, MemoryRepositoryClient};
pub use path_resolver::{leaf_matches, PathResolver};
pub use properties::{
    contains_forbidden_chars, delete_artifact, delete_artifact_properties,
    get_artifact_property_values, join_for_search, join_for_set, join_names,
    set_artifact_properties, validate_property_pairs,
};
pub use search::{filter_by_extension, find_by_name_and_type, find_by_properties, normalize_extension};
pub use traits::RepositoryClient;
pub use upload::BundleUploader;
pub use types::{
    parse_log_level, ConflictResolution, ImageDetails, PropertyPair, RepositoryEntry,
    RepositorySettings, RequestStatus, ResolvedArtifact, TransferredFile, DEFAULT_TIMEOUT_SECS,
};
