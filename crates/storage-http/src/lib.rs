//! Artifactory REST backend for rusty-artifactory storage.
//!
//! This crate provides a `RepositoryClient` implementation over the
//! Artifactory REST API using `reqwest`.
//!
//! # Example
//!
//! ```ignore
//! use rusty_artifactory_storage::{get_image_details, BundleDownloader, RepositorySettings};
//! use rusty_artifactory_storage_http::HttpRepositoryClient;
//!
//! let settings = RepositorySettings::from_env()?;
//! let client = HttpRepositoryClient::new(settings)?;
//!
//! let details = get_image_details(&client, "win22", "vmtx", &["release=stable".into()]).await?;
//! let summary = BundleDownloader::new(&client)
//!     .download_bundle(&details.download_uri, "/var/images")
//!     .await?;
//! ```

mod client;
mod error;

pub use client::HttpRepositoryClient;
pub use error::HttpError;
