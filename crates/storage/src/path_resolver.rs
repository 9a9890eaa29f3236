//! Tree-walk resolution of artifact names to repository folder paths.
//!
//! Unlike the search-index lookups in [`crate::search`], the resolver walks
//! every repository's folder hierarchy with one listing call per container.
//! It reports the folder that holds a matching file, not the file itself.
//!
//! # Example
//!
//! ```ignore
//! use rusty_artifactory_storage::PathResolver;
//!
//! let resolver = PathResolver::new(&client);
//! let paths = resolver.resolve_paths("win22").await?;
//! // ["templates/windows/2022", ...]
//! ```

use futures::future::{BoxFuture, FutureExt};
use log::debug;

use crate::error::RepositoryError;
use crate::traits::RepositoryClient;
use crate::types::RepositoryEntry;

/// Whether a leaf name matches a requested artifact name.
///
/// Tries, in order: the name as given, its lowercase form, its uppercase form,
/// and finally a comparison that ignores case and the separators `-`, `_`,
/// `.` and space on both sides (so `Win22` matches `win-22-build.vmxt`).
pub fn leaf_matches(leaf: &str, artifact_name: &str) -> bool {
    leaf.contains(artifact_name)
        || leaf.contains(&artifact_name.to_lowercase())
        || leaf.contains(&artifact_name.to_uppercase())
        || squash(leaf).contains(&squash(artifact_name))
}

fn squash(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, '-' | '_' | '.' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Resolves artifact names to folder paths by walking the repository tree.
pub struct PathResolver<'a, C: RepositoryClient + ?Sized> {
    client: &'a C,
}

impl<'a, C: RepositoryClient + ?Sized> PathResolver<'a, C> {
    /// Create a resolver over a repository client.
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Find every folder path holding a file whose name matches `artifact_name`.
    ///
    /// Paths have the form `repo` or `repo/folder/sub`. Each path appears
    /// once, in the order first encountered.
    ///
    /// # Errors
    /// `InvalidArgument` for an empty name, `NotFound` when no repository is
    /// visible or nothing matches. Listing failures propagate.
    pub async fn resolve_paths(&self, artifact_name: &str) -> Result<Vec<String>, RepositoryError> {
        if artifact_name.is_empty() {
            return Err(RepositoryError::invalid_argument(
                "an artifact name is required to resolve paths",
            ));
        }

        let repositories: Vec<String> = self.client.list_repositories().await?;
        if repositories.is_empty() {
            return Err(RepositoryError::not_found("no repositories visible"));
        }

        let mut paths: Vec<String> = Vec::new();
        for repository in repositories {
            let matches: Vec<String> = self.walk(repository, artifact_name).await?;
            for path in matches {
                if !paths.contains(&path) {
                    paths.push(path);
                }
            }
        }

        if paths.is_empty() {
            return Err(RepositoryError::not_found(format!(
                "no paths containing '{}'",
                artifact_name
            )));
        }
        debug!("Resolved '{}' to {} path(s)", artifact_name, paths.len());
        Ok(paths)
    }

    /// Depth-first walk below `path`.
    ///
    /// Yields `path` once per matching leaf, so the result may hold repeats.
    fn walk<'b>(
        &'b self,
        path: String,
        artifact_name: &'b str,
    ) -> BoxFuture<'b, Result<Vec<String>, RepositoryError>>
    where
        'a: 'b,
    {
        async move {
            let children: Vec<RepositoryEntry> = self.client.list_children(&path).await?;

            let mut found: Vec<String> = Vec::new();
            for entry in children {
                if entry.is_folder {
                    let sub_path: String = format!("{}{}", path, entry.child);
                    found.extend(self.walk(sub_path, artifact_name).await?);
                } else if leaf_matches(entry.child.trim_start_matches('/'), artifact_name) {
                    found.push(path.clone());
                }
            }
            Ok(found)
        }
        .boxed()
    }
}
