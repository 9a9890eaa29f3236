//! Name/type search and property search over the repository's search index.

use log::debug;
use rusty_artifactory_common::{file_extension, DEFAULT_TEMPLATE_EXTENSION};

use crate::error::RepositoryError;
use crate::properties::join_for_search;
use crate::traits::RepositoryClient;

/// Normalize an extension to carry a leading `.`.
///
/// An empty extension becomes the default template extension.
pub fn normalize_extension(extension: &str) -> String {
    let extension: &str = extension.trim();
    if extension.is_empty() {
        DEFAULT_TEMPLATE_EXTENSION.to_string()
    } else if extension.starts_with('.') {
        extension.to_string()
    } else {
        format!(".{}", extension)
    }
}

/// Keep the URIs whose final element ends in exactly `extension`.
///
/// Order is preserved.
pub fn filter_by_extension(uris: Vec<String>, extension: &str) -> Vec<String> {
    let extension: String = normalize_extension(extension);
    uris.into_iter()
        .filter(|uri| file_extension(uri) == extension)
        .collect()
}

/// Search by partial name, then keep only files of the given type.
///
/// # Arguments
/// * `client` - Repository client
/// * `name` - Partial artifact name (matched case-insensitively by the server)
/// * `extension` - File extension with or without the leading `.`; empty
///   means the default template extension
///
/// # Returns
/// Matching URIs in server order.
///
/// # Errors
/// `InvalidArgument` for an empty name, `NotFound` when the search or the
/// extension filter leaves nothing.
pub async fn find_by_name_and_type<C: RepositoryClient + ?Sized>(
    client: &C,
    name: &str,
    extension: &str,
) -> Result<Vec<String>, RepositoryError> {
    if name.is_empty() {
        return Err(RepositoryError::invalid_argument(
            "an artifact name is required to search",
        ));
    }

    let candidates: Vec<String> = client.search_by_name(name).await?;
    if candidates.is_empty() {
        return Err(RepositoryError::not_found(format!(
            "no artifacts matching '{}'",
            name
        )));
    }

    let extension: String = normalize_extension(extension);
    let filtered: Vec<String> = filter_by_extension(candidates, &extension);
    debug!(
        "{} artifact(s) matching '{}' with extension {}",
        filtered.len(),
        name,
        extension
    );
    if filtered.is_empty() {
        return Err(RepositoryError::not_found(format!(
            "no {} artifacts matching '{}'",
            extension, name
        )));
    }
    Ok(filtered)
}

/// Search by property names or `name=value` pairs.
///
/// # Errors
/// `InvalidArgument` for an empty list, `NotFound` when nothing matches.
pub async fn find_by_properties<C: RepositoryClient + ?Sized>(
    client: &C,
    pairs: &[String],
) -> Result<Vec<String>, RepositoryError> {
    if pairs.is_empty() || pairs.iter().any(|p| p.is_empty()) {
        return Err(RepositoryError::invalid_argument(
            "at least one property is required to search",
        ));
    }

    let uris: Vec<String> = client.search_by_property(pairs).await?;
    if uris.is_empty() {
        return Err(RepositoryError::not_found(format!(
            "no artifacts with properties {}",
            join_for_search(pairs)
        )));
    }
    Ok(uris)
}
