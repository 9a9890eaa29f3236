//! Property validation and property/artifact maintenance operations.
//!
//! The repository expects property lists in three different shapes:
//!
//! - set: `name=value` pairs joined with `;`
//! - read/delete selected names: names joined with `,`
//! - search: pairs joined with `&` (a single pair is sent bare)
//!
//! Names and values may not contain any of
//! [`FORBIDDEN_PROPERTY_CHARS`](rusty_artifactory_common::FORBIDDEN_PROPERTY_CHARS);
//! setting such a property is rejected before a request is made.

use log::{debug, info};
use rusty_artifactory_common::FORBIDDEN_PROPERTY_CHARS;

use crate::error::RepositoryError;
use crate::traits::RepositoryClient;
use crate::types::{PropertyPair, RequestStatus};

/// True if any entry contains a character the repository rejects.
pub fn contains_forbidden_chars(values: &[String]) -> bool {
    values
        .iter()
        .any(|v| v.contains(|c: char| FORBIDDEN_PROPERTY_CHARS.contains(&c)))
}

/// Check a list of `name=value` pairs before sending it.
///
/// # Errors
/// `InvalidArgument` if the list is empty, an entry is empty, or an entry
/// contains a forbidden character.
pub fn validate_property_pairs(pairs: &[String]) -> Result<(), RepositoryError> {
    if pairs.is_empty() || pairs.iter().any(|p| p.is_empty()) {
        return Err(RepositoryError::invalid_argument(
            "at least one non-empty property name/value is required",
        ));
    }
    if contains_forbidden_chars(pairs) {
        return Err(RepositoryError::invalid_argument(
            "properties cannot contain special characters )( }{ ][ *+^$\\/~`!@#%&<>;, or spaces",
        ));
    }
    Ok(())
}

/// Join pairs for a set request (`a=1;b=2`).
pub fn join_for_set(pairs: &[String]) -> String {
    pairs.join(";")
}

/// Join property names for a read or delete request (`a,b`).
pub fn join_names(names: &[String]) -> String {
    names.join(",")
}

/// Join pairs for a property search (`a=1&b=2`).
pub fn join_for_search(pairs: &[String]) -> String {
    pairs.join("&")
}

fn require_uri(uri: &str, operation: &str) -> Result<(), RepositoryError> {
    if uri.is_empty() {
        return Err(RepositoryError::invalid_argument(format!(
            "unable to {} without the artifact URI",
            operation
        )));
    }
    Ok(())
}

fn require_names(names: &[String], operation: &str) -> Result<(), RepositoryError> {
    if names.is_empty() || names.iter().any(|n| n.is_empty()) {
        return Err(RepositoryError::invalid_argument(format!(
            "unable to {} without one or more property names",
            operation
        )));
    }
    Ok(())
}

/// Set properties on an artifact after validating them.
///
/// # Arguments
/// * `client` - Repository client
/// * `uri` - Artifact URI
/// * `pairs` - `name=value` pairs (case-sensitive)
///
/// # Returns
/// The request status reported by the server.
pub async fn set_artifact_properties<C: RepositoryClient + ?Sized>(
    client: &C,
    uri: &str,
    pairs: &[String],
) -> Result<RequestStatus, RepositoryError> {
    require_uri(uri, "set properties")?;
    validate_property_pairs(pairs)?;

    debug!("Setting properties {} on {}", join_for_set(pairs), uri);
    let status: RequestStatus = client.set_properties(uri, pairs).await?;
    info!("Set properties on {}: HTTP {}", uri, status.code());
    Ok(status)
}

/// Remove properties from an artifact.
///
/// Removing a property that is not set is reported as success by the server.
pub async fn delete_artifact_properties<C: RepositoryClient + ?Sized>(
    client: &C,
    uri: &str,
    names: &[String],
) -> Result<RequestStatus, RepositoryError> {
    require_uri(uri, "delete properties")?;
    require_names(names, "delete properties")?;

    debug!("Deleting properties {} from {}", join_names(names), uri);
    client.delete_properties(uri, names).await
}

/// Read the values of selected properties.
pub async fn get_artifact_property_values<C: RepositoryClient + ?Sized>(
    client: &C,
    uri: &str,
    names: &[String],
) -> Result<Vec<PropertyPair>, RepositoryError> {
    require_uri(uri, "read properties")?;
    require_names(names, "read properties")?;
    client.get_property_values(uri, names).await
}

/// Delete an artifact.
pub async fn delete_artifact<C: RepositoryClient + ?Sized>(
    client: &C,
    uri: &str,
) -> Result<RequestStatus, RepositoryError> {
    require_uri(uri, "delete an artifact")?;
    let status: RequestStatus = client.delete_artifact(uri).await?;
    info!("Delete {}: HTTP {}", uri, status.code());
    Ok(status)
}
