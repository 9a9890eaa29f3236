//! Image details lookup: search, filter, disambiguate, describe.

use log::info;
use rusty_artifactory_common::artifact_name_from_uri;

use crate::disambiguate::PropertyDisambiguator;
use crate::error::RepositoryError;
use crate::search::find_by_name_and_type;
use crate::traits::RepositoryClient;
use crate::types::{ImageDetails, PropertyPair};

/// Resolve a partial image name to exactly one artifact and describe it.
///
/// Searches by name, keeps the files of type `extension`, narrows the result
/// to the candidate carrying all of `required_props` (newest wins ties), and
/// looks up its creation date and download URI.
///
/// # Arguments
/// * `client` - Repository client
/// * `name` - Partial artifact name
/// * `extension` - File extension; empty means the default template extension
/// * `required_props` - `name=value` pairs the artifact must carry
pub async fn get_image_details<C: RepositoryClient + ?Sized>(
    client: &C,
    name: &str,
    extension: &str,
    required_props: &[String],
) -> Result<ImageDetails, RepositoryError> {
    let candidates: Vec<String> = find_by_name_and_type(client, name, extension).await?;
    let required: Vec<PropertyPair> = required_props
        .iter()
        .map(|p| PropertyPair::parse(p))
        .collect();

    let uri: String = PropertyDisambiguator::new(client)
        .disambiguate(&candidates, &required)
        .await?;
    let created_date: String = client.get_created_date(&uri).await?;
    let download_uri: String = client.get_download_uri(&uri).await?;

    let details = ImageDetails {
        name: artifact_name_from_uri(&uri),
        uri,
        created_date,
        download_uri,
    };
    info!("Resolved '{}' to {}", name, details.uri);
    Ok(details)
}
