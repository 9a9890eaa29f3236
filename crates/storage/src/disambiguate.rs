//! Property-based disambiguation of search candidates.
//!
//! Narrows a candidate list to a single artifact:
//!
//! 1. A single candidate is returned as-is, without looking at properties.
//! 2. With no required properties, the most recently created candidate wins.
//! 3. Otherwise each candidate's properties are fetched and counted against
//!    the required pairs. Only candidates matching every pair qualify; if
//!    several qualify, the most recently created one wins.
//!
//! A failed property lookup for one candidate only disqualifies that
//! candidate, unless the server could not be reached at all.

use log::{debug, warn};

use crate::error::RepositoryError;
use crate::traits::RepositoryClient;
use crate::types::{PropertyPair, ResolvedArtifact};

/// Return the most recently created artifact of a list.
///
/// Creation timestamps are ISO-8601 strings and compare lexicographically.
/// Equal timestamps fall back to URI order, so the result is deterministic.
///
/// # Errors
/// `NotFound` for an empty list. Failing creation-date lookups propagate.
pub async fn latest_created<C: RepositoryClient + ?Sized>(
    client: &C,
    uris: &[String],
) -> Result<ResolvedArtifact, RepositoryError> {
    let mut dated: Vec<ResolvedArtifact> = Vec::with_capacity(uris.len());
    for uri in uris {
        let created: String = client.get_created_date(uri).await?;
        dated.push(ResolvedArtifact {
            uri: uri.clone(),
            created,
        });
    }

    dated.sort_by(|a, b| a.created.cmp(&b.created).then_with(|| a.uri.cmp(&b.uri)));
    dated
        .pop()
        .ok_or_else(|| RepositoryError::not_found("no artifacts to compare"))
}

/// Picks one artifact out of a candidate list using required properties.
pub struct PropertyDisambiguator<'a, C: RepositoryClient + ?Sized> {
    client: &'a C,
}

impl<'a, C: RepositoryClient + ?Sized> PropertyDisambiguator<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Resolve `candidates` to exactly one URI.
    ///
    /// # Arguments
    /// * `candidates` - Candidate artifact URIs; duplicates are ignored
    /// * `required` - Properties the result must carry, all of them
    ///
    /// # Errors
    /// - `NotFound` when there are no candidates or none carries any of the
    ///   required properties
    /// - `AmbiguousResult` when candidates match some but not all properties
    /// - `Transport` when a property lookup could not reach the server
    pub async fn disambiguate(
        &self,
        candidates: &[String],
        required: &[PropertyPair],
    ) -> Result<String, RepositoryError> {
        let candidates: Vec<String> = dedup(candidates);
        match candidates.as_slice() {
            [] => return Err(RepositoryError::not_found("no candidates to disambiguate")),
            [only] => return Ok(only.clone()),
            _ => {}
        }

        if required.is_empty() {
            debug!(
                "No properties requested, picking latest of {} candidates",
                candidates.len()
            );
            return Ok(latest_created(self.client, &candidates).await?.uri);
        }

        let required: Vec<String> = dedup(
            &required
                .iter()
                .map(PropertyPair::canonical)
                .collect::<Vec<String>>(),
        );

        let mut full_matches: Vec<String> = Vec::new();
        let mut partial_matches: usize = 0;
        for uri in &candidates {
            let matched: usize = self.count_matches(uri, &required).await?;
            if matched == required.len() {
                full_matches.push(uri.clone());
            } else if matched > 0 {
                partial_matches += 1;
            }
        }
        debug!(
            "{} of {} candidates match all of {}; {} match some",
            full_matches.len(),
            candidates.len(),
            required.join(","),
            partial_matches
        );

        match full_matches.len() {
            1 => Ok(full_matches.remove(0)),
            0 if partial_matches > 0 => Err(RepositoryError::AmbiguousResult {
                message: format!(
                    "{} candidate(s) matched some but not all of {}",
                    partial_matches,
                    required.join(",")
                ),
            }),
            0 => Err(RepositoryError::not_found(format!(
                "no candidates with properties {}",
                required.join(",")
            ))),
            _ => Ok(latest_created(self.client, &full_matches).await?.uri),
        }
    }

    /// Return the most recently created of `uris`.
    pub async fn latest_created(&self, uris: &[String]) -> Result<ResolvedArtifact, RepositoryError> {
        latest_created(self.client, uris).await
    }

    /// Count the required `name=value` pairs a candidate carries.
    ///
    /// Lookup failures count as zero matches, except network failures.
    async fn count_matches(&self, uri: &str, required: &[String]) -> Result<usize, RepositoryError> {
        let properties: Vec<PropertyPair> = match self.client.get_all_properties(uri).await {
            Ok(properties) => properties,
            Err(err) if err.is_network_failure() => return Err(err),
            Err(err) => {
                warn!("Skipping candidate {}: {}", uri, err);
                return Ok(0);
            }
        };

        let present: Vec<String> = properties.iter().map(PropertyPair::canonical).collect();
        Ok(required.iter().filter(|pair| present.contains(pair)).count())
    }
}

fn dedup(values: &[String]) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        if !unique.contains(value) {
            unique.push(value.clone());
        }
    }
    unique
}
