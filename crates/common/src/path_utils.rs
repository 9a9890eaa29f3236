//! URI, file name and source path helpers for artifact operations.

use std::path::Path;

use crate::constants::{SELF_HOSTED_API_PORT, SELF_HOSTED_DOWNLOAD_PORT, SUFFIX_SEPARATOR};
use crate::error::PathError;

/// Return the last `/`-separated segment of a URI or remote path.
///
/// # Arguments
/// * `uri` - Artifact URI, download URI or repository path
///
/// # Returns
/// The file name, or the whole input if it has no `/`.
pub fn file_name_from_uri(uri: &str) -> &str {
    match uri.rfind('/') {
        Some(idx) => &uri[idx + 1..],
        None => uri,
    }
}

/// Return everything up to and including the last `/` of a URI.
///
/// Companion files of a bundle live next to the primary artifact, so their
/// URIs are built by appending a file name to this prefix.
pub fn parent_uri(uri: &str) -> &str {
    match uri.rfind('/') {
        Some(idx) => &uri[..=idx],
        None => "",
    }
}

/// Extension of the final path element, including the leading `.`.
///
/// Returns an empty string when the final element has no `.`.
///
/// # Arguments
/// * `name` - File name or full URI
pub fn file_extension(name: &str) -> &str {
    let file_name: &str = file_name_from_uri(name);
    match file_name.rfind('.') {
        Some(idx) => &file_name[idx..],
        None => "",
    }
}

/// Strip the extension from a file name (`win22.vmtx` -> `win22`).
pub fn image_name_from_file_name(file_name: &str) -> &str {
    let ext: &str = file_extension(file_name);
    &file_name[..file_name.len() - ext.len()]
}

/// Artifact name (file name without extension) from an artifact or download URI.
pub fn artifact_name_from_uri(uri: &str) -> String {
    image_name_from_file_name(file_name_from_uri(uri)).to_string()
}

/// Ensure a path ends with a separator.
///
/// Windows-style paths (containing `\`) get a backslash, everything else a
/// forward slash. Empty input is returned unchanged.
pub fn ensure_trailing_slash(path: &str) -> String {
    if path.is_empty() {
        return String::new();
    }
    let separator: char = if path.contains('\\') { '\\' } else { '/' };
    if path.ends_with(separator) {
        path.to_string()
    } else {
        format!("{}{}", path, separator)
    }
}

/// Insert `-{suffix}` between the file stem and its extension.
///
/// `build.txt` with suffix `1.2` becomes `build-1.2.txt`. An empty suffix
/// leaves the name unchanged.
pub fn insert_suffix_before_extension(file_name: &str, suffix: &str) -> String {
    if suffix.is_empty() {
        return file_name.to_string();
    }
    let ext: &str = file_extension(file_name);
    let stem: &str = &file_name[..file_name.len() - ext.len()];
    format!("{}{}{}{}", stem, SUFFIX_SEPARATOR, suffix, ext)
}

/// Insert `-{suffix}` right after a leading image-name prefix.
///
/// `win22-disk1.vmdk` with prefix `win22` and suffix `v2` becomes
/// `win22-v2-disk1.vmdk`. The prefix comparison ignores case, since the name
/// may carry the on-disk casing. Falls back to
/// [`insert_suffix_before_extension`] when the prefix does not match.
pub fn insert_suffix_after_prefix(file_name: &str, prefix: &str, suffix: &str) -> String {
    if suffix.is_empty() {
        return file_name.to_string();
    }
    match file_name.get(..prefix.len()) {
        Some(head) if head.eq_ignore_ascii_case(prefix) => format!(
            "{}{}{}{}",
            head,
            SUFFIX_SEPARATOR,
            suffix,
            &file_name[prefix.len()..]
        ),
        _ => insert_suffix_before_extension(file_name, suffix),
    }
}

/// List the regular files of a directory, sorted by name.
///
/// # Errors
/// Returns `PathError::IoError` if the directory cannot be read.
pub fn list_file_names(dir: &Path) -> Result<Vec<String>, PathError> {
    let entries = std::fs::read_dir(dir).map_err(|e| PathError::from_io(dir.display().to_string(), e))?;

    let mut names: Vec<String> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| PathError::from_io(dir.display().to_string(), e))?;
        let is_file: bool = entry
            .file_type()
            .map(|t| t.is_file())
            .unwrap_or(false);
        if is_file {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

/// Find the on-disk name matching a requested file name, ignoring case.
///
/// The repository is case-sensitive, so uploads must use the casing that
/// actually exists on disk. An exact match wins over a case-insensitive one.
///
/// # Arguments
/// * `available` - File names present in the source directory
/// * `requested` - File name the caller asked for
///
/// # Returns
/// The actual on-disk name, or `None` when nothing matches.
pub fn resolve_source_file_name(available: &[String], requested: &str) -> Option<String> {
    if let Some(exact) = available.iter().find(|name| name.as_str() == requested) {
        return Some(exact.clone());
    }
    let wanted: String = requested.to_lowercase();
    available
        .iter()
        .find(|name| name.to_lowercase() == wanted)
        .cloned()
}

/// Like [`resolve_source_file_name`], but a missing file is an error.
///
/// # Errors
/// Returns `PathError::FileNotFound` naming `dir/requested` when no file matches.
pub fn require_source_file_name(
    dir: &Path,
    available: &[String],
    requested: &str,
) -> Result<String, PathError> {
    resolve_source_file_name(available, requested).ok_or_else(|| PathError::FileNotFound {
        path: dir.join(requested).display().to_string(),
    })
}

/// Convert a download URI into the storage-API URI of the same artifact.
///
/// `http://host:8082/artifactory/repo/dir/a.ext` becomes
/// `http://host:8081/artifactory/api/storage/repo/dir/a.ext` for self-hosted
/// servers; hosted servers only gain the `/api/storage` segment.
///
/// # Arguments
/// * `server_api` - API root, e.g. `https://host/artifactory/api`
/// * `download_uri` - Download URI returned by an upload or lookup
pub fn artifact_uri_from_download_uri(server_api: &str, download_uri: &str) -> String {
    let download_uri: String = if download_uri.contains(SELF_HOSTED_DOWNLOAD_PORT) {
        download_uri.replacen(SELF_HOSTED_DOWNLOAD_PORT, SELF_HOSTED_API_PORT, 1)
    } else {
        download_uri.to_string()
    };
    let base: &str = server_api
        .trim_end_matches('/')
        .strip_suffix("/api")
        .unwrap_or(server_api);
    let artifact_path: &str = download_uri.strip_prefix(base).unwrap_or(&download_uri);
    format!("{}/api/storage{}", base, artifact_path)
}
