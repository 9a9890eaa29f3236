//! Shared constants used across rusty-artifactory crates.

/// Highest index probed for any numbered disk-file series (indices 1..=14).
pub const MAX_SERIES_INDEX: u32 = 14;

/// Width of the zero-padded index used by snapshot disk files (`-000001`).
pub const PADDED_INDEX_WIDTH: usize = 6;

/// Extension used when a name/type search is given no extension (VMware template).
pub const DEFAULT_TEMPLATE_EXTENSION: &str = ".vmxt";

/// Separator placed between a file name and an upload suffix.
pub const SUFFIX_SEPARATOR: &str = "-";

/// Characters the repository rejects inside property names and values.
///
/// `=` is allowed because it separates the name from the value in the
/// canonical `name=value` form.
pub const FORBIDDEN_PROPERTY_CHARS: &[char] = &[
    '(', ')', '{', '}', '[', ']', '*', '+', '^', '$', '/', '~', '`', '!', '@', '#', '%', '&',
    '<', '>', ';', ',', ' ', '\\',
];

/// Self-hosted download port, rewritten to [`SELF_HOSTED_API_PORT`] for API calls.
pub const SELF_HOSTED_DOWNLOAD_PORT: &str = "8082";

/// Self-hosted API port.
pub const SELF_HOSTED_API_PORT: &str = "8081";
