//! Image bundle layouts.
//!
//! A bundle is a primary image file plus the files that ship with it. Each
//! image type has a fixed [`TransferPlan`]:
//!
//! | Type | Required | Optional | Numbered series |
//! |------|----------|----------|-----------------|
//! | OVA  | `.ova` | - | - |
//! | OVF  | `.ovf`, `.mf` | - | `-disk{i}.vmdk` |
//! | VMTX | `.nvram`, `.vmsd`, `.vmtx`, `.vmxf` | `.vmdk`, `-ctk.vmdk`, `-flat.vmdk`, `vmware.log` | `_{i}.vmdk`, `_{i}-ctk.vmdk`, `_{i}-flat.vmdk`, `-{i:06}-ctk.vmdk`, `-{i:06}-flat.vmdk`, `-{i:06}-delta.vmdk` |
//!
//! Required and optional entries are suffixes appended to the image name,
//! except `vmware.log`, which keeps its literal name. Series are probed for
//! `i = 1..=14` and end at the first missing index.

use std::fmt;
use std::str::FromStr;

use rusty_artifactory_common::{MAX_SERIES_INDEX, PADDED_INDEX_WIDTH};

use crate::error::RepositoryError;
use crate::types::TransferredFile;

/// Log file shipped with VMware templates. Never renamed.
pub const VMWARE_LOG_FILE: &str = "vmware.log";

/// Supported image bundle types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageType {
    /// Single-file appliance archive.
    Ova,
    /// Descriptor, manifest and numbered disks.
    Ovf,
    /// VMware template with companion and snapshot disk files.
    Vmtx,
}

impl ImageType {
    /// Image type of a file extension, with or without the leading `.`.
    ///
    /// `vmxt` (the template search extension) is accepted as VMTX.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.trim_start_matches('.').to_lowercase().as_str() {
            "ova" => Some(ImageType::Ova),
            "ovf" => Some(ImageType::Ovf),
            "vmtx" | "vmxt" => Some(ImageType::Vmtx),
            _ => None,
        }
    }

    /// Primary file extension, including the leading `.`.
    pub fn extension(&self) -> &'static str {
        match self {
            ImageType::Ova => ".ova",
            ImageType::Ovf => ".ovf",
            ImageType::Vmtx => ".vmtx",
        }
    }
}

impl fmt::Display for ImageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name: &str = match self {
            ImageType::Ova => "OVA",
            ImageType::Ovf => "OVF",
            ImageType::Vmtx => "VMTX",
        };
        f.write_str(name)
    }
}

impl FromStr for ImageType {
    type Err = RepositoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ImageType::from_extension(s).ok_or_else(|| {
            RepositoryError::invalid_argument(format!(
                "unsupported image type '{}' (expected ova, ovf or vmtx)",
                s
            ))
        })
    }
}

/// Open-ended numbered file series, e.g. `{image}-disk1.vmdk`, `{image}-disk2.vmdk`, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberedSeries {
    /// Text between the image name and the index.
    pub prefix: &'static str,
    /// Text after the index.
    pub suffix: &'static str,
    /// Zero-pad the index to six digits.
    pub padded: bool,
}

impl NumberedSeries {
    const fn new(prefix: &'static str, suffix: &'static str, padded: bool) -> Self {
        Self {
            prefix,
            suffix,
            padded,
        }
    }

    /// File name of index `index` of this series.
    pub fn file_name(&self, image_name: &str, index: u32) -> String {
        if self.padded {
            format!(
                "{}{}{:0width$}{}",
                image_name,
                self.prefix,
                index,
                self.suffix,
                width = PADDED_INDEX_WIDTH
            )
        } else {
            format!("{}{}{}{}", image_name, self.prefix, index, self.suffix)
        }
    }

    /// Indices probed for this series, in order.
    pub fn indices() -> std::ops::RangeInclusive<u32> {
        1..=MAX_SERIES_INDEX
    }
}

const OVF_SERIES: &[NumberedSeries] = &[NumberedSeries::new("-disk", ".vmdk", false)];

const VMTX_SERIES: &[NumberedSeries] = &[
    NumberedSeries::new("_", ".vmdk", false),
    NumberedSeries::new("_", "-ctk.vmdk", false),
    NumberedSeries::new("_", "-flat.vmdk", false),
    NumberedSeries::new("-", "-ctk.vmdk", true),
    NumberedSeries::new("-", "-flat.vmdk", true),
    NumberedSeries::new("-", "-delta.vmdk", true),
];

/// The files that make up one bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferPlan {
    pub image_type: ImageType,
    pub image_name: String,
    /// Files that must all transfer before anything optional is attempted.
    pub required: Vec<String>,
    /// Single optional files, probed before the series.
    pub optional: Vec<String>,
    /// Numbered series, probed one after the other.
    pub series: Vec<NumberedSeries>,
    /// Optional files probed last.
    pub trailing: Vec<String>,
}

impl TransferPlan {
    /// Build the plan for an image.
    pub fn for_image(image_type: ImageType, image_name: &str) -> Self {
        let named = |suffixes: &[&str]| -> Vec<String> {
            suffixes
                .iter()
                .map(|s| format!("{}{}", image_name, s))
                .collect()
        };

        let (required, optional, series, trailing) = match image_type {
            ImageType::Ova => (named(&[".ova"]), Vec::new(), Vec::new(), Vec::new()),
            ImageType::Ovf => (
                named(&[".ovf", ".mf"]),
                Vec::new(),
                OVF_SERIES.to_vec(),
                Vec::new(),
            ),
            ImageType::Vmtx => (
                named(&[".nvram", ".vmsd", ".vmtx", ".vmxf"]),
                named(&[".vmdk", "-ctk.vmdk", "-flat.vmdk"]),
                VMTX_SERIES.to_vec(),
                vec![VMWARE_LOG_FILE.to_string()],
            ),
        };

        Self {
            image_type,
            image_name: image_name.to_string(),
            required,
            optional,
            series,
            trailing,
        }
    }

    /// Use the primary file's actual name in place of `{image}{extension}`.
    ///
    /// A template found by the default search is `{image}.vmxt`, and a
    /// download may name its primary with different casing; the bundle must
    /// fetch that file rather than a `.vmtx` that does not exist.
    pub fn with_primary(mut self, primary: &str) -> Self {
        let default: String = format!("{}{}", self.image_name, self.image_type.extension());
        if let Some(slot) = self.required.iter_mut().find(|name| **name == default) {
            *slot = primary.to_string();
        }
        self
    }

    /// Number of files the plan could transfer at most.
    pub fn max_files(&self) -> usize {
        self.required.len()
            + self.optional.len()
            + self.trailing.len()
            + self.series.len() * MAX_SERIES_INDEX as usize
    }
}

/// Result of a bundle upload or download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleSummary {
    pub image_name: String,
    pub image_type: ImageType,
    /// Files transferred, in transfer order.
    pub files: Vec<TransferredFile>,
    /// Files left alone because they already existed locally.
    pub files_skipped: usize,
    pub bytes_transferred: u64,
}

impl BundleSummary {
    pub fn new(image_type: ImageType, image_name: impl Into<String>) -> Self {
        Self {
            image_name: image_name.into(),
            image_type,
            files: Vec::new(),
            files_skipped: 0,
            bytes_transferred: 0,
        }
    }

    /// Record a transferred file.
    pub fn record(&mut self, file: TransferredFile) {
        self.bytes_transferred += file.bytes;
        self.files.push(file);
    }

    /// Names of the files transferred so far.
    pub fn file_names(&self) -> Vec<String> {
        self.files.iter().map(|f| f.file_name.clone()).collect()
    }

    /// Wrap an error raised while handling `stage`.
    ///
    /// Before the first transfer the error is returned as-is; afterwards it
    /// becomes a `PartialBundleFailure` listing what already moved.
    pub fn failure(&self, stage: &str, err: RepositoryError) -> RepositoryError {
        if self.files.is_empty() {
            return err;
        }
        RepositoryError::PartialBundleFailure {
            stage: stage.to_string(),
            completed: self.file_names(),
            source: Box::new(err),
        }
    }
}
