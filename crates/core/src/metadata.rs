use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::path::Path;
use std::process::ExitStatus;
use std::time::Duration;
use thiserror::Error;

/// Timestamp fields a probe can be asked for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum MetadataField {
    CreateDate,
    DateTimeOriginal,
    MediaCreateDate,
    ModifyDate,
}

impl MetadataField {
    /// Query order. The first field yielding a usable timestamp wins.
    pub const PRIORITY: [MetadataField; 4] = [
        MetadataField::CreateDate,
        MetadataField::DateTimeOriginal,
        MetadataField::MediaCreateDate,
        MetadataField::ModifyDate,
    ];

    pub fn tag_name(self) -> &'static str {
        match self {
            MetadataField::CreateDate => "CreateDate",
            MetadataField::DateTimeOriginal => "DateTimeOriginal",
            MetadataField::MediaCreateDate => "MediaCreateDate",
            MetadataField::ModifyDate => "ModifyDate",
        }
    }
}

impl fmt::Display for MetadataField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag_name())
    }
}

/// Where a generated name came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum NameSource {
    Metadata,
    FallbackUnique,
}

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("metadata backend is not available")]
    Unavailable,
    #[error("{0} is not supported by this backend")]
    Unsupported(MetadataField),
    #[error("{0} is not present")]
    Missing(MetadataField),
    #[error("query timed out after {0:?}")]
    Timeout(Duration),
    #[error("metadata tool exited with {0}")]
    Failed(ExitStatus),
    #[error("could not read metadata: {0}")]
    Malformed(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// A source of capture timestamps for a single file.
///
/// `query` returns the raw value for one field. Callers are expected to
/// check its shape; any error means "this field is absent".
pub trait MetadataProbe {
    fn name(&self) -> &str;
    fn is_available(&self) -> bool;
    fn query(&self, path: &Path, field: MetadataField) -> Result<String, ProbeError>;
}

/// Probe used when metadata is disabled; every query reports `Unavailable`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMetadata;

impl MetadataProbe for NoMetadata {
    fn name(&self) -> &str {
        "none"
    }

    fn is_available(&self) -> bool {
        false
    }

    fn query(&self, _path: &Path, _field: MetadataField) -> Result<String, ProbeError> {
        Err(ProbeError::Unavailable)
    }
}
