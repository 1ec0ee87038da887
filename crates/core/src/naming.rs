use crate::canonical::{is_timestamp, is_unique_id, DATE_FORMAT};
use crate::error::RenameError;
use crate::metadata::{MetadataField, MetadataProbe, NameSource};
use chrono::NaiveDate;
use log::debug;
use std::path::Path;
use uuid::Uuid;

pub const DEFAULT_UNIQUE_ID_RETRIES: u32 = 10;

/// A generated base name, before collision handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateName {
    pub stem: String,
    pub extension: Option<String>,
    pub source: NameSource,
}

impl CandidateName {
    pub fn file_name(&self) -> String {
        join_name(&self.stem, self.extension.as_deref())
    }

    /// The same name with a collision counter appended to the stem.
    pub fn numbered(&self, counter: u32) -> String {
        join_name(
            &format!("{}-{}", self.stem, counter),
            self.extension.as_deref(),
        )
    }
}

fn join_name(stem: &str, extension: Option<&str>) -> String {
    match extension {
        Some(ext) => format!("{stem}.{ext}"),
        None => stem.to_string(),
    }
}

pub trait IdSource {
    fn next_id(&self) -> String;
}

/// Random (v4) UUIDs in lowercase hyphenated form.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomUuid;

impl IdSource for RandomUuid {
    fn next_id(&self) -> String {
        Uuid::new_v4().hyphenated().to_string()
    }
}

pub struct NameGenerator {
    probe: Option<Box<dyn MetadataProbe>>,
    ids: Box<dyn IdSource>,
    run_date: NaiveDate,
    unique_id_retries: u32,
}

impl NameGenerator {
    pub fn new(run_date: NaiveDate) -> Self {
        Self {
            probe: None,
            ids: Box::new(RandomUuid),
            run_date,
            unique_id_retries: DEFAULT_UNIQUE_ID_RETRIES,
        }
    }

    pub fn with_probe(mut self, probe: Box<dyn MetadataProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    pub fn with_id_source(mut self, ids: Box<dyn IdSource>) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_unique_id_retries(mut self, retries: u32) -> Self {
        self.unique_id_retries = retries;
        self
    }

    pub fn run_date(&self) -> NaiveDate {
        self.run_date
    }

    pub fn generate(&self, path: &Path) -> Result<CandidateName, RenameError> {
        // "clip." has an empty extension; the name keeps no trailing dot.
        let extension = match path.extension() {
            Some(ext) if ext.is_empty() => None,
            Some(ext) => Some(
                ext.to_str()
                    .ok_or_else(|| RenameError::NonUtf8Extension(path.to_path_buf()))?
                    .to_string(),
            ),
            None => None,
        };

        if let Some(timestamp) = self.timestamp_from_metadata(path) {
            return Ok(CandidateName {
                stem: timestamp,
                extension,
                source: NameSource::Metadata,
            });
        }

        let id = self.unique_id()?;
        Ok(CandidateName {
            stem: format!("{}_{}", self.run_date.format(DATE_FORMAT), id),
            extension,
            source: NameSource::FallbackUnique,
        })
    }

    fn timestamp_from_metadata(&self, path: &Path) -> Option<String> {
        let probe = self.probe.as_deref().filter(|probe| probe.is_available())?;

        for field in MetadataField::PRIORITY {
            match probe.query(path, field) {
                Ok(value) if is_timestamp(&value) => {
                    debug!("{}: {field} = {value}", path.display());
                    return Some(value);
                }
                Ok(value) => {
                    debug!("{}: {field} unusable ({value:?})", path.display());
                }
                Err(err) => {
                    debug!("{}: {field} absent ({err})", path.display());
                }
            }
        }

        None
    }

    fn unique_id(&self) -> Result<String, RenameError> {
        for _ in 0..self.unique_id_retries {
            let id = self.ids.next_id();
            if is_unique_id(&id) {
                return Ok(id);
            }
            debug!("discarding malformed unique id {id:?}");
        }
        Err(RenameError::UniqueIdExhausted {
            attempts: self.unique_id_retries,
        })
    }
}
