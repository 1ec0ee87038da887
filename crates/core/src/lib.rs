mod apply;
mod canonical;
mod collision;
mod config;
mod error;
mod exif_reader;
mod exiftool;
mod metadata;
mod naming;
mod planner;
mod runner;
mod select;
mod validate;

pub use apply::apply_candidate;
pub use canonical::{is_canonical, is_timestamp, is_unique_id};
pub use collision::{NameState, DEFAULT_COLLISION_LIMIT};
pub use config::{
    app_paths, load_config, load_config_from, save_config, AppConfig, AppPaths, MetadataBackend,
};
pub use error::RenameError;
pub use exif_reader::EmbeddedExifProbe;
pub use exiftool::ExifToolProbe;
pub use metadata::{MetadataField, MetadataProbe, NameSource, NoMetadata, ProbeError};
pub use naming::{CandidateName, IdSource, NameGenerator, RandomUuid, DEFAULT_UNIQUE_ID_RETRIES};
pub use planner::{Planned, Planner, RenameCandidate, SkipReason};
pub use runner::{run_batch, FileOutcome, Outcome, RunCounters, RunOptions, RunReport};
pub use select::{select_files, SelectOptions, SelectStats};
pub use validate::{validate_file_name, ValidationError, MAX_FILE_NAME_CHARS};
