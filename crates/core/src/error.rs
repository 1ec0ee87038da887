use crate::validate::ValidationError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Conditions that stop one file from being renamed. None of them abort the
/// rest of the run.
#[derive(Debug, Error)]
pub enum RenameError {
    #[error("could not produce a well-formed unique id after {attempts} attempts")]
    UniqueIdExhausted { attempts: u32 },
    #[error("no free name for {base} after {attempts} numbered attempts")]
    CollisionExhausted { base: String, attempts: u32 },
    #[error("extension of {} is not valid UTF-8", .0.display())]
    NonUtf8Extension(PathBuf),
    #[error("{} has no parent directory", .0.display())]
    NoParent(PathBuf),
    #[error("invalid target name {name:?}: {reason}")]
    InvalidName {
        name: String,
        reason: ValidationError,
    },
    #[error("source file is missing: {}", .0.display())]
    SourceMissing(PathBuf),
    #[error("not a regular file: {}", .0.display())]
    NotAFile(PathBuf),
    #[error("target already exists: {}", .0.display())]
    TargetExists(PathBuf),
    #[error("permission denied renaming {}", .0.display())]
    PermissionDenied(PathBuf),
    #[error("rename failed: {} -> {}", .from.display(), .to.display())]
    Io {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}
