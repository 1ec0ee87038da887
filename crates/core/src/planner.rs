use crate::canonical::is_canonical;
use crate::collision::{NameState, DEFAULT_COLLISION_LIMIT};
use crate::error::RenameError;
use crate::metadata::NameSource;
use crate::naming::NameGenerator;
use crate::validate::validate_file_name;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameCandidate {
    pub original_path: PathBuf,
    pub target_path: PathBuf,
    pub source: NameSource,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SkipReason {
    AlreadyCanonical,
    Unchanged,
}

#[derive(Debug, Clone)]
pub enum Planned {
    Skip(SkipReason),
    Rename(RenameCandidate),
}

/// Decides the target name for one file at a time, remembering every name
/// it has handed out so later files never collide with earlier ones.
pub struct Planner {
    generator: NameGenerator,
    names: NameState,
    collision_limit: u32,
}

impl Planner {
    pub fn new(generator: NameGenerator) -> Self {
        Self {
            generator,
            names: NameState::new(),
            collision_limit: DEFAULT_COLLISION_LIMIT,
        }
    }

    pub fn with_collision_limit(mut self, limit: u32) -> Self {
        self.collision_limit = limit;
        self
    }

    pub fn generator(&self) -> &NameGenerator {
        &self.generator
    }

    pub fn plan_file(&mut self, path: &Path) -> Result<Planned, RenameError> {
        check_source(path)?;

        let current_name = path.file_name().and_then(|name| name.to_str());
        if current_name.is_some_and(is_canonical) {
            debug!("{}: already canonical", path.display());
            return Ok(Planned::Skip(SkipReason::AlreadyCanonical));
        }

        let dir = parent_dir(path)?;
        let candidate = self.generator.generate(path)?;
        let target = self
            .names
            .resolve(&dir, &candidate, path, self.collision_limit)?;

        let target_name = target
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        if target.file_name() == path.file_name() {
            return Ok(Planned::Skip(SkipReason::Unchanged));
        }
        validate_file_name(&target_name).map_err(|reason| RenameError::InvalidName {
            name: target_name.clone(),
            reason,
        })?;

        Ok(Planned::Rename(RenameCandidate {
            original_path: path.to_path_buf(),
            target_path: target,
            source: candidate.source,
        }))
    }
}

/// The source must exist and resolve to a regular file. A symlink to a file
/// passes; the link itself is what gets renamed.
fn check_source(path: &Path) -> Result<(), RenameError> {
    if fs::symlink_metadata(path).is_err() {
        return Err(RenameError::SourceMissing(path.to_path_buf()));
    }
    match fs::metadata(path) {
        Ok(meta) if meta.is_file() => Ok(()),
        _ => Err(RenameError::NotAFile(path.to_path_buf())),
    }
}

fn parent_dir(path: &Path) -> Result<PathBuf, RenameError> {
    let parent = path
        .parent()
        .ok_or_else(|| RenameError::NoParent(path.to_path_buf()))?;
    let parent = if parent.as_os_str().is_empty() {
        Path::new(".")
    } else {
        parent
    };
    // One spelling per directory, so reservations made through "./a.mp4"
    // also hold for "a.mp4".
    Ok(fs::canonicalize(parent).unwrap_or_else(|_| parent.to_path_buf()))
}
