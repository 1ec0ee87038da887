use crate::error::RenameError;
use crate::naming::CandidateName;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_COLLISION_LIMIT: u32 = 999;

/// Names that are off limits for the rest of the run: anything on disk plus
/// every target already handed out, even if it has not been renamed yet.
#[derive(Debug, Default)]
pub struct NameState {
    reserved: HashSet<PathBuf>,
}

impl NameState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_taken(&self, candidate: &Path, own_path: &Path) -> bool {
        let key = reservation_key(candidate);
        if self.reserved.contains(&key) {
            return true;
        }
        if key == reservation_key(own_path) {
            return false;
        }
        exists_on_disk(candidate)
    }

    pub fn reserve(&mut self, path: PathBuf) {
        self.reserved.insert(reservation_key(&path));
    }

    pub fn reserved_len(&self) -> usize {
        self.reserved.len()
    }

    /// Finds the first free name for `candidate` inside `dir`, trying the
    /// plain name and then `-1` up to `-limit`. The winner is reserved.
    pub fn resolve(
        &mut self,
        dir: &Path,
        candidate: &CandidateName,
        own_path: &Path,
        limit: u32,
    ) -> Result<PathBuf, RenameError> {
        let plain = dir.join(candidate.file_name());
        if !self.is_taken(&plain, own_path) {
            self.reserve(plain.clone());
            return Ok(plain);
        }

        for counter in 1..=limit {
            let numbered = dir.join(candidate.numbered(counter));
            if !self.is_taken(&numbered, own_path) {
                self.reserve(numbered.clone());
                return Ok(numbered);
            }
        }

        Err(RenameError::CollisionExhausted {
            base: candidate.file_name(),
            attempts: limit,
        })
    }
}

/// Default file systems on macOS and Windows ignore case, so names that only
/// differ in case share one reservation there.
#[cfg(any(target_os = "macos", windows))]
fn reservation_key(path: &Path) -> PathBuf {
    PathBuf::from(path.to_string_lossy().to_lowercase())
}

#[cfg(not(any(target_os = "macos", windows)))]
fn reservation_key(path: &Path) -> PathBuf {
    path.to_path_buf()
}

/// Dangling symlinks count as present.
pub fn exists_on_disk(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}
