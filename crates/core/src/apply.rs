use crate::collision::exists_on_disk;
use crate::error::RenameError;
use crate::planner::RenameCandidate;
use std::fs;
use std::io;

/// Performs one planned rename. The target is checked again right before
/// the call so a file that appeared since planning is never overwritten.
pub fn apply_candidate(candidate: &RenameCandidate) -> Result<(), RenameError> {
    let from = &candidate.original_path;
    let to = &candidate.target_path;

    if fs::symlink_metadata(from).is_err() {
        return Err(RenameError::SourceMissing(from.clone()));
    }
    if exists_on_disk(to) {
        return Err(RenameError::TargetExists(to.clone()));
    }

    fs::rename(from, to).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => RenameError::SourceMissing(from.clone()),
        io::ErrorKind::AlreadyExists => RenameError::TargetExists(to.clone()),
        io::ErrorKind::PermissionDenied => RenameError::PermissionDenied(from.clone()),
        _ => RenameError::Io {
            from: from.clone(),
            to: to.clone(),
            source: err,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::apply_candidate;
    use crate::error::RenameError;
    use crate::metadata::NameSource;
    use crate::planner::RenameCandidate;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn candidate(from: &Path, to: &Path) -> RenameCandidate {
        RenameCandidate {
            original_path: from.to_path_buf(),
            target_path: to.to_path_buf(),
            source: NameSource::Metadata,
        }
    }

    #[test]
    fn renames_when_target_is_free() {
        let temp = tempdir().expect("tempdir");
        let from = temp.path().join("clip.mp4");
        let to = temp.path().join("2024-03-15_143022.mp4");
        fs::write(&from, b"payload").expect("write clip");

        apply_candidate(&candidate(&from, &to)).expect("rename");
        assert!(!from.exists());
        assert_eq!(fs::read(&to).expect("read target"), b"payload");
    }

    #[test]
    fn refuses_to_overwrite_a_target_that_appeared_later() {
        let temp = tempdir().expect("tempdir");
        let from = temp.path().join("clip.mp4");
        let to = temp.path().join("2024-03-15_143022.mp4");
        fs::write(&from, b"new").expect("write clip");
        fs::write(&to, b"old").expect("write target");

        let err = apply_candidate(&candidate(&from, &to)).expect_err("target exists");
        assert!(matches!(err, RenameError::TargetExists(_)));
        assert_eq!(fs::read(&from).expect("read source"), b"new");
        assert_eq!(fs::read(&to).expect("read target"), b"old");
    }

    #[test]
    fn missing_source_is_reported() {
        let temp = tempdir().expect("tempdir");
        let from = temp.path().join("gone.mp4");
        let to = temp.path().join("2024-03-15_143022.mp4");

        let err = apply_candidate(&candidate(&from, &to)).expect_err("source missing");
        assert!(matches!(err, RenameError::SourceMissing(_)));
        assert!(!to.exists());
    }

    #[cfg(unix)]
    #[test]
    fn read_only_directory_maps_to_permission_denied() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempdir().expect("tempdir");
        let dir = temp.path().join("locked");
        fs::create_dir(&dir).expect("mkdir");
        let from = dir.join("clip.mp4");
        let to = dir.join("2024-03-15_143022.mp4");
        fs::write(&from, b"payload").expect("write clip");
        fs::set_permissions(&dir, fs::Permissions::from_mode(0o555)).expect("chmod");

        // Privileged users bypass directory permissions.
        let privileged = fs::write(dir.join("write-check"), b"").is_ok();
        let result = if privileged {
            None
        } else {
            Some(apply_candidate(&candidate(&from, &to)))
        };
        fs::set_permissions(&dir, fs::Permissions::from_mode(0o755)).expect("restore");

        let Some(result) = result else {
            return;
        };
        let err = result.expect_err("read-only directory");
        assert!(matches!(err, RenameError::PermissionDenied(_)), "{err:?}");
        assert_eq!(fs::read(&from).expect("read source"), b"payload");
        assert!(!to.exists());
    }
}
