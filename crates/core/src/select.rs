use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, Default)]
pub struct SelectOptions {
    pub root: PathBuf,
    pub extensions: Vec<String>,
    pub files: Vec<PathBuf>,
    pub recursive: bool,
    pub include_hidden: bool,
}

#[derive(Debug, Clone, Serialize, Default, PartialEq, Eq)]
pub struct SelectStats {
    pub scanned_files: usize,
    pub matched_files: usize,
    pub skipped_hidden: usize,
    pub explicit_files: usize,
}

/// Collects the files to process: everything under `root` whose extension
/// is in the filter, plus the explicitly named files. Sorted, no duplicates.
pub fn select_files(options: &SelectOptions) -> Result<(Vec<PathBuf>, SelectStats)> {
    let mut stats = SelectStats::default();
    let mut selected = BTreeSet::<PathBuf>::new();

    let filter = normalize_extensions(&options.extensions);
    if !filter.is_empty() {
        for path in scan_dir(&options.root, options.recursive)? {
            stats.scanned_files += 1;
            if is_hidden(&path) && !options.include_hidden {
                stats.skipped_hidden += 1;
                continue;
            }
            if has_extension(&path, &filter) {
                stats.matched_files += 1;
                selected.insert(path);
            }
        }
    }

    // Missing explicit files stay in the list and surface as per-file errors.
    for file in &options.files {
        stats.explicit_files += 1;
        selected.insert(file.clone());
    }

    Ok((selected.into_iter().collect(), stats))
}

fn scan_dir(root: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();

    if recursive {
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry =
                entry.with_context(|| format!("failed to walk directory: {}", root.display()))?;
            if entry.file_type().is_file() {
                out.push(entry.into_path());
            }
        }
    } else {
        for entry in fs::read_dir(root)
            .with_context(|| format!("failed to read directory: {}", root.display()))?
        {
            let entry =
                entry.with_context(|| format!("failed to read entry in: {}", root.display()))?;
            let path = entry.path();
            if path.is_file() {
                out.push(path);
            }
        }
    }

    Ok(out)
}

fn normalize_extensions(extensions: &[String]) -> Vec<String> {
    extensions
        .iter()
        .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect()
}

fn has_extension(path: &Path, filter: &[String]) -> bool {
    path.extension()
        .map(|ext| {
            let ext = ext.to_string_lossy();
            filter.iter().any(|wanted| ext.eq_ignore_ascii_case(wanted))
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}
