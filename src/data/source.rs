use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};

/// A candidate source spreadsheet found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub modified: SystemTime,
}

/// Return the most recently modified regular file in `dir` whose name starts
/// with `prefix` and ends with `suffix`, or `None` if nothing matches.
///
/// Equal modification times fall back to the file name (descending), so the
/// pick does not depend on directory listing order.
pub fn latest_matching_file(dir: &Path, prefix: &str, suffix: &str) -> Result<Option<SourceFile>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("reading source directory {}", dir.display()))?;

    let mut candidates = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("listing {}", dir.display()))?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if !name.starts_with(prefix) || !name.ends_with(suffix) {
            continue;
        }
        // Follows symlinks, so a linked workbook counts with its target's mtime.
        let meta = match std::fs::metadata(entry.path()) {
            Ok(meta) => meta,
            Err(e) => {
                log::warn!("Skipping {name}: {e}");
                continue;
            }
        };
        if !meta.is_file() {
            continue;
        }
        let modified = meta
            .modified()
            .with_context(|| format!("reading modification time of {name}"))?;
        candidates.push(SourceFile {
            path: entry.path(),
            modified,
        });
    }

    candidates.sort_by(|a, b| {
        b.modified
            .cmp(&a.modified)
            .then_with(|| b.path.file_name().cmp(&a.path.file_name()))
    });
    Ok(candidates.into_iter().next())
}
