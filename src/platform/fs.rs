// TabRescue - platform/fs.rs
//
// Verbatim profile copying. The profile tree is snapshotted byte-for-byte
// into the export directory so nothing ever needs re-encoding into the
// browsers' native formats.
//
// The copy is best-effort: locked or unreadable files and symlinks are
// skipped with a warning, never an abort — a profile with one unreadable
// cache file should still yield a usable snapshot.

use crate::util::error::{Result, TabRescueError};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Recursively copy `src` into `dest`, preserving the relative layout.
///
/// Returns the number of files copied and any per-entry warnings. Fails
/// only when the destination root cannot be created.
pub fn copy_profile_tree(src: &Path, dest: &Path) -> Result<(usize, Vec<String>)> {
    fs::create_dir_all(dest).map_err(|e| TabRescueError::Io {
        path: dest.to_path_buf(),
        operation: "create export directory",
        source: e,
    })?;

    let mut copied = 0usize;
    let mut warnings: Vec<String> = Vec::new();

    for entry in WalkDir::new(src).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warnings.push(format!("Cannot access entry under '{}': {e}", src.display()));
                continue;
            }
        };

        let relative = match entry.path().strip_prefix(src) {
            Ok(rel) => rel,
            Err(_) => continue, // the root itself
        };
        if relative.as_os_str().is_empty() {
            continue;
        }
        let target = dest.join(relative);

        if entry.file_type().is_symlink() {
            tracing::debug!(path = %entry.path().display(), "Skipping symlink");
            continue;
        }

        if entry.file_type().is_dir() {
            if let Err(e) = fs::create_dir_all(&target) {
                warnings.push(format!("Cannot create '{}': {e}", target.display()));
            }
            continue;
        }

        match fs::copy(entry.path(), &target) {
            Ok(_) => copied += 1,
            Err(e) => {
                warnings.push(format!("Cannot copy '{}': {e}", entry.path().display()));
            }
        }
    }

    tracing::debug!(
        src = %src.display(),
        dest = %dest.display(),
        copied,
        skipped = warnings.len(),
        "Profile tree copied"
    );

    Ok((copied, warnings))
}
