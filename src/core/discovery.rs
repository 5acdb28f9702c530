// TabRescue - core/discovery.rs
//
// Locates the newest session file inside a browser profile directory.
//
// Browsers rotate their session files (Chromium keeps several timestamped
// SNSS files under Sessions/; Firefox keeps recovery.jsonlz4 alongside a
// previous.jsonlz4 fallback), so discovery walks the profile recursively,
// matches filenames against glob patterns, and picks the newest mtime.
//
// Per-file I/O errors are non-fatal and collected as warnings; only an
// invalid root is an error. The walk is bounded by depth and file count so
// a pathological profile (or a cache directory with millions of entries)
// cannot stall the export.

use crate::util::constants;
use crate::util::error::DiscoveryError;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

/// A session file selected for decoding.
#[derive(Debug, Clone)]
pub struct DiscoveredSession {
    /// Full path to the file.
    pub path: PathBuf,

    /// File size in bytes.
    pub size: u64,

    /// Last modification timestamp.
    pub modified: DateTime<Utc>,
}

/// Find the newest file under `root` whose name matches one of `patterns`.
///
/// Returns the best match (or `None` when nothing matched) together with
/// any non-fatal warnings gathered during the walk.
pub fn find_newest_session_file(
    root: &Path,
    patterns: &[&str],
) -> Result<(Option<DiscoveredSession>, Vec<String>), DiscoveryError> {
    if !root.exists() {
        return Err(DiscoveryError::RootNotFound {
            path: root.to_path_buf(),
        });
    }
    if !root.is_dir() {
        return Err(DiscoveryError::NotADirectory {
            path: root.to_path_buf(),
        });
    }

    let compiled: Vec<glob::Pattern> = patterns
        .iter()
        .map(|p| {
            glob::Pattern::new(p).map_err(|e| DiscoveryError::InvalidPattern {
                pattern: (*p).to_string(),
                source: e,
            })
        })
        .collect::<Result<_, _>>()?;

    let mut warnings: Vec<String> = Vec::new();
    let mut best: Option<(SystemTime, DiscoveredSession)> = None;
    let mut examined = 0usize;

    for entry in WalkDir::new(root)
        .max_depth(constants::DEFAULT_MAX_DEPTH)
        .follow_links(false)
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warnings.push(format!("Cannot access entry under '{}': {e}", root.display()));
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        examined += 1;
        if examined > constants::MAX_DISCOVERY_FILES {
            warnings.push(format!(
                "Stopped searching '{}' after {} files",
                root.display(),
                constants::MAX_DISCOVERY_FILES
            ));
            break;
        }

        let name = entry.file_name().to_string_lossy();
        if !compiled.iter().any(|p| p.matches(&name)) {
            continue;
        }

        let metadata = match entry.metadata() {
            Ok(m) => m,
            Err(e) => {
                warnings.push(format!(
                    "Cannot read metadata for '{}': {e}",
                    entry.path().display()
                ));
                continue;
            }
        };
        let modified = match metadata.modified() {
            Ok(m) => m,
            Err(e) => {
                warnings.push(format!(
                    "Cannot read mtime for '{}': {e}",
                    entry.path().display()
                ));
                continue;
            }
        };

        if best.as_ref().map_or(true, |(t, _)| modified > *t) {
            best = Some((
                modified,
                DiscoveredSession {
                    path: entry.into_path(),
                    size: metadata.len(),
                    modified: DateTime::<Utc>::from(modified),
                },
            ));
        }
    }

    if let Some((_, session)) = &best {
        tracing::debug!(
            file = %session.path.display(),
            size = session.size,
            "Session file selected"
        );
    }

    Ok((best.map(|(_, s)| s), warnings))
}
