// TabRescue - core/mozlz4.rs
//
// Firefox recovery snapshot decoder. Firefox persists its session as a
// mozLz4 file: an 8-byte magic, a u32 little-endian decompressed size, and
// a raw (frameless) LZ4 block containing UTF-8 JSON.
//
// Decompressed layout:
//   { "windows": [ { "tabs": [ { "entries": [ {url, title, referrer?,
//     lastAccessed?} ], "index": 1-based, "pinned"?, "hidden"? } ] } ] }
//
// The walk is schema-tolerant: absent optional keys take defaults and never
// abort decoding. Only the envelope is strict — magic, decompression, and
// JSON syntax.

use crate::core::model::{
    FirefoxEntryDetails, FirefoxTab, FirefoxTabDetails, FirefoxWindow, NavigationEntry, Tab,
    Window,
};
use crate::core::reader::PayloadCursor;
use crate::util::constants;
use crate::util::error::DecodeError;
use serde::Deserialize;
use std::path::Path;

/// Magic signature at the start of every mozLz4 file.
pub const MOZLZ4_SIGNATURE: &[u8] = b"mozLz40\0";

/// Decode a Firefox recovery file into its windows.
pub fn decode_recovery_file(path: &Path) -> Result<Vec<FirefoxWindow>, DecodeError> {
    let data = std::fs::read(path).map_err(|e| DecodeError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    decode_recovery_bytes(&data, path)
}

/// Decode in-memory mozLz4 bytes. `path` is used for error context only.
pub fn decode_recovery_bytes(data: &[u8], path: &Path) -> Result<Vec<FirefoxWindow>, DecodeError> {
    let mut stream = PayloadCursor::new(data);

    let magic = stream
        .read_bytes(MOZLZ4_SIGNATURE.len())
        .unwrap_or(&data[..data.len().min(MOZLZ4_SIGNATURE.len())]);
    if magic != MOZLZ4_SIGNATURE {
        return Err(DecodeError::BadSignature {
            path: path.to_path_buf(),
            expected: MOZLZ4_SIGNATURE,
            found: magic.to_vec(),
        });
    }

    // The decompression buffer is allocated from this header value, so it
    // must be bounded before any allocation happens.
    let declared = stream.read_u32().map_err(|e| DecodeError::Truncated {
        path: path.to_path_buf(),
        context: "decompressed size",
        source: e,
    })? as usize;
    if declared > constants::MAX_RECOVERY_DECOMPRESSED_BYTES {
        return Err(DecodeError::DecompressedTooLarge {
            path: path.to_path_buf(),
            declared,
            max: constants::MAX_RECOVERY_DECOMPRESSED_BYTES,
        });
    }

    let block = &data[MOZLZ4_SIGNATURE.len() + 4..];
    let json = lz4_flex::block::decompress(block, declared).map_err(|e| {
        DecodeError::Decompression {
            path: path.to_path_buf(),
            source: e,
        }
    })?;

    let snapshot: RecoverySnapshot =
        serde_json::from_slice(&json).map_err(|e| DecodeError::Json {
            path: path.to_path_buf(),
            source: e,
        })?;

    tracing::debug!(
        file = %path.display(),
        windows = snapshot.windows.len(),
        "Recovery snapshot decoded"
    );

    Ok(snapshot.windows.into_iter().map(window_from_json).collect())
}

// =============================================================================
// JSON shapes
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RecoverySnapshot {
    windows: Vec<RecoveryWindow>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RecoveryWindow {
    tabs: Vec<RecoveryTab>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RecoveryTab {
    entries: Vec<RecoveryEntry>,
    /// 1-based index of the active entry.
    index: Option<u64>,
    pinned: bool,
    hidden: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RecoveryEntry {
    url: String,
    title: String,
    referrer: Option<String>,
    #[serde(rename = "lastAccessed")]
    last_accessed: Option<i64>,
}

fn window_from_json(window: RecoveryWindow) -> FirefoxWindow {
    Window {
        tabs: window.tabs.into_iter().map(tab_from_json).collect(),
    }
}

fn tab_from_json(tab: RecoveryTab) -> FirefoxTab {
    Tab {
        // The file's index is 1-based with a default of 1; an occasional
        // malformed 0 saturates instead of wrapping.
        index: tab.index.unwrap_or(1).saturating_sub(1) as usize,
        entries: tab
            .entries
            .into_iter()
            .map(|entry| NavigationEntry {
                url: entry.url,
                title: entry.title,
                details: FirefoxEntryDetails {
                    referrer: entry.referrer,
                    last_accessed: entry.last_accessed,
                },
            })
            .collect(),
        details: FirefoxTabDetails {
            pinned: tab.pinned,
            hidden: tab.hidden,
        },
    }
}
