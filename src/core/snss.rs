// TabRescue - core/snss.rs
//
// Chromium session stream decoder. Chrome and Edge persist session state by
// appending fixed-framed binary commands to an SNSS file; replaying the
// commands of interest reconstructs each tab's navigation history.
//
// File layout (little-endian):
//   "SNSS"                    magic
//   u32 version               must be 3
//   repeated { u16 size, u8 type, payload[size - 1] }
//   stream ends at EOF or at a record with size 0
//
// The record size is authoritative: unknown command types are skipped by
// frame, and each payload is parsed through a sub-cursor bounded by the
// declared size so a bad field can never desynchronise the record loop.
// Decoding is strict — once a field read fails there is no safe way to
// resynchronise, so the whole decode aborts.

use crate::core::model::{
    ChromiumEntryDetails, ChromiumTab, ChromiumTabDetails, ChromiumWindow, NavigationEntry, Tab,
    Window,
};
use crate::core::reader::PayloadCursor;
use crate::util::constants;
use crate::util::error::{DecodeError, ShortRead};
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

/// Magic signature at the start of every SNSS file.
pub const SNSS_SIGNATURE: &[u8] = b"SNSS";

/// The only SNSS version with this navigation record layout.
pub const SUPPORTED_VERSION: u32 = 3;

/// Appends a navigation entry to a tab's history.
const COMMAND_UPDATE_TAB_NAVIGATION: u8 = 6;

/// Sets which history entry is currently active in a tab.
const COMMAND_SET_SELECTED_NAVIGATION_INDEX: u8 = 7;

/// Decode a Chromium SNSS session file into a single window.
///
/// The format carries no reliable window boundary, so every tab in the file
/// lands in one `Window`, in first-seen order.
pub fn decode_session_file(path: &Path) -> Result<ChromiumWindow, DecodeError> {
    let file = File::open(path).map_err(|e| DecodeError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let size = file
        .metadata()
        .map_err(|e| DecodeError::Io {
            path: path.to_path_buf(),
            source: e,
        })?
        .len();
    if size > constants::MAX_SNSS_FILE_SIZE {
        return Err(DecodeError::FileTooLarge {
            path: path.to_path_buf(),
            size,
            max_size: constants::MAX_SNSS_FILE_SIZE,
        });
    }
    if size == 0 {
        // Mapping a zero-length file fails on some platforms; an empty file
        // is simply a missing signature.
        return decode_session_bytes(&[], path);
    }

    // SAFETY: the file is opened read-only and the map is never mutated.
    // The browser is quiesced before its session files are read, so external
    // modification during the map's lifetime is not a supported scenario.
    let mmap = unsafe { memmap2::Mmap::map(&file) }.map_err(|e| DecodeError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    decode_session_bytes(&mmap, path)
}

/// Decode an in-memory SNSS byte stream. `path` is used for error context only.
pub fn decode_session_bytes(data: &[u8], path: &Path) -> Result<ChromiumWindow, DecodeError> {
    let mut stream = PayloadCursor::new(data);

    let magic = stream
        .read_bytes(SNSS_SIGNATURE.len())
        .unwrap_or(&data[..data.len().min(SNSS_SIGNATURE.len())]);
    if magic != SNSS_SIGNATURE {
        return Err(DecodeError::BadSignature {
            path: path.to_path_buf(),
            expected: SNSS_SIGNATURE,
            found: magic.to_vec(),
        });
    }

    let version = stream.read_u32().map_err(|e| DecodeError::Truncated {
        path: path.to_path_buf(),
        context: "version",
        source: e,
    })?;
    if version != SUPPORTED_VERSION {
        return Err(DecodeError::UnsupportedVersion {
            path: path.to_path_buf(),
            version,
        });
    }

    let mut tabs: Vec<ChromiumTab> = Vec::new();
    let mut slot_by_id: HashMap<u32, usize> = HashMap::new();

    loop {
        // Fewer than 2 bytes left, or an explicit size of 0, ends the
        // stream normally; both occur in files written by real browsers.
        let size = match stream.read_u16() {
            Ok(size) => size as usize,
            Err(_) => break,
        };
        if size == 0 {
            break;
        }

        // The declared size covers the type byte plus the payload. A size
        // pointing past EOF means the file was cut mid-record.
        let record = stream.read_bytes(size).map_err(|e| DecodeError::Truncated {
            path: path.to_path_buf(),
            context: "command record",
            source: e,
        })?;
        let command_type = record[0];
        let payload = &record[1..];

        match command_type {
            COMMAND_UPDATE_TAB_NAVIGATION => {
                let (tab_id, entry) = parse_navigation_update(payload, path)?;
                tab_slot(&mut tabs, &mut slot_by_id, tab_id).entries.push(entry);
            }
            COMMAND_SET_SELECTED_NAVIGATION_INDEX => {
                let mut fields = PayloadCursor::new(payload);
                let tab_id = fields.read_u32().map_err(|e| truncated(path, "tab id", e))?;
                let selected_index = fields
                    .read_u32()
                    .map_err(|e| truncated(path, "selected index", e))?;
                tab_slot(&mut tabs, &mut slot_by_id, tab_id).index = selected_index as usize;
            }
            other => {
                // Frame already consumed; nothing else to do.
                tracing::trace!(command_type = other, size, "Skipping session command");
            }
        }
    }

    tracing::debug!(
        file = %path.display(),
        tabs = tabs.len(),
        "SNSS session decoded"
    );

    Ok(Window { tabs })
}

/// Parse the payload of a navigation-update command.
///
/// Field order is fixed. The leading u32 duplicates the tab's selection
/// index and is discarded — the value set by the selected-index command is
/// authoritative. The page-state blob is opaque browser-internal data and
/// the u32 after the referrer is a known-broken field upstream; both are
/// consumed and dropped.
fn parse_navigation_update(
    payload: &[u8],
    path: &Path,
) -> Result<(u32, NavigationEntry<ChromiumEntryDetails>), DecodeError> {
    let mut fields = PayloadCursor::new(payload);

    let _duplicated_index = fields
        .read_u32()
        .map_err(|e| truncated(path, "duplicated selection index", e))?;
    let tab_id = fields.read_u32().map_err(|e| truncated(path, "tab id", e))?;
    let url = fields
        .read_length_prefixed_utf8()
        .map_err(|e| truncated(path, "url", e))?;
    let title = fields
        .read_length_prefixed_utf16()
        .map_err(|e| truncated(path, "title", e))?;
    let _page_state = fields
        .read_length_prefixed_bytes()
        .map_err(|e| truncated(path, "page state", e))?;
    let transition_type = fields
        .read_u32()
        .map_err(|e| truncated(path, "transition type", e))?;
    let has_post_data = fields
        .read_u32()
        .map_err(|e| truncated(path, "post data flag", e))?
        > 0;
    let referrer = fields
        .read_length_prefixed_utf8()
        .map_err(|e| truncated(path, "referrer", e))?;
    let _referrer_policy = fields
        .read_u32()
        .map_err(|e| truncated(path, "referrer policy", e))?;
    let original_request_url = fields
        .read_length_prefixed_utf8()
        .map_err(|e| truncated(path, "original request url", e))?;
    let is_overriding_user_agent = fields
        .read_u32()
        .map_err(|e| truncated(path, "user agent flag", e))?
        > 0;

    let entry = NavigationEntry {
        url,
        title,
        details: ChromiumEntryDetails {
            transition_type,
            has_post_data,
            referrer,
            original_request_url,
            is_overriding_user_agent,
        },
    };
    Ok((tab_id, entry))
}

/// Get the tab for `tab_id`, creating it in first-seen order if new.
fn tab_slot<'t>(
    tabs: &'t mut Vec<ChromiumTab>,
    slot_by_id: &mut HashMap<u32, usize>,
    tab_id: u32,
) -> &'t mut ChromiumTab {
    let slot = *slot_by_id.entry(tab_id).or_insert_with(|| {
        tabs.push(Tab {
            entries: Vec::new(),
            index: 0,
            details: ChromiumTabDetails { tab_id },
        });
        tabs.len() - 1
    });
    &mut tabs[slot]
}

fn truncated(path: &Path, context: &'static str, source: ShortRead) -> DecodeError {
    DecodeError::Truncated {
        path: path.to_path_buf(),
        context,
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn test_path() -> PathBuf {
        PathBuf::from("Session_13370000000000000")
    }

    fn utf8_field(s: &str) -> Vec<u8> {
        let mut out = (s.len() as u32).to_le_bytes().to_vec();
        out.extend_from_slice(s.as_bytes());
        out.resize(out.len() + (4 - s.len() % 4) % 4, 0);
        out
    }

    fn utf16_field(s: &str) -> Vec<u8> {
        let units: Vec<u16> = s.encode_utf16().collect();
        let mut out = (units.len() as u32).to_le_bytes().to_vec();
        for unit in &units {
            out.extend_from_slice(&unit.to_le_bytes());
        }
        out.resize(out.len() + (4 - (units.len() * 2) % 4) % 4, 0);
        out
    }

    fn bytes_field(content: &[u8]) -> Vec<u8> {
        let mut out = (content.len() as u32).to_le_bytes().to_vec();
        out.extend_from_slice(content);
        out.resize(out.len() + (4 - content.len() % 4) % 4, 0);
        out
    }

    fn record(command_type: u8, payload: &[u8]) -> Vec<u8> {
        let mut out = ((payload.len() + 1) as u16).to_le_bytes().to_vec();
        out.push(command_type);
        out.extend_from_slice(payload);
        out
    }

    fn navigation_payload(tab_id: u32, url: &str, title: &str) -> Vec<u8> {
        let mut payload = Vec::new();
        payload.extend_from_slice(&7u32.to_le_bytes()); // duplicated selection index
        payload.extend_from_slice(&tab_id.to_le_bytes());
        payload.extend_from_slice(&utf8_field(url));
        payload.extend_from_slice(&utf16_field(title));
        payload.extend_from_slice(&bytes_field(&[0xDE, 0xAD])); // page state blob
        payload.extend_from_slice(&1u32.to_le_bytes()); // transition type
        payload.extend_from_slice(&0u32.to_le_bytes()); // post data flag
        payload.extend_from_slice(&utf8_field("https://referrer.example"));
        payload.extend_from_slice(&0u32.to_le_bytes()); // referrer policy
        payload.extend_from_slice(&utf8_field("https://original.example"));
        payload.extend_from_slice(&0u32.to_le_bytes()); // user agent flag
        payload
    }

    fn selected_index_payload(tab_id: u32, index: u32) -> Vec<u8> {
        let mut payload = tab_id.to_le_bytes().to_vec();
        payload.extend_from_slice(&index.to_le_bytes());
        payload
    }

    fn session(records: &[Vec<u8>]) -> Vec<u8> {
        let mut out = SNSS_SIGNATURE.to_vec();
        out.extend_from_slice(&SUPPORTED_VERSION.to_le_bytes());
        for r in records {
            out.extend_from_slice(r);
        }
        out
    }

    #[test]
    fn decodes_single_tab_session() {
        let data = session(&[
            record(6, &navigation_payload(1, "https://a", "A")),
            record(7, &selected_index_payload(1, 0)),
        ]);

        let window = decode_session_bytes(&data, &test_path()).unwrap();
        assert_eq!(window.tabs.len(), 1);

        let tab = &window.tabs[0];
        assert_eq!(tab.details.tab_id, 1);
        assert_eq!(tab.index, 0);
        assert_eq!(tab.entries.len(), 1);
        assert_eq!(tab.entries[0].url, "https://a");
        assert_eq!(tab.entries[0].title, "A");

        let current = tab.current_entry().unwrap();
        assert_eq!(current.url, "https://a");
    }

    #[test]
    fn navigation_details_are_captured() {
        let data = session(&[record(6, &navigation_payload(9, "https://a", "A"))]);
        let window = decode_session_bytes(&data, &test_path()).unwrap();
        let entry = &window.tabs[0].entries[0];
        assert_eq!(entry.details.transition_type, 1);
        assert!(!entry.details.has_post_data);
        assert_eq!(entry.details.referrer, "https://referrer.example");
        assert_eq!(entry.details.original_request_url, "https://original.example");
        assert!(!entry.details.is_overriding_user_agent);
    }

    #[test]
    fn non_ascii_title_decodes_from_utf16() {
        let data = session(&[record(6, &navigation_payload(1, "https://a", "Привет"))]);
        let window = decode_session_bytes(&data, &test_path()).unwrap();
        assert_eq!(window.tabs[0].entries[0].title, "Привет");
    }

    #[test]
    fn wrong_signature_is_rejected() {
        let mut data = session(&[]);
        data[0] = b'X';
        let err = decode_session_bytes(&data, &test_path()).unwrap_err();
        assert!(matches!(err, DecodeError::BadSignature { .. }), "{err:?}");
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let mut data = SNSS_SIGNATURE.to_vec();
        data.extend_from_slice(&2u32.to_le_bytes());
        let err = decode_session_bytes(&data, &test_path()).unwrap_err();
        assert!(
            matches!(err, DecodeError::UnsupportedVersion { version: 2, .. }),
            "{err:?}"
        );
    }

    #[test]
    fn zero_size_record_ends_stream_despite_trailing_bytes() {
        let mut data = session(&[record(6, &navigation_payload(1, "https://a", "A"))]);
        data.extend_from_slice(&0u16.to_le_bytes());
        // Garbage after the terminator must never be looked at.
        data.extend_from_slice(&[0xFF; 32]);
        let window = decode_session_bytes(&data, &test_path()).unwrap();
        assert_eq!(window.tabs.len(), 1);
    }

    #[test]
    fn trailing_partial_size_ends_stream() {
        let mut data = session(&[record(6, &navigation_payload(1, "https://a", "A"))]);
        data.push(0x01); // lone byte where a u16 size would start
        let window = decode_session_bytes(&data, &test_path()).unwrap();
        assert_eq!(window.tabs.len(), 1);
    }

    #[test]
    fn unknown_commands_are_skipped_by_frame() {
        let data = session(&[
            record(42, &[0xAB; 13]),
            record(6, &navigation_payload(1, "https://a", "A")),
            record(0, &[]),
        ]);
        let window = decode_session_bytes(&data, &test_path()).unwrap();
        assert_eq!(window.tabs.len(), 1);
        assert_eq!(window.tabs[0].entries.len(), 1);
    }

    #[test]
    fn record_size_past_eof_is_truncation() {
        let mut data = session(&[]);
        data.extend_from_slice(&500u16.to_le_bytes());
        data.push(6);
        data.extend_from_slice(&[0; 10]); // far fewer than 499 payload bytes
        let err = decode_session_bytes(&data, &test_path()).unwrap_err();
        assert!(
            matches!(
                err,
                DecodeError::Truncated {
                    context: "command record",
                    ..
                }
            ),
            "{err:?}"
        );
    }

    #[test]
    fn short_navigation_payload_aborts_decode() {
        let full = navigation_payload(1, "https://a", "A");
        // Cut the payload mid-title; the record frame is consistent with the
        // shortened payload, so the failure is inside the field reads.
        let cut = &full[..16];
        let data = session(&[record(6, cut)]);
        let err = decode_session_bytes(&data, &test_path()).unwrap_err();
        assert!(matches!(err, DecodeError::Truncated { .. }), "{err:?}");
    }

    #[test]
    fn selection_before_navigation_creates_tab() {
        let data = session(&[
            record(7, &selected_index_payload(5, 1)),
            record(6, &navigation_payload(5, "https://a", "A")),
            record(6, &navigation_payload(5, "https://b", "B")),
        ]);
        let window = decode_session_bytes(&data, &test_path()).unwrap();
        assert_eq!(window.tabs.len(), 1);
        let tab = &window.tabs[0];
        assert_eq!(tab.index, 1);
        assert_eq!(tab.current_entry().unwrap().url, "https://b");
    }

    #[test]
    fn out_of_range_selection_is_kept_but_not_dereferenced() {
        let data = session(&[
            record(6, &navigation_payload(1, "https://a", "A")),
            record(7, &selected_index_payload(1, 9)),
        ]);
        let window = decode_session_bytes(&data, &test_path()).unwrap();
        let tab = &window.tabs[0];
        assert_eq!(tab.index, 9);
        assert!(tab.current_entry().is_none());
    }

    #[test]
    fn tabs_appear_in_first_seen_order() {
        let data = session(&[
            record(6, &navigation_payload(20, "https://first", "F")),
            record(6, &navigation_payload(3, "https://second", "S")),
            record(6, &navigation_payload(20, "https://first-again", "F2")),
        ]);
        let window = decode_session_bytes(&data, &test_path()).unwrap();
        let ids: Vec<u32> = window.tabs.iter().map(|t| t.details.tab_id).collect();
        assert_eq!(ids, vec![20, 3]);
        assert_eq!(window.tabs[0].entries.len(), 2);
    }

    #[test]
    fn extra_payload_bytes_after_known_fields_are_ignored() {
        let mut payload = navigation_payload(1, "https://a", "A");
        payload.extend_from_slice(&[0x77; 24]); // newer-version fields we do not read
        let data = session(&[record(6, &payload)]);
        let window = decode_session_bytes(&data, &test_path()).unwrap();
        assert_eq!(window.tabs[0].entries.len(), 1);
    }

    #[test]
    fn empty_stream_decodes_to_empty_window() {
        let data = session(&[]);
        let window = decode_session_bytes(&data, &test_path()).unwrap();
        assert!(window.tabs.is_empty());
    }
}
