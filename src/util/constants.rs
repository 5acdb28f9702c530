// TabRescue - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "TabRescue";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "TabRescue";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Session file discovery
// =============================================================================

/// Filename globs matched against Chromium profile contents. Chrome and Edge
/// keep timestamped SNSS files in a `Sessions/` subdirectory.
pub const CHROMIUM_SESSION_PATTERNS: &[&str] = &["Session_*"];

/// Filename globs matched against Firefox profile contents. The recovery
/// snapshot lives under `sessionstore-backups/`.
pub const FIREFOX_RECOVERY_PATTERNS: &[&str] = &["recovery*.jsonlz4", "previous.jsonlz4"];

/// Maximum directory recursion depth when searching a profile for session files.
pub const DEFAULT_MAX_DEPTH: usize = 8;

/// Maximum number of candidate files examined in a single discovery walk.
/// Profile directories can contain hundreds of thousands of cache entries;
/// the walk stops rather than churning through all of them.
pub const MAX_DISCOVERY_FILES: usize = 100_000;

// =============================================================================
// Decoding limits
// =============================================================================

/// Maximum SNSS session file size accepted for decoding, in bytes.
/// Real session files are a few megabytes at most; anything beyond this is
/// either corrupt or not a session file.
pub const MAX_SNSS_FILE_SIZE: u64 = 256 * 1024 * 1024; // 256 MB

/// Maximum declared decompressed size accepted from a mozLz4 header, in bytes.
/// The header is attacker-controlled input; the decompression buffer is
/// allocated up front from this value, so it must be bounded.
pub const MAX_RECOVERY_DECOMPRESSED_BYTES: usize = 512 * 1024 * 1024; // 512 MB

// =============================================================================
// Process handling
// =============================================================================

/// How long to wait for a terminated browser process to exit before
/// proceeding with file reads (ms). Session files are flushed on exit.
pub const PROCESS_EXIT_WAIT_MS: u64 = 3_000;

/// Poll interval while waiting for terminated processes to disappear (ms).
pub const PROCESS_EXIT_POLL_MS: u64 = 200;

// =============================================================================
// Export / report
// =============================================================================

/// Default report file name (written into the output directory).
pub const DEFAULT_REPORT_FILE_NAME: &str = "browser_tabs.json";

/// Subdirectory of the output directory receiving verbatim profile copies.
pub const PROFILE_EXPORT_DIR_NAME: &str = "exported_profiles";

/// Default output directory name (created under the current directory when
/// no `--output-dir` is given and the config file does not set one).
pub const DEFAULT_OUTPUT_DIR_NAME: &str = "tabrescue_export";

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";
