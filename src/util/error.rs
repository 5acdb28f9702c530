// TabRescue - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// No string-based error propagation.
// All errors preserve the causal chain for diagnostic logging.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all TabRescue operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum TabRescueError {
    /// Session file decoding failed.
    Decode(DecodeError),

    /// Session file discovery failed.
    Discovery(DiscoveryError),

    /// Report reading or writing failed.
    Report(ReportError),

    /// Configuration loading or validation failed.
    Config(ConfigError),

    /// Browser launch failed.
    Launch(LaunchError),

    /// I/O error with path context.
    Io {
        path: PathBuf,
        operation: &'static str,
        source: io::Error,
    },
}

impl fmt::Display for TabRescueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode(e) => write!(f, "Decode error: {e}"),
            Self::Discovery(e) => write!(f, "Discovery error: {e}"),
            Self::Report(e) => write!(f, "Report error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::Launch(e) => write!(f, "Launch error: {e}"),
            Self::Io {
                path,
                operation,
                source,
            } => write!(
                f,
                "I/O error during {operation} on '{}': {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for TabRescueError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Decode(e) => Some(e),
            Self::Discovery(e) => Some(e),
            Self::Report(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Launch(e) => Some(e),
            Self::Io { source, .. } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Short reads (payload cursor)
// ---------------------------------------------------------------------------

/// A primitive read ran past the end of its buffer.
///
/// Produced by the payload cursor; decoders wrap it with file context.
/// `offset` is the cursor position at the time of the read, `needed` the
/// number of bytes the read required, `available` how many remained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShortRead {
    pub offset: usize,
    pub needed: usize,
    pub available: usize,
}

impl fmt::Display for ShortRead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "need {} bytes at offset {} but only {} remain",
            self.needed, self.offset, self.available
        )
    }
}

impl std::error::Error for ShortRead {}

// ---------------------------------------------------------------------------
// Decode errors
// ---------------------------------------------------------------------------

/// Errors related to session file decoding.
#[derive(Debug)]
pub enum DecodeError {
    /// The file does not start with the expected magic signature.
    BadSignature {
        path: PathBuf,
        expected: &'static [u8],
        found: Vec<u8>,
    },

    /// The SNSS version field is not a supported value.
    UnsupportedVersion { path: PathBuf, version: u32 },

    /// The file exceeds the maximum size accepted for decoding.
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    /// The mozLz4 header declares a decompressed size beyond the allowed cap.
    DecompressedTooLarge {
        path: PathBuf,
        declared: usize,
        max: usize,
    },

    /// LZ4 block decompression failed.
    Decompression {
        path: PathBuf,
        source: lz4_flex::block::DecompressError,
    },

    /// The decompressed payload is not valid JSON (or does not match the
    /// session snapshot shape).
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// A primitive read inside the command stream or a record payload ran
    /// past the end of its buffer. `context` names the field or framing
    /// element being read at the time.
    Truncated {
        path: PathBuf,
        context: &'static str,
        source: ShortRead,
    },

    /// I/O error while opening or mapping the session file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadSignature {
                path,
                expected,
                found,
            } => write!(
                f,
                "'{}': bad signature: expected {:?}, found {:?}",
                path.display(),
                expected.escape_ascii().to_string(),
                found.escape_ascii().to_string()
            ),
            Self::UnsupportedVersion { path, version } => {
                write!(
                    f,
                    "'{}': unsupported SNSS version {version} (only version 3 is supported)",
                    path.display()
                )
            }
            Self::FileTooLarge {
                path,
                size,
                max_size,
            } => write!(
                f,
                "'{}' is {size} bytes, exceeds maximum of {max_size} bytes",
                path.display()
            ),
            Self::DecompressedTooLarge {
                path,
                declared,
                max,
            } => write!(
                f,
                "'{}': declared decompressed size {declared} exceeds maximum of {max} bytes",
                path.display()
            ),
            Self::Decompression { path, source } => {
                write!(f, "'{}': LZ4 decompression failed: {source}", path.display())
            }
            Self::Json { path, source } => {
                write!(f, "'{}': malformed session JSON: {source}", path.display())
            }
            Self::Truncated {
                path,
                context,
                source,
            } => write!(
                f,
                "'{}': truncated while reading {context}: {source}",
                path.display()
            ),
            Self::Io { path, source } => {
                write!(f, "'{}': I/O error: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Decompression { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::Truncated { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<DecodeError> for TabRescueError {
    fn from(e: DecodeError) -> Self {
        Self::Decode(e)
    }
}

// ---------------------------------------------------------------------------
// Discovery errors
// ---------------------------------------------------------------------------

/// Errors related to session file discovery.
#[derive(Debug)]
pub enum DiscoveryError {
    /// The profile root does not exist or is not accessible.
    RootNotFound { path: PathBuf },

    /// The profile root is not a directory.
    NotADirectory { path: PathBuf },

    /// A filename glob pattern is invalid (programming error in the
    /// built-in pattern tables, surfaced rather than panicking).
    InvalidPattern {
        pattern: String,
        source: glob::PatternError,
    },
}

impl fmt::Display for DiscoveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RootNotFound { path } => {
                write!(f, "Profile path '{}' does not exist", path.display())
            }
            Self::NotADirectory { path } => {
                write!(f, "Profile path '{}' is not a directory", path.display())
            }
            Self::InvalidPattern { pattern, source } => {
                write!(f, "Invalid filename pattern '{pattern}': {source}")
            }
        }
    }
}

impl std::error::Error for DiscoveryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidPattern { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<DiscoveryError> for TabRescueError {
    fn from(e: DiscoveryError) -> Self {
        Self::Discovery(e)
    }
}

// ---------------------------------------------------------------------------
// Report errors
// ---------------------------------------------------------------------------

/// Errors related to reading and writing the session report.
#[derive(Debug)]
pub enum ReportError {
    /// The report path does not end in `.json`.
    UnsupportedExtension { path: PathBuf },

    /// The report file does not exist.
    NotFound { path: PathBuf },

    /// JSON serialisation or deserialisation error.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// CSV serialisation error.
    Csv { path: PathBuf, source: csv::Error },

    /// I/O error reading or writing the report.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedExtension { path } => {
                write!(f, "'{}' is not a .json file", path.display())
            }
            Self::NotFound { path } => {
                write!(f, "Report '{}' does not exist", path.display())
            }
            Self::Json { path, source } => {
                write!(f, "Report JSON error '{}': {source}", path.display())
            }
            Self::Csv { path, source } => {
                write!(f, "CSV export error '{}': {source}", path.display())
            }
            Self::Io { path, source } => {
                write!(f, "Report I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ReportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json { source, .. } => Some(source),
            Self::Csv { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ReportError> for TabRescueError {
    fn from(e: ReportError) -> Self {
        Self::Report(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A config value is out of the allowed range.
    ValueOutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is out of range. Expected: {expected}"
            ),
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for TabRescueError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Launch errors
// ---------------------------------------------------------------------------

/// Errors related to relaunching a browser with recovered tabs.
#[derive(Debug)]
pub enum LaunchError {
    /// No usable executable was found for the browser.
    ExecutableNotFound {
        browser: &'static str,
        candidates_tried: usize,
    },

    /// Spawning the browser process failed.
    Spawn {
        executable: PathBuf,
        source: io::Error,
    },
}

impl fmt::Display for LaunchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExecutableNotFound {
                browser,
                candidates_tried,
            } => write!(
                f,
                "No {browser} executable found ({candidates_tried} candidate paths tried, plus PATH)"
            ),
            Self::Spawn { executable, source } => {
                write!(f, "Failed to launch '{}': {source}", executable.display())
            }
        }
    }
}

impl std::error::Error for LaunchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Spawn { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<LaunchError> for TabRescueError {
    fn from(e: LaunchError) -> Self {
        Self::Launch(e)
    }
}

/// Convenience type alias for TabRescue results.
pub type Result<T> = std::result::Result<T, TabRescueError>;
