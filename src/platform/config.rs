// TabRescue - platform/config.rs
//
// Platform-specific configuration/data directory resolution and config.toml
// loading with startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::core::model::Browser;
use crate::util::constants;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for TabRescue data and configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/tabrescue/ or %APPDATA%\TabRescue\)
    pub config_dir: PathBuf,

    /// Data directory for default export output.
    pub data_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            let data_dir = proj_dirs.data_dir().to_path_buf();

            tracing::debug!(
                config = %config_dir.display(),
                data = %data_dir.display(),
                "Platform paths resolved"
            );

            Self {
                config_dir,
                data_dir,
            }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            let fallback = PathBuf::from(".");
            Self {
                config_dir: fallback.clone(),
                data_dir: fallback,
            }
        }
    }

    /// Default location of config.toml.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility -- a newer
/// config file can be used with an older binary without crashing.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[logging]` section.
    pub logging: LoggingSection,
    /// `[export]` section.
    pub export: ExportSection,
    /// `[browsers]` section.
    pub browsers: BrowsersSection,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: trace, debug, info, warn, or error.
    pub level: Option<String>,
}

/// `[export]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ExportSection {
    /// Directory receiving the report and profile copies.
    pub output_dir: Option<PathBuf>,
    /// Report file name (must end in .json).
    pub report_name: Option<String>,
}

/// `[browsers]` config section: per-browser executable overrides tried
/// before the built-in candidates during import.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct BrowsersSection {
    pub chrome: BrowserOverride,
    pub edge: BrowserOverride,
    pub firefox: BrowserOverride,
}

/// Per-browser override block.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct BrowserOverride {
    /// Executable paths, in preference order.
    pub executables: Vec<PathBuf>,
}

impl BrowsersSection {
    /// Executable overrides for `browser`.
    pub fn executables(&self, browser: Browser) -> &[PathBuf] {
        match browser {
            Browser::Chrome => &self.chrome.executables,
            Browser::Edge => &self.edge.executables,
            Browser::Firefox => &self.firefox.executables,
        }
    }
}

const VALID_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Load and validate config.toml.
///
/// A missing file yields the defaults; a present-but-invalid file is an
/// error so typos surface instead of being silently ignored.
pub fn load_config(path: &Path) -> Result<RawConfig, crate::util::error::ConfigError> {
    use crate::util::error::ConfigError;

    if !path.exists() {
        tracing::debug!(path = %path.display(), "No config file, using defaults");
        return Ok(RawConfig::default());
    }

    let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let config: RawConfig = toml::from_str(&text).map_err(|e| ConfigError::TomlParse {
        path: path.to_path_buf(),
        source: e,
    })?;

    if let Some(level) = &config.logging.level {
        if !VALID_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::ValueOutOfRange {
                field: "logging.level".to_string(),
                value: level.clone(),
                expected: VALID_LEVELS.join(", "),
            });
        }
    }
    if let Some(name) = &config.export.report_name {
        if !name.to_ascii_lowercase().ends_with(".json") {
            return Err(ConfigError::ValueOutOfRange {
                field: "export.report_name".to_string(),
                value: name.clone(),
                expected: "a file name ending in .json".to_string(),
            });
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::error::ConfigError;

    fn write_config(text: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, text).unwrap();
        (dir, path)
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("config.toml")).unwrap();
        assert!(config.logging.level.is_none());
        assert!(config.export.output_dir.is_none());
    }

    #[test]
    fn sections_parse() {
        let (_dir, path) = write_config(
            r#"
            [logging]
            level = "debug"

            [export]
            output_dir = "/tmp/exports"
            report_name = "tabs.json"

            [browsers.firefox]
            executables = ["/opt/firefox/firefox"]
            "#,
        );
        let config = load_config(&path).unwrap();
        assert_eq!(config.logging.level.as_deref(), Some("debug"));
        assert_eq!(
            config.export.output_dir.as_deref(),
            Some(Path::new("/tmp/exports"))
        );
        assert_eq!(
            config.browsers.executables(Browser::Firefox),
            &[PathBuf::from("/opt/firefox/firefox")]
        );
        assert!(config.browsers.executables(Browser::Chrome).is_empty());
    }

    #[test]
    fn invalid_level_is_rejected() {
        let (_dir, path) = write_config("[logging]\nlevel = \"verbose\"\n");
        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ValueOutOfRange { .. }), "{err:?}");
    }

    #[test]
    fn non_json_report_name_is_rejected() {
        let (_dir, path) = write_config("[export]\nreport_name = \"tabs.txt\"\n");
        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ValueOutOfRange { .. }), "{err:?}");
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let (_dir, path) = write_config("[future]\nshiny = true\n");
        assert!(load_config(&path).is_ok());
    }
}
