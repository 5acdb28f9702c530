// TabRescue - core/report.rs
//
// The persisted session report: for every browser, the tabs that were open
// at export time plus enough surrounding context (profile path, profile
// copy location, executable hints) to re-open them on another machine.
//
// JSON is the canonical format; CSV export of the flat tab list is offered
// for spreadsheets.

use crate::core::model::{Browser, Tab};
use crate::util::error::ReportError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// One recovered open tab: the url/title pair of a tab's current entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenTab {
    pub url: String,
    pub title: String,
}

/// Per-browser slice of the report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSection {
    /// Whether the browser had running processes when the export started.
    pub running_before_export: bool,

    /// Tabs that were open (one per tab with an in-range current entry).
    pub tabs: Vec<OpenTab>,

    /// Profile directory the session was read from.
    pub profile_path: Option<PathBuf>,

    /// Where the profile was copied, when profile copying was enabled.
    pub export_path: Option<PathBuf>,

    /// Executable candidates keyed by OS name ("windows", "linux",
    /// "macos"), so a report written on one machine can be imported on
    /// another.
    pub executables: BTreeMap<String, Vec<PathBuf>>,
}

/// The whole report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    /// When the export ran.
    pub generated_at: DateTime<Utc>,

    /// Browser sections keyed by browser label.
    pub browsers: BTreeMap<String, BrowserSection>,
}

impl SessionReport {
    pub fn new() -> Self {
        Self {
            generated_at: Utc::now(),
            browsers: BTreeMap::new(),
        }
    }

    /// The section for `browser`, created empty on first access.
    pub fn section_mut(&mut self, browser: Browser) -> &mut BrowserSection {
        self.browsers.entry(browser.label().to_string()).or_default()
    }

    pub fn section(&self, browser: Browser) -> Option<&BrowserSection> {
        self.browsers.get(browser.label())
    }

    pub fn total_tabs(&self) -> usize {
        self.browsers.values().map(|b| b.tabs.len()).sum()
    }
}

impl Default for SessionReport {
    fn default() -> Self {
        Self::new()
    }
}

/// The open tab recorded for a decoded tab, if its current entry is defined.
///
/// Tabs whose index is out of range (or with no entries, or an empty url)
/// contribute nothing.
pub fn open_tab<E, D>(tab: &Tab<E, D>) -> Option<OpenTab> {
    let entry = tab.current_entry()?;
    if entry.url.is_empty() {
        return None;
    }
    Some(OpenTab {
        url: entry.url.clone(),
        title: entry.title.clone(),
    })
}

// =============================================================================
// Persistence
// =============================================================================

fn require_json_extension(path: &Path) -> Result<(), ReportError> {
    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if is_json {
        Ok(())
    } else {
        Err(ReportError::UnsupportedExtension {
            path: path.to_path_buf(),
        })
    }
}

/// Write the report as pretty-printed JSON.
pub fn save_report(report: &SessionReport, path: &Path) -> Result<(), ReportError> {
    require_json_extension(path)?;

    let file = File::create(path).map_err(|e| ReportError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, report).map_err(|e| ReportError::Json {
        path: path.to_path_buf(),
        source: e,
    })?;
    writer.flush().map_err(|e| ReportError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Read a report previously written by [`save_report`].
pub fn load_report(path: &Path) -> Result<SessionReport, ReportError> {
    require_json_extension(path)?;
    if !path.exists() {
        return Err(ReportError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let file = File::open(path).map_err(|e| ReportError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| ReportError::Json {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Export the flat tab list to CSV format.
///
/// Writes: browser, url, title. Returns the number of rows written.
pub fn export_tabs_csv<W: Write>(
    report: &SessionReport,
    writer: W,
    export_path: &Path,
) -> Result<usize, ReportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record(["browser", "url", "title"])
        .map_err(|e| ReportError::Csv {
            path: export_path.to_path_buf(),
            source: e,
        })?;

    let mut count = 0;
    for (browser, section) in &report.browsers {
        for tab in &section.tabs {
            csv_writer
                .write_record([browser.as_str(), tab.url.as_str(), tab.title.as_str()])
                .map_err(|e| ReportError::Csv {
                    path: export_path.to_path_buf(),
                    source: e,
                })?;
            count += 1;
        }
    }

    csv_writer.flush().map_err(|e| ReportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    })?;

    Ok(count)
}
