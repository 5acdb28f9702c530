// TabRescue - app/export.rs
//
// The export pipeline. For each selected browser, in order:
//   1. note whether the browser is running, and optionally terminate it
//      (session files are flushed on exit and rewritten while running);
//   2. resolve the profile root under the chosen home directory;
//   3. find the newest session file and decode it;
//   4. record each tab's current entry in the report;
//   5. copy the profile tree verbatim into the export directory.
//
// A failure in one browser is recorded in its outcome and logged; the other
// browsers still run. Browsers are processed sequentially.

use crate::core::discovery::find_newest_session_file;
use crate::core::model::{Browser, SessionFormat};
use crate::core::report::{self, open_tab, BrowserSection, OpenTab, SessionReport};
use crate::core::{mozlz4, snss};
use crate::platform::{fs as platform_fs, paths, process};
use crate::util::constants;
use crate::util::error::{Result, TabRescueError};
use std::path::PathBuf;

/// Parameters for one export run.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Home directory whose browser profiles are read.
    pub home: PathBuf,

    /// Directory receiving profile copies (and the report by default).
    pub output_dir: PathBuf,

    /// Where the JSON report is written.
    pub report_path: PathBuf,

    /// Browsers to process, in order.
    pub browsers: Vec<Browser>,

    /// Terminate running browsers before reading their files.
    pub kill_running: bool,

    /// Copy the profile trees into the output directory.
    pub copy_profiles: bool,
}

/// Per-browser result of an export run.
#[derive(Debug)]
pub struct BrowserExport {
    pub browser: Browser,
    pub tabs_recovered: usize,
    pub files_copied: usize,
    pub warnings: Vec<String>,
    pub error: Option<TabRescueError>,
}

/// Result of a whole export run.
#[derive(Debug)]
pub struct ExportOutcome {
    pub report_path: PathBuf,
    pub browsers: Vec<BrowserExport>,
}

impl ExportOutcome {
    pub fn total_tabs(&self) -> usize {
        self.browsers.iter().map(|b| b.tabs_recovered).sum()
    }

    pub fn had_errors(&self) -> bool {
        self.browsers.iter().any(|b| b.error.is_some())
    }
}

/// Run the export pipeline and write the report.
pub fn run_export(options: &ExportOptions) -> Result<ExportOutcome> {
    std::fs::create_dir_all(&options.output_dir).map_err(|e| TabRescueError::Io {
        path: options.output_dir.clone(),
        operation: "create output directory",
        source: e,
    })?;

    let mut session_report = SessionReport::new();
    let mut results = Vec::with_capacity(options.browsers.len());

    for &browser in &options.browsers {
        tracing::info!(browser = %browser, "Exporting browser session");
        let (section, outcome) = export_browser(browser, options);
        for warning in &outcome.warnings {
            tracing::warn!(browser = %browser, "{warning}");
        }
        if let Some(error) = &outcome.error {
            tracing::error!(browser = %browser, error = %error, "Browser export failed");
        }
        session_report
            .browsers
            .insert(browser.label().to_string(), section);
        results.push(outcome);
    }

    report::save_report(&session_report, &options.report_path)?;
    tracing::info!(
        report = %options.report_path.display(),
        tabs = session_report.total_tabs(),
        "Report written"
    );

    Ok(ExportOutcome {
        report_path: options.report_path.clone(),
        browsers: results,
    })
}

/// Export one browser. Never panics or propagates: anything fatal for this
/// browser lands in `BrowserExport::error`.
fn export_browser(browser: Browser, options: &ExportOptions) -> (BrowserSection, BrowserExport) {
    let mut section = BrowserSection {
        executables: paths::executable_hints(browser),
        ..BrowserSection::default()
    };
    let mut outcome = BrowserExport {
        browser,
        tabs_recovered: 0,
        files_copied: 0,
        warnings: Vec::new(),
        error: None,
    };

    let running = process::is_running(browser);
    section.running_before_export = running;
    if running {
        if options.kill_running {
            process::terminate_and_wait(browser);
        } else {
            outcome.warnings.push(format!(
                "{browser} is running; its session files may be mid-write"
            ));
        }
    }

    let Some(profile_root) = paths::resolve_profile_root(browser, &options.home) else {
        outcome.warnings.push(format!(
            "No {browser} profile found under '{}'",
            options.home.display()
        ));
        return (section, outcome);
    };
    section.profile_path = Some(profile_root.clone());

    match collect_open_tabs(browser, &profile_root) {
        Ok((tabs, mut warnings)) => {
            outcome.warnings.append(&mut warnings);
            outcome.tabs_recovered = tabs.len();
            section.tabs = tabs;
        }
        Err(e) => {
            outcome.error = Some(e);
            return (section, outcome);
        }
    }

    if options.copy_profiles {
        let dest = options
            .output_dir
            .join(constants::PROFILE_EXPORT_DIR_NAME)
            .join(browser.label());
        match platform_fs::copy_profile_tree(&profile_root, &dest) {
            Ok((copied, mut warnings)) => {
                outcome.files_copied = copied;
                outcome.warnings.append(&mut warnings);
                section.export_path = Some(dest);
            }
            Err(e) => outcome.error = Some(e),
        }
    }

    (section, outcome)
}

/// Find and decode the newest session file in `profile_root`, returning the
/// open tab of every decoded tab whose current entry is defined.
pub fn collect_open_tabs(
    browser: Browser,
    profile_root: &std::path::Path,
) -> Result<(Vec<OpenTab>, Vec<String>)> {
    let patterns = match browser.session_format() {
        SessionFormat::Snss => constants::CHROMIUM_SESSION_PATTERNS,
        SessionFormat::MozLz4 => constants::FIREFOX_RECOVERY_PATTERNS,
    };

    let (found, mut warnings) = find_newest_session_file(profile_root, patterns)?;
    let Some(session) = found else {
        warnings.push(format!(
            "No session file found under '{}'",
            profile_root.display()
        ));
        return Ok((Vec::new(), warnings));
    };

    let tabs = match browser.session_format() {
        SessionFormat::Snss => {
            let window = snss::decode_session_file(&session.path)?;
            window.tabs.iter().filter_map(open_tab).collect()
        }
        SessionFormat::MozLz4 => {
            let windows = mozlz4::decode_recovery_file(&session.path)?;
            windows
                .iter()
                .flat_map(|w| w.tabs.iter())
                .filter_map(open_tab)
                .collect()
        }
    };

    Ok((tabs, warnings))
}
