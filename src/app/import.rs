// TabRescue - app/import.rs
//
// The import pipeline: read a previously written report and relaunch each
// browser with the recorded URLs.
//
// Executable resolution order: config.toml override, then the report's
// hints for the current OS, then the built-in install locations, then PATH.
// The report hints matter when a report written on one machine is imported
// on another with a non-standard install.

use crate::core::model::Browser;
use crate::core::report::{self, BrowserSection};
use crate::platform::config::RawConfig;
use crate::platform::paths;
use crate::util::error::{LaunchError, Result, TabRescueError};
use std::path::PathBuf;
use std::process::Command;

/// Parameters for one import run.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Report written by a previous export.
    pub report_path: PathBuf,

    /// Browsers to relaunch, in order.
    pub browsers: Vec<Browser>,

    /// Resolve executables and report what would launch, without spawning.
    pub dry_run: bool,
}

/// Per-browser result of an import run.
#[derive(Debug)]
pub struct BrowserImport {
    pub browser: Browser,
    pub tabs: usize,
    pub executable: Option<PathBuf>,
    pub error: Option<TabRescueError>,
}

/// Run the import pipeline.
pub fn run_import(options: &ImportOptions, config: &RawConfig) -> Result<Vec<BrowserImport>> {
    let session_report = report::load_report(&options.report_path)?;
    let mut results = Vec::new();

    for &browser in &options.browsers {
        let Some(section) = session_report.section(browser) else {
            tracing::debug!(browser = %browser, "Not present in report");
            continue;
        };

        let urls: Vec<&str> = section
            .tabs
            .iter()
            .map(|t| t.url.as_str())
            .filter(|u| !u.is_empty())
            .collect();
        if urls.is_empty() {
            tracing::info!(browser = %browser, "No tabs recorded, skipping");
            continue;
        }

        let mut result = BrowserImport {
            browser,
            tabs: urls.len(),
            executable: None,
            error: None,
        };

        match resolve_executable(browser, section, config) {
            Some(executable) => {
                if options.dry_run {
                    tracing::info!(
                        browser = %browser,
                        executable = %executable.display(),
                        tabs = urls.len(),
                        "Dry run: would launch"
                    );
                } else if let Err(e) = launch(browser, &executable, &urls) {
                    result.error = Some(e.into());
                } else {
                    tracing::info!(
                        browser = %browser,
                        tabs = urls.len(),
                        "Browser launched with recovered tabs"
                    );
                }
                result.executable = Some(executable);
            }
            None => {
                let tried = candidate_paths(browser, section, config).len();
                result.error = Some(
                    LaunchError::ExecutableNotFound {
                        browser: browser.label(),
                        candidates_tried: tried,
                    }
                    .into(),
                );
            }
        }

        results.push(result);
    }

    Ok(results)
}

/// All absolute candidate paths, in resolution order.
fn candidate_paths(
    browser: Browser,
    section: &BrowserSection,
    config: &RawConfig,
) -> Vec<PathBuf> {
    let mut candidates: Vec<PathBuf> = Vec::new();
    candidates.extend_from_slice(config.browsers.executables(browser));
    if let Some(hints) = section.executables.get(paths::os_key()) {
        candidates.extend(hints.iter().cloned());
    }
    candidates.extend(paths::executable_candidates(browser));
    candidates
}

/// The first candidate that exists, falling back to a PATH search.
pub fn resolve_executable(
    browser: Browser,
    section: &BrowserSection,
    config: &RawConfig,
) -> Option<PathBuf> {
    candidate_paths(browser, section, config)
        .into_iter()
        .find(|c| c.is_file())
        .or_else(|| paths::find_in_path(paths::path_command_names(browser)))
}

fn launch(browser: Browser, executable: &PathBuf, urls: &[&str]) -> std::result::Result<(), LaunchError> {
    let mut command = Command::new(executable);
    if browser == Browser::Firefox {
        // Without this Firefox treats multiple URLs as one search query.
        command.arg("--new-tab");
    }
    command.args(urls);

    // Spawn detached; the browser outlives this process.
    command.spawn().map_err(|e| LaunchError::Spawn {
        executable: executable.clone(),
        source: e,
    })?;
    Ok(())
}
