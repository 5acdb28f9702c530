// TabRescue - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. Configuration loading
// 3. Logging initialisation (debug mode support)
// 4. Subcommand dispatch and outcome printing

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use tabrescue::app::{export, import};
use tabrescue::core::model::Browser;
use tabrescue::core::report;
use tabrescue::platform::config::{load_config, PlatformPaths, RawConfig};
use tabrescue::platform::paths;
use tabrescue::util::constants;
use tabrescue::util::error::{Result, TabRescueError};
use tabrescue::util::logging;

/// TabRescue - recover open tabs from browser session files.
///
/// Reads the session state Chrome, Edge and Firefox keep on disk, records
/// the open tabs in a portable JSON report, and can relaunch the browsers
/// with those tabs on another machine.
#[derive(Parser, Debug)]
#[command(name = "tabrescue", version, about)]
struct Cli {
    /// Path to config.toml (defaults to the platform config directory).
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Recover open tabs, write the report, and copy profiles.
    Export {
        /// Browsers to process (repeatable; default: all).
        #[arg(short = 'b', long = "browser")]
        browsers: Vec<Browser>,

        /// Home directory to read profiles from (default: current user).
        #[arg(long = "home")]
        home: Option<PathBuf>,

        /// Output directory for the report and profile copies.
        #[arg(short = 'o', long = "output-dir")]
        output_dir: Option<PathBuf>,

        /// Report file path (default: <output-dir>/browser_tabs.json).
        #[arg(long = "report")]
        report: Option<PathBuf>,

        /// Do not terminate running browsers first.
        #[arg(long = "no-kill")]
        no_kill: bool,

        /// Do not copy profile directories.
        #[arg(long = "no-copy")]
        no_copy: bool,

        /// Also write the flat tab list as CSV next to the report.
        #[arg(long = "csv")]
        csv: bool,
    },

    /// Relaunch browsers with the tabs from a report.
    Import {
        /// Browsers to relaunch (repeatable; default: all).
        #[arg(short = 'b', long = "browser")]
        browsers: Vec<Browser>,

        /// Report file path.
        #[arg(long = "report")]
        report: Option<PathBuf>,

        /// Resolve executables and print what would launch, without launching.
        #[arg(long = "dry-run")]
        dry_run: bool,
    },

    /// Decode and print recovered tabs without writing anything.
    List {
        /// Browsers to inspect (repeatable; default: all).
        #[arg(short = 'b', long = "browser")]
        browsers: Vec<Browser>,

        /// Home directory to read profiles from (default: current user).
        #[arg(long = "home")]
        home: Option<PathBuf>,

        /// Print as JSON instead of text.
        #[arg(long = "json")]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let platform_paths = PlatformPaths::resolve();
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| platform_paths.config_file());
    let config = match load_config(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    logging::init(cli.debug, config.logging.level.as_deref());
    tracing::info!(
        version = constants::APP_VERSION,
        debug = cli.debug,
        "TabRescue starting"
    );

    match run(cli.command, &config) {
        Ok(clean) => {
            if clean {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Dispatch one subcommand. Returns whether it completed without
/// per-browser errors.
fn run(command: CliCommand, config: &RawConfig) -> Result<bool> {
    match command {
        CliCommand::Export {
            browsers,
            home,
            output_dir,
            report,
            no_kill,
            no_copy,
            csv,
        } => {
            let home = resolve_home(home)?;
            let output_dir = output_dir
                .or_else(|| config.export.output_dir.clone())
                .unwrap_or_else(|| PathBuf::from(constants::DEFAULT_OUTPUT_DIR_NAME));
            let report_name = config
                .export
                .report_name
                .clone()
                .unwrap_or_else(|| constants::DEFAULT_REPORT_FILE_NAME.to_string());
            let report_path = report.unwrap_or_else(|| output_dir.join(report_name));

            let options = export::ExportOptions {
                home,
                output_dir,
                report_path,
                browsers: selected_browsers(browsers),
                kill_running: !no_kill,
                copy_profiles: !no_copy,
            };
            let outcome = export::run_export(&options)?;

            for result in &outcome.browsers {
                match &result.error {
                    Some(error) => println!("{}: FAILED ({error})", result.browser),
                    None => println!(
                        "{}: {} tabs recovered, {} profile files copied",
                        result.browser, result.tabs_recovered, result.files_copied
                    ),
                }
            }
            println!(
                "Report written to '{}' ({} tabs)",
                outcome.report_path.display(),
                outcome.total_tabs()
            );

            if csv {
                let csv_path = outcome.report_path.with_extension("csv");
                write_csv(&outcome.report_path, &csv_path)?;
                println!("CSV written to '{}'", csv_path.display());
            }

            Ok(!outcome.had_errors())
        }

        CliCommand::Import {
            browsers,
            report,
            dry_run,
        } => {
            let report_path = report.unwrap_or_else(|| {
                PathBuf::from(constants::DEFAULT_OUTPUT_DIR_NAME)
                    .join(constants::DEFAULT_REPORT_FILE_NAME)
            });
            let options = import::ImportOptions {
                report_path,
                browsers: selected_browsers(browsers),
                dry_run,
            };
            let results = import::run_import(&options, config)?;

            let mut clean = true;
            for result in &results {
                match (&result.error, &result.executable) {
                    (Some(error), _) => {
                        clean = false;
                        println!("{}: FAILED ({error})", result.browser);
                    }
                    (None, Some(executable)) => println!(
                        "{}: {} {} tabs via '{}'",
                        result.browser,
                        if dry_run { "would open" } else { "opened" },
                        result.tabs,
                        executable.display()
                    ),
                    (None, None) => {}
                }
            }
            if results.is_empty() {
                println!("Nothing to import");
            }
            Ok(clean)
        }

        CliCommand::List {
            browsers,
            home,
            json,
        } => {
            let home = resolve_home(home)?;
            let mut clean = true;
            let mut listing: std::collections::BTreeMap<String, Vec<report::OpenTab>> =
                std::collections::BTreeMap::new();

            for browser in selected_browsers(browsers) {
                let Some(profile_root) = paths::resolve_profile_root(browser, &home) else {
                    tracing::warn!(browser = %browser, "No profile found");
                    continue;
                };
                match export::collect_open_tabs(browser, &profile_root) {
                    Ok((tabs, warnings)) => {
                        for warning in warnings {
                            tracing::warn!(browser = %browser, "{warning}");
                        }
                        listing.insert(browser.label().to_string(), tabs);
                    }
                    Err(e) => {
                        clean = false;
                        tracing::error!(browser = %browser, error = %e, "Decode failed");
                        eprintln!("{browser}: {e}");
                    }
                }
            }

            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&listing).unwrap_or_else(|_| "{}".to_string())
                );
            } else {
                for (browser, tabs) in &listing {
                    println!("{browser} ({} tabs):", tabs.len());
                    for tab in tabs {
                        if tab.title.is_empty() {
                            println!("  {}", tab.url);
                        } else {
                            println!("  {} - {}", tab.title, tab.url);
                        }
                    }
                }
            }
            Ok(clean)
        }
    }
}

/// Explicit selection, deduplicated in first-given order, or all browsers.
fn selected_browsers(selected: Vec<Browser>) -> Vec<Browser> {
    if selected.is_empty() {
        return Browser::all().to_vec();
    }
    let mut unique = Vec::new();
    for browser in selected {
        if !unique.contains(&browser) {
            unique.push(browser);
        }
    }
    unique
}

fn resolve_home(home: Option<PathBuf>) -> Result<PathBuf> {
    home.or_else(paths::default_home).ok_or_else(|| {
        TabRescueError::Io {
            path: PathBuf::from("~"),
            operation: "resolve home directory",
            source: std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no home directory; pass --home",
            ),
        }
    })
}

fn write_csv(report_path: &std::path::Path, csv_path: &std::path::Path) -> Result<()> {
    let session_report = report::load_report(report_path)?;
    let file = std::fs::File::create(csv_path).map_err(|e| TabRescueError::Io {
        path: csv_path.to_path_buf(),
        operation: "create CSV export",
        source: e,
    })?;
    report::export_tabs_csv(&session_report, file, csv_path)?;
    Ok(())
}
