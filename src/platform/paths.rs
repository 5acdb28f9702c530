// TabRescue - platform/paths.rs
//
// Where each browser keeps its profile data and its executable, per OS.
// Profile roots are resolved relative to a home directory rather than the
// current environment so a mounted disk image (or another user's home) can
// be exported with --home.

use crate::core::model::Browser;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Key used for the current OS in the report's executable hint map.
pub fn os_key() -> &'static str {
    if cfg!(target_os = "windows") {
        "windows"
    } else if cfg!(target_os = "macos") {
        "macos"
    } else {
        "linux"
    }
}

/// The current user's home directory.
pub fn default_home() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf())
}

/// Candidate profile roots for `browser` under `home`, in preference order.
///
/// More than one candidate exists only where packaging splits the location
/// (snap-packaged Firefox on Linux). Callers should use the first candidate
/// that exists on disk.
pub fn profile_candidates(browser: Browser, home: &Path) -> Vec<PathBuf> {
    let relative: &[&str] = if cfg!(target_os = "windows") {
        match browser {
            Browser::Chrome => &["AppData/Local/Google/Chrome/User Data"],
            Browser::Edge => &["AppData/Local/Microsoft/Edge/User Data"],
            Browser::Firefox => &["AppData/Roaming/Mozilla/Firefox/Profiles"],
        }
    } else if cfg!(target_os = "macos") {
        match browser {
            Browser::Chrome => &["Library/Application Support/Google/Chrome"],
            Browser::Edge => &["Library/Application Support/Microsoft Edge"],
            Browser::Firefox => &["Library/Application Support/Firefox/Profiles"],
        }
    } else {
        match browser {
            Browser::Chrome => &[".config/google-chrome"],
            Browser::Edge => &[".config/microsoft-edge"],
            Browser::Firefox => &[
                ".mozilla/firefox",
                "snap/firefox/common/.mozilla/firefox",
            ],
        }
    };

    relative.iter().map(|rel| home.join(rel)).collect()
}

/// The first profile candidate that exists on disk.
pub fn resolve_profile_root(browser: Browser, home: &Path) -> Option<PathBuf> {
    profile_candidates(browser, home).into_iter().find(|p| p.is_dir())
}

// =============================================================================
// Executables
// =============================================================================

/// Known installation paths per OS, for every browser. Kept as one table so
/// the report can carry hints for all platforms, not just the exporting one.
fn executable_table(browser: Browser) -> &'static [(&'static str, &'static [&'static str])] {
    match browser {
        Browser::Chrome => &[
            (
                "windows",
                &[
                    "C:/Program Files/Google/Chrome/Application/chrome.exe",
                    "C:/Program Files (x86)/Google/Chrome/Application/chrome.exe",
                ],
            ),
            (
                "linux",
                &[
                    "/usr/bin/google-chrome",
                    "/usr/bin/google-chrome-stable",
                    "/usr/bin/chromium-browser",
                    "/usr/bin/chromium",
                ],
            ),
            (
                "macos",
                &["/Applications/Google Chrome.app/Contents/MacOS/Google Chrome"],
            ),
        ],
        Browser::Edge => &[
            (
                "windows",
                &[
                    "C:/Program Files/Microsoft/Edge/Application/msedge.exe",
                    "C:/Program Files (x86)/Microsoft/Edge/Application/msedge.exe",
                ],
            ),
            ("linux", &["/usr/bin/microsoft-edge", "/usr/bin/msedge"]),
            (
                "macos",
                &["/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge"],
            ),
        ],
        Browser::Firefox => &[
            (
                "windows",
                &[
                    "C:/Program Files/Mozilla Firefox/firefox.exe",
                    "C:/Program Files (x86)/Mozilla Firefox/firefox.exe",
                ],
            ),
            ("linux", &["/usr/bin/firefox", "/snap/bin/firefox"]),
            ("macos", &["/Applications/Firefox.app/Contents/MacOS/firefox"]),
        ],
    }
}

/// Executable hint map for the report: OS key -> candidate paths.
pub fn executable_hints(browser: Browser) -> BTreeMap<String, Vec<PathBuf>> {
    executable_table(browser)
        .iter()
        .map(|(os, paths)| {
            (
                (*os).to_string(),
                paths.iter().map(PathBuf::from).collect(),
            )
        })
        .collect()
}

/// Known installation paths for the current OS.
pub fn executable_candidates(browser: Browser) -> Vec<PathBuf> {
    executable_table(browser)
        .iter()
        .find(|(os, _)| *os == os_key())
        .map(|(_, paths)| paths.iter().map(PathBuf::from).collect())
        .unwrap_or_default()
}

/// Command names to try on PATH when no absolute candidate exists.
pub fn path_command_names(browser: Browser) -> &'static [&'static str] {
    match browser {
        Browser::Chrome => &[
            "google-chrome",
            "google-chrome-stable",
            "chromium",
            "chromium-browser",
            "chrome",
        ],
        Browser::Edge => &["microsoft-edge", "msedge"],
        Browser::Firefox => &["firefox"],
    }
}

/// Search PATH for the first of `names` that resolves to a file.
pub fn find_in_path(names: &[&str]) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    for dir in std::env::split_paths(&path_var) {
        for name in names {
            let candidate = dir.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
            if cfg!(target_os = "windows") {
                let with_ext = dir.join(format!("{name}.exe"));
                if with_ext.is_file() {
                    return Some(with_ext);
                }
            }
        }
    }
    None
}
