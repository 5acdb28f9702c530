// TabRescue - core/model.rs
//
// Core data model types. Pure data definitions with no I/O and no
// platform dependencies.
//
// These types are the shared vocabulary across all layers.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Browser identity
// =============================================================================

/// The browsers whose session files TabRescue understands.
///
/// Chrome and Edge share the Chromium SNSS session format; Firefox uses the
/// mozLz4-compressed JSON recovery snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Browser {
    Chrome,
    Edge,
    Firefox,
}

/// On-disk session format family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionFormat {
    /// Chromium binary session command stream.
    Snss,
    /// Firefox mozLz4-compressed JSON snapshot.
    MozLz4,
}

impl Browser {
    /// Returns all supported browsers in processing order.
    pub fn all() -> &'static [Browser] {
        &[Browser::Chrome, Browser::Edge, Browser::Firefox]
    }

    /// Human-readable name, also used as the report section key.
    pub fn label(&self) -> &'static str {
        match self {
            Browser::Chrome => "Chrome",
            Browser::Edge => "Edge",
            Browser::Firefox => "Firefox",
        }
    }

    /// Which session format this browser persists.
    pub fn session_format(&self) -> SessionFormat {
        match self {
            Browser::Chrome | Browser::Edge => SessionFormat::Snss,
            Browser::Firefox => SessionFormat::MozLz4,
        }
    }

    /// Process image names, lowercase, across the supported platforms.
    pub fn process_names(&self) -> &'static [&'static str] {
        match self {
            Browser::Chrome => &["chrome.exe", "chrome", "google-chrome"],
            Browser::Edge => &["msedge.exe", "microsoftedge.exe", "msedge"],
            Browser::Firefox => &["firefox.exe", "firefox", "firefox-bin"],
        }
    }
}

impl fmt::Display for Browser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Browser {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chrome" => Ok(Browser::Chrome),
            "edge" => Ok(Browser::Edge),
            "firefox" => Ok(Browser::Firefox),
            other => Err(format!(
                "Unknown browser '{other}' (expected chrome, edge or firefox)"
            )),
        }
    }
}

// =============================================================================
// Session entities
// =============================================================================

/// One visited URL+title record in a tab's back/forward history.
///
/// `details` carries the family-specific fields; the shared shape is just
/// url and title. Entries are immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavigationEntry<D> {
    pub url: String,
    pub title: String,
    #[serde(flatten)]
    pub details: D,
}

/// A browser tab: its full navigation history plus a pointer to the
/// currently active entry.
///
/// `index` may legitimately be out of range while a session file is still
/// being decoded (the selection command can arrive before, after, or not at
/// all); it must never be dereferenced without a bounds check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tab<E, D> {
    /// Navigation entries in navigation order, never reordered.
    pub entries: Vec<NavigationEntry<E>>,

    /// Index of the currently active entry.
    pub index: usize,

    #[serde(flatten)]
    pub details: D,
}

impl<E, D> Tab<E, D> {
    /// The currently active navigation entry, or `None` when `index` is out
    /// of range.
    pub fn current_entry(&self) -> Option<&NavigationEntry<E>> {
        self.entries.get(self.index)
    }
}

/// A collection of tabs as persisted by a browser's session manager.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Window<E, D> {
    pub tabs: Vec<Tab<E, D>>,
}

// =============================================================================
// Chromium-specific details
// =============================================================================

/// Chromium navigation entry fields beyond url/title.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChromiumEntryDetails {
    /// Navigation transition type as recorded by the browser.
    pub transition_type: u32,

    /// Whether the navigation carried POST data.
    pub has_post_data: bool,

    /// Referring URL, empty when none was recorded.
    pub referrer: String,

    /// Original URL before redirects, empty when none was recorded.
    pub original_request_url: String,

    /// Whether a custom user-agent was in effect.
    pub is_overriding_user_agent: bool,
}

/// Chromium tab fields beyond entries/index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChromiumTabDetails {
    /// Decoder-assigned identity key from the session command stream.
    pub tab_id: u32,
}

pub type ChromiumEntry = NavigationEntry<ChromiumEntryDetails>;
pub type ChromiumTab = Tab<ChromiumEntryDetails, ChromiumTabDetails>;
pub type ChromiumWindow = Window<ChromiumEntryDetails, ChromiumTabDetails>;

// =============================================================================
// Firefox-specific details
// =============================================================================

/// Firefox navigation entry fields beyond url/title.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FirefoxEntryDetails {
    /// Referring URL, when recorded.
    pub referrer: Option<String>,

    /// Millisecond epoch timestamp of the last visit, when recorded.
    pub last_accessed: Option<i64>,
}

/// Firefox tab fields beyond entries/index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FirefoxTabDetails {
    /// Whether the tab is pinned.
    pub pinned: bool,

    /// Whether the tab is hidden in the tab strip.
    pub hidden: bool,
}

pub type FirefoxEntry = NavigationEntry<FirefoxEntryDetails>;
pub type FirefoxTab = Tab<FirefoxEntryDetails, FirefoxTabDetails>;
pub type FirefoxWindow = Window<FirefoxEntryDetails, FirefoxTabDetails>;

#[cfg(test)]
mod tests {
    use super::*;

    fn tab_with_entries(count: usize, index: usize) -> FirefoxTab {
        Tab {
            entries: (0..count)
                .map(|i| NavigationEntry {
                    url: format!("https://example.org/{i}"),
                    title: format!("Page {i}"),
                    details: FirefoxEntryDetails {
                        referrer: None,
                        last_accessed: None,
                    },
                })
                .collect(),
            index,
            details: FirefoxTabDetails {
                pinned: false,
                hidden: false,
            },
        }
    }

    #[test]
    fn current_entry_in_bounds() {
        let tab = tab_with_entries(3, 1);
        assert_eq!(tab.current_entry().unwrap().url, "https://example.org/1");
    }

    #[test]
    fn current_entry_out_of_bounds_is_none() {
        let tab = tab_with_entries(3, 3);
        assert!(tab.current_entry().is_none());
    }

    #[test]
    fn current_entry_on_empty_tab_is_none() {
        let tab = tab_with_entries(0, 0);
        assert!(tab.current_entry().is_none());
    }

    #[test]
    fn browser_from_str_is_case_insensitive() {
        assert_eq!("FireFox".parse::<Browser>().unwrap(), Browser::Firefox);
        assert_eq!("chrome".parse::<Browser>().unwrap(), Browser::Chrome);
        assert!("safari".parse::<Browser>().is_err());
    }

    #[test]
    fn chromium_browsers_share_snss_format() {
        assert_eq!(Browser::Chrome.session_format(), SessionFormat::Snss);
        assert_eq!(Browser::Edge.session_format(), SessionFormat::Snss);
        assert_eq!(Browser::Firefox.session_format(), SessionFormat::MozLz4);
    }
}
