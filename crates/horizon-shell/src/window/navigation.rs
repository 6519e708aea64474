//! Link interception policy.
//!
//! Links can force their destination with a scheme-like prefix:
//! `external:` always opens in the system browser, `internal:` always loads
//! in the current window. Anything else follows the window's link policy.

use serde::Serialize;

const EXTERNAL_PREFIX: &str = "external:";
const INTERNAL_PREFIX: &str = "internal:";

/// Whether the window should proceed with a navigation or popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NavigationAction {
    Allow,
    Deny,
}

/// How a link asks to be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkTarget<'a> {
    /// Open this URL externally.
    External(&'a str),
    /// Load this URL in the current window.
    Internal(&'a str),
    /// No explicit prefix.
    Unmarked(&'a str),
}

/// Classify `url` by its prefix, stripping it.
pub fn classify(url: &str) -> LinkTarget<'_> {
    if let Some(rest) = url.strip_prefix(EXTERNAL_PREFIX) {
        LinkTarget::External(rest)
    } else if let Some(rest) = url.strip_prefix(INTERNAL_PREFIX) {
        LinkTarget::Internal(rest)
    } else {
        LinkTarget::Unmarked(url)
    }
}

/// Resolve the link policy: per-window override, then global, then `true`.
pub fn opens_externally(per_window: Option<bool>, global: Option<bool>) -> bool {
    per_window.or(global).unwrap_or(true)
}
