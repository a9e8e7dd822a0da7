//! Bundle id lookup
//!
//! Reads the `bundleid` value from a workflow's `info.plist`:
//! <key>bundleid</key>
//! <string>com.example.workflow</string>

use once_cell::sync::Lazy;
use quick_xml::escape::unescape;
use regex::Regex;
use std::path::Path;

use crate::core::error::{Result, WorkflowError};

/// File Alfred stores workflow metadata in
pub const INFO_PLIST: &str = "info.plist";

/// Static regex for the bundleid key/value pair
pub static BUNDLE_ID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<key>\s*bundleid\s*</key>\s*<string>([^<]*)</string>")
        .expect("Invalid BUNDLE_ID_RE regex")
});

/// Extract the bundle id from plist text
pub fn parse_bundle_id(content: &str) -> Option<String> {
    let raw = BUNDLE_ID_RE.captures(content)?.get(1)?.as_str();
    let value = unescape(raw)
        .map(|value| value.into_owned())
        .unwrap_or_else(|_| raw.to_string());
    let value = value.trim();

    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Read the bundle id from a plist file
pub fn read_bundle_id(path: &Path) -> Result<Option<String>> {
    let content = std::fs::read_to_string(path).map_err(|e| WorkflowError::io(path, e))?;
    Ok(parse_bundle_id(&content))
}
