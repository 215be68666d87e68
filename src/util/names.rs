//! Name helpers shared by the populator and the handlers
//!
//! Kubernetes object names and port names are derived from source-level
//! identifiers (listener names, service paths) and from the executable
//! artifact name, so they have to be squeezed into the DNS-label alphabet.

use regex::Regex;
use std::path::Path;

/// Suffix of the executable artifact consumed by the build
pub const EXECUTABLE_SUFFIX: &str = ".jar";

const MAX_NAME_LENGTH: usize = 15;

/// Checks if a string is absent, empty or whitespace only
pub fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

/// Returns a valid Kubernetes name derived from `name`
///
/// Leading slash is dropped, the value is lowercased, `_` and `.` become `-`,
/// `$` is removed and `/` becomes `-`. The result is capped at 15 characters
/// and a single trailing `-` is removed.
pub fn valid_name(name: &str) -> String {
    let name = name.strip_prefix('/').unwrap_or(name);
    let lowered = name.to_lowercase();

    let separators = Regex::new(r"[_.]").expect("valid regex");
    let name = separators.replace_all(&lowered, "-");
    let name = name.replace('$', "").replace('/', "-");

    let truncated: String = name.chars().take(MAX_NAME_LENGTH).collect();
    match truncated.strip_suffix('-') {
        Some(stripped) => stripped.to_string(),
        None => truncated,
    }
}

/// Extracts the artifact base name from the executable path
///
/// `target/bin/hello_world.jar` yields `hello_world`. Paths without the
/// executable suffix fall back to the file stem.
pub fn extract_artifact_name(path: &Path) -> Option<String> {
    let file_name = path.file_name()?.to_str()?;
    if let Some(base) = file_name.strip_suffix(EXECUTABLE_SUFFIX) {
        if !base.is_empty() {
            return Some(base.to_string());
        }
    }
    path.file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
