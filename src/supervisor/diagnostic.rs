//! Launch diagnostic normalization

use regex::Regex;

lazy_static::lazy_static! {
    static ref OS_ERROR_SUFFIX: Regex =
        Regex::new(r"\s*\(os error -?\d+\)\s*$").expect("valid os error pattern");
    static ref WRAPPED_DETAIL: Regex =
        Regex::new(r"^.*\((.+)\)\s*$").expect("valid wrapped detail pattern");
}

/// Strip wrapper noise from a launch diagnostic
///
/// `No such file or directory (os error 2)` becomes `No such file or directory`,
/// and `Failed to execute child process "x" (Permission denied)` becomes
/// `Permission denied`. Anything else is returned trimmed.
pub fn normalize_diagnostic(raw: &str) -> String {
    let raw = raw.trim();
    let stripped = OS_ERROR_SUFFIX.replace(raw, "");

    let detail = match WRAPPED_DETAIL.captures(&stripped) {
        Some(captures) => captures[1].trim().to_string(),
        None => stripped.trim().to_string(),
    };

    if detail.is_empty() {
        raw.to_string()
    } else {
        detail
    }
}
