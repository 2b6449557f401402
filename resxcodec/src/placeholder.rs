//! Bidirectional placeholder-token translation between the JSON-side
//! `{{name}}` syntax and the ResX-side `${name}` syntax.
//!
//! Both transforms are total over all inputs: text without well-formed tokens
//! passes through unchanged. A token is recognized only when its interior,
//! after at most one space on each side, contains no brace characters or
//! whitespace; the captured name is preserved exactly, case included.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    static ref JSON_PLACEHOLDER: Regex =
        Regex::new(r"(?i)\{\{\s?([^{}\s]+)\s?\}\}").expect("valid JSON placeholder pattern");
    static ref RESX_PLACEHOLDER: Regex =
        Regex::new(r"(?i)\$\{\s?([^{}\s]+)\s?\}").expect("valid ResX placeholder pattern");
}

/// Rewrites every `{{name}}` token to `${name}`, discarding optional
/// whitespace inside the braces.
pub fn to_resx_placeholders(text: &str) -> String {
    JSON_PLACEHOLDER
        .replace_all(text, |caps: &Captures| format!("${{{}}}", &caps[1]))
        .into_owned()
}

/// Rewrites every `${name}` token to `{{name}}`, discarding optional
/// whitespace inside the braces.
pub fn to_json_placeholders(text: &str) -> String {
    RESX_PLACEHOLDER
        .replace_all(text, |caps: &Captures| format!("{{{{{}}}}}", &caps[1]))
        .into_owned()
}
