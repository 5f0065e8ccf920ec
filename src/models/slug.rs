//! URL slug generation for event titles

use regex::Regex;
use std::sync::OnceLock;

static DISALLOWED_REGEX: OnceLock<Regex> = OnceLock::new();
static WHITESPACE_REGEX: OnceLock<Regex> = OnceLock::new();
static HYPHEN_RUN_REGEX: OnceLock<Regex> = OnceLock::new();

fn disallowed_regex() -> &'static Regex {
    DISALLOWED_REGEX
        .get_or_init(|| Regex::new(r"[^a-z0-9\s-]").expect("Invalid slug character regex"))
}

fn whitespace_regex() -> &'static Regex {
    WHITESPACE_REGEX.get_or_init(|| Regex::new(r"\s+").expect("Invalid whitespace regex"))
}

fn hyphen_run_regex() -> &'static Regex {
    HYPHEN_RUN_REGEX.get_or_init(|| Regex::new(r"-+").expect("Invalid hyphen regex"))
}

/// Derive a URL-safe slug from a display title
///
/// The result only contains `[a-z0-9-]`, never starts or ends with a hyphen
/// and never contains two hyphens in a row. A title made entirely of
/// characters outside that alphabet produces an empty string.
///
/// ```
/// use eventline::models::slugify;
///
/// assert_eq!(slugify("  Hello, World!! 2024  "), "hello-world-2024");
/// assert_eq!(slugify("!!!"), "");
/// ```
pub fn slugify(title: &str) -> String {
    let lowered = title.to_lowercase();
    let stripped = disallowed_regex().replace_all(lowered.trim(), "");
    let hyphenated = whitespace_regex().replace_all(&stripped, "-");
    let collapsed = hyphen_run_regex().replace_all(&hyphenated, "-");

    collapsed.trim_matches('-').to_string()
}
