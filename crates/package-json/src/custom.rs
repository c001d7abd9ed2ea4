use std::sync::OnceLock;

use regex::Regex;

const CUSTOM_PREFIXES: [&str; 5] = ["http:", "https:", "file:", "git:", "git+"];

fn github_shorthand() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\w+/\w+").expect("valid regex"))
}

fn local_path() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(?:\.{0,2}/)\w").expect("valid regex"))
}

/// `true` when a declared range points at a URL, a git repository, a GitHub
/// `user/repo` shorthand or a local path instead of a registry version.
pub fn is_custom_version(range: &str) -> bool {
    let range = range.trim();
    CUSTOM_PREFIXES.iter().any(|prefix| range.starts_with(prefix))
        || github_shorthand().is_match(range)
        || local_path().is_match(range)
}
