use std::sync::OnceLock;

use regex::Regex;

fn url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"https?://[^\s)]+").expect("url pattern compiles"))
}

/// Extract every http(s) URL in order of appearance.
///
/// A URL ends at whitespace or a closing parenthesis, so markdown links such as
/// `[docs](https://example.com/docs)` yield the bare target. Repeated URLs are
/// kept: each occurrence is unfurled on its own.
pub fn extract_urls(text: &str) -> Vec<String> {
    url_pattern()
        .find_iter(text)
        .map(|found| found.as_str().to_string())
        .collect()
}
