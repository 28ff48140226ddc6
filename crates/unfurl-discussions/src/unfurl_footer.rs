use std::sync::OnceLock;

use regex::Regex;

pub const UNFURL_FOOTER_START_MARKER: &str = "<!-- unfurl-bot-start -->";
pub const UNFURL_FOOTER_END_MARKER: &str = "<!-- unfurl-bot-end -->";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Title and source URL rendered as one entry of the unfurl footer.
pub struct LinkPreview {
    pub title: String,
    pub url: String,
}

impl LinkPreview {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }
}

fn footer_block_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        let pattern = format!(
            "(?s){}.*?{}",
            regex::escape(UNFURL_FOOTER_START_MARKER),
            regex::escape(UNFURL_FOOTER_END_MARKER)
        );
        Regex::new(&pattern).expect("footer marker pattern compiles")
    })
}

/// Remove every bot-managed footer block and trim the surrounding whitespace.
///
/// The returned text is the content-only body: the part of the comment the
/// author wrote, which is the only part scanned for URLs.
pub fn strip_unfurl_footer(body: &str) -> String {
    footer_block_pattern()
        .replace_all(body, "")
        .trim()
        .to_string()
}

/// Count complete footer blocks in a body.
///
/// The run never needs this. Tests and fuzz targets use it to check that a
/// body holds a single footer.
pub fn count_unfurl_footer_blocks(body: &str) -> usize {
    footer_block_pattern().find_iter(body).count()
}

pub fn render_preview_entry(preview: &LinkPreview) -> String {
    format!("> **{}**\n> {}\n\n", preview.title, preview.url)
}

/// Render the delimited footer block, or `None` when there is nothing to show.
pub fn render_preview_block(previews: &[LinkPreview]) -> Option<String> {
    if previews.is_empty() {
        return None;
    }
    let mut block = format!("{UNFURL_FOOTER_START_MARKER}\n");
    for preview in previews {
        block.push_str(&render_preview_entry(preview));
    }
    block.push_str(UNFURL_FOOTER_END_MARKER);
    Some(block)
}

/// Append a freshly rendered footer to an already stripped body.
pub fn compose_unfurled_body(content: &str, previews: &[LinkPreview]) -> String {
    match render_preview_block(previews) {
        Some(block) => format!("{content}\n\n{block}"),
        None => content.to_string(),
    }
}
