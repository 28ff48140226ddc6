use scraper::{Html, Selector};

const OG_TITLE_SELECTOR: &str = r#"meta[property="og:title"]"#;
const TITLE_SELECTOR: &str = "title";

fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn non_blank(raw: &str) -> Option<String> {
    let collapsed = collapse_whitespace(raw);
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

/// Content of the first `og:title` meta tag, when present and not blank.
///
/// The value is whitespace-collapsed, so a content of only spaces falls through
/// to the document title instead of rendering an empty entry.
pub fn extract_og_title(document: &Html) -> Option<String> {
    let selector = Selector::parse(OG_TITLE_SELECTOR).ok()?;
    let element = document.select(&selector).next()?;
    non_blank(element.value().attr("content")?)
}

/// Text of the first `<title>` element, with whitespace collapsed.
pub fn extract_document_title(document: &Html) -> Option<String> {
    let selector = Selector::parse(TITLE_SELECTOR).ok()?;
    let element = document.select(&selector).next()?;
    non_blank(&element.text().collect::<String>())
}

/// Pick the display title for a fetched page.
///
/// Precedence is the Open Graph title, then the document title, then the URL.
pub fn resolve_preview_title(html: &str, url: &str) -> String {
    let document = Html::parse_document(html);
    extract_og_title(&document)
        .or_else(|| extract_document_title(&document))
        .unwrap_or_else(|| url.to_string())
}
