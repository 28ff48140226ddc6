#![no_main]

use libfuzzer_sys::fuzz_target;
use unfurl_discussions::unfurl_footer::{
    compose_unfurled_body, count_unfurl_footer_blocks, strip_unfurl_footer, LinkPreview,
};
use unfurl_discussions::url_extraction::extract_urls;

fuzz_target!(|data: &[u8]| {
    let raw = String::from_utf8_lossy(data);
    let content = strip_unfurl_footer(&raw);
    assert_eq!(content, content.trim());

    let urls = extract_urls(&content);
    for url in &urls {
        assert!(url.starts_with("http://") || url.starts_with("https://"));
        assert!(!url.contains(')'));
        assert!(!url.chars().any(char::is_whitespace));
    }

    assert_eq!(compose_unfurled_body(&content, &[]), content);

    let previews = urls
        .iter()
        .map(|url| LinkPreview::new("title", url.as_str()))
        .collect::<Vec<_>>();
    let body = compose_unfurled_body(&content, &previews);
    assert!(body.starts_with(content.as_str()));
    if !previews.is_empty() {
        assert!(count_unfurl_footer_blocks(&body) >= 1);
    }
});
