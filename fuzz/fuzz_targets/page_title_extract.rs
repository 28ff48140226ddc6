#![no_main]

use libfuzzer_sys::fuzz_target;
use unfurl_discussions::page_title::resolve_preview_title;

const FALLBACK_URL: &str = "https://fuzz.invalid/page";

fuzz_target!(|data: &[u8]| {
    let html = String::from_utf8_lossy(data);
    let title = resolve_preview_title(&html, FALLBACK_URL);
    assert!(!title.trim().is_empty());
    assert_eq!(title, title.trim());
});
