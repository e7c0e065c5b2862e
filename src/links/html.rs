// src/links/html.rs
// =============================================================================
// This module extracts crawlable links from HTML pages.
//
// We use the `lol_html` crate which:
// - Tokenizes HTML as a stream (no DOM is ever built)
// - Lets us register a handler for `a[href]` start tags
// - Tolerates broken markup the way browsers do
//
// lol_html hands us attribute values as written in the page, so entities
// such as &amp; are decoded before resolving.
//
// Every href is normalized against the page URL and then run through the
// LinkFilter, so the result only contains links the crawler may visit.
//
// Rust concepts:
// - Closures capturing a &mut Vec: the handler pushes into our local buffer
// - Lifetimes: the rewriter borrows that buffer until it is dropped
// =============================================================================

use html_escape::decode_html_entities;
use lol_html::{element, HtmlRewriter, Settings};
use url::Url;

use super::filter::LinkFilter;

// Extracts all eligible links from an HTML body
//
// Parameters:
//   body: the raw response bytes (may be truncated or not HTML at all)
//   base_url: the URL of the page, used to resolve relative links
//   filter: decides which resolved links may be queued
//
// Returns: Vec<String> of absolute URLs in document order
//
// Example:
//   body = "<a href='z.html'>Z</a>"
//   base_url = "https://a.example/x/"
//   result = ["https://a.example/x/z.html"]
pub fn extract_links(body: &[u8], base_url: &str, filter: &LinkFilter<'_>) -> Vec<String> {
    let base = match Url::parse(base_url) {
        Ok(url) => url,
        Err(e) => {
            tracing::debug!("cannot resolve links against {}: {}", base_url, e);
            return Vec::new();
        }
    };

    scan_hrefs(body)
        .iter()
        .map(|href| normalize(&decode_html_entities(href), &base))
        .filter(|link| filter.accept(link))
        .collect()
}

// Collects raw href values of anchor tags from the token stream
//
// A tokenizer error ends the scan; whatever was collected before it is kept.
fn scan_hrefs(body: &[u8]) -> Vec<String> {
    let mut hrefs = Vec::new();

    {
        let mut rewriter = HtmlRewriter::new(
            Settings {
                element_content_handlers: vec![element!("a[href]", |el| {
                    if let Some(href) = el.get_attribute("href") {
                        hrefs.push(href);
                    }
                    Ok(())
                })],
                ..Settings::default()
            },
            // We never need the rewritten output
            |_: &[u8]| {},
        );

        // After a failed write the rewriter must not be used again
        let outcome = match rewriter.write(body) {
            Ok(()) => rewriter.end(),
            Err(e) => Err(e),
        };

        if let Err(e) = outcome {
            tracing::debug!("stopped tokenizing early: {}", e);
        }
    }

    hrefs
}

// Resolves an href against the page URL
//
// Examples (base = "https://a.example/x/"):
//   "//b.example/y" -> "https://b.example/y" (scheme copied from base)
//   "z.html"        -> "https://a.example/x/z.html"
//   "http://[::1"   -> "" (unparseable, rejected later by the filter)
pub fn normalize(href: &str, base: &Url) -> String {
    if href.starts_with("//") {
        return format!("{}:{}", base.scheme(), href);
    }

    match base.join(href) {
        Ok(url) => url.to_string(),
        Err(_) => String::new(),
    }
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why a tokenizer instead of a DOM?
//    - We only care about one attribute of one tag
//    - A streaming pass keeps memory flat even for the full 1 MiB body
//    - There is no tree to repair, so broken markup simply yields fewer links
//
// 2. Why does normalize() return String instead of Option<String>?
//    - An empty string is already something the filter rejects
//    - Keeping one rejection path means every link goes through the same checks
// -----------------------------------------------------------------------------
