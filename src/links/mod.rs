// src/links/mod.rs
// =============================================================================
// This module turns fetched pages into candidate links.
//
// Submodules:
// - html: Tokenizes HTML and resolves anchor hrefs against the page URL
// - filter: Accepts or rejects a resolved link (visited, blacklist, syntax)
// =============================================================================

mod filter;
mod html;

pub use filter::LinkFilter;
pub use html::extract_links;
