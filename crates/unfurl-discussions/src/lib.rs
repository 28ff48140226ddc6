//! Shared helpers for the unfurl discussion bot.
//! This crate provides footer marker handling, URL extraction, page title
//! resolution, discussion comment payload types, and GraphQL transport helpers
//! consumed by the runtime crate.

pub mod discussion_comment;
pub mod graphql_transport_helpers;
pub mod page_title;
pub mod unfurl_footer;
pub mod url_extraction;
