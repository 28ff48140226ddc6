//! Runtime for the unfurl discussion bot.
//!
//! Resolves a discussion comment over the GitHub GraphQL API, fetches every
//! URL it mentions, and rewrites the comment with a link preview footer.

mod unfurl_runtime;

pub use unfurl_runtime::{
    PageFetchError, RepoRef, UnfurlOutcome, UnfurlRuntime, UnfurlRuntimeConfig,
    DEFAULT_GRAPHQL_URL, DEFAULT_USER_AGENT,
};
