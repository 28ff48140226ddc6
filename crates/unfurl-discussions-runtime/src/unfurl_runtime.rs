//! Discussion comment unfurl orchestration.

use std::fmt;

use anyhow::{anyhow, bail, Result};
use unfurl_discussions::discussion_comment::{find_comment_by_database_id, CommentScope};
use unfurl_discussions::unfurl_footer::{compose_unfurled_body, strip_unfurl_footer};
use unfurl_discussions::url_extraction::extract_urls;

mod github_graphql_client;
mod page_fetcher;

use github_graphql_client::GithubGraphqlClient;
pub use page_fetcher::PageFetchError;
use page_fetcher::PageFetcher;

pub const DEFAULT_GRAPHQL_URL: &str = "https://api.github.com/graphql";
pub const DEFAULT_USER_AGENT: &str = "unfurl-bot";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Repository coordinates used to scope the comment lookup.
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn new(owner: &str, name: &str) -> Result<Self> {
        let owner = owner.trim();
        let name = name.trim();
        if owner.is_empty() || name.is_empty() || owner.contains('/') || name.contains('/') {
            bail!("invalid repository '{owner}/{name}', expected non-empty owner and name");
        }
        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let (owner, name) = raw
            .trim()
            .split_once('/')
            .ok_or_else(|| anyhow!("invalid repository '{raw}', expected owner/repo"))?;
        Self::new(owner, name).map_err(|_| anyhow!("invalid repository '{raw}', expected owner/repo"))
    }

    pub fn as_slug(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

#[derive(Clone)]
/// Immutable configuration for one unfurl run.
pub struct UnfurlRuntimeConfig {
    pub graphql_url: String,
    pub token: String,
    pub user_agent: String,
    pub repo: RepoRef,
    pub scope: CommentScope,
    pub comment_database_id: u64,
    /// Body delivered with the triggering event. The fetched body is used when absent.
    pub comment_body: Option<String>,
    pub request_timeout_ms: u64,
    pub retry_max_attempts: usize,
    pub retry_base_delay_ms: u64,
    pub fetch_timeout_ms: u64,
    pub fetch_concurrency: usize,
    pub max_page_bytes: usize,
    pub dry_run: bool,
    pub skip_unchanged: bool,
    pub allow_replies: bool,
}

impl fmt::Debug for UnfurlRuntimeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnfurlRuntimeConfig")
            .field("graphql_url", &self.graphql_url)
            .field("token", &"<redacted>")
            .field("user_agent", &self.user_agent)
            .field("repo", &self.repo)
            .field("scope", &self.scope)
            .field("comment_database_id", &self.comment_database_id)
            .field("comment_body", &self.comment_body)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .field("retry_max_attempts", &self.retry_max_attempts)
            .field("retry_base_delay_ms", &self.retry_base_delay_ms)
            .field("fetch_timeout_ms", &self.fetch_timeout_ms)
            .field("fetch_concurrency", &self.fetch_concurrency)
            .field("max_page_bytes", &self.max_page_bytes)
            .field("dry_run", &self.dry_run)
            .field("skip_unchanged", &self.skip_unchanged)
            .field("allow_replies", &self.allow_replies)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// How a run ended. Every variant is a successful outcome.
pub enum UnfurlOutcome {
    Updated {
        comment_id: String,
        body: String,
        preview_count: usize,
    },
    DryRun {
        comment_id: String,
        body: String,
        preview_count: usize,
    },
    Unchanged {
        comment_id: String,
    },
    CommentNotFound {
        database_id: u64,
    },
    ReplySkipped {
        comment_id: String,
        reply_to_id: String,
    },
}

impl UnfurlOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Updated { .. } => "updated",
            Self::DryRun { .. } => "dry_run",
            Self::Unchanged { .. } => "unchanged",
            Self::CommentNotFound { .. } => "comment_not_found",
            Self::ReplySkipped { .. } => "reply_skipped",
        }
    }

    /// Rendered body for outcomes that produced one.
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Updated { body, .. } | Self::DryRun { body, .. } => Some(body),
            _ => None,
        }
    }
}

pub struct UnfurlRuntime {
    config: UnfurlRuntimeConfig,
    graphql: GithubGraphqlClient,
    pages: PageFetcher,
}

impl UnfurlRuntime {
    pub fn new(config: UnfurlRuntimeConfig) -> Result<Self> {
        let graphql = GithubGraphqlClient::new(
            config.graphql_url.clone(),
            &config.token,
            &config.user_agent,
            config.request_timeout_ms,
            config.retry_max_attempts,
            config.retry_base_delay_ms,
        )?;
        let pages = PageFetcher::new(
            &config.user_agent,
            config.fetch_timeout_ms,
            config.max_page_bytes,
        )?;
        Ok(Self {
            config,
            graphql,
            pages,
        })
    }

    pub async fn run(&self) -> Result<UnfurlOutcome> {
        let config = &self.config;
        tracing::info!(
            repo = %config.repo.as_slug(),
            scope = %config.scope.label(),
            comment_database_id = config.comment_database_id,
            "unfurl run started"
        );

        let comments = self
            .graphql
            .list_scope_comments(&config.repo, config.scope)
            .await?;
        let Some(comment) = find_comment_by_database_id(&comments, config.comment_database_id)
        else {
            tracing::warn!(
                comment_database_id = config.comment_database_id,
                scanned = comments.len(),
                "comment not found; nothing to unfurl"
            );
            return Ok(UnfurlOutcome::CommentNotFound {
                database_id: config.comment_database_id,
            });
        };
        tracing::info!(comment_id = %comment.id, "resolved comment");

        if !config.allow_replies {
            if let Some(parent) = self.graphql.fetch_reply_to(&comment.id).await? {
                tracing::warn!(
                    comment_id = %comment.id,
                    reply_to = %parent.id,
                    "comment is a reply; replies are not unfurled"
                );
                return Ok(UnfurlOutcome::ReplySkipped {
                    comment_id: comment.id.clone(),
                    reply_to_id: parent.id,
                });
            }
        }

        let source_body = config.comment_body.as_deref().unwrap_or(&comment.body);
        let content = strip_unfurl_footer(source_body);
        let urls = extract_urls(&content);
        tracing::info!(url_count = urls.len(), "extracted urls");

        let previews = self
            .pages
            .fetch_previews(&urls, config.fetch_concurrency)
            .await;
        let body = compose_unfurled_body(&content, &previews);
        let preview_count = previews.len();
        tracing::info!(preview_count, "rendered previews");

        if config.dry_run {
            return Ok(UnfurlOutcome::DryRun {
                comment_id: comment.id.clone(),
                body,
                preview_count,
            });
        }
        if config.skip_unchanged && body == comment.body {
            tracing::info!(comment_id = %comment.id, "comment body already up to date");
            return Ok(UnfurlOutcome::Unchanged {
                comment_id: comment.id.clone(),
            });
        }

        let updated = self.graphql.update_comment(&comment.id, &body).await?;
        tracing::info!(comment_id = %updated.id, "comment successfully updated");
        Ok(UnfurlOutcome::Updated {
            comment_id: updated.id,
            body,
            preview_count,
        })
    }
}
