use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use unfurl_discussions::discussion_comment::{
    collect_comment_nodes, CommentReference, CommentReplyToData, CommentScope,
    DiscussionCommentNode, DiscussionCommentsData, RepositoryDiscussionCommentsData,
    UpdateDiscussionCommentData, UpdatedDiscussionComment, COMMENT_REPLY_TO_QUERY,
    DISCUSSION_COMMENTS_PAGE_SIZE, UPDATE_DISCUSSION_COMMENT_MUTATION,
};
use unfurl_discussions::graphql_transport_helpers::{
    describe_graphql_errors, rate_limit_wait, truncate_error_body, GraphqlRetryPolicy,
};

use super::RepoRef;

#[derive(Debug, Deserialize)]
#[serde(bound = "T: DeserializeOwned")]
struct GraphqlEnvelope<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<Value>,
}

#[derive(Clone)]
pub(super) struct GithubGraphqlClient {
    http: reqwest::Client,
    endpoint: String,
    retry: GraphqlRetryPolicy,
}

impl GithubGraphqlClient {
    pub(super) fn new(
        endpoint: String,
        token: &str,
        user_agent: &str,
        request_timeout_ms: u64,
        retry_max_attempts: usize,
        retry_base_delay_ms: u64,
    ) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_str(user_agent)
                .context("invalid user agent header")?,
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "x-github-api-version",
            reqwest::header::HeaderValue::from_static("2022-11-28"),
        );
        let auth_header = format!("Bearer {}", token.trim());
        headers.insert(
            reqwest::header::AUTHORIZATION,
            reqwest::header::HeaderValue::from_str(&auth_header)
                .context("invalid github authorization header")?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_millis(request_timeout_ms.max(1)))
            .build()
            .context("failed to create github graphql client")?;
        Ok(Self {
            http: client,
            endpoint: endpoint.trim().to_string(),
            retry: GraphqlRetryPolicy::new(retry_max_attempts, retry_base_delay_ms),
        })
    }

    pub(super) async fn list_scope_comments(
        &self,
        repo: &RepoRef,
        scope: CommentScope,
    ) -> Result<Vec<DiscussionCommentNode>> {
        let query = scope.comments_query();
        match scope {
            CommentScope::Discussion { number } => {
                let data: DiscussionCommentsData = self
                    .execute(
                        "list discussion comments",
                        query,
                        json!({
                            "owner": repo.owner,
                            "repo": repo.name,
                            "discussionNumber": number,
                            "first": DISCUSSION_COMMENTS_PAGE_SIZE,
                        }),
                    )
                    .await?;
                let repository = data
                    .repository
                    .ok_or_else(|| anyhow!("repository {} not found", repo.as_slug()))?;
                let discussion = repository.discussion.ok_or_else(|| {
                    anyhow!("discussion #{number} not found in {}", repo.as_slug())
                })?;
                Ok(collect_comment_nodes(discussion.comments))
            }
            CommentScope::Repository => {
                let data: RepositoryDiscussionCommentsData = self
                    .execute(
                        "list repository discussion comments",
                        query,
                        json!({
                            "owner": repo.owner,
                            "repo": repo.name,
                            "first": DISCUSSION_COMMENTS_PAGE_SIZE,
                        }),
                    )
                    .await?;
                let repository = data
                    .repository
                    .ok_or_else(|| anyhow!("repository {} not found", repo.as_slug()))?;
                Ok(collect_comment_nodes(repository.discussion_comments))
            }
        }
    }

    pub(super) async fn fetch_reply_to(&self, comment_id: &str) -> Result<Option<CommentReference>> {
        let data: CommentReplyToData = self
            .execute(
                "fetch comment reply target",
                COMMENT_REPLY_TO_QUERY,
                json!({ "commentId": comment_id }),
            )
            .await?;
        let node = data
            .node
            .ok_or_else(|| anyhow!("comment node {comment_id} not found"))?;
        Ok(node.reply_to)
    }

    pub(super) async fn update_comment(
        &self,
        comment_id: &str,
        body: &str,
    ) -> Result<UpdatedDiscussionComment> {
        let data: UpdateDiscussionCommentData = self
            .execute(
                "update discussion comment",
                UPDATE_DISCUSSION_COMMENT_MUTATION,
                json!({ "commentId": comment_id, "body": body }),
            )
            .await?;
        data.update_discussion_comment
            .and_then(|payload| payload.comment)
            .ok_or_else(|| anyhow!("update discussion comment returned no comment"))
    }

    async fn execute<T>(&self, operation: &str, query: &str, variables: Value) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let payload = json!({ "query": query, "variables": variables });
        let mut attempt = 0_usize;
        loop {
            attempt = attempt.saturating_add(1);
            let response = self
                .http
                .post(&self.endpoint)
                .header("x-unfurl-retry-attempt", attempt.saturating_sub(1).to_string())
                .json(&payload)
                .send()
                .await;
            match response {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let envelope = response
                            .json::<GraphqlEnvelope<T>>()
                            .await
                            .with_context(|| format!("failed to decode github graphql {operation}"))?;
                        if !envelope.errors.is_empty() {
                            bail!(
                                "github graphql {operation} returned errors: {}",
                                describe_graphql_errors(&envelope.errors)
                            );
                        }
                        return envelope
                            .data
                            .ok_or_else(|| anyhow!("github graphql {operation} returned no data"));
                    }

                    let server_wait = rate_limit_wait(response.headers());
                    let retry = self
                        .retry
                        .should_retry_status(attempt, status.as_u16(), response.headers());
                    let body = response.text().await.unwrap_or_default();
                    if retry {
                        tracing::debug!(
                            operation,
                            attempt,
                            status = status.as_u16(),
                            "retrying github graphql request"
                        );
                        tokio::time::sleep(self.retry.backoff(attempt, server_wait)).await;
                        continue;
                    }

                    bail!(
                        "github graphql {operation} failed with status {}: {}",
                        status.as_u16(),
                        truncate_error_body(&body, 800)
                    );
                }
                Err(error) => {
                    if self.retry.should_retry_transport(attempt, &error) {
                        tokio::time::sleep(self.retry.backoff(attempt, None)).await;
                        continue;
                    }
                    return Err(error)
                        .with_context(|| format!("github graphql {operation} request failed"));
                }
            }
        }
    }
}
