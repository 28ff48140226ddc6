use anyhow::{bail, Result};
use unfurl_discussions::discussion_comment::CommentScope;
use unfurl_discussions_runtime::{RepoRef, UnfurlRuntimeConfig};

use crate::cli_args::Cli;

fn resolve_repo_ref(cli: &Cli) -> Result<RepoRef> {
    let fallback = cli
        .github_repository
        .as_deref()
        .filter(|raw| !raw.trim().is_empty())
        .map(RepoRef::parse)
        .transpose()?;
    let owner = cli
        .repo_owner
        .as_deref()
        .or(fallback.as_ref().map(|repo| repo.owner.as_str()));
    let name = cli
        .repo_name
        .as_deref()
        .or(fallback.as_ref().map(|repo| repo.name.as_str()));
    match (owner, name) {
        (Some(owner), Some(name)) => RepoRef::new(owner, name),
        _ => bail!(
            "repository is required: set --repo-owner/--repo-name (REPO_OWNER/REPO_NAME) or --github-repository (GITHUB_REPOSITORY)"
        ),
    }
}

fn resolve_token(cli: &Cli) -> Result<String> {
    let supplied = [cli.github_token.as_deref(), cli.gh_token.as_deref()];
    if let Some(token) = supplied
        .iter()
        .flatten()
        .map(|token| token.trim())
        .find(|token| !token.is_empty())
    {
        return Ok(token.to_string());
    }
    if supplied.iter().any(Option::is_some) {
        bail!("github token is empty: set --github-token (GITHUB_TOKEN) or GH_TOKEN");
    }
    bail!("github token is required: set --github-token (GITHUB_TOKEN) or GH_TOKEN")
}

/// Resolve parsed CLI/env input into the immutable runtime configuration.
pub(crate) fn build_runtime_config(cli: Cli) -> Result<UnfurlRuntimeConfig> {
    let token = resolve_token(&cli)?;
    let repo = resolve_repo_ref(&cli)?;
    Ok(UnfurlRuntimeConfig {
        graphql_url: cli.graphql_url,
        token,
        user_agent: cli.user_agent,
        repo,
        scope: CommentScope::from_discussion_number(cli.discussion_number),
        comment_database_id: cli.comment_id,
        comment_body: cli.comment_body,
        request_timeout_ms: cli.request_timeout_ms,
        retry_max_attempts: cli.retry_max_attempts,
        retry_base_delay_ms: cli.retry_base_delay_ms,
        fetch_timeout_ms: cli.fetch_timeout_ms,
        fetch_concurrency: cli.fetch_concurrency,
        max_page_bytes: cli.max_page_bytes,
        dry_run: cli.dry_run,
        skip_unchanged: cli.skip_unchanged,
        allow_replies: cli.allow_replies,
    })
}
