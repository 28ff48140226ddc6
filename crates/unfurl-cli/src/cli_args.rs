use clap::{ArgAction, Parser};
use unfurl_discussions_runtime::{DEFAULT_GRAPHQL_URL, DEFAULT_USER_AGENT};

fn parse_positive_usize(value: &str) -> Result<usize, String> {
    let parsed = value
        .parse::<usize>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

fn parse_positive_u64(value: &str) -> Result<u64, String> {
    let parsed = value
        .parse::<u64>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

#[derive(Debug, Parser)]
#[command(
    name = "unfurl-bot",
    about = "Append link previews to a GitHub discussion comment",
    version
)]
pub(crate) struct Cli {
    #[arg(
        long = "github-token",
        env = "GITHUB_TOKEN",
        hide_env_values = true,
        help = "GitHub token used to authorize GraphQL requests; GH_TOKEN is read when unset"
    )]
    pub github_token: Option<String>,

    #[arg(long = "gh-token", env = "GH_TOKEN", hide = true, hide_env_values = true)]
    pub gh_token: Option<String>,

    #[arg(
        long = "comment-id",
        env = "COMMENT_ID_NUMERIC",
        help = "Numeric database id of the discussion comment to unfurl"
    )]
    pub comment_id: u64,

    #[arg(
        long = "comment-body",
        env = "COMMENT_BODY",
        help = "Comment body delivered with the triggering event; the fetched body is used when omitted"
    )]
    pub comment_body: Option<String>,

    #[arg(
        long = "repo-owner",
        env = "REPO_OWNER",
        help = "Repository owner; falls back to the owner in GITHUB_REPOSITORY"
    )]
    pub repo_owner: Option<String>,

    #[arg(
        long = "repo-name",
        env = "REPO_NAME",
        help = "Repository name; falls back to the name in GITHUB_REPOSITORY"
    )]
    pub repo_name: Option<String>,

    #[arg(
        long = "github-repository",
        env = "GITHUB_REPOSITORY",
        help = "Repository in owner/repo format, as exported by the Actions runner"
    )]
    pub github_repository: Option<String>,

    #[arg(
        long = "discussion-number",
        env = "DISCUSSION_NUMBER",
        help = "Discussion number scoping the comment lookup; the repository-wide comment list is used when omitted"
    )]
    pub discussion_number: Option<u64>,

    #[arg(
        long = "graphql-url",
        env = "GITHUB_GRAPHQL_URL",
        default_value = DEFAULT_GRAPHQL_URL,
        help = "GitHub GraphQL endpoint"
    )]
    pub graphql_url: String,

    #[arg(
        long = "user-agent",
        env = "UNFURL_USER_AGENT",
        default_value = DEFAULT_USER_AGENT,
        help = "User-Agent sent to GitHub and to unfurled pages"
    )]
    pub user_agent: String,

    #[arg(
        long = "request-timeout-ms",
        env = "UNFURL_REQUEST_TIMEOUT_MS",
        default_value_t = 15_000,
        value_parser = parse_positive_u64,
        help = "Timeout in milliseconds for each GraphQL request"
    )]
    pub request_timeout_ms: u64,

    #[arg(
        long = "retry-max-attempts",
        env = "UNFURL_RETRY_MAX_ATTEMPTS",
        default_value_t = 3,
        value_parser = parse_positive_usize,
        help = "Maximum attempts for retryable GraphQL failures (429, 5xx, timeouts)"
    )]
    pub retry_max_attempts: usize,

    #[arg(
        long = "retry-base-delay-ms",
        env = "UNFURL_RETRY_BASE_DELAY_MS",
        default_value_t = 500,
        value_parser = parse_positive_u64,
        help = "Base delay in milliseconds for exponential GraphQL retry backoff"
    )]
    pub retry_base_delay_ms: u64,

    #[arg(
        long = "fetch-timeout-ms",
        env = "UNFURL_FETCH_TIMEOUT_MS",
        default_value_t = 10_000,
        value_parser = parse_positive_u64,
        help = "Timeout in milliseconds for fetching each unfurled page"
    )]
    pub fetch_timeout_ms: u64,

    #[arg(
        long = "fetch-concurrency",
        env = "UNFURL_FETCH_CONCURRENCY",
        default_value_t = 1,
        value_parser = parse_positive_usize,
        help = "Number of pages fetched at once; previews keep the order URLs appear in"
    )]
    pub fetch_concurrency: usize,

    #[arg(
        long = "max-page-bytes",
        env = "UNFURL_MAX_PAGE_BYTES",
        default_value_t = 2 * 1024 * 1024,
        value_parser = parse_positive_usize,
        help = "Maximum bytes read from each page before title extraction"
    )]
    pub max_page_bytes: usize,

    #[arg(
        long = "dry-run",
        env = "UNFURL_DRY_RUN",
        default_value_t = false,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        help = "Print the rendered body to stdout instead of updating the comment"
    )]
    pub dry_run: bool,

    #[arg(
        long = "skip-unchanged",
        env = "UNFURL_SKIP_UNCHANGED",
        default_value_t = false,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        help = "Skip the update when the rendered body equals the current comment body"
    )]
    pub skip_unchanged: bool,

    #[arg(
        long = "allow-replies",
        env = "UNFURL_ALLOW_REPLIES",
        default_value_t = false,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        help = "Unfurl threaded replies too instead of skipping them"
    )]
    pub allow_replies: bool,
}
