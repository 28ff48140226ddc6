use std::time::Duration;

use reqwest::header::{HeaderMap, RETRY_AFTER};
use serde_json::Value;

const MAX_BACKOFF_MS: u64 = 30_000;
const MAX_RATE_LIMIT_WAIT: Duration = Duration::from_secs(60);
const RATE_LIMIT_REMAINING_HEADER: &str = "x-ratelimit-remaining";

/// Server-requested wait from `Retry-After`, clamped to one minute.
pub fn rate_limit_wait(headers: &HeaderMap) -> Option<Duration> {
    let raw = headers.get(RETRY_AFTER)?.to_str().ok()?;
    let seconds = raw.trim().parse::<u64>().ok()?;
    Some(Duration::from_secs(seconds).min(MAX_RATE_LIMIT_WAIT))
}

/// GitHub signals throttling with 429, and with 403 for secondary or exhausted limits.
pub fn is_rate_limited(status: u16, headers: &HeaderMap) -> bool {
    match status {
        429 => true,
        403 => {
            headers.contains_key(RETRY_AFTER)
                || headers
                    .get(RATE_LIMIT_REMAINING_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .is_some_and(|remaining| remaining.trim() == "0")
        }
        _ => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Attempt budget and backoff for GraphQL calls.
pub struct GraphqlRetryPolicy {
    pub max_attempts: usize,
    pub base_delay_ms: u64,
}

impl GraphqlRetryPolicy {
    pub fn new(max_attempts: usize, base_delay_ms: u64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay_ms: base_delay_ms.max(1),
        }
    }

    fn has_attempts_left(&self, attempt: usize) -> bool {
        attempt < self.max_attempts
    }

    /// Whether a non-success response on `attempt` (1-based) is tried again.
    pub fn should_retry_status(&self, attempt: usize, status: u16, headers: &HeaderMap) -> bool {
        self.has_attempts_left(attempt) && (status >= 500 || is_rate_limited(status, headers))
    }

    pub fn should_retry_transport(&self, attempt: usize, error: &reqwest::Error) -> bool {
        self.has_attempts_left(attempt) && (error.is_timeout() || error.is_connect())
    }

    /// Delay before the attempt following `attempt`.
    pub fn backoff(&self, attempt: usize, server_wait: Option<Duration>) -> Duration {
        let floor = Duration::from_millis(self.base_delay_ms);
        if let Some(wait) = server_wait {
            return wait.max(floor);
        }
        let exponent = attempt.saturating_sub(1).min(10) as u32;
        let scaled = self
            .base_delay_ms
            .saturating_mul(2_u64.saturating_pow(exponent));
        Duration::from_millis(scaled.min(MAX_BACKOFF_MS))
    }
}

/// Shorten a response body for an error message without splitting a character.
pub fn truncate_error_body(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Summarize a GraphQL `errors` array as `TYPE: message` of the first entry,
/// plus a count of the rest.
pub fn describe_graphql_errors(errors: &[Value]) -> String {
    let Some(first) = errors.first() else {
        return "unknown graphql error".to_string();
    };
    let message = first
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("unknown graphql error");
    let error_type = first
        .get("type")
        .or_else(|| first.get("extensions").and_then(|ext| ext.get("code")))
        .and_then(Value::as_str);
    let mut summary = match error_type {
        Some(error_type) => format!("{error_type}: {message}"),
        None => message.to_string(),
    };
    if errors.len() > 1 {
        summary.push_str(&format!(" (+{} more)", errors.len() - 1));
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::{
        describe_graphql_errors, is_rate_limited, rate_limit_wait, truncate_error_body,
        GraphqlRetryPolicy,
    };
    use reqwest::header::{HeaderMap, HeaderValue, RETRY_AFTER};
    use serde_json::json;
    use std::time::Duration;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for &(name, value) in pairs {
            map.insert(name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn functional_secondary_rate_limit_403_is_retried_after_server_wait() {
        let policy = GraphqlRetryPolicy::new(3, 500);
        let throttled = headers(&[("retry-after", "2")]);
        assert!(is_rate_limited(403, &throttled));
        assert!(policy.should_retry_status(1, 403, &throttled));
        assert_eq!(
            policy.backoff(1, rate_limit_wait(&throttled)),
            Duration::from_secs(2)
        );
    }

    #[test]
    fn functional_exhausted_primary_limit_403_is_retried() {
        let policy = GraphqlRetryPolicy::new(2, 100);
        let exhausted = headers(&[("x-ratelimit-remaining", "0")]);
        assert!(policy.should_retry_status(1, 403, &exhausted));
        assert_eq!(policy.backoff(1, rate_limit_wait(&exhausted)), Duration::from_millis(100));
    }

    #[test]
    fn regression_permission_denied_403_is_not_retried() {
        let policy = GraphqlRetryPolicy::new(3, 100);
        let plain = headers(&[("x-ratelimit-remaining", "4999")]);
        assert!(!is_rate_limited(403, &plain));
        assert!(!policy.should_retry_status(1, 403, &plain));
        assert!(!policy.should_retry_status(1, 401, &HeaderMap::new()));
    }

    #[test]
    fn unit_bad_gateway_retries_until_attempt_budget_is_spent() {
        let policy = GraphqlRetryPolicy::new(3, 250);
        let none = HeaderMap::new();
        assert!(policy.should_retry_status(1, 502, &none));
        assert!(policy.should_retry_status(2, 502, &none));
        assert!(!policy.should_retry_status(3, 502, &none));
        assert_eq!(policy.backoff(1, None), Duration::from_millis(250));
        assert_eq!(policy.backoff(2, None), Duration::from_millis(500));
    }

    #[test]
    fn regression_backoff_and_server_wait_are_bounded() {
        let policy = GraphqlRetryPolicy::new(20, 4_000);
        assert_eq!(policy.backoff(12, None), Duration::from_millis(30_000));

        let mut slow = HeaderMap::new();
        slow.insert(RETRY_AFTER, HeaderValue::from_static("3600"));
        assert_eq!(rate_limit_wait(&slow), Some(Duration::from_secs(60)));

        slow.insert(RETRY_AFTER, HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"));
        assert_eq!(rate_limit_wait(&slow), None);
    }

    #[test]
    fn unit_retry_policy_clamps_zero_settings() {
        let policy = GraphqlRetryPolicy::new(0, 0);
        assert_eq!(policy.max_attempts, 1);
        assert!(!policy.should_retry_status(1, 503, &HeaderMap::new()));
        assert_eq!(policy.backoff(1, Some(Duration::ZERO)), Duration::from_millis(1));
    }

    #[test]
    fn regression_truncate_error_body_shortens_html_error_pages() {
        let page = "  <html><body>Unicorn! 🦄 This page is taking too long</body></html>\n";
        assert_eq!(truncate_error_body(page, 22), "<html><body>Unicorn! 🦄...");
        assert_eq!(
            truncate_error_body(r#"{"message":"Bad credentials"}"#, 200),
            r#"{"message":"Bad credentials"}"#
        );
    }

    #[test]
    fn functional_describe_graphql_errors_reads_type_and_extension_code() {
        let typed = vec![json!({"type": "NOT_FOUND", "message": "Could not resolve"})];
        assert_eq!(
            describe_graphql_errors(&typed),
            "NOT_FOUND: Could not resolve"
        );

        let coded = vec![
            json!({"message": "Bad credentials", "extensions": {"code": "UNAUTHENTICATED"}}),
            json!({"message": "second"}),
        ];
        assert_eq!(
            describe_graphql_errors(&coded),
            "UNAUTHENTICATED: Bad credentials (+1 more)"
        );
    }

    #[test]
    fn regression_describe_graphql_errors_handles_empty_and_untyped_entries() {
        assert_eq!(describe_graphql_errors(&[]), "unknown graphql error");
        assert_eq!(
            describe_graphql_errors(&[json!({"message": "boom"})]),
            "boom"
        );
    }
}
