use httpmock::prelude::*;
use serde_json::json;
use unfurl_discussions::discussion_comment::CommentScope;
use unfurl_discussions::unfurl_footer::{count_unfurl_footer_blocks, strip_unfurl_footer};
use unfurl_discussions_runtime::{RepoRef, UnfurlOutcome, UnfurlRuntime, UnfurlRuntimeConfig};

const COMMENT_NODE_ID: &str = "DC_kwDOroundtrip";
const COMMENT_DATABASE_ID: u64 = 9001;

fn runtime_config(graphql: &MockServer, comment_body: &str) -> UnfurlRuntimeConfig {
    UnfurlRuntimeConfig {
        graphql_url: format!("{}/graphql", graphql.base_url()),
        token: "integration-token".to_string(),
        user_agent: "unfurl-integration".to_string(),
        repo: RepoRef::parse("owner/repo").expect("repo"),
        scope: CommentScope::Discussion { number: 3 },
        comment_database_id: COMMENT_DATABASE_ID,
        comment_body: Some(comment_body.to_string()),
        request_timeout_ms: 3_000,
        retry_max_attempts: 1,
        retry_base_delay_ms: 1,
        fetch_timeout_ms: 3_000,
        fetch_concurrency: 2,
        max_page_bytes: 64 * 1024,
        dry_run: false,
        skip_unchanged: true,
        allow_replies: false,
    }
}

fn mock_comment_lookup(graphql: &MockServer, stored_body: &str) {
    graphql.mock(|when, then| {
        when.method(POST)
            .path("/graphql")
            .body_includes("query DiscussionComments(");
        then.status(200).json_body(json!({
            "data": {"repository": {"discussion": {"comments": {"nodes": [
                {"id": COMMENT_NODE_ID, "databaseId": COMMENT_DATABASE_ID, "body": stored_body}
            ]}}}}
        }));
    });
    graphql.mock(|when, then| {
        when.method(POST)
            .path("/graphql")
            .body_includes("query CommentReplyTo(");
        then.status(200)
            .json_body(json!({"data": {"node": {"replyTo": null}}}));
    });
    graphql.mock(|when, then| {
        when.method(POST)
            .path("/graphql")
            .body_includes("mutation UpdateDiscussionComment(");
        then.status(200).json_body(json!({
            "data": {"updateDiscussionComment": {"comment": {"id": COMMENT_NODE_ID, "body": "stored"}}}
        }));
    });
}

async fn run_once(event_body: &str, stored_body: &str) -> UnfurlOutcome {
    let graphql = MockServer::start();
    mock_comment_lookup(&graphql, stored_body);
    UnfurlRuntime::new(runtime_config(&graphql, event_body))
        .expect("runtime")
        .run()
        .await
        .expect("run")
}

#[tokio::test]
async fn integration_create_edit_and_rerun_keep_one_current_footer() {
    let pages = MockServer::start();
    pages.mock(|when, then| {
        when.method(GET).path("/first");
        then.status(200)
            .body("<html><head><title>First Page</title></head></html>");
    });
    pages.mock(|when, then| {
        when.method(GET).path("/second");
        then.status(200)
            .body(r#"<html><head><meta property="og:title" content="Second Page"></head></html>"#);
    });

    let created = format!("Read {}/first please", pages.base_url());
    let first = run_once(&created, &created).await;
    let UnfurlOutcome::Updated { body: first_body, preview_count, .. } = &first else {
        panic!("expected update, got {first:?}");
    };
    assert_eq!(*preview_count, 1);
    assert_eq!(count_unfurl_footer_blocks(&first_body), 1);
    assert!(first_body.contains("> **First Page**"));

    let edited = format!(
        "{}\nand also {}/second",
        strip_unfurl_footer(&first_body),
        pages.base_url()
    );
    let footer = first_body
        .strip_prefix(created.as_str())
        .expect("footer follows content")
        .trim();
    let edited_event_body = format!("{edited}\n\n{footer}");
    let second = run_once(&edited_event_body, first_body).await;
    let UnfurlOutcome::Updated { body: second_body, preview_count, .. } = &second else {
        panic!("expected update, got {second:?}");
    };
    assert_eq!(*preview_count, 2);
    assert_eq!(count_unfurl_footer_blocks(&second_body), 1);
    assert!(second_body.starts_with(edited.as_str()));
    let first_index = second_body.find("> **First Page**").expect("first preview");
    let second_index = second_body.find("> **Second Page**").expect("second preview");
    assert!(first_index < second_index);

    let rerun = run_once(second_body, second_body).await;
    assert_eq!(
        rerun,
        UnfurlOutcome::Unchanged {
            comment_id: COMMENT_NODE_ID.to_string()
        }
    );
}
