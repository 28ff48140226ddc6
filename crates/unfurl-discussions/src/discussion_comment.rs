use serde::Deserialize;

/// GitHub caps a single connection page at 100 nodes.
pub const DISCUSSION_COMMENTS_PAGE_SIZE: u32 = 100;

pub const DISCUSSION_COMMENTS_QUERY: &str = r#"
query DiscussionComments($owner: String!, $repo: String!, $discussionNumber: Int!, $first: Int!) {
  repository(owner: $owner, name: $repo) {
    discussion(number: $discussionNumber) {
      comments(first: $first) {
        nodes {
          id
          databaseId
          body
        }
      }
    }
  }
}
"#;

pub const REPOSITORY_DISCUSSION_COMMENTS_QUERY: &str = r#"
query RepositoryDiscussionComments($owner: String!, $repo: String!, $first: Int!) {
  repository(owner: $owner, name: $repo) {
    discussionComments(first: $first) {
      nodes {
        id
        databaseId
        body
      }
    }
  }
}
"#;

pub const COMMENT_REPLY_TO_QUERY: &str = r#"
query CommentReplyTo($commentId: ID!) {
  node(id: $commentId) {
    ... on DiscussionComment {
      replyTo {
        id
      }
    }
  }
}
"#;

pub const UPDATE_DISCUSSION_COMMENT_MUTATION: &str = r#"
mutation UpdateDiscussionComment($commentId: ID!, $body: String!) {
  updateDiscussionComment(input: {commentId: $commentId, body: $body}) {
    comment {
      id
      body
    }
  }
}
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Where the comment list is read from.
pub enum CommentScope {
    /// Comments of a single discussion, addressed by its number.
    Discussion { number: u64 },
    /// The repository-wide discussion comment connection.
    Repository,
}

impl CommentScope {
    pub fn from_discussion_number(number: Option<u64>) -> Self {
        match number {
            Some(number) => Self::Discussion { number },
            None => Self::Repository,
        }
    }

    pub fn comments_query(&self) -> &'static str {
        match self {
            Self::Discussion { .. } => DISCUSSION_COMMENTS_QUERY,
            Self::Repository => REPOSITORY_DISCUSSION_COMMENTS_QUERY,
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::Discussion { number } => format!("discussion #{number}"),
            Self::Repository => "repository discussions".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscussionCommentNode {
    pub id: String,
    #[serde(default)]
    pub database_id: Option<u64>,
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiscussionCommentConnection {
    #[serde(default)]
    pub nodes: Vec<Option<DiscussionCommentNode>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiscussionCommentsData {
    pub repository: Option<DiscussionCommentsRepository>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiscussionCommentsRepository {
    pub discussion: Option<DiscussionWithComments>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiscussionWithComments {
    pub comments: DiscussionCommentConnection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryDiscussionCommentsData {
    pub repository: Option<RepositoryDiscussionComments>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryDiscussionComments {
    pub discussion_comments: DiscussionCommentConnection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentReplyToData {
    pub node: Option<CommentReplyToNode>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentReplyToNode {
    #[serde(default)]
    pub reply_to: Option<CommentReference>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommentReference {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDiscussionCommentData {
    pub update_discussion_comment: Option<UpdateDiscussionCommentPayload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateDiscussionCommentPayload {
    pub comment: Option<UpdatedDiscussionComment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdatedDiscussionComment {
    pub id: String,
    #[serde(default)]
    pub body: String,
}

/// Drop null entries from a connection page.
pub fn collect_comment_nodes(connection: DiscussionCommentConnection) -> Vec<DiscussionCommentNode> {
    connection.nodes.into_iter().flatten().collect()
}

pub fn find_comment_by_database_id(
    comments: &[DiscussionCommentNode],
    database_id: u64,
) -> Option<&DiscussionCommentNode> {
    comments
        .iter()
        .find(|comment| comment.database_id == Some(database_id))
}
