//! GitHub Discussions client
//!
//! Discussions are only reachable through the GraphQL API. Repository and
//! discussion-category node ids are resolved once in [`GithubDiscussions::connect`],
//! so the constructed client is immutable and can be shared across
//! concurrent reconciliations.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::error::{SyncError, SyncResult};
use crate::store::{DiscussionRef, DiscussionStore};

const GITHUB_GRAPHQL_URL: &str = "https://api.github.com/graphql";

const CONNECT_QUERY: &str = r#"
query($owner: String!, $name: String!) {
  repository(owner: $owner, name: $name) {
    id
    discussionCategories(first: 25) {
      nodes { id name }
    }
  }
}
"#;

const LIST_QUERY: &str = r#"
query($repositoryId: ID!, $categoryId: ID!, $cursor: String) {
  node(id: $repositoryId) {
    ... on Repository {
      discussions(first: 100, after: $cursor, categoryId: $categoryId) {
        nodes { id url }
        pageInfo { hasNextPage endCursor }
      }
    }
  }
}
"#;

const CREATE_MUTATION: &str = r#"
mutation($repositoryId: ID!, $categoryId: ID!, $title: String!, $body: String!) {
  createDiscussion(input: {repositoryId: $repositoryId, categoryId: $categoryId, title: $title, body: $body}) {
    discussion { id url }
  }
}
"#;

const UPDATE_MUTATION: &str = r#"
mutation($discussionId: ID!, $body: String!) {
  updateDiscussion(input: {discussionId: $discussionId, body: $body}) {
    discussion { id url }
  }
}
"#;

pub struct GithubDiscussions {
    client: reqwest::Client,
    token: String,
    repository_id: String,
    category_id: String,
}

impl GithubDiscussions {
    /// Resolve repository and category node ids and return a ready client.
    pub async fn connect(
        token: String,
        owner: &str,
        repo: &str,
        category: &str,
    ) -> SyncResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("tks-sync/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        let data: RepositoryData = graphql(
            &client,
            &token,
            CONNECT_QUERY,
            json!({ "owner": owner, "name": repo }),
        )
        .await?;

        let repository = data.repository.ok_or_else(|| {
            SyncError::Discussion(format!("repository {}/{} not found", owner, repo))
        })?;

        let category_id = repository
            .discussion_categories
            .nodes
            .into_iter()
            .find(|c| c.name == category)
            .map(|c| c.id)
            .ok_or_else(|| {
                SyncError::Discussion(format!(
                    "discussion category '{}' not found in {}/{}",
                    category, owner, repo
                ))
            })?;

        debug!(repository = %repository.id, category = %category_id, "Resolved GitHub node ids");

        Ok(Self {
            client,
            token,
            repository_id: repository.id,
            category_id,
        })
    }
}

#[async_trait]
impl DiscussionStore for GithubDiscussions {
    async fn list_all(&self) -> SyncResult<Vec<DiscussionRef>> {
        let mut discussions = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let data: NodeData = graphql(
                &self.client,
                &self.token,
                LIST_QUERY,
                json!({
                    "repositoryId": self.repository_id,
                    "categoryId": self.category_id,
                    "cursor": cursor,
                }),
            )
            .await?;

            let page = data
                .node
                .ok_or_else(|| {
                    SyncError::Discussion("repository node not found while listing".to_string())
                })?
                .discussions;

            discussions.extend(
                page.nodes
                    .into_iter()
                    .map(|n| DiscussionRef { id: n.id, url: n.url }),
            );

            if !page.page_info.has_next_page {
                break;
            }
            cursor = page.page_info.end_cursor;
        }

        debug!(count = discussions.len(), "Fetched discussion list");

        Ok(discussions)
    }

    async fn create(&self, title: &str, body: &str) -> SyncResult<DiscussionRef> {
        let data: CreateData = graphql(
            &self.client,
            &self.token,
            CREATE_MUTATION,
            json!({
                "repositoryId": self.repository_id,
                "categoryId": self.category_id,
                "title": title,
                "body": body,
            }),
        )
        .await?;

        let discussion = data
            .create_discussion
            .and_then(|p| p.discussion)
            .ok_or_else(|| {
                SyncError::Discussion(format!("createDiscussion returned no discussion for '{}'", title))
            })?;

        debug!(id = %discussion.id, url = %discussion.url, "Created discussion");

        Ok(DiscussionRef {
            id: discussion.id,
            url: discussion.url,
        })
    }

    async fn update(&self, discussion_id: &str, body: &str) -> SyncResult<()> {
        let data: UpdateData = graphql(
            &self.client,
            &self.token,
            UPDATE_MUTATION,
            json!({
                "discussionId": discussion_id,
                "body": body,
            }),
        )
        .await?;

        if data.update_discussion.and_then(|p| p.discussion).is_none() {
            return Err(SyncError::Discussion(format!(
                "updateDiscussion returned no discussion for {}",
                discussion_id
            )));
        }

        debug!(id = %discussion_id, "Updated discussion body");

        Ok(())
    }
}

/// Send one GraphQL request and unwrap its `data` payload.
async fn graphql<T: serde::de::DeserializeOwned>(
    client: &reqwest::Client,
    token: &str,
    query: &str,
    variables: serde_json::Value,
) -> SyncResult<T> {
    let response = client
        .post(GITHUB_GRAPHQL_URL)
        .bearer_auth(token)
        .json(&json!({ "query": query, "variables": variables }))
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(SyncError::Discussion(format!(
            "GitHub API returned {}",
            response.status()
        )));
    }

    let body: GraphQlResponse<T> = response.json().await?;

    if let Some(error) = body.errors.first() {
        return Err(SyncError::Discussion(format!(
            "GitHub GraphQL error: {}",
            error.message
        )));
    }

    body.data
        .ok_or_else(|| SyncError::Discussion("GitHub GraphQL response had no data".to_string()))
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct RepositoryData {
    repository: Option<Repository>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Repository {
    id: String,
    discussion_categories: CategoryConnection,
}

#[derive(Debug, Deserialize)]
struct CategoryConnection {
    nodes: Vec<Category>,
}

#[derive(Debug, Deserialize)]
struct Category {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct NodeData {
    node: Option<DiscussionsNode>,
}

#[derive(Debug, Deserialize)]
struct DiscussionsNode {
    discussions: DiscussionConnection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DiscussionConnection {
    nodes: Vec<DiscussionNode>,
    page_info: PageInfo,
}

#[derive(Debug, Deserialize)]
struct DiscussionNode {
    id: String,
    url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    has_next_page: bool,
    end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateData {
    create_discussion: Option<DiscussionPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateData {
    update_discussion: Option<DiscussionPayload>,
}

#[derive(Debug, Deserialize)]
struct DiscussionPayload {
    discussion: Option<DiscussionNode>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_discussion_page() {
        let raw = r#"{
            "data": {
                "node": {
                    "discussions": {
                        "nodes": [
                            {"id": "D_abc", "url": "https://github.com/example/help/discussions/1"}
                        ],
                        "pageInfo": {"hasNextPage": true, "endCursor": "Y3Vyc29y"}
                    }
                }
            }
        }"#;

        let parsed: GraphQlResponse<NodeData> = serde_json::from_str(raw).unwrap();
        let page = parsed.data.unwrap().node.unwrap().discussions;
        assert_eq!(page.nodes.len(), 1);
        assert_eq!(page.nodes[0].id, "D_abc");
        assert!(page.page_info.has_next_page);
        assert_eq!(page.page_info.end_cursor.as_deref(), Some("Y3Vyc29y"));
    }

    #[test]
    fn deserializes_repository_with_categories() {
        let raw = r#"{
            "data": {
                "repository": {
                    "id": "R_abc",
                    "discussionCategories": {
                        "nodes": [
                            {"id": "DIC_1", "name": "General"},
                            {"id": "DIC_2", "name": "Troubleshooting"}
                        ]
                    }
                }
            }
        }"#;

        let parsed: GraphQlResponse<RepositoryData> = serde_json::from_str(raw).unwrap();
        let repository = parsed.data.unwrap().repository.unwrap();
        assert_eq!(repository.id, "R_abc");
        assert_eq!(repository.discussion_categories.nodes[1].name, "Troubleshooting");
    }

    #[test]
    fn surfaces_graphql_errors() {
        let raw = r#"{
            "data": null,
            "errors": [{"message": "Could not resolve to a Repository"}]
        }"#;

        let parsed: GraphQlResponse<RepositoryData> = serde_json::from_str(raw).unwrap();
        assert!(parsed.data.is_none());
        assert_eq!(parsed.errors[0].message, "Could not resolve to a Repository");
    }

    #[tokio::test]
    #[ignore] // Requires network access and credentials - run with: cargo test -- --ignored
    async fn list_live_discussions() {
        // Needs TKS_GITHUB_TOKEN, TKS_GITHUB_REPOSITORY (owner/name), and
        // TKS_DISCUSSION_CATEGORY pointing at a real repository.
        let token = std::env::var("TKS_GITHUB_TOKEN").expect("TKS_GITHUB_TOKEN not set");
        let repository = std::env::var("TKS_GITHUB_REPOSITORY").expect("TKS_GITHUB_REPOSITORY not set");
        let category = std::env::var("TKS_DISCUSSION_CATEGORY").expect("TKS_DISCUSSION_CATEGORY not set");
        let (owner, repo) = repository.split_once('/').expect("repository must be owner/name");

        let client = GithubDiscussions::connect(token, owner, repo, &category)
            .await
            .expect("connect failed");

        let discussions = client.list_all().await.expect("list failed");
        for discussion in &discussions {
            assert!(discussion.url.starts_with("https://"));
        }
    }
}
