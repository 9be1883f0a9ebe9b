//! HTTP transport for the feed, speaking the `getProjects` GraphQL query.
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::json;
use std::fmt;
use tracing::{debug, warn};

use crate::auth::API_KEY_HEADER;
use crate::config::Config;
use crate::error::ShowcaseError;
use crate::feed::{FeedRequest, FeedTransport};
use crate::model::Project;

pub const GET_PROJECTS_QUERY: &str = "query GetProjects($category: String, $first: Int, $after: String) { \
     getProjects(category: $category, first: $first, after: $after) { \
     id title description image liveSiteUrl githubUrl category \
     createdBy { id name email avatarUrl } } }";

#[derive(Clone)]
pub struct HttpFeedClient {
    http: Client,
    endpoint: Url,
    api_key: String,
}

impl fmt::Debug for HttpFeedClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpFeedClient")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<FeedData>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeedData {
    get_projects: Vec<Project>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
    #[serde(default)]
    extensions: Option<GraphQlErrorExtensions>,
}

#[derive(Debug, Deserialize)]
struct GraphQlErrorExtensions {
    code: Option<String>,
}

impl HttpFeedClient {
    pub fn new(endpoint: &str, api_key: impl Into<String>) -> Result<Self, ShowcaseError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| ShowcaseError::Transport(format!("invalid GraphQL URL: {e}")))?;
        let http = Client::builder()
            .user_agent("showcase/0.1")
            .build()
            .map_err(|e| ShowcaseError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            endpoint,
            api_key: api_key.into(),
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self, ShowcaseError> {
        Self::new(&cfg.client.graphql_url, cfg.auth.api_key.clone())
    }

    pub fn build_request(&self, request: &FeedRequest) -> Result<reqwest::Request, ShowcaseError> {
        self.http
            .post(self.endpoint.clone())
            .header(API_KEY_HEADER, &self.api_key)
            .json(&json!({ "query": GET_PROJECTS_QUERY, "variables": request }))
            .build()
            .map_err(|e| ShowcaseError::Transport(e.to_string()))
    }
}

/// Decode a GraphQL response body into the page it carries.
pub fn decode_feed_response(body: &str) -> Result<Vec<Project>, ShowcaseError> {
    let payload: GraphQlResponse = serde_json::from_str(body)
        .map_err(|e| ShowcaseError::Transport(format!("invalid GraphQL response: {e}")))?;
    if let Some(err) = payload.errors.into_iter().next() {
        let code = err.extensions.and_then(|x| x.code);
        return Err(match code.as_deref() {
            Some("BAD_USER_INPUT") => ShowcaseError::Validation(err.message),
            Some("UNAUTHENTICATED") => ShowcaseError::Unauthorized,
            _ => ShowcaseError::Storage(err.message),
        });
    }
    payload
        .data
        .map(|d| d.get_projects)
        .ok_or_else(|| ShowcaseError::Transport("GraphQL response carried no data".into()))
}

#[async_trait]
impl FeedTransport for HttpFeedClient {
    async fn fetch_projects(&self, request: &FeedRequest) -> Result<Vec<Project>, ShowcaseError> {
        let req = self.build_request(request)?;
        debug!(url = %req.url(), ?request, "fetching feed page");
        let res = self
            .http
            .execute(req)
            .await
            .map_err(|e| ShowcaseError::Transport(e.to_string()))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| ShowcaseError::Transport(e.to_string()))?;
        if !status.is_success() {
            warn!(%status, body = %body, "feed request rejected");
            // The server still answers GraphQL errors as JSON for 4xx.
            return match decode_feed_response(&body) {
                Err(err @ (ShowcaseError::Validation(_) | ShowcaseError::Unauthorized)) => Err(err),
                _ => Err(ShowcaseError::Transport(format!("server returned {status}"))),
            };
        }
        decode_feed_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_request_sets_headers_and_variables() {
        let client = HttpFeedClient::new("http://127.0.0.1:3000/graphql", "secret").unwrap();
        let request = client
            .build_request(&FeedRequest {
                category: Some("Mobile".into()),
                first: 9,
                after: Some("12".into()),
            })
            .unwrap();
        assert_eq!(request.method(), reqwest::Method::POST);
        assert_eq!(request.url().path(), "/graphql");
        let headers = request.headers();
        assert_eq!(
            headers
                .get(API_KEY_HEADER)
                .and_then(|h| h.to_str().ok())
                .unwrap(),
            "secret"
        );
        assert_eq!(
            headers
                .get("content-type")
                .and_then(|h| h.to_str().ok())
                .unwrap(),
            "application/json"
        );

        let body: serde_json::Value =
            serde_json::from_slice(request.body().unwrap().as_bytes().unwrap()).unwrap();
        assert_eq!(body["variables"]["category"], "Mobile");
        assert_eq!(body["variables"]["first"], 9);
        assert_eq!(body["variables"]["after"], "12");
        assert!(body["query"].as_str().unwrap().contains("getProjects"));
    }

    #[test]
    fn rejects_invalid_endpoint() {
        assert!(matches!(
            HttpFeedClient::new("not a url", "k"),
            Err(ShowcaseError::Transport(_))
        ));
    }

    #[test]
    fn decodes_page() {
        let body = r#"{"data":{"getProjects":[{"id":"3","title":"Demo","description":"",
            "image":"https://cdn/3.png","liveSiteUrl":null,"githubUrl":null,"category":"Mobile",
            "createdBy":{"id":"1","name":"Ada","email":"ada@example.com","avatarUrl":"https://cdn/a.png"}}]}}"#;
        let page = decode_feed_response(body).unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, "3");
        assert_eq!(page[0].created_by.name, "Ada");
    }

    #[test]
    fn maps_error_codes() {
        let body = r#"{"data":null,"errors":[{"message":"Cursor ID is invalid","extensions":{"code":"BAD_USER_INPUT"}}]}"#;
        assert_eq!(
            decode_feed_response(body).unwrap_err(),
            ShowcaseError::validation("Cursor ID is invalid")
        );

        let body = r#"{"data":null,"errors":[{"message":"An error occurred while fetching the projects","extensions":{"code":"INTERNAL_SERVER_ERROR"}}]}"#;
        assert!(matches!(
            decode_feed_response(body),
            Err(ShowcaseError::Storage(_))
        ));

        assert!(matches!(
            decode_feed_response("<html>"),
            Err(ShowcaseError::Transport(_))
        ));
    }
}
