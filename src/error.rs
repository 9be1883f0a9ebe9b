//! Error taxonomy shared by the repository, the GraphQL resolvers, the HTTP
//! routes and the client-side feed.
use async_graphql::ErrorExtensions;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ShowcaseError {
    /// Bad caller input.
    #[error("{0}")]
    Validation(String),

    /// Referenced entity is absent.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Missing session, or a session acting on something it does not own.
    #[error("Unauthorized")]
    Unauthorized,

    /// Connection or query failure. Carries a generic message only.
    #[error("{0}")]
    Storage(String),

    /// Failure reaching the service boundary.
    #[error("transport error: {0}")]
    Transport(String),
}

impl ShowcaseError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ShowcaseError::Validation(msg.into())
    }

    /// Stable machine-readable code, also used as the GraphQL extension.
    pub fn code(&self) -> &'static str {
        match self {
            ShowcaseError::Validation(_) => "BAD_USER_INPUT",
            ShowcaseError::NotFound(_) => "NOT_FOUND",
            ShowcaseError::Unauthorized => "UNAUTHENTICATED",
            ShowcaseError::Storage(_) => "INTERNAL_SERVER_ERROR",
            ShowcaseError::Transport(_) => "BAD_GATEWAY",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ShowcaseError::Validation(_) => StatusCode::BAD_REQUEST,
            ShowcaseError::NotFound(_) => StatusCode::NOT_FOUND,
            ShowcaseError::Unauthorized => StatusCode::UNAUTHORIZED,
            ShowcaseError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ShowcaseError::Transport(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

/// Returns a mapper that logs a driver error with context and replaces it by a
/// generic storage error, so query text never reaches callers.
///
/// `action` completes the sentence "An error occurred while ...".
pub fn storage(action: &'static str) -> impl FnOnce(sqlx::Error) -> ShowcaseError {
    move |err| {
        error!(?err, action, "storage failure");
        ShowcaseError::Storage(format!("An error occurred while {action}"))
    }
}

impl ErrorExtensions for ShowcaseError {
    fn extend(&self) -> async_graphql::Error {
        async_graphql::Error::new(self.to_string()).extend_with(|_, e| e.set("code", self.code()))
    }
}

impl IntoResponse for ShowcaseError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_mapper_hides_driver_text() {
        let err = storage("fetching the projects")(sqlx::Error::RowNotFound);
        assert_eq!(
            err.to_string(),
            "An error occurred while fetching the projects"
        );
        assert_eq!(err.code(), "INTERNAL_SERVER_ERROR");
    }

    #[test]
    fn status_codes() {
        assert_eq!(
            ShowcaseError::validation("bad").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ShowcaseError::NotFound("Project").status(), StatusCode::NOT_FOUND);
        assert_eq!(ShowcaseError::NotFound("Project").to_string(), "Project not found");
        assert_eq!(ShowcaseError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ShowcaseError::Transport("down".into()).status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn graphql_extension_carries_code() {
        let gql = ShowcaseError::validation("Title must be between 3 and 100 characters").extend();
        assert_eq!(gql.message, "Title must be between 3 and 100 characters");
        let ext = gql.extensions.expect("extensions set");
        assert_eq!(
            ext.get("code"),
            Some(&async_graphql::Value::String("BAD_USER_INPUT".into()))
        );
    }
}
