use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    body::Bytes,
    extract::{Multipart, Query, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::AppState;
use crate::auth::{self, Session, SignInProfile};
use crate::db;
use crate::error::ShowcaseError;
use crate::media::MediaUpload;
use crate::model::{Project, ProjectPatch};
use crate::validate::parse_id;

/// Executes a GraphQL request with the caller's session, if any, attached.
pub async fn graphql_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let mut request = req.into_inner();
    if let Some(session) = auth::session_from_headers(&headers) {
        request = request.data(session);
    }
    state.schema.execute(request).await.into()
}

pub async fn sign_in(
    State(state): State<AppState>,
    Json(profile): Json<SignInProfile>,
) -> Result<Json<Session>, ShowcaseError> {
    let session = auth::sign_in(&state.pool, &profile).await?;
    Ok(Json(session))
}

pub async fn user_id(headers: HeaderMap) -> Result<Json<Value>, ShowcaseError> {
    let session = auth::session_from_headers(&headers).ok_or(ShowcaseError::Unauthorized)?;
    Ok(Json(json!({ "userId": session.user_id })))
}

pub async fn user_projects(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ShowcaseError> {
    let session = auth::session_from_headers(&headers).ok_or(ShowcaseError::Unauthorized)?;
    let projects = db::projects_by_creator(&state.pool, session.user_id()?).await?;
    Ok(Json(json!({ "projects": projects })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadParams {
    file_name: Option<String>,
}

pub async fn upload(
    State(state): State<AppState>,
    Query(params): Query<UploadParams>,
    body: Bytes,
) -> Result<Json<MediaUpload>, ShowcaseError> {
    if body.is_empty() {
        return Err(ShowcaseError::validation("No file provided"));
    }
    let file_name = params
        .file_name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| "upload".to_string());
    info!(file_name = %file_name, size = body.len(), "forwarding upload");
    let upload = state.media.upload(&file_name, body.to_vec()).await?;
    Ok(Json(upload))
}

/// Text fields and optional replacement image of the edit-project form.
#[derive(Debug, Default)]
struct EditProjectForm {
    id: Option<String>,
    patch: ProjectPatch,
    file: Option<(String, Bytes)>,
}

impl EditProjectForm {
    async fn read(multipart: &mut Multipart) -> Result<Self, ShowcaseError> {
        let invalid = |_| ShowcaseError::validation("Invalid form data");
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await.map_err(invalid)? {
            let name = field.name().unwrap_or_default().to_string();
            if name == "file" {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let bytes = field.bytes().await.map_err(invalid)?;
                if !bytes.is_empty() {
                    form.file = Some((file_name, bytes));
                }
                continue;
            }
            let value = field.text().await.map_err(invalid)?;
            match name.as_str() {
                "id" => form.id = Some(value),
                "title" => form.patch.title = Some(value),
                "description" => form.patch.description = Some(value),
                "liveSiteUrl" => form.patch.live_site_url = Some(value),
                "githubUrl" => form.patch.github_url = Some(value),
                "category" => form.patch.category = Some(value),
                other => debug!(field = other, "ignoring unknown form field"),
            }
        }
        Ok(form)
    }
}

/// Form-based project edit. A `file` part replaces the image through the
/// media store before the update is applied.
pub async fn edit_project(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<Project>, ShowcaseError> {
    let session = auth::session_from_headers(&headers).ok_or(ShowcaseError::Unauthorized)?;
    let user_id = session.user_id()?;
    let form = EditProjectForm::read(&mut multipart).await?;
    let id = form
        .id
        .as_deref()
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ShowcaseError::validation("Project ID is required"))?;
    let id = parse_id(id, "Project")?;
    auth::ensure_project_owner(&state.pool, id, user_id).await?;

    let mut patch = form.patch;
    if let Some((file_name, bytes)) = form.file {
        let upload = state.media.upload(&file_name, bytes.to_vec()).await?;
        patch.image = Some(upload.url);
    }
    let project = db::update_project(&state.pool, id, &patch).await?;
    info!(id, "project edited");
    Ok(Json(project))
}

pub async fn health() -> &'static str {
    "ok"
}

/// Readiness: the store must answer a query.
pub async fn db_health(State(state): State<AppState>) -> Result<Json<Value>, ShowcaseError> {
    let server_time = db::server_time(&state.pool).await?;
    Ok(Json(json!({
        "message": "Database connection successful",
        "serverTime": server_time,
    })))
}
