//! Session handling at the boundary with the external auth provider.
//!
//! The provider authenticates the user and calls `sign_in`; afterwards it
//! forwards the session on every request as `x-user-*` headers.
use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::db::{self, Pool};
use crate::error::ShowcaseError;
use crate::model::{NewUser, User};
use crate::validate;

pub const API_KEY_HEADER: &str = "x-api-key";
pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_EMAIL_HEADER: &str = "x-user-email";
pub const USER_NAME_HEADER: &str = "x-user-name";
pub const USER_AVATAR_HEADER: &str = "x-user-avatar";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: String,
    pub email: String,
    pub name: String,
    pub avatar_image: String,
}

impl Session {
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            avatar_image: user.avatar_url.clone(),
        }
    }

    pub fn user_id(&self) -> Result<i64, ShowcaseError> {
        validate::parse_id(&self.user_id, "User")
    }
}

/// Profile handed over by the auth provider after a successful login.
#[derive(Debug, Clone, Deserialize)]
pub struct SignInProfile {
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// The session carried by a request, if any. A user id is mandatory.
pub fn session_from_headers(headers: &HeaderMap) -> Option<Session> {
    let user_id = header(headers, USER_ID_HEADER)?;
    Some(Session {
        user_id: user_id.to_string(),
        email: header(headers, USER_EMAIL_HEADER).unwrap_or_default().to_string(),
        name: header(headers, USER_NAME_HEADER).unwrap_or_default().to_string(),
        avatar_image: header(headers, USER_AVATAR_HEADER)
            .unwrap_or_default()
            .to_string(),
    })
}

pub fn api_key_matches(headers: &HeaderMap, expected: &str) -> bool {
    header(headers, API_KEY_HEADER) == Some(expected)
}

pub fn require_session(session: Option<&Session>) -> Result<&Session, ShowcaseError> {
    session.ok_or(ShowcaseError::Unauthorized)
}

/// The session user must own project `project_id`. Orphaned projects belong
/// to nobody.
pub async fn ensure_project_owner(
    pool: &Pool,
    project_id: i64,
    user_id: i64,
) -> Result<(), ShowcaseError> {
    match db::project_owner(pool, project_id).await? {
        Some(owner) if owner == user_id => Ok(()),
        owner => {
            warn!(project_id, user_id, ?owner, "project ownership check failed");
            Err(ShowcaseError::Unauthorized)
        }
    }
}

/// Resolve the stored user for a fresh login, creating it the first time.
pub async fn sign_in(pool: &Pool, profile: &SignInProfile) -> Result<Session, ShowcaseError> {
    let user = db::get_or_create_user(
        pool,
        &NewUser {
            name: profile.name.clone(),
            email: profile.email.clone(),
            avatar_url: profile.image.clone().unwrap_or_default(),
        },
    )
    .await?;
    info!(user_id = %user.id, "signed in");
    Ok(Session::from_user(&user))
}
