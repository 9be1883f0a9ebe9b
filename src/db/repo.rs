use chrono::Utc;
use sqlx::Row;
use tracing::{debug, info, instrument};

use super::mapper::{map_project, map_user};
use super::model::{ProjectRow, UserRow};
use super::pool::Pool;
use super::query::{self, FeedQuery};
use crate::error::{storage, ShowcaseError};
use crate::model::{NewProject, NewUser, Project, ProjectPatch, User, UserPatch};
use crate::validate;

type Result<T> = std::result::Result<T, ShowcaseError>;

/// One feed page. At most `feed.limit` projects, newest first.
#[instrument(skip_all, fields(category = ?feed.category, after = ?feed.after, limit = feed.limit))]
pub async fn fetch_projects_page(pool: &Pool, feed: &FeedQuery) -> Result<Vec<Project>> {
    let mut qb = feed.build()?;
    let mut conn = pool
        .acquire()
        .await
        .map_err(storage("fetching the projects"))?;
    let rows = qb
        .build_query_as::<ProjectRow>()
        .fetch_all(&mut *conn)
        .await
        .map_err(storage("fetching the projects"))?;
    debug!(rows = rows.len(), "feed page fetched");
    Ok(rows.into_iter().map(map_project).collect())
}

#[instrument(skip_all, fields(id = id))]
pub async fn project_by_id(pool: &Pool, id: i64) -> Result<Option<Project>> {
    let mut conn = pool
        .acquire()
        .await
        .map_err(storage("fetching the project details"))?;
    let row = query::project_by_id(id)
        .build_query_as::<ProjectRow>()
        .fetch_optional(&mut *conn)
        .await
        .map_err(storage("fetching the project details"))?;
    Ok(row.map(map_project))
}

#[instrument(skip_all, fields(creator_id = creator_id))]
pub async fn projects_by_creator(pool: &Pool, creator_id: i64) -> Result<Vec<Project>> {
    let mut conn = pool
        .acquire()
        .await
        .map_err(storage("fetching the projects"))?;
    let rows = query::projects_by_creator(creator_id)
        .build_query_as::<ProjectRow>()
        .fetch_all(&mut *conn)
        .await
        .map_err(storage("fetching the projects"))?;
    Ok(rows.into_iter().map(map_project).collect())
}

/// Owner of a project; `None` for an orphaned project.
#[instrument(skip_all, fields(id = id))]
pub async fn project_owner(pool: &Pool, id: i64) -> Result<Option<i64>> {
    let mut conn = pool
        .acquire()
        .await
        .map_err(storage("fetching the project details"))?;
    let row = sqlx::query("SELECT created_by FROM projects WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(storage("fetching the project details"))?;
    let Some(row) = row else {
        return Err(ShowcaseError::NotFound("Project"));
    };
    Ok(row.get::<Option<i64>, _>("created_by"))
}

#[instrument(skip_all)]
pub async fn create_project(pool: &Pool, input: &NewProject) -> Result<Project> {
    validate::new_project(input)?;
    let creator_id = validate::parse_id(&input.creator_id, "Creator")?;

    let mut conn = pool
        .acquire()
        .await
        .map_err(storage("creating the project"))?;
    let creator = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE id = ?")
        .bind(creator_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(storage("creating the project"))?;
    if creator.is_none() {
        return Err(ShowcaseError::NotFound("Creator"));
    }

    let rec = sqlx::query(
        "INSERT INTO projects (title, description, image, live_site_url, github_url, category, created_by) \
         VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(&input.title)
    .bind(&input.description)
    .bind(&input.image)
    .bind(&input.live_site_url)
    .bind(&input.github_url)
    .bind(&input.category)
    .bind(creator_id)
    .fetch_one(&mut *conn)
    .await
    .map_err(storage("creating the project"))?;
    let id: i64 = rec.get("id");

    let row = query::project_by_id(id)
        .build_query_as::<ProjectRow>()
        .fetch_one(&mut *conn)
        .await
        .map_err(storage("creating the project"))?;
    info!(id, creator_id, "project created");
    Ok(map_project(row))
}

#[instrument(skip_all, fields(id = id))]
pub async fn update_project(pool: &Pool, id: i64, patch: &ProjectPatch) -> Result<Project> {
    validate::project_patch(patch)?;
    let mut qb = query::update_project(id, patch, Utc::now())?;

    let mut conn = pool
        .acquire()
        .await
        .map_err(storage("updating the project"))?;
    let updated = qb
        .build()
        .fetch_optional(&mut *conn)
        .await
        .map_err(storage("updating the project"))?;
    if updated.is_none() {
        return Err(ShowcaseError::NotFound("Project"));
    }

    let row = query::project_by_id(id)
        .build_query_as::<ProjectRow>()
        .fetch_one(&mut *conn)
        .await
        .map_err(storage("updating the project"))?;
    info!(id, "project updated");
    Ok(map_project(row))
}

#[instrument(skip_all, fields(id = id))]
pub async fn delete_project(pool: &Pool, id: i64) -> Result<bool> {
    let mut conn = pool
        .acquire()
        .await
        .map_err(storage("deleting the project"))?;
    let deleted = sqlx::query("DELETE FROM projects WHERE id = ? RETURNING id")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(storage("deleting the project"))?;
    if deleted.is_none() {
        return Err(ShowcaseError::NotFound("Project"));
    }
    info!(id, "project deleted");
    Ok(true)
}

#[instrument(skip_all)]
pub async fn create_user(pool: &Pool, input: &NewUser) -> Result<User> {
    validate::new_user(input)?;

    let mut conn = pool
        .acquire()
        .await
        .map_err(storage("creating the user"))?;
    let existing = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE email = ?")
        .bind(&input.email)
        .fetch_optional(&mut *conn)
        .await
        .map_err(storage("creating the user"))?;
    if existing.is_some() {
        return Err(ShowcaseError::validation(
            "User with this email already exists",
        ));
    }

    let row = sqlx::query_as::<_, UserRow>(
        "INSERT INTO users (name, email, avatar_url) VALUES (?, ?, ?) \
         RETURNING id, name, email, avatar_url, description, github_url, linkedin_url",
    )
    .bind(&input.name)
    .bind(&input.email)
    .bind(&input.avatar_url)
    .fetch_one(&mut *conn)
    .await
    .map_err(storage("creating the user"))?;
    info!(id = row.id, "user created");
    Ok(map_user(row))
}

#[instrument(skip_all, fields(id = id))]
pub async fn user_by_id(pool: &Pool, id: i64) -> Result<Option<User>> {
    let mut conn = pool
        .acquire()
        .await
        .map_err(storage("fetching the user"))?;
    let row = query::user_by_id(id)
        .build_query_as::<UserRow>()
        .fetch_optional(&mut *conn)
        .await
        .map_err(storage("fetching the user"))?;
    Ok(row.map(map_user))
}

#[instrument(skip_all)]
pub async fn user_by_email(pool: &Pool, email: &str) -> Result<Option<User>> {
    if email.trim().is_empty() {
        return Err(ShowcaseError::validation("Invalid or missing email"));
    }
    let mut conn = pool
        .acquire()
        .await
        .map_err(storage("fetching the user"))?;
    let row = query::user_by_email(email)
        .build_query_as::<UserRow>()
        .fetch_optional(&mut *conn)
        .await
        .map_err(storage("fetching the user"))?;
    Ok(row.map(map_user))
}

#[instrument(skip_all, fields(id = id))]
pub async fn update_user(pool: &Pool, id: i64, patch: &UserPatch) -> Result<User> {
    validate::user_patch(patch)?;
    let mut qb = query::update_user(id, patch)?;

    let mut conn = pool
        .acquire()
        .await
        .map_err(storage("updating the user"))?;
    let updated = qb
        .build()
        .fetch_optional(&mut *conn)
        .await
        .map_err(storage("updating the user"))?;
    if updated.is_none() {
        return Err(ShowcaseError::NotFound("User"));
    }
    let row = query::user_by_id(id)
        .build_query_as::<UserRow>()
        .fetch_one(&mut *conn)
        .await
        .map_err(storage("updating the user"))?;
    Ok(map_user(row))
}

/// Look a user up by email, creating it on first sign-in.
#[instrument(skip_all)]
pub async fn get_or_create_user(pool: &Pool, input: &NewUser) -> Result<User> {
    if let Some(user) = user_by_email(pool, &input.email).await? {
        return Ok(user);
    }
    create_user(pool, input).await
}

/// Round-trips a trivial query to confirm the store answers; returns its clock.
#[instrument(skip_all)]
pub async fn server_time(pool: &Pool) -> Result<String> {
    let mut conn = pool
        .acquire()
        .await
        .map_err(storage("checking the database connection"))?;
    sqlx::query_scalar::<_, String>("SELECT datetime('now')")
        .fetch_one(&mut *conn)
        .await
        .map_err(storage("checking the database connection"))
}
