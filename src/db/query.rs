//! SQL construction for project reads and partial updates.
//!
//! Every caller-supplied value goes through `push_bind`; only fixed column
//! names from the field tables below are ever pushed as SQL text.
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite};

use crate::error::ShowcaseError;
use crate::model::{ProjectPatch, UserPatch};
use crate::validate;

const SELECT_PROJECTS: &str = "SELECT p.id, p.title, p.description, p.image, p.live_site_url, \
     p.github_url, p.category, \
     u.id AS user_id, u.name AS user_name, u.email AS user_email, u.avatar_url AS user_avatar_url \
     FROM projects p \
     LEFT JOIN users u ON p.created_by = u.id";

const SELECT_USERS: &str =
    "SELECT id, name, email, avatar_url, description, github_url, linkedin_url FROM users";

/// One feed page request in storage terms.
///
/// Pages run newest first: `ORDER BY id DESC` with `id < after` as the keyset
/// clause, so each page continues toward older projects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedQuery {
    pub category: Option<String>,
    pub after: Option<i64>,
    pub limit: i64,
}

impl FeedQuery {
    /// Build from the external request shape, parsing the string cursor.
    pub fn from_request(
        category: Option<&str>,
        first: i64,
        after: Option<&str>,
    ) -> Result<Self, ShowcaseError> {
        let after = after
            .filter(|a| !a.trim().is_empty())
            .map(|a| validate::parse_id(a, "Cursor"))
            .transpose()?;
        Ok(Self {
            category: category.map(str::to_string),
            after,
            limit: first,
        })
    }

    pub fn build(&self) -> Result<QueryBuilder<'static, Sqlite>, ShowcaseError> {
        if self.limit <= 0 {
            return Err(ShowcaseError::validation(
                "The \"first\" argument must be greater than 0",
            ));
        }
        if matches!(self.category.as_deref(), Some(c) if c.trim().is_empty()) {
            return Err(ShowcaseError::validation(
                "The \"category\" filter must not be empty",
            ));
        }

        let mut qb = QueryBuilder::new(SELECT_PROJECTS);
        if self.category.is_some() || self.after.is_some() {
            qb.push(" WHERE ");
            let mut conditions = qb.separated(" AND ");
            if let Some(category) = &self.category {
                conditions.push("p.category = ");
                conditions.push_bind_unseparated(category.clone());
            }
            if let Some(after) = self.after {
                conditions.push("p.id < ");
                conditions.push_bind_unseparated(after);
            }
        }
        qb.push(" ORDER BY p.id DESC LIMIT ");
        qb.push_bind(self.limit);
        Ok(qb)
    }
}

pub fn project_by_id(id: i64) -> QueryBuilder<'static, Sqlite> {
    let mut qb = QueryBuilder::new(SELECT_PROJECTS);
    qb.push(" WHERE p.id = ").push_bind(id);
    qb
}

pub fn projects_by_creator(creator_id: i64) -> QueryBuilder<'static, Sqlite> {
    let mut qb = QueryBuilder::new(SELECT_PROJECTS);
    qb.push(" WHERE p.created_by = ")
        .push_bind(creator_id)
        .push(" ORDER BY p.id DESC");
    qb
}

pub fn user_by_id(id: i64) -> QueryBuilder<'static, Sqlite> {
    let mut qb = QueryBuilder::new(SELECT_USERS);
    qb.push(" WHERE id = ").push_bind(id);
    qb
}

pub fn user_by_email(email: &str) -> QueryBuilder<'static, Sqlite> {
    let mut qb = QueryBuilder::new(SELECT_USERS);
    qb.push(" WHERE email = ").push_bind(email.to_string());
    qb
}

/// Updatable project fields and the column each one writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectField {
    Title,
    Description,
    Image,
    LiveSiteUrl,
    GithubUrl,
    Category,
}

impl ProjectField {
    pub const ALL: [ProjectField; 6] = [
        ProjectField::Title,
        ProjectField::Description,
        ProjectField::Image,
        ProjectField::LiveSiteUrl,
        ProjectField::GithubUrl,
        ProjectField::Category,
    ];

    pub fn column(self) -> &'static str {
        match self {
            ProjectField::Title => "title",
            ProjectField::Description => "description",
            ProjectField::Image => "image",
            ProjectField::LiveSiteUrl => "live_site_url",
            ProjectField::GithubUrl => "github_url",
            ProjectField::Category => "category",
        }
    }

    pub fn value(self, patch: &ProjectPatch) -> Option<&str> {
        match self {
            ProjectField::Title => patch.title.as_deref(),
            ProjectField::Description => patch.description.as_deref(),
            ProjectField::Image => patch.image.as_deref(),
            ProjectField::LiveSiteUrl => patch.live_site_url.as_deref(),
            ProjectField::GithubUrl => patch.github_url.as_deref(),
            ProjectField::Category => patch.category.as_deref(),
        }
    }
}

/// Updatable user fields and their columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserField {
    Name,
    Description,
    GithubUrl,
    LinkedinUrl,
}

impl UserField {
    pub const ALL: [UserField; 4] = [
        UserField::Name,
        UserField::Description,
        UserField::GithubUrl,
        UserField::LinkedinUrl,
    ];

    pub fn column(self) -> &'static str {
        match self {
            UserField::Name => "name",
            UserField::Description => "description",
            UserField::GithubUrl => "github_url",
            UserField::LinkedinUrl => "linkedin_url",
        }
    }

    pub fn value(self, patch: &UserPatch) -> Option<&str> {
        match self {
            UserField::Name => patch.name.as_deref(),
            UserField::Description => patch.description.as_deref(),
            UserField::GithubUrl => patch.github_url.as_deref(),
            UserField::LinkedinUrl => patch.linkedin_url.as_deref(),
        }
    }
}

/// `UPDATE projects SET ... WHERE id = ? RETURNING id`, or a validation error
/// when the patch carries no field.
pub fn update_project(
    id: i64,
    patch: &ProjectPatch,
    updated_at: DateTime<Utc>,
) -> Result<QueryBuilder<'static, Sqlite>, ShowcaseError> {
    let assignments: Vec<(&'static str, String)> = ProjectField::ALL
        .into_iter()
        .filter_map(|f| f.value(patch).map(|v| (f.column(), v.to_string())))
        .collect();
    if assignments.is_empty() {
        return Err(ShowcaseError::validation("No fields to update"));
    }

    let mut qb = QueryBuilder::new("UPDATE projects SET ");
    {
        let mut set = qb.separated(", ");
        for (column, value) in assignments {
            set.push(format!("{column} = "));
            set.push_bind_unseparated(value);
        }
        set.push("updated_at = ");
        set.push_bind_unseparated(updated_at);
    }
    qb.push(" WHERE id = ").push_bind(id).push(" RETURNING id");
    Ok(qb)
}

pub fn update_user(id: i64, patch: &UserPatch) -> Result<QueryBuilder<'static, Sqlite>, ShowcaseError> {
    let assignments: Vec<(&'static str, String)> = UserField::ALL
        .into_iter()
        .filter_map(|f| f.value(patch).map(|v| (f.column(), v.to_string())))
        .collect();
    if assignments.is_empty() {
        return Err(ShowcaseError::validation("No fields to update"));
    }

    let mut qb = QueryBuilder::new("UPDATE users SET ");
    {
        let mut set = qb.separated(", ");
        for (column, value) in assignments {
            set.push(format!("{column} = "));
            set.push_bind_unseparated(value);
        }
    }
    qb.push(" WHERE id = ").push_bind(id).push(" RETURNING id");
    Ok(qb)
}
