//! Raw rows as returned by queries, before mapping into external shapes.
//!
//! Column names follow storage (snake_case); `mapper` owns the translation.

/// One project left-joined to its owner. Owner columns are all `None` when
/// the join found no match.
#[derive(Debug, Clone, Default, sqlx::FromRow)]
pub struct ProjectRow {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub image: String,
    pub live_site_url: Option<String>,
    pub github_url: Option<String>,
    pub category: String,
    pub user_id: Option<i64>,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub user_avatar_url: Option<String>,
}

#[derive(Debug, Clone, Default, sqlx::FromRow)]
pub struct UserRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub avatar_url: String,
    pub description: Option<String>,
    pub github_url: Option<String>,
    pub linkedin_url: Option<String>,
}
