use async_graphql::SimpleObject;
use serde::{Deserialize, Serialize};

/// Fixed set of project categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    FrontEnd,
    BackEnd,
    UiUx,
    Mobile,
    FullStack,
    GameDev,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::FrontEnd,
        Category::BackEnd,
        Category::UiUx,
        Category::Mobile,
        Category::FullStack,
        Category::GameDev,
    ];

    /// Label shown in the filter bar; selecting it clears the filter.
    pub const ALL_LABEL: &'static str = "All";

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::FrontEnd => "Front-end",
            Category::BackEnd => "Back-end",
            Category::UiUx => "UI/UX",
            Category::Mobile => "Mobile",
            Category::FullStack => "Full Stack",
            Category::GameDev => "Game Dev",
        }
    }

    pub fn parse_category(s: &str) -> Option<Self> {
        Category::ALL.into_iter().find(|c| c.as_str() == s)
    }

    /// Normalise a filter-bar selection: `All` and blank mean "no filter".
    pub fn filter_from_label(label: Option<&str>) -> Option<String> {
        label
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.eq_ignore_ascii_case(Self::ALL_LABEL))
            .map(str::to_string)
    }
}

/// Owner projection denormalised onto every project at read time.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct OwnerSummary {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar_url: String,
}

/// A project in its external shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image: String,
    pub live_site_url: Option<String>,
    pub github_url: Option<String>,
    pub category: String,
    pub created_by: OwnerSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar_url: String,
    pub description: Option<String>,
    pub github_url: Option<String>,
    pub linkedin_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewProject {
    pub title: String,
    pub description: Option<String>,
    pub image: String,
    pub live_site_url: String,
    pub github_url: Option<String>,
    pub category: String,
    pub creator_id: String,
}

/// Partial project update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub live_site_url: Option<String>,
    pub github_url: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub avatar_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub github_url: Option<String>,
    pub linkedin_url: Option<String>,
}
