//! Row mapper: storage rows to external entities.
use super::model::{ProjectRow, UserRow};
use crate::model::{OwnerSummary, Project, User};

/// Avatar used when a project's owner record is missing.
pub const DEFAULT_AVATAR_URL: &str = "https://example.com/default-avatar.jpg";

pub fn map_project(row: ProjectRow) -> Project {
    // An orphaned project keeps rendering with placeholder owner fields.
    let created_by = OwnerSummary {
        id: row.user_id.map(|id| id.to_string()).unwrap_or_default(),
        name: row.user_name.unwrap_or_default(),
        email: row.user_email.unwrap_or_default(),
        avatar_url: row
            .user_avatar_url
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_AVATAR_URL.to_string()),
    };

    Project {
        id: row.id.to_string(),
        title: row.title,
        description: row.description.unwrap_or_default(),
        image: row.image,
        live_site_url: row.live_site_url,
        github_url: row.github_url,
        category: row.category,
        created_by,
    }
}

pub fn map_user(row: UserRow) -> User {
    User {
        id: row.id.to_string(),
        name: row.name,
        email: row.email,
        avatar_url: row.avatar_url,
        description: row.description,
        github_url: row.github_url,
        linkedin_url: row.linkedin_url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> ProjectRow {
        ProjectRow {
            id: 12,
            title: "Weather app".into(),
            description: Some("Forecasts".into()),
            image: "https://cdn/w.png".into(),
            live_site_url: Some("https://weather.dev".into()),
            github_url: None,
            category: "Mobile".into(),
            user_id: Some(3),
            user_name: Some("Ada".into()),
            user_email: Some("ada@example.com".into()),
            user_avatar_url: Some("https://cdn/ada.png".into()),
        }
    }

    #[test]
    fn maps_every_field() {
        let p = map_project(row());
        assert_eq!(p.id, "12");
        assert_eq!(p.title, "Weather app");
        assert_eq!(p.description, "Forecasts");
        assert_eq!(p.image, "https://cdn/w.png");
        assert_eq!(p.live_site_url.as_deref(), Some("https://weather.dev"));
        assert_eq!(p.github_url, None);
        assert_eq!(p.category, "Mobile");
        assert_eq!(
            p.created_by,
            OwnerSummary {
                id: "3".into(),
                name: "Ada".into(),
                email: "ada@example.com".into(),
                avatar_url: "https://cdn/ada.png".into(),
            }
        );
    }

    #[test]
    fn orphan_gets_placeholder_owner() {
        let mut r = row();
        r.user_id = None;
        r.user_name = None;
        r.user_email = None;
        r.user_avatar_url = None;
        r.description = None;
        let p = map_project(r);
        assert_eq!(p.description, "");
        assert_eq!(
            p.created_by,
            OwnerSummary {
                id: String::new(),
                name: String::new(),
                email: String::new(),
                avatar_url: DEFAULT_AVATAR_URL.into(),
            }
        );
    }

    #[test]
    fn maps_user() {
        let u = map_user(UserRow {
            id: 5,
            name: "Lin".into(),
            email: "lin@example.com".into(),
            avatar_url: "https://cdn/lin.png".into(),
            description: None,
            github_url: Some("https://github.com/lin".into()),
            linkedin_url: None,
        });
        assert_eq!(u.id, "5");
        assert_eq!(u.github_url.as_deref(), Some("https://github.com/lin"));
    }
}
