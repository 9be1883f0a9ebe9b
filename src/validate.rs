//! Field rules applied before any mutation touches storage.
use crate::error::ShowcaseError;
use crate::model::{Category, NewProject, NewUser, ProjectPatch, UserPatch};

pub const TITLE_MIN: usize = 3;
pub const TITLE_MAX: usize = 100;
pub const DESCRIPTION_MAX: usize = 1000;
pub const NAME_MIN: usize = 2;
pub const NAME_MAX: usize = 100;

type Result<T> = std::result::Result<T, ShowcaseError>;

fn title(title: &str) -> Result<()> {
    let len = title.chars().count();
    if !(TITLE_MIN..=TITLE_MAX).contains(&len) {
        return Err(ShowcaseError::validation(
            "Title must be between 3 and 100 characters",
        ));
    }
    Ok(())
}

fn description(description: &str) -> Result<()> {
    if description.chars().count() > DESCRIPTION_MAX {
        return Err(ShowcaseError::validation(
            "Description must not exceed 1000 characters",
        ));
    }
    Ok(())
}

fn category(category: &str) -> Result<()> {
    if category.trim().is_empty() {
        return Err(ShowcaseError::validation("Category is required."));
    }
    if Category::parse_category(category).is_none() {
        return Err(ShowcaseError::validation(format!(
            "Unknown category: {category}"
        )));
    }
    Ok(())
}

fn live_site_url(url: &str) -> Result<()> {
    if url.trim().is_empty() {
        return Err(ShowcaseError::validation("Live Site URL is required."));
    }
    Ok(())
}

fn image(url: &str) -> Result<()> {
    if url.trim().is_empty() {
        return Err(ShowcaseError::validation("Image is required."));
    }
    Ok(())
}

fn name(name: &str) -> Result<()> {
    let len = name.chars().count();
    if !(NAME_MIN..=NAME_MAX).contains(&len) {
        return Err(ShowcaseError::validation(
            "Name must be between 2 and 100 characters",
        ));
    }
    Ok(())
}

/// Parse an externally surfaced identifier back into its storage form.
pub fn parse_id(raw: &str, what: &'static str) -> Result<i64> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ShowcaseError::validation(format!("{what} ID is invalid")))
}

pub fn new_project(input: &NewProject) -> Result<()> {
    title(&input.title)?;
    if let Some(d) = input.description.as_deref() {
        description(d)?;
    }
    live_site_url(&input.live_site_url)?;
    image(&input.image)?;
    category(&input.category)
}

pub fn project_patch(patch: &ProjectPatch) -> Result<()> {
    if let Some(t) = patch.title.as_deref() {
        title(t)?;
    }
    if let Some(d) = patch.description.as_deref() {
        description(d)?;
    }
    if let Some(u) = patch.live_site_url.as_deref() {
        live_site_url(u)?;
    }
    if let Some(i) = patch.image.as_deref() {
        image(i)?;
    }
    if let Some(c) = patch.category.as_deref() {
        category(c)?;
    }
    Ok(())
}

pub fn new_user(input: &NewUser) -> Result<()> {
    name(&input.name)?;
    if !input.email.contains('@') {
        return Err(ShowcaseError::validation("Invalid email address"));
    }
    Ok(())
}

pub fn user_patch(patch: &UserPatch) -> Result<()> {
    if let Some(n) = patch.name.as_deref() {
        name(n)?;
    }
    Ok(())
}
