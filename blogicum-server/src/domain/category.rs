use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::publishable::Publishable;
use super::validation::{bounded_text, non_empty_text, positive_id};

pub(crate) const MAX_CATEGORY_TITLE_CHARS: usize = 256;
pub(crate) const MAX_SLUG_CHARS: usize = 64;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Category {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) slug: String,
    pub(crate) is_published: bool,
    pub(crate) created_at: DateTime<Utc>,
}

impl Category {
    pub(crate) fn new(
        id: i64,
        title: impl Into<String>,
        description: impl Into<String>,
        slug: impl Into<String>,
        is_published: bool,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        positive_id("id", id)?;
        Ok(Self {
            id,
            title: normalize_title(&title.into())?,
            description: non_empty_text("description", &description.into())?,
            slug: normalize_slug(&slug.into())?,
            is_published,
            created_at,
        })
    }
}

impl Publishable for Category {
    fn is_published(&self) -> bool {
        self.is_published
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Editable fields of a category, used for both create and update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CategoryRequest {
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) slug: String,
    pub(crate) is_published: bool,
}

impl CategoryRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            title: normalize_title(&self.title)?,
            description: non_empty_text("description", &self.description)?,
            slug: normalize_slug(&self.slug)?,
            is_published: self.is_published,
        })
    }
}

fn normalize_title(title: &str) -> Result<String, DomainError> {
    bounded_text("title", title, MAX_CATEGORY_TITLE_CHARS, "must be 1..256 chars")
}

/// Slugs are URL identifiers: latin letters, digits, hyphen and underscore.
pub(crate) fn normalize_slug(slug: &str) -> Result<String, DomainError> {
    let slug = bounded_text("slug", slug, MAX_SLUG_CHARS, "must be 1..64 chars")?;
    if !slug
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
    {
        return Err(DomainError::Validation {
            field: "slug",
            message: "may contain only latin letters, digits, '-' and '_'",
        });
    }
    Ok(slug)
}
