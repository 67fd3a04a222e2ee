use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::publishable::Publishable;
use super::validation::{bounded_text, positive_id};

pub(crate) const MAX_LOCATION_NAME_CHARS: usize = 256;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Location {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) is_published: bool,
    pub(crate) created_at: DateTime<Utc>,
}

impl Location {
    pub(crate) fn new(
        id: i64,
        name: impl Into<String>,
        is_published: bool,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        positive_id("id", id)?;
        Ok(Self {
            id,
            name: normalize_name(&name.into())?,
            is_published,
            created_at,
        })
    }
}

impl Publishable for Location {
    fn is_published(&self) -> bool {
        self.is_published
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct LocationRequest {
    pub(crate) name: String,
    pub(crate) is_published: bool,
}

impl LocationRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            name: normalize_name(&self.name)?,
            is_published: self.is_published,
        })
    }
}

fn normalize_name(name: &str) -> Result<String, DomainError> {
    bounded_text("name", name, MAX_LOCATION_NAME_CHARS, "must be 1..256 chars")
}
