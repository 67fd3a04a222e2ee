use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::ownership::Owned;
use super::validation::{non_empty_text, positive_id};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Comment {
    pub(crate) id: i64,
    pub(crate) text: String,
    pub(crate) post_id: i64,
    pub(crate) author_id: i64,
    pub(crate) created_at: DateTime<Utc>,
}

impl Comment {
    pub(crate) fn new(
        id: i64,
        text: impl Into<String>,
        post_id: i64,
        author_id: i64,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        positive_id("id", id)?;
        positive_id("post_id", post_id)?;
        positive_id("author_id", author_id)?;
        Ok(Self {
            id,
            text: non_empty_text("text", &text.into())?,
            post_id,
            author_id,
            created_at,
        })
    }
}

impl Owned for Comment {
    const KIND: &'static str = "comment";

    fn id(&self) -> i64 {
        self.id
    }

    fn author_id(&self) -> i64 {
        self.author_id
    }
}

#[derive(Debug, Clone)]
pub(crate) struct AuthoredComment {
    pub(crate) comment: Comment,
    pub(crate) author_username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CommentRequest {
    pub(crate) text: String,
}

impl CommentRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            text: non_empty_text("text", &self.text)?,
        })
    }
}
