use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::ownership::Owned;
use super::publishable::Publishable;
use super::validation::{bounded_text, non_empty_text, optional_positive_id, positive_id};

pub(crate) const MAX_POST_TITLE_CHARS: usize = 256;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Post {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) text: String,
    /// Publication instant; a future value schedules the post.
    pub(crate) pub_date: DateTime<Utc>,
    pub(crate) author_id: i64,
    pub(crate) location_id: Option<i64>,
    pub(crate) category_id: Option<i64>,
    pub(crate) is_published: bool,
    pub(crate) created_at: DateTime<Utc>,
}

/// Editable post fields. The author is always the requester and never part
/// of the form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct PostRequest {
    pub(crate) title: String,
    pub(crate) text: String,
    pub(crate) pub_date: DateTime<Utc>,
    pub(crate) location_id: Option<i64>,
    pub(crate) category_id: Option<i64>,
    pub(crate) is_published: bool,
}

impl PostRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        optional_positive_id("location_id", self.location_id)?;
        optional_positive_id("category_id", self.category_id)?;
        Ok(Self {
            title: normalize_title(&self.title)?,
            text: non_empty_text("text", &self.text)?,
            ..self
        })
    }
}

/// Row fields of a post as loaded from storage.
#[derive(Debug, Clone)]
pub(crate) struct PostFields {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) text: String,
    pub(crate) pub_date: DateTime<Utc>,
    pub(crate) author_id: i64,
    pub(crate) location_id: Option<i64>,
    pub(crate) category_id: Option<i64>,
    pub(crate) is_published: bool,
    pub(crate) created_at: DateTime<Utc>,
}

impl Post {
    pub(crate) fn new(fields: PostFields) -> Result<Self, DomainError> {
        positive_id("id", fields.id)?;
        positive_id("author_id", fields.author_id)?;
        optional_positive_id("location_id", fields.location_id)?;
        optional_positive_id("category_id", fields.category_id)?;

        Ok(Self {
            id: fields.id,
            title: normalize_title(&fields.title)?,
            text: non_empty_text("text", &fields.text)?,
            pub_date: fields.pub_date,
            author_id: fields.author_id,
            location_id: fields.location_id,
            category_id: fields.category_id,
            is_published: fields.is_published,
            created_at: fields.created_at,
        })
    }
}

impl Owned for Post {
    const KIND: &'static str = "post";

    fn id(&self) -> i64 {
        self.id
    }

    fn author_id(&self) -> i64 {
        self.author_id
    }
}

impl Publishable for Post {
    fn is_published(&self) -> bool {
        self.is_published
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CategoryRef {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) slug: String,
    pub(crate) is_published: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct LocationRef {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) is_published: bool,
}

/// A post joined with what listings display next to it.
#[derive(Debug, Clone)]
pub(crate) struct AnnotatedPost {
    pub(crate) post: Post,
    pub(crate) author_username: String,
    pub(crate) category: Option<CategoryRef>,
    pub(crate) location: Option<LocationRef>,
    pub(crate) comment_count: i64,
}

impl AnnotatedPost {
    pub(crate) fn category_published(&self) -> Option<bool> {
        self.category.as_ref().map(|category| category.is_published)
    }
}

fn normalize_title(title: &str) -> Result<String, DomainError> {
    bounded_text("title", title, MAX_POST_TITLE_CHARS, "must be 1..256 chars")
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::{DomainError, Post, PostFields, PostRequest};

    #[test]
    fn post_request_validate_rejects_empty_title() {
        let req = PostRequest {
            title: "   ".to_string(),
            ..valid_request()
        };

        let err = req.validate().expect_err("title must be rejected");
        assert_validation_field(err, "title");
    }

    #[test]
    fn post_request_validate_rejects_empty_text() {
        let req = PostRequest {
            text: "   ".to_string(),
            ..valid_request()
        };

        let err = req.validate().expect_err("text must be rejected");
        assert_validation_field(err, "text");
    }

    #[test]
    fn post_request_validate_rejects_non_positive_category() {
        let req = PostRequest {
            category_id: Some(0),
            ..valid_request()
        };

        let err = req.validate().expect_err("category_id must be rejected");
        assert_validation_field(err, "category_id");
    }

    #[test]
    fn post_request_validate_keeps_future_pub_date() {
        let tomorrow = Utc::now() + Duration::days(1);
        let req = PostRequest {
            title: "  title  ".to_string(),
            text: "  text  ".to_string(),
            pub_date: tomorrow,
            ..valid_request()
        };

        let validated = req.validate().expect("must validate");
        assert_eq!(validated.title, "title");
        assert_eq!(validated.text, "text");
        assert_eq!(validated.pub_date, tomorrow);
    }

    #[test]
    fn post_new_rejects_non_positive_author_id() {
        let now = Utc::now();
        let err = Post::new(PostFields {
            id: 1,
            title: "Title".to_string(),
            text: "Text".to_string(),
            pub_date: now,
            author_id: 0,
            location_id: None,
            category_id: None,
            is_published: true,
            created_at: now,
        })
        .expect_err("author_id must be > 0");
        assert_validation_field(err, "author_id");
    }

    fn valid_request() -> PostRequest {
        PostRequest {
            title: "title".to_string(),
            text: "text".to_string(),
            pub_date: Utc::now(),
            location_id: None,
            category_id: Some(1),
            is_published: true,
        }
    }

    fn assert_validation_field(err: DomainError, expected_field: &'static str) {
        match err {
            DomainError::Validation { field, .. } => assert_eq!(field, expected_field),
            _ => panic!("expected DomainError::Validation"),
        }
    }
}
