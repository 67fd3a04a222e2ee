use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::error::DomainError;
use crate::domain::post::{AnnotatedPost, Post};
use crate::domain::visibility::Visibility;

#[derive(Debug, Clone)]
pub(crate) struct NewPost {
    pub(crate) title: String,
    pub(crate) text: String,
    pub(crate) pub_date: DateTime<Utc>,
    pub(crate) author_id: i64,
    pub(crate) location_id: Option<i64>,
    pub(crate) category_id: Option<i64>,
    pub(crate) is_published: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct PostPatch {
    pub(crate) title: String,
    pub(crate) text: String,
    pub(crate) pub_date: DateTime<Utc>,
    pub(crate) location_id: Option<i64>,
    pub(crate) category_id: Option<i64>,
    pub(crate) is_published: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Pagination {
    pub(crate) page: u32,
    pub(crate) page_size: u32,
}

impl Pagination {
    pub(crate) fn limit(self) -> i64 {
        i64::from(self.page_size)
    }

    pub(crate) fn offset(self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.page_size)
    }
}

/// Filter for post listings.
#[derive(Debug, Clone)]
pub(crate) struct PostQuery {
    pub(crate) visibility: Visibility,
    pub(crate) now: DateTime<Utc>,
    pub(crate) category_slug: Option<String>,
    pub(crate) author_username: Option<String>,
}

impl PostQuery {
    pub(crate) fn new(visibility: Visibility, now: DateTime<Utc>) -> Self {
        Self {
            visibility,
            now,
            category_slug: None,
            author_username: None,
        }
    }

    pub(crate) fn in_category(mut self, slug: impl Into<String>) -> Self {
        self.category_slug = Some(slug.into());
        self
    }

    pub(crate) fn by_author(mut self, username: impl Into<String>) -> Self {
        self.author_username = Some(username.into());
        self
    }
}

/// Unfiltered search used by the administration pages.
///
/// The `created_*` bounds are inclusive.
#[derive(Debug, Clone, Default)]
pub(crate) struct PostSearch {
    pub(crate) title_contains: Option<String>,
    pub(crate) created_after: Option<DateTime<Utc>>,
    pub(crate) created_before: Option<DateTime<Utc>>,
}

impl PostSearch {
    pub(crate) fn matches_created_at(&self, created_at: DateTime<Utc>) -> bool {
        self.created_after.is_none_or(|after| created_at >= after)
            && self.created_before.is_none_or(|before| created_at <= before)
    }
}

/// Staff edit of a post's publication flag and category.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PostModeration {
    pub(crate) is_published: bool,
    pub(crate) category_id: Option<i64>,
}

/// Post storage.
///
/// Listing methods return posts annotated with their comment count, newest
/// `pub_date` first. The `*_owned` mutations only touch rows authored by
/// `owner_id` and report a miss otherwise.
#[async_trait]
pub(crate) trait PostRepository: Send + Sync {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError>;
    async fn get_post(&self, id: i64) -> Result<Option<AnnotatedPost>, DomainError>;
    async fn update_post_owned(
        &self,
        post_id: i64,
        owner_id: i64,
        patch: PostPatch,
    ) -> Result<Option<Post>, DomainError>;
    async fn delete_post_owned(&self, post_id: i64, owner_id: i64) -> Result<bool, DomainError>;
    async fn list_posts(
        &self,
        query: &PostQuery,
        pagination: Pagination,
    ) -> Result<Vec<AnnotatedPost>, DomainError>;
    async fn count_posts(&self, query: &PostQuery) -> Result<i64, DomainError>;
    async fn search_posts(
        &self,
        search: &PostSearch,
        pagination: Pagination,
    ) -> Result<Vec<AnnotatedPost>, DomainError>;
    async fn count_search(&self, search: &PostSearch) -> Result<i64, DomainError>;
    /// Applies a staff edit without an ownership check.
    async fn moderate_post(
        &self,
        post_id: i64,
        moderation: PostModeration,
    ) -> Result<Option<Post>, DomainError>;
}

#[async_trait]
impl<T: PostRepository + ?Sized> PostRepository for Arc<T> {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        (**self).create_post(input).await
    }

    async fn get_post(&self, id: i64) -> Result<Option<AnnotatedPost>, DomainError> {
        (**self).get_post(id).await
    }

    async fn update_post_owned(
        &self,
        post_id: i64,
        owner_id: i64,
        patch: PostPatch,
    ) -> Result<Option<Post>, DomainError> {
        (**self).update_post_owned(post_id, owner_id, patch).await
    }

    async fn delete_post_owned(&self, post_id: i64, owner_id: i64) -> Result<bool, DomainError> {
        (**self).delete_post_owned(post_id, owner_id).await
    }

    async fn list_posts(
        &self,
        query: &PostQuery,
        pagination: Pagination,
    ) -> Result<Vec<AnnotatedPost>, DomainError> {
        (**self).list_posts(query, pagination).await
    }

    async fn count_posts(&self, query: &PostQuery) -> Result<i64, DomainError> {
        (**self).count_posts(query).await
    }

    async fn search_posts(
        &self,
        search: &PostSearch,
        pagination: Pagination,
    ) -> Result<Vec<AnnotatedPost>, DomainError> {
        (**self).search_posts(search, pagination).await
    }

    async fn count_search(&self, search: &PostSearch) -> Result<i64, DomainError> {
        (**self).count_search(search).await
    }

    async fn moderate_post(
        &self,
        post_id: i64,
        moderation: PostModeration,
    ) -> Result<Option<Post>, DomainError> {
        (**self).moderate_post(post_id, moderation).await
    }
}
