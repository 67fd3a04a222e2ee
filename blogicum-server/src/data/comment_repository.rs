use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::comment::{AuthoredComment, Comment};
use crate::domain::error::DomainError;

#[derive(Debug, Clone)]
pub(crate) struct NewComment {
    pub(crate) text: String,
    pub(crate) post_id: i64,
    pub(crate) author_id: i64,
}

#[async_trait]
pub(crate) trait CommentRepository: Send + Sync {
    async fn create_comment(&self, input: NewComment) -> Result<Comment, DomainError>;
    /// Looks the comment up within its parent post.
    async fn get_comment(
        &self,
        post_id: i64,
        comment_id: i64,
    ) -> Result<Option<Comment>, DomainError>;
    async fn update_comment_owned(
        &self,
        comment_id: i64,
        owner_id: i64,
        text: String,
    ) -> Result<Option<Comment>, DomainError>;
    async fn delete_comment_owned(
        &self,
        comment_id: i64,
        owner_id: i64,
    ) -> Result<bool, DomainError>;
    /// Oldest first.
    async fn list_for_post(&self, post_id: i64) -> Result<Vec<AuthoredComment>, DomainError>;
}

#[async_trait]
impl<T: CommentRepository + ?Sized> CommentRepository for Arc<T> {
    async fn create_comment(&self, input: NewComment) -> Result<Comment, DomainError> {
        (**self).create_comment(input).await
    }

    async fn get_comment(
        &self,
        post_id: i64,
        comment_id: i64,
    ) -> Result<Option<Comment>, DomainError> {
        (**self).get_comment(post_id, comment_id).await
    }

    async fn update_comment_owned(
        &self,
        comment_id: i64,
        owner_id: i64,
        text: String,
    ) -> Result<Option<Comment>, DomainError> {
        (**self)
            .update_comment_owned(comment_id, owner_id, text)
            .await
    }

    async fn delete_comment_owned(
        &self,
        comment_id: i64,
        owner_id: i64,
    ) -> Result<bool, DomainError> {
        (**self).delete_comment_owned(comment_id, owner_id).await
    }

    async fn list_for_post(&self, post_id: i64) -> Result<Vec<AuthoredComment>, DomainError> {
        (**self).list_for_post(post_id).await
    }
}
