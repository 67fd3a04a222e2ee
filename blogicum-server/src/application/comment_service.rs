use std::sync::Arc;

use tracing::info;

use crate::application::clock::Clock;
use crate::data::comment_repository::{CommentRepository, NewComment};
use crate::data::post_repository::PostRepository;
use crate::domain::comment::{Comment, CommentRequest};
use crate::domain::error::DomainError;
use crate::domain::ownership::ensure_owner;
use crate::domain::visibility::Visibility;

pub(crate) struct CommentService<C, P>
where
    C: CommentRepository,
    P: PostRepository,
{
    comments: C,
    posts: P,
    clock: Arc<dyn Clock>,
}

impl<C, P> CommentService<C, P>
where
    C: CommentRepository,
    P: PostRepository,
{
    pub(crate) fn new(comments: C, posts: P, clock: Arc<dyn Clock>) -> Self {
        Self {
            comments,
            posts,
            clock,
        }
    }

    /// Comments can only be left on posts the author can see.
    pub(crate) async fn add_comment(
        &self,
        actor_user_id: i64,
        post_id: i64,
        req: CommentRequest,
    ) -> Result<Comment, DomainError> {
        self.posts
            .get_post(post_id)
            .await?
            .filter(|post| {
                Visibility::PublicOrOwnedBy(actor_user_id).allows_annotated(post, self.clock.now())
            })
            .ok_or_else(|| DomainError::not_found("post id", post_id))?;
        let req = req.validate()?;

        let comment = self
            .comments
            .create_comment(NewComment {
                text: req.text,
                post_id,
                author_id: actor_user_id,
            })
            .await?;
        info!(comment_id = comment.id, post_id, actor_user_id, "comment added");
        Ok(comment)
    }

    pub(crate) async fn comment_for_owner(
        &self,
        actor_user_id: i64,
        post_id: i64,
        comment_id: i64,
    ) -> Result<Comment, DomainError> {
        let comment = self
            .comments
            .get_comment(post_id, comment_id)
            .await?
            .ok_or_else(|| DomainError::not_found("comment id", comment_id))?;
        ensure_owner(actor_user_id, &comment)?;
        Ok(comment)
    }

    pub(crate) async fn update_comment(
        &self,
        actor_user_id: i64,
        post_id: i64,
        comment_id: i64,
        req: CommentRequest,
    ) -> Result<Comment, DomainError> {
        self.comment_for_owner(actor_user_id, post_id, comment_id)
            .await?;
        let req = req.validate()?;

        let comment = self
            .comments
            .update_comment_owned(comment_id, actor_user_id, req.text)
            .await?
            .ok_or_else(|| DomainError::not_found("comment id", comment_id))?;
        info!(comment_id, post_id, actor_user_id, "comment updated");
        Ok(comment)
    }

    pub(crate) async fn delete_comment(
        &self,
        actor_user_id: i64,
        post_id: i64,
        comment_id: i64,
    ) -> Result<(), DomainError> {
        self.comment_for_owner(actor_user_id, post_id, comment_id)
            .await?;

        if !self
            .comments
            .delete_comment_owned(comment_id, actor_user_id)
            .await?
        {
            return Err(DomainError::not_found("comment id", comment_id));
        }
        info!(comment_id, post_id, actor_user_id, "comment deleted");
        Ok(())
    }
}
