use std::sync::Arc;

use tracing::info;

use crate::application::blog_service::{PostPage, load_page};
use crate::application::clock::Clock;
use crate::data::post_repository::{PostQuery, PostRepository};
use crate::data::user_repository::{ProfilePatch, UserRepository};
use crate::domain::error::DomainError;
use crate::domain::user::{ProfileUpdateRequest, User};
use crate::domain::visibility::{Viewer, Visibility};

#[derive(Debug, Clone)]
pub(crate) struct ProfilePage {
    pub(crate) user: User,
    pub(crate) posts: PostPage,
}

pub(crate) struct ProfileService<U, P>
where
    U: UserRepository,
    P: PostRepository,
{
    users: U,
    posts: P,
    clock: Arc<dyn Clock>,
    page_size: u32,
}

impl<U, P> ProfileService<U, P>
where
    U: UserRepository,
    P: PostRepository,
{
    pub(crate) fn new(users: U, posts: P, clock: Arc<dyn Clock>, page_size: u32) -> Self {
        Self {
            users,
            posts,
            clock,
            page_size,
        }
    }

    /// The profile owner sees every post they wrote; other viewers only the
    /// publicly visible ones.
    pub(crate) async fn profile(
        &self,
        viewer: Viewer,
        username: &str,
        page: u32,
    ) -> Result<ProfilePage, DomainError> {
        let user = self
            .users
            .find_by_username(username)
            .await?
            .map(|creds| creds.user)
            .ok_or_else(|| DomainError::not_found("user", username))?;

        let query =
            PostQuery::new(Visibility::for_viewer(viewer), self.clock.now()).by_author(username);
        let posts = load_page(&self.posts, &query, page, self.page_size).await?;

        Ok(ProfilePage { user, posts })
    }

    pub(crate) async fn own_profile(&self, actor_user_id: i64) -> Result<User, DomainError> {
        self.users
            .find_by_id(actor_user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("user id", actor_user_id))
    }

    pub(crate) async fn update_profile(
        &self,
        actor_user_id: i64,
        req: ProfileUpdateRequest,
    ) -> Result<User, DomainError> {
        let req = req.validate()?;

        let patch = ProfilePatch {
            username: req.username,
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
        };
        let user = self
            .users
            .update_profile(actor_user_id, patch)
            .await?
            .ok_or_else(|| DomainError::not_found("user id", actor_user_id))?;
        info!(user_id = user.id, "profile updated");
        Ok(user)
    }
}
