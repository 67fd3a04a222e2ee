//! Which posts a viewer is allowed to see.
//!
//! A post is *publicly visible* at `now` when it is published, its
//! `pub_date` is not in the future and its category, if it has one, is
//! published too. Authors additionally see all of their own posts.
//!
//! [`Visibility::allows`] is the in-memory form of the rule; the PostgreSQL
//! post repository renders the same rule as SQL.

use chrono::{DateTime, Utc};

use super::post::{AnnotatedPost, Post};
use super::publishable::Publishable;

/// Who is looking at a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Viewer {
    Anonymous,
    User(i64),
}

impl Viewer {
    pub(crate) fn user_id(self) -> Option<i64> {
        match self {
            Viewer::Anonymous => None,
            Viewer::User(id) => Some(id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Visibility {
    /// Only publicly visible posts.
    Public,
    /// Publicly visible posts plus every post authored by the given user.
    PublicOrOwnedBy(i64),
}

impl Visibility {
    pub(crate) fn for_viewer(viewer: Viewer) -> Self {
        viewer
            .user_id()
            .map_or(Visibility::Public, Visibility::PublicOrOwnedBy)
    }

    pub(crate) fn allows(
        self,
        post: &Post,
        category_published: Option<bool>,
        now: DateTime<Utc>,
    ) -> bool {
        match self {
            Visibility::Public => is_publicly_visible(post, category_published, now),
            Visibility::PublicOrOwnedBy(user_id) => {
                post.author_id == user_id || is_publicly_visible(post, category_published, now)
            }
        }
    }

    pub(crate) fn allows_annotated(self, post: &AnnotatedPost, now: DateTime<Utc>) -> bool {
        self.allows(&post.post, post.category_published(), now)
    }
}

/// `category_published` is `None` for posts without a category.
pub(crate) fn is_publicly_visible(
    post: &Post,
    category_published: Option<bool>,
    now: DateTime<Utc>,
) -> bool {
    post.is_published() && post.pub_date <= now && category_published.unwrap_or(true)
}
