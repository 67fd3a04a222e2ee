use std::sync::Arc;

use tracing::info;

use crate::application::clock::Clock;
use crate::data::category_repository::CategoryRepository;
use crate::data::comment_repository::CommentRepository;
use crate::data::post_repository::{NewPost, Pagination, PostPatch, PostQuery, PostRepository};
use crate::domain::category::Category;
use crate::domain::comment::AuthoredComment;
use crate::domain::error::DomainError;
use crate::domain::ownership::ensure_owner;
use crate::domain::post::{AnnotatedPost, Post, PostRequest};
use crate::domain::publishable::Publishable;
use crate::domain::visibility::{Viewer, Visibility};

/// One page of an annotated post listing.
#[derive(Debug, Clone)]
pub(crate) struct PostPage {
    pub(crate) posts: Vec<AnnotatedPost>,
    pub(crate) page: u32,
    pub(crate) page_size: u32,
    pub(crate) total: i64,
}

impl PostPage {
    pub(crate) fn num_pages(&self) -> i64 {
        let page_size = i64::from(self.page_size.max(1));
        ((self.total + page_size - 1) / page_size).max(1)
    }
}

pub(crate) async fn load_page<P: PostRepository + ?Sized>(
    posts: &P,
    query: &PostQuery,
    page: u32,
    page_size: u32,
) -> Result<PostPage, DomainError> {
    let pagination = Pagination { page, page_size };
    let total = posts.count_posts(query).await?;
    let items = posts.list_posts(query, pagination).await?;

    Ok(PostPage {
        posts: items,
        page,
        page_size,
        total,
    })
}

#[derive(Debug, Clone)]
pub(crate) struct CategoryPage {
    pub(crate) category: Category,
    pub(crate) posts: PostPage,
}

#[derive(Debug, Clone)]
pub(crate) struct PostDetail {
    pub(crate) post: AnnotatedPost,
    pub(crate) comments: Vec<AuthoredComment>,
}

/// Post pages: listings, detail and the author-only edit/delete flow.
pub(crate) struct BlogService<P, C, K>
where
    P: PostRepository,
    C: CommentRepository,
    K: CategoryRepository,
{
    posts: P,
    comments: C,
    categories: K,
    clock: Arc<dyn Clock>,
    page_size: u32,
}

impl<P, C, K> BlogService<P, C, K>
where
    P: PostRepository,
    C: CommentRepository,
    K: CategoryRepository,
{
    pub(crate) fn new(
        posts: P,
        comments: C,
        categories: K,
        clock: Arc<dyn Clock>,
        page_size: u32,
    ) -> Self {
        Self {
            posts,
            comments,
            categories,
            clock,
            page_size,
        }
    }

    pub(crate) async fn index(&self, page: u32) -> Result<PostPage, DomainError> {
        let query = PostQuery::new(Visibility::Public, self.clock.now());
        load_page(&self.posts, &query, page, self.page_size).await
    }

    pub(crate) async fn category_posts(
        &self,
        slug: &str,
        page: u32,
    ) -> Result<CategoryPage, DomainError> {
        let category = self
            .categories
            .find_by_slug(slug)
            .await?
            .filter(Publishable::is_published)
            .ok_or_else(|| DomainError::not_found("category", slug))?;

        let query = PostQuery::new(Visibility::Public, self.clock.now()).in_category(slug);
        let posts = load_page(&self.posts, &query, page, self.page_size).await?;

        Ok(CategoryPage { category, posts })
    }

    pub(crate) async fn create_post(
        &self,
        author_id: i64,
        req: PostRequest,
    ) -> Result<Post, DomainError> {
        let req = req.validate()?;

        let new_post = NewPost {
            title: req.title,
            text: req.text,
            pub_date: req.pub_date,
            author_id,
            location_id: req.location_id,
            category_id: req.category_id,
            is_published: req.is_published,
        };
        let post = self.posts.create_post(new_post).await?;
        info!(post_id = post.id, author_id, "post created");
        Ok(post)
    }

    /// Hidden posts are reported as missing to everyone but their author.
    pub(crate) async fn post_detail(
        &self,
        viewer: Viewer,
        id: i64,
    ) -> Result<PostDetail, DomainError> {
        let post = self
            .posts
            .get_post(id)
            .await?
            .filter(|post| Visibility::for_viewer(viewer).allows_annotated(post, self.clock.now()))
            .ok_or_else(|| DomainError::not_found("post id", id))?;
        let comments = self.comments.list_for_post(id).await?;

        Ok(PostDetail { post, comments })
    }

    /// Loads a post for its author's edit or delete form.
    pub(crate) async fn post_for_owner(
        &self,
        actor_user_id: i64,
        post_id: i64,
    ) -> Result<AnnotatedPost, DomainError> {
        let post = self.find_post(post_id).await?;
        ensure_owner(actor_user_id, &post.post)?;
        Ok(post)
    }

    pub(crate) async fn update_post(
        &self,
        actor_user_id: i64,
        post_id: i64,
        req: PostRequest,
    ) -> Result<Post, DomainError> {
        self.post_for_owner(actor_user_id, post_id).await?;
        let req = req.validate()?;

        let patch = PostPatch {
            title: req.title,
            text: req.text,
            pub_date: req.pub_date,
            location_id: req.location_id,
            category_id: req.category_id,
            is_published: req.is_published,
        };
        let post = self
            .posts
            .update_post_owned(post_id, actor_user_id, patch)
            .await?
            .ok_or_else(|| DomainError::not_found("post id", post_id))?;
        info!(post_id, actor_user_id, "post updated");
        Ok(post)
    }

    pub(crate) async fn delete_post(
        &self,
        actor_user_id: i64,
        post_id: i64,
    ) -> Result<(), DomainError> {
        self.post_for_owner(actor_user_id, post_id).await?;

        let deleted = self.posts.delete_post_owned(post_id, actor_user_id).await?;
        if !deleted {
            return Err(DomainError::not_found("post id", post_id));
        }
        info!(post_id, actor_user_id, "post deleted");
        Ok(())
    }

    async fn find_post(&self, post_id: i64) -> Result<AnnotatedPost, DomainError> {
        self.posts
            .get_post(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("post id", post_id))
    }
}
