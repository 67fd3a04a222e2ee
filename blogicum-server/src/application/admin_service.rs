use tracing::{info, warn};

use crate::application::blog_service::PostPage;
use crate::data::category_repository::CategoryRepository;
use crate::data::location_repository::LocationRepository;
use crate::data::post_repository::{Pagination, PostModeration, PostRepository, PostSearch};
use crate::data::user_repository::UserRepository;
use crate::domain::category::{Category, CategoryRequest};
use crate::domain::error::DomainError;
use crate::domain::location::{Location, LocationRequest};
use crate::domain::post::Post;
use crate::domain::validation::{optional_positive_id, positive_id};

/// Staff-only management of categories and locations, plus an unfiltered
/// post search.
pub(crate) struct AdminService<U, K, L, P>
where
    U: UserRepository,
    K: CategoryRepository,
    L: LocationRepository,
    P: PostRepository,
{
    users: U,
    categories: K,
    locations: L,
    posts: P,
    page_size: u32,
}

impl<U, K, L, P> AdminService<U, K, L, P>
where
    U: UserRepository,
    K: CategoryRepository,
    L: LocationRepository,
    P: PostRepository,
{
    pub(crate) fn new(users: U, categories: K, locations: L, posts: P, page_size: u32) -> Self {
        Self {
            users,
            categories,
            locations,
            posts,
            page_size,
        }
    }

    async fn ensure_staff(&self, actor_user_id: i64) -> Result<(), DomainError> {
        let is_staff = self
            .users
            .find_by_id(actor_user_id)
            .await?
            .is_some_and(|user| user.is_staff);
        if !is_staff {
            warn!(actor_user_id, "admin access denied");
            return Err(DomainError::Forbidden);
        }
        Ok(())
    }

    pub(crate) async fn list_categories(
        &self,
        actor_user_id: i64,
    ) -> Result<Vec<Category>, DomainError> {
        self.ensure_staff(actor_user_id).await?;
        self.categories.list_categories().await
    }

    pub(crate) async fn create_category(
        &self,
        actor_user_id: i64,
        req: CategoryRequest,
    ) -> Result<Category, DomainError> {
        self.ensure_staff(actor_user_id).await?;
        let category = self.categories.create_category(req.validate()?).await?;
        info!(category_id = category.id, slug = %category.slug, "category created");
        Ok(category)
    }

    pub(crate) async fn update_category(
        &self,
        actor_user_id: i64,
        id: i64,
        req: CategoryRequest,
    ) -> Result<Category, DomainError> {
        self.ensure_staff(actor_user_id).await?;
        let category = self
            .categories
            .update_category(id, req.validate()?)
            .await?
            .ok_or_else(|| DomainError::not_found("category id", id))?;
        info!(category_id = id, "category updated");
        Ok(category)
    }

    pub(crate) async fn delete_category(
        &self,
        actor_user_id: i64,
        id: i64,
    ) -> Result<(), DomainError> {
        self.ensure_staff(actor_user_id).await?;
        if !self.categories.delete_category(id).await? {
            return Err(DomainError::not_found("category id", id));
        }
        info!(category_id = id, "category deleted");
        Ok(())
    }

    pub(crate) async fn list_locations(
        &self,
        actor_user_id: i64,
    ) -> Result<Vec<Location>, DomainError> {
        self.ensure_staff(actor_user_id).await?;
        self.locations.list_locations().await
    }

    pub(crate) async fn create_location(
        &self,
        actor_user_id: i64,
        req: LocationRequest,
    ) -> Result<Location, DomainError> {
        self.ensure_staff(actor_user_id).await?;
        let location = self.locations.create_location(req.validate()?).await?;
        info!(location_id = location.id, "location created");
        Ok(location)
    }

    pub(crate) async fn update_location(
        &self,
        actor_user_id: i64,
        id: i64,
        req: LocationRequest,
    ) -> Result<Location, DomainError> {
        self.ensure_staff(actor_user_id).await?;
        let location = self
            .locations
            .update_location(id, req.validate()?)
            .await?
            .ok_or_else(|| DomainError::not_found("location id", id))?;
        info!(location_id = id, "location updated");
        Ok(location)
    }

    pub(crate) async fn delete_location(
        &self,
        actor_user_id: i64,
        id: i64,
    ) -> Result<(), DomainError> {
        self.ensure_staff(actor_user_id).await?;
        if !self.locations.delete_location(id).await? {
            return Err(DomainError::not_found("location id", id));
        }
        info!(location_id = id, "location deleted");
        Ok(())
    }

    /// Every post regardless of visibility, newest `created_at` first.
    pub(crate) async fn search_posts(
        &self,
        actor_user_id: i64,
        search: PostSearch,
        page: u32,
    ) -> Result<PostPage, DomainError> {
        self.ensure_staff(actor_user_id).await?;

        if let (Some(after), Some(before)) = (search.created_after, search.created_before)
            && after > before
        {
            return Err(DomainError::Validation {
                field: "created_after",
                message: "must not be later than created_before",
            });
        }
        let search = PostSearch {
            title_contains: search
                .title_contains
                .map(|needle| needle.trim().to_string())
                .filter(|needle| !needle.is_empty()),
            ..search
        };
        let pagination = Pagination {
            page,
            page_size: self.page_size,
        };
        let total = self.posts.count_search(&search).await?;
        let posts = self.posts.search_posts(&search, pagination).await?;

        Ok(PostPage {
            posts,
            page,
            page_size: self.page_size,
            total,
        })
    }

    /// Sets a post's publication flag and category regardless of its author.
    pub(crate) async fn moderate_post(
        &self,
        actor_user_id: i64,
        post_id: i64,
        moderation: PostModeration,
    ) -> Result<Post, DomainError> {
        self.ensure_staff(actor_user_id).await?;
        positive_id("post_id", post_id)?;
        optional_positive_id("category_id", moderation.category_id)?;

        let post = self
            .posts
            .moderate_post(post_id, moderation)
            .await?
            .ok_or_else(|| DomainError::not_found("post id", post_id))?;
        info!(
            post_id,
            actor_user_id,
            is_published = post.is_published,
            "post moderated"
        );
        Ok(post)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::AdminService;
    use crate::application::testing::{InMemoryStore, new_post, reference_now};
    use crate::data::post_repository::{NewPost, PostModeration, PostSearch};
    use crate::domain::category::CategoryRequest;
    use crate::domain::error::DomainError;
    use crate::domain::location::LocationRequest;

    type Service = AdminService<InMemoryStore, InMemoryStore, InMemoryStore, InMemoryStore>;

    fn service(store: &InMemoryStore) -> Service {
        AdminService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            10,
        )
    }

    fn category(slug: &str) -> CategoryRequest {
        CategoryRequest {
            title: "Travel".to_string(),
            description: "Trips".to_string(),
            slug: slug.to_string(),
            is_published: true,
        }
    }

    #[tokio::test]
    async fn non_staff_cannot_manage_categories() {
        let store = InMemoryStore::new();
        let user = store.add_user("regular");

        let err = service(&store)
            .create_category(user.id, category("travel"))
            .await
            .expect_err("must be forbidden");
        assert!(matches!(err, DomainError::Forbidden));
    }

    #[tokio::test]
    async fn staff_creates_category_with_unique_slug() {
        let store = InMemoryStore::new();
        let staff = store.add_staff("editor");
        let service = service(&store);

        let created = service
            .create_category(staff.id, category(" travel "))
            .await
            .expect("create must succeed");
        assert_eq!(created.slug, "travel");

        let err = service
            .create_category(staff.id, category("travel"))
            .await
            .expect_err("slug must be unique");
        assert!(matches!(err, DomainError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn deleting_location_keeps_posts() {
        let store = InMemoryStore::new();
        let staff = store.add_staff("editor");
        let location = store.add_location("Moscow", true);
        let post = store.add_post(NewPost {
            location_id: Some(location.id),
            ..new_post(staff.id, "city walk")
        });

        service(&store)
            .delete_location(staff.id, location.id)
            .await
            .expect("delete must succeed");

        let post = store.post(post.id).expect("post must survive");
        assert_eq!(post.location_id, None);
    }

    #[tokio::test]
    async fn deleting_category_removes_its_posts() {
        let store = InMemoryStore::new();
        let staff = store.add_staff("editor");
        let news = store.add_category("news", true);
        let post = store.add_post(NewPost {
            category_id: Some(news.id),
            ..new_post(staff.id, "headline")
        });

        service(&store)
            .delete_category(staff.id, news.id)
            .await
            .expect("delete must succeed");
        assert!(store.post(post.id).is_none());
    }

    #[tokio::test]
    async fn update_missing_location_is_not_found() {
        let store = InMemoryStore::new();
        let staff = store.add_staff("editor");

        let err = service(&store)
            .update_location(
                staff.id,
                999,
                LocationRequest {
                    name: "Nowhere".to_string(),
                    is_published: true,
                },
            )
            .await
            .expect_err("must be missing");
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn search_sees_hidden_posts_and_matches_title_case_insensitively() {
        let store = InMemoryStore::new();
        let staff = store.add_staff("editor");
        store.add_post(NewPost {
            is_published: false,
            ..new_post(staff.id, "Hidden Gem")
        });
        store.add_post(new_post(staff.id, "Other"));

        let page = service(&store)
            .search_posts(
                staff.id,
                PostSearch {
                    title_contains: Some("  gem ".to_string()),
                    ..PostSearch::default()
                },
                1,
            )
            .await
            .expect("search must succeed");

        assert_eq!(page.total, 1);
        assert_eq!(page.posts[0].post.title, "Hidden Gem");
    }

    #[tokio::test]
    async fn search_filters_by_creation_window() {
        let store = InMemoryStore::new();
        let staff = store.add_staff("editor");
        let old = store.add_post(new_post(staff.id, "old"));
        let recent = store.add_post(new_post(staff.id, "recent"));
        store.set_post_created_at(old.id, reference_now() - Duration::days(30));
        store.set_post_created_at(recent.id, reference_now() - Duration::days(1));

        let page = service(&store)
            .search_posts(
                staff.id,
                PostSearch {
                    created_after: Some(reference_now() - Duration::days(7)),
                    created_before: Some(reference_now()),
                    ..PostSearch::default()
                },
                1,
            )
            .await
            .expect("search must succeed");

        assert_eq!(page.total, 1);
        assert_eq!(page.posts[0].post.id, recent.id);
    }

    #[tokio::test]
    async fn inverted_creation_window_is_rejected() {
        let store = InMemoryStore::new();
        let staff = store.add_staff("editor");

        let err = service(&store)
            .search_posts(
                staff.id,
                PostSearch {
                    created_after: Some(reference_now()),
                    created_before: Some(reference_now() - Duration::days(1)),
                    ..PostSearch::default()
                },
                1,
            )
            .await
            .expect_err("window must be ordered");
        assert!(matches!(
            err,
            DomainError::Validation {
                field: "created_after",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn staff_moderates_post_of_another_author() {
        let store = InMemoryStore::new();
        let staff = store.add_staff("editor");
        let author = store.add_user("writer");
        let news = store.add_category("news", true);
        let post = store.add_post(new_post(author.id, "draft"));

        let moderated = service(&store)
            .moderate_post(
                staff.id,
                post.id,
                PostModeration {
                    is_published: false,
                    category_id: Some(news.id),
                },
            )
            .await
            .expect("moderation must succeed");

        assert!(!moderated.is_published);
        assert_eq!(moderated.category_id, Some(news.id));
        assert_eq!(moderated.author_id, author.id);
        let stored = store.post(post.id).expect("post must exist");
        assert!(!stored.is_published);
    }

    #[tokio::test]
    async fn moderation_requires_staff() {
        let store = InMemoryStore::new();
        let user = store.add_user("regular");
        let post = store.add_post(new_post(user.id, "mine"));

        let err = service(&store)
            .moderate_post(
                user.id,
                post.id,
                PostModeration {
                    is_published: false,
                    category_id: None,
                },
            )
            .await
            .expect_err("authors are not moderators");
        assert!(matches!(err, DomainError::Forbidden));
        assert!(store.post(post.id).expect("post must exist").is_published);
    }

    #[tokio::test]
    async fn moderating_missing_post_or_category_is_not_found() {
        let store = InMemoryStore::new();
        let staff = store.add_staff("editor");
        let post = store.add_post(new_post(staff.id, "headline"));
        let service = service(&store);

        let err = service
            .moderate_post(
                staff.id,
                999,
                PostModeration {
                    is_published: true,
                    category_id: None,
                },
            )
            .await
            .expect_err("post must be missing");
        assert!(matches!(err, DomainError::NotFound(_)));

        let err = service
            .moderate_post(
                staff.id,
                post.id,
                PostModeration {
                    is_published: true,
                    category_id: Some(999),
                },
            )
            .await
            .expect_err("category must be missing");
        assert!(matches!(err, DomainError::NotFound(_)));
    }
}
