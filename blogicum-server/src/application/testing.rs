//! In-memory repositories and a settable clock for service tests.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::application::clock::Clock;
use crate::data::category_repository::CategoryRepository;
use crate::data::comment_repository::{CommentRepository, NewComment};
use crate::data::location_repository::LocationRepository;
use crate::data::post_repository::{
    NewPost, Pagination, PostModeration, PostPatch, PostQuery, PostRepository, PostSearch,
};
use crate::data::user_repository::{NewUser, ProfilePatch, UserCredentials, UserRepository};
use crate::domain::category::{Category, CategoryRequest};
use crate::domain::comment::{AuthoredComment, Comment};
use crate::domain::error::DomainError;
use crate::domain::location::{Location, LocationRequest};
use crate::domain::post::{AnnotatedPost, CategoryRef, LocationRef, Post, PostFields};
use crate::domain::user::{User, UserFields};

pub(crate) fn reference_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(crate) struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub(crate) fn at(now: DateTime<Utc>) -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(now),
        })
    }

    pub(crate) fn advance(&self, by: Duration) {
        let mut now = self.now.lock().expect("clock mutex poisoned");
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock mutex poisoned")
    }
}

#[derive(Default)]
struct StoreState {
    next_id: i64,
    users: Vec<(User, String)>,
    categories: Vec<Category>,
    locations: Vec<Location>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
}

impl StoreState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn annotate(&self, post: &Post) -> AnnotatedPost {
        let author_username = self
            .users
            .iter()
            .find(|(user, _)| user.id == post.author_id)
            .map(|(user, _)| user.username.clone())
            .unwrap_or_default();
        let category = post.category_id.and_then(|id| {
            self.categories
                .iter()
                .find(|category| category.id == id)
                .map(|category| CategoryRef {
                    id,
                    title: category.title.clone(),
                    slug: category.slug.clone(),
                    is_published: category.is_published,
                })
        });
        let location = post.location_id.and_then(|id| {
            self.locations
                .iter()
                .find(|location| location.id == id)
                .map(|location| LocationRef {
                    id,
                    name: location.name.clone(),
                    is_published: location.is_published,
                })
        });
        let comment_count = self
            .comments
            .iter()
            .filter(|comment| comment.post_id == post.id)
            .count() as i64;

        AnnotatedPost {
            post: post.clone(),
            author_username,
            category,
            location,
            comment_count,
        }
    }

    fn check_post_references(
        &self,
        author_id: Option<i64>,
        category_id: Option<i64>,
        location_id: Option<i64>,
    ) -> Result<(), DomainError> {
        if let Some(author_id) = author_id
            && !self.users.iter().any(|(user, _)| user.id == author_id)
        {
            return Err(DomainError::NotFound("author".to_string()));
        }
        if let Some(category_id) = category_id
            && !self.categories.iter().any(|c| c.id == category_id)
        {
            return Err(DomainError::NotFound("category".to_string()));
        }
        if let Some(location_id) = location_id
            && !self.locations.iter().any(|l| l.id == location_id)
        {
            return Err(DomainError::NotFound("location".to_string()));
        }
        Ok(())
    }

    fn user_taken(&self, except_id: i64, username: &str, email: &str) -> Option<&'static str> {
        self.users
            .iter()
            .filter(|(user, _)| user.id != except_id)
            .find_map(|(user, _)| {
                if user.username == username {
                    Some("username")
                } else if user.email == email {
                    Some("email")
                } else {
                    None
                }
            })
    }
}

/// Shared in-memory storage implementing every repository trait.
///
/// Clones share state, so a test can hand one clone to a service and inspect
/// another.
#[derive(Clone, Default)]
pub(crate) struct InMemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().expect("store mutex poisoned")
    }

    pub(crate) fn add_user(&self, username: &str) -> User {
        self.insert_user(username, false)
    }

    pub(crate) fn add_staff(&self, username: &str) -> User {
        self.insert_user(username, true)
    }

    fn insert_user(&self, username: &str, is_staff: bool) -> User {
        let mut state = self.lock();
        let id = state.next_id();
        let user = User::new(UserFields {
            id,
            username: username.to_string(),
            email: format!("{username}@example.com"),
            first_name: String::new(),
            last_name: String::new(),
            is_staff,
            created_at: reference_now(),
        })
        .expect("seed user must be valid");
        state.users.push((user.clone(), String::new()));
        user
    }

    pub(crate) fn add_category(&self, slug: &str, is_published: bool) -> Category {
        let mut state = self.lock();
        let id = state.next_id();
        let category = Category::new(
            id,
            format!("Category {slug}"),
            "description",
            slug,
            is_published,
            reference_now(),
        )
        .expect("seed category must be valid");
        state.categories.push(category.clone());
        category
    }

    pub(crate) fn add_location(&self, name: &str, is_published: bool) -> Location {
        let mut state = self.lock();
        let id = state.next_id();
        let location =
            Location::new(id, name, is_published, reference_now()).expect("seed location");
        state.locations.push(location.clone());
        location
    }

    pub(crate) fn add_post(&self, input: NewPost) -> Post {
        let mut state = self.lock();
        let id = state.next_id();
        let post = Post::new(PostFields {
            id,
            title: input.title,
            text: input.text,
            pub_date: input.pub_date,
            author_id: input.author_id,
            location_id: input.location_id,
            category_id: input.category_id,
            is_published: input.is_published,
            created_at: reference_now(),
        })
        .expect("seed post must be valid");
        state.posts.push(post.clone());
        post
    }

    pub(crate) fn add_comment(&self, post_id: i64, author_id: i64, text: &str) -> Comment {
        let mut state = self.lock();
        let id = state.next_id();
        let comment = Comment::new(id, text, post_id, author_id, reference_now())
            .expect("seed comment must be valid");
        state.comments.push(comment.clone());
        comment
    }

    pub(crate) fn post(&self, id: i64) -> Option<Post> {
        self.lock().posts.iter().find(|post| post.id == id).cloned()
    }

    pub(crate) fn set_post_created_at(&self, id: i64, created_at: DateTime<Utc>) {
        if let Some(post) = self.lock().posts.iter_mut().find(|post| post.id == id) {
            post.created_at = created_at;
        }
    }

    pub(crate) fn comment(&self, id: i64) -> Option<Comment> {
        self.lock()
            .comments
            .iter()
            .find(|comment| comment.id == id)
            .cloned()
    }
}

/// A published post without category, dated an hour before [`reference_now`].
pub(crate) fn new_post(author_id: i64, title: &str) -> NewPost {
    NewPost {
        title: title.to_string(),
        text: format!("{title} text"),
        pub_date: reference_now() - Duration::hours(1),
        author_id,
        location_id: None,
        category_id: None,
        is_published: true,
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        self.lock().check_post_references(
            Some(input.author_id),
            input.category_id,
            input.location_id,
        )?;
        Ok(self.add_post(input))
    }

    async fn get_post(&self, id: i64) -> Result<Option<AnnotatedPost>, DomainError> {
        let state = self.lock();
        Ok(state
            .posts
            .iter()
            .find(|post| post.id == id)
            .map(|post| state.annotate(post)))
    }

    async fn update_post_owned(
        &self,
        post_id: i64,
        owner_id: i64,
        patch: PostPatch,
    ) -> Result<Option<Post>, DomainError> {
        let mut state = self.lock();
        state.check_post_references(None, patch.category_id, patch.location_id)?;
        let Some(post) = state
            .posts
            .iter_mut()
            .find(|post| post.id == post_id && post.author_id == owner_id)
        else {
            return Ok(None);
        };
        post.title = patch.title;
        post.text = patch.text;
        post.pub_date = patch.pub_date;
        post.location_id = patch.location_id;
        post.category_id = patch.category_id;
        post.is_published = patch.is_published;
        Ok(Some(post.clone()))
    }

    async fn delete_post_owned(&self, post_id: i64, owner_id: i64) -> Result<bool, DomainError> {
        let mut state = self.lock();
        let before = state.posts.len();
        state
            .posts
            .retain(|post| !(post.id == post_id && post.author_id == owner_id));
        let deleted = state.posts.len() < before;
        if deleted {
            state.comments.retain(|comment| comment.post_id != post_id);
        }
        Ok(deleted)
    }

    async fn list_posts(
        &self,
        query: &PostQuery,
        pagination: Pagination,
    ) -> Result<Vec<AnnotatedPost>, DomainError> {
        let mut posts = filter_posts(&self.lock(), query);
        posts.sort_by(|a, b| {
            b.post
                .pub_date
                .cmp(&a.post.pub_date)
                .then(b.post.id.cmp(&a.post.id))
        });
        Ok(paginate(posts, pagination))
    }

    async fn count_posts(&self, query: &PostQuery) -> Result<i64, DomainError> {
        Ok(filter_posts(&self.lock(), query).len() as i64)
    }

    async fn search_posts(
        &self,
        search: &PostSearch,
        pagination: Pagination,
    ) -> Result<Vec<AnnotatedPost>, DomainError> {
        let mut posts = search_posts(&self.lock(), search);
        posts.sort_by(|a, b| {
            b.post
                .created_at
                .cmp(&a.post.created_at)
                .then(b.post.id.cmp(&a.post.id))
        });
        Ok(paginate(posts, pagination))
    }

    async fn count_search(&self, search: &PostSearch) -> Result<i64, DomainError> {
        Ok(search_posts(&self.lock(), search).len() as i64)
    }

    async fn moderate_post(
        &self,
        post_id: i64,
        moderation: PostModeration,
    ) -> Result<Option<Post>, DomainError> {
        let mut state = self.lock();
        state.check_post_references(None, moderation.category_id, None)?;
        let Some(post) = state.posts.iter_mut().find(|post| post.id == post_id) else {
            return Ok(None);
        };
        post.is_published = moderation.is_published;
        post.category_id = moderation.category_id;
        Ok(Some(post.clone()))
    }
}

fn filter_posts(state: &StoreState, query: &PostQuery) -> Vec<AnnotatedPost> {
    state
        .posts
        .iter()
        .map(|post| state.annotate(post))
        .filter(|post| query.visibility.allows_annotated(post, query.now))
        .filter(|post| match &query.category_slug {
            Some(slug) => post
                .category
                .as_ref()
                .is_some_and(|category| &category.slug == slug),
            None => true,
        })
        .filter(|post| match &query.author_username {
            Some(username) => &post.author_username == username,
            None => true,
        })
        .collect()
}

fn search_posts(state: &StoreState, search: &PostSearch) -> Vec<AnnotatedPost> {
    let needle = search.title_contains.as_ref().map(|s| s.to_lowercase());
    state
        .posts
        .iter()
        .filter(|post| match &needle {
            Some(needle) => post.title.to_lowercase().contains(needle),
            None => true,
        })
        .filter(|post| search.matches_created_at(post.created_at))
        .map(|post| state.annotate(post))
        .collect()
}

fn paginate(posts: Vec<AnnotatedPost>, pagination: Pagination) -> Vec<AnnotatedPost> {
    posts
        .into_iter()
        .skip(pagination.offset() as usize)
        .take(pagination.limit() as usize)
        .collect()
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn create_comment(&self, input: NewComment) -> Result<Comment, DomainError> {
        {
            let state = self.lock();
            if !state.posts.iter().any(|post| post.id == input.post_id) {
                return Err(DomainError::NotFound("post".to_string()));
            }
        }
        Ok(self.add_comment(input.post_id, input.author_id, &input.text))
    }

    async fn get_comment(
        &self,
        post_id: i64,
        comment_id: i64,
    ) -> Result<Option<Comment>, DomainError> {
        Ok(self
            .lock()
            .comments
            .iter()
            .find(|comment| comment.id == comment_id && comment.post_id == post_id)
            .cloned())
    }

    async fn update_comment_owned(
        &self,
        comment_id: i64,
        owner_id: i64,
        text: String,
    ) -> Result<Option<Comment>, DomainError> {
        let mut state = self.lock();
        let Some(comment) = state
            .comments
            .iter_mut()
            .find(|comment| comment.id == comment_id && comment.author_id == owner_id)
        else {
            return Ok(None);
        };
        comment.text = text;
        Ok(Some(comment.clone()))
    }

    async fn delete_comment_owned(
        &self,
        comment_id: i64,
        owner_id: i64,
    ) -> Result<bool, DomainError> {
        let mut state = self.lock();
        let before = state.comments.len();
        state
            .comments
            .retain(|comment| !(comment.id == comment_id && comment.author_id == owner_id));
        Ok(state.comments.len() < before)
    }

    async fn list_for_post(&self, post_id: i64) -> Result<Vec<AuthoredComment>, DomainError> {
        let state = self.lock();
        let mut comments: Vec<AuthoredComment> = state
            .comments
            .iter()
            .filter(|comment| comment.post_id == post_id)
            .map(|comment| AuthoredComment {
                comment: comment.clone(),
                author_username: state
                    .users
                    .iter()
                    .find(|(user, _)| user.id == comment.author_id)
                    .map(|(user, _)| user.username.clone())
                    .unwrap_or_default(),
            })
            .collect();
        comments.sort_by(|a, b| {
            a.comment
                .created_at
                .cmp(&b.comment.created_at)
                .then(a.comment.id.cmp(&b.comment.id))
        });
        Ok(comments)
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create_user(&self, input: NewUser) -> Result<User, DomainError> {
        let mut state = self.lock();
        if let Some(resource) = state.user_taken(0, &input.username, &input.email) {
            return Err(DomainError::AlreadyExists(resource.to_string()));
        }
        let id = state.next_id();
        let user = User::new(UserFields {
            id,
            username: input.username,
            email: input.email,
            first_name: String::new(),
            last_name: String::new(),
            is_staff: false,
            created_at: reference_now(),
        })?;
        state.users.push((user.clone(), input.password_hash));
        Ok(user)
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, DomainError> {
        Ok(self
            .lock()
            .users
            .iter()
            .find(|(user, _)| user.username == username)
            .map(|(user, password_hash)| UserCredentials {
                user: user.clone(),
                password_hash: password_hash.clone(),
            }))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DomainError> {
        Ok(self
            .lock()
            .users
            .iter()
            .find(|(user, _)| user.id == id)
            .map(|(user, _)| user.clone()))
    }

    async fn update_profile(
        &self,
        id: i64,
        patch: ProfilePatch,
    ) -> Result<Option<User>, DomainError> {
        let mut state = self.lock();
        if let Some(resource) = state.user_taken(id, &patch.username, &patch.email) {
            return Err(DomainError::AlreadyExists(resource.to_string()));
        }
        let Some((user, _)) = state.users.iter_mut().find(|(user, _)| user.id == id) else {
            return Ok(None);
        };
        user.username = patch.username;
        user.first_name = patch.first_name;
        user.last_name = patch.last_name;
        user.email = patch.email;
        Ok(Some(user.clone()))
    }
}

#[async_trait]
impl CategoryRepository for InMemoryStore {
    async fn create_category(&self, input: CategoryRequest) -> Result<Category, DomainError> {
        let mut state = self.lock();
        if state.categories.iter().any(|c| c.slug == input.slug) {
            return Err(DomainError::AlreadyExists("slug".to_string()));
        }
        let id = state.next_id();
        let category = Category::new(
            id,
            input.title,
            input.description,
            input.slug,
            input.is_published,
            reference_now(),
        )?;
        state.categories.push(category.clone());
        Ok(category)
    }

    async fn update_category(
        &self,
        id: i64,
        input: CategoryRequest,
    ) -> Result<Option<Category>, DomainError> {
        let mut state = self.lock();
        if state
            .categories
            .iter()
            .any(|c| c.slug == input.slug && c.id != id)
        {
            return Err(DomainError::AlreadyExists("slug".to_string()));
        }
        let Some(category) = state.categories.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        category.title = input.title;
        category.description = input.description;
        category.slug = input.slug;
        category.is_published = input.is_published;
        Ok(Some(category.clone()))
    }

    async fn delete_category(&self, id: i64) -> Result<bool, DomainError> {
        let mut state = self.lock();
        let before = state.categories.len();
        state.categories.retain(|c| c.id != id);
        if state.categories.len() == before {
            return Ok(false);
        }
        let removed: Vec<i64> = state
            .posts
            .iter()
            .filter(|post| post.category_id == Some(id))
            .map(|post| post.id)
            .collect();
        state.posts.retain(|post| post.category_id != Some(id));
        state
            .comments
            .retain(|comment| !removed.contains(&comment.post_id));
        Ok(true)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        let mut categories = self.lock().categories.clone();
        categories.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        Ok(categories)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, DomainError> {
        Ok(self
            .lock()
            .categories
            .iter()
            .find(|c| c.slug == slug)
            .cloned())
    }
}

#[async_trait]
impl LocationRepository for InMemoryStore {
    async fn create_location(&self, input: LocationRequest) -> Result<Location, DomainError> {
        let mut state = self.lock();
        let id = state.next_id();
        let location = Location::new(id, input.name, input.is_published, reference_now())?;
        state.locations.push(location.clone());
        Ok(location)
    }

    async fn update_location(
        &self,
        id: i64,
        input: LocationRequest,
    ) -> Result<Option<Location>, DomainError> {
        let mut state = self.lock();
        let Some(location) = state.locations.iter_mut().find(|l| l.id == id) else {
            return Ok(None);
        };
        location.name = input.name;
        location.is_published = input.is_published;
        Ok(Some(location.clone()))
    }

    async fn delete_location(&self, id: i64) -> Result<bool, DomainError> {
        let mut state = self.lock();
        let before = state.locations.len();
        state.locations.retain(|l| l.id != id);
        if state.locations.len() == before {
            return Ok(false);
        }
        for post in state
            .posts
            .iter_mut()
            .filter(|post| post.location_id == Some(id))
        {
            post.location_id = None;
        }
        Ok(true)
    }

    async fn list_locations(&self) -> Result<Vec<Location>, DomainError> {
        let mut locations = self.lock().locations.clone();
        locations.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(locations)
    }
}
