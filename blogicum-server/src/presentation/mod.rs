use sqlx::PgPool;
use std::sync::Arc;

use crate::application::admin_service::AdminService;
use crate::application::auth_service::AuthService;
use crate::application::blog_service::BlogService;
use crate::application::clock::{Clock, SystemClock};
use crate::application::comment_service::CommentService;
use crate::application::profile_service::ProfileService;
use crate::data::category_repository::CategoryRepository;
use crate::data::comment_repository::CommentRepository;
use crate::data::location_repository::LocationRepository;
use crate::data::post_repository::PostRepository;
use crate::data::repositories::postgres::category_repository::PostgresCategoryRepository;
use crate::data::repositories::postgres::comment_repository::PostgresCommentRepository;
use crate::data::repositories::postgres::location_repository::PostgresLocationRepository;
use crate::data::repositories::postgres::post_repository::PostgresPostRepository;
use crate::data::repositories::postgres::user_repository::PostgresUserRepository;
use crate::data::user_repository::UserRepository;
use crate::infrastructure::jwt::JwtService;
use crate::infrastructure::settings::Settings;

pub(crate) mod app_error;
pub(crate) mod extract;
pub(crate) mod guard;
pub(crate) mod handlers;
pub(crate) mod http_handlers;
pub(crate) mod middleware;
pub(crate) mod openapi;
pub(crate) mod routes;

type Users = Arc<dyn UserRepository>;
type Posts = Arc<dyn PostRepository>;
type Comments = Arc<dyn CommentRepository>;
type Categories = Arc<dyn CategoryRepository>;
type Locations = Arc<dyn LocationRepository>;

pub(crate) type SharedBlogService = BlogService<Posts, Comments, Categories>;
pub(crate) type SharedCommentService = CommentService<Comments, Posts>;
pub(crate) type SharedProfileService = ProfileService<Users, Posts>;
pub(crate) type SharedAdminService = AdminService<Users, Categories, Locations, Posts>;

/// Storage backends the services are built over.
#[derive(Clone)]
pub(crate) struct Repositories {
    pub(crate) users: Users,
    pub(crate) posts: Posts,
    pub(crate) comments: Comments,
    pub(crate) categories: Categories,
    pub(crate) locations: Locations,
}

impl Repositories {
    pub(crate) fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PostgresUserRepository::new(pool.clone())),
            posts: Arc::new(PostgresPostRepository::new(pool.clone())),
            comments: Arc::new(PostgresCommentRepository::new(pool.clone())),
            categories: Arc::new(PostgresCategoryRepository::new(pool.clone())),
            locations: Arc::new(PostgresLocationRepository::new(pool)),
        }
    }
}

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) auth_service: Arc<AuthService<Users>>,
    pub(crate) blog_service: Arc<SharedBlogService>,
    pub(crate) comment_service: Arc<SharedCommentService>,
    pub(crate) profile_service: Arc<SharedProfileService>,
    pub(crate) admin_service: Arc<SharedAdminService>,
    pub(crate) jwt: Arc<JwtService>,
}

impl AppState {
    pub(crate) fn new(pool: PgPool, settings: &Settings) -> Self {
        let jwt = Arc::new(JwtService::new(
            &settings.jwt_secret,
            settings.jwt_ttl_seconds,
        ));
        Self::from_repositories(
            Repositories::postgres(pool),
            Arc::new(SystemClock),
            jwt,
            settings.posts_per_page,
        )
    }

    pub(crate) fn from_repositories(
        repos: Repositories,
        clock: Arc<dyn Clock>,
        jwt: Arc<JwtService>,
        page_size: u32,
    ) -> Self {
        let Repositories {
            users,
            posts,
            comments,
            categories,
            locations,
        } = repos;

        Self {
            auth_service: Arc::new(AuthService::new(users.clone(), jwt.clone())),
            blog_service: Arc::new(BlogService::new(
                posts.clone(),
                comments.clone(),
                categories.clone(),
                clock.clone(),
                page_size,
            )),
            comment_service: Arc::new(CommentService::new(
                comments,
                posts.clone(),
                clock.clone(),
            )),
            profile_service: Arc::new(ProfileService::new(
                users.clone(),
                posts.clone(),
                clock,
                page_size,
            )),
            admin_service: Arc::new(AdminService::new(
                users, categories, locations, posts, page_size,
            )),
            jwt,
        }
    }
}
