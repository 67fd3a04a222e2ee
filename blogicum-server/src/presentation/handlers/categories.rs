use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::application::blog_service::CategoryPage;
use crate::domain::category::Category;
use crate::presentation::AppState;
use crate::presentation::app_error::AppResult;
use crate::presentation::extract::{PathParams, QueryParams};
use crate::presentation::handlers::posts::{PageQuery, PostListDto};

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CategoryDto {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) slug: String,
    pub(crate) is_published: bool,
    pub(crate) created_at: DateTime<Utc>,
}

impl From<Category> for CategoryDto {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            title: category.title,
            description: category.description,
            slug: category.slug,
            is_published: category.is_published,
            created_at: category.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CategoryPageDto {
    pub(crate) category: CategoryDto,
    pub(crate) posts: PostListDto,
}

impl From<CategoryPage> for CategoryPageDto {
    fn from(page: CategoryPage) -> Self {
        Self {
            category: page.category.into(),
            posts: page.posts.into(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/category/{slug}/",
    tag = "categories",
    params(
        ("slug" = String, Path, description = "Category slug"),
        ("page" = Option<u32>, Query, description = "Page number (1..=10000)")
    ),
    responses(
        (status = 200, description = "Category with its public posts", body = CategoryPageDto),
        (status = 400, description = "Invalid page"),
        (status = 404, description = "Category not found or unpublished"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn category_posts(
    State(state): State<AppState>,
    PathParams(slug): PathParams<String>,
    QueryParams(query): QueryParams<PageQuery>,
) -> AppResult<(StatusCode, Json<CategoryPageDto>)> {
    query.validate()?;

    let page = state
        .blog_service
        .category_posts(&slug, query.page())
        .await?;

    Ok((StatusCode::OK, Json(CategoryPageDto::from(page))))
}
