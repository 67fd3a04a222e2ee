//! Staff-only management of categories and locations, plus a post search
//! that ignores visibility and a moderation edit of any post.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::data::post_repository::{PostModeration, PostSearch};
use crate::domain::category::CategoryRequest;
use crate::domain::location::{Location, LocationRequest};
use crate::domain::publishable::Publishable;
use crate::presentation::AppState;
use crate::presentation::app_error::AppResult;
use crate::presentation::extract::{JsonBody, PathParams, QueryParams};
use crate::presentation::handlers::categories::CategoryDto;
use crate::presentation::handlers::posts::{PostDto, PostListDto};
use crate::presentation::middleware::auth::AuthenticatedUser;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct CategoryFormDto {
    #[validate(length(min = 1, max = 256))]
    pub(crate) title: String,
    #[validate(length(min = 1))]
    pub(crate) description: String,
    #[validate(length(min = 1, max = 64))]
    pub(crate) slug: String,
    #[serde(default = "published_by_default")]
    pub(crate) is_published: bool,
}

impl From<CategoryFormDto> for CategoryRequest {
    fn from(dto: CategoryFormDto) -> Self {
        Self {
            title: dto.title,
            description: dto.description,
            slug: dto.slug,
            is_published: dto.is_published,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct LocationFormDto {
    #[validate(length(min = 1, max = 256))]
    pub(crate) name: String,
    #[serde(default = "published_by_default")]
    pub(crate) is_published: bool,
}

impl From<LocationFormDto> for LocationRequest {
    fn from(dto: LocationFormDto) -> Self {
        Self {
            name: dto.name,
            is_published: dto.is_published,
        }
    }
}

fn published_by_default() -> bool {
    true
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct LocationDto {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) is_published: bool,
    pub(crate) created_at: DateTime<Utc>,
}

impl From<Location> for LocationDto {
    fn from(location: Location) -> Self {
        let is_published = location.is_published();
        let created_at = location.created_at();
        Self {
            id: location.id,
            name: location.name,
            is_published,
            created_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct AdminPostQuery {
    #[validate(length(max = 256))]
    pub(crate) search: Option<String>,
    #[validate(range(min = 1, max = 10_000))]
    pub(crate) page: Option<u32>,
    /// Inclusive lower bound on `created_at`, RFC 3339.
    pub(crate) created_after: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `created_at`, RFC 3339.
    pub(crate) created_before: Option<DateTime<Utc>>,
}

impl From<AdminPostQuery> for PostSearch {
    fn from(query: AdminPostQuery) -> Self {
        Self {
            title_contains: query.search,
            created_after: query.created_after,
            created_before: query.created_before,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct PostModerationDto {
    pub(crate) is_published: bool,
    #[validate(range(min = 1))]
    pub(crate) category_id: Option<i64>,
}

impl From<PostModerationDto> for PostModeration {
    fn from(dto: PostModerationDto) -> Self {
        Self {
            is_published: dto.is_published,
            category_id: dto.category_id,
        }
    }
}

#[utoipa::path(
    get,
    path = "/admin/categories/",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "All categories", body = [CategoryDto]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not staff"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_categories(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> AppResult<(StatusCode, Json<Vec<CategoryDto>>)> {
    let categories = state.admin_service.list_categories(auth.user_id).await?;

    Ok((
        StatusCode::OK,
        Json(categories.into_iter().map(CategoryDto::from).collect()),
    ))
}

#[utoipa::path(
    post,
    path = "/admin/categories/",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    request_body = CategoryFormDto,
    responses(
        (status = 201, description = "Category created", body = CategoryDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not staff"),
        (status = 409, description = "Slug already taken"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn create_category(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    JsonBody(dto): JsonBody<CategoryFormDto>,
) -> AppResult<(StatusCode, Json<CategoryDto>)> {
    dto.validate()?;

    let category = state
        .admin_service
        .create_category(auth.user_id, dto.into())
        .await?;

    Ok((StatusCode::CREATED, Json(CategoryDto::from(category))))
}

#[utoipa::path(
    post,
    path = "/admin/categories/{id}/",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Category id")
    ),
    request_body = CategoryFormDto,
    responses(
        (status = 200, description = "Category updated", body = CategoryDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not staff"),
        (status = 404, description = "Category not found"),
        (status = 409, description = "Slug already taken"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn update_category(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    PathParams(id): PathParams<i64>,
    JsonBody(dto): JsonBody<CategoryFormDto>,
) -> AppResult<(StatusCode, Json<CategoryDto>)> {
    dto.validate()?;

    let category = state
        .admin_service
        .update_category(auth.user_id, id, dto.into())
        .await?;

    Ok((StatusCode::OK, Json(CategoryDto::from(category))))
}

#[utoipa::path(
    post,
    path = "/admin/categories/{id}/delete/",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Category id")
    ),
    responses(
        (status = 204, description = "Category and its posts deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not staff"),
        (status = 404, description = "Category not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_category(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    PathParams(id): PathParams<i64>,
) -> AppResult<StatusCode> {
    state.admin_service.delete_category(auth.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/admin/locations/",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "All locations", body = [LocationDto]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not staff"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_locations(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> AppResult<(StatusCode, Json<Vec<LocationDto>>)> {
    let locations = state.admin_service.list_locations(auth.user_id).await?;

    Ok((
        StatusCode::OK,
        Json(locations.into_iter().map(LocationDto::from).collect()),
    ))
}

#[utoipa::path(
    post,
    path = "/admin/locations/",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    request_body = LocationFormDto,
    responses(
        (status = 201, description = "Location created", body = LocationDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not staff"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn create_location(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    JsonBody(dto): JsonBody<LocationFormDto>,
) -> AppResult<(StatusCode, Json<LocationDto>)> {
    dto.validate()?;

    let location = state
        .admin_service
        .create_location(auth.user_id, dto.into())
        .await?;

    Ok((StatusCode::CREATED, Json(LocationDto::from(location))))
}

#[utoipa::path(
    post,
    path = "/admin/locations/{id}/",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Location id")
    ),
    request_body = LocationFormDto,
    responses(
        (status = 200, description = "Location updated", body = LocationDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not staff"),
        (status = 404, description = "Location not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn update_location(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    PathParams(id): PathParams<i64>,
    JsonBody(dto): JsonBody<LocationFormDto>,
) -> AppResult<(StatusCode, Json<LocationDto>)> {
    dto.validate()?;

    let location = state
        .admin_service
        .update_location(auth.user_id, id, dto.into())
        .await?;

    Ok((StatusCode::OK, Json(LocationDto::from(location))))
}

#[utoipa::path(
    post,
    path = "/admin/locations/{id}/delete/",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Location id")
    ),
    responses(
        (status = 204, description = "Location deleted, posts keep no location"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not staff"),
        (status = 404, description = "Location not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_location(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    PathParams(id): PathParams<i64>,
) -> AppResult<StatusCode> {
    state.admin_service.delete_location(auth.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/admin/posts/",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("search" = Option<String>, Query, description = "Case-insensitive title substring"),
        ("page" = Option<u32>, Query, description = "Page number (1..=10000)"),
        ("created_after" = Option<String>, Query, description = "Earliest created_at, RFC 3339"),
        ("created_before" = Option<String>, Query, description = "Latest created_at, RFC 3339")
    ),
    responses(
        (status = 200, description = "All matching posts, newest first", body = PostListDto),
        (status = 400, description = "Invalid query"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not staff"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn search_posts(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    QueryParams(query): QueryParams<AdminPostQuery>,
) -> AppResult<(StatusCode, Json<PostListDto>)> {
    query.validate()?;

    let page_number = query.page.unwrap_or(1);
    let page = state
        .admin_service
        .search_posts(auth.user_id, query.into(), page_number)
        .await?;

    Ok((StatusCode::OK, Json(PostListDto::from(page))))
}

#[utoipa::path(
    post,
    path = "/admin/posts/{id}/",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    request_body = PostModerationDto,
    responses(
        (status = 200, description = "Publication flag and category updated", body = PostDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not staff"),
        (status = 404, description = "Post or category not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn moderate_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    PathParams(id): PathParams<i64>,
    JsonBody(dto): JsonBody<PostModerationDto>,
) -> AppResult<(StatusCode, Json<PostDto>)> {
    dto.validate()?;

    let post = state
        .admin_service
        .moderate_post(auth.user_id, id, dto.into())
        .await?;

    Ok((StatusCode::OK, Json(PostDto::from(post))))
}
