use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::profile_service::ProfilePage;
use crate::domain::user::{ProfileUpdateRequest, User};
use crate::domain::visibility::Viewer;
use crate::presentation::AppState;
use crate::presentation::app_error::AppResult;
use crate::presentation::extract::{JsonBody, PathParams, QueryParams};
use crate::presentation::handlers::auth::UserDto;
use crate::presentation::handlers::posts::{PageQuery, PostListDto};
use crate::presentation::middleware::auth::AuthenticatedUser;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct ProfileFormDto {
    #[validate(length(min = 3, max = 64))]
    pub(crate) username: String,
    #[serde(default)]
    #[validate(length(max = 150))]
    pub(crate) first_name: String,
    #[serde(default)]
    #[validate(length(max = 150))]
    pub(crate) last_name: String,
    #[validate(email)]
    pub(crate) email: String,
}

/// Public view of a user; the email stays private.
#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ProfileDto {
    pub(crate) username: String,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) created_at: DateTime<Utc>,
}

impl From<User> for ProfileDto {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ProfilePageDto {
    pub(crate) profile: ProfileDto,
    pub(crate) posts: PostListDto,
}

impl From<ProfilePage> for ProfilePageDto {
    fn from(page: ProfilePage) -> Self {
        Self {
            profile: page.user.into(),
            posts: page.posts.into(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/profile/{username}/",
    tag = "profile",
    params(
        ("username" = String, Path, description = "Author username"),
        ("page" = Option<u32>, Query, description = "Page number (1..=10000)")
    ),
    responses(
        (status = 200, description = "Profile with the posts visible to the viewer", body = ProfilePageDto),
        (status = 400, description = "Invalid page"),
        (status = 401, description = "Invalid token"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn profile(
    State(state): State<AppState>,
    viewer: Viewer,
    PathParams(username): PathParams<String>,
    QueryParams(query): QueryParams<PageQuery>,
) -> AppResult<(StatusCode, Json<ProfilePageDto>)> {
    query.validate()?;

    let page = state
        .profile_service
        .profile(viewer, &username, query.page())
        .await?;

    Ok((StatusCode::OK, Json(ProfilePageDto::from(page))))
}

#[utoipa::path(
    get,
    path = "/profile/",
    tag = "profile",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Own editable profile", body = UserDto),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User no longer exists"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn own_profile(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> AppResult<(StatusCode, Json<UserDto>)> {
    let user = state.profile_service.own_profile(auth.user_id).await?;

    Ok((StatusCode::OK, Json(UserDto::from(user))))
}

#[utoipa::path(
    post,
    path = "/profile/",
    tag = "profile",
    security(
        ("bearer_auth" = [])
    ),
    request_body = ProfileFormDto,
    responses(
        (status = 200, description = "Profile updated", body = UserDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Username or email already taken"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn update_profile(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    JsonBody(dto): JsonBody<ProfileFormDto>,
) -> AppResult<(StatusCode, Json<UserDto>)> {
    dto.validate()?;

    let req = ProfileUpdateRequest {
        username: dto.username,
        first_name: dto.first_name,
        last_name: dto.last_name,
        email: dto.email,
    };
    let user = state
        .profile_service
        .update_profile(auth.user_id, req)
        .await?;

    Ok((StatusCode::OK, Json(UserDto::from(user))))
}
