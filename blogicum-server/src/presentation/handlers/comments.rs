use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::comment::{AuthoredComment, Comment, CommentRequest};
use crate::presentation::AppState;
use crate::presentation::app_error::{AppError, AppResult};
use crate::presentation::extract::{JsonBody, PathParams};
use crate::presentation::guard::OnForbidden;
use crate::presentation::middleware::auth::AuthenticatedUser;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct CommentFormDto {
    #[validate(length(min = 1))]
    pub(crate) text: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CommentDto {
    pub(crate) id: i64,
    pub(crate) text: String,
    pub(crate) post_id: i64,
    pub(crate) author_id: i64,
    pub(crate) created_at: DateTime<Utc>,
}

impl From<Comment> for CommentDto {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            text: comment.text,
            post_id: comment.post_id,
            author_id: comment.author_id,
            created_at: comment.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct AuthoredCommentDto {
    pub(crate) id: i64,
    pub(crate) text: String,
    pub(crate) author_username: String,
    pub(crate) created_at: DateTime<Utc>,
}

impl From<AuthoredComment> for AuthoredCommentDto {
    fn from(authored: AuthoredComment) -> Self {
        Self {
            id: authored.comment.id,
            text: authored.comment.text,
            author_username: authored.author_username,
            created_at: authored.comment.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommentPath {
    pub(crate) id: i64,
    pub(crate) comment_id: i64,
}

#[utoipa::path(
    post,
    path = "/posts/{id}/comment/",
    tag = "comments",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    request_body = CommentFormDto,
    responses(
        (status = 201, description = "Comment added", body = CommentDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post not found or not visible"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn add_comment(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    PathParams(id): PathParams<i64>,
    JsonBody(dto): JsonBody<CommentFormDto>,
) -> AppResult<(StatusCode, Json<CommentDto>)> {
    dto.validate()?;

    let comment = state
        .comment_service
        .add_comment(auth.user_id, id, CommentRequest { text: dto.text })
        .await?;

    Ok((StatusCode::CREATED, Json(CommentDto::from(comment))))
}

#[utoipa::path(
    get,
    path = "/posts/{id}/edit_comment/{comment_id}/",
    tag = "comments",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id"),
        ("comment_id" = i64, Path, description = "Comment id")
    ),
    responses(
        (status = 200, description = "Current comment", body = CommentDto),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Comment not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn edit_comment_form(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    PathParams(path): PathParams<CommentPath>,
) -> AppResult<(StatusCode, Json<CommentDto>)> {
    owned_comment(&state, &auth, &path).await
}

#[utoipa::path(
    post,
    path = "/posts/{id}/edit_comment/{comment_id}/",
    tag = "comments",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id"),
        ("comment_id" = i64, Path, description = "Comment id")
    ),
    request_body = CommentFormDto,
    responses(
        (status = 200, description = "Comment updated", body = CommentDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Comment not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn update_comment(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    PathParams(path): PathParams<CommentPath>,
    body: Result<JsonBody<CommentFormDto>, AppError>,
) -> AppResult<(StatusCode, Json<CommentDto>)> {
    state
        .comment_service
        .comment_for_owner(auth.user_id, path.id, path.comment_id)
        .await
        .map_err(|err| OnForbidden::Deny.map(err))?;
    let JsonBody(dto) = body?;
    dto.validate()?;

    let comment = state
        .comment_service
        .update_comment(
            auth.user_id,
            path.id,
            path.comment_id,
            CommentRequest { text: dto.text },
        )
        .await
        .map_err(|err| OnForbidden::Deny.map(err))?;

    Ok((StatusCode::OK, Json(CommentDto::from(comment))))
}

#[utoipa::path(
    get,
    path = "/posts/{id}/delete_comment/{comment_id}/",
    tag = "comments",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id"),
        ("comment_id" = i64, Path, description = "Comment id")
    ),
    responses(
        (status = 200, description = "Comment pending deletion", body = CommentDto),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Comment not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_comment_form(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    PathParams(path): PathParams<CommentPath>,
) -> AppResult<(StatusCode, Json<CommentDto>)> {
    owned_comment(&state, &auth, &path).await
}

#[utoipa::path(
    post,
    path = "/posts/{id}/delete_comment/{comment_id}/",
    tag = "comments",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id"),
        ("comment_id" = i64, Path, description = "Comment id")
    ),
    responses(
        (status = 204, description = "Comment deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Comment not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_comment(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    PathParams(path): PathParams<CommentPath>,
) -> AppResult<StatusCode> {
    state
        .comment_service
        .delete_comment(auth.user_id, path.id, path.comment_id)
        .await
        .map_err(|err| OnForbidden::Deny.map(err))?;

    Ok(StatusCode::NO_CONTENT)
}

async fn owned_comment(
    state: &AppState,
    auth: &AuthenticatedUser,
    path: &CommentPath,
) -> AppResult<(StatusCode, Json<CommentDto>)> {
    let comment = state
        .comment_service
        .comment_for_owner(auth.user_id, path.id, path.comment_id)
        .await
        .map_err(|err| OnForbidden::Deny.map(err))?;

    Ok((StatusCode::OK, Json(CommentDto::from(comment))))
}
