use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::blog_service::{PostDetail, PostPage};
use crate::domain::post::{AnnotatedPost, Post, PostRequest};
use crate::domain::visibility::Viewer;
use crate::presentation::AppState;
use crate::presentation::app_error::{AppError, AppResult};
use crate::presentation::extract::{JsonBody, PathParams, QueryParams};
use crate::presentation::guard::OnForbidden;
use crate::presentation::handlers::comments::AuthoredCommentDto;
use crate::presentation::middleware::auth::AuthenticatedUser;

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub(crate) struct PageQuery {
    #[validate(range(min = 1, max = 10_000))]
    pub(crate) page: Option<u32>,
}

impl PageQuery {
    pub(crate) fn page(&self) -> u32 {
        self.page.unwrap_or(1)
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct PostFormDto {
    #[validate(length(min = 1, max = 256))]
    pub(crate) title: String,
    #[validate(length(min = 1))]
    pub(crate) text: String,
    pub(crate) pub_date: DateTime<Utc>,
    #[validate(range(min = 1))]
    pub(crate) location_id: Option<i64>,
    #[validate(range(min = 1))]
    pub(crate) category_id: Option<i64>,
    #[serde(default = "published_by_default")]
    pub(crate) is_published: bool,
}

fn published_by_default() -> bool {
    true
}

impl From<PostFormDto> for PostRequest {
    fn from(dto: PostFormDto) -> Self {
        Self {
            title: dto.title,
            text: dto.text,
            pub_date: dto.pub_date,
            location_id: dto.location_id,
            category_id: dto.category_id,
            is_published: dto.is_published,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostDto {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) text: String,
    pub(crate) pub_date: DateTime<Utc>,
    pub(crate) author_id: i64,
    pub(crate) location_id: Option<i64>,
    pub(crate) category_id: Option<i64>,
    pub(crate) is_published: bool,
    pub(crate) created_at: DateTime<Utc>,
}

impl From<Post> for PostDto {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            title: post.title,
            text: post.text,
            pub_date: post.pub_date,
            author_id: post.author_id,
            location_id: post.location_id,
            category_id: post.category_id,
            is_published: post.is_published,
            created_at: post.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CategoryRefDto {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) slug: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct LocationRefDto {
    pub(crate) id: i64,
    pub(crate) name: String,
}

/// A post as it appears in listings and on its own page.
#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostCardDto {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) text: String,
    pub(crate) pub_date: DateTime<Utc>,
    pub(crate) author_username: String,
    pub(crate) category: Option<CategoryRefDto>,
    /// Present only while the location is published.
    pub(crate) location: Option<LocationRefDto>,
    pub(crate) is_published: bool,
    pub(crate) comment_count: i64,
    pub(crate) created_at: DateTime<Utc>,
}

impl From<AnnotatedPost> for PostCardDto {
    fn from(annotated: AnnotatedPost) -> Self {
        let AnnotatedPost {
            post,
            author_username,
            category,
            location,
            comment_count,
        } = annotated;

        Self {
            id: post.id,
            title: post.title,
            text: post.text,
            pub_date: post.pub_date,
            author_username,
            category: category.map(|category| CategoryRefDto {
                id: category.id,
                title: category.title,
                slug: category.slug,
            }),
            location: location
                .filter(|location| location.is_published)
                .map(|location| LocationRefDto {
                    id: location.id,
                    name: location.name,
                }),
            is_published: post.is_published,
            comment_count,
            created_at: post.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostListDto {
    pub(crate) posts: Vec<PostCardDto>,
    pub(crate) page: u32,
    pub(crate) page_size: u32,
    pub(crate) total: i64,
    pub(crate) num_pages: i64,
}

impl From<PostPage> for PostListDto {
    fn from(page: PostPage) -> Self {
        let num_pages = page.num_pages();
        Self {
            posts: page.posts.into_iter().map(PostCardDto::from).collect(),
            page: page.page,
            page_size: page.page_size,
            total: page.total,
            num_pages,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostDetailDto {
    pub(crate) post: PostCardDto,
    pub(crate) comments: Vec<AuthoredCommentDto>,
}

impl From<PostDetail> for PostDetailDto {
    fn from(detail: PostDetail) -> Self {
        Self {
            post: detail.post.into(),
            comments: detail
                .comments
                .into_iter()
                .map(AuthoredCommentDto::from)
                .collect(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/",
    tag = "posts",
    params(
        ("page" = Option<u32>, Query, description = "Page number (1..=10000)")
    ),
    responses(
        (status = 200, description = "Publicly visible posts", body = PostListDto),
        (status = 400, description = "Invalid page"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn index(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<PageQuery>,
) -> AppResult<(StatusCode, Json<PostListDto>)> {
    query.validate()?;

    let page = state.blog_service.index(query.page()).await?;

    Ok((StatusCode::OK, Json(PostListDto::from(page))))
}

#[utoipa::path(
    post,
    path = "/posts/create/",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    request_body = PostFormDto,
    responses(
        (status = 201, description = "Post created", body = PostDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Category or location not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn create_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    JsonBody(dto): JsonBody<PostFormDto>,
) -> AppResult<(StatusCode, Json<PostDto>)> {
    dto.validate()?;

    let post = state
        .blog_service
        .create_post(auth.user_id, dto.into())
        .await?;

    Ok((StatusCode::CREATED, Json(PostDto::from(post))))
}

#[utoipa::path(
    get,
    path = "/posts/{id}/",
    tag = "posts",
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Post with its comments", body = PostDetailDto),
        (status = 401, description = "Invalid token"),
        (status = 404, description = "Post not found or not visible"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn post_detail(
    State(state): State<AppState>,
    viewer: Viewer,
    PathParams(id): PathParams<i64>,
) -> AppResult<(StatusCode, Json<PostDetailDto>)> {
    let detail = state.blog_service.post_detail(viewer, id).await?;

    Ok((StatusCode::OK, Json(PostDetailDto::from(detail))))
}

#[utoipa::path(
    get,
    path = "/posts/{id}/edit/",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Current post", body = PostCardDto),
        (status = 302, description = "Not the author, redirected to the post"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn edit_post_form(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    PathParams(id): PathParams<i64>,
) -> AppResult<(StatusCode, Json<PostCardDto>)> {
    owned_post(&state, &auth, id).await
}

#[utoipa::path(
    post,
    path = "/posts/{id}/edit/",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    request_body = PostFormDto,
    responses(
        (status = 200, description = "Post updated", body = PostDto),
        (status = 302, description = "Not the author, redirected to the post"),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post, category or location not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn update_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    PathParams(id): PathParams<i64>,
    body: Result<JsonBody<PostFormDto>, AppError>,
) -> AppResult<(StatusCode, Json<PostDto>)> {
    let on_forbidden = OnForbidden::RedirectToPost(id);
    // Non-authors are redirected even when the body is unreadable or invalid.
    state
        .blog_service
        .post_for_owner(auth.user_id, id)
        .await
        .map_err(|err| on_forbidden.map(err))?;
    let JsonBody(dto) = body?;
    dto.validate()?;

    let post = state
        .blog_service
        .update_post(auth.user_id, id, dto.into())
        .await
        .map_err(|err| on_forbidden.map(err))?;

    Ok((StatusCode::OK, Json(PostDto::from(post))))
}

#[utoipa::path(
    get,
    path = "/posts/{id}/delete/",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Post pending deletion", body = PostCardDto),
        (status = 302, description = "Not the author, redirected to the post"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_post_form(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    PathParams(id): PathParams<i64>,
) -> AppResult<(StatusCode, Json<PostCardDto>)> {
    owned_post(&state, &auth, id).await
}

#[utoipa::path(
    post,
    path = "/posts/{id}/delete/",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 204, description = "Post deleted"),
        (status = 302, description = "Not the author, redirected to the post"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    PathParams(id): PathParams<i64>,
) -> AppResult<StatusCode> {
    state
        .blog_service
        .delete_post(auth.user_id, id)
        .await
        .map_err(|err| OnForbidden::RedirectToPost(id).map(err))?;

    Ok(StatusCode::NO_CONTENT)
}

async fn owned_post(
    state: &AppState,
    auth: &AuthenticatedUser,
    id: i64,
) -> AppResult<(StatusCode, Json<PostCardDto>)> {
    let post = state
        .blog_service
        .post_for_owner(auth.user_id, id)
        .await
        .map_err(|err| OnForbidden::RedirectToPost(id).map(err))?;

    Ok((StatusCode::OK, Json(PostCardDto::from(post))))
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use validator::Validate;

    use super::{PageQuery, PostCardDto, PostFormDto};
    use crate::domain::post::{AnnotatedPost, CategoryRef, LocationRef, Post, PostFields};

    fn annotated(location_published: bool) -> AnnotatedPost {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let post = Post::new(PostFields {
            id: 1,
            title: "Trip".to_string(),
            text: "Went north".to_string(),
            pub_date: now,
            author_id: 2,
            location_id: Some(3),
            category_id: Some(4),
            is_published: true,
            created_at: now,
        })
        .unwrap();

        AnnotatedPost {
            post,
            author_username: "writer".to_string(),
            category: Some(CategoryRef {
                id: 4,
                title: "Travel".to_string(),
                slug: "travel".to_string(),
                is_published: true,
            }),
            location: Some(LocationRef {
                id: 3,
                name: "Oslo".to_string(),
                is_published: location_published,
            }),
            comment_count: 7,
        }
    }

    #[test]
    fn unpublished_location_is_not_shown() {
        let card = PostCardDto::from(annotated(false));
        assert!(card.location.is_none());
        assert_eq!(card.comment_count, 7);
        assert_eq!(card.category.map(|c| c.slug), Some("travel".to_string()));
    }

    #[test]
    fn published_location_is_shown() {
        let card = PostCardDto::from(annotated(true));
        assert_eq!(card.location.map(|l| l.name), Some("Oslo".to_string()));
    }

    #[test]
    fn page_query_bounds() {
        assert_eq!(PageQuery::default().page(), 1);
        assert!(PageQuery { page: Some(0) }.validate().is_err());
        assert!(PageQuery { page: Some(10_001) }.validate().is_err());
        assert!(PageQuery { page: Some(10_000) }.validate().is_ok());
    }

    #[test]
    fn form_defaults_to_published() {
        let dto: PostFormDto = serde_json::from_str(
            r#"{"title":"t","text":"x","pub_date":"2024-05-01T12:00:00Z"}"#,
        )
        .unwrap();
        assert!(dto.is_published);
        assert!(dto.category_id.is_none());
    }
}
