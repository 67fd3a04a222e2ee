use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::presentation::handlers::admin::{
    AdminPostQuery, CategoryFormDto, LocationDto, LocationFormDto, PostModerationDto,
};
use crate::presentation::handlers::auth::{LoginDto, RegistrationDto, TokenDto, UserDto};
use crate::presentation::handlers::categories::{CategoryDto, CategoryPageDto};
use crate::presentation::handlers::comments::{AuthoredCommentDto, CommentDto, CommentFormDto};
use crate::presentation::handlers::posts::{
    CategoryRefDto, LocationRefDto, PageQuery, PostCardDto, PostDetailDto, PostDto, PostFormDto,
    PostListDto,
};
use crate::presentation::handlers::profile::{ProfileDto, ProfileFormDto, ProfilePageDto};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::presentation::handlers::auth::registration,
        crate::presentation::handlers::auth::login,
        crate::presentation::handlers::posts::index,
        crate::presentation::handlers::posts::create_post,
        crate::presentation::handlers::posts::post_detail,
        crate::presentation::handlers::posts::edit_post_form,
        crate::presentation::handlers::posts::update_post,
        crate::presentation::handlers::posts::delete_post_form,
        crate::presentation::handlers::posts::delete_post,
        crate::presentation::handlers::comments::add_comment,
        crate::presentation::handlers::comments::edit_comment_form,
        crate::presentation::handlers::comments::update_comment,
        crate::presentation::handlers::comments::delete_comment_form,
        crate::presentation::handlers::comments::delete_comment,
        crate::presentation::handlers::categories::category_posts,
        crate::presentation::handlers::profile::profile,
        crate::presentation::handlers::profile::own_profile,
        crate::presentation::handlers::profile::update_profile,
        crate::presentation::handlers::admin::list_categories,
        crate::presentation::handlers::admin::create_category,
        crate::presentation::handlers::admin::update_category,
        crate::presentation::handlers::admin::delete_category,
        crate::presentation::handlers::admin::list_locations,
        crate::presentation::handlers::admin::create_location,
        crate::presentation::handlers::admin::update_location,
        crate::presentation::handlers::admin::delete_location,
        crate::presentation::handlers::admin::search_posts,
        crate::presentation::handlers::admin::moderate_post
    ),
    components(
        schemas(
            RegistrationDto,
            LoginDto,
            TokenDto,
            UserDto,
            PageQuery,
            PostFormDto,
            PostDto,
            PostCardDto,
            CategoryRefDto,
            LocationRefDto,
            PostListDto,
            PostDetailDto,
            CommentFormDto,
            CommentDto,
            AuthoredCommentDto,
            CategoryDto,
            CategoryPageDto,
            ProfileFormDto,
            ProfileDto,
            ProfilePageDto,
            CategoryFormDto,
            LocationFormDto,
            LocationDto,
            AdminPostQuery,
            PostModerationDto
        )
    ),
    tags(
        (name = "auth", description = "Registration and login"),
        (name = "posts", description = "Post listing, detail and authoring"),
        (name = "comments", description = "Comments under posts"),
        (name = "categories", description = "Category pages"),
        (name = "profile", description = "Author profiles"),
        (name = "admin", description = "Staff-only management")
    ),
    modifiers(&SecurityAddon)
)]
pub(crate) struct ApiDoc;

pub(crate) struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let mut components = openapi.components.take().unwrap_or_default();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
        openapi.components = Some(components);
    }
}

#[cfg(test)]
mod tests {
    use utoipa::OpenApi;

    use super::ApiDoc;

    #[test]
    fn document_lists_blog_routes_and_bearer_scheme() {
        let doc = ApiDoc::openapi();
        for path in [
            "/",
            "/posts/{id}/",
            "/posts/{id}/edit_comment/{comment_id}/",
            "/profile/",
            "/admin/posts/",
            "/admin/posts/{id}/",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
        let components = doc.components.expect("components must be set");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
