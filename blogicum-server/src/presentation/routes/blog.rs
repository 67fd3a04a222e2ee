use axum::Router;
use axum::middleware;
use axum::routing::{get, post};

use crate::presentation::AppState;
use crate::presentation::handlers::categories::category_posts;
use crate::presentation::handlers::comments::{
    add_comment, delete_comment, delete_comment_form, edit_comment_form, update_comment,
};
use crate::presentation::handlers::posts::{
    create_post, delete_post, delete_post_form, edit_post_form, index, post_detail, update_post,
};
use crate::presentation::middleware::auth::{jwt_auth_middleware, optional_auth_middleware};

pub(crate) fn router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/", get(index))
        .route("/posts/{id}/", get(post_detail))
        .route("/category/{slug}/", get(category_posts))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            optional_auth_middleware,
        ));

    let protected = Router::new()
        .route("/posts/create/", post(create_post))
        .route("/posts/{id}/edit/", get(edit_post_form).post(update_post))
        .route(
            "/posts/{id}/delete/",
            get(delete_post_form).post(delete_post),
        )
        .route("/posts/{id}/comment/", post(add_comment))
        .route(
            "/posts/{id}/edit_comment/{comment_id}/",
            get(edit_comment_form).post(update_comment),
        )
        .route(
            "/posts/{id}/delete_comment/{comment_id}/",
            get(delete_comment_form).post(delete_comment),
        )
        .layer(middleware::from_fn_with_state(state, jwt_auth_middleware));

    public.merge(protected)
}
