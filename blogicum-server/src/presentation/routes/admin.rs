use axum::Router;
use axum::middleware;
use axum::routing::{get, post};

use crate::presentation::AppState;
use crate::presentation::handlers::admin::{
    create_category, create_location, delete_category, delete_location, list_categories,
    list_locations, moderate_post, search_posts, update_category, update_location,
};
use crate::presentation::middleware::auth::jwt_auth_middleware;

/// Staff status is checked by the admin service, not here.
pub(crate) fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/categories/", get(list_categories).post(create_category))
        .route("/categories/{id}/", post(update_category))
        .route("/categories/{id}/delete/", post(delete_category))
        .route("/locations/", get(list_locations).post(create_location))
        .route("/locations/{id}/", post(update_location))
        .route("/locations/{id}/delete/", post(delete_location))
        .route("/posts/", get(search_posts))
        .route("/posts/{id}/", post(moderate_post))
        .layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}
