use axum::Router;

use super::AppState;

pub(crate) mod admin;
pub(crate) mod auth;
pub(crate) mod blog;
pub(crate) mod profile;

pub(crate) fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(blog::router(state.clone()))
        .merge(profile::router(state.clone()))
        .nest("/auth", auth::router())
        .nest("/admin", admin::router(state))
}
