use axum::{Router, routing::post};

use crate::presentation::AppState;
use crate::presentation::handlers::auth::{login, registration};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/registration/", post(registration))
        .route("/login/", post(login))
}
