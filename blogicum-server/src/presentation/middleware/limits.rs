use std::time::Duration;

use axum::{BoxError, Json, Router, error_handling::HandleErrorLayer, http::StatusCode};
use tower::ServiceBuilder;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::warn;

use crate::infrastructure::settings::Settings;
use crate::presentation::app_error::ErrorBody;

/// Request timeout, in-flight request cap and body size limit. The cap is
/// shared by every route.
pub(crate) fn apply_limits(router: Router, settings: &Settings) -> Router {
    router
        .layer(RequestBodyLimitLayer::new(
            settings.http_request_body_limit_bytes,
        ))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_limit_error))
                .timeout(Duration::from_secs(settings.http_request_timeout_secs))
                .layer(GlobalConcurrencyLimitLayer::new(
                    settings.http_concurrency_limit,
                )),
        )
}

async fn handle_limit_error(err: BoxError) -> (StatusCode, Json<ErrorBody>) {
    if err.is::<tower::timeout::error::Elapsed>() {
        warn!("request timed out");
        return (
            StatusCode::REQUEST_TIMEOUT,
            Json(ErrorBody {
                error: "request timed out".to_string(),
            }),
        );
    }

    warn!(error = %err, "middleware error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            error: "internal error".to_string(),
        }),
    )
}
