use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderValue, header, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::domain::visibility::Viewer;
use crate::infrastructure::jwt::JwtService;
use crate::presentation::AppState;
use crate::presentation::app_error::AppError;

#[derive(Debug, Clone)]
pub(crate) struct AuthenticatedUser {
    pub(crate) user_id: i64,
    pub(crate) username: String,
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}

/// Anonymous unless one of the auth middlewares authenticated the request.
impl<S> FromRequestParts<S> for Viewer
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<AuthenticatedUser>()
            .map_or(Viewer::Anonymous, |user| Viewer::User(user.user_id)))
    }
}

/// Rejects requests without a valid bearer token.
pub(crate) async fn jwt_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AppError::Unauthorized)?;
    let user = authenticate(&state.jwt, auth_header)?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Lets requests without an `Authorization` header through as anonymous;
/// a header that is present must still carry a valid token.
pub(crate) async fn optional_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Some(auth_header) = request.headers().get(header::AUTHORIZATION) {
        let user = authenticate(&state.jwt, auth_header)?;
        request.extensions_mut().insert(user);
    }

    Ok(next.run(request).await)
}

fn authenticate(jwt: &JwtService, auth_header: &HeaderValue) -> Result<AuthenticatedUser, AppError> {
    let auth_header = auth_header.to_str().map_err(|_| AppError::Unauthorized)?;

    let mut parts = auth_header.split_whitespace();
    let scheme = parts.next().ok_or(AppError::Unauthorized)?;
    let token = parts.next().ok_or(AppError::Unauthorized)?;
    if parts.next().is_some() || !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AppError::Unauthorized);
    }

    let claims = jwt
        .verify_token(token.trim())
        .map_err(|_| AppError::Unauthorized)?;

    Ok(AuthenticatedUser {
        user_id: claims.user_id,
        username: claims.username,
    })
}
