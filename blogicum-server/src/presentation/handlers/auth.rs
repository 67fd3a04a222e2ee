use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::auth_service::AuthResult;
use crate::domain::user::{LoginRequest, RegisterRequest, User};
use crate::presentation::AppState;
use crate::presentation::app_error::AppResult;
use crate::presentation::extract::JsonBody;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct RegistrationDto {
    #[validate(length(min = 3, max = 64))]
    pub(crate) username: String,
    #[validate(email)]
    pub(crate) email: String,
    #[validate(length(min = 8, max = 128))]
    pub(crate) password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct LoginDto {
    #[validate(length(min = 1, max = 64))]
    pub(crate) username: String,
    #[validate(length(min = 1))]
    pub(crate) password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct TokenDto {
    pub(crate) access_token: String,
    pub(crate) token_type: String,
    pub(crate) user: UserDto,
}

impl From<AuthResult> for TokenDto {
    fn from(result: AuthResult) -> Self {
        Self {
            access_token: result.access_token,
            token_type: "Bearer".to_string(),
            user: result.user.into(),
        }
    }
}

/// The full account, shown only to its owner.
#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct UserDto {
    pub(crate) id: i64,
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) is_staff: bool,
    pub(crate) created_at: DateTime<Utc>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            is_staff: user.is_staff,
            created_at: user.created_at,
        }
    }
}

#[utoipa::path(
    post,
    path = "/auth/registration/",
    tag = "auth",
    request_body = RegistrationDto,
    responses(
        (status = 201, description = "Account created", body = TokenDto),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Username or email already taken"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn registration(
    State(state): State<AppState>,
    JsonBody(dto): JsonBody<RegistrationDto>,
) -> AppResult<(StatusCode, Json<TokenDto>)> {
    dto.validate()?;

    let req = RegisterRequest {
        username: dto.username,
        email: dto.email,
        password: dto.password,
    };
    let result = state.auth_service.register(req).await?;

    Ok((StatusCode::CREATED, Json(TokenDto::from(result))))
}

#[utoipa::path(
    post,
    path = "/auth/login/",
    tag = "auth",
    request_body = LoginDto,
    responses(
        (status = 200, description = "Logged in", body = TokenDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn login(
    State(state): State<AppState>,
    JsonBody(dto): JsonBody<LoginDto>,
) -> AppResult<(StatusCode, Json<TokenDto>)> {
    dto.validate()?;

    let req = LoginRequest {
        username: dto.username,
        password: dto.password,
    };
    let result = state.auth_service.login(req).await?;

    Ok((StatusCode::OK, Json(TokenDto::from(result))))
}
