use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::user::User;

#[derive(Debug, Error)]
pub(crate) enum JwtError {
    #[error("token encode failed")]
    Encode(#[source] jsonwebtoken::errors::Error),

    #[error("token decode/validation failed")]
    Decode(#[source] jsonwebtoken::errors::Error),
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub(crate) struct Claims {
    pub(crate) user_id: i64,
    pub(crate) username: String,
    pub(crate) exp: i64,
}

/// HS256 access tokens identifying the requesting user.
pub(crate) struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl JwtService {
    const DEFAULT_TTL_SECONDS: i64 = 24 * 60 * 60;
    const LEEWAY_SECONDS: u64 = 10;

    pub(crate) fn new(secret: &str, ttl_seconds: i64) -> Self {
        let ttl_seconds = if ttl_seconds > 0 {
            ttl_seconds
        } else {
            Self::DEFAULT_TTL_SECONDS
        };

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::seconds(ttl_seconds),
        }
    }

    pub(crate) fn issue_for(&self, user: &User) -> Result<String, JwtError> {
        let claims = Claims {
            user_id: user.id,
            username: user.username.clone(),
            exp: (Utc::now() + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(JwtError::Encode)
    }

    pub(crate) fn verify_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = Self::LEEWAY_SECONDS;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(JwtError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::JwtService;
    use crate::domain::user::{User, UserFields};

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn user() -> User {
        User::new(UserFields {
            id: 42,
            username: "writer".to_string(),
            email: "writer@example.com".to_string(),
            first_name: String::new(),
            last_name: String::new(),
            is_staff: false,
            created_at: Utc::now(),
        })
        .expect("sample user must be valid")
    }

    #[test]
    fn issued_token_round_trips_claims() {
        let jwt = JwtService::new(SECRET, 3600);
        let token = jwt.issue_for(&user()).expect("token must be issued");

        let claims = jwt.verify_token(&token).expect("token must verify");
        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.username, "writer");
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = JwtService::new(SECRET, 3600)
            .issue_for(&user())
            .expect("token must be issued");

        let other = JwtService::new("fedcba9876543210fedcba9876543210", 3600);
        assert!(other.verify_token(&token).is_err());
    }
}
