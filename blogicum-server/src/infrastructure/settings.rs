use anyhow::{Context, Result, anyhow};

/// Runtime configuration read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub(crate) struct Settings {
    pub(crate) database_url: String,
    pub(crate) database_max_connections: u32,
    pub(crate) jwt_secret: String,
    pub(crate) jwt_ttl_seconds: i64,
    pub(crate) http_addr: String,
    pub(crate) cors_origins: Vec<String>,
    pub(crate) log_level: String,
    pub(crate) http_request_body_limit_bytes: usize,
    pub(crate) http_concurrency_limit: usize,
    pub(crate) http_request_timeout_secs: u64,
    pub(crate) posts_per_page: u32,
}

impl Settings {
    pub(crate) fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url = get_required(&lookup, "DATABASE_URL")?;
        let jwt_secret = get_required(&lookup, "JWT_SECRET")?;
        if jwt_secret.chars().count() < 32 {
            return Err(anyhow!("JWT_SECRET must be at least 32 characters"));
        }
        let jwt_ttl_seconds = parse_positive(&lookup, "JWT_TTL_SECONDS", 3600_i64)?;

        let http_addr = lookup("HTTP_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_string());
        let cors_origins = parse_cors_origins(
            &lookup("CORS_ORIGINS")
                .unwrap_or_else(|| "http://localhost:8000,http://127.0.0.1:8000".to_string()),
        );
        let log_level = lookup("LOG_LEVEL")
            .or_else(|| lookup("RUST_LOG"))
            .unwrap_or_else(|| "info".to_string());

        Ok(Self {
            database_url,
            database_max_connections: parse_positive(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?,
            jwt_secret,
            jwt_ttl_seconds,
            http_addr,
            cors_origins,
            log_level,
            http_request_body_limit_bytes: parse_positive(
                &lookup,
                "HTTP_REQUEST_BODY_LIMIT_BYTES",
                1024 * 1024,
            )?,
            http_concurrency_limit: parse_positive(&lookup, "HTTP_CONCURRENCY_LIMIT", 256)?,
            http_request_timeout_secs: parse_positive(&lookup, "HTTP_REQUEST_TIMEOUT_SECS", 10)?,
            posts_per_page: parse_positive(&lookup, "POSTS_PER_PAGE", 10)?,
        })
    }
}

fn get_required(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String> {
    let value = lookup(key).with_context(|| format!("{key} is required"))?;
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(anyhow!("{key} must not be empty"));
    }
    Ok(value)
}

fn parse_cors_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_positive<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr + PartialOrd + Default + Copy,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Failed to parse {key}, expecting positive integer"))?,
        None => default,
    };

    if value <= T::default() {
        return Err(anyhow!("{key} must be > 0"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::Settings;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn settings(vars: &[(&str, &str)]) -> anyhow::Result<Settings> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_are_applied() {
        let settings = settings(&[
            ("DATABASE_URL", "postgres://localhost/blogicum"),
            ("JWT_SECRET", SECRET),
        ])
        .expect("settings must load");

        assert_eq!(settings.http_addr, "0.0.0.0:8080");
        assert_eq!(settings.posts_per_page, 10);
        assert_eq!(settings.jwt_ttl_seconds, 3600);
        assert_eq!(settings.cors_origins.len(), 2);
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn database_url_is_required() {
        assert!(settings(&[("JWT_SECRET", SECRET)]).is_err());
    }

    #[test]
    fn short_jwt_secret_is_rejected() {
        let result = settings(&[
            ("DATABASE_URL", "postgres://localhost/blogicum"),
            ("JWT_SECRET", "short"),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let result = settings(&[
            ("DATABASE_URL", "postgres://localhost/blogicum"),
            ("JWT_SECRET", SECRET),
            ("POSTS_PER_PAGE", "0"),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn cors_origins_are_trimmed() {
        let settings = settings(&[
            ("DATABASE_URL", "postgres://localhost/blogicum"),
            ("JWT_SECRET", SECRET),
            ("CORS_ORIGINS", " http://a.test , ,http://b.test"),
        ])
        .expect("settings must load");
        assert_eq!(settings.cors_origins, vec!["http://a.test", "http://b.test"]);
    }
}
