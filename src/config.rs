/*
 * Responsibility
 * - Load settings from the environment (.env via dotenvy)
 * - Validate them; anything missing or malformed aborts start-up
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::services::auth::verifier::TokenPurpose;

const MAX_LEEWAY_SECONDS: u64 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(value: Option<String>) -> Self {
        match value
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Everything the token verification core needs, as plain values.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub issuer: String,
    pub audience: String,
    pub token_use: TokenPurpose,
    pub jwks_url: Url,
    pub keys_ttl: Duration,
    pub keys_fetch_timeout: Duration,
    pub keys_refresh_cooldown: Duration,
    pub keys_retry_backoff: Duration,
    pub leeway_seconds: u64,
    // Exact request paths that skip authentication.
    pub public_paths: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    // None selects the in-memory store.
    pub database_url: Option<String>,
    pub auth: AuthSettings,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port: u16 = match get("PORT") {
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 8888,
        };
        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(get("APP_ENV"));
        let database_url = get("DATABASE_URL");

        let issuer = match get("AUTH_ISSUER") {
            Some(issuer) => issuer.trim_end_matches('/').to_string(),
            None => {
                let region =
                    get("COGNITO_REGION").ok_or(ConfigError::Missing("AUTH_ISSUER"))?;
                let pool = get("COGNITO_USER_POOL_ID")
                    .ok_or(ConfigError::Missing("COGNITO_USER_POOL_ID"))?;
                format!("https://cognito-idp.{region}.amazonaws.com/{pool}")
            }
        };
        Url::parse(&issuer).map_err(|_| ConfigError::Invalid("AUTH_ISSUER"))?;

        let audience = get("AUTH_AUDIENCE")
            .or_else(|| get("COGNITO_CLIENT_ID"))
            .ok_or(ConfigError::Missing("AUTH_AUDIENCE"))?;

        let token_use = match get("AUTH_TOKEN_USE") {
            Some(v) => v
                .parse::<TokenPurpose>()
                .map_err(|_| ConfigError::Invalid("AUTH_TOKEN_USE"))?,
            None => TokenPurpose::Id,
        };

        let jwks_url = match get("AUTH_JWKS_URL") {
            Some(v) => v,
            None => format!("{issuer}/.well-known/jwks.json"),
        };
        let jwks_url = Url::parse(&jwks_url).map_err(|_| ConfigError::Invalid("AUTH_JWKS_URL"))?;

        let keys_ttl = Duration::from_secs(parse_or(&get, "AUTH_KEYS_TTL_SECONDS", 3600)?);

        let fetch_timeout_ms = parse_or(&get, "AUTH_KEYS_FETCH_TIMEOUT_MS", 3000)?;
        if fetch_timeout_ms == 0 {
            return Err(ConfigError::Invalid("AUTH_KEYS_FETCH_TIMEOUT_MS"));
        }
        let keys_fetch_timeout = Duration::from_millis(fetch_timeout_ms);

        let keys_refresh_cooldown =
            Duration::from_secs(parse_or(&get, "AUTH_KEYS_REFRESH_COOLDOWN_SECONDS", 30)?);

        let keys_retry_backoff =
            Duration::from_secs(parse_or(&get, "AUTH_KEYS_RETRY_BACKOFF_SECONDS", 30)?);

        let leeway_seconds = parse_or(&get, "AUTH_LEEWAY_SECONDS", 60)?;
        if leeway_seconds > MAX_LEEWAY_SECONDS {
            return Err(ConfigError::Invalid("AUTH_LEEWAY_SECONDS"));
        }

        let public_paths = get("AUTH_PUBLIC_PATHS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        Ok(Self {
            addr,
            app_env,
            database_url,
            auth: AuthSettings {
                issuer,
                audience,
                token_use,
                jwks_url,
                keys_ttl,
                keys_fetch_timeout,
                keys_refresh_cooldown,
                keys_retry_backoff,
                leeway_seconds,
                public_paths,
            },
        })
    }
}

fn parse_or<G>(get: &G, key: &'static str, default: u64) -> Result<u64, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(v) => v.parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}
