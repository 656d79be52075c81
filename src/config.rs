/*
 * Responsibility
 * - Load settings from the environment (SESSION_SECRET, DATABASE_URL, CORS, timeouts)
 * - Validate them up front (missing or malformed values abort startup)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use chrono::TimeDelta;

/// Upper bound for `SESSION_TTL_SECONDS` (30 days).
pub const MAX_SESSION_TTL_SECONDS: u64 = 60 * 60 * 24 * 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        match std::env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
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

#[derive(Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    // Postgres users store. When unset the process keeps users in memory.
    pub database_url: Option<String>,
    pub cors_allowed_origins: Vec<String>,

    pub request_timeout_seconds: u64,
    pub request_body_limit_bytes: usize,

    // HS256 secret shared by every issuance and verification path
    pub session_secret: String,
    pub session_ttl: TimeDelta,
    pub session_renewal_threshold: TimeDelta,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print the session secret
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("app_env", &self.app_env)
            .field("database", &self.database_url.is_some())
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("request_timeout_seconds", &self.request_timeout_seconds)
            .field("request_body_limit_bytes", &self.request_body_limit_bytes)
            .field("session_ttl_seconds", &self.session_ttl.num_seconds())
            .field(
                "session_renewal_threshold_seconds",
                &self.session_renewal_threshold.num_seconds(),
            )
            .finish_non_exhaustive()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let request_timeout_seconds = parse_or("REQUEST_TIMEOUT_SECONDS", 30)?;
        let request_body_limit_bytes = parse_or("REQUEST_BODY_LIMIT_BYTES", 1024 * 1024)?;

        let session_secret =
            std::env::var("SESSION_SECRET").map_err(|_| ConfigError::Missing("SESSION_SECRET"))?;
        if session_secret.trim().is_empty() {
            return Err(ConfigError::Invalid("SESSION_SECRET"));
        }

        let session_ttl = parse_seconds("SESSION_TTL_SECONDS", 3600)?; // 1 hour
        let session_renewal_threshold =
            parse_seconds("SESSION_RENEWAL_THRESHOLD_SECONDS", 600)?; // 10 min

        if session_ttl.is_zero() {
            return Err(ConfigError::Invalid("SESSION_TTL_SECONDS"));
        }
        // A threshold >= ttl would renew on every single request.
        if session_renewal_threshold >= session_ttl {
            return Err(ConfigError::Invalid("SESSION_RENEWAL_THRESHOLD_SECONDS"));
        }

        Ok(Self {
            addr,
            app_env,
            database_url,
            cors_allowed_origins,
            request_timeout_seconds,
            request_body_limit_bytes,
            session_secret,
            session_ttl,
            session_renewal_threshold,
        })
    }
}

/// Unset falls back to `default`; set-but-unparsable is a startup error.
fn parse_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        Err(_) => Ok(default),
    }
}

/// Whole seconds, capped at `MAX_SESSION_TTL_SECONDS`.
fn parse_seconds(key: &'static str, default: u64) -> Result<TimeDelta, ConfigError> {
    let seconds: u64 = parse_or(key, default)?;
    if seconds > MAX_SESSION_TTL_SECONDS {
        return Err(ConfigError::Invalid(key));
    }
    i64::try_from(seconds)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .ok_or(ConfigError::Invalid(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEYS: [&str; 9] = [
        "PORT",
        "APP_ENV",
        "DATABASE_URL",
        "CORS_ALLOWED_ORIGINS",
        "REQUEST_TIMEOUT_SECONDS",
        "REQUEST_BODY_LIMIT_BYTES",
        "SESSION_SECRET",
        "SESSION_TTL_SECONDS",
        "SESSION_RENEWAL_THRESHOLD_SECONDS",
    ];

    fn with_env<R>(vars: &[(&'static str, &'static str)], f: impl FnOnce() -> R) -> R {
        let mut scoped: Vec<(&str, Option<&str>)> = KEYS.iter().map(|k| (*k, None)).collect();
        for (k, v) in vars {
            scoped.retain(|(key, _)| key != k);
            scoped.push((*k, Some(*v)));
        }
        temp_env::with_vars(scoped, f)
    }

    #[test]
    fn defaults_apply_when_only_the_secret_is_set() {
        let config = with_env(&[("SESSION_SECRET", "s3cret")], Config::from_env).unwrap();

        assert_eq!(config.addr.port(), 3000);
        assert_eq!(config.app_env, AppEnv::Development);
        assert_eq!(config.database_url, None);
        assert!(config.cors_allowed_origins.is_empty());
        assert_eq!(config.session_ttl, TimeDelta::seconds(3600));
        assert_eq!(config.session_renewal_threshold, TimeDelta::seconds(600));
        assert_eq!(config.request_body_limit_bytes, 1024 * 1024);
    }

    #[test]
    fn missing_secret_fails_startup() {
        let err = with_env(&[], Config::from_env).unwrap_err();
        assert_eq!(err, ConfigError::Missing("SESSION_SECRET"));

        let err = with_env(&[("SESSION_SECRET", "   ")], Config::from_env).unwrap_err();
        assert_eq!(err, ConfigError::Invalid("SESSION_SECRET"));
    }

    #[test]
    fn threshold_must_stay_below_ttl() {
        let err = with_env(
            &[
                ("SESSION_SECRET", "s3cret"),
                ("SESSION_TTL_SECONDS", "600"),
                ("SESSION_RENEWAL_THRESHOLD_SECONDS", "600"),
            ],
            Config::from_env,
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::Invalid("SESSION_RENEWAL_THRESHOLD_SECONDS"));
    }

    #[test]
    fn oversized_lifetimes_are_rejected() {
        for ttl in ["18446744073709551615", "100000000000000000", "2592001"] {
            let err = with_env(
                &[("SESSION_SECRET", "s3cret"), ("SESSION_TTL_SECONDS", ttl)],
                Config::from_env,
            )
            .unwrap_err();
            assert_eq!(err, ConfigError::Invalid("SESSION_TTL_SECONDS"), "{ttl}");
        }

        let err = with_env(
            &[
                ("SESSION_SECRET", "s3cret"),
                ("SESSION_RENEWAL_THRESHOLD_SECONDS", "18446744073709551615"),
            ],
            Config::from_env,
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::Invalid("SESSION_RENEWAL_THRESHOLD_SECONDS"));
    }

    #[test]
    fn longest_allowed_ttl_is_accepted() {
        let config = with_env(
            &[("SESSION_SECRET", "s3cret"), ("SESSION_TTL_SECONDS", "2592000")],
            Config::from_env,
        )
        .unwrap();
        assert_eq!(
            config.session_ttl,
            TimeDelta::seconds(MAX_SESSION_TTL_SECONDS as i64)
        );
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        let err = with_env(
            &[("SESSION_SECRET", "s3cret"), ("REQUEST_TIMEOUT_SECONDS", "soon")],
            Config::from_env,
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::Invalid("REQUEST_TIMEOUT_SECONDS"));
    }

    #[test]
    fn production_env_and_origins_are_parsed() {
        let config = with_env(
            &[
                ("SESSION_SECRET", "s3cret"),
                ("APP_ENV", "PROD"),
                ("CORS_ALLOWED_ORIGINS", "https://a.example, ,https://b.example"),
            ],
            Config::from_env,
        )
        .unwrap();

        assert!(config.app_env.is_production());
        assert_eq!(
            config.cors_allowed_origins,
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
    }

    #[test]
    fn debug_output_hides_the_secret() {
        let config = with_env(&[("SESSION_SECRET", "do-not-print")], Config::from_env).unwrap();
        assert!(!format!("{config:?}").contains("do-not-print"));
    }
}
