use std::net::IpAddr;
use std::path::PathBuf;

use reelgen_render::RenderServiceConfig;
use url::Url;

use crate::auth::jwt::SessionConfig;

/// Minimum length of `AUTH_SECRET`.
const MIN_SECRET_LEN: usize = 32;

/// Default session lifetime: 30 days.
const DEFAULT_SESSION_MAX_AGE_SECS: i64 = 30 * 24 * 60 * 60;

/// Longest accepted session lifetime: one year.
const MAX_SESSION_MAX_AGE_SECS: i64 = 365 * 24 * 60 * 60;

/// A required variable is missing or malformed.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Public client id of an OAuth provider.
///
/// The matching client secret must be set for startup to succeed, but it is
/// not kept: code exchanges run on the backend.
#[derive(Debug, Clone)]
pub struct OAuthClientConfig {
    pub client_id: String,
}

/// Server configuration loaded from environment variables.
///
/// Everything is validated up front so a misconfigured deployment fails at
/// startup instead of on the first request that needs the value.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: IpAddr,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Directory holding the built pages (default: `public`).
    pub static_dir: PathBuf,
    /// Backend base URL handed to browser clients through `GET /api/config`.
    pub public_api_base_url: Url,
    /// Backend base URL used by this server.
    pub backend_url: Url,
    /// Public origin of this app; OAuth redirect URIs are built from it.
    pub app_url: Url,
    pub session: SessionConfig,
    pub google: OAuthClientConfig,
    /// TikTok calls the client id a "client key".
    pub tiktok: OAuthClientConfig,
    pub render: RenderServiceConfig,
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                 | Required | Default                 |
    /// |-------------------------|----------|-------------------------|
    /// | `PUBLIC_API_BASE_URL`   | **yes**  | --                      |
    /// | `BACKEND_URL`           | **yes**  | --                      |
    /// | `APP_URL`               | **yes**  | --                      |
    /// | `AUTH_SECRET`           | **yes**  | -- (>= 32 chars)        |
    /// | `GOOGLE_CLIENT_ID`      | **yes**  | --                      |
    /// | `GOOGLE_CLIENT_SECRET`  | **yes**  | --                      |
    /// | `TIKTOK_CLIENT_KEY`     | **yes**  | --                      |
    /// | `TIKTOK_CLIENT_SECRET`  | **yes**  | --                      |
    /// | `RENDER_SERVICE_URL`    | **yes**  | --                      |
    /// | `RENDER_SERVE_URL`      | **yes**  | --                      |
    /// | `RENDER_BUCKET_NAME`    | no       | `reelgen-renders`       |
    /// | `RENDER_COMPOSITION_ID` | no       | `ShortVideo`            |
    /// | `RENDER_SERVICE_TOKEN`  | no       | --                      |
    /// | `HOST`                  | no       | `0.0.0.0`               |
    /// | `PORT`                  | no       | `3000`                  |
    /// | `CORS_ORIGINS`          | no       | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`  | no       | `30`                    |
    /// | `STATIC_DIR`            | no       | `public`                |
    /// | `SESSION_MAX_AGE_SECS`  | no       | `2592000`               |
    /// | `COOKIE_SECURE`         | no       | `false`                 |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(lookup);

        let public_api_base_url = vars.url("PUBLIC_API_BASE_URL")?;
        let backend_url = vars.url("BACKEND_URL")?;
        let app_url = vars.url("APP_URL")?;

        let secret = vars.required("AUTH_SECRET")?;
        if secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::Invalid {
                var: "AUTH_SECRET",
                reason: format!("must be at least {MIN_SECRET_LEN} characters"),
            });
        }
        let max_age_secs: i64 = vars.parsed("SESSION_MAX_AGE_SECS", DEFAULT_SESSION_MAX_AGE_SECS)?;
        if !(1..=MAX_SESSION_MAX_AGE_SECS).contains(&max_age_secs) {
            return Err(ConfigError::Invalid {
                var: "SESSION_MAX_AGE_SECS",
                reason: format!("must be between 1 and {MAX_SESSION_MAX_AGE_SECS}"),
            });
        }
        let session = SessionConfig {
            secret,
            max_age_secs,
            cookie_secure: vars.parsed("COOKIE_SECURE", false)?,
        };

        let google = OAuthClientConfig {
            client_id: vars.required("GOOGLE_CLIENT_ID")?,
        };
        vars.required("GOOGLE_CLIENT_SECRET")?;
        let tiktok = OAuthClientConfig {
            client_id: vars.required("TIKTOK_CLIENT_KEY")?,
        };
        vars.required("TIKTOK_CLIENT_SECRET")?;

        let render = RenderServiceConfig {
            base_url: without_trailing_slash(&vars.url("RENDER_SERVICE_URL")?),
            serve_url: without_trailing_slash(&vars.url("RENDER_SERVE_URL")?),
            composition_id: vars.or("RENDER_COMPOSITION_ID", "ShortVideo"),
            bucket_name: vars.or("RENDER_BUCKET_NAME", "reelgen-renders"),
            token: vars.optional("RENDER_SERVICE_TOKEN"),
        };

        let cors_origins: Vec<String> = vars
            .or("CORS_ORIGINS", "http://localhost:5173")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            host: vars.parsed("HOST", IpAddr::from([0, 0, 0, 0]))?,
            port: vars.parsed("PORT", 3000)?,
            cors_origins,
            request_timeout_secs: vars.parsed("REQUEST_TIMEOUT_SECS", 30)?,
            static_dir: PathBuf::from(vars.or("STATIC_DIR", "public")),
            public_api_base_url,
            backend_url,
            app_url,
            session,
            google,
            tiktok,
            render,
        })
    }

    /// Absolute URL of a path on this app.
    pub fn app_link(&self, path: &str) -> String {
        format!("{}{}", without_trailing_slash(&self.app_url), path)
    }
}

pub(crate) fn without_trailing_slash(url: &Url) -> String {
    url.as_str().trim_end_matches('/').to_string()
}

struct Vars<F>(F);

impl<F: Fn(&str) -> Option<String>> Vars<F> {
    fn optional(&self, var: &'static str) -> Option<String> {
        (self.0)(var)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn required(&self, var: &'static str) -> Result<String, ConfigError> {
        self.optional(var).ok_or(ConfigError::Missing(var))
    }

    fn or(&self, var: &'static str, default: &str) -> String {
        self.optional(var).unwrap_or_else(|| default.to_string())
    }

    fn url(&self, var: &'static str) -> Result<Url, ConfigError> {
        let raw = self.required(var)?;
        let url = Url::parse(&raw).map_err(|e| ConfigError::Invalid {
            var,
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid {
                var,
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }
        Ok(url)
    }

    fn parsed<T>(&self, var: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match self.optional(var) {
            None => Ok(default),
            Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
                var,
                reason: e.to_string(),
            }),
        }
    }
}
