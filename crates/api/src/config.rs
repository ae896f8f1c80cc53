use axum::http::HeaderValue;
use tracker_sync::sheets::DEFAULT_API_BASE;
use tracker_sync::SheetsConfig;

/// A configuration value that could not be used.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} must be set")]
    Missing { key: &'static str },

    #[error("{key} must be a valid {expected}, got '{value}'")]
    Invalid {
        key: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Longest accepted session lifetime: ten years.
pub const MAX_SESSION_TTL_HOURS: i64 = 87_600;

/// Session cookie settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Cookie carrying the session token (default: `tracker_session`).
    pub cookie_name: String,
    /// Session lifetime in hours (default: `168`, at most [`MAX_SESSION_TTL_HOURS`]).
    pub ttl_hours: i64,
    /// Add the `Secure` attribute to the cookie (default: `false`).
    pub cookie_secure: bool,
    /// Interval of the expired-session purge job (default: `3600`).
    pub cleanup_interval_secs: u64,
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development except the
/// database URL, which `main` reads separately.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<HeaderValue>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long shutdown waits for background work to drain (default: `10`).
    pub shutdown_timeout_secs: u64,
    /// Maximum database pool size (default: `10`).
    pub db_max_connections: u32,
    pub session: SessionConfig,
    /// Spreadsheet mirror target. `None` runs the mirror in memory.
    pub sheets: Option<SheetsConfig>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                         | Default                            |
    /// |---------------------------------|------------------------------------|
    /// | `HOST`                          | `0.0.0.0`                          |
    /// | `PORT`                          | `3000`                             |
    /// | `CORS_ORIGINS`                  | `http://localhost:5173`            |
    /// | `REQUEST_TIMEOUT_SECS`          | `30`                               |
    /// | `SHUTDOWN_TIMEOUT_SECS`         | `10`                               |
    /// | `DB_MAX_CONNECTIONS`            | `10`                               |
    /// | `SESSION_COOKIE_NAME`           | `tracker_session`                  |
    /// | `SESSION_TTL_HOURS`             | `168`                              |
    /// | `SESSION_COOKIE_SECURE`         | `false`                            |
    /// | `SESSION_CLEANUP_INTERVAL_SECS` | `3600`                             |
    /// | `SHEETS_SPREADSHEET_ID`         | unset (in-memory mirror)           |
    /// | `SHEETS_ACCESS_TOKEN`           | required with a spreadsheet id     |
    /// | `SHEETS_SHEET_NAME`             | `Issues`                           |
    /// | `SHEETS_API_BASE`               | `https://sheets.googleapis.com/v4` |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let cors_origins = env
            .string("CORS_ORIGINS", "http://localhost:5173")
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|origin| {
                origin.parse::<HeaderValue>().map_err(|_| ConfigError::Invalid {
                    key: "CORS_ORIGINS",
                    expected: "origin list",
                    value: origin.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let session = SessionConfig {
            cookie_name: env.string("SESSION_COOKIE_NAME", "tracker_session"),
            ttl_hours: env.parse("SESSION_TTL_HOURS", 168, "positive integer")?,
            cookie_secure: env.flag("SESSION_COOKIE_SECURE", false)?,
            cleanup_interval_secs: env.parse(
                "SESSION_CLEANUP_INTERVAL_SECS",
                3600,
                "positive integer",
            )?,
        };
        if !(1..=MAX_SESSION_TTL_HOURS).contains(&session.ttl_hours) {
            return Err(ConfigError::Invalid {
                key: "SESSION_TTL_HOURS",
                expected: "integer between 1 and 87600",
                value: session.ttl_hours.to_string(),
            });
        }
        if session.cleanup_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "SESSION_CLEANUP_INTERVAL_SECS",
                expected: "positive integer",
                value: "0".into(),
            });
        }

        let sheets = match env.optional("SHEETS_SPREADSHEET_ID") {
            None => None,
            Some(spreadsheet_id) => Some(SheetsConfig {
                api_base: env.string("SHEETS_API_BASE", DEFAULT_API_BASE),
                spreadsheet_id,
                sheet_name: env.string("SHEETS_SHEET_NAME", "Issues"),
                access_token: env.optional("SHEETS_ACCESS_TOKEN").ok_or(
                    ConfigError::Missing {
                        key: "SHEETS_ACCESS_TOKEN",
                    },
                )?,
            }),
        };

        Ok(Self {
            host: env.string("HOST", "0.0.0.0"),
            port: env.parse("PORT", 3000, "u16")?,
            cors_origins,
            request_timeout_secs: env.parse("REQUEST_TIMEOUT_SECS", 30, "u64")?,
            shutdown_timeout_secs: env.parse("SHUTDOWN_TIMEOUT_SECS", 10, "u64")?,
            db_max_connections: env.parse("DB_MAX_CONNECTIONS", 10, "u32")?,
            session,
            sheets,
        })
    }
}

struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Set and non-blank.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn string(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    fn parse<T: std::str::FromStr>(
        &self,
        key: &'static str,
        default: T,
        expected: &'static str,
    ) -> Result<T, ConfigError> {
        match self.optional(key) {
            None => Ok(default),
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                key,
                expected,
                value,
            }),
        }
    }

    fn flag(&self, key: &'static str, default: bool) -> Result<bool, ConfigError> {
        match self.optional(key).map(|v| v.to_ascii_lowercase()) {
            None => Ok(default),
            Some(v) if matches!(v.as_str(), "1" | "true" | "yes") => Ok(true),
            Some(v) if matches!(v.as_str(), "0" | "false" | "no") => Ok(false),
            Some(value) => Err(ConfigError::Invalid {
                key,
                expected: "boolean",
                value,
            }),
        }
    }
}
