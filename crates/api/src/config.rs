use std::path::PathBuf;
use std::str::FromStr;

use catalist_core::recognition::matcher::{
    MatchOptions, DEFAULT_MAX_RESULTS, DEFAULT_SIMILARITY_THRESHOLD, MAX_RESULTS_CAP,
};

use crate::auth::jwt::JwtConfig;

/// Default bind port of the CATalist server.
pub const DEFAULT_PORT: u16 = 44817;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    pub port: u16,
    /// `sqlite://` connection string.
    pub database_url: String,
    /// Allowed CORS origins. A single `*` allows any origin.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Root of the static website.
    pub static_dir: PathBuf,
    /// Where uploaded reference images are written (served at `/uploads`).
    pub upload_dir: PathBuf,
    /// Body limit for image uploads and recognition requests.
    pub max_upload_bytes: usize,
    /// Lifetime of password reset tokens.
    pub password_reset_expiry_mins: i64,
    pub jwt: JwtConfig,
    pub recognition: RecognitionConfig,
    /// Initial administrator, created at startup when both are set.
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

/// Tuning for the recognition matcher.
#[derive(Debug, Clone)]
pub struct RecognitionConfig {
    pub similarity_threshold: f32,
    pub max_results: usize,
    /// Leading embedding dimensions used for the binary hash.
    pub hash_bits: Option<usize>,
    pub max_hamming: Option<u32>,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            max_results: DEFAULT_MAX_RESULTS,
            hash_bits: None,
            max_hamming: None,
        }
    }
}

impl RecognitionConfig {
    /// Matcher options for a request, honouring a client `limit` up to the cap.
    pub fn match_options(&self, limit: Option<usize>) -> MatchOptions {
        MatchOptions {
            max_results: limit
                .unwrap_or(self.max_results)
                .clamp(1, MAX_RESULTS_CAP),
            similarity_threshold: self.similarity_threshold,
            max_hamming: self.max_hamming,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                      | Default                          |
    /// |------------------------------|----------------------------------|
    /// | `HOST`                       | `0.0.0.0`                        |
    /// | `PORT`                       | `44817`                          |
    /// | `DATABASE_URL`               | `sqlite://data/cats.db?mode=rwc` |
    /// | `CORS_ORIGINS`               | `*`                              |
    /// | `REQUEST_TIMEOUT_SECS`       | `30`                             |
    /// | `STATIC_DIR`                 | `public`                         |
    /// | `UPLOAD_DIR`                 | `data/uploads`                   |
    /// | `MAX_UPLOAD_BYTES`           | `10485760`                       |
    /// | `PASSWORD_RESET_EXPIRY_MINS` | `30`                             |
    /// | `RECOGNITION_THRESHOLD`      | `0.75`                           |
    /// | `RECOGNITION_MAX_RESULTS`    | `5`                              |
    /// | `RECOGNITION_HASH_BITS`      | unset                            |
    /// | `RECOGNITION_MAX_HAMMING`    | unset                            |
    /// | `ADMIN_EMAIL`                | unset                            |
    /// | `ADMIN_PASSWORD`             | unset                            |
    ///
    /// JWT settings are documented on [`JwtConfig::from_env`].
    ///
    /// # Panics
    ///
    /// Panics when a variable is set but cannot be parsed.
    pub fn from_env() -> Self {
        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let recognition = RecognitionConfig {
            similarity_threshold: env_or("RECOGNITION_THRESHOLD", DEFAULT_SIMILARITY_THRESHOLD),
            max_results: env_or("RECOGNITION_MAX_RESULTS", DEFAULT_MAX_RESULTS),
            hash_bits: env_opt("RECOGNITION_HASH_BITS").filter(|&bits: &usize| bits > 0),
            max_hamming: env_opt("RECOGNITION_MAX_HAMMING"),
        };

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env_or("PORT", DEFAULT_PORT),
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://data/cats.db?mode=rwc".into()),
            cors_origins,
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 30),
            static_dir: env_or("STATIC_DIR", PathBuf::from("public")),
            upload_dir: env_or("UPLOAD_DIR", PathBuf::from("data/uploads")),
            max_upload_bytes: env_or("MAX_UPLOAD_BYTES", 10 * 1024 * 1024),
            password_reset_expiry_mins: env_or("PASSWORD_RESET_EXPIRY_MINS", 30),
            jwt: JwtConfig::from_env(),
            recognition,
            admin_email: env_opt("ADMIN_EMAIL"),
            admin_password: env_opt("ADMIN_PASSWORD"),
        }
    }

    /// Whether CORS is open to every origin.
    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|o| o == "*")
    }
}

/// Parse `name` when set, otherwise use `default`.
pub(crate) fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env_opt(name).unwrap_or(default)
}

/// Parse `name` when set and non-empty.
pub(crate) fn env_opt<T: FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok().filter(|v| !v.trim().is_empty())?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => panic!("{name} has an invalid value: '{raw}'"),
    }
}
