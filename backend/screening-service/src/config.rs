/// Configuration management for screening-service
///
/// Loads configuration from environment variables (and `.env`) with sensible
/// defaults. Connection strings have no default.
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

const DEFAULT_CORS_ORIGINS: &str =
    "http://localhost:5173,http://localhost:5174,http://localhost:5175";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown REPO_BACKEND {0:?} (expected \"memory\" or \"durable\")")]
    UnknownRepoBackend(String),

    #[error("unknown STORAGE_BACKEND {0:?} (expected \"local\")")]
    UnknownStorageBackend(String),

    #[error("REPO_BACKEND=durable requires DATABASE_URL")]
    MissingDatabaseUrl,

    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub cors: CorsConfig,
    pub repo: RepoConfig,
    pub storage: StorageConfig,
    pub graphql: GraphQLConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub env: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepoBackend {
    Memory,
    Durable,
}

impl FromStr for RepoBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "durable" | "postgres" => Ok(Self::Durable),
            other => Err(ConfigError::UnknownRepoBackend(other.to_string())),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct RepoConfig {
    pub backend: RepoBackend,
    /// Present whenever `DATABASE_URL` is set; required for the durable backend.
    pub database: Option<DatabaseConfig>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    /// Overrides the database named in `url` when set.
    pub name: Option<String>,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Local,
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            other => Err(ConfigError::UnknownStorageBackend(other.to_string())),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
}

#[derive(Clone, Debug, Deserialize)]
pub struct GraphQLConfig {
    /// Serve GraphiQL on `GET /graphql`
    pub playground: bool,
}

impl Config {
    /// Load `.env` if present, then read configuration from the environment
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_process_env()
    }

    /// Read configuration from process environment variables only
    pub fn from_process_env() -> Result<Self, ConfigError> {
        let backend: RepoBackend = env_or("REPO_BACKEND", "memory").parse()?;
        let database = match non_empty_var("DATABASE_URL") {
            Some(url) => Some(DatabaseConfig {
                url,
                name: non_empty_var("DATABASE_NAME"),
                max_connections: parse_var("DATABASE_MAX_CONNECTIONS", 10)?,
                acquire_timeout_secs: parse_var("DATABASE_ACQUIRE_TIMEOUT_SECS", 5)?,
            }),
            None => None,
        };
        if backend == RepoBackend::Durable && database.is_none() {
            return Err(ConfigError::MissingDatabaseUrl);
        }

        Ok(Config {
            app: AppConfig {
                host: env_or("SERVER_HOST", "0.0.0.0"),
                port: parse_var("SERVER_PORT", 8000)?,
                env: env_or("APP_ENV", "development"),
            },
            cors: CorsConfig {
                allowed_origins: split_origins(&env_or("CORS_ORIGINS", DEFAULT_CORS_ORIGINS)),
            },
            repo: RepoConfig { backend, database },
            storage: StorageConfig {
                backend: env_or("STORAGE_BACKEND", "local").parse()?,
                upload_dir: PathBuf::from(env_or("UPLOAD_DIR", "uploads")),
                max_upload_bytes: parse_var("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            },
            graphql: GraphQLConfig {
                playground: parse_var("GRAPHQL_PLAYGROUND", true)?,
            },
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    non_empty_var(key).unwrap_or_else(|| default.to_string())
}

fn parse_var<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match non_empty_var(key) {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        None => Ok(default),
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}
