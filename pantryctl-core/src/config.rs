//! Configuration for the `serve` command.
//!
//! Settings merge in precedence order: CLI flags, then environment
//! (`DATABASE_URL`, `PANTRY_SCHEMA`, `PANTRY_BIND`), then an optional TOML
//! file, then built-in defaults.

use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

/// Default bind address.
pub const DEFAULT_BIND: &str = "127.0.0.1:5000";

/// Default namespace (Postgres schema) for the inventory tables.
pub const DEFAULT_SCHEMA: &str = "pantry";

/// Default connection pool size. Kept low for single-household tooling.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Namespace must be a plain lowercase SQL identifier: it is interpolated
/// into statements (parameter binding cannot cover identifiers).
static SCHEMA_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z_][a-z0-9_]{0,62}$").expect("invalid schema regex"));

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },

    #[error("invalid bind address '{value}'")]
    BadBind { value: String },

    #[error("invalid schema name '{value}': must be a lowercase identifier")]
    BadSchema { value: String },

    #[error("DATABASE_URL is required for the postgres backend")]
    MissingDatabaseUrl,
}

/// Which storage implementation backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Postgres,
    Memory,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Memory => "memory",
        }
    }
}

/// Optional TOML config file shape.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    pub bind: Option<String>,
    pub database_url: Option<String>,
    pub schema: Option<String>,
    pub max_connections: Option<u32>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }
}

/// Fully resolved settings for the `serve` command.
#[derive(Debug, Clone)]
pub struct ServeConfig {
    pub bind: SocketAddr,
    pub backend: Backend,
    /// Present when the backend is Postgres.
    pub database_url: Option<String>,
    pub schema: String,
    pub max_connections: u32,
    pub cors_permissive: bool,
}

/// Unresolved inputs from the CLI layer.
#[derive(Debug, Clone, Default)]
pub struct ServeOverrides {
    pub bind: Option<SocketAddr>,
    pub backend: Option<Backend>,
    pub schema: Option<String>,
    pub cors_permissive: bool,
}

impl ServeConfig {
    /// Merge flags, environment, and file config into a resolved config.
    ///
    /// Backend defaults to Postgres when a database URL is available from any
    /// source, memory otherwise.
    pub fn resolve(overrides: ServeOverrides, file: FileConfig) -> Result<Self, ConfigError> {
        let bind = match overrides.bind {
            Some(addr) => addr,
            None => {
                let raw = env::var("PANTRY_BIND")
                    .ok()
                    .or(file.bind)
                    .unwrap_or_else(|| DEFAULT_BIND.to_owned());
                raw.parse()
                    .map_err(|_| ConfigError::BadBind { value: raw })?
            }
        };

        let database_url = env::var("DATABASE_URL").ok().or(file.database_url);

        let backend = overrides.backend.unwrap_or(if database_url.is_some() {
            Backend::Postgres
        } else {
            Backend::Memory
        });

        if backend == Backend::Postgres && database_url.is_none() {
            return Err(ConfigError::MissingDatabaseUrl);
        }

        let schema = overrides
            .schema
            .or_else(|| env::var("PANTRY_SCHEMA").ok())
            .or(file.schema)
            .unwrap_or_else(|| DEFAULT_SCHEMA.to_owned());
        if !SCHEMA_RE.is_match(&schema) {
            return Err(ConfigError::BadSchema { value: schema });
        }

        Ok(Self {
            bind,
            backend,
            database_url,
            schema,
            max_connections: file.max_connections.unwrap_or(DEFAULT_MAX_CONNECTIONS),
            cors_permissive: overrides.cors_permissive,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env_overrides() -> ServeOverrides {
        // Tests pin everything through overrides/file so ambient env vars
        // cannot leak in.
        ServeOverrides {
            bind: Some("127.0.0.1:0".parse().unwrap()),
            backend: Some(Backend::Memory),
            schema: Some("pantry".into()),
            cors_permissive: false,
        }
    }

    #[test]
    fn memory_backend_needs_no_database_url() {
        let cfg = ServeConfig::resolve(no_env_overrides(), FileConfig::default()).unwrap();
        assert_eq!(cfg.backend, Backend::Memory);
        assert_eq!(cfg.schema, "pantry");
        assert_eq!(cfg.max_connections, DEFAULT_MAX_CONNECTIONS);
    }

    #[test]
    fn postgres_backend_requires_database_url() {
        let overrides = ServeOverrides {
            backend: Some(Backend::Postgres),
            ..no_env_overrides()
        };
        // No DATABASE_URL in the file; only fails if the env doesn't provide
        // one either.
        if env::var("DATABASE_URL").is_err() {
            let err = ServeConfig::resolve(overrides, FileConfig::default()).unwrap_err();
            assert!(matches!(err, ConfigError::MissingDatabaseUrl));
        }
    }

    #[test]
    fn file_database_url_selects_postgres() {
        let overrides = ServeOverrides {
            backend: None,
            ..no_env_overrides()
        };
        let file = FileConfig {
            database_url: Some("postgres://localhost/pantry".into()),
            ..FileConfig::default()
        };
        let cfg = ServeConfig::resolve(overrides, file).unwrap();
        assert_eq!(cfg.backend, Backend::Postgres);
        if env::var("DATABASE_URL").is_err() {
            // the env var takes precedence over the file when set
            assert_eq!(cfg.database_url.as_deref(), Some("postgres://localhost/pantry"));
        }
    }

    #[test]
    fn rejects_schema_that_is_not_an_identifier() {
        let overrides = ServeOverrides {
            schema: Some("pantry; drop table items".into()),
            ..no_env_overrides()
        };
        let err = ServeConfig::resolve(overrides, FileConfig::default()).unwrap_err();
        assert!(matches!(err, ConfigError::BadSchema { .. }));
    }

    #[test]
    fn schema_identifier_shapes() {
        assert!(SCHEMA_RE.is_match("pantry"));
        assert!(SCHEMA_RE.is_match("pi_data"));
        assert!(SCHEMA_RE.is_match("_private"));
        assert!(!SCHEMA_RE.is_match("Pantry"));
        assert!(!SCHEMA_RE.is_match("1pantry"));
        assert!(!SCHEMA_RE.is_match("pantry.items"));
        assert!(!SCHEMA_RE.is_match(""));
    }
}
