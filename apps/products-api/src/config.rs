//! Configuration for Products API

use core_config::{
    app_info, env_or_default, server::ServerConfig, AppInfo, ConfigError, Environment, FromEnv,
};
use database::mongodb::MongoConfig;
use database::sql::{DatabaseBackend, SqlConfig};
use database::RetryConfig;
use domain_products::{IdentityStrategy, StorageConfig};
use std::str::FromStr;
use strum::{AsRefStr, EnumString};

/// Value of `DB_TYPE`
#[derive(Clone, Copy, Debug, PartialEq, Eq, AsRefStr, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StorageKind {
    #[strum(to_string = "postgres", serialize = "postgresql")]
    Postgres,
    Mysql,
    Sqlite,
    /// Any relational store, dialect taken from `DATABASE_URL`
    Relational,
    #[strum(to_string = "mongodb", serialize = "mongo", serialize = "document")]
    Mongodb,
}

impl StorageKind {
    /// SQL dialect `DATABASE_URL` must name, `None` when any will do
    fn expected_backend(self) -> Option<DatabaseBackend> {
        match self {
            StorageKind::Postgres => Some(DatabaseBackend::Postgres),
            StorageKind::Mysql => Some(DatabaseBackend::MySql),
            StorageKind::Sqlite => Some(DatabaseBackend::Sqlite),
            StorageKind::Relational | StorageKind::Mongodb => None,
        }
    }
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub environment: Environment,
    pub server: ServerConfig,
    pub storage_kind: StorageKind,
    pub storage: StorageConfig,
    pub retry: RetryConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let storage_kind = parse_env::<StorageKind>("DB_TYPE", "postgres")?;
        let identity = parse_env::<IdentityStrategy>("PRODUCT_ID_STRATEGY", "generated")?;

        let storage = match storage_kind {
            StorageKind::Mongodb => StorageConfig::Document {
                mongo: MongoConfig::from_env()?,
                collection: env_or_default("MONGODB_COLLECTION", "products"),
                identity,
            },
            StorageKind::Sqlite if std::env::var("DATABASE_URL").is_err() => {
                StorageConfig::Relational {
                    sql: SqlConfig::sqlite_memory(),
                    identity,
                }
            }
            _ => {
                let sql = SqlConfig::from_env()?;
                check_dialect(storage_kind, &sql)?;
                StorageConfig::Relational { sql, identity }
            }
        };

        Ok(Self {
            app: app_info!(),
            environment: Environment::from_env(),
            server: ServerConfig::from_env()?,
            storage_kind,
            storage,
            retry: RetryConfig::from_env()?,
        })
    }
}

/// `DB_TYPE` and the `DATABASE_URL` scheme must agree
fn check_dialect(kind: StorageKind, sql: &SqlConfig) -> Result<(), ConfigError> {
    let Some(expected) = kind.expected_backend() else {
        return Ok(());
    };

    match sql.backend() {
        Ok(actual) if actual == expected => Ok(()),
        Ok(actual) => Err(ConfigError::ParseError {
            key: "DATABASE_URL".to_string(),
            details: format!(
                "DB_TYPE is '{}' but {} points at {:?}",
                kind.as_ref(),
                sql.redacted_url(),
                actual
            ),
        }),
        Err(e) => Err(ConfigError::ParseError {
            key: "DATABASE_URL".to_string(),
            details: e.to_string(),
        }),
    }
}

/// Parse a strum-backed enum from the environment
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = env_or_default(key, default);
    T::from_str(raw.trim()).map_err(|e| ConfigError::ParseError {
        key: key.to_string(),
        details: format!("'{}': {}", raw, e),
    })
}
