//! Relational connector (PostgreSQL, MySQL, SQLite) built on SeaORM
//!
//! The backend is picked from the URL scheme, so one code path serves all
//! three stores.

mod config;
mod connector;
mod health;

pub use config::SqlConfig;
pub use connector::{close, connect, connect_from_config, connect_from_config_with_retry};
pub use health::{check_health, check_health_detailed};

// Re-export SeaORM types for convenience
pub use sea_orm::{ConnectOptions, DatabaseBackend, DatabaseConnection, DbErr};
