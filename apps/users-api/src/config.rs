use core_config::{
    AppInfo, ConfigError, FromEnv, app_info, env_parse_or_default,
    server::ServerConfig,
};
use database::postgres::PostgresConfig;
use std::str::FromStr;

// Re-export Environment for use in other modules
pub use core_config::Environment;

/// Backing store for the users domain
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreKind {
    Postgres,
    Memory,
}

impl FromStr for StoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgres" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown store '{}', expected postgres or memory", other)),
        }
    }
}

/// Application-specific configuration
/// Composes shared config components from the `config` library
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub server: ServerConfig,
    pub environment: Environment,
    pub store: StoreKind,
    /// Only loaded for the postgres store
    pub database: Option<PostgresConfig>,
    pub run_migrations: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?;
        let store: StoreKind = env_parse_or_default("USERS_STORE", "postgres")?;

        let database = match store {
            StoreKind::Postgres => Some(PostgresConfig::from_env()?), // DATABASE_URL required
            StoreKind::Memory => None,
        };

        let run_migrations = env_parse_or_default("RUN_MIGRATIONS", "true")?;

        Ok(Self {
            app: app_info!(),
            server,
            environment,
            store,
            database,
            run_migrations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_needs_no_database_url() {
        temp_env::with_vars(
            [
                ("USERS_STORE", Some("memory")),
                ("DATABASE_URL", None),
                ("RUN_MIGRATIONS", None),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.store, StoreKind::Memory);
                assert!(config.database.is_none());
                assert!(config.run_migrations);
            },
        );
    }

    #[test]
    fn test_postgres_store_is_default_and_requires_url() {
        temp_env::with_vars(
            [("USERS_STORE", None::<&str>), ("DATABASE_URL", None)],
            || {
                let result = Config::from_env();
                assert!(matches!(result, Err(ConfigError::MissingEnvVar(key)) if key == "DATABASE_URL"));
            },
        );
    }

    #[test]
    fn test_postgres_store_loads_database_config() {
        temp_env::with_vars(
            [
                ("USERS_STORE", Some("Postgres")),
                ("DATABASE_URL", Some("postgresql://localhost/users")),
                ("RUN_MIGRATIONS", Some("false")),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.store, StoreKind::Postgres);
                assert_eq!(
                    config.database.map(|db| db.url),
                    Some("postgresql://localhost/users".to_string())
                );
                assert!(!config.run_migrations);
            },
        );
    }

    #[test]
    fn test_unknown_store_is_parse_error() {
        temp_env::with_var("USERS_STORE", Some("mongo"), || {
            let result = Config::from_env();
            assert!(matches!(result, Err(ConfigError::ParseError { key, .. }) if key == "USERS_STORE"));
        });
    }
}
