//! Process configuration read from the environment (optionally seeded from `.env`).

use crate::error::ConfigError;
use std::net::SocketAddr;

pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost/local_library";
pub const DEFAULT_SCHEMA: &str = "catalog";

/// Which [`crate::store::CatalogStore`] implementation backs the server.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backend {
    Postgres,
    Memory,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    /// Schema holding the catalog tables. Must be a valid PostgreSQL identifier.
    pub schema: String,
    pub backend: Backend,
    pub bind: SocketAddr,
    pub max_connections: u32,
    pub body_limit: usize,
    /// `APP_ENV=production` hides error messages on the error page.
    pub production: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            database_url: DEFAULT_DATABASE_URL.into(),
            schema: DEFAULT_SCHEMA.into(),
            backend: Backend::Postgres,
            bind: SocketAddr::from(([127, 0, 0, 1], 3000)),
            max_connections: 5,
            body_limit: 64 * 1024,
            production: false,
        }
    }
}

impl AppConfig {
    /// Load `.env` if present, then read the environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup; unset variables keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = AppConfig::default();
        if let Some(url) = lookup("DATABASE_URL") {
            config.database_url = url;
        }
        if let Some(schema) = lookup("CATALOG_SCHEMA") {
            if !is_identifier(&schema) {
                return Err(ConfigError::InvalidSchema(schema));
            }
            config.schema = schema;
        }
        if let Some(backend) = lookup("CATALOG_BACKEND") {
            config.backend = match backend.to_lowercase().as_str() {
                "postgres" => Backend::Postgres,
                "memory" => Backend::Memory,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        name: "CATALOG_BACKEND",
                        value: backend,
                    })
                }
            };
        }
        if let Some(bind) = lookup("CATALOG_BIND") {
            config.bind = bind.parse().map_err(|_| ConfigError::InvalidValue {
                name: "CATALOG_BIND",
                value: bind.clone(),
            })?;
        }
        if let Some(n) = lookup("CATALOG_MAX_CONNECTIONS") {
            config.max_connections = n
                .parse()
                .ok()
                .filter(|n: &u32| *n > 0)
                .ok_or(ConfigError::InvalidValue {
                    name: "CATALOG_MAX_CONNECTIONS",
                    value: n,
                })?;
        }
        if let Some(n) = lookup("CATALOG_BODY_LIMIT") {
            config.body_limit = n.parse().map_err(|_| ConfigError::InvalidValue {
                name: "CATALOG_BODY_LIMIT",
                value: n.clone(),
            })?;
        }
        if let Some(env) = lookup("APP_ENV") {
            config.production = env.eq_ignore_ascii_case("production");
        }
        Ok(config)
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    s.len() <= 63 && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.schema, "catalog");
        assert_eq!(config.backend, Backend::Postgres);
        assert!(!config.production);
    }

    #[test]
    fn reads_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("CATALOG_BACKEND", "memory"),
            ("CATALOG_BIND", "0.0.0.0:8080"),
            ("APP_ENV", "Production"),
        ]))
        .unwrap();
        assert_eq!(config.backend, Backend::Memory);
        assert_eq!(config.bind.port(), 8080);
        assert!(config.production);
    }

    #[test]
    fn rejects_bad_schema_and_backend() {
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[("CATALOG_SCHEMA", "drop table;")])),
            Err(ConfigError::InvalidSchema(_))
        ));
        assert!(AppConfig::from_lookup(lookup(&[("CATALOG_BACKEND", "mongo")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("CATALOG_MAX_CONNECTIONS", "0")])).is_err());
    }
}
