//! Environment-sourced service configuration.
//!
//! Credentials are read once at startup and passed into the gateway as
//! an explicit struct; handlers never touch the environment.

use std::net::{SocketAddr, ToSocketAddrs};

use anyhow::{Context, Result};
use screenhook_core::DbConfig;

/// Complete service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Database credentials for the per-request gateway.
    pub database: DbConfig,
    /// HTTP bind address.
    pub server_addr: SocketAddr,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// Required: `DATABASE_HOST`, `DATABASE_USER`, `DATABASE_PASSWORD`,
    /// `DATABASE_NAME`. Optional: `DATABASE_PORT` (5432), `HOST`
    /// (`127.0.0.1`), `PORT` (8080). `HOST` may be an IP literal or a
    /// name like `localhost`; names are resolved once at startup.
    ///
    /// # Errors
    ///
    /// Fails when a required variable is absent or the bind address does
    /// not parse. Present-but-wrong credentials are not validated here;
    /// they surface as connection failures at request time.
    pub fn from_env() -> Result<Self> {
        let database = DbConfig {
            host: require("DATABASE_HOST")?,
            port: optional("DATABASE_PORT", 5432),
            username: require("DATABASE_USER")?,
            password: require("DATABASE_PASSWORD")?,
            database: require("DATABASE_NAME")?,
        };

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port: u16 = optional("PORT", 8080);
        let server_addr = resolve_bind_addr(&host, port)?;

        Ok(Self { database, server_addr })
    }
}

/// Resolves the bind address, accepting IP literals and host names.
fn resolve_bind_addr(host: &str, port: u16) -> Result<SocketAddr> {
    (host, port)
        .to_socket_addrs()
        .with_context(|| format!("Invalid HOST/PORT bind address {host}:{port}"))?
        .next()
        .with_context(|| format!("HOST {host} resolved to no addresses"))
}

fn require(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("{key} environment variable not set"))
}

fn optional<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key).ok().and_then(|s| s.parse().ok()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, env, sync::Mutex};

    use super::*;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    struct TestEnvGuard {
        _lock: std::sync::MutexGuard<'static, ()>,
        vars: Vec<String>,
        originals: HashMap<String, Option<String>>,
    }

    impl TestEnvGuard {
        fn new() -> Self {
            let lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            Self { _lock: lock, vars: Vec::new(), originals: HashMap::new() }
        }

        fn set_var(&mut self, key: &str, value: &str) {
            self.remember(key);
            env::set_var(key, value);
        }

        fn remove_var(&mut self, key: &str) {
            self.remember(key);
            env::remove_var(key);
        }

        fn remember(&mut self, key: &str) {
            if !self.vars.contains(&key.to_string()) {
                self.originals.insert(key.to_string(), env::var(key).ok());
                self.vars.push(key.to_string());
            }
        }
    }

    impl Drop for TestEnvGuard {
        fn drop(&mut self) {
            for var in &self.vars {
                match self.originals.get(var) {
                    Some(Some(value)) => env::set_var(var, value),
                    Some(None) => env::remove_var(var),
                    None => {},
                }
            }
        }
    }

    fn set_required(guard: &mut TestEnvGuard) {
        guard.set_var("DATABASE_HOST", "db.example.com");
        guard.set_var("DATABASE_USER", "analytics");
        guard.set_var("DATABASE_PASSWORD", "s3cret");
        guard.set_var("DATABASE_NAME", "events");
    }

    #[test]
    fn loads_with_required_variables_and_defaults() {
        let mut guard = TestEnvGuard::new();
        set_required(&mut guard);
        guard.remove_var("DATABASE_PORT");
        guard.remove_var("HOST");
        guard.remove_var("PORT");

        let config = Config::from_env().expect("config loads");

        assert_eq!(config.database.host, "db.example.com");
        assert_eq!(config.database.port, 5432);
        assert_eq!(config.database.username, "analytics");
        assert_eq!(config.database.database, "events");
        assert_eq!(config.server_addr.to_string(), "127.0.0.1:8080");
    }

    #[test]
    fn overrides_apply() {
        let mut guard = TestEnvGuard::new();
        set_required(&mut guard);
        guard.set_var("DATABASE_PORT", "5433");
        guard.set_var("HOST", "0.0.0.0");
        guard.set_var("PORT", "9090");

        let config = Config::from_env().expect("config loads");

        assert_eq!(config.database.port, 5433);
        assert_eq!(config.server_addr.to_string(), "0.0.0.0:9090");
    }

    #[test]
    fn host_name_resolves_to_bind_address() {
        let mut guard = TestEnvGuard::new();
        set_required(&mut guard);
        guard.set_var("HOST", "localhost");
        guard.set_var("PORT", "8080");

        let config = Config::from_env().expect("config loads with a host name");

        assert!(config.server_addr.ip().is_loopback());
        assert_eq!(config.server_addr.port(), 8080);
    }

    #[test]
    fn missing_credential_names_the_variable() {
        let mut guard = TestEnvGuard::new();
        set_required(&mut guard);
        guard.remove_var("DATABASE_PASSWORD");

        let err = Config::from_env().expect_err("must fail without password");

        assert!(err.to_string().contains("DATABASE_PASSWORD"));
    }

    #[test]
    fn unparseable_port_falls_back_to_default() {
        let mut guard = TestEnvGuard::new();
        set_required(&mut guard);
        guard.set_var("DATABASE_PORT", "not-a-port");

        let config = Config::from_env().expect("config loads");

        assert_eq!(config.database.port, 5432);
    }
}
