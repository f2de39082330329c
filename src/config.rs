use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;

/// Connection settings for the PostgreSQL pool.
#[derive(Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Option<String>,
    pub name: String,
    pub max_connections: u32,
    pub idle_timeout: Duration,
    pub connect_timeout: Duration,
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("name", &self.name)
            .field("max_connections", &self.max_connections)
            .field("idle_timeout", &self.idle_timeout)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub app_host: String,
    pub app_port: u16,
    pub db: DbConfig,
    pub shutdown_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db = DbConfig {
            host: required(&lookup, "DB_HOST")?,
            port: parsed_or(&lookup, "DB_PORT", 5432)?,
            user: required(&lookup, "DB_USER")?,
            password: lookup("DB_PASSWORD"),
            name: required(&lookup, "DB_NAME")?,
            max_connections: parsed_or(&lookup, "DB_MAX_CONNECTIONS", 10)?,
            idle_timeout: Duration::from_secs(parsed_or(&lookup, "DB_IDLE_TIMEOUT_SECS", 30)?),
            connect_timeout: Duration::from_secs(parsed_or(
                &lookup,
                "DB_CONNECT_TIMEOUT_SECS",
                5,
            )?),
        };
        Ok(Self {
            app_host: lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            app_port: parsed_or(&lookup, "APP_PORT", 3000)?,
            db,
            shutdown_timeout: Duration::from_secs(parsed_or(
                &lookup,
                "SHUTDOWN_TIMEOUT_SECS",
                5,
            )?),
        })
    }

    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.app_host, self.app_port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", self.app_host, self.app_port))
    }
}

fn required<F>(lookup: &F, key: &str) -> anyhow::Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).with_context(|| format!("{} must be set", key))
}

fn parsed_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{} has an invalid value: {:?}", key, raw)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    const MINIMAL: &[(&str, &str)] = &[
        ("DB_HOST", "db.local"),
        ("DB_USER", "svc"),
        ("DB_NAME", "users"),
    ];

    #[test]
    fn defaults_are_applied() {
        let config = AppConfig::from_lookup(lookup_from(MINIMAL)).unwrap();
        assert_eq!(config.app_host, "0.0.0.0");
        assert_eq!(config.app_port, 3000);
        assert_eq!(config.db.port, 5432);
        assert_eq!(config.db.password, None);
        assert_eq!(config.db.max_connections, 10);
        assert_eq!(config.db.idle_timeout, Duration::from_secs(30));
        assert_eq!(config.db.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.shutdown_timeout, Duration::from_secs(5));
    }

    #[test]
    fn overrides_are_read() {
        let mut pairs = MINIMAL.to_vec();
        pairs.extend_from_slice(&[
            ("DB_PORT", "6543"),
            ("DB_PASSWORD", "hunter2"),
            ("DB_MAX_CONNECTIONS", "3"),
            ("APP_HOST", "127.0.0.1"),
            ("APP_PORT", "8081"),
            ("SHUTDOWN_TIMEOUT_SECS", "1"),
        ]);
        let config = AppConfig::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.db.port, 6543);
        assert_eq!(config.db.password.as_deref(), Some("hunter2"));
        assert_eq!(config.db.max_connections, 3);
        assert_eq!(config.shutdown_timeout, Duration::from_secs(1));
        assert_eq!(config.bind_addr().unwrap(), "127.0.0.1:8081".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn missing_required_variable_is_named() {
        let err = AppConfig::from_lookup(lookup_from(&[("DB_HOST", "x"), ("DB_USER", "y")]))
            .unwrap_err();
        assert!(err.to_string().contains("DB_NAME"));
    }

    #[test]
    fn unparseable_port_is_rejected() {
        let mut pairs = MINIMAL.to_vec();
        pairs.push(("DB_PORT", "not-a-port"));
        let err = AppConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(err.to_string().contains("DB_PORT"));
    }

    #[test]
    fn debug_output_hides_password() {
        let mut pairs = MINIMAL.to_vec();
        pairs.push(("DB_PASSWORD", "hunter2"));
        let config = AppConfig::from_lookup(lookup_from(&pairs)).unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }
}
