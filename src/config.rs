use std::{net::SocketAddr, path::PathBuf, time::Duration};

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuoteConfig {
    pub url: String,
    pub timeout_secs: u64,
}

impl QuoteConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub store_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub jwt: JwtConfig,
    pub quotes: QuoteConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process
    /// environment.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let parsed = |key: &str| var(key).and_then(|v| v.parse::<i64>().ok());

        let jwt = JwtConfig {
            secret: var("JWT_SECRET").context("JWT_SECRET must be set")?,
            issuer: var("JWT_ISSUER").unwrap_or_else(|| "breathtrack".into()),
            audience: var("JWT_AUDIENCE").unwrap_or_else(|| "breathtrack-users".into()),
            ttl_minutes: parsed("JWT_TTL_MINUTES").unwrap_or(60),
            refresh_ttl_minutes: parsed("JWT_REFRESH_TTL_MINUTES").unwrap_or(60 * 24 * 14),
        };
        let quotes = QuoteConfig {
            url: var("QUOTE_URL").unwrap_or_else(|| "https://zenquotes.io/api/random".into()),
            timeout_secs: var("QUOTE_TIMEOUT_SECS")
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(5),
        };
        let port = match var("APP_PORT") {
            Some(p) => p.parse::<u16>().context("APP_PORT must be a port number")?,
            None => 8080,
        };

        Ok(Self {
            store_path: var("STORE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("users.json")),
            host: var("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            jwt,
            quotes,
        })
    }

    pub fn listen_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_the_secret_is_set() {
        let cfg = AppConfig::from_lookup(lookup(&[("JWT_SECRET", "s3cret")])).unwrap();
        assert_eq!(cfg.store_path, PathBuf::from("users.json"));
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.jwt.issuer, "breathtrack");
        assert_eq!(cfg.jwt.ttl_minutes, 60);
        assert_eq!(cfg.quotes.url, "https://zenquotes.io/api/random");
        assert_eq!(cfg.quotes.timeout(), Duration::from_secs(5));
        assert_eq!(cfg.listen_addr().unwrap().port(), 8080);
    }

    #[test]
    fn missing_secret_is_an_error() {
        let err = AppConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn overrides_are_read() {
        let cfg = AppConfig::from_lookup(lookup(&[
            ("JWT_SECRET", "x"),
            ("STORE_PATH", "/var/lib/breathtrack/users.json"),
            ("APP_HOST", "127.0.0.1"),
            ("APP_PORT", "9000"),
            ("JWT_TTL_MINUTES", "15"),
            ("QUOTE_TIMEOUT_SECS", "2"),
        ]))
        .unwrap();
        assert_eq!(
            cfg.store_path,
            PathBuf::from("/var/lib/breathtrack/users.json")
        );
        assert_eq!(cfg.listen_addr().unwrap().to_string(), "127.0.0.1:9000");
        assert_eq!(cfg.jwt.ttl_minutes, 15);
        assert_eq!(cfg.quotes.timeout_secs, 2);
    }

    #[test]
    fn bad_port_is_an_error() {
        let err = AppConfig::from_lookup(lookup(&[("JWT_SECRET", "x"), ("APP_PORT", "http")]));
        assert!(err.is_err());
    }
}
