//! API Configuration Module
//!
//! Bind address, CORS and log format, loaded from environment variables with
//! defaults suitable for development.

use mindcanvas_core::ConfigError;
use std::net::SocketAddr;

/// Log output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub bind_host: String,
    pub port: u16,
    /// Allowed CORS origins. Empty means allow all origins (dev mode).
    pub cors_origins: Vec<String>,
    pub log_format: LogFormat,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: Vec::new(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl ApiConfig {
    /// Environment variables:
    /// - `MINDCANVAS_API_BIND`: bind host (default: 0.0.0.0)
    /// - `PORT` or `MINDCANVAS_API_PORT`: listen port (default: 8000)
    /// - `MINDCANVAS_CORS_ORIGINS`: comma-separated allowed origins (empty = allow all)
    /// - `MINDCANVAS_LOG_FORMAT`: "pretty" (default) or "json"
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let bind_host = lookup("MINDCANVAS_API_BIND")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.bind_host);

        let port = match lookup("PORT").or_else(|| lookup("MINDCANVAS_API_PORT")) {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::InvalidValue {
                field: "PORT".to_string(),
                value: raw.clone(),
                reason: "expected a port number".to_string(),
            })?,
            None => defaults.port,
        };

        let cors_origins = lookup("MINDCANVAS_CORS_ORIGINS")
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let log_format = match lookup("MINDCANVAS_LOG_FORMAT")
            .map(|s| s.trim().to_ascii_lowercase())
            .as_deref()
        {
            Some("json") => LogFormat::Json,
            Some("pretty") | Some("") | None => LogFormat::Pretty,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    field: "MINDCANVAS_LOG_FORMAT".to_string(),
                    value: other.to_string(),
                    reason: "expected pretty or json".to_string(),
                })
            }
        };

        Ok(Self {
            bind_host,
            port,
            cors_origins,
            log_format,
        })
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.bind_host, self.port);
        addr.parse().map_err(|e| ConfigError::InvalidValue {
            field: "MINDCANVAS_API_BIND".to_string(),
            value: addr.clone(),
            reason: format!("{}", e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ApiConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, ApiConfig::default());
        assert_eq!(config.socket_addr().unwrap().port(), 8000);
    }

    #[test]
    fn test_port_prefers_platform_variable() {
        let config = ApiConfig::from_lookup(|key| match key {
            "PORT" => Some("9100".to_string()),
            "MINDCANVAS_API_PORT" => Some("9200".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.port, 9100);
    }

    #[test]
    fn test_cors_and_log_format() {
        let config = ApiConfig::from_lookup(|key| match key {
            "MINDCANVAS_CORS_ORIGINS" => Some("http://localhost:3000, https://app.example.com,".to_string()),
            "MINDCANVAS_LOG_FORMAT" => Some("JSON".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(
            config.cors_origins,
            vec!["http://localhost:3000", "https://app.example.com"]
        );
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_invalid_values() {
        assert!(ApiConfig::from_lookup(|key| (key == "PORT").then(|| "http".to_string())).is_err());
        assert!(
            ApiConfig::from_lookup(|key| (key == "MINDCANVAS_LOG_FORMAT").then(|| "xml".to_string()))
                .is_err()
        );
        let config = ApiConfig {
            bind_host: "not a host".to_string(),
            ..ApiConfig::default()
        };
        assert!(config.socket_addr().is_err());
    }
}
