//! API Configuration Module
//!
//! Bind-address configuration for the HTTP facade. Loaded from environment
//! variables with development-friendly defaults.

use std::net::SocketAddr;

use crate::error::{ApiError, ApiResult};

/// HTTP listener configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Interface to bind on.
    pub bind_host: String,
    /// TCP port to listen on.
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `CONVOY_BIND`: Interface to bind on (default: 0.0.0.0)
    /// - `PORT` or `CONVOY_PORT`: Listener port (default: 8080)
    pub fn from_env() -> Self {
        let bind_host =
            std::env::var("CONVOY_BIND").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = std::env::var("PORT")
            .ok()
            .or_else(|| std::env::var("CONVOY_PORT").ok())
            .and_then(|s| s.parse().ok())
            .unwrap_or(8080);

        Self { bind_host, port }
    }

    /// Resolve the configured bind address.
    pub fn bind_addr(&self) -> ApiResult<SocketAddr> {
        let addr = format!("{}:{}", self.bind_host, self.port);
        addr.parse::<SocketAddr>()
            .map_err(|e| ApiError::invalid_input(format!("Invalid bind address {}: {}", addr, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert_eq!(config.bind_host, "0.0.0.0");
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_bind_addr_resolution() {
        let config = ApiConfig::default();
        let addr = config.bind_addr().unwrap();
        assert_eq!(addr.port(), 8080);
    }

    #[test]
    fn test_bind_addr_rejects_garbage_host() {
        let config = ApiConfig {
            bind_host: "not a host".to_string(),
            port: 8080,
        };
        assert!(config.bind_addr().is_err());
    }
}
