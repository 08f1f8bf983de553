//! Configuration for the OFLP client stack and API service

use std::time::Duration;

/// Default REST API base address, matching the local `oflp-api` service.
pub const DEFAULT_API_URL: &str = "http://localhost:3001/api";

/// Fixed request timeout for logistics operations.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default port for the API service.
pub const DEFAULT_PORT: u16 = 3001;

/// Client-side configuration for the transport layer.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL for all API requests, without trailing slash.
    pub base_url: String,

    /// Per-request timeout.
    pub timeout: Duration,

    /// Bearer token attached to every request when present.
    pub auth_token: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout: REQUEST_TIMEOUT,
            auth_token: None,
        }
    }
}

impl ClientConfig {
    /// Build configuration from the environment.
    ///
    /// Reads `OFLP_API_URL` and `OFLP_AUTH_TOKEN`; unset variables fall back
    /// to defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("OFLP_API_URL") {
            if !url.is_empty() {
                config.base_url = url.trim_end_matches('/').to_string();
            }
        }
        if let Ok(token) = std::env::var("OFLP_AUTH_TOKEN") {
            if !token.is_empty() {
                config.auth_token = Some(token);
            }
        }
        config
    }

    /// Set the base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Set the bearer token.
    pub fn auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }
}

/// Configuration for the `oflp-api` service.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// TCP port to bind.
    pub port: u16,

    /// Origins allowed by CORS.
    pub cors_origins: Vec<String>,

    /// Environment label reported by the health endpoint.
    pub environment: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
            environment: "development".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_API_URL);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.auth_token.is_none());
    }

    #[test]
    fn test_base_url_trims_trailing_slash() {
        let config = ClientConfig::default().base_url("http://api.example.com/api/");
        assert_eq!(config.base_url, "http://api.example.com/api");
    }

    #[test]
    fn test_auth_token_builder() {
        let config = ClientConfig::default().auth_token("secret");
        assert_eq!(config.auth_token.as_deref(), Some("secret"));
    }

    #[test]
    fn test_server_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 3001);
        assert_eq!(config.cors_origins.len(), 2);
        assert_eq!(config.environment, "development");
    }
}
