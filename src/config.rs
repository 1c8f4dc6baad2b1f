//! Configuration management for the lead-intake server.
//!
//! This module handles loading and validating configuration from environment
//! variables, with a best-effort read of a `.env` file if one is present.

use crate::error::{ConfigError, ConfigResult};
use chrono::{FixedOffset, Offset, Utc};
use std::env;
use std::net::SocketAddr;

/// Default CRM REST base URL.
const DEFAULT_CRM_API_URL: &str = "https://www.zohoapis.com/crm/v6";

/// Default UTC offset used to anchor the duplicate-search window.
const DEFAULT_SEARCH_UTC_OFFSET: &str = "-04:00";

/// Default address the HTTP server binds to.
const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8300";

/// Configuration for the lead-intake server.
#[derive(Debug, Clone)]
pub struct Config {
    /// Long-lived OAuth refresh token
    pub refresh_token: String,

    /// OAuth client id
    pub client_id: String,

    /// OAuth client secret
    pub client_secret: String,

    /// Token endpoint for the refresh exchange
    pub token_url: String,

    /// CRM organization id, sent with every CRM request
    pub org_id: String,

    /// CRM REST base URL
    pub crm_api_url: String,

    /// UTC offset the duplicate window's timestamps are rendered in
    pub search_utc_offset: FixedOffset,

    /// HTTP request timeout in seconds (default: 15)
    pub request_timeout: u64,

    /// Address the HTTP server listens on
    pub listen_addr: SocketAddr,

    /// Log level (default: "info")
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required environment variables:
    /// - `ZOHO_REFRESH_TOKEN`: long-lived refresh token
    /// - `ZOHO_CLIENT_ID`: OAuth client id
    /// - `ZOHO_CLIENT_SECRET`: OAuth client secret
    /// - `ZOHO_TOKEN_URL`: token endpoint URL
    /// - `ZOHO_ORG_ID`: CRM organization id
    ///
    /// Optional environment variables:
    /// - `CRM_API_BASE_URL`: CRM REST base URL (default: Zoho v6)
    /// - `SEARCH_UTC_OFFSET`: offset for the duplicate window (default: -04:00)
    /// - `REQUEST_TIMEOUT`: HTTP timeout in seconds (default: 15)
    /// - `LISTEN_ADDR`: bind address (default: 127.0.0.1:8300)
    /// - `LOG_LEVEL`: logging level (default: "info")
    pub fn from_env() -> ConfigResult<Self> {
        // Try to load .env file if it exists (but don't fail if it doesn't)
        let _ = dotenvy::dotenv();

        let refresh_token = Self::require("ZOHO_REFRESH_TOKEN")?;
        let client_id = Self::require("ZOHO_CLIENT_ID")?;
        let client_secret = Self::require("ZOHO_CLIENT_SECRET")?;
        let token_url = Self::require("ZOHO_TOKEN_URL")?;
        let org_id = Self::require("ZOHO_ORG_ID")?;

        if !token_url.starts_with("http://") && !token_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                var: "ZOHO_TOKEN_URL".to_string(),
                reason: "Must start with http:// or https://".to_string(),
            });
        }

        let crm_api_url =
            env::var("CRM_API_BASE_URL").unwrap_or_else(|_| DEFAULT_CRM_API_URL.to_string());
        if !crm_api_url.starts_with("http://") && !crm_api_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                var: "CRM_API_BASE_URL".to_string(),
                reason: "Must start with http:// or https://".to_string(),
            });
        }

        let offset_spec = env::var("SEARCH_UTC_OFFSET")
            .unwrap_or_else(|_| DEFAULT_SEARCH_UTC_OFFSET.to_string());
        let search_utc_offset =
            offset_spec
                .parse::<FixedOffset>()
                .map_err(|_| ConfigError::InvalidValue {
                    var: "SEARCH_UTC_OFFSET".to_string(),
                    reason: format!("Must be a UTC offset like -04:00, got: {}", offset_spec),
                })?;

        let request_timeout = Self::parse_env_u64("REQUEST_TIMEOUT", 15)?;

        let addr_spec =
            env::var("LISTEN_ADDR").unwrap_or_else(|_| DEFAULT_LISTEN_ADDR.to_string());
        let listen_addr = addr_spec
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidValue {
                var: "LISTEN_ADDR".to_string(),
                reason: format!("Must be a socket address like 127.0.0.1:8300, got: {}", addr_spec),
            })?;

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Config {
            refresh_token,
            client_id,
            client_secret,
            token_url,
            org_id,
            crm_api_url,
            search_utc_offset,
            request_timeout,
            listen_addr,
            log_level,
        })
    }

    /// Read a required environment variable, rejecting blank values.
    fn require(var_name: &str) -> ConfigResult<String> {
        let value =
            env::var(var_name).map_err(|_| ConfigError::MissingVar(var_name.to_string()))?;
        if value.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                var: var_name.to_string(),
                reason: "Cannot be empty".to_string(),
            });
        }
        Ok(value)
    }

    /// Parse an environment variable as u64 with a default value.
    fn parse_env_u64(var_name: &str, default: u64) -> ConfigResult<u64> {
        match env::var(var_name) {
            Ok(val) => val.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                var: var_name.to_string(),
                reason: format!("Must be a positive number, got: {}", val),
            }),
            Err(_) => Ok(default),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            refresh_token: String::new(),
            client_id: String::new(),
            client_secret: String::new(),
            token_url: String::new(),
            org_id: String::new(),
            crm_api_url: DEFAULT_CRM_API_URL.to_string(),
            search_utc_offset: default_search_offset(),
            request_timeout: 15,
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 8300)),
            log_level: "info".to_string(),
        }
    }
}

fn default_search_offset() -> FixedOffset {
    FixedOffset::west_opt(4 * 3600).unwrap_or_else(|| Utc.fix())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    // Helper to set and unset env vars for testing
    struct EnvGuard {
        vars: Vec<String>,
    }

    impl EnvGuard {
        fn new() -> Self {
            EnvGuard { vars: Vec::new() }
        }

        fn set(&mut self, key: &str, value: &str) {
            env::set_var(key, value);
            self.vars.push(key.to_string());
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for var in &self.vars {
                env::remove_var(var);
            }
        }
    }

    fn set_required(guard: &mut EnvGuard) {
        guard.set("ZOHO_REFRESH_TOKEN", "refresh-abc");
        guard.set("ZOHO_CLIENT_ID", "client-id");
        guard.set("ZOHO_CLIENT_SECRET", "client-secret");
        guard.set("ZOHO_TOKEN_URL", "https://accounts.example.com/oauth/v2/token");
        guard.set("ZOHO_ORG_ID", "org-123");
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.crm_api_url, DEFAULT_CRM_API_URL);
        assert_eq!(config.request_timeout, 15);
        assert_eq!(config.search_utc_offset.local_minus_utc(), -4 * 3600);
    }

    #[test]
    #[serial]
    fn test_config_from_env_missing_required() {
        let _ = dotenvy::dotenv();
        for var in [
            "ZOHO_REFRESH_TOKEN",
            "ZOHO_CLIENT_ID",
            "ZOHO_CLIENT_SECRET",
            "ZOHO_TOKEN_URL",
            "ZOHO_ORG_ID",
        ] {
            env::remove_var(var);
        }

        let result = Config::from_env();
        assert!(result.is_err());
        match result {
            Err(ConfigError::MissingVar(var)) => assert_eq!(var, "ZOHO_REFRESH_TOKEN"),
            other => panic!("Expected MissingVar error, got: {:?}", other),
        }
    }

    #[test]
    #[serial]
    fn test_config_from_env_invalid_token_url() {
        let mut guard = EnvGuard::new();
        set_required(&mut guard);
        guard.set("ZOHO_TOKEN_URL", "not-a-url");

        let result = Config::from_env();
        assert!(result.is_err());
        if let Err(ConfigError::InvalidValue { var, .. }) = result {
            assert_eq!(var, "ZOHO_TOKEN_URL");
        }
    }

    #[test]
    #[serial]
    fn test_config_from_env_blank_org_id() {
        let mut guard = EnvGuard::new();
        set_required(&mut guard);
        guard.set("ZOHO_ORG_ID", "   ");

        let result = Config::from_env();
        assert!(result.is_err());
        if let Err(ConfigError::InvalidValue { var, .. }) = result {
            assert_eq!(var, "ZOHO_ORG_ID");
        }
    }

    #[test]
    #[serial]
    fn test_config_from_env_invalid_offset() {
        let mut guard = EnvGuard::new();
        set_required(&mut guard);
        guard.set("SEARCH_UTC_OFFSET", "Toronto");

        let result = Config::from_env();
        assert!(result.is_err());
        match result {
            Err(ConfigError::InvalidValue { var, .. }) => assert_eq!(var, "SEARCH_UTC_OFFSET"),
            other => panic!("Expected InvalidValue error, got: {:?}", other),
        }
    }

    #[test]
    #[serial]
    fn test_config_from_env_valid() {
        let mut guard = EnvGuard::new();
        set_required(&mut guard);
        guard.set("SEARCH_UTC_OFFSET", "-05:00");
        guard.set("REQUEST_TIMEOUT", "30");
        guard.set("LISTEN_ADDR", "0.0.0.0:9000");

        let result = Config::from_env();
        assert!(
            result.is_ok(),
            "Config should be valid with all required fields set: {:?}",
            result.err()
        );

        let config = result.unwrap();
        assert_eq!(config.org_id, "org-123");
        assert_eq!(config.search_utc_offset.local_minus_utc(), -5 * 3600);
        assert_eq!(config.request_timeout, 30);
        assert_eq!(config.listen_addr.port(), 9000);
        assert_eq!(config.crm_api_url, DEFAULT_CRM_API_URL);
    }

    #[test]
    #[serial]
    fn test_parse_env_u64() {
        let mut guard = EnvGuard::new();
        guard.set("TEST_TIMEOUT_U64", "42");

        let result = Config::parse_env_u64("TEST_TIMEOUT_U64", 15);
        assert_eq!(result.unwrap(), 42);

        let result = Config::parse_env_u64("NONEXISTENT", 15);
        assert_eq!(result.unwrap(), 15);
    }

    #[test]
    #[serial]
    fn test_parse_env_u64_invalid() {
        let mut guard = EnvGuard::new();
        guard.set("TEST_TIMEOUT_INVALID", "soon");

        let result = Config::parse_env_u64("TEST_TIMEOUT_INVALID", 15);
        assert!(result.is_err());
    }
}
