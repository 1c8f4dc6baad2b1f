//! Error types for the lead-intake server.
//!
//! This module defines custom error types using `thiserror` for precise error handling.

use thiserror::Error;

/// Errors that can occur when talking to the CRM API.
#[derive(Error, Debug)]
pub enum CrmApiError {
    /// HTTP transport failed before a response was received
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// CRM rejected the request with a non-success status code
    #[error("CRM error (status {status}): {body}")]
    Upstream { status: u16, body: String },

    /// Failed to parse JSON response
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Network timeout
    #[error("Request timeout")]
    Timeout,

    /// Token acquisition failed before the CRM call was made
    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Errors that can occur during the refresh-token exchange.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Token endpoint answered with a non-success status code
    #[error("Token exchange failed (status {status}): {body}")]
    ExchangeFailed { status: u16, body: String },

    /// HTTP transport failed before a response was received
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Token endpoint returned a body that could not be decoded
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Required environment variable is missing
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    /// Environment variable has invalid value
    #[error("Invalid value for {var}: {reason}")]
    InvalidValue { var: String, reason: String },
}

/// Convenience type alias for Results with CrmApiError
pub type CrmApiResult<T> = Result<T, CrmApiError>;

/// Convenience type alias for Results with AuthError
pub type AuthResult<T> = Result<T, AuthError>;

/// Convenience type alias for Results with ConfigError
pub type ConfigResult<T> = Result<T, ConfigError>;
