//! Cached access token with refresh-token exchange.
//!
//! CRM access tokens are short-lived. The cache holds the current token and
//! its expiry, and re-runs the refresh exchange when the token is absent or
//! inside the refresh margin. The credential sits behind an async mutex that
//! stays held across the exchange, so concurrent expirations collapse into a
//! single refresh and late callers see its result.

use crate::config::Config;
use crate::error::{AuthError, AuthResult};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Refresh this many seconds before the token actually expires.
pub const REFRESH_MARGIN_SECS: i64 = 5 * 60;

/// The current access token and when it stops being valid.
#[derive(Debug, Clone, Default)]
pub struct Credential {
    access_token: String,
    expires_at: Option<DateTime<Utc>>,
}

impl Credential {
    /// A credential obtained from a refresh exchange.
    pub fn new(access_token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Credential {
            access_token: access_token.into(),
            expires_at: Some(expires_at),
        }
    }

    /// The bearer token itself; empty until the first refresh succeeds.
    pub fn token(&self) -> &str {
        &self.access_token
    }

    /// Absolute expiry, if a token is held.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// True when the token is absent or within the refresh margin of expiry
    /// (margin boundary included).
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        if self.access_token.is_empty() {
            return true;
        }
        match self.expires_at {
            Some(expiry) => now + chrono::Duration::seconds(REFRESH_MARGIN_SECS) >= expiry,
            None => true,
        }
    }
}

/// Successful token-endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,

    /// Token lifetime in seconds
    expires_in: i64,
}

/// Process-wide access-token cache for the CRM connection.
///
/// Shared across all request handlers; callers go through
/// [`TokenCache::access_token`], which refreshes on demand.
pub struct TokenCache {
    token_url: String,
    refresh_token: String,
    client_id: String,
    client_secret: String,
    agent: Arc<ureq::Agent>,
    credential: Mutex<Credential>,
    refreshes: AtomicU64,
}

impl TokenCache {
    /// Create a token cache from configuration.
    pub fn new(config: &Config) -> Self {
        Self::build(
            config.token_url.clone(),
            config.refresh_token.clone(),
            config.client_id.clone(),
            config.client_secret.clone(),
            config.request_timeout,
        )
    }

    /// Create a token cache against a custom endpoint (useful for testing).
    #[doc(hidden)]
    pub fn with_endpoint(
        token_url: String,
        refresh_token: String,
        client_id: String,
        client_secret: String,
    ) -> Self {
        Self::build(token_url, refresh_token, client_id, client_secret, 10)
    }

    fn build(
        token_url: String,
        refresh_token: String,
        client_id: String,
        client_secret: String,
        timeout_secs: u64,
    ) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(timeout_secs))
            .build();

        TokenCache {
            token_url,
            refresh_token,
            client_id,
            client_secret,
            agent: Arc::new(agent),
            credential: Mutex::new(Credential::default()),
            refreshes: AtomicU64::new(0),
        }
    }

    /// Return a token valid for at least the refresh margin, performing the
    /// refresh exchange first when needed.
    ///
    /// The lock is held across the exchange; on failure the stored credential
    /// is left exactly as it was and the error propagates to the caller.
    pub async fn access_token(&self) -> AuthResult<String> {
        let mut credential = self.credential.lock().await;
        if credential.needs_refresh(Utc::now()) {
            *credential = self.refresh().await?;
        }
        Ok(credential.token().to_string())
    }

    /// Number of completed refresh exchanges.
    pub fn refresh_count(&self) -> u64 {
        self.refreshes.load(Ordering::Relaxed)
    }

    /// Trade the refresh token for a fresh access token.
    async fn refresh(&self) -> AuthResult<Credential> {
        let agent = self.agent.clone();
        let token_url = self.token_url.clone();
        let refresh_token = self.refresh_token.clone();
        let client_id = self.client_id.clone();
        let client_secret = self.client_secret.clone();

        tracing::debug!("refreshing CRM access token");

        let response = tokio::task::spawn_blocking(move || {
            agent
                .post(&token_url)
                .send_form(&[
                    ("refresh_token", refresh_token.as_str()),
                    ("client_id", client_id.as_str()),
                    ("client_secret", client_secret.as_str()),
                    ("grant_type", "refresh_token"),
                ])
                .map_err(map_exchange_error)
        })
        .await
        .map_err(|e| AuthError::HttpError(format!("Task join error: {}", e)))??;

        let body = response
            .into_string()
            .map_err(|e| AuthError::HttpError(e.to_string()))?;
        let token: TokenResponse = serde_json::from_str(&body).map_err(AuthError::JsonError)?;

        self.refreshes.fetch_add(1, Ordering::Relaxed);
        tracing::debug!("access token refreshed, valid for {}s", token.expires_in);

        Ok(Credential::new(
            token.access_token,
            Utc::now() + chrono::Duration::seconds(token.expires_in),
        ))
    }
}

impl std::fmt::Debug for TokenCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCache")
            .field("token_url", &self.token_url)
            .field("refreshes", &self.refresh_count())
            .finish()
    }
}

/// Map a ureq error from the token endpoint to an AuthError.
fn map_exchange_error(error: ureq::Error) -> AuthError {
    match error {
        ureq::Error::Status(status, response) => {
            let body = response
                .into_string()
                .unwrap_or_else(|_| "Unknown error".to_string());
            AuthError::ExchangeFailed { status, body }
        }
        ureq::Error::Transport(transport) => AuthError::HttpError(transport.to_string()),
    }
}
