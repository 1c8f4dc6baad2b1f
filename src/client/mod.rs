//! HTTP client for the Zoho CRM REST API.
//!
//! This module provides a synchronous HTTP client that is used from async
//! contexts via `tokio::task::spawn_blocking` (see [`AsyncCrmClient`]). The
//! client handles auth headers, error mapping, and the search/create
//! endpoints for lead records.

mod async_wrapper;
pub use async_wrapper::{AsyncCrmClient, AsyncCrmClientImpl};

use crate::config::Config;
use crate::error::{CrmApiError, CrmApiResult};
use crate::metrics::Metrics;
use crate::models::Lead;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Response envelope for the lead search endpoint.
#[derive(Debug, Deserialize)]
pub struct LeadListResponse {
    /// The matching lead records
    pub data: Vec<Lead>,

    /// Pagination metadata, unused by duplicate detection
    #[serde(default)]
    pub info: Option<Value>,
}

/// HTTP client for the Zoho CRM API.
///
/// This client uses `ureq` for synchronous HTTP requests and can be called
/// from async contexts using `tokio::task::spawn_blocking`. Bearer tokens are
/// supplied per call, since they rotate underneath the client.
#[derive(Clone)]
pub struct ZohoClient {
    /// Base URL for the CRM REST API
    base_url: String,

    /// Organization id sent with every request
    org_id: String,

    /// HTTP client agent
    agent: Arc<ureq::Agent>,

    /// Metrics collector
    metrics: Metrics,
}

impl ZohoClient {
    /// Create a new ZohoClient from configuration.
    pub fn new(config: &Config) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.request_timeout))
            .build();

        Self {
            base_url: config.crm_api_url.clone(),
            org_id: config.org_id.clone(),
            agent: Arc::new(agent),
            metrics: Metrics::new(),
        }
    }

    /// Create a ZohoClient with a custom base URL (useful for testing).
    #[doc(hidden)]
    pub fn with_base_url(base_url: String, org_id: String) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(10))
            .build();

        Self {
            base_url,
            org_id,
            agent: Arc::new(agent),
            metrics: Metrics::new(),
        }
    }

    /// Get a reference to the metrics collector.
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Build a full URL from a path.
    fn build_url(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }

    /// Execute a GET request with auth headers.
    fn get(&self, path: &str, token: &str) -> Result<ureq::Response, CrmApiError> {
        let start = Instant::now();
        let url = self.build_url(path);

        tracing::debug!("GET {}", url);

        let result = self
            .agent
            .get(&url)
            .set("Authorization", &format!("Zoho-oauthtoken {}", token))
            .set("X-CRM-ORG", &self.org_id)
            .call()
            .map_err(|e| self.map_error(e));

        let duration = start.elapsed();
        if result.is_err() {
            self.metrics.record_http_error();
        }
        self.metrics.record_http_request(duration);

        result
    }

    /// Execute a POST request with auth headers and JSON body.
    fn post(&self, path: &str, token: &str, body: &Value) -> Result<ureq::Response, CrmApiError> {
        let start = Instant::now();
        let url = self.build_url(path);

        tracing::debug!("POST {}", url);

        let result = self
            .agent
            .post(&url)
            .set("Authorization", &format!("Zoho-oauthtoken {}", token))
            .set("X-CRM-ORG", &self.org_id)
            .set("Content-Type", "application/json")
            .send_json(body)
            .map_err(|e| self.map_error(e));

        let duration = start.elapsed();
        match &result {
            Ok(response) => {
                tracing::debug!("POST {} - Success (status: {})", url, response.status());
            }
            Err(e) => {
                tracing::error!("POST {} - Error: {:?}", url, e);
                self.metrics.record_http_error();
            }
        }
        self.metrics.record_http_request(duration);

        result
    }

    /// Map a ureq error to a CrmApiError.
    fn map_error(&self, error: ureq::Error) -> CrmApiError {
        match error {
            ureq::Error::Status(status, response) => {
                let body = response
                    .into_string()
                    .unwrap_or_else(|_| "Unknown error".to_string());
                CrmApiError::Upstream { status, body }
            }
            ureq::Error::Transport(transport) => {
                if transport.kind() == ureq::ErrorKind::Io {
                    CrmApiError::Timeout
                } else {
                    CrmApiError::HttpError(transport.to_string())
                }
            }
        }
    }

    // ========================= Lead Operations =========================

    /// Search lead records matching a rendered criteria expression.
    ///
    /// The CRM answers an empty result set with `204 No Content`, which maps
    /// to an empty list rather than a decode error.
    pub fn search_leads(&self, token: &str, criteria: &str) -> CrmApiResult<Vec<Lead>> {
        let path = format!("/Leads/search?criteria={}", urlencoding::encode(criteria));
        let response = self.get(&path, token)?;

        if response.status() == 204 {
            return Ok(Vec::new());
        }

        let body = response
            .into_string()
            .map_err(|e| CrmApiError::HttpError(e.to_string()))?;
        if body.trim().is_empty() {
            return Ok(Vec::new());
        }

        let list: LeadListResponse = serde_json::from_str(&body).map_err(CrmApiError::JsonError)?;

        self.metrics.record_leads_fetched(list.data.len());
        Ok(list.data)
    }

    /// Create a lead record.
    ///
    /// The create endpoint is batch-oriented, so the submitted fields are
    /// wrapped as a single-element batch. The CRM's response envelope is
    /// returned verbatim; field validation happens upstream on the form.
    pub fn create_lead(&self, token: &str, fields: &Map<String, Value>) -> CrmApiResult<Value> {
        let body = json!({ "data": [fields] });
        let response = self.post("/Leads", token, &body)?;

        let response_body = response
            .into_string()
            .map_err(|e| CrmApiError::HttpError(e.to_string()))?;
        let envelope: Value =
            serde_json::from_str(&response_body).map_err(CrmApiError::JsonError)?;

        self.metrics.record_lead_created();
        Ok(envelope)
    }
}
