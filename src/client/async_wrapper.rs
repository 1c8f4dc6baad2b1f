//! Async wrapper around the synchronous ZohoClient.
//!
//! This module provides an async interface to the synchronous ZohoClient by
//! using `tokio::task::spawn_blocking` to run HTTP operations on a dedicated
//! thread pool, preventing blocking of the async runtime. The trait is also
//! the seam mock clients implement in tests.

use crate::client::ZohoClient;
use crate::error::{CrmApiError, CrmApiResult};
use crate::models::Lead;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Async CRM client operations.
#[async_trait]
pub trait AsyncCrmClient: Send + Sync {
    /// Search lead records matching a rendered criteria expression.
    async fn search_leads(&self, token: &str, criteria: &str) -> CrmApiResult<Vec<Lead>>;

    /// Create a lead record from a field mapping.
    async fn create_lead(&self, token: &str, fields: &Map<String, Value>) -> CrmApiResult<Value>;
}

/// Async wrapper around the synchronous ZohoClient.
#[derive(Clone)]
pub struct AsyncCrmClientImpl {
    client: Arc<ZohoClient>,
}

impl AsyncCrmClientImpl {
    pub fn new(client: ZohoClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

#[async_trait]
impl AsyncCrmClient for AsyncCrmClientImpl {
    async fn search_leads(&self, token: &str, criteria: &str) -> CrmApiResult<Vec<Lead>> {
        let client = self.client.clone();
        let token = token.to_string();
        let criteria = criteria.to_string();

        tokio::task::spawn_blocking(move || client.search_leads(&token, &criteria))
            .await
            .map_err(|e| CrmApiError::HttpError(format!("Task join error: {}", e)))?
    }

    async fn create_lead(&self, token: &str, fields: &Map<String, Value>) -> CrmApiResult<Value> {
        let client = self.client.clone();
        let token = token.to_string();
        let fields = fields.clone();

        tokio::task::spawn_blocking(move || client.create_lead(&token, &fields))
            .await
            .map_err(|e| CrmApiError::HttpError(format!("Task join error: {}", e)))?
    }
}
