//! Lead operations: duplicate search and record creation.

use crate::auth::TokenCache;
use crate::client::AsyncCrmClient;
use crate::criteria::LeadQuery;
use crate::error::CrmApiResult;
use crate::models::{any_disqualifying, Lead};
use chrono::FixedOffset;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Business operations over lead records.
///
/// Owns the token cache and the CRM client; each call acquires a valid
/// access token and performs one upstream request. There are no retries;
/// failures propagate to the handler boundary.
pub struct LeadService {
    client: Arc<dyn AsyncCrmClient>,
    tokens: Arc<TokenCache>,
    search_offset: FixedOffset,
}

impl LeadService {
    /// Create a new lead service.
    pub fn new(
        client: Arc<dyn AsyncCrmClient>,
        tokens: Arc<TokenCache>,
        search_offset: FixedOffset,
    ) -> Self {
        Self {
            client,
            tokens,
            search_offset,
        }
    }

    /// Find existing leads that may collide with a new booking.
    ///
    /// Returns the raw record list; interpreting statuses is the intake
    /// workflow's call, not this service's. The verdict is still logged here
    /// so upstream rejections can be correlated with what the CRM returned.
    pub async fn search_duplicates(&self, query: &LeadQuery) -> CrmApiResult<Vec<Lead>> {
        let token = self.tokens.access_token().await?;
        let criteria = query.criteria(self.search_offset).render();

        tracing::debug!(%criteria, "searching for duplicate leads");
        let leads = self.client.search_leads(&token, &criteria).await?;

        tracing::info!(
            matches = leads.len(),
            duplicate = any_disqualifying(&leads),
            "duplicate search complete"
        );
        Ok(leads)
    }

    /// Create a lead record from the submitted field mapping and return the
    /// CRM's response envelope verbatim.
    pub async fn create(&self, fields: Map<String, Value>) -> CrmApiResult<Value> {
        let token = self.tokens.access_token().await?;
        let envelope = self.client.create_lead(&token, &fields).await?;

        tracing::info!("lead record created");
        Ok(envelope)
    }
}
