//! Request handlers for the lead-intake endpoints.
//!
//! Failures are caught once here and mapped to a generic JSON body with the
//! best-known status code: the CRM's own status when it rejected the request,
//! 504 for an outbound timeout, 500 otherwise. Diagnostic detail goes to the
//! log, never to the wire.

use crate::criteria::LeadQuery;
use crate::error::CrmApiError;
use crate::models::Lead;
use crate::services::LeadService;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub leads: Arc<LeadService>,
}

/// Build the lead-intake router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/leads/search-duplicates", post(search_duplicates))
        .route("/leads", post(create_lead))
        .route("/healthz", get(healthz))
        .with_state(state)
}

/// Body of `POST /leads/search-duplicates`.
#[derive(Debug, Deserialize)]
pub struct SearchDuplicatesRequest {
    #[serde(default)]
    pub address: Option<String>,

    #[serde(default)]
    pub phone: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    /// Anchor date of the requested booking
    pub date: NaiveDate,
}

#[derive(Debug, Serialize)]
struct LeadListBody {
    data: Vec<Lead>,
}

async fn search_duplicates(
    State(state): State<AppState>,
    Json(request): Json<SearchDuplicatesRequest>,
) -> Response {
    let query = LeadQuery::new(request.address, request.phone, request.email, request.date);

    match state.leads.search_duplicates(&query).await {
        Ok(data) => (StatusCode::OK, Json(LeadListBody { data })).into_response(),
        Err(e) => {
            tracing::error!("duplicate search failed: {}", e);
            error_response(&e, "Failed to fetch leads")
        }
    }
}

async fn create_lead(
    State(state): State<AppState>,
    Json(fields): Json<Map<String, Value>>,
) -> Response {
    match state.leads.create(fields).await {
        Ok(envelope) => (StatusCode::OK, Json(envelope)).into_response(),
        Err(e) => {
            tracing::error!("lead creation failed: {}", e);
            error_response(&e, "Failed to create leads")
        }
    }
}

async fn healthz() -> &'static str {
    "ok"
}

/// Map a service failure to the best-known status code with a generic body.
fn error_response(error: &CrmApiError, message: &str) -> Response {
    (error_status(error), Json(json!({ "error": message }))).into_response()
}

fn error_status(error: &CrmApiError) -> StatusCode {
    match error {
        CrmApiError::Upstream { status, .. } => {
            StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
        }
        CrmApiError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
