//! Lead-intake server - a Rust service bridging a booking form to Zoho CRM.
//!
//! This library backs the intake form's two server-side operations: duplicate
//! detection against existing lead records, and lead creation. Both ride on a
//! cached OAuth access token refreshed on demand.
//!
//! # Architecture
//!
//! - **auth**: cached access token with refresh-token exchange
//! - **client**: HTTP client for the CRM REST API
//! - **config**: configuration management from environment variables
//! - **criteria**: typed filter expressions for the CRM search grammar
//! - **error**: custom error types for precise error handling
//! - **metrics**: counters for outbound CRM traffic
//! - **models**: lead record model and duplicate classification
//! - **server**: HTTP endpoints exposed to the intake form
//! - **services**: orchestration of token acquisition and CRM calls

pub mod auth;
pub mod client;
pub mod config;
pub mod criteria;
pub mod error;
pub mod metrics;
pub mod models;
pub mod server;
pub mod services;

pub use auth::{Credential, TokenCache};
pub use client::{AsyncCrmClient, AsyncCrmClientImpl, ZohoClient};
pub use config::Config;
pub use criteria::{duplicate_window, Criteria, LeadQuery};
pub use error::{AuthError, ConfigError, CrmApiError};
pub use metrics::{Metrics, MetricsSummary};
pub use models::{any_disqualifying, Lead};
pub use server::{router, AppState, SearchDuplicatesRequest};
pub use services::LeadService;
