//! Service layer orchestrating token acquisition and CRM calls.

pub mod lead_service;

pub use lead_service::LeadService;
