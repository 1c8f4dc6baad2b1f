//! Data models for CRM lead records.

pub mod lead;

pub use lead::{any_disqualifying, Lead, DISQUALIFYING_STATUSES};
