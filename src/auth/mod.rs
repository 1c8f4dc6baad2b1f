//! OAuth credential management for the CRM connection.

mod token_cache;

pub use token_cache::{Credential, TokenCache, REFRESH_MARGIN_SECS};
