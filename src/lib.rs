/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/10/26
******************************************************************************/

//! # iplicit client
//!
//! Session and request core for the iplicit accounting REST API.
//!
//! The crate is split in two layers:
//!
//! - [`application::auth::SessionManager`] owns the single session token and
//!   refreshes it on demand, serializing concurrent refreshes.
//! - [`model::http::HttpClient`] issues authenticated calls, self-throttles
//!   against the upstream request budget, retries transient network failures
//!   and classifies every response into [`error::AppError`].
//!
//! [`application::client::Client`] builds the convenience operations (code
//! lookups, default resolution, invoice creation, document workflow) on top
//! of the base request primitive.
//!
//! ```rust,ignore
//! use iplicit_client::prelude::*;
//!
//! let config = Config::from_env()?;
//! let client = Client::from_config(&config)?;
//! let contact = client.lookup_contact_by_code("ACME01").await?;
//! ```

/// Application layer: configuration, session manager, request budget and client
pub mod application;
/// Global constants
pub mod constants;
/// Error taxonomy shared by every operation
pub mod error;
/// Request core and wire models
pub mod model;
/// Convenience re-exports
pub mod prelude;
/// HTTP transport abstraction
pub mod transport;
/// Environment, logging and id helpers
pub mod utils;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Returns the library version
#[must_use]
pub fn version() -> &'static str {
    VERSION
}
