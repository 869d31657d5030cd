/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/10/26
******************************************************************************/

//! # iplicit Client Prelude
//!
//! Commonly used types and traits in one import.
//!
//! ```rust,ignore
//! use iplicit_client::prelude::*;
//!
//! let config = Config::from_env()?;
//! let client = Client::from_config(&config)?;
//! let posted = client.post_document("3f2504e0-4f89-11d3-9a0c-0305e82c3301", None).await?;
//! ```

// ============================================================================
// CORE CONFIGURATION AND SETUP
// ============================================================================

pub use crate::application::config::{Config, Credentials, RateLimiterConfig, RestApiConfig};
pub use crate::model::retry::RetryConfig;
pub use crate::{VERSION, version};

// ============================================================================
// ERROR HANDLING
// ============================================================================

pub use crate::error::{AppError, ErrorCategory};

// ============================================================================
// SESSION AND REQUEST CORE
// ============================================================================

pub use crate::application::auth::{SessionManager, SessionToken};
pub use crate::application::rate_limiter::{BudgetPermit, RequestBudget};
pub use crate::model::http::{ApiRequest, HttpClient, classify_response};
pub use crate::transport::{
    HttpTransport, ReqwestTransport, TransportError, TransportRequest, TransportResponse,
};

// ============================================================================
// CLIENT AND SERVICES
// ============================================================================

pub use crate::application::client::Client;
pub use crate::application::interfaces::document::DocumentService;
pub use crate::application::interfaces::reference::ReferenceService;

// ============================================================================
// PAYLOADS
// ============================================================================

pub use crate::model::requests::{DocumentUpdate, InvoiceDraft, InvoiceKind, WorkflowAction};
pub use crate::model::responses::{bare_identifier, is_bare_result, items};

// ============================================================================
// UTILITIES
// ============================================================================

pub use crate::constants::*;
pub use crate::utils::logger::setup_logger;

// ============================================================================
// RE-EXPORTS FROM EXTERNAL CRATES
// ============================================================================

pub use async_trait::async_trait;
pub use reqwest::Method;
pub use serde_json::{Value, json};
pub use std::sync::Arc;
pub use tracing::{debug, error, info, warn};
