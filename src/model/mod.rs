/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/10/26
******************************************************************************/
/// Wire models of the session endpoint
pub mod auth;
/// Request core: throttling, token injection, retry and classification
pub mod http;
/// Typed partial payloads for write operations
pub mod requests;
/// Helpers over opaque response payloads
pub mod responses;
/// Retry configuration for HTTP requests
pub mod retry;
pub mod utils;
