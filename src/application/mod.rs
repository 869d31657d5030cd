/// Session manager
pub mod auth;
/// High level client with convenience operations
pub mod client;
/// Application configuration module
pub mod config;
/// Service interfaces implemented by the client
pub mod interfaces;
/// Rolling request budget
pub mod rate_limiter;
