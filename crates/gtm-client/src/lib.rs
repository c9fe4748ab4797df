//! Blocking client for the Tag Manager API v2.
//!
//! [`GtmConnector`] loads a service-account key, exchanges a signed JWT for
//! an access token and hands out [`GtmClient`] sessions that implement
//! [`gtm_model::TagManager`].

mod api;
pub mod auth;
mod client;
mod connector;
pub mod credentials;
pub mod retry;
mod types;

// === Configuration ===
pub use api::{ClientConfig, DEFAULT_BASE_URL};
pub use retry::RetryPolicy;

// === Authentication ===
pub use auth::{Authenticator, TAG_MANAGER_SCOPE};
pub use credentials::{DEFAULT_TOKEN_URI, ServiceAccountKey};

// === Sessions ===
pub use client::GtmClient;
pub use connector::GtmConnector;
