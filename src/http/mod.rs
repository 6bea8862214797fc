//! HTTP execution module
//!
//! Sends request descriptors and runs the token exchange.
//!
//! # Features
//!
//! - **Uniform outcome**: every call yields a `Response`, never an error
//! - **Timeouts**: independent connect and socket bounds from `HttpConfig`
//! - **Authentication**: app and user token exchange with cached expiry

mod endpoints;
mod executor;

pub use endpoints::TokenEndpoints;
pub use executor::{RequestExecutor, TOKEN_EXPIRY_MARGIN_MS};
