//! HTTP client building and endpoint resolution.

mod client;
mod endpoint;

pub use client::{HttpClientBuilder, HttpClientConfig, API_VERSION_HEADER};
pub use endpoint::resolve;
