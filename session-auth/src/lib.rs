//! # session-auth
//!
//! Authenticated calls to the backend API on behalf of a user session, with
//! automatic credential refresh:
//! - `executor`: run a call, and on failure refresh the credentials once and retry once
//! - `credentials`: credential pairs, the per-session store and file persistence
//! - `refresh`: exchanging a refresh token for a new pair over HTTP
//! - `api`: JSON API client that routes every call through the executor
//! - `http`: building the shared `reqwest` client
//!
//! ## Usage
//!
//! ```rust,ignore
//! use session_auth::{
//!     api::ApiClient,
//!     credentials::{CredentialPair, SessionStore},
//!     http::HttpClientBuilder,
//!     refresh::HttpRefresher,
//! };
//! ```

pub mod api;
pub mod credentials;
pub mod error;
pub mod executor;
pub mod http;
pub mod refresh;

// Re-export commonly used types
pub use error::{Error, ErrorKind};
pub use executor::execute_with_refresh;
