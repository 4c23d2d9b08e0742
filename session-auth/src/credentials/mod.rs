//! Credential pairs, where they live, and how they are persisted.

mod file;
mod pair;
mod store;

pub use file::CredentialFile;
pub use pair::{CredentialPair, RefreshResult};
pub use store::SessionStore;
