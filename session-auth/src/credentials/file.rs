//! JSON file persistence for a single credential pair.

use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::CredentialPair;
use crate::error::{CredentialErrorKind, Error, ErrorKind};

/// On-disk shape of a credential pair.
#[derive(Debug, Serialize, Deserialize)]
struct StoredCredentials {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// A credential pair persisted as a JSON file.
#[derive(Debug, Clone)]
pub struct CredentialFile {
    path: PathBuf,
}

impl CredentialFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored pair. A missing file is `Ok(None)`.
    pub fn load(&self) -> Result<Option<CredentialPair>, Error> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == IoErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(storage_failed(e)),
        };

        let stored: StoredCredentials = serde_json::from_str(&contents).map_err(|e| Error {
            source: Some(Box::new(e)),
            error_kind: ErrorKind::Credential(CredentialErrorKind::Malformed),
        })?;

        Ok(Some(CredentialPair {
            access_token: SecretString::new(stored.access_token),
            refresh_token: stored.refresh_token.map(SecretString::new),
        }))
    }

    /// Write the pair, replacing whatever the file held.
    pub fn save(&self, credentials: &CredentialPair) -> Result<(), Error> {
        let stored = StoredCredentials {
            access_token: credentials.access_token.expose_secret().clone(),
            refresh_token: credentials
                .refresh_token
                .as_ref()
                .map(|token| token.expose_secret().clone()),
        };

        let json = serde_json::to_string_pretty(&stored).map_err(|e| Error {
            source: Some(Box::new(e)),
            error_kind: ErrorKind::Credential(CredentialErrorKind::StorageFailed),
        })?;

        std::fs::write(&self.path, json).map_err(storage_failed)
    }
}

fn storage_failed(err: std::io::Error) -> Error {
    Error {
        source: Some(Box::new(err)),
        error_kind: ErrorKind::Credential(CredentialErrorKind::StorageFailed),
    }
}
