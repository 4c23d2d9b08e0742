//! Credential pair types.

use secrecy::{ExposeSecret, SecretString};

/// Access and refresh token for one user session.
#[derive(Debug, Clone)]
pub struct CredentialPair {
    /// Access token sent as a bearer token on API requests.
    pub access_token: SecretString,
    /// Refresh token for obtaining a new pair. May be absent, e.g. when the
    /// session cookie jar only ever held an access token.
    pub refresh_token: Option<SecretString>,
}

impl CredentialPair {
    /// Create a pair holding both tokens.
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: SecretString::new(access_token.into()),
            refresh_token: Some(SecretString::new(refresh_token.into())),
        }
    }

    /// Create a pair with no refresh token.
    pub fn access_only(access_token: impl Into<String>) -> Self {
        Self {
            access_token: SecretString::new(access_token.into()),
            refresh_token: None,
        }
    }

    /// Compare two pairs token by token.
    pub fn same_tokens(&self, other: &CredentialPair) -> bool {
        self.access_token.expose_secret() == other.access_token.expose_secret()
            && self.refresh_token.as_ref().map(|t| t.expose_secret())
                == other.refresh_token.as_ref().map(|t| t.expose_secret())
    }
}

/// Result of a refresh operation.
#[derive(Debug, Clone)]
pub struct RefreshResult {
    /// The pair that replaces the session's previous one.
    pub credentials: CredentialPair,
    /// True if the refresh endpoint issued a new refresh token.
    pub refresh_token_rotated: bool,
}

impl RefreshResult {
    /// Create a refresh result with no rotation.
    pub fn no_rotation(credentials: CredentialPair) -> Self {
        Self {
            credentials,
            refresh_token_rotated: false,
        }
    }

    /// Create a refresh result with rotation.
    pub fn with_rotation(credentials: CredentialPair) -> Self {
        Self {
            credentials,
            refresh_token_rotated: true,
        }
    }
}
