//! Error types for the `session-auth` crate.
//!
//! Follows the same pattern as the service layer: a root Error struct holding an
//! error kind tree and an optional source for error chaining.

use std::error::Error as StdError;
use std::fmt;

/// Top-level error type for session-auth crate.
/// Holds error kind and optional source for error chaining.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

/// Major categories of errors in session-auth.
#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    Operation(OperationErrorKind),
    Refresh(RefreshErrorKind),
    Credential(CredentialErrorKind),
    Http(HttpErrorKind),
}

/// Errors from the wrapped remote call.
#[derive(Debug, PartialEq)]
pub enum OperationErrorKind {
    /// The API answered 401.
    Unauthorized,
    /// The API answered with another non-success status.
    Status(u16),
    /// The API answered 2xx but the body could not be decoded.
    InvalidResponse,
}

/// Errors from refreshing a credential pair.
#[derive(Debug, PartialEq)]
pub enum RefreshErrorKind {
    /// No refresh token was available for the session.
    Unavailable,
    /// The refresh endpoint refused the refresh token (expired or revoked).
    Rejected,
    /// The refresh endpoint answered 2xx with an unusable body.
    InvalidResponse,
}

/// Errors from credential lookup and persistence.
#[derive(Debug, PartialEq)]
pub enum CredentialErrorKind {
    SessionNotFound,
    StorageFailed,
    Malformed,
}

/// Errors from HTTP client operations.
#[derive(Debug, PartialEq)]
pub enum HttpErrorKind {
    BuilderFailed,
    RequestFailed,
    Network,
}

impl Error {
    /// True when the session can no longer be refreshed and the user has to log in again.
    pub fn is_refresh_failure(&self) -> bool {
        matches!(
            self.error_kind,
            ErrorKind::Refresh(RefreshErrorKind::Unavailable)
                | ErrorKind::Refresh(RefreshErrorKind::Rejected)
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_kind {
            ErrorKind::Operation(kind) => write!(f, "Operation error: {:?}", kind)?,
            ErrorKind::Refresh(kind) => write!(f, "Refresh error: {:?}", kind)?,
            ErrorKind::Credential(kind) => write!(f, "Credential error: {:?}", kind)?,
            ErrorKind::Http(kind) => write!(f, "HTTP error: {:?}", kind)?,
        }
        if let Some(source) = &self.source {
            write!(f, " ({})", source)?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let error_kind = if err.is_builder() {
            ErrorKind::Http(HttpErrorKind::BuilderFailed)
        } else if err.is_request() {
            ErrorKind::Http(HttpErrorKind::RequestFailed)
        } else {
            ErrorKind::Http(HttpErrorKind::Network)
        };

        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

/// Helper function to create operation errors.
pub fn operation_error(kind: OperationErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Operation(kind),
    }
}

/// Helper function to create refresh errors.
pub fn refresh_error(kind: RefreshErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Refresh(kind),
    }
}

/// Helper function to create credential errors.
pub fn credential_error(kind: CredentialErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Credential(kind),
    }
}
