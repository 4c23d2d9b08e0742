//! Exchanging a refresh token for a new credential pair.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::credentials::{CredentialPair, RefreshResult, SessionStore};
use crate::error::{refresh_error, Error, ErrorKind, RefreshErrorKind};

/// Trait for obtaining a new credential pair from a refresh token.
#[async_trait]
pub trait Refresher: Send + Sync {
    /// Exchange `refresh_token` for a new pair.
    ///
    /// Implementations for servers that do not rotate refresh tokens must carry
    /// `refresh_token` forward into the returned pair.
    async fn refresh(&self, refresh_token: &SecretString) -> Result<RefreshResult, Error>;
}

#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Refresher that POSTs the refresh token to the backend's refresh endpoint.
///
/// Request body: `{"refresh_token": "..."}`.
/// Response body: `{"access_token": "...", "refresh_token": "..."}`, where the
/// refresh token is optional.
pub struct HttpRefresher {
    client: reqwest::Client,
    url: Url,
}

impl HttpRefresher {
    pub fn new(client: reqwest::Client, url: Url) -> Self {
        Self { client, url }
    }
}

#[async_trait]
impl Refresher for HttpRefresher {
    async fn refresh(&self, refresh_token: &SecretString) -> Result<RefreshResult, Error> {
        debug!("Refreshing credentials at {}", self.url);

        let response = self
            .client
            .post(self.url.clone())
            .json(&RefreshRequest {
                refresh_token: refresh_token.expose_secret(),
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Refresh endpoint rejected the refresh token: {}", status);
            return Err(refresh_error(
                RefreshErrorKind::Rejected,
                &format!("Refresh endpoint returned {}", status),
            ));
        }

        let body: RefreshResponse = response.json().await.map_err(|e| Error {
            source: Some(Box::new(e)),
            error_kind: ErrorKind::Refresh(RefreshErrorKind::InvalidResponse),
        })?;

        let result = match body.refresh_token {
            Some(rotated) => RefreshResult::with_rotation(CredentialPair {
                access_token: SecretString::new(body.access_token),
                refresh_token: Some(SecretString::new(rotated)),
            }),
            None => RefreshResult::no_rotation(CredentialPair {
                access_token: SecretString::new(body.access_token),
                refresh_token: Some(refresh_token.clone()),
            }),
        };

        debug!(
            "Credentials refreshed (refresh token rotated: {})",
            result.refresh_token_rotated
        );

        Ok(result)
    }
}

/// Refresh the credentials of `session_id` using the refresh token held in `store`.
///
/// Fails with `RefreshErrorKind::Unavailable` without calling `refresher` when the
/// session holds no refresh token. The store is not modified; persisting the new
/// pair is left to the caller.
pub async fn refresh_session(
    store: &SessionStore,
    session_id: &str,
    refresher: &dyn Refresher,
) -> Result<CredentialPair, Error> {
    let refresh_token = store.refresh_token(session_id).ok_or_else(|| {
        refresh_error(RefreshErrorKind::Unavailable, "No refresh token available")
    })?;

    let result = refresher.refresh(&refresh_token).await?;
    Ok(result.credentials)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server, ServerGuard};

    fn refresher_for(server: &ServerGuard) -> HttpRefresher {
        let url = Url::parse(&server.url())
            .unwrap()
            .join("/auth/refresh")
            .unwrap();
        HttpRefresher::new(reqwest::Client::new(), url)
    }

    #[tokio::test]
    async fn test_refresh_with_rotation() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/auth/refresh")
            .match_body(Matcher::Json(serde_json::json!({ "refresh_token": "refresh-1" })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token": "access-2", "refresh_token": "refresh-2"}"#)
            .expect(1)
            .create_async()
            .await;

        let refresher = refresher_for(&server);
        let result = refresher
            .refresh(&SecretString::new("refresh-1".to_string()))
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(result.refresh_token_rotated);
        assert!(result
            .credentials
            .same_tokens(&CredentialPair::new("access-2", "refresh-2")));
    }

    #[tokio::test]
    async fn test_refresh_without_rotation_keeps_refresh_token() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/auth/refresh")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token": "access-2"}"#)
            .create_async()
            .await;

        let refresher = refresher_for(&server);
        let result = refresher
            .refresh(&SecretString::new("refresh-1".to_string()))
            .await
            .unwrap();

        assert!(!result.refresh_token_rotated);
        assert!(result
            .credentials
            .same_tokens(&CredentialPair::new("access-2", "refresh-1")));
    }

    #[tokio::test]
    async fn test_refresh_rejected() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/auth/refresh")
            .with_status(401)
            .create_async()
            .await;

        let refresher = refresher_for(&server);
        let result = refresher
            .refresh(&SecretString::new("revoked".to_string()))
            .await;

        assert!(matches!(
            result,
            Err(Error {
                error_kind: ErrorKind::Refresh(RefreshErrorKind::Rejected),
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_refresh_invalid_response() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/auth/refresh")
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let refresher = refresher_for(&server);
        let result = refresher
            .refresh(&SecretString::new("refresh-1".to_string()))
            .await;

        assert!(matches!(
            result,
            Err(Error {
                error_kind: ErrorKind::Refresh(RefreshErrorKind::InvalidResponse),
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_refresh_session_without_refresh_token() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/auth/refresh")
            .expect(0)
            .create_async()
            .await;

        let store = SessionStore::new();
        store.insert("session1", CredentialPair::access_only("access"));

        let result = refresh_session(&store, "session1", &refresher_for(&server)).await;

        mock.assert_async().await;
        assert!(matches!(
            result,
            Err(Error {
                error_kind: ErrorKind::Refresh(RefreshErrorKind::Unavailable),
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_refresh_session_leaves_store_untouched() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/auth/refresh")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token": "access-2", "refresh_token": "refresh-2"}"#)
            .create_async()
            .await;

        let store = SessionStore::new();
        store.insert("session1", CredentialPair::new("access-1", "refresh-1"));

        let pair = refresh_session(&store, "session1", &refresher_for(&server))
            .await
            .unwrap();

        assert!(pair.same_tokens(&CredentialPair::new("access-2", "refresh-2")));
        assert!(store
            .get("session1")
            .unwrap()
            .same_tokens(&CredentialPair::new("access-1", "refresh-1")));
    }
}
