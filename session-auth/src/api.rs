//! JSON API client whose calls refresh the session's credentials once on failure.

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::credentials::SessionStore;
use crate::error::{
    credential_error, operation_error, CredentialErrorKind, Error, ErrorKind, OperationErrorKind,
};
use crate::executor::execute_with_refresh;
use crate::http::resolve;
use crate::refresh::{refresh_session, Refresher};

/// Client for the backend API acting on behalf of stored sessions.
///
/// Every call goes through [`execute_with_refresh`]: the request is sent with the
/// session's access token, and if it fails for any reason the session is refreshed
/// once, the new pair is written back to the store and the request is sent again.
/// An `Unauthorized` or `Status` error returned to the caller is therefore the
/// failure of that second attempt.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    sessions: Arc<SessionStore>,
    refresher: Arc<dyn Refresher>,
}

impl ApiClient {
    pub fn new(
        http: reqwest::Client,
        base_url: Url,
        sessions: Arc<SessionStore>,
        refresher: Arc<dyn Refresher>,
    ) -> Self {
        Self {
            http,
            base_url,
            sessions,
            refresher,
        }
    }

    /// Fetch `path` and decode the JSON body.
    ///
    /// Decoding happens after the refresh-and-retry cycle, so a 2xx body that does
    /// not decode is returned as `InvalidResponse` without a refresh.
    pub async fn get<T: DeserializeOwned>(&self, session_id: &str, path: &str) -> Result<T, Error> {
        let body = self.send(session_id, Method::GET, path, None).await?;
        decode(body)
    }

    pub async fn post<T: DeserializeOwned>(
        &self,
        session_id: &str,
        path: &str,
        payload: &Value,
    ) -> Result<T, Error> {
        let body = self
            .send(session_id, Method::POST, path, Some(payload))
            .await?;
        decode(body)
    }

    pub async fn delete(&self, session_id: &str, path: &str) -> Result<(), Error> {
        self.send(session_id, Method::DELETE, path, None).await?;
        Ok(())
    }

    /// Send a request for `session_id`, refreshing and retrying once on failure.
    ///
    /// `path` is resolved below the base URL, so a base of `https://host/api/v1`
    /// and a path of `/users/me` address `https://host/api/v1/users/me`.
    /// Returns the response body as text; an empty body is returned as `""`.
    pub async fn send(
        &self,
        session_id: &str,
        method: Method,
        path: &str,
        payload: Option<&Value>,
    ) -> Result<String, Error> {
        let url = resolve(&self.base_url, path)?;

        execute_with_refresh(
            || self.send_once(session_id, method.clone(), url.clone(), payload),
            || refresh_session(&self.sessions, session_id, self.refresher.as_ref()),
            |credentials| {
                self.sessions.replace(session_id, credentials);
            },
        )
        .await
    }

    async fn send_once(
        &self,
        session_id: &str,
        method: Method,
        url: Url,
        payload: Option<&Value>,
    ) -> Result<String, Error> {
        let access_token = self.sessions.access_token(session_id).ok_or_else(|| {
            credential_error(
                CredentialErrorKind::SessionNotFound,
                "No access token for session",
            )
        })?;

        debug!("{} {} for session {}", method, url, session_id);

        let mut request = self
            .http
            .request(method, url)
            .bearer_auth(access_token.expose_secret());
        if let Some(payload) = payload {
            request = request.json(payload);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            return Err(operation_error(
                OperationErrorKind::Unauthorized,
                "API rejected the access token",
            ));
        }
        if !status.is_success() {
            return Err(operation_error(
                OperationErrorKind::Status(status.as_u16()),
                &format!("API returned {}", status),
            ));
        }

        Ok(response.text().await?)
    }
}

fn decode<T: DeserializeOwned>(body: String) -> Result<T, Error> {
    serde_json::from_str(&body).map_err(|e| Error {
        source: Some(Box::new(e)),
        error_kind: ErrorKind::Operation(OperationErrorKind::InvalidResponse),
    })
}
