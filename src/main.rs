use log::{error, info, warn};
use serde_json::Value;
use service::{config::Config, logging::Logger};
use session_auth::{
    api::ApiClient,
    credentials::{CredentialFile, CredentialPair, SessionStore},
    error::{Error, ErrorKind, HttpErrorKind},
    http::{resolve, HttpClientBuilder},
    refresh::HttpRefresher,
};
use std::sync::Arc;
use url::Url;

/// The CLI acts for exactly one session: the one stored in the credentials file.
const LOCAL_SESSION: &str = "local";

#[tokio::main]
async fn main() {
    let config = Config::new();
    Logger::init_logger(&config as &Config);

    let credential_file = CredentialFile::new(config.credentials_file());
    let credentials = match credential_file.load() {
        Ok(Some(credentials)) => credentials,
        Ok(None) => {
            error!(
                "No credentials found at {}, log in first",
                credential_file.path().display()
            );
            std::process::exit(1);
        }
        Err(e) => {
            error!("Failed to read credentials: {e}");
            std::process::exit(1);
        }
    };

    let sessions = Arc::new(SessionStore::new());
    sessions.insert(LOCAL_SESSION, credentials.clone());

    let client = match build_client(&config, Arc::clone(&sessions)) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to build API client: {e}");
            std::process::exit(1);
        }
    };

    info!(
        "Fetching {} from {} [{}]",
        config.request_path,
        config.api_base_url(),
        config.runtime_env()
    );

    let result = fetch(
        &client,
        &sessions,
        &credential_file,
        &credentials,
        &config.request_path,
    )
    .await;

    match result {
        Ok(body) => match serde_json::to_string_pretty(&body) {
            Ok(pretty) => println!("{pretty}"),
            Err(e) => {
                error!("Failed to format response: {e}");
                std::process::exit(1);
            }
        },
        Err(e) if e.is_refresh_failure() => {
            error!("Session expired and could not be refreshed, log in again: {e}");
            std::process::exit(1);
        }
        Err(e) => {
            error!("Request to {} failed: {e}", config.request_path);
            std::process::exit(1);
        }
    }
}

fn build_client(config: &Config, sessions: Arc<SessionStore>) -> Result<ApiClient, Error> {
    let mut builder = HttpClientBuilder::new().with_timeout(config.request_timeout());
    if let Some(version) = &config.api_version {
        builder = builder.with_api_version(version.clone());
    }
    let http = builder.build()?;

    let base_url = parse_url(config.api_base_url())?;
    let refresh_url = resolve(&base_url, config.refresh_path())?;
    let refresher = HttpRefresher::new(http.clone(), refresh_url);

    Ok(ApiClient::new(http, base_url, sessions, Arc::new(refresher)))
}

fn parse_url(url: &str) -> Result<Url, Error> {
    Url::parse(url).map_err(|e| Error {
        source: Some(Box::new(e)),
        error_kind: ErrorKind::Http(HttpErrorKind::BuilderFailed),
    })
}

/// GET `path` for the local session, then write back the pair if it was refreshed.
///
/// The pair is written back even when the retried call fails.
async fn fetch(
    client: &ApiClient,
    sessions: &SessionStore,
    file: &CredentialFile,
    original: &CredentialPair,
    path: &str,
) -> Result<Value, Error> {
    let result = client.get::<Value>(LOCAL_SESSION, path).await;
    persist_if_refreshed(file, original, sessions);
    result
}

/// Write the session's pair back to disk if a refresh replaced it.
fn persist_if_refreshed(file: &CredentialFile, original: &CredentialPair, sessions: &SessionStore) {
    let Some(current) = sessions.get(LOCAL_SESSION) else {
        return;
    };
    if current.same_tokens(original) {
        return;
    }

    match file.save(&current) {
        Ok(()) => info!("Stored refreshed credentials in {}", file.path().display()),
        Err(e) => warn!("Failed to store refreshed credentials: {e}"),
    }
}
