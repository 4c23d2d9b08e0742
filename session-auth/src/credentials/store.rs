//! Per-session credential store.

use dashmap::DashMap;
use secrecy::SecretString;
use tracing::debug;

use super::CredentialPair;

/// In-process store of credential pairs keyed by session id.
///
/// Plays the role of the browser cookie jar for a server-side caller: the pair is
/// inserted at login, read at the start of each authenticated call, replaced when a
/// refresh succeeds and removed at logout. All methods take `&self` and are safe to
/// call from concurrent tasks.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: DashMap<String, CredentialPair>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the pair issued at login, overwriting any previous pair for the session.
    pub fn insert(&self, session_id: &str, credentials: CredentialPair) {
        self.sessions.insert(session_id.to_string(), credentials);
    }

    pub fn get(&self, session_id: &str) -> Option<CredentialPair> {
        self.sessions.get(session_id).map(|entry| entry.value().clone())
    }

    pub fn access_token(&self, session_id: &str) -> Option<SecretString> {
        self.sessions
            .get(session_id)
            .map(|entry| entry.access_token.clone())
    }

    pub fn refresh_token(&self, session_id: &str) -> Option<SecretString> {
        self.sessions
            .get(session_id)
            .and_then(|entry| entry.refresh_token.clone())
    }

    /// Replace the session's pair with a refreshed one, returning the previous pair.
    ///
    /// The new pair replaces the old one entirely.
    pub fn replace(&self, session_id: &str, credentials: CredentialPair) -> Option<CredentialPair> {
        debug!("Storing refreshed credentials for session {}", session_id);
        self.sessions.insert(session_id.to_string(), credentials)
    }

    /// Remove the session's pair (logout).
    pub fn remove(&self, session_id: &str) -> Option<CredentialPair> {
        self.sessions.remove(session_id).map(|(_, credentials)| credentials)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::sync::Arc;

    #[test]
    fn test_insert_and_get() {
        let store = SessionStore::new();
        store.insert("session1", CredentialPair::new("access", "refresh"));

        let pair = store.get("session1").expect("pair should be stored");
        assert_eq!(pair.access_token.expose_secret(), "access");
        assert_eq!(
            store.refresh_token("session1").unwrap().expose_secret(),
            "refresh"
        );
        assert!(store.get("session2").is_none());
    }

    #[test]
    fn test_refresh_token_absent() {
        let store = SessionStore::new();
        store.insert("session1", CredentialPair::access_only("access"));

        assert!(store.access_token("session1").is_some());
        assert!(store.refresh_token("session1").is_none());
        assert!(store.refresh_token("unknown").is_none());
    }

    #[test]
    fn test_replace_fully_replaces_pair() {
        let store = SessionStore::new();
        store.insert("session1", CredentialPair::new("access-1", "refresh-1"));

        let previous = store
            .replace("session1", CredentialPair::access_only("access-2"))
            .expect("previous pair should be returned");

        assert!(previous.same_tokens(&CredentialPair::new("access-1", "refresh-1")));
        let current = store.get("session1").unwrap();
        assert_eq!(current.access_token.expose_secret(), "access-2");
        assert!(current.refresh_token.is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_remove() {
        let store = SessionStore::new();
        store.insert("session1", CredentialPair::new("access", "refresh"));

        assert!(store.remove("session1").is_some());
        assert!(store.remove("session1").is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_sessions() {
        let store = Arc::new(SessionStore::new());

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    let id = format!("session{}", i);
                    store.insert(&id, CredentialPair::new(format!("a{}", i), "r"));
                    store.replace(&id, CredentialPair::new(format!("b{}", i), "r"));
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.len(), 16);
        assert_eq!(store.access_token("session7").unwrap().expose_secret(), "b7");
    }
}
