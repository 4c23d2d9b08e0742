//! Run a remote call under a credential, refreshing the credential once on failure.

use std::fmt::Display;
use std::future::Future;

use tracing::debug;

/// Execute `exec`, and if it fails, refresh the credential once and retry once.
///
/// 1. `exec` is invoked. On success its result is returned and nothing else runs.
/// 2. On failure `refresh` is invoked. A refresh failure is returned as-is and the
///    original failure is dropped.
/// 3. On refresh success `on_refreshed` receives the new credentials, then `exec`
///    runs one final time and its outcome is returned.
///
/// Every failure of `exec` triggers the refresh, whatever its cause. There is no
/// coordination between concurrent callers: two calls that fail at the same time
/// will each refresh on their own.
pub async fn execute_with_refresh<T, C, E, Exec, ExecFut, Refresh, RefreshFut, OnRefreshed>(
    mut exec: Exec,
    refresh: Refresh,
    on_refreshed: OnRefreshed,
) -> Result<T, E>
where
    E: Display,
    Exec: FnMut() -> ExecFut,
    ExecFut: Future<Output = Result<T, E>>,
    Refresh: FnOnce() -> RefreshFut,
    RefreshFut: Future<Output = Result<C, E>>,
    OnRefreshed: FnOnce(C),
{
    let err = match exec().await {
        Ok(result) => return Ok(result),
        Err(err) => err,
    };

    debug!("Authenticated call failed ({}), refreshing credentials", err);

    let credentials = refresh().await?;
    on_refreshed(credentials);

    debug!("Credentials refreshed, retrying call");
    exec().await
}
