use url::Url;

use crate::error::{Error, ErrorKind, HttpErrorKind};

/// Resolve an API path against `base`, keeping any path prefix the base carries.
///
/// `Url::join` treats a leading `/` as absolute and would drop a prefix such as
/// `/api/v1`, so the base is treated as a directory and `path` as relative to it.
pub fn resolve(base: &Url, path: &str) -> Result<Url, Error> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let directory = format!("{}/", base.path());
        base.set_path(&directory);
    }

    base.join(path.trim_start_matches('/')).map_err(|e| Error {
        source: Some(Box::new(e)),
        error_kind: ErrorKind::Http(HttpErrorKind::BuilderFailed),
    })
}
