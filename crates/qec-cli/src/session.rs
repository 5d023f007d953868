//! Running work inside a runtime session.

use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::warn;

use qec_hal::SessionBackend;

/// Open a session on `backend`, run `body` with its id, then close it.
///
/// The session is closed whether `body` succeeds or fails. A failure to
/// close is logged and does not replace the outcome of `body`.
pub async fn in_session<B, T, F, Fut>(backend: &B, max_ttl: Duration, body: F) -> Result<T>
where
    B: SessionBackend + ?Sized,
    F: FnOnce(String) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let session_id = backend
        .open_session(max_ttl)
        .await
        .context("Failed to open a runtime session")?;

    let outcome = body(session_id).await;

    if let Err(e) = backend.close_session().await {
        warn!(error = %e, "failed to close runtime session");
    }
    outcome
}
