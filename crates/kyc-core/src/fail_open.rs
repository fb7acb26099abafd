//! Best-effort steps that must never stop the flow
//!
//! Narration, the review update and the final recording upload are
//! best-effort. Verification calls and detail retrieval are not, and must
//! propagate their errors instead.

use std::future::Future;
use tracing::warn;

use crate::Result;

/// Run `step`, logging and discarding its error
///
/// Returns `None` when the step failed.
///
/// ```no_run
/// use kyc_core::fail_open::fail_open;
/// use kyc_core::Result;
///
/// async fn upload_recording() -> Result<String> {
///     Ok("https://storage.example.com/kyc_recording.webm".to_string())
/// }
///
/// async fn finish() {
///     if let Some(url) = fail_open("recording_upload", upload_recording).await {
///         println!("stored at {}", url);
///     }
/// }
/// ```
pub async fn fail_open<F, Fut, T>(step: &str, f: F) -> Option<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    f().await
        .map_err(|e| warn!(step, "Best-effort step failed, continuing: {}", e))
        .ok()
}
