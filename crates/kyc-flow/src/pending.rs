//! In-flight document verifications awaited at the face-match gate

use futures::future::try_join_all;
use kyc_backend::VerificationResponse;
use kyc_core::{DocumentKind, KycError, Result};
use tokio::task::JoinHandle;
use tracing::debug;

/// Set of spawned document submissions
///
/// Joined with all-succeed/any-fail semantics: the first rejection (or
/// panicked task) fails the whole join.
#[derive(Debug, Default)]
pub struct PendingVerifications {
    entries: Vec<(DocumentKind, JoinHandle<Result<VerificationResponse>>)>,
}

impl PendingVerifications {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track(&mut self, kind: DocumentKind, handle: JoinHandle<Result<VerificationResponse>>) {
        debug!("Tracking pending {} verification", kind);
        self.entries.push((kind, handle));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Await every tracked verification, emptying the set
    pub async fn join_all(&mut self) -> Result<Vec<(DocumentKind, VerificationResponse)>> {
        let entries = std::mem::take(&mut self.entries);
        debug!("Joining {} pending verifications", entries.len());

        try_join_all(entries.into_iter().map(|(kind, handle)| async move {
            let response = handle.await.map_err(|e| {
                KycError::Other(format!("{} verification task failed: {}", kind, e))
            })??;
            Ok::<_, KycError>((kind, response))
        }))
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn ok_after(ms: u64, status: &str) -> JoinHandle<Result<VerificationResponse>> {
        let status = status.to_string();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            Ok(VerificationResponse {
                status: Some(status),
                ..Default::default()
            })
        })
    }

    #[tokio::test]
    async fn test_join_all_waits_for_every_entry() {
        let mut pending = PendingVerifications::new();
        pending.track(DocumentKind::Aadhaar, ok_after(30, "aadhaar_processed"));
        pending.track(DocumentKind::Pan, ok_after(0, "pan_processed"));
        assert_eq!(pending.len(), 2);

        let settled = pending.join_all().await.unwrap();
        assert_eq!(settled.len(), 2);
        assert_eq!(settled[0].0, DocumentKind::Aadhaar);
        assert_eq!(settled[0].1.status.as_deref(), Some("aadhaar_processed"));
        assert!(pending.is_empty());
    }

    #[tokio::test]
    async fn test_any_failure_fails_the_join() {
        let mut pending = PendingVerifications::new();
        pending.track(DocumentKind::Aadhaar, ok_after(0, "aadhaar_processed"));
        pending.track(
            DocumentKind::Pan,
            tokio::spawn(async {
                Err(KycError::Verification {
                    endpoint: "/kyc/process-pan".to_string(),
                    status: 422,
                    message: "Unreadable PAN".to_string(),
                    body: None,
                })
            }),
        );

        let err = pending.join_all().await.unwrap_err();
        assert!(err.is_verification_failure());
    }

    #[tokio::test]
    async fn test_empty_set_joins_immediately() {
        let mut pending = PendingVerifications::new();
        assert!(pending.join_all().await.unwrap().is_empty());
    }
}
