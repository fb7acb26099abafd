//! Verification calls bound to the flow's session

use std::sync::Arc;

use kyc_backend::{
    RecordingUpload, UploadReceipt, VerificationBackend, VerificationResponse,
    FALLBACK_RECORDING_SESSION,
};
use kyc_core::config::RecordingConfig;
use kyc_core::{
    CapturedImage, ExtractedDetails, KycError, Result, ReviewDetails, SessionCell, SessionId,
};
use kyc_media::Recording;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Backend client that threads the set-once session into every call
///
/// Clones share the backend and the session cell, so a clone moved into a
/// spawned task adopts the session for everyone.
#[derive(Clone)]
pub struct Verifier {
    backend: Arc<dyn VerificationBackend>,
    session: SessionCell,
}

impl Verifier {
    pub fn new(backend: Arc<dyn VerificationBackend>) -> Self {
        Self {
            backend,
            session: SessionCell::new(),
        }
    }

    pub fn backend(&self) -> &Arc<dyn VerificationBackend> {
        &self.backend
    }

    pub fn session(&self) -> Option<SessionId> {
        self.session.get()
    }

    /// Submit an image and adopt the session id it returns, if none is set
    pub async fn submit(&self, image: &CapturedImage) -> Result<VerificationResponse> {
        let session = self.session.get();
        info!(
            "Submitting {} image (session: {:?})",
            image.kind,
            session.as_ref().map(SessionId::as_str)
        );

        let response = self.backend.submit_image(image, session.as_ref()).await?;

        if let Some(id) = response.session_id.as_deref().filter(|id| !id.is_empty()) {
            self.session.assign(SessionId::new(id));
        }
        debug!("{} response status: {:?}", image.kind, response.status);
        Ok(response)
    }

    /// Submit in the background without waiting for the answer
    pub fn spawn_submit(&self, image: CapturedImage) -> JoinHandle<Result<VerificationResponse>> {
        let verifier = self.clone();
        tokio::spawn(async move { verifier.submit(&image).await })
    }

    pub async fn fetch_details(&self) -> Result<ExtractedDetails> {
        let session = self
            .session
            .get()
            .ok_or_else(|| KycError::Flow("No session to fetch details for".to_string()))?;
        info!("Fetching details for session {}", session);
        self.backend.fetch_details(&session).await
    }

    pub async fn update_details(&self, review: &ReviewDetails) -> Result<()> {
        let session = self.session.get();
        info!("Pushing {} review fields", review.fields().len());
        self.backend.update_details(review, session.as_ref()).await
    }

    /// Upload the session recording under the current (or fallback) session
    pub async fn upload_recording(
        &self,
        recording: Recording,
        config: &RecordingConfig,
    ) -> Result<UploadReceipt> {
        let session_id = self
            .session
            .get()
            .map(|s| s.to_string())
            .unwrap_or_else(|| FALLBACK_RECORDING_SESSION.to_string());

        info!(
            "Uploading {} byte recording for session {}",
            recording.bytes.len(),
            session_id
        );

        self.backend
            .upload_recording(RecordingUpload {
                session_id,
                file_name: config.file_name.clone(),
                mime: recording.mime,
                recording_type: config.recording_type.clone(),
                bytes: recording.bytes,
            })
            .await
    }

    pub async fn upload_image(&self, image: &CapturedImage) -> Result<UploadReceipt> {
        let session = self
            .session
            .get()
            .ok_or_else(|| KycError::Flow("No session to attach the image to".to_string()))?;
        self.backend.upload_image(image, &session).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use kyc_backend::{BackendCall, MockBackend, MockReply};
    use kyc_core::DocumentKind;

    fn image(kind: DocumentKind) -> CapturedImage {
        CapturedImage::from_bytes(kind, "image/png", b"frame")
    }

    fn issued(id: &str) -> MockReply {
        MockReply::Ok(VerificationResponse {
            session_id: Some(id.to_string()),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_first_session_wins() {
        let backend = Arc::new(
            MockBackend::new()
                .with_reply(DocumentKind::Aadhaar, issued("s-1"))
                .with_reply(DocumentKind::Pan, issued("s-2")),
        );
        let verifier = Verifier::new(backend.clone());

        verifier.submit(&image(DocumentKind::Aadhaar)).await.unwrap();
        verifier.submit(&image(DocumentKind::Pan)).await.unwrap();

        assert_eq!(verifier.session(), Some(SessionId::new("s-1")));
        assert_eq!(
            backend.submissions(),
            vec![
                (DocumentKind::Aadhaar, None),
                (DocumentKind::Pan, Some(SessionId::new("s-1"))),
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_session_id_is_not_adopted() {
        let backend = Arc::new(MockBackend::new().with_reply(DocumentKind::Aadhaar, issued("")));
        let verifier = Verifier::new(backend);
        verifier.submit(&image(DocumentKind::Aadhaar)).await.unwrap();
        assert!(verifier.session().is_none());
    }

    #[tokio::test]
    async fn test_spawned_submission_assigns_shared_session() {
        let verifier = Verifier::new(Arc::new(MockBackend::new()));
        verifier
            .spawn_submit(image(DocumentKind::Aadhaar))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(verifier.session(), Some(SessionId::new("mock-session")));
    }

    #[tokio::test]
    async fn test_fetch_details_requires_session() {
        let verifier = Verifier::new(Arc::new(MockBackend::new()));
        assert!(matches!(
            verifier.fetch_details().await,
            Err(KycError::Flow(_))
        ));
    }

    #[tokio::test]
    async fn test_recording_upload_falls_back_to_fixed_session() {
        let backend = Arc::new(MockBackend::new());
        let verifier = Verifier::new(backend.clone());
        let now = Utc::now();
        let recording = Recording {
            mime: "video/webm".to_string(),
            bytes: vec![1, 2, 3],
            chunk_count: 1,
            started_at: now,
            stopped_at: now,
        };

        verifier
            .upload_recording(recording, &RecordingConfig::default())
            .await
            .unwrap();

        assert!(backend.calls().contains(&BackendCall::UploadRecording {
            session_id: FALLBACK_RECORDING_SESSION.to_string(),
            recording_type: "full_process".to_string(),
            bytes: 3,
        }));
    }
}
