//! Scripted in-memory backend for tests and offline runs

use async_trait::async_trait;
use kyc_core::{
    CapturedImage, DocumentKind, ExtractedDetails, KycError, Result, ReviewDetails, SessionId,
    SpeechAudio,
};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::client::VerificationBackend;
use crate::types::{RecordingUpload, UploadReceipt, VerificationResponse};

/// Session id the mock issues when a submission arrives without one
pub const MOCK_SESSION: &str = "mock-session";

/// Scripted reply to a document submission
#[derive(Debug, Clone)]
pub enum MockReply {
    /// 2xx with this body
    Ok(VerificationResponse),
    /// Non-success status with an optional JSON body
    Fail {
        status: u16,
        body: Option<serde_json::Value>,
    },
}

/// A call observed by the mock, in arrival order
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    Synthesize {
        text: String,
    },
    Submit {
        kind: DocumentKind,
        session: Option<SessionId>,
        image: CapturedImage,
    },
    FetchDetails {
        session: SessionId,
        /// Document submissions that had finished when details were requested
        settled_submissions: usize,
    },
    Update {
        session: Option<SessionId>,
        review: ReviewDetails,
    },
    UploadRecording {
        session_id: String,
        recording_type: String,
        bytes: usize,
    },
    UploadImage {
        kind: DocumentKind,
        session: SessionId,
    },
}

/// Mock verification backend
///
/// Unscripted submissions succeed, issuing [`MOCK_SESSION`] and a matching
/// face. Every call is recorded for later inspection.
#[derive(Default)]
pub struct MockBackend {
    replies: Mutex<HashMap<DocumentKind, VecDeque<MockReply>>>,
    delays: HashMap<DocumentKind, Duration>,
    details: ExtractedDetails,
    details_status: Option<u16>,
    speech: Option<SpeechAudio>,
    fail_update: bool,
    fail_upload: bool,
    settled: AtomicUsize,
    calls: Mutex<Vec<BackendCall>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for the next submission of `kind`
    pub fn with_reply(self, kind: DocumentKind, reply: MockReply) -> Self {
        if let Ok(mut replies) = self.replies.lock() {
            replies.entry(kind).or_default().push_back(reply);
        }
        self
    }

    /// Queue a face verdict
    pub fn with_face_match(self, matched: bool) -> Self {
        self.with_reply(
            DocumentKind::Face,
            MockReply::Ok(VerificationResponse {
                status: Some("face_processed".to_string()),
                face_match: Some(matched),
                ..Default::default()
            }),
        )
    }

    /// Delay every submission of `kind` by `delay`
    pub fn with_delay(mut self, kind: DocumentKind, delay: Duration) -> Self {
        self.delays.insert(kind, delay);
        self
    }

    pub fn with_details(mut self, details: ExtractedDetails) -> Self {
        self.details = details;
        self
    }

    /// Make the details endpoint answer with `status`
    pub fn with_details_failure(mut self, status: u16) -> Self {
        self.details_status = Some(status);
        self
    }

    /// Audio the voice endpoint returns; without it synthesis fails
    pub fn with_speech(mut self, audio: SpeechAudio) -> Self {
        self.speech = Some(audio);
        self
    }

    pub fn with_failing_update(mut self) -> Self {
        self.fail_update = true;
        self
    }

    pub fn with_failing_upload(mut self) -> Self {
        self.fail_upload = true;
        self
    }

    /// Every call received so far
    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Submissions received so far, as `(kind, session)` pairs
    pub fn submissions(&self) -> Vec<(DocumentKind, Option<SessionId>)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                BackendCall::Submit { kind, session, .. } => Some((kind, session)),
                _ => None,
            })
            .collect()
    }

    /// Images received for `kind`, oldest first
    pub fn submitted_images(&self, kind: DocumentKind) -> Vec<CapturedImage> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                BackendCall::Submit { kind: k, image, .. } if k == kind => Some(image),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: BackendCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    fn next_reply(&self, kind: DocumentKind) -> Option<MockReply> {
        self.replies
            .lock()
            .ok()
            .and_then(|mut replies| replies.get_mut(&kind).and_then(VecDeque::pop_front))
    }
}

fn default_reply(kind: DocumentKind, session: Option<&SessionId>) -> VerificationResponse {
    VerificationResponse {
        session_id: Some(
            session
                .map(|s| s.to_string())
                .unwrap_or_else(|| MOCK_SESSION.to_string()),
        ),
        status: Some(format!("{}_processed", kind)),
        face_match: (kind == DocumentKind::Face).then_some(true),
        ..Default::default()
    }
}

#[async_trait]
impl VerificationBackend for MockBackend {
    async fn synthesize(&self, text: &str) -> Result<SpeechAudio> {
        self.record(BackendCall::Synthesize {
            text: text.to_string(),
        });
        self.speech
            .clone()
            .ok_or_else(|| KycError::Speech("Voice service returned no audio".to_string()))
    }

    async fn submit_image(
        &self,
        image: &CapturedImage,
        session: Option<&SessionId>,
    ) -> Result<VerificationResponse> {
        self.record(BackendCall::Submit {
            kind: image.kind,
            session: session.cloned(),
            image: image.clone(),
        });

        let reply = self.next_reply(image.kind);
        if let Some(delay) = self.delays.get(&image.kind) {
            tokio::time::sleep(*delay).await;
        }
        if image.kind != DocumentKind::Face {
            self.settled.fetch_add(1, Ordering::SeqCst);
        }

        match reply {
            Some(MockReply::Ok(response)) => Ok(response),
            Some(MockReply::Fail { status, body }) => Err(KycError::Verification {
                endpoint: image.kind.endpoint().to_string(),
                status,
                message: body
                    .as_ref()
                    .and_then(|b| b.get("error"))
                    .and_then(|e| e.as_str())
                    .unwrap_or("Request failed")
                    .to_string(),
                body,
            }),
            None => Ok(default_reply(image.kind, session)),
        }
    }

    async fn fetch_details(&self, session: &SessionId) -> Result<ExtractedDetails> {
        self.record(BackendCall::FetchDetails {
            session: session.clone(),
            settled_submissions: self.settled.load(Ordering::SeqCst),
        });

        match self.details_status {
            Some(status) => Err(KycError::Verification {
                endpoint: format!("/kyc/get-details/{}", session),
                status,
                message: "Request failed".to_string(),
                body: Some(serde_json::json!({ "details": {} })),
            }),
            None => Ok(self.details.clone()),
        }
    }

    async fn update_details(
        &self,
        review: &ReviewDetails,
        session: Option<&SessionId>,
    ) -> Result<()> {
        self.record(BackendCall::Update {
            session: session.cloned(),
            review: review.clone(),
        });

        if self.fail_update {
            return Err(KycError::Network {
                endpoint: "/kyc/update".to_string(),
                message: "connection reset".to_string(),
            });
        }
        Ok(())
    }

    async fn upload_recording(&self, upload: RecordingUpload) -> Result<UploadReceipt> {
        self.record(BackendCall::UploadRecording {
            session_id: upload.session_id.clone(),
            recording_type: upload.recording_type.clone(),
            bytes: upload.bytes.len(),
        });

        if self.fail_upload {
            return Err(KycError::Network {
                endpoint: "/upload/recording".to_string(),
                message: "connection reset".to_string(),
            });
        }
        Ok(UploadReceipt {
            url: Some(format!("mock://kyc_recording/{}", upload.file_name)),
        })
    }

    async fn upload_image(
        &self,
        image: &CapturedImage,
        session: &SessionId,
    ) -> Result<UploadReceipt> {
        self.record(BackendCall::UploadImage {
            kind: image.kind,
            session: session.clone(),
        });
        Ok(UploadReceipt {
            url: Some(format!("mock://kyc_document/{}", image.kind)),
        })
    }
}
