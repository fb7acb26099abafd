//! Wire types for the verification backend

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use kyc_core::{ExtractedDetails, KycError, Result, SpeechAudio};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Session id sent with a recording when the backend never issued one
pub const FALLBACK_RECORDING_SESSION: &str = "kyc-session";

/// `POST /cartesia/tts` request
#[derive(Debug, Clone, Serialize)]
pub struct TtsRequest<'a> {
    pub text: &'a str,
}

/// `POST /cartesia/tts` response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TtsResponse {
    #[serde(default)]
    pub audio_url: Option<String>,
    #[serde(default)]
    pub audio_b64: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl TtsResponse {
    /// Playable audio, preferring a hosted URL over inline bytes
    ///
    /// A response without either is a failure so the caller can fall back
    /// to on-device synthesis.
    pub fn into_audio(self) -> Result<SpeechAudio> {
        if let Some(url) = self.audio_url.filter(|url| !url.is_empty()) {
            return Ok(SpeechAudio::Url(url));
        }

        if let Some(b64) = self.audio_b64.filter(|b64| !b64.is_empty()) {
            let bytes = STANDARD
                .decode(b64.as_bytes())
                .map_err(|e| KycError::Speech(format!("Invalid audio payload: {}", e)))?;
            return Ok(SpeechAudio::Wav(bytes));
        }

        Err(KycError::Speech(
            self.error
                .unwrap_or_else(|| "Voice service returned no audio".to_string()),
        ))
    }
}

/// Response to an Aadhaar, PAN or face submission
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerificationResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub face_match: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<serde_json::Value>,
    /// Extracted fields and anything else the backend adds
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Result of the face-match gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FaceOutcome {
    Match,
    Mismatch { reason: String },
}

impl VerificationResponse {
    /// Error message when the `error` field is present and truthy
    pub fn error_message(&self) -> Option<String> {
        match self.error.as_ref()? {
            serde_json::Value::Null | serde_json::Value::Bool(false) => None,
            serde_json::Value::String(s) if s.is_empty() => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Interpret this response as a face-match verdict
    ///
    /// An explicit `face_match: false`, any error, or a `face_failed` status
    /// is a mismatch. A missing `face_match` flag alone is not.
    pub fn face_outcome(&self) -> FaceOutcome {
        if self.face_match == Some(false) {
            return FaceOutcome::Mismatch {
                reason: "face_match=false".to_string(),
            };
        }
        if let Some(message) = self.error_message() {
            return FaceOutcome::Mismatch { reason: message };
        }
        if self.status.as_deref() == Some("face_failed") {
            return FaceOutcome::Mismatch {
                reason: "status=face_failed".to_string(),
            };
        }
        FaceOutcome::Match
    }
}

/// `GET /kyc/get-details/{session_id}` response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DetailsResponse {
    #[serde(default)]
    pub details: Option<BTreeMap<String, serde_json::Value>>,
}

impl DetailsResponse {
    /// Flatten JSON values to strings, dropping nulls
    pub fn into_details(self) -> ExtractedDetails {
        self.details
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(key, value)| match value {
                serde_json::Value::Null => None,
                serde_json::Value::String(s) => Some((key, s)),
                other => Some((key, other.to_string())),
            })
            .collect()
    }
}

/// Response of the multipart upload endpoints
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UploadReceipt {
    #[serde(default)]
    pub url: Option<String>,
}

/// A finished session recording ready for `POST /upload/recording`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingUpload {
    pub session_id: String,
    pub file_name: String,
    pub mime: String,
    pub recording_type: String,
    pub bytes: Vec<u8>,
}
