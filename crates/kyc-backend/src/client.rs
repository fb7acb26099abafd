//! HTTP client for the verification backend
//!
//! Every call is a single attempt. Failures are returned to the caller,
//! which decides whether the flow can continue.

use async_trait::async_trait;
use kyc_core::config::BackendConfig;
use kyc_core::{
    CapturedImage, ExtractedDetails, KycError, Result, ReviewDetails, SessionId, SpeechAudio,
};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use tracing::{debug, info, instrument, warn};

use crate::types::{
    DetailsResponse, RecordingUpload, TtsRequest, TtsResponse, UploadReceipt,
    VerificationResponse,
};

const TTS_ENDPOINT: &str = "/cartesia/tts";
const DETAILS_ENDPOINT: &str = "/kyc/get-details";
const UPDATE_ENDPOINT: &str = "/kyc/update";
const RECORDING_ENDPOINT: &str = "/upload/recording";
const IMAGE_ENDPOINT: &str = "/upload/image";

/// Trait for talking to the verification backend (allows mocking in tests)
#[async_trait]
pub trait VerificationBackend: Send + Sync {
    /// Synthesize `text` with the remote voice
    async fn synthesize(&self, text: &str) -> Result<SpeechAudio>;

    /// Submit a captured Aadhaar, PAN or face image
    async fn submit_image(
        &self,
        image: &CapturedImage,
        session: Option<&SessionId>,
    ) -> Result<VerificationResponse>;

    /// Fetch the consolidated fields extracted for a session
    async fn fetch_details(&self, session: &SessionId) -> Result<ExtractedDetails>;

    /// Persist the user's reviewed fields
    async fn update_details(
        &self,
        review: &ReviewDetails,
        session: Option<&SessionId>,
    ) -> Result<()>;

    /// Upload the full-session recording
    async fn upload_recording(&self, upload: RecordingUpload) -> Result<UploadReceipt>;

    /// Upload a single document image to storage
    async fn upload_image(
        &self,
        image: &CapturedImage,
        session: &SessionId,
    ) -> Result<UploadReceipt>;
}

/// reqwest-backed verification backend
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    /// Create a client for `config.base_url`
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| KycError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_json(
        &self,
        endpoint: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value> {
        let response = self
            .client
            .post(self.url(endpoint))
            .json(body)
            .send()
            .await
            .map_err(|e| network_error(endpoint, e))?;

        read_json(endpoint, response).await
    }
}

fn network_error(endpoint: &str, err: reqwest::Error) -> KycError {
    KycError::Network {
        endpoint: endpoint.to_string(),
        message: err.to_string(),
    }
}

/// Read a JSON body, converting non-success statuses into verification errors
async fn read_json(endpoint: &str, response: Response) -> Result<serde_json::Value> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| network_error(endpoint, e))?;
    let body: Option<serde_json::Value> = serde_json::from_str(&text).ok();

    if !status.is_success() {
        let message = body
            .as_ref()
            .and_then(|b| b.get("error"))
            .and_then(|e| e.as_str())
            .unwrap_or("Request failed")
            .to_string();
        warn!("{} returned {}: {}", endpoint, status, message);
        return Err(KycError::Verification {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            message,
            body,
        });
    }

    match body {
        Some(value) => Ok(value),
        None => Err(KycError::Verification {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            message: "Response was not valid JSON".to_string(),
            body: None,
        }),
    }
}

/// Build the submission body: `{"<kind>_image": ..., "session_id": ...}`
pub(crate) fn submission_body(
    image: &CapturedImage,
    session: Option<&SessionId>,
) -> serde_json::Value {
    let mut body = serde_json::Map::new();
    body.insert(
        image.kind.image_field().to_string(),
        serde_json::Value::String(image.data_url().to_string()),
    );
    if let Some(session) = session {
        body.insert(
            "session_id".to_string(),
            serde_json::Value::String(session.to_string()),
        );
    }
    serde_json::Value::Object(body)
}

/// Build the update body: every review label plus `session_id`
pub(crate) fn update_body(review: &ReviewDetails, session: Option<&SessionId>) -> serde_json::Value {
    let mut body = review.to_json_map();
    body.insert(
        "session_id".to_string(),
        session
            .map(|s| serde_json::Value::String(s.to_string()))
            .unwrap_or(serde_json::Value::Null),
    );
    serde_json::Value::Object(body)
}

#[async_trait]
impl VerificationBackend for HttpBackend {
    #[instrument(skip(self, text), fields(chars = text.len()))]
    async fn synthesize(&self, text: &str) -> Result<SpeechAudio> {
        let body = serde_json::to_value(TtsRequest { text })?;
        let value = self.post_json(TTS_ENDPOINT, &body).await?;
        let response: TtsResponse = serde_json::from_value(value)?;
        response.into_audio()
    }

    #[instrument(skip(self, image, session), fields(kind = %image.kind))]
    async fn submit_image(
        &self,
        image: &CapturedImage,
        session: Option<&SessionId>,
    ) -> Result<VerificationResponse> {
        let endpoint = image.kind.endpoint();
        debug!(
            "Submitting {} image ({} bytes encoded, session: {:?})",
            image.kind,
            image.encoded_len(),
            session.map(SessionId::as_str)
        );

        let value = self
            .post_json(endpoint, &submission_body(image, session))
            .await?;
        let response: VerificationResponse = serde_json::from_value(value)?;

        info!(
            "{} verification returned status {:?}",
            image.kind, response.status
        );
        Ok(response)
    }

    #[instrument(skip(self, session), fields(session = %session))]
    async fn fetch_details(&self, session: &SessionId) -> Result<ExtractedDetails> {
        let endpoint = format!("{}/{}", DETAILS_ENDPOINT, session);
        let response = self
            .client
            .get(self.url(&endpoint))
            .send()
            .await
            .map_err(|e| network_error(&endpoint, e))?;

        let value = read_json(&endpoint, response).await?;
        let details = serde_json::from_value::<DetailsResponse>(value)?.into_details();
        info!("Fetched {} extracted fields", details.len());
        Ok(details)
    }

    #[instrument(skip(self, review, session))]
    async fn update_details(
        &self,
        review: &ReviewDetails,
        session: Option<&SessionId>,
    ) -> Result<()> {
        self.post_json(UPDATE_ENDPOINT, &update_body(review, session))
            .await?;
        info!("Review details pushed");
        Ok(())
    }

    #[instrument(skip(self, upload), fields(session = %upload.session_id, bytes = upload.bytes.len()))]
    async fn upload_recording(&self, upload: RecordingUpload) -> Result<UploadReceipt> {
        let file = Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(&upload.mime)
            .map_err(|e| KycError::Other(format!("Invalid recording MIME type: {}", e)))?;

        let form = Form::new()
            .text("session_id", upload.session_id)
            .part("file", file)
            .text("recording_type", upload.recording_type);

        let response = self
            .client
            .post(self.url(RECORDING_ENDPOINT))
            .multipart(form)
            .send()
            .await
            .map_err(|e| network_error(RECORDING_ENDPOINT, e))?;

        let receipt: UploadReceipt =
            serde_json::from_value(read_json(RECORDING_ENDPOINT, response).await?)?;
        info!("Recording uploaded: {:?}", receipt.url);
        Ok(receipt)
    }

    #[instrument(skip(self, image, session), fields(kind = %image.kind, session = %session))]
    async fn upload_image(
        &self,
        image: &CapturedImage,
        session: &SessionId,
    ) -> Result<UploadReceipt> {
        let extension = image.mime().rsplit('/').next().unwrap_or("png").to_string();
        let file = Part::bytes(image.decode()?)
            .file_name(format!("{}.{}", image.kind, extension))
            .mime_str(image.mime())
            .map_err(|e| KycError::Other(format!("Invalid image MIME type: {}", e)))?;

        let form = Form::new()
            .text("session_id", session.to_string())
            .text("doc_type", image.kind.to_string())
            .part("file", file);

        let response = self
            .client
            .post(self.url(IMAGE_ENDPOINT))
            .multipart(form)
            .send()
            .await
            .map_err(|e| network_error(IMAGE_ENDPOINT, e))?;

        let receipt: UploadReceipt =
            serde_json::from_value(read_json(IMAGE_ENDPOINT, response).await?)?;
        info!("{} image uploaded: {:?}", image.kind, receipt.url);
        Ok(receipt)
    }
}
