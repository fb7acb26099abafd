//! Platform media capabilities

use async_trait::async_trait;
use kyc_core::{CapturedImage, DocumentKind, Result};

use crate::stream::MediaStream;

/// Trait for the platform's media devices (allows mocking in tests)
///
/// Each `request_*` call may prompt the user. A refusal is reported as
/// [`kyc_core::KycError::PermissionDenied`].
#[async_trait]
pub trait MediaDevices: Send + Sync {
    /// Microphone audio
    async fn request_microphone(&self) -> Result<MediaStream>;

    /// Screen video with system audio
    async fn request_display(&self) -> Result<MediaStream>;

    /// Camera video with microphone audio
    async fn request_camera(&self) -> Result<MediaStream>;

    /// Snapshot the current camera frame, encoded as an image
    async fn grab_frame(&self, stream: &MediaStream, subject: DocumentKind)
        -> Result<CapturedImage>;

    /// Encoded recorder chunks produced for `stream` since the last call
    async fn take_chunks(&self, stream: &MediaStream) -> Result<Vec<Vec<u8>>>;
}
