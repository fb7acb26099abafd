//! Scripted media devices for tests

use async_trait::async_trait;
use kyc_core::{CapturedImage, DocumentKind, KycError, Result};
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::devices::MediaDevices;
use crate::stream::{MediaStream, MediaTrack, TrackKind};

/// A device request observed by the mock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaRequest {
    Microphone,
    Display,
    Camera,
}

/// Mock media devices
///
/// Every frame grab returns a distinct PNG-labelled payload
/// (`<kind>-frame-<n>`) so re-captures can be told apart.
#[derive(Default)]
pub struct MockMediaDevices {
    denied: HashSet<MediaRequest>,
    requests: Mutex<Vec<MediaRequest>>,
    chunks: Mutex<VecDeque<Vec<u8>>>,
    frames: AtomicUsize,
    grabs: Mutex<Vec<DocumentKind>>,
}

impl MockMediaDevices {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse every request for `request`
    pub fn deny(mut self, request: MediaRequest) -> Self {
        self.denied.insert(request);
        self
    }

    /// Queue a recorder chunk
    pub fn push_chunk(&self, chunk: Vec<u8>) {
        if let Ok(mut chunks) = self.chunks.lock() {
            chunks.push_back(chunk);
        }
    }

    pub fn requests(&self) -> Vec<MediaRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Subjects of every frame grab, oldest first
    pub fn grabs(&self) -> Vec<DocumentKind> {
        self.grabs.lock().map(|g| g.clone()).unwrap_or_default()
    }

    fn request(&self, request: MediaRequest, tracks: Vec<MediaTrack>) -> Result<MediaStream> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }
        if self.denied.contains(&request) {
            return Err(KycError::PermissionDenied(format!("{:?} denied", request)));
        }
        Ok(MediaStream::new(tracks))
    }
}

#[async_trait]
impl MediaDevices for MockMediaDevices {
    async fn request_microphone(&self) -> Result<MediaStream> {
        self.request(
            MediaRequest::Microphone,
            vec![MediaTrack::new(TrackKind::Audio, "mock microphone")],
        )
    }

    async fn request_display(&self) -> Result<MediaStream> {
        self.request(
            MediaRequest::Display,
            vec![
                MediaTrack::new(TrackKind::Video, "mock screen"),
                MediaTrack::new(TrackKind::Audio, "mock system audio"),
            ],
        )
    }

    async fn request_camera(&self) -> Result<MediaStream> {
        self.request(
            MediaRequest::Camera,
            vec![
                MediaTrack::new(TrackKind::Video, "mock camera"),
                MediaTrack::new(TrackKind::Audio, "mock microphone"),
            ],
        )
    }

    async fn grab_frame(
        &self,
        stream: &MediaStream,
        subject: DocumentKind,
    ) -> Result<CapturedImage> {
        if !stream.is_active() {
            return Err(KycError::Media("Camera stream has been stopped".to_string()));
        }
        if let Ok(mut grabs) = self.grabs.lock() {
            grabs.push(subject);
        }
        let n = self.frames.fetch_add(1, Ordering::SeqCst) + 1;
        let payload = format!("{}-frame-{}", subject, n);
        Ok(CapturedImage::from_bytes(subject, "image/png", payload.as_bytes()))
    }

    async fn take_chunks(&self, _stream: &MediaStream) -> Result<Vec<Vec<u8>>> {
        Ok(self
            .chunks
            .lock()
            .map(|mut chunks| chunks.drain(..).collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_frames_are_distinct() {
        let devices = MockMediaDevices::new();
        let camera = devices.request_camera().await.unwrap();

        let first = devices.grab_frame(&camera, DocumentKind::Aadhaar).await.unwrap();
        let second = devices.grab_frame(&camera, DocumentKind::Aadhaar).await.unwrap();
        assert_ne!(first, second);
        assert_eq!(devices.grabs(), vec![DocumentKind::Aadhaar, DocumentKind::Aadhaar]);
    }

    #[tokio::test]
    async fn test_denied_request_is_recorded() {
        let devices = MockMediaDevices::new().deny(MediaRequest::Camera);
        assert!(devices.request_camera().await.is_err());
        assert_eq!(devices.requests(), vec![MediaRequest::Camera]);
    }

    #[tokio::test]
    async fn test_stopped_camera_cannot_capture() {
        let devices = MockMediaDevices::new();
        let camera = devices.request_camera().await.unwrap();
        camera.stop();
        assert!(devices.grab_frame(&camera, DocumentKind::Face).await.is_err());
    }
}
