//! Media devices backed by files on disk
//!
//! A capture directory stands in for the camera. Frames are read from
//! `aadhaar.*`, `pan.*` and `face.*`. An optional `recording.webm` is
//! returned as the session recording. Marker files deny a permission:
//! `deny-camera`, `deny-display`, `deny-microphone`.

use async_trait::async_trait;
use kyc_core::{CapturedImage, DocumentKind, KycError, Result};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

use crate::devices::MediaDevices;
use crate::stream::{MediaStream, MediaTrack, TrackKind};

const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "webp"];
const RECORDING_FILE: &str = "recording.webm";

/// File-backed media devices
pub struct FileMediaDevices {
    root: PathBuf,
    recording_taken: AtomicBool,
}

impl FileMediaDevices {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            recording_taken: AtomicBool::new(false),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// First existing image file for `kind`
    pub fn frame_path(&self, kind: DocumentKind) -> Option<PathBuf> {
        IMAGE_EXTENSIONS
            .iter()
            .map(|ext| self.root.join(format!("{}.{}", kind, ext)))
            .find(|path| path.is_file())
    }

    fn check_permission(&self, device: &str) -> Result<()> {
        if !self.root.is_dir() {
            return Err(KycError::PermissionDenied(format!(
                "{} unavailable: capture directory {:?} does not exist",
                device, self.root
            )));
        }
        if self.root.join(format!("deny-{}", device)).exists() {
            return Err(KycError::PermissionDenied(format!(
                "{} access denied",
                device
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl MediaDevices for FileMediaDevices {
    async fn request_microphone(&self) -> Result<MediaStream> {
        self.check_permission("microphone")?;
        Ok(MediaStream::new(vec![MediaTrack::new(
            TrackKind::Audio,
            "file microphone",
        )]))
    }

    async fn request_display(&self) -> Result<MediaStream> {
        self.check_permission("display")?;
        Ok(MediaStream::new(vec![
            MediaTrack::new(TrackKind::Video, "file screen"),
            MediaTrack::new(TrackKind::Audio, "file system audio"),
        ]))
    }

    async fn request_camera(&self) -> Result<MediaStream> {
        self.check_permission("camera")?;
        Ok(MediaStream::new(vec![
            MediaTrack::new(TrackKind::Video, "file camera"),
            MediaTrack::new(TrackKind::Audio, "file microphone"),
        ]))
    }

    async fn grab_frame(
        &self,
        stream: &MediaStream,
        subject: DocumentKind,
    ) -> Result<CapturedImage> {
        if !stream.is_active() {
            return Err(KycError::Media("Camera stream has been stopped".to_string()));
        }

        let path = self.frame_path(subject).ok_or_else(|| {
            KycError::Media(format!("No {} image found in {:?}", subject, self.root))
        })?;
        let bytes = tokio::fs::read(&path).await?;
        let mime = mime_guess::from_path(&path).first_or_octet_stream();

        info!("Captured {} from {:?} ({} bytes)", subject, path, bytes.len());
        Ok(CapturedImage::from_bytes(subject, mime.essence_str(), &bytes))
    }

    async fn take_chunks(&self, _stream: &MediaStream) -> Result<Vec<Vec<u8>>> {
        let path = self.root.join(RECORDING_FILE);
        if !path.is_file() || self.recording_taken.swap(true, Ordering::SeqCst) {
            return Ok(Vec::new());
        }

        let bytes = tokio::fs::read(&path).await?;
        debug!("Recording source {:?} ({} bytes)", path, bytes.len());
        Ok(vec![bytes])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_directory_denies_permissions() {
        let devices = FileMediaDevices::new("/definitely/not/here");
        let err = devices.request_camera().await.unwrap_err();
        assert!(matches!(err, KycError::PermissionDenied(_)));
    }

    #[tokio::test]
    async fn test_marker_file_denies_one_device() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("deny-camera"), "").unwrap();
        let devices = FileMediaDevices::new(dir.path());

        assert!(devices.request_microphone().await.is_ok());
        assert!(matches!(
            devices.request_camera().await,
            Err(KycError::PermissionDenied(_))
        ));
    }

    #[tokio::test]
    async fn test_grab_frame_reads_image_with_mime() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("pan.jpg"), b"jpeg-bytes").unwrap();
        let devices = FileMediaDevices::new(dir.path());
        let camera = devices.request_camera().await.unwrap();

        let image = devices.grab_frame(&camera, DocumentKind::Pan).await.unwrap();
        assert_eq!(image.kind, DocumentKind::Pan);
        assert_eq!(image.mime(), "image/jpeg");
        assert_eq!(image.decode().unwrap(), b"jpeg-bytes");

        assert!(devices.grab_frame(&camera, DocumentKind::Face).await.is_err());
    }

    #[tokio::test]
    async fn test_recording_file_is_returned_once() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(RECORDING_FILE), b"webm").unwrap();
        let devices = FileMediaDevices::new(dir.path());
        let stream = devices.request_display().await.unwrap();

        assert_eq!(devices.take_chunks(&stream).await.unwrap(), vec![b"webm".to_vec()]);
        assert!(devices.take_chunks(&stream).await.unwrap().is_empty());
    }
}
