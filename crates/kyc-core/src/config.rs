//! Configuration management for the KYC flow
//!
//! Settings cover the backend address, the two timed waits in the flow,
//! recording upload metadata, narration and the attestation wording.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{KycError, Result};

/// Flow configuration
///
/// Loaded from `.kyc/config.toml` in the working directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KycConfig {
    /// Verification backend connection
    #[serde(default)]
    pub backend: BackendConfig,

    /// Fixed waits in the flow
    #[serde(default)]
    pub timing: TimingConfig,

    /// Session recording upload metadata
    #[serde(default)]
    pub recording: RecordingConfig,

    /// Prompt narration
    #[serde(default)]
    pub narration: NarrationConfig,

    /// Legal attestation wording
    #[serde(default)]
    pub attestation: AttestationConfig,
}

/// Verification backend connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base address, without a trailing slash
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout; unset means requests are never timed out
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

/// Fixed waits in the flow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Pause after a successful face match, masking backend latency
    #[serde(default = "default_match_settle_ms")]
    pub match_settle_ms: u64,

    /// Time given to read the attestation aloud on camera
    #[serde(default = "default_recording_duration_ms")]
    pub recording_duration_ms: u64,
}

/// Session recording upload metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingConfig {
    /// Recorder container/codec request
    #[serde(default = "default_recording_mime")]
    pub mime_type: String,

    /// File name sent with the multipart upload
    #[serde(default = "default_recording_file_name")]
    pub file_name: String,

    /// `recording_type` form field
    #[serde(default = "default_recording_type")]
    pub recording_type: String,
}

/// Prompt narration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrationConfig {
    /// Use the backend voice before on-device synthesis
    #[serde(default = "default_true")]
    pub remote_tts: bool,
}

/// Legal attestation wording
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttestationConfig {
    /// Lender named in the attestation
    #[serde(default = "default_lender")]
    pub lender: String,
}

// Default value providers
fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_match_settle_ms() -> u64 {
    3000
}

fn default_recording_duration_ms() -> u64 {
    10_000
}

fn default_recording_mime() -> String {
    "video/webm; codecs=vp8,opus".to_string()
}

fn default_recording_file_name() -> String {
    "kyc_recording.webm".to_string()
}

fn default_recording_type() -> String {
    "full_process".to_string()
}

fn default_true() -> bool {
    true
}

fn default_lender() -> String {
    "HDFC".to_string()
}

impl KycConfig {
    /// Default location relative to a working directory
    pub fn default_path(root: &Path) -> PathBuf {
        root.join(".kyc/config.toml")
    }

    /// Load configuration from `path`, or defaults when the file is absent
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content)
                .map_err(|e| KycError::Config(format!("Failed to parse config file: {}", e)))
        } else {
            Ok(Self::default())
        }
    }

    /// Write the default configuration to `path`, creating parent directories
    pub fn write_default(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(&Self::default())
            .map_err(|e| KycError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

impl BackendConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

impl TimingConfig {
    pub fn match_settle(&self) -> Duration {
        Duration::from_millis(self.match_settle_ms)
    }

    pub fn recording_duration(&self) -> Duration {
        Duration::from_millis(self.recording_duration_ms)
    }

    /// No waits at all, for tests and dry runs
    pub fn immediate() -> Self {
        Self {
            match_settle_ms: 0,
            recording_duration_ms: 0,
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: None,
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            match_settle_ms: default_match_settle_ms(),
            recording_duration_ms: default_recording_duration_ms(),
        }
    }
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            mime_type: default_recording_mime(),
            file_name: default_recording_file_name(),
            recording_type: default_recording_type(),
        }
    }
}

impl Default for NarrationConfig {
    fn default() -> Self {
        Self {
            remote_tts: default_true(),
        }
    }
}

impl Default for AttestationConfig {
    fn default() -> Self {
        Self {
            lender: default_lender(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = KycConfig::default();
        assert_eq!(config.backend.base_url, "http://127.0.0.1:8000");
        assert!(config.backend.request_timeout().is_none());
        assert_eq!(config.timing.match_settle(), Duration::from_secs(3));
        assert_eq!(config.timing.recording_duration(), Duration::from_secs(10));
        assert_eq!(config.recording.recording_type, "full_process");
        assert!(config.narration.remote_tts);
        assert_eq!(config.attestation.lender, "HDFC");
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = KycConfig::load_or_default(&KycConfig::default_path(dir.path())).unwrap();
        assert_eq!(config, KycConfig::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[backend]\nbase_url = \"https://kyc.example.com\"\nrequest_timeout_secs = 20\n\n[timing]\nmatch_settle_ms = 0\n",
        )
        .unwrap();

        let config = KycConfig::load_or_default(&path).unwrap();
        assert_eq!(config.backend.base_url, "https://kyc.example.com");
        assert_eq!(config.backend.request_timeout(), Some(Duration::from_secs(20)));
        assert_eq!(config.timing.match_settle_ms, 0);
        assert_eq!(config.timing.recording_duration_ms, 10_000);
        assert_eq!(config.recording, RecordingConfig::default());
    }

    #[test]
    fn test_write_default_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = KycConfig::default_path(dir.path());
        KycConfig::write_default(&path).unwrap();

        assert!(path.exists());
        assert_eq!(KycConfig::load_or_default(&path).unwrap(), KycConfig::default());
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[timing]\nmatch_settle_ms = \"soon\"\n").unwrap();

        let err = KycConfig::load_or_default(&path).unwrap_err();
        assert!(matches!(err, KycError::Config(_)));
    }
}
