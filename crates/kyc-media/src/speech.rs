//! Speech output: on-device synthesis and remote-audio playback

use async_trait::async_trait;
use kyc_core::{KycError, Result, SpeechAudio};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tracing::{debug, info};

/// On-device text-to-speech
#[async_trait]
pub trait SpeechSynth: Send + Sync {
    async fn speak(&self, text: &str) -> Result<()>;
}

/// Playback of audio produced by the remote voice service
#[async_trait]
pub trait AudioSink: Send + Sync {
    async fn play(&self, audio: &SpeechAudio) -> Result<()>;
}

/// Audio sink that writes inline WAV audio into a spool directory
///
/// Files are numbered in playback order (`0001.wav`, `0002.wav`, ...).
/// Hosted audio is only logged.
pub struct SpoolAudioSink {
    dir: PathBuf,
    counter: AtomicUsize,
}

impl SpoolAudioSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            counter: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl AudioSink for SpoolAudioSink {
    async fn play(&self, audio: &SpeechAudio) -> Result<()> {
        match audio {
            SpeechAudio::Url(url) => {
                info!("Playing hosted narration: {}", url);
                Ok(())
            }
            SpeechAudio::Wav(bytes) => {
                tokio::fs::create_dir_all(&self.dir).await?;
                let index = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
                let path = self.dir.join(format!("{:04}.wav", index));
                tokio::fs::write(&path, bytes).await?;
                debug!("Narration audio written to {:?} ({} bytes)", path, bytes.len());
                Ok(())
            }
        }
    }
}

/// Speech synth that records what it was asked to say
#[derive(Default)]
pub struct RecordingSpeech {
    spoken: Mutex<Vec<String>>,
    fail: bool,
}

impl RecordingSpeech {
    pub fn new() -> Self {
        Self::default()
    }

    /// A synth whose every call fails
    pub fn failing() -> Self {
        Self {
            spoken: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl SpeechSynth for RecordingSpeech {
    async fn speak(&self, text: &str) -> Result<()> {
        if self.fail {
            return Err(KycError::Speech("No on-device voice available".to_string()));
        }
        if let Ok(mut spoken) = self.spoken.lock() {
            spoken.push(text.to_string());
        }
        Ok(())
    }
}

/// Audio sink that records what it played
#[derive(Default)]
pub struct RecordingAudioSink {
    played: Mutex<Vec<SpeechAudio>>,
    fail: bool,
}

impl RecordingAudioSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose every call fails
    pub fn failing() -> Self {
        Self {
            played: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn played(&self) -> Vec<SpeechAudio> {
        self.played.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl AudioSink for RecordingAudioSink {
    async fn play(&self, audio: &SpeechAudio) -> Result<()> {
        if self.fail {
            return Err(KycError::Speech("Audio output unavailable".to_string()));
        }
        if let Ok(mut played) = self.played.lock() {
            played.push(audio.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_spool_writes_numbered_wav_files() {
        let dir = TempDir::new().unwrap();
        let sink = SpoolAudioSink::new(dir.path().join("voice"));

        sink.play(&SpeechAudio::Wav(b"RIFF1".to_vec())).await.unwrap();
        sink.play(&SpeechAudio::Url("https://cdn/a.wav".to_string()))
            .await
            .unwrap();
        sink.play(&SpeechAudio::Wav(b"RIFF2".to_vec())).await.unwrap();

        let first = std::fs::read(dir.path().join("voice/0001.wav")).unwrap();
        let second = std::fs::read(dir.path().join("voice/0002.wav")).unwrap();
        assert_eq!(first, b"RIFF1");
        assert_eq!(second, b"RIFF2");
    }

    #[tokio::test]
    async fn test_recording_speech() {
        let speech = RecordingSpeech::new();
        speech.speak("hello").await.unwrap();
        assert_eq!(speech.spoken(), vec!["hello".to_string()]);

        assert!(RecordingSpeech::failing().speak("hello").await.is_err());
    }
}
