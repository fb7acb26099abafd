//! Spoken prompts: remote voice first, on-device synthesis as fallback

use std::sync::Arc;

use kyc_backend::VerificationBackend;
use kyc_core::fail_open::fail_open;
use kyc_core::Result;
use kyc_media::{AudioSink, SpeechSynth};
use tracing::{debug, warn};

/// How a prompt ended up being spoken
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NarrationChannel {
    Remote,
    OnDevice,
    /// Both voices failed; the prompt is still shown on screen
    Silent,
}

pub struct Narrator {
    backend: Arc<dyn VerificationBackend>,
    audio: Arc<dyn AudioSink>,
    synth: Arc<dyn SpeechSynth>,
    remote: bool,
}

impl Narrator {
    pub fn new(
        backend: Arc<dyn VerificationBackend>,
        audio: Arc<dyn AudioSink>,
        synth: Arc<dyn SpeechSynth>,
    ) -> Self {
        Self {
            backend,
            audio,
            synth,
            remote: true,
        }
    }

    /// Skip the remote voice and always speak on-device
    pub fn on_device_only(mut self) -> Self {
        self.remote = false;
        self
    }

    async fn speak_remote(&self, text: &str) -> Result<()> {
        let audio = self.backend.synthesize(text).await?;
        self.audio.play(&audio).await
    }

    /// Speak `text`, never failing
    pub async fn speak(&self, text: &str) -> NarrationChannel {
        if self.remote {
            match self.speak_remote(text).await {
                Ok(()) => return NarrationChannel::Remote,
                Err(e) => warn!("Remote voice failed, using on-device speech: {}", e),
            }
        }

        match fail_open("on_device_speech", || self.synth.speak(text)).await {
            Some(()) => NarrationChannel::OnDevice,
            None => {
                debug!("Narration silent: {}", text);
                NarrationChannel::Silent
            }
        }
    }
}
