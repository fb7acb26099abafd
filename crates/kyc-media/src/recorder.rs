//! Session recording
//!
//! The recorder captures screen video and microphone audio as one combined
//! stream from the first permission step until the attestation is read.

use chrono::{DateTime, Utc};
use kyc_core::{KycError, Result};
use tracing::{debug, info};

use crate::devices::MediaDevices;
use crate::stream::MediaStream;

/// Accumulated recorder output
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingBuffer {
    chunks: Vec<Vec<u8>>,
}

impl RecordingBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk; empty chunks are dropped
    pub fn push(&mut self, chunk: Vec<u8>) {
        if !chunk.is_empty() {
            self.chunks.push(chunk);
        }
    }

    pub fn clear(&mut self) {
        self.chunks.clear();
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn byte_len(&self) -> usize {
        self.chunks.iter().map(Vec::len).sum()
    }

    /// Concatenate every chunk into a single file body
    pub fn to_bytes(&self) -> Vec<u8> {
        self.chunks.concat()
    }
}

/// A finished recording
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recording {
    /// Container type without codec parameters
    pub mime: String,
    pub bytes: Vec<u8>,
    pub chunk_count: usize,
    pub started_at: DateTime<Utc>,
    pub stopped_at: DateTime<Utc>,
}

/// Active screen+microphone recorder
pub struct Recorder {
    stream: MediaStream,
    sources: Vec<MediaStream>,
    buffer: RecordingBuffer,
    mime: String,
    started_at: DateTime<Utc>,
}

impl Recorder {
    /// Request screen and microphone capture and start recording
    ///
    /// The combined stream carries the screen's video and the microphone's
    /// audio. The buffer starts empty.
    pub async fn start(devices: &dyn MediaDevices, mime: &str) -> Result<Self> {
        let display = devices.request_display().await?;
        let microphone = match devices.request_microphone().await {
            Ok(stream) => stream,
            Err(e) => {
                display.stop();
                return Err(e);
            }
        };

        let stream = MediaStream::combine(&display, &microphone);
        if !stream.is_active() {
            display.stop();
            microphone.stop();
            return Err(KycError::Media(
                "Screen and microphone streams have no live tracks".to_string(),
            ));
        }

        info!(
            "Recording started ({} tracks, {})",
            stream.tracks().len(),
            mime
        );

        Ok(Self {
            stream,
            sources: vec![display, microphone],
            buffer: RecordingBuffer::new(),
            mime: mime.to_string(),
            started_at: Utc::now(),
        })
    }

    pub fn stream(&self) -> &MediaStream {
        &self.stream
    }

    pub fn buffer(&self) -> &RecordingBuffer {
        &self.buffer
    }

    /// Pull any chunks the platform has produced into the buffer
    pub async fn collect(&mut self, devices: &dyn MediaDevices) -> Result<usize> {
        let chunks = devices.take_chunks(&self.stream).await?;
        let count = chunks.len();
        for chunk in chunks {
            self.buffer.push(chunk);
        }
        debug!(
            "Collected {} recorder chunks ({} bytes buffered)",
            count,
            self.buffer.byte_len()
        );
        Ok(count)
    }

    /// Flush the final chunks, stop every track and return the recording
    pub async fn stop(mut self, devices: &dyn MediaDevices) -> Result<Recording> {
        let collected = self.collect(devices).await;

        self.stream.stop();
        for source in &self.sources {
            source.stop();
        }
        collected?;

        let mime = self
            .mime
            .split(';')
            .next()
            .unwrap_or(&self.mime)
            .trim()
            .to_string();

        info!(
            "Recording stopped ({} chunks, {} bytes)",
            self.buffer.chunk_count(),
            self.buffer.byte_len()
        );

        Ok(Recording {
            mime,
            bytes: self.buffer.to_bytes(),
            chunk_count: self.buffer.chunk_count(),
            started_at: self.started_at,
            stopped_at: Utc::now(),
        })
    }
}
