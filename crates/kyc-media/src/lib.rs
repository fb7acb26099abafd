//! Media capture, recording and speech for the KYC flow
//!
//! The flow needs the same platform capabilities a browser offers: camera,
//! microphone and screen capture, frame grabs from a live camera, a recorder
//! that accumulates chunks, on-device speech synthesis and audio playback.
//! This crate defines those capabilities as traits and ships two backings.
//!
//! # Architecture
//!
//! - [`stream`]: media streams and tracks
//! - [`devices`]: the [`MediaDevices`] trait
//! - [`recorder`]: chunk buffer and the combined screen+microphone recorder
//! - [`speech`]: [`SpeechSynth`] and [`AudioSink`] traits
//! - [`file`]: devices backed by image files on disk
//! - [`mock`]: scripted devices and recording speech sinks for tests

pub mod devices;
pub mod file;
pub mod mock;
pub mod recorder;
pub mod speech;
pub mod stream;

// Re-export commonly used types
pub use devices::MediaDevices;
pub use file::FileMediaDevices;
pub use mock::{MediaRequest, MockMediaDevices};
pub use recorder::{Recorder, Recording, RecordingBuffer};
pub use speech::{AudioSink, RecordingAudioSink, RecordingSpeech, SpeechSynth, SpoolAudioSink};
pub use stream::{MediaStream, MediaTrack, TrackKind};
