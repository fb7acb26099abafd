//! # kyc-core
//!
//! Core types for the unattended KYC verification flow.
//!
//! The flow walks a user through permission grants, document capture, a
//! face-match gate, a review of server-extracted fields and a recorded legal
//! attestation. Everything the other crates share lives here:
//!
//! - Document kinds and captured image payloads
//! - The set-once session cell threaded into every backend call
//! - Review details with placeholder substitution
//! - The unified error type and configuration

pub mod config;
mod error;
pub mod fail_open;
mod session;
mod types;

pub use config::KycConfig;
pub use error::{KycError, Result};
pub use session::{SessionCell, SessionId};
pub use types::*;
