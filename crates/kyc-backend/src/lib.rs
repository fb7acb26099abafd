//! # kyc-backend
//!
//! Client for the verification backend that does the real work of the KYC
//! flow: speech synthesis, document OCR, face matching, detail extraction and
//! recording storage. The backend is opaque; this crate only speaks its HTTP
//! contract.
//!
//! - [`VerificationBackend`]: the seam the flow controller talks to
//! - [`HttpBackend`]: reqwest implementation
//! - [`MockBackend`]: scripted in-memory implementation for tests

mod client;
mod mock;
mod types;

pub use client::{HttpBackend, VerificationBackend};
pub use mock::{BackendCall, MockBackend, MockReply};
pub use types::*;
