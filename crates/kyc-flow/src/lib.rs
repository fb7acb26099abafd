//! # kyc-flow
//!
//! Step sequencer for the unattended KYC verification flow.
//!
//! This crate provides:
//! - A pure state machine: `transition(state, event) -> (state, actions)`
//! - A pure state-to-view mapping for any front end
//! - The pending-verification set joined at the face-match gate
//! - Narration with remote voice and on-device fallback
//! - [`FlowController`], which executes actions against the backend and
//!   media devices and feeds their outcomes back as events

mod controller;
mod narration;
mod pending;
pub mod script;
mod state_machine;
mod verifier;
mod view;

pub use controller::{FlowController, Intent};
pub use narration::{NarrationChannel, Narrator};
pub use pending::PendingVerifications;
pub use state_machine::{transition, Action, Event, FlowState, Pause, PermissionKind, Step};
pub use verifier::Verifier;
pub use view::{render, Control, VideoFeed, View};
