//! Server-issued session identity
//!
//! The backend mints a session id on the first document submission. The
//! client adopts the first id it sees and threads it into every later call.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock};
use tracing::{debug, info};

/// Opaque session token issued by the verification backend
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Shared, set-once holder for the session id
///
/// Clones share the same slot, so background verification tasks and the
/// controller observe the same value. Once assigned it never changes.
#[derive(Debug, Clone, Default)]
pub struct SessionCell {
    slot: Arc<OnceLock<SessionId>>,
}

impl SessionCell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current session id, if one has been assigned
    pub fn get(&self) -> Option<SessionId> {
        self.slot.get().cloned()
    }

    /// Adopt `id` if no session is set yet
    ///
    /// Returns `true` when this call assigned the session.
    pub fn assign(&self, id: SessionId) -> bool {
        match self.slot.set(id) {
            Ok(()) => {
                if let Some(current) = self.slot.get() {
                    info!("Session ID assigned: {}", current);
                }
                true
            }
            Err(rejected) => {
                debug!(
                    "Ignoring session id {} (already bound to {:?})",
                    rejected,
                    self.slot.get()
                );
                false
            }
        }
    }
}
