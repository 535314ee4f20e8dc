//! Controller-local state
//!
//! The native engine owns the playback state. Besides the pending prepare
//! held by the serializer, the controller keeps only the cancel flag and
//! the UI-facing settings below.

use crate::utils::config::PlayerConfig;
use std::sync::atomic::{AtomicU64, Ordering};

/// Cancel flag consulted by `start`
///
/// `stop` raises it to suppress a start that is still waiting on a prepare.
/// Each `start` arms it afresh and keeps the returned token; the flag counts
/// as raised for that start if any `stop` happened after it was armed. A
/// later start therefore cannot clear the cancellation of an earlier one.
#[derive(Debug, Default)]
pub struct CancelFlag {
    epoch: AtomicU64,
}

/// Snapshot taken by `CancelFlag::arm`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartToken(u64);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset for a new start
    pub fn arm(&self) -> StartToken {
        StartToken(self.epoch.load(Ordering::SeqCst))
    }

    /// Request cancellation of every start armed so far
    pub fn raise(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
    }

    /// Whether a stop happened since `token` was armed
    pub fn is_raised(&self, token: StartToken) -> bool {
        self.epoch.load(Ordering::SeqCst) != token.0
    }
}

/// UI-facing switches that do not live in the native engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerSettings {
    pub uses_embedding_controls: bool,
    pub auto_play: bool,
    pub auto_stop: bool,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            uses_embedding_controls: true,
            auto_play: false,
            auto_stop: false,
        }
    }
}

impl From<&PlayerConfig> for PlayerSettings {
    fn from(config: &PlayerConfig) -> Self {
        Self {
            uses_embedding_controls: config.uses_embedding_controls,
            auto_play: config.auto_play,
            auto_stop: config.auto_stop,
        }
    }
}
