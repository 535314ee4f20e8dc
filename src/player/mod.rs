//! Player module for TVPlayer
//!
//! This module drives the native engine through its lifecycle
//! (idle -> preparing -> ready -> playing/paused), serializes overlapping
//! prepare requests and routes the engine's output to an embedded view or
//! a window-level overlay region.

mod controller;
mod display;
mod events;
mod media_player;
mod prepare;
mod state;

pub use controller::PlayerController;
pub use display::{AspectMode, DisplayBinder, DisplayTarget, ViewListeners};
pub use events::{EventDispatcher, EventSubscription};
pub use media_player::{MediaPlayer, MediaPlayerBuilder};
pub use prepare::{PrepareOutcome, PrepareSerializer, Reservation, Settled};
pub use state::{CancelFlag, PlayerSettings, StartToken};

use serde::Serialize;

/// Notification published to the UI layer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PlayerEvent {
    /// Native start succeeded
    PlaybackStarted,

    /// Native pause succeeded
    PlaybackPaused,

    /// Stop requested; teardown continues in the background
    PlaybackStopped,

    /// End of stream reached
    PlaybackCompleted,

    /// Prepare finished, stream information (duration...) is available
    UpdateStreamInfo,

    /// Buffering progress as a fraction in [0, 1]
    BufferingProgressUpdated { progress: f64 },
}
