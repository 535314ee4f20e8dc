//! Native engine boundary for TVPlayer
//!
//! This module defines the interface of the hardware media-playback engine
//! the orchestrator drives. The engine owns the authoritative playback state;
//! commands are only legal in specific states and report violations as
//! `PlayerError::InvalidState`.

mod simulated;

pub use simulated::{NativeCommand, SimulatedPlayer};

use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

/// Engine state as reported by the native layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeState {
    /// No source prepared
    Idle,

    /// Transitioning Idle -> Ready
    Preparing,

    /// Prepared, not started
    Ready,

    /// Currently playing
    Playing,

    /// Playback paused
    Paused,
}

impl NativeState {
    /// Whether the engine has finished preparing (Ready, Playing or Paused)
    pub fn is_prepared(self) -> bool {
        matches!(self, NativeState::Ready | NativeState::Playing | NativeState::Paused)
    }
}

/// Native display mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayMode {
    LetterBox,
    OriginalOrFull,
    FullScreen,
    CroppedFull,
    /// Crop/position output to an explicit pixel rectangle
    Roi,
}

/// Handle of a renderable native surface owned by a UI view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceHandle(pub u64);

/// Handle of a native top-level window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowHandle(pub u64);

/// Where the engine renders video
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeDisplay {
    /// Detached, video is discarded
    None,

    /// Inline, into a view's surface
    Surface(SurfaceHandle),

    /// Composited by the platform onto a window
    Window(WindowHandle),
}

/// Rectangle in device pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// Media location handed to the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeSource {
    Uri(String),
    Path(PathBuf),
}

/// Callback raised by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeEvent {
    /// End of stream reached
    PlaybackCompleted,

    /// Buffering progress in percent (0-100)
    BufferingProgressChanged { percent: i32 },
}

/// Receiver of native callbacks
pub type NativeEventHandler = Arc<dyn Fn(NativeEvent) + Send + Sync>;

/// Native media engine interface
#[async_trait]
pub trait NativePlayer: Send + Sync {
    /// Current engine state
    fn state(&self) -> NativeState;

    /// Bind a media location. Legal in Idle only.
    fn set_source(&self, source: NativeSource) -> Result<()>;

    /// Transition Idle -> Preparing -> Ready
    ///
    /// On failure the engine falls back to Idle.
    async fn prepare(&self) -> Result<()>;

    /// Release the prepared source, back to Idle. Illegal while preparing.
    fn unprepare(&self) -> Result<()>;

    /// Start or resume playback. Legal in Ready, Playing and Paused.
    fn start(&self) -> Result<()>;

    /// Pause playback. Legal in Playing and Paused.
    fn pause(&self) -> Result<()>;

    /// Stop playback, back to Ready. Legal in Playing and Paused.
    fn stop(&self) -> Result<()>;

    /// Move the play position, clamped to the stream duration
    ///
    /// # Arguments
    ///
    /// * `ms` - Target position in milliseconds
    /// * `exact` - Seek to the exact frame instead of the nearest key frame
    async fn set_play_position(&self, ms: u32, exact: bool) -> Result<()>;

    /// Current play position in milliseconds
    fn play_position(&self) -> Result<u32>;

    /// Stream duration in milliseconds
    fn duration(&self) -> Result<u32>;

    /// Assign the display sink
    fn set_display(&self, display: NativeDisplay) -> Result<()>;

    /// Set the display mode. Rejected while preparing.
    fn set_display_mode(&self, mode: DisplayMode) -> Result<()>;

    /// Set the region of interest used by `DisplayMode::Roi`. Rejected while preparing.
    fn set_roi(&self, rect: PixelRect) -> Result<()>;

    fn volume(&self) -> f32;

    fn set_volume(&self, volume: f32) -> Result<()>;

    fn is_muted(&self) -> bool;

    fn set_muted(&self, muted: bool) -> Result<()>;

    /// Register the receiver of completion and buffering callbacks
    fn set_event_handler(&self, handler: NativeEventHandler);
}
