//! TVPlayer - media playback controller for embedded TV platforms
//!
//! Drives a native media engine through its lifecycle, serializes
//! overlapping prepare requests and binds the engine's output either to an
//! embedded view or to a rectangle of the main window.

pub mod native;
pub mod player;
pub mod source;
pub mod utils;
pub mod view;

pub use native::{NativePlayer, NativeState, SimulatedPlayer};
pub use player::{AspectMode, MediaPlayer, MediaPlayerBuilder, PlayerEvent};
pub use source::MediaSource;
pub use utils::{Config, PlayerError, Result};
pub use view::{HeadlessMediaView, HeadlessOverlayView, MediaView, Rect};
