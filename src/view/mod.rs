//! UI output boundary
//!
//! A `MediaView` is what the UI hands to `MediaPlayer::set_display`. Views
//! that can only host video through platform compositing also implement
//! `OverlayOutput`, exposing the screen region the video must occupy.

mod headless;

pub use headless::{HeadlessMediaView, HeadlessOverlayView};

use crate::native::{PixelRect, SurfaceHandle};
use crate::player::EventSubscription;

/// Renderable video output supplied by the UI layer
pub trait MediaView: Send + Sync {
    /// Native surface of the view's renderer, `None` while no renderer is attached
    fn native_surface(&self) -> Option<SurfaceHandle>;

    /// Notify `callback` whenever the renderer attaches (`true`) or detaches (`false`)
    fn subscribe_renderer_changed(
        &self,
        callback: Box<dyn Fn(bool) + Send + Sync>,
    ) -> EventSubscription;

    /// Overlay capability, if the view composites video at window level
    fn as_overlay(&self) -> Option<&dyn OverlayOutput> {
        None
    }
}

/// Overlay-capable output with a mutable screen region
pub trait OverlayOutput: Send + Sync {
    /// Region the video must occupy; empty means no restriction
    fn overlay_area(&self) -> Rect;

    /// Notify `callback` whenever the region changes
    fn subscribe_area_updated(
        &self,
        callback: Box<dyn Fn(Rect) + Send + Sync>,
    ) -> EventSubscription;
}

/// Rectangle in logical UI units
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Convert to device pixels using the platform scaling factor
    pub fn to_pixel(&self, scaling_factor: f64) -> PixelRect {
        let scale = |v: f64| (v * scaling_factor).round() as i32;
        PixelRect {
            x: scale(self.x),
            y: scale(self.y),
            width: scale(self.width),
            height: scale(self.height),
        }
    }
}
