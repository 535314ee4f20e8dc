//! Views without a real toolkit behind them
//!
//! They hold their surface and region in memory and raise the same
//! notifications a toolkit view would. The demo binary and the tests bind
//! the player to them.

use crate::native::SurfaceHandle;
use crate::player::{EventDispatcher, EventSubscription};
use crate::view::{MediaView, OverlayOutput, Rect};
use parking_lot::Mutex;

/// Embedded-mode view
pub struct HeadlessMediaView {
    surface: Mutex<Option<SurfaceHandle>>,
    renderer_changed: EventDispatcher<bool>,
}

impl HeadlessMediaView {
    /// View whose renderer is already attached to `surface`
    pub fn new(surface: SurfaceHandle) -> Self {
        Self {
            surface: Mutex::new(Some(surface)),
            renderer_changed: EventDispatcher::new(),
        }
    }

    /// View without a renderer yet
    pub fn detached() -> Self {
        Self {
            surface: Mutex::new(None),
            renderer_changed: EventDispatcher::new(),
        }
    }

    pub fn attach_renderer(&self, surface: SurfaceHandle) {
        *self.surface.lock() = Some(surface);
        self.renderer_changed.dispatch(true);
    }

    pub fn detach_renderer(&self) {
        *self.surface.lock() = None;
        self.renderer_changed.dispatch(false);
    }

    /// Number of live renderer-change subscriptions
    pub fn listener_count(&self) -> usize {
        self.renderer_changed.subscriber_count()
    }
}

impl MediaView for HeadlessMediaView {
    fn native_surface(&self) -> Option<SurfaceHandle> {
        *self.surface.lock()
    }

    fn subscribe_renderer_changed(
        &self,
        callback: Box<dyn Fn(bool) + Send + Sync>,
    ) -> EventSubscription {
        self.renderer_changed.subscribe(callback)
    }
}

/// Overlay-mode view
pub struct HeadlessOverlayView {
    view: HeadlessMediaView,
    area: Mutex<Rect>,
    area_updated: EventDispatcher<Rect>,
}

impl HeadlessOverlayView {
    pub fn new(surface: SurfaceHandle, area: Rect) -> Self {
        Self {
            view: HeadlessMediaView::new(surface),
            area: Mutex::new(area),
            area_updated: EventDispatcher::new(),
        }
    }

    /// Move or resize the overlay region, as a layout pass would
    pub fn set_overlay_area(&self, area: Rect) {
        *self.area.lock() = area;
        self.area_updated.dispatch(area);
    }

    pub fn attach_renderer(&self, surface: SurfaceHandle) {
        self.view.attach_renderer(surface);
    }

    pub fn detach_renderer(&self) {
        self.view.detach_renderer();
    }

    /// Number of live region-change subscriptions
    pub fn area_listener_count(&self) -> usize {
        self.area_updated.subscriber_count()
    }

    /// Number of live renderer-change subscriptions
    pub fn listener_count(&self) -> usize {
        self.view.listener_count()
    }
}

impl MediaView for HeadlessOverlayView {
    fn native_surface(&self) -> Option<SurfaceHandle> {
        self.view.native_surface()
    }

    fn subscribe_renderer_changed(
        &self,
        callback: Box<dyn Fn(bool) + Send + Sync>,
    ) -> EventSubscription {
        self.view.subscribe_renderer_changed(callback)
    }

    fn as_overlay(&self) -> Option<&dyn OverlayOutput> {
        Some(self)
    }
}

impl OverlayOutput for HeadlessOverlayView {
    fn overlay_area(&self) -> Rect {
        *self.area.lock()
    }

    fn subscribe_area_updated(
        &self,
        callback: Box<dyn Fn(Rect) + Send + Sync>,
    ) -> EventSubscription {
        self.area_updated.subscribe(callback)
    }
}
