//! Display binder
//!
//! Decides where the native engine renders and keeps the native display
//! settings in line with the UI. An embedded target renders into the view's
//! own surface; an overlay target renders onto the application's root window
//! and is cropped to the view's overlay region.

use crate::native::{DisplayMode, NativeDisplay, NativePlayer, NativeState, WindowHandle};
use crate::player::events::EventSubscription;
use crate::player::prepare::PrepareSerializer;
use crate::view::{MediaView, Rect};
use log::{debug, error};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// How video is fitted into its output area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AspectMode {
    /// Keep aspect ratio, letterbox
    #[default]
    Fit,

    /// Keep aspect ratio, crop to fill
    Fill,

    /// Ignore aspect ratio
    Stretch,

    /// Native size, scaled down if it does not fit
    OriginalSize,
}

impl AspectMode {
    pub fn to_display_mode(self) -> DisplayMode {
        match self {
            AspectMode::Fit => DisplayMode::LetterBox,
            AspectMode::Fill => DisplayMode::CroppedFull,
            AspectMode::Stretch => DisplayMode::FullScreen,
            AspectMode::OriginalSize => DisplayMode::OriginalOrFull,
        }
    }
}

/// The output the engine is bound to
#[derive(Clone, Default)]
pub enum DisplayTarget {
    #[default]
    None,

    /// Inline in the view hierarchy
    Embedded(Arc<dyn MediaView>),

    /// Composited at window level, region taken from the view
    Overlay(Arc<dyn MediaView>),
}

impl DisplayTarget {
    /// Classify a UI output by its capabilities
    pub fn from_view(view: Option<Arc<dyn MediaView>>) -> Self {
        match view {
            None => DisplayTarget::None,
            Some(view) if view.as_overlay().is_some() => DisplayTarget::Overlay(view),
            Some(view) => DisplayTarget::Embedded(view),
        }
    }

    pub fn is_overlay(&self) -> bool {
        matches!(self, DisplayTarget::Overlay(_))
    }

    fn view(&self) -> Option<&Arc<dyn MediaView>> {
        match self {
            DisplayTarget::None => None,
            DisplayTarget::Embedded(view) | DisplayTarget::Overlay(view) => Some(view),
        }
    }
}

impl fmt::Debug for DisplayTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayTarget::None => write!(f, "None"),
            DisplayTarget::Embedded(_) => write!(f, "Embedded"),
            DisplayTarget::Overlay(_) => write!(f, "Overlay"),
        }
    }
}

/// Listeners the binder installs on the bound view
pub struct ViewListeners {
    pub on_renderer_changed: Box<dyn Fn(bool) + Send + Sync>,
    pub on_area_updated: Box<dyn Fn(Rect) + Send + Sync>,
}

struct Binding {
    target: DisplayTarget,
    aspect_mode: AspectMode,
    subscriptions: Vec<EventSubscription>,
}

/// Configures the native display output from the current target and aspect mode
pub struct DisplayBinder {
    engine: Arc<dyn NativePlayer>,
    main_window: WindowHandle,
    scaling_factor: f64,
    binding: Mutex<Binding>,
}

impl DisplayBinder {
    pub fn new(
        engine: Arc<dyn NativePlayer>,
        main_window: WindowHandle,
        scaling_factor: f64,
        aspect_mode: AspectMode,
    ) -> Self {
        Self {
            engine,
            main_window,
            scaling_factor,
            binding: Mutex::new(Binding {
                target: DisplayTarget::None,
                aspect_mode,
                subscriptions: Vec::new(),
            }),
        }
    }

    pub fn target(&self) -> DisplayTarget {
        self.binding.lock().target.clone()
    }

    pub fn aspect_mode(&self) -> AspectMode {
        self.binding.lock().aspect_mode
    }

    pub fn set_aspect_mode(&self, mode: AspectMode) {
        self.binding.lock().aspect_mode = mode;
    }

    /// Switch to `target`
    ///
    /// Listeners on the previous view are removed before any are installed
    /// on the new one. Does not touch the engine.
    pub fn bind(&self, target: DisplayTarget, listeners: ViewListeners) {
        let mut binding = self.binding.lock();
        binding.subscriptions.clear();

        if let Some(view) = target.view() {
            binding
                .subscriptions
                .push(view.subscribe_renderer_changed(listeners.on_renderer_changed));
            if let Some(overlay) = view.as_overlay() {
                binding
                    .subscriptions
                    .push(overlay.subscribe_area_updated(listeners.on_area_updated));
            }
        }

        debug!("Display target set to {:?}", target);
        binding.target = target;
    }

    /// Assign the native display sink for the current target
    ///
    /// Called from the prepare path while the engine is Idle, and when the
    /// target changes on a prepared engine.
    pub fn apply_display(&self) {
        match self.target() {
            DisplayTarget::None => {
                if let Err(e) = self.engine.set_display(NativeDisplay::None) {
                    error!("Error on detaching display : {}", e);
                }
            }
            DisplayTarget::Embedded(view) => match view.native_surface() {
                Some(surface) => {
                    let result = self
                        .engine
                        .set_display(NativeDisplay::Surface(surface))
                        .and_then(|_| {
                            self.engine
                                .set_display_mode(self.aspect_mode().to_display_mode())
                        });
                    if let Err(e) = result {
                        error!("Error on binding embedded display : {}", e);
                    }
                }
                None => debug!("Embedded view has no renderer yet, display left unbound"),
            },
            DisplayTarget::Overlay(_) => {
                if let Err(e) = self.engine.set_display(NativeDisplay::Window(self.main_window)) {
                    error!("Error on binding overlay display : {}", e);
                    return;
                }
                self.push_overlay_area();
            }
        }
    }

    /// Push the display mode for the current target and aspect mode
    pub fn refresh(&self) {
        match self.target() {
            DisplayTarget::None => {}
            DisplayTarget::Embedded(_) => self.push_aspect_mode(),
            DisplayTarget::Overlay(_) => self.push_overlay_area(),
        }
    }

    /// `refresh` once no prepare is in flight
    pub async fn refresh_when_settled(&self, prepare: &PrepareSerializer) {
        if self.engine.state() == NativeState::Preparing || prepare.is_busy() {
            prepare.settled().await;
        }
        self.refresh();
    }

    /// `apply_display` once no prepare is in flight, unless the engine ended up Idle
    pub async fn apply_display_when_settled(&self, prepare: &PrepareSerializer) {
        if self.engine.state() == NativeState::Preparing || prepare.is_busy() {
            prepare.settled().await;
        }
        if self.engine.state().is_prepared() {
            self.apply_display();
        }
    }

    fn push_aspect_mode(&self) {
        if let Err(e) = self
            .engine
            .set_display_mode(self.aspect_mode().to_display_mode())
        {
            error!("Error on applying aspect mode : {}", e);
        }
    }

    fn push_overlay_area(&self) {
        let DisplayTarget::Overlay(view) = self.target() else {
            return;
        };
        let Some(overlay) = view.as_overlay() else {
            return;
        };

        let area = overlay.overlay_area();
        let result = if area.is_empty() {
            self.engine
                .set_display_mode(self.aspect_mode().to_display_mode())
        } else {
            self.engine
                .set_display_mode(DisplayMode::Roi)
                .and_then(|_| self.engine.set_roi(area.to_pixel(self.scaling_factor)))
        };

        if let Err(e) = result {
            error!("Error on updating overlay area : {}", e);
        }
    }
}
