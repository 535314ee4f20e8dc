//! Playback lifecycle controller
//!
//! The controller is the only owner of the native handle. It mirrors the
//! engine's state rather than shadowing it; the pending prepare held by the
//! serializer and the cancel flag are the only extra state it keeps. Every
//! native error is contained here: it is logged and the operation reports
//! that it did not complete.

use crate::native::{NativeEvent, NativePlayer, NativeState, WindowHandle};
use crate::player::display::{AspectMode, DisplayBinder, DisplayTarget, ViewListeners};
use crate::player::events::{EventDispatcher, EventSubscription};
use crate::player::prepare::{PrepareOutcome, PrepareSerializer, Reservation, Settled};
use crate::player::state::{CancelFlag, PlayerSettings};
use crate::player::PlayerEvent;
use crate::source::{MediaSource, ResolvedSource, SourceRegistry};
use crate::utils::config::{DisplayConfig, PlayerConfig};
use crate::utils::error::Result;
use crate::utils::percent_to_fraction;
use crate::view::{MediaView, Rect};

use log::{debug, error, info, warn};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;

const PREPARE_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Lifecycle state machine over a native engine
pub struct PlayerController {
    /// Native engine handle
    engine: Arc<dyn NativePlayer>,

    /// Attach strategies per source kind
    sources: SourceRegistry,

    /// Current source, resolved at `set_source` time
    source: Mutex<Option<ResolvedSource>>,

    settings: Mutex<PlayerSettings>,

    /// Raised by `stop` to suppress a start waiting on a prepare
    cancel: CancelFlag,

    /// Holds the in-flight prepare or teardown
    prepare: PrepareSerializer,

    display: DisplayBinder,

    events: EventDispatcher<PlayerEvent>,

    /// Runtime for work started from callbacks and fire-and-forget teardown
    runtime: Handle,
}

impl PlayerController {
    pub(crate) fn new(
        engine: Arc<dyn NativePlayer>,
        sources: SourceRegistry,
        config: &PlayerConfig,
        display: &DisplayConfig,
        runtime: Handle,
    ) -> Arc<Self> {
        let binder = DisplayBinder::new(
            Arc::clone(&engine),
            WindowHandle(display.main_window),
            display.scaling_factor,
            config.aspect_mode,
        );

        let controller = Arc::new(Self {
            engine,
            sources,
            source: Mutex::new(None),
            settings: Mutex::new(PlayerSettings::from(config)),
            cancel: CancelFlag::new(),
            prepare: PrepareSerializer::new(),
            display: binder,
            events: EventDispatcher::new(),
            runtime,
        });

        if (controller.engine.volume() - config.volume).abs() > f32::EPSILON {
            controller.set_volume(config.volume as f64);
        }
        if controller.engine.is_muted() != config.muted {
            controller.set_muted(config.muted);
        }

        let weak = Arc::downgrade(&controller);
        controller.engine.set_event_handler(Arc::new(move |event: NativeEvent| {
            if let Some(controller) = weak.upgrade() {
                controller.on_native_event(event);
            }
        }));

        controller
    }

    /// Start playback, preparing the engine first if needed
    ///
    /// Returns false when no source is set, when the prepare failed, when a
    /// `stop` arrived while the prepare was in flight, or when the engine
    /// refused to start.
    ///
    /// The prepare runs on its own task. Dropping the returned future only
    /// stops waiting for it; the prepare still settles the serializer slot.
    pub async fn start(self: &Arc<Self>) -> bool {
        debug!("Start");

        let token = self.cancel.arm();
        if !self.has_source() {
            debug!("Start ignored, no source set");
            return false;
        }

        if !self.engine.state().is_prepared() || self.prepare.is_busy() {
            let reservation = self.prepare.reserve();
            let controller = Arc::clone(self);
            let task = self.runtime.spawn(async move {
                reservation
                    .ensure_ready(controller.engine.as_ref(), || controller.prepare_engine())
                    .await
            });
            let outcome = task.await.unwrap_or_else(|e| {
                PrepareOutcome::Failed(format!("prepare task failed: {}", e))
            });
            if let PrepareOutcome::Failed(reason) = outcome {
                warn!("Start aborted, prepare failed: {}", reason);
                return false;
            }
        }

        if self.cancel.is_raised(token) {
            debug!("Start cancelled by stop");
            return false;
        }

        if let Err(e) = self.engine.start() {
            error!("Error on start : {}", e);
            return false;
        }

        self.events.dispatch(PlayerEvent::PlaybackStarted);
        true
    }

    pub fn pause(&self) {
        debug!("Pause");

        match self.engine.pause() {
            Ok(()) => self.events.dispatch(PlayerEvent::PlaybackPaused),
            Err(e) => error!("Error on pause : {}", e),
        }
    }

    /// Stop playback
    ///
    /// Raises the cancel flag and returns the engine to Idle in the
    /// background. `PlaybackStopped` is published right away.
    pub fn stop(self: &Arc<Self>) {
        debug!("Stop");

        self.cancel.raise();
        // Queue behind any in-flight prepare before yielding.
        let reservation = self.prepare.reserve();
        let controller = Arc::clone(self);
        self.runtime.spawn(async move {
            controller.change_to_idle_state(reservation).await;
        });

        self.events.dispatch(PlayerEvent::PlaybackStopped);
    }

    /// Seek to `ms` and report the resulting position
    pub async fn seek(&self, ms: u32) -> u32 {
        debug!("Seek to {}ms", ms);

        if let Err(e) = self.engine.set_play_position(ms, false).await {
            error!("Fail to seek : {}", e);
        }
        self.position()
    }

    /// Set or clear the media source
    ///
    /// The source is paired with its attach strategy here; an unsupported
    /// variant is rejected and the previous source kept.
    pub fn set_source(&self, source: Option<MediaSource>) -> Result<()> {
        let resolved = source
            .map(|source| self.sources.resolve(source))
            .transpose()?;

        match &resolved {
            Some(resolved) => info!("Source set: {}", resolved.source()),
            None => info!("Source cleared"),
        }
        *self.source.lock() = resolved;
        Ok(())
    }

    pub fn source(&self) -> Option<MediaSource> {
        self.source
            .lock()
            .as_ref()
            .map(|resolved| resolved.source().clone())
    }

    pub fn has_source(&self) -> bool {
        self.source.lock().is_some()
    }

    /// Bind the engine's output to `view`, or detach it with `None`
    pub fn set_display(self: &Arc<Self>, view: Option<Arc<dyn MediaView>>) {
        let target = DisplayTarget::from_view(view);
        self.display.bind(target, self.view_listeners());

        if self.is_transitioning() {
            let controller = Arc::clone(self);
            self.runtime.spawn(async move {
                controller
                    .display
                    .apply_display_when_settled(&controller.prepare)
                    .await;
            });
        } else if self.engine.state().is_prepared() {
            self.display.apply_display();
        }
    }

    pub fn display_target(&self) -> DisplayTarget {
        self.display.target()
    }

    pub fn aspect_mode(&self) -> AspectMode {
        self.display.aspect_mode()
    }

    pub fn set_aspect_mode(self: &Arc<Self>, mode: AspectMode) {
        self.display.set_aspect_mode(mode);
        self.schedule_display_refresh();
    }

    pub fn state(&self) -> NativeState {
        self.engine.state()
    }

    /// Play position in ms, 0 until the engine is prepared
    pub fn position(&self) -> u32 {
        if !self.engine.state().is_prepared() {
            return 0;
        }
        self.engine.play_position().unwrap_or_else(|e| {
            warn!("Fail to read position : {}", e);
            0
        })
    }

    /// Stream duration in ms, 0 until the engine is prepared
    pub fn duration(&self) -> u32 {
        if !self.engine.state().is_prepared() {
            return 0;
        }
        self.engine.duration().unwrap_or_else(|e| {
            warn!("Fail to read duration : {}", e);
            0
        })
    }

    pub fn volume(&self) -> f64 {
        self.engine.volume() as f64
    }

    pub fn set_volume(&self, volume: f64) {
        let volume = volume.clamp(0.0, 1.0) as f32;
        if let Err(e) = self.engine.set_volume(volume) {
            error!("Error on setting volume : {}", e);
        }
    }

    pub fn is_muted(&self) -> bool {
        self.engine.is_muted()
    }

    pub fn set_muted(&self, muted: bool) {
        if let Err(e) = self.engine.set_muted(muted) {
            error!("Error on setting mute : {}", e);
        }
    }

    pub fn settings(&self) -> PlayerSettings {
        *self.settings.lock()
    }

    pub fn update_settings<F>(&self, updater: F)
    where
        F: FnOnce(&mut PlayerSettings),
    {
        updater(&mut self.settings.lock());
    }

    pub fn subscribe_events<F>(&self, callback: F) -> EventSubscription
    where
        F: Fn(PlayerEvent) + Send + Sync + 'static,
    {
        self.events.subscribe(callback)
    }

    /// Wait until no prepare or teardown is queued
    pub async fn wait_settled(&self) {
        while self.prepare.settled().await.is_some() {}
    }

    /// Prepare body run by the serializer once every earlier operation settled
    async fn prepare_engine(&self) -> PrepareOutcome {
        let state = self.engine.state();
        if state != NativeState::Idle {
            return PrepareOutcome::Failed(format!("engine is {:?}", state));
        }

        self.display.apply_display();

        let source = self.source.lock().clone();
        if let Some(source) = source {
            if let Err(e) = source.attach(self.engine.as_ref()).await {
                error!("Error on attaching {} : {}", source.source(), e);
                return PrepareOutcome::Failed(e.to_string());
            }
        }

        match self.engine.prepare().await {
            Ok(()) => {
                info!("Prepared, duration {}ms", self.duration());
                self.events.dispatch(PlayerEvent::UpdateStreamInfo);
                PrepareOutcome::Ready
            }
            Err(e) => {
                error!("Error on prepare : {}", e);
                PrepareOutcome::Failed(e.to_string())
            }
        }
    }

    /// Return the engine to Idle once the operation ahead of `reservation` settled
    ///
    /// Queuing behind the pending prepare is what makes a stop during
    /// Preparing unprepare only after the prepare has finished.
    async fn change_to_idle_state(&self, mut reservation: Reservation) {
        reservation.wait_turn().await;

        let state = self.engine.state();
        let result = match state {
            NativeState::Playing | NativeState::Paused => self
                .engine
                .stop()
                .and_then(|_| self.engine.unprepare()),
            NativeState::Ready => self.engine.unprepare(),
            NativeState::Preparing => {
                warn!("Engine is preparing outside of the player, waiting for it");
                match self.wait_while_preparing().await {
                    NativeState::Idle => Ok(()),
                    _ => self.engine.unprepare(),
                }
            }
            NativeState::Idle => Ok(()),
        };

        if let Err(e) = result {
            error!("Error on changing to idle from {:?} : {}", state, e);
        }
        reservation.settle(Settled::Released);
    }

    /// Poll the engine until it leaves Preparing and return where it landed
    async fn wait_while_preparing(&self) -> NativeState {
        let mut ticker = tokio::time::interval(PREPARE_POLL_INTERVAL);
        loop {
            ticker.tick().await;
            let state = self.engine.state();
            if state != NativeState::Preparing {
                return state;
            }
        }
    }

    fn is_transitioning(&self) -> bool {
        self.engine.state() == NativeState::Preparing || self.prepare.is_busy()
    }

    /// Push display settings now, or after the pending prepare settles
    fn schedule_display_refresh(self: &Arc<Self>) {
        if self.is_transitioning() {
            let controller = Arc::clone(self);
            self.runtime.spawn(async move {
                controller
                    .display
                    .refresh_when_settled(&controller.prepare)
                    .await;
            });
        } else {
            self.display.refresh();
        }
    }

    fn view_listeners(self: &Arc<Self>) -> ViewListeners {
        let weak = Arc::downgrade(self);
        let on_renderer_changed = {
            let weak = weak.clone();
            Box::new(move |attached: bool| {
                if let Some(controller) = weak.upgrade() {
                    controller.on_renderer_changed(attached);
                }
            })
        };
        let on_area_updated = Box::new(move |_: Rect| {
            if let Some(controller) = weak.upgrade() {
                controller.schedule_display_refresh();
            }
        });

        ViewListeners {
            on_renderer_changed,
            on_area_updated,
        }
    }

    fn on_renderer_changed(self: &Arc<Self>, attached: bool) {
        let settings = self.settings();
        if attached && self.has_source() && settings.auto_play {
            debug!("Renderer attached, auto play");
            let controller = Arc::clone(self);
            self.runtime.spawn(async move {
                controller.start().await;
            });
        } else if !attached && settings.auto_stop {
            debug!("Renderer detached, auto stop");
            self.stop();
        }
    }

    fn on_native_event(self: &Arc<Self>, event: NativeEvent) {
        match event {
            NativeEvent::PlaybackCompleted => {
                debug!("Playback completed");
                self.events.dispatch(PlayerEvent::PlaybackCompleted);
                self.pause();
                let controller = Arc::clone(self);
                self.runtime.spawn(async move {
                    controller.seek(0).await;
                });
            }
            NativeEvent::BufferingProgressChanged { percent } => {
                self.events.dispatch(PlayerEvent::BufferingProgressUpdated {
                    progress: percent_to_fraction(percent),
                });
            }
        }
    }
}
