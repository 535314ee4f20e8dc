//! High-level media player API for TVPlayer
//!
//! This module provides the handle the UI layer holds: a cheap, cloneable
//! wrapper around the `PlayerController` with a builder for configuration.

use crate::native::{NativePlayer, NativeState};
use crate::player::controller::PlayerController;
use crate::player::display::{AspectMode, DisplayTarget};
use crate::player::events::EventSubscription;
use crate::player::state::PlayerSettings;
use crate::player::PlayerEvent;
use crate::source::{MediaSource, SourceRegistry};
use crate::utils::config::{DisplayConfig, PlayerConfig};
use crate::utils::error::{PlayerError, Result};
use crate::view::MediaView;

use log::info;
use std::sync::Arc;
use tokio::runtime::Handle;

/// Media player builder for customized configuration
pub struct MediaPlayerBuilder {
    engine: Arc<dyn NativePlayer>,
    config: PlayerConfig,
    display_config: DisplayConfig,
    sources: SourceRegistry,
}

impl MediaPlayerBuilder {
    /// Create a new builder with default settings
    pub fn new(engine: Arc<dyn NativePlayer>) -> Self {
        Self {
            engine,
            config: PlayerConfig::default(),
            display_config: DisplayConfig::default(),
            sources: SourceRegistry::default(),
        }
    }

    /// Set player configuration
    pub fn with_config(mut self, config: PlayerConfig) -> Self {
        self.config = config;
        self
    }

    /// Set display configuration
    pub fn with_display_config(mut self, config: DisplayConfig) -> Self {
        self.display_config = config;
        self
    }

    /// Replace the source handlers
    pub fn with_source_registry(mut self, sources: SourceRegistry) -> Self {
        self.sources = sources;
        self
    }

    /// Build the media player
    ///
    /// Must be called from within a tokio runtime; the player spawns its
    /// background work onto it.
    pub fn build(self) -> Result<MediaPlayer> {
        let runtime = Handle::try_current()
            .map_err(|e| PlayerError::Runtime(format!("No tokio runtime: {}", e)))?;

        let controller = PlayerController::new(
            self.engine,
            self.sources,
            &self.config,
            &self.display_config,
            runtime,
        );
        info!("Media player created");

        Ok(MediaPlayer { controller })
    }
}

/// High-level media player
#[derive(Clone)]
pub struct MediaPlayer {
    controller: Arc<PlayerController>,
}

impl MediaPlayer {
    /// Create a media player with default settings
    pub fn new(engine: Arc<dyn NativePlayer>) -> Result<Self> {
        MediaPlayerBuilder::new(engine).build()
    }

    pub fn builder(engine: Arc<dyn NativePlayer>) -> MediaPlayerBuilder {
        MediaPlayerBuilder::new(engine)
    }

    /// Start playback; false if it did not start
    pub async fn start(&self) -> bool {
        self.controller.start().await
    }

    pub fn pause(&self) {
        self.controller.pause();
    }

    /// Toggle between playing and paused
    pub async fn toggle_play(&self) -> bool {
        if self.state() == NativeState::Playing {
            self.pause();
            false
        } else {
            self.start().await
        }
    }

    pub fn stop(&self) {
        self.controller.stop();
    }

    /// Seek to `ms`, returning the resulting position
    pub async fn seek(&self, ms: u32) -> u32 {
        self.controller.seek(ms).await
    }

    pub fn set_source(&self, source: Option<MediaSource>) -> Result<()> {
        self.controller.set_source(source)
    }

    pub fn source(&self) -> Option<MediaSource> {
        self.controller.source()
    }

    pub fn set_display(&self, view: Option<Arc<dyn MediaView>>) {
        self.controller.set_display(view);
    }

    pub fn display_target(&self) -> DisplayTarget {
        self.controller.display_target()
    }

    pub fn aspect_mode(&self) -> AspectMode {
        self.controller.aspect_mode()
    }

    pub fn set_aspect_mode(&self, mode: AspectMode) {
        self.controller.set_aspect_mode(mode);
    }

    pub fn state(&self) -> NativeState {
        self.controller.state()
    }

    pub fn position(&self) -> u32 {
        self.controller.position()
    }

    pub fn duration(&self) -> u32 {
        self.controller.duration()
    }

    pub fn volume(&self) -> f64 {
        self.controller.volume()
    }

    pub fn set_volume(&self, volume: f64) {
        self.controller.set_volume(volume);
    }

    pub fn is_muted(&self) -> bool {
        self.controller.is_muted()
    }

    pub fn set_muted(&self, muted: bool) {
        self.controller.set_muted(muted);
    }

    pub fn toggle_mute(&self) {
        self.set_muted(!self.is_muted());
    }

    pub fn uses_embedding_controls(&self) -> bool {
        self.controller.settings().uses_embedding_controls
    }

    pub fn set_uses_embedding_controls(&self, enabled: bool) {
        self.controller.update_settings(|s| s.uses_embedding_controls = enabled);
    }

    pub fn auto_play(&self) -> bool {
        self.controller.settings().auto_play
    }

    pub fn set_auto_play(&self, enabled: bool) {
        self.controller.update_settings(|s| s.auto_play = enabled);
    }

    pub fn auto_stop(&self) -> bool {
        self.controller.settings().auto_stop
    }

    pub fn set_auto_stop(&self, enabled: bool) {
        self.controller.update_settings(|s| s.auto_stop = enabled);
    }

    pub fn settings(&self) -> PlayerSettings {
        self.controller.settings()
    }

    /// Wait until background prepare and teardown work has finished
    pub async fn wait_settled(&self) {
        self.controller.wait_settled().await;
    }

    /// Subscribe to player events
    pub fn subscribe_events<F>(&self, callback: F) -> EventSubscription
    where
        F: Fn(PlayerEvent) + Send + Sync + 'static,
    {
        self.controller.subscribe_events(callback)
    }
}
