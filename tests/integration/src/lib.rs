//! Integration test utilities for TVPlayer
//!
//! This module provides common utilities for integration testing including:
//! - A player wired to a simulated engine
//! - An event recorder
//! - Polling helpers for background work

use anyhow::Result;
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tvplayer::player::EventSubscription;
use tvplayer::utils::PlayerConfig;
use tvplayer::{MediaPlayer, MediaSource, PlayerEvent, SimulatedPlayer};

pub const TEST_URI: &str = "http://example.com/stream.mp4";

/// Test fixture for integration tests
pub struct TestFixture {
    pub engine: Arc<SimulatedPlayer>,
    pub player: MediaPlayer,
    pub events: EventRecorder,
}

impl TestFixture {
    /// Player with default settings over an instant simulated engine
    pub fn new() -> Result<Self> {
        Self::with_config(PlayerConfig::default())
    }

    pub fn with_config(config: PlayerConfig) -> Result<Self> {
        let engine = Arc::new(SimulatedPlayer::new());
        let player = MediaPlayer::builder(engine.clone())
            .with_config(config)
            .build()?;
        let events = EventRecorder::attach(&player);

        Ok(Self {
            engine,
            player,
            events,
        })
    }

    /// Fixture whose engine holds every prepare until released
    pub fn held() -> Result<Self> {
        let fixture = Self::new()?;
        fixture.engine.hold_prepare();
        Ok(fixture)
    }

    /// Set the default network source
    pub fn with_uri(self) -> Result<Self> {
        self.player
            .set_source(Some(MediaSource::Uri(TEST_URI.to_string())))?;
        Ok(self)
    }
}

/// Records every event published by a player
pub struct EventRecorder {
    events: Arc<Mutex<Vec<PlayerEvent>>>,
    _subscription: EventSubscription,
}

impl EventRecorder {
    pub fn attach(player: &MediaPlayer) -> Self {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let subscription = player.subscribe_events(move |event| sink.lock().push(event));

        Self {
            events,
            _subscription: subscription,
        }
    }

    pub fn all(&self) -> Vec<PlayerEvent> {
        self.events.lock().clone()
    }

    pub fn count(&self, event: &PlayerEvent) -> usize {
        self.events.lock().iter().filter(|e| *e == event).count()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

/// Media file on disk for file-source tests
pub struct MediaFile {
    _dir: TempDir,
    pub path: PathBuf,
}

impl MediaFile {
    pub fn create() -> Result<Self> {
        let dir = TempDir::new()?;
        let path = dir.path().join("clip.ts");
        std::fs::write(&path, b"\x47\x40\x00\x10")?;
        Ok(Self { _dir: dir, path })
    }
}

/// Poll `condition` until it holds, yielding to background tasks in between
///
/// Panics after two seconds.
pub async fn wait_until<F>(mut condition: F)
where
    F: FnMut() -> bool,
{
    let poll = async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    };
    if tokio::time::timeout(Duration::from_secs(2), poll)
        .await
        .is_err()
    {
        panic!("condition not reached within 2s");
    }
}

/// Let spawned tasks run for a few scheduler turns
pub async fn settle_tasks() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}
