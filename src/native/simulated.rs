//! Simulated native engine
//!
//! An in-memory engine that applies the same state rules as the hardware
//! player, records every command it receives and can hold `prepare` at a
//! gate. The demo binary plays against it and the tests assert on its
//! command log.

use crate::native::{
    DisplayMode, NativeDisplay, NativeEvent, NativeEventHandler, NativePlayer, NativeSource,
    NativeState, PixelRect,
};
use crate::utils::config::EngineConfig;
use crate::utils::error::{PlayerError, Result};
use async_trait::async_trait;
use log::debug;
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// A command received by the simulated engine, legal or not
#[derive(Debug, Clone, PartialEq)]
pub enum NativeCommand {
    SetSource(NativeSource),
    Prepare,
    Unprepare,
    Start,
    Pause,
    Stop,
    Seek(u32),
    SetDisplay(NativeDisplay),
    SetDisplayMode(DisplayMode),
    SetRoi(PixelRect),
    SetVolume(f32),
    SetMuted(bool),
}

#[derive(Debug)]
struct EngineState {
    state: NativeState,
    source: Option<NativeSource>,
    position_ms: u32,
    volume: f32,
    muted: bool,
    display: NativeDisplay,
    display_mode: DisplayMode,
    roi: PixelRect,
    commands: Vec<NativeCommand>,
}

impl Default for EngineState {
    fn default() -> Self {
        Self {
            state: NativeState::Idle,
            source: None,
            position_ms: 0,
            volume: 1.0,
            muted: false,
            display: NativeDisplay::None,
            display_mode: DisplayMode::LetterBox,
            roi: PixelRect::default(),
            commands: Vec::new(),
        }
    }
}

/// Software stand-in for the hardware media engine
pub struct SimulatedPlayer {
    engine: Mutex<EngineState>,
    duration_ms: u32,
    prepare_delay: Duration,
    seek_delay: Duration,
    fail_prepare: AtomicBool,
    prepare_gate: Mutex<Option<Arc<Semaphore>>>,
    handler: RwLock<Option<NativeEventHandler>>,
}

impl SimulatedPlayer {
    /// Engine with a 60s stream and no artificial delays
    pub fn new() -> Self {
        Self::from_config(&EngineConfig {
            prepare_delay_ms: 0,
            seek_delay_ms: 0,
            ..EngineConfig::default()
        })
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            engine: Mutex::new(EngineState::default()),
            duration_ms: config.duration_ms,
            prepare_delay: Duration::from_millis(config.prepare_delay_ms),
            seek_delay: Duration::from_millis(config.seek_delay_ms),
            fail_prepare: AtomicBool::new(config.fail_prepare),
            prepare_gate: Mutex::new(None),
            handler: RwLock::new(None),
        }
    }

    /// Make subsequent prepares fail (engine falls back to Idle)
    pub fn set_fail_prepare(&self, fail: bool) {
        self.fail_prepare.store(fail, Ordering::SeqCst);
    }

    /// Hold every subsequent prepare in Preparing until `release_prepare` is called
    pub fn hold_prepare(&self) {
        *self.prepare_gate.lock() = Some(Arc::new(Semaphore::new(0)));
    }

    /// Let one held prepare finish
    pub fn release_prepare(&self) {
        if let Some(gate) = self.prepare_gate.lock().as_ref() {
            gate.add_permits(1);
        }
    }

    /// Simulate end of stream: jump to the end and raise `PlaybackCompleted`
    pub fn complete(&self) {
        self.engine.lock().position_ms = self.duration_ms;
        self.emit(NativeEvent::PlaybackCompleted);
    }

    /// Raise a buffering progress callback
    pub fn emit_buffering(&self, percent: i32) {
        self.emit(NativeEvent::BufferingProgressChanged { percent });
    }

    pub fn commands(&self) -> Vec<NativeCommand> {
        self.engine.lock().commands.clone()
    }

    pub fn clear_commands(&self) {
        self.engine.lock().commands.clear();
    }

    /// Number of recorded commands equal to `command`
    pub fn count(&self, command: &NativeCommand) -> usize {
        self.engine
            .lock()
            .commands
            .iter()
            .filter(|c| *c == command)
            .count()
    }

    pub fn display(&self) -> NativeDisplay {
        self.engine.lock().display
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.engine.lock().display_mode
    }

    pub fn roi(&self) -> PixelRect {
        self.engine.lock().roi
    }

    pub fn source(&self) -> Option<NativeSource> {
        self.engine.lock().source.clone()
    }

    fn emit(&self, event: NativeEvent) {
        let handler = self.handler.read().clone();
        if let Some(handler) = handler {
            handler(event);
        }
    }

    /// Record `command`, then run `op` if the current state allows it
    fn command<T>(
        &self,
        command: NativeCommand,
        operation: &'static str,
        allowed: impl Fn(NativeState) -> bool,
        op: impl FnOnce(&mut EngineState) -> T,
    ) -> Result<T> {
        let mut engine = self.engine.lock();
        engine.commands.push(command);
        if !allowed(engine.state) {
            return Err(PlayerError::InvalidState {
                operation,
                state: engine.state,
            });
        }
        Ok(op(&mut engine))
    }
}

impl Default for SimulatedPlayer {
    fn default() -> Self {
        Self::new()
    }
}

fn not_preparing(state: NativeState) -> bool {
    state != NativeState::Preparing
}

#[async_trait]
impl NativePlayer for SimulatedPlayer {
    fn state(&self) -> NativeState {
        self.engine.lock().state
    }

    fn set_source(&self, source: NativeSource) -> Result<()> {
        self.command(
            NativeCommand::SetSource(source.clone()),
            "set_source",
            |s| s == NativeState::Idle,
            |engine| engine.source = Some(source),
        )
    }

    async fn prepare(&self) -> Result<()> {
        self.command(
            NativeCommand::Prepare,
            "prepare",
            |s| s == NativeState::Idle,
            |_| (),
        )?;
        {
            let mut engine = self.engine.lock();
            if engine.source.is_none() {
                return Err(PlayerError::engine_error("no source set"));
            }
            engine.state = NativeState::Preparing;
        }
        debug!("Simulated engine preparing");

        let gate = self.prepare_gate.lock().clone();
        if let Some(gate) = gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
        if !self.prepare_delay.is_zero() {
            tokio::time::sleep(self.prepare_delay).await;
        } else {
            tokio::task::yield_now().await;
        }

        let mut engine = self.engine.lock();
        if self.fail_prepare.load(Ordering::SeqCst) {
            engine.state = NativeState::Idle;
            return Err(PlayerError::engine_error("failed to open stream"));
        }
        engine.state = NativeState::Ready;
        engine.position_ms = 0;
        Ok(())
    }

    fn unprepare(&self) -> Result<()> {
        self.command(NativeCommand::Unprepare, "unprepare", not_preparing, |engine| {
            engine.state = NativeState::Idle;
            engine.position_ms = 0;
        })
    }

    fn start(&self) -> Result<()> {
        self.command(
            NativeCommand::Start,
            "start",
            NativeState::is_prepared,
            |engine| engine.state = NativeState::Playing,
        )
    }

    fn pause(&self) -> Result<()> {
        self.command(
            NativeCommand::Pause,
            "pause",
            |s| matches!(s, NativeState::Playing | NativeState::Paused),
            |engine| engine.state = NativeState::Paused,
        )
    }

    fn stop(&self) -> Result<()> {
        self.command(
            NativeCommand::Stop,
            "stop",
            |s| matches!(s, NativeState::Playing | NativeState::Paused),
            |engine| {
                engine.state = NativeState::Ready;
                engine.position_ms = 0;
            },
        )
    }

    async fn set_play_position(&self, ms: u32, _exact: bool) -> Result<()> {
        self.command(
            NativeCommand::Seek(ms),
            "set_play_position",
            NativeState::is_prepared,
            |_| (),
        )?;

        if !self.seek_delay.is_zero() {
            tokio::time::sleep(self.seek_delay).await;
        }

        let mut engine = self.engine.lock();
        if !engine.state.is_prepared() {
            return Err(PlayerError::engine_error("seek interrupted by unprepare"));
        }
        engine.position_ms = ms.min(self.duration_ms);
        Ok(())
    }

    fn play_position(&self) -> Result<u32> {
        let engine = self.engine.lock();
        if !engine.state.is_prepared() {
            return Err(PlayerError::InvalidState {
                operation: "play_position",
                state: engine.state,
            });
        }
        Ok(engine.position_ms)
    }

    fn duration(&self) -> Result<u32> {
        let state = self.engine.lock().state;
        if !state.is_prepared() {
            return Err(PlayerError::InvalidState {
                operation: "duration",
                state,
            });
        }
        Ok(self.duration_ms)
    }

    fn set_display(&self, display: NativeDisplay) -> Result<()> {
        self.command(
            NativeCommand::SetDisplay(display),
            "set_display",
            not_preparing,
            |engine| engine.display = display,
        )
    }

    fn set_display_mode(&self, mode: DisplayMode) -> Result<()> {
        self.command(
            NativeCommand::SetDisplayMode(mode),
            "set_display_mode",
            not_preparing,
            |engine| engine.display_mode = mode,
        )
    }

    fn set_roi(&self, rect: PixelRect) -> Result<()> {
        self.command(
            NativeCommand::SetRoi(rect),
            "set_roi",
            not_preparing,
            |engine| engine.roi = rect,
        )
    }

    fn volume(&self) -> f32 {
        self.engine.lock().volume
    }

    fn set_volume(&self, volume: f32) -> Result<()> {
        if !(0.0..=1.0).contains(&volume) {
            return Err(PlayerError::InvalidInput(format!(
                "volume {} out of range",
                volume
            )));
        }
        self.command(NativeCommand::SetVolume(volume), "set_volume", |_| true, |engine| {
            engine.volume = volume
        })
    }

    fn is_muted(&self) -> bool {
        self.engine.lock().muted
    }

    fn set_muted(&self, muted: bool) -> Result<()> {
        self.command(NativeCommand::SetMuted(muted), "set_muted", |_| true, |engine| {
            engine.muted = muted
        })
    }

    fn set_event_handler(&self, handler: NativeEventHandler) {
        *self.handler.write() = Some(handler);
    }
}
