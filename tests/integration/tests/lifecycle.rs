//! Integration tests for the playback lifecycle
//!
//! These tests verify:
//! - Prepare serialization under concurrent starts
//! - Stop racing an in-flight prepare
//! - Event ordering
//! - Completion and buffering handling
//! - Renderer-driven auto play and auto stop

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tvplayer::native::{NativeCommand, NativeDisplay, NativeSource, SurfaceHandle};
use tvplayer::utils::PlayerConfig;
use tvplayer::{HeadlessMediaView, MediaSource, MediaView, NativePlayer, NativeState, PlayerEvent};
use tvplayer_integration_tests::{settle_tasks, wait_until, MediaFile, TestFixture};

#[tokio::test]
async fn test_initial_state() -> Result<()> {
    let f = TestFixture::new()?;

    assert_eq!(f.player.state(), NativeState::Idle);
    assert_eq!(f.player.position(), 0);
    assert_eq!(f.player.duration(), 0);
    assert!(!f.player.start().await);
    assert!(f.engine.commands().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_concurrent_starts_prepare_once() -> Result<()> {
    let f = TestFixture::held()?.with_uri()?;

    let first = tokio::spawn({
        let player = f.player.clone();
        async move { player.start().await }
    });
    let second = tokio::spawn({
        let player = f.player.clone();
        async move { player.start().await }
    });

    wait_until(|| f.engine.state() == NativeState::Preparing).await;
    settle_tasks().await;
    f.engine.release_prepare();

    assert!(first.await?);
    assert!(second.await?);
    assert_eq!(f.engine.count(&NativeCommand::Prepare), 1);
    assert_eq!(f.player.state(), NativeState::Playing);
    assert_eq!(f.events.count(&PlayerEvent::UpdateStreamInfo), 1);

    Ok(())
}

#[tokio::test]
async fn test_stop_while_preparing_waits_for_prepare() -> Result<()> {
    let f = TestFixture::held()?.with_uri()?;

    let start = tokio::spawn({
        let player = f.player.clone();
        async move { player.start().await }
    });
    wait_until(|| f.engine.state() == NativeState::Preparing).await;

    f.player.stop();
    settle_tasks().await;
    assert_eq!(f.player.state(), NativeState::Preparing);
    assert_eq!(f.engine.count(&NativeCommand::Unprepare), 0);
    assert_eq!(f.events.count(&PlayerEvent::PlaybackStopped), 1);

    f.engine.release_prepare();
    assert!(!start.await?);
    f.player.wait_settled().await;

    assert_eq!(f.player.state(), NativeState::Idle);
    assert_eq!(f.engine.count(&NativeCommand::Start), 0);
    assert_eq!(f.engine.count(&NativeCommand::Unprepare), 1);
    assert_eq!(f.events.count(&PlayerEvent::PlaybackStarted), 0);

    Ok(())
}

#[tokio::test]
async fn test_stop_right_after_start_never_starts() -> Result<()> {
    let f = TestFixture::new()?.with_uri()?;

    let (started, _) = tokio::join!(f.player.start(), async { f.player.stop() });
    f.player.wait_settled().await;

    assert!(!started);
    assert_eq!(f.engine.count(&NativeCommand::Start), 0);
    assert_eq!(f.player.state(), NativeState::Idle);

    Ok(())
}

#[tokio::test]
async fn test_start_after_stop_plays() -> Result<()> {
    let f = TestFixture::new()?.with_uri()?;
    assert!(f.player.start().await);

    f.player.stop();
    assert!(f.player.start().await);

    assert_eq!(f.player.state(), NativeState::Playing);
    assert_eq!(f.engine.count(&NativeCommand::Prepare), 2);
    assert_eq!(f.engine.count(&NativeCommand::Unprepare), 1);

    Ok(())
}

#[tokio::test]
async fn test_abandoned_start_does_not_wedge_the_player() -> Result<()> {
    let f = TestFixture::held()?.with_uri()?;

    let abandoned = tokio::time::timeout(Duration::from_millis(20), f.player.start()).await;
    assert!(abandoned.is_err());
    assert_eq!(f.player.state(), NativeState::Preparing);

    f.player.stop();
    settle_tasks().await;
    assert_eq!(f.engine.count(&NativeCommand::Unprepare), 0);

    f.engine.release_prepare();
    f.player.wait_settled().await;
    assert_eq!(f.player.state(), NativeState::Idle);
    assert_eq!(f.engine.count(&NativeCommand::Unprepare), 1);
    assert_eq!(f.engine.count(&NativeCommand::Start), 0);

    f.engine.release_prepare();
    assert!(f.player.start().await);
    assert_eq!(f.player.state(), NativeState::Playing);
    assert_eq!(f.engine.count(&NativeCommand::Prepare), 2);

    Ok(())
}

#[tokio::test]
async fn test_abandoned_start_still_prepares() -> Result<()> {
    let f = TestFixture::held()?.with_uri()?;

    let abandoned = tokio::time::timeout(Duration::from_millis(20), f.player.start()).await;
    assert!(abandoned.is_err());

    f.engine.release_prepare();
    wait_until(|| f.player.state() == NativeState::Ready).await;
    f.player.wait_settled().await;

    assert!(f.player.start().await);
    assert_eq!(f.engine.count(&NativeCommand::Prepare), 1);
    assert_eq!(f.events.count(&PlayerEvent::UpdateStreamInfo), 1);

    Ok(())
}

#[tokio::test]
async fn test_seek_in_idle_reports_zero() -> Result<()> {
    let f = TestFixture::new()?.with_uri()?;

    assert_eq!(f.player.position(), 0);
    assert_eq!(f.player.seek(5_000).await, 0);
    assert_eq!(f.player.position(), 0);
    assert_eq!(f.player.state(), NativeState::Idle);

    Ok(())
}

#[tokio::test]
async fn test_seek_while_preparing_reports_zero() -> Result<()> {
    let f = TestFixture::held()?.with_uri()?;

    let start = tokio::spawn({
        let player = f.player.clone();
        async move { player.start().await }
    });
    wait_until(|| f.engine.state() == NativeState::Preparing).await;

    assert_eq!(f.player.position(), 0);
    assert_eq!(f.player.seek(5_000).await, 0);
    assert_eq!(f.player.position(), 0);
    assert_eq!(f.player.state(), NativeState::Preparing);

    f.engine.release_prepare();
    assert!(start.await?);
    assert_eq!(f.player.position(), 0);

    Ok(())
}

#[tokio::test]
async fn test_playback_session_events() -> Result<()> {
    let f = TestFixture::new()?.with_uri()?;

    assert!(f.player.start().await);
    assert_eq!(f.player.duration(), 60_000);
    assert_eq!(f.player.position(), 0);
    assert_eq!(f.player.seek(30_000).await, 30_000);

    f.player.pause();
    assert_eq!(f.player.state(), NativeState::Paused);
    assert!(f.player.start().await);

    assert_eq!(
        f.events.all(),
        vec![
            PlayerEvent::UpdateStreamInfo,
            PlayerEvent::PlaybackStarted,
            PlayerEvent::PlaybackPaused,
            PlayerEvent::PlaybackStarted,
        ]
    );
    assert_eq!(f.engine.count(&NativeCommand::Prepare), 1);

    Ok(())
}

#[tokio::test]
async fn test_completion_pauses_and_rewinds() -> Result<()> {
    let f = TestFixture::new()?.with_uri()?;
    assert!(f.player.start().await);
    f.events.clear();

    f.engine.complete();
    wait_until(|| f.engine.count(&NativeCommand::Seek(0)) == 1).await;
    wait_until(|| f.player.position() == 0).await;

    assert_eq!(f.player.state(), NativeState::Paused);
    assert_eq!(
        f.events.all(),
        vec![PlayerEvent::PlaybackCompleted, PlayerEvent::PlaybackPaused]
    );

    Ok(())
}

#[tokio::test]
async fn test_buffering_progress_is_a_fraction() -> Result<()> {
    let f = TestFixture::new()?;

    f.engine.emit_buffering(45);
    f.engine.emit_buffering(150);

    assert_eq!(
        f.events.all(),
        vec![
            PlayerEvent::BufferingProgressUpdated { progress: 0.45 },
            PlayerEvent::BufferingProgressUpdated { progress: 1.0 },
        ]
    );

    Ok(())
}

#[tokio::test]
async fn test_failed_prepare_reports_false() -> Result<()> {
    let f = TestFixture::new()?.with_uri()?;
    f.engine.set_fail_prepare(true);

    assert!(!f.player.start().await);
    assert_eq!(f.player.state(), NativeState::Idle);
    assert_eq!(f.engine.count(&NativeCommand::Start), 0);
    assert_eq!(f.events.count(&PlayerEvent::UpdateStreamInfo), 0);

    Ok(())
}

#[tokio::test]
async fn test_file_source() -> Result<()> {
    let file = MediaFile::create()?;
    let f = TestFixture::new()?;
    f.player
        .set_source(Some(MediaSource::File(file.path.clone())))?;

    assert!(f.player.start().await);
    assert_eq!(f.engine.source(), Some(NativeSource::Path(file.path.clone())));

    Ok(())
}

#[tokio::test]
async fn test_missing_file_fails_before_prepare() -> Result<()> {
    let f = TestFixture::new()?;
    f.player
        .set_source(Some(MediaSource::File("/nonexistent/clip.ts".into())))?;

    assert!(!f.player.start().await);
    assert_eq!(f.engine.count(&NativeCommand::Prepare), 0);
    assert_eq!(f.player.state(), NativeState::Idle);

    Ok(())
}

#[tokio::test]
async fn test_stop_in_idle_is_harmless() -> Result<()> {
    let f = TestFixture::new()?;

    f.player.stop();
    f.player.wait_settled().await;

    assert!(f.engine.commands().is_empty());
    assert_eq!(f.events.all(), vec![PlayerEvent::PlaybackStopped]);

    Ok(())
}

#[tokio::test]
async fn test_auto_play_and_auto_stop() -> Result<()> {
    let f = TestFixture::with_config(PlayerConfig {
        auto_play: true,
        auto_stop: true,
        ..PlayerConfig::default()
    })?
    .with_uri()?;

    let view = Arc::new(HeadlessMediaView::detached());
    f.player.set_display(Some(view.clone() as Arc<dyn MediaView>));
    assert_eq!(f.player.state(), NativeState::Idle);

    view.attach_renderer(SurfaceHandle(7));
    wait_until(|| f.player.state() == NativeState::Playing).await;
    assert_eq!(f.engine.display(), NativeDisplay::Surface(SurfaceHandle(7)));

    view.detach_renderer();
    f.player.wait_settled().await;
    assert_eq!(f.player.state(), NativeState::Idle);

    Ok(())
}

#[tokio::test]
async fn test_auto_play_needs_a_source() -> Result<()> {
    let f = TestFixture::with_config(PlayerConfig {
        auto_play: true,
        ..PlayerConfig::default()
    })?;

    let view = Arc::new(HeadlessMediaView::detached());
    f.player.set_display(Some(view.clone() as Arc<dyn MediaView>));
    view.attach_renderer(SurfaceHandle(7));
    settle_tasks().await;

    assert_eq!(f.player.state(), NativeState::Idle);
    assert!(f.engine.commands().is_empty());

    Ok(())
}
