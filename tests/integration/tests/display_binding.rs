//! Integration tests for display binding
//!
//! These tests verify that the engine output follows the bound view:
//! embedded surfaces, overlay regions, aspect changes and rebinding.

use anyhow::Result;
use std::sync::Arc;
use tvplayer::native::{
    DisplayMode, NativeCommand, NativeDisplay, PixelRect, SurfaceHandle, WindowHandle,
};
use tvplayer::utils::PlayerConfig;
use tvplayer::{
    AspectMode, HeadlessMediaView, HeadlessOverlayView, MediaView, NativePlayer, NativeState, Rect,
};
use tvplayer_integration_tests::{settle_tasks, wait_until, TestFixture};

fn overlay(area: Rect) -> Arc<HeadlessOverlayView> {
    Arc::new(HeadlessOverlayView::new(SurfaceHandle(1), area))
}

#[tokio::test]
async fn test_embedded_view_gets_surface() -> Result<()> {
    let f = TestFixture::new()?.with_uri()?;
    let view = Arc::new(HeadlessMediaView::new(SurfaceHandle(3)));
    f.player.set_display(Some(view as Arc<dyn MediaView>));

    assert!(f.player.start().await);
    assert_eq!(f.engine.display(), NativeDisplay::Surface(SurfaceHandle(3)));
    assert_eq!(f.engine.display_mode(), DisplayMode::LetterBox);
    assert!(!f.player.display_target().is_overlay());

    Ok(())
}

#[tokio::test]
async fn test_overlay_view_sets_region() -> Result<()> {
    let f = TestFixture::new()?.with_uri()?;
    let view = overlay(Rect::new(10.0, 20.0, 300.0, 200.0));
    f.player.set_display(Some(view as Arc<dyn MediaView>));

    assert!(f.player.start().await);
    assert!(f.player.display_target().is_overlay());
    assert_eq!(f.engine.display(), NativeDisplay::Window(WindowHandle(1)));
    assert_eq!(f.engine.display_mode(), DisplayMode::Roi);
    assert_eq!(
        f.engine.roi(),
        PixelRect {
            x: 10,
            y: 20,
            width: 300,
            height: 200
        }
    );

    Ok(())
}

#[tokio::test]
async fn test_switch_from_overlay_to_embedded() -> Result<()> {
    let f = TestFixture::new()?.with_uri()?;
    let first = overlay(Rect::new(0.0, 0.0, 640.0, 360.0));
    f.player.set_display(Some(first.clone() as Arc<dyn MediaView>));
    assert!(f.player.start().await);
    assert_eq!(first.area_listener_count(), 1);

    let second = Arc::new(HeadlessMediaView::new(SurfaceHandle(2)));
    f.player.set_display(Some(second.clone() as Arc<dyn MediaView>));

    assert_eq!(f.engine.display(), NativeDisplay::Surface(SurfaceHandle(2)));
    assert_eq!(f.engine.display_mode(), DisplayMode::LetterBox);
    assert_eq!(first.area_listener_count(), 0);
    assert_eq!(first.listener_count(), 0);
    assert_eq!(second.listener_count(), 1);

    f.engine.clear_commands();
    first.set_overlay_area(Rect::new(5.0, 5.0, 100.0, 100.0));
    settle_tasks().await;
    assert!(f.engine.commands().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_fill_on_empty_overlay_matches_embedded() -> Result<()> {
    let config = PlayerConfig {
        aspect_mode: AspectMode::Fill,
        ..PlayerConfig::default()
    };

    let overlaid = TestFixture::with_config(config.clone())?.with_uri()?;
    overlaid
        .player
        .set_display(Some(overlay(Rect::default()) as Arc<dyn MediaView>));
    assert!(overlaid.player.start().await);

    let embedded = TestFixture::with_config(config)?.with_uri()?;
    embedded.player.set_display(Some(
        Arc::new(HeadlessMediaView::new(SurfaceHandle(1))) as Arc<dyn MediaView>,
    ));
    assert!(embedded.player.start().await);

    assert_eq!(overlaid.engine.display_mode(), DisplayMode::CroppedFull);
    assert_eq!(
        overlaid.engine.display_mode(),
        embedded.engine.display_mode()
    );
    assert_eq!(overlaid.engine.count(&NativeCommand::SetDisplayMode(DisplayMode::Roi)), 0);

    Ok(())
}

#[tokio::test]
async fn test_area_update_while_preparing_applies_after_prepare() -> Result<()> {
    let f = TestFixture::held()?.with_uri()?;
    let view = overlay(Rect::new(0.0, 0.0, 640.0, 360.0));
    f.player.set_display(Some(view.clone() as Arc<dyn MediaView>));

    let start = tokio::spawn({
        let player = f.player.clone();
        async move { player.start().await }
    });
    wait_until(|| f.engine.state() == NativeState::Preparing).await;

    let moved = PixelRect {
        x: 100,
        y: 50,
        width: 320,
        height: 180,
    };
    view.set_overlay_area(Rect::new(100.0, 50.0, 320.0, 180.0));
    settle_tasks().await;
    assert_eq!(f.engine.count(&NativeCommand::SetRoi(moved)), 0);

    f.engine.release_prepare();
    assert!(start.await?);
    wait_until(|| f.engine.roi() == moved).await;
    assert_eq!(f.engine.count(&NativeCommand::SetRoi(moved)), 1);

    Ok(())
}

#[tokio::test]
async fn test_aspect_change_while_playing() -> Result<()> {
    let f = TestFixture::new()?.with_uri()?;
    f.player.set_display(Some(
        Arc::new(HeadlessMediaView::new(SurfaceHandle(1))) as Arc<dyn MediaView>,
    ));
    assert!(f.player.start().await);

    f.player.set_aspect_mode(AspectMode::Stretch);
    assert_eq!(f.player.aspect_mode(), AspectMode::Stretch);
    assert_eq!(f.engine.display_mode(), DisplayMode::FullScreen);

    f.player.set_aspect_mode(AspectMode::OriginalSize);
    assert_eq!(f.engine.display_mode(), DisplayMode::OriginalOrFull);

    Ok(())
}

#[tokio::test]
async fn test_clear_display_while_playing() -> Result<()> {
    let f = TestFixture::new()?.with_uri()?;
    let view = Arc::new(HeadlessMediaView::new(SurfaceHandle(4)));
    f.player.set_display(Some(view.clone() as Arc<dyn MediaView>));
    assert!(f.player.start().await);

    f.player.set_display(None);

    assert_eq!(f.engine.display(), NativeDisplay::None);
    assert_eq!(view.listener_count(), 0);
    assert_eq!(f.player.state(), NativeState::Playing);

    Ok(())
}
