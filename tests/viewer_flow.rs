//! End-to-end coordinator tests against the simulated driver and backend.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use thermview::backend::InputEvent;
use thermview::driver::{CameraDevice, CameraManager, ColorPalette};
use thermview::testing::{synthetic_frame_for_chip, BackendCall, SimBackend, SimCamera, SimManager};
use thermview::types::DiscoveryMode;
use thermview::{LifecycleHandler, PresentationLoop, RenderEventKind, ViewerContext};

#[test]
fn test_connect_frame_click_disconnect_flow() {
    let ctx = Arc::new(ViewerContext::with_capacity(4, true));
    let handler = LifecycleHandler::new(ctx.clone());
    let mut looper = PresentationLoop::new(ctx.clone());
    let mut backend = SimBackend::new();

    // Connect: a session opens with the default selections.
    let camera = SimCamera::new("CID1");
    handler.on_connect(camera.clone());

    let open = ctx.events.pop_timeout(Duration::from_secs(1)).unwrap();
    assert_eq!(open.kind, RenderEventKind::SessionOpen);
    let session = open.session.clone();
    assert!(session.is_active());
    {
        let settings = session.lock_settings();
        assert_eq!(settings.palette.current_name(), "tyrian");
        assert_eq!(settings.agc.current_name(), "histeq");
        assert_eq!(settings.shutter.current_name(), "auto");
    }
    looper.handle_render_event(&mut backend, open);

    // A 150x200 frame arrives: texture allocated at raw size, surface shown
    // at 2x scale, one textured present.
    camera.deliver_frame(synthetic_frame_for_chip("CID1", 0, 150, 200));
    let frame_event = ctx.events.pop_timeout(Duration::from_secs(1)).unwrap();
    assert_eq!(frame_event.kind, RenderEventKind::FrameReady);
    looper.handle_render_event(&mut backend, frame_event);

    let calls = backend.take_calls();
    assert!(calls.iter().any(|c| matches!(
        c,
        BackendCall::CreateTexture {
            width: 150,
            height: 200,
            ..
        }
    )));
    assert!(calls.iter().any(|c| matches!(
        c,
        BackendCall::ResizeSurface {
            width: 300,
            height: 400,
            ..
        }
    )));
    assert_eq!(
        calls
            .iter()
            .filter(|c| matches!(c, BackendCall::Present { texture: Some(_), .. }))
            .count(),
        1
    );

    // Pointer click advances the palette past "tyrian".
    let surface = session.lock_surface().surface.unwrap();
    looper.handle_input(&mut backend, InputEvent::PointerClick(surface));
    assert_eq!(session.lock_settings().palette.current_name(), "white-hot");
    assert_eq!(camera.applied_palette(), Some(ColorPalette::WhiteHot));

    // Disconnect: the record recycles and, as the last session, requests
    // shutdown.
    handler.on_disconnect(camera);
    let close = ctx.events.pop_timeout(Duration::from_secs(1)).unwrap();
    assert_eq!(close.kind, RenderEventKind::SessionClose);
    looper.handle_render_event(&mut backend, close);

    assert!(!session.is_active());
    assert_eq!(ctx.pool.count_active(), 0);
    assert!(ctx.shutdown_requested());
}

#[test]
fn test_pool_exhaustion_leaves_existing_sessions_intact() {
    let capacity = 2;
    let ctx = Arc::new(ViewerContext::with_capacity(capacity, true));
    let handler = LifecycleHandler::new(ctx.clone());

    let cameras: Vec<_> = (0..capacity + 1)
        .map(|i| SimCamera::new(&format!("CID{i}")))
        .collect();
    for camera in &cameras {
        handler.on_connect(camera.clone());
    }

    // Only the first `capacity` connects produced sessions.
    assert_eq!(ctx.pool.count_active(), capacity);
    for camera in cameras.iter().take(capacity) {
        let record = ctx.pool.find_by_device(&camera.chip_id()).unwrap();
        assert!(record.is_active());
        assert_eq!(camera.start_count(), 1);
    }
    let overflow = &cameras[capacity];
    assert!(ctx.pool.find_by_device(&overflow.chip_id()).is_none());
    assert_eq!(overflow.start_count(), 0);

    // Exactly one SessionOpen per accepted connect, nothing for the overflow.
    let mut opens = 0;
    while let Some(event) = ctx.events.pop_timeout(Duration::ZERO) {
        assert_eq!(event.kind, RenderEventKind::SessionOpen);
        opens += 1;
    }
    assert_eq!(opens, capacity);
}

#[test]
fn test_threaded_lifecycle_shuts_down_after_last_close() {
    let ctx = Arc::new(ViewerContext::with_capacity(4, true));
    let manager = SimManager::new(DiscoveryMode::Usb).unwrap();
    manager
        .register_event_callback(LifecycleHandler::new(ctx.clone()).into_event_callback())
        .unwrap();

    let camera = SimCamera::new("CID1");

    thread::scope(|s| {
        let script_camera = camera.clone();
        let manager = &manager;
        s.spawn(move || {
            manager.connect(&script_camera);
            // Wait until the connect handler has started the capture session.
            while !script_camera.is_capturing() {
                thread::sleep(Duration::from_millis(10));
            }
            for n in 0..3 {
                script_camera.deliver_frame(synthetic_frame_for_chip("CID1", n, 150, 200));
                thread::sleep(Duration::from_millis(30));
            }
            manager.disconnect(&script_camera);
        });

        let mut looper = PresentationLoop::new(ctx.clone());
        let mut backend = SimBackend::new();
        looper.run(&mut backend);

        assert!(ctx.shutdown_requested());
        assert_eq!(ctx.pool.count_active(), 0);
        assert_eq!(backend.live_surfaces(), 0);
        assert_eq!(backend.live_textures(), 0);
        assert!(backend
            .calls()
            .iter()
            .any(|c| matches!(c, BackendCall::Present { texture: Some(_), .. })));
    });
}

#[test]
fn test_window_close_on_one_of_two_sessions_keeps_running() {
    let ctx = Arc::new(ViewerContext::with_capacity(4, true));
    let handler = LifecycleHandler::new(ctx.clone());
    let mut looper = PresentationLoop::new(ctx.clone());
    let mut backend = SimBackend::new();

    let first = SimCamera::new("CID1");
    let second = SimCamera::new("CID2");
    handler.on_connect(first.clone());
    handler.on_connect(second);
    for _ in 0..2 {
        let event = ctx.events.pop_timeout(Duration::from_secs(1)).unwrap();
        looper.handle_render_event(&mut backend, event);
    }

    let record = ctx.pool.find_by_device(&first.chip_id()).unwrap();
    let surface = record.lock_surface().surface.unwrap();
    looper.handle_input(&mut backend, InputEvent::CloseRequested(surface));

    assert_eq!(first.stop_count(), 1);
    assert_eq!(ctx.pool.count_active(), 1);
    assert!(!ctx.shutdown_requested());
}
