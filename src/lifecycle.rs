//! Device lifecycle handling.
//!
//! Every entry point here runs on a driver-owned thread, never on the
//! presentation thread. Handlers mutate session records and enqueue render
//! events; they never touch the presentation backend. Failures terminate at
//! this boundary with log output rather than crossing threads.

use std::io::Write;
use std::sync::Arc;

use crate::channel::{RenderEvent, RenderEventKind};
use crate::context::ViewerContext;
use crate::driver::{CameraDevice, CameraEvent, DriverError, EventCallback, FrameCallback};

#[derive(Clone)]
pub struct LifecycleHandler {
    ctx: Arc<ViewerContext>,
}

impl LifecycleHandler {
    pub fn new(ctx: Arc<ViewerContext>) -> Self {
        Self { ctx }
    }

    /// Package this handler as the manager's single event callback.
    pub fn into_event_callback(self) -> EventCallback {
        Box::new(move |camera, event| self.handle_event(camera, event))
    }

    /// Dispatch one manager event, logging identity and firmware the way the
    /// manager reports them.
    pub fn handle_event(&self, camera: Arc<dyn CameraDevice>, event: CameraEvent) {
        log::info!(
            "{} (CID: {}, FW: {})",
            event.as_str(),
            camera.chip_id(),
            camera.firmware_version()
        );

        match event {
            CameraEvent::Connect => self.on_connect(camera),
            CameraEvent::Disconnect => self.on_disconnect(camera),
            CameraEvent::Error(error) => self.on_error(camera, error),
            CameraEvent::ReadyToPair => self.on_ready_to_pair(camera),
        }
    }

    /// Bind the camera to a free session record and start imaging.
    pub fn on_connect(&self, camera: Arc<dyn CameraDevice>) {
        let record = match self.ctx.pool.acquire_free() {
            Some(record) => record,
            None => {
                log::error!("session pool is exhausted");
                return;
            }
        };

        record.activate(camera.clone());

        // The callback captures the record directly, so frame delivery never
        // needs a pool lookup.
        let frame_record = record.clone();
        let frame_ctx = self.ctx.clone();
        let callback: FrameCallback = Box::new(move |frame| {
            if frame_record.store_frame(frame) {
                log::debug!("dropped unconsumed frame");
            }
            frame_ctx
                .events
                .push(RenderEvent::new(RenderEventKind::FrameReady, frame_record.clone()));
        });

        if let Err(error) = camera.register_frame_callback(callback) {
            log::error!("failed to register frame callback: {error}");
            record.deactivate();
            return;
        }

        if let Err(error) = camera.start_capture(record.frame_format()) {
            log::error!("failed to start capture session: {error}");
            record.deactivate();
            return;
        }

        // Apply failures are non-fatal: imaging continues with whatever the
        // device defaulted to.
        if let Err(error) = record.apply_palette() {
            log::warn!("failed to set color palette: {error}");
        }
        if let Err(error) = record.apply_agc() {
            log::warn!("failed to set agc mode: {error}");
        }
        if let Err(error) = record.apply_shutter() {
            log::warn!("failed to set shutter mode: {error}");
        }

        self.ctx
            .events
            .push(RenderEvent::new(RenderEventKind::SessionOpen, record));
    }

    /// Release the record bound to a disconnected camera. No-op when the
    /// camera is unknown; disconnect may race a prior teardown.
    pub fn on_disconnect(&self, camera: Arc<dyn CameraDevice>) {
        let record = match self.ctx.pool.find_by_device(&camera.chip_id()) {
            Some(record) => record,
            None => return,
        };

        // The driver considers the handle dead after this event, so any
        // pending frame reference dies with it.
        record.deactivate();

        self.ctx
            .events
            .push(RenderEvent::new(RenderEventKind::SessionClose, record));
    }

    /// Recover from transient device errors; degrade persistent failures to
    /// a clean disconnect.
    pub fn on_error(&self, camera: Arc<dyn CameraDevice>, error: DriverError) {
        let record = match self.ctx.pool.find_by_device(&camera.chip_id()) {
            Some(record) => record,
            None => return,
        };

        if error.kind.is_transient() {
            log::error!("failed to communicate with device: {error}");
            if record.is_active() {
                log::warn!("restarting capture session");
                if let Err(restart_error) = record.restart_capture() {
                    log::error!("failed to restart capture session: {restart_error}");
                    self.on_disconnect(camera);
                }
            }
        } else if error.kind == crate::driver::DriverErrorKind::NotPaired {
            log::warn!("device is unpaired - pair the device before imaging");
        } else {
            log::warn!("unhandled camera error: {error}");
        }
    }

    /// Pair the camera's calibration data when auto-pairing is enabled, then
    /// connect regardless so the device still attempts to stream.
    pub fn on_ready_to_pair(&self, camera: Arc<dyn CameraDevice>) {
        if self.ctx.auto_pair() {
            let mut progress = |percent: u8| {
                if percent == 100 {
                    println!("pairing {percent}% complete");
                } else {
                    print!("pairing {percent}% complete\r");
                    let _ = std::io::stdout().flush();
                }
            };
            if let Err(error) = camera.store_calibration_data(&mut progress) {
                log::error!("failed to pair device: {error}");
            }
        } else {
            println!("device is unpaired - pair the device before imaging");
        }

        self.on_connect(camera);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{synthetic_frame, SimCamera};
    use std::time::Duration;

    fn setup(capacity: usize) -> (Arc<ViewerContext>, LifecycleHandler) {
        let ctx = Arc::new(ViewerContext::with_capacity(capacity, true));
        let handler = LifecycleHandler::new(ctx.clone());
        (ctx, handler)
    }

    fn next_kind(ctx: &ViewerContext) -> Option<RenderEventKind> {
        ctx.events.pop_timeout(Duration::ZERO).map(|e| e.kind)
    }

    #[test]
    fn test_connect_activates_record_and_enqueues_open() {
        let (ctx, handler) = setup(4);
        let camera = SimCamera::new("CID1");
        handler.on_connect(camera.clone());

        let event = ctx.events.pop_timeout(Duration::ZERO).unwrap();
        assert_eq!(event.kind, RenderEventKind::SessionOpen);
        assert!(event.session.is_active());
        assert_eq!(event.session.chip_id().as_deref(), Some("CID1"));

        // Defaults were pushed to the device on connect.
        assert_eq!(
            camera.applied_palette(),
            Some(crate::driver::ColorPalette::Tyrian)
        );
        assert_eq!(camera.applied_agc(), Some(crate::driver::AgcMode::HistEq));
        assert_eq!(
            camera.applied_shutter(),
            Some(crate::driver::ShutterMode::Auto)
        );
        assert_eq!(camera.start_count(), 1);
    }

    #[test]
    fn test_connect_with_exhausted_pool_leaves_slots_intact() {
        let (ctx, handler) = setup(1);
        handler.on_connect(SimCamera::new("CID1"));
        assert_eq!(next_kind(&ctx), Some(RenderEventKind::SessionOpen));

        handler.on_connect(SimCamera::new("CID2"));
        assert_eq!(next_kind(&ctx), None);
        assert_eq!(ctx.pool.count_active(), 1);
        assert!(ctx.pool.find_by_device(&"CID1".to_string()).is_some());
        assert!(ctx.pool.find_by_device(&"CID2".to_string()).is_none());
    }

    #[test]
    fn test_connect_failure_releases_record() {
        let (ctx, handler) = setup(1);
        let camera = SimCamera::new("CID1");
        camera.fail_start_capture(true);
        handler.on_connect(camera);

        assert_eq!(next_kind(&ctx), None);
        assert_eq!(ctx.pool.count_active(), 0);
    }

    #[test]
    fn test_frame_delivery_keeps_only_newest_frame() {
        let (ctx, handler) = setup(4);
        let camera = SimCamera::new("CID1");
        handler.on_connect(camera.clone());
        let open = ctx.events.pop_timeout(Duration::ZERO).unwrap();

        camera.deliver_frame(synthetic_frame(0, 150, 200));
        camera.deliver_frame(synthetic_frame(1, 152, 204));

        assert_eq!(next_kind(&ctx), Some(RenderEventKind::FrameReady));
        assert_eq!(next_kind(&ctx), Some(RenderEventKind::FrameReady));

        let slot = open.session.lock_frame();
        let pending = slot.as_ref().expect("one frame pending");
        assert_eq!(pending.width(), 152);
        assert_eq!(pending.height(), 204);
    }

    #[test]
    fn test_disconnect_recycles_record() {
        let (ctx, handler) = setup(4);
        let camera = SimCamera::new("CID1");
        handler.on_connect(camera.clone());
        assert_eq!(next_kind(&ctx), Some(RenderEventKind::SessionOpen));

        handler.on_disconnect(camera.clone());
        let event = ctx.events.pop_timeout(Duration::ZERO).unwrap();
        assert_eq!(event.kind, RenderEventKind::SessionClose);
        assert!(!event.session.is_active());
        assert_eq!(ctx.pool.count_active(), 0);

        // Unknown disconnects are a no-op.
        handler.on_disconnect(camera);
        assert_eq!(next_kind(&ctx), None);
    }

    #[test]
    fn test_transient_error_restarts_capture() {
        let (ctx, handler) = setup(4);
        let camera = SimCamera::new("CID1");
        handler.on_connect(camera.clone());
        ctx.events.pop_timeout(Duration::ZERO);
        camera.clear_call_log();

        handler.on_error(camera.clone(), DriverError::timeout());
        assert_eq!(
            camera.call_log(),
            vec![
                "stop_capture",
                "set_color_palette",
                "set_agc_mode",
                "set_shutter_mode",
                "start_capture"
            ]
        );
        assert!(ctx.pool.find_by_device(&"CID1".to_string()).is_some());
    }

    #[test]
    fn test_failed_restart_degrades_to_disconnect() {
        let (ctx, handler) = setup(4);
        let camera = SimCamera::new("CID1");
        handler.on_connect(camera.clone());
        ctx.events.pop_timeout(Duration::ZERO);

        camera.fail_start_capture(true);
        handler.on_error(camera, DriverError::device_communication());

        assert_eq!(next_kind(&ctx), Some(RenderEventKind::SessionClose));
        assert_eq!(ctx.pool.count_active(), 0);
    }

    #[test]
    fn test_not_paired_error_is_reported_and_ignored() {
        let (ctx, handler) = setup(4);
        let camera = SimCamera::new("CID1");
        handler.on_connect(camera.clone());
        ctx.events.pop_timeout(Duration::ZERO);

        handler.on_error(camera, DriverError::not_paired());
        assert_eq!(next_kind(&ctx), None);
        assert_eq!(ctx.pool.count_active(), 1);
    }

    #[test]
    fn test_ready_to_pair_pairs_then_connects() {
        let (ctx, handler) = setup(4);
        let camera = SimCamera::new("CID1");
        handler.on_ready_to_pair(camera.clone());

        assert_eq!(camera.pair_count(), 1);
        assert_eq!(next_kind(&ctx), Some(RenderEventKind::SessionOpen));
    }

    #[test]
    fn test_pairing_failure_does_not_block_connect() {
        let (ctx, handler) = setup(4);
        let camera = SimCamera::new("CID1");
        camera.fail_pairing(true);
        handler.on_ready_to_pair(camera);

        assert_eq!(next_kind(&ctx), Some(RenderEventKind::SessionOpen));
    }

    #[test]
    fn test_auto_pair_disabled_skips_pairing() {
        let ctx = Arc::new(ViewerContext::with_capacity(4, false));
        let handler = LifecycleHandler::new(ctx.clone());
        let camera = SimCamera::new("CID1");
        handler.on_ready_to_pair(camera.clone());

        assert_eq!(camera.pair_count(), 0);
        assert_eq!(next_kind(&ctx), Some(RenderEventKind::SessionOpen));
    }
}
