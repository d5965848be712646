//! The presentation loop.
//!
//! Runs on exactly one thread, the only thread allowed to touch the
//! presentation backend. Each iteration waits up to 150 ms for a render
//! event, then drains pending backend input. The bounded wait keeps input
//! responsive while no camera events arrive, since input can only be polled
//! from this thread.

use std::sync::Arc;
use std::time::Duration;

use crate::backend::{InputEvent, Key, PresentationBackend};
use crate::channel::{RenderEvent, RenderEventKind};
use crate::context::ViewerContext;
use crate::session::SessionHandle;

/// Upper bound on one wait for a render event.
pub const EVENT_WAIT: Duration = Duration::from_millis(150);

/// Integer upscale applied to the raw frame size when sizing a surface.
const UPSCALE_FACTOR: u32 = 2;

/// Cascade offsets for newly created surfaces, used round-robin.
const SURFACE_POSITIONS: [(i32, i32); 6] = [
    (100, 100),
    (110, 110),
    (120, 120),
    (130, 130),
    (140, 140),
    (150, 150),
];

/// Print the control list to the console.
pub fn print_user_controls() {
    println!(
        "user controls:\n\
         \t1) mouse click: next color palette\n\
         \t2) c:           next color palette\n\
         \t3) a:           next agc mode\n\
         \t4) s:           next shutter mode\n\
         \t5) t:           trigger shutter (product dependent)\n\
         \t6) p:           print frame metadata from the header to the console\n\
         \t7) r:           restart capture session\n\
         \t8) h:           display this message\n\
         \t9) q:           quit"
    );
}

pub struct PresentationLoop {
    ctx: Arc<ViewerContext>,
    position_index: usize,
}

impl PresentationLoop {
    pub fn new(ctx: Arc<ViewerContext>) -> Self {
        Self {
            ctx,
            position_index: 0,
        }
    }

    /// Run until shutdown is requested.
    pub fn run(&mut self, backend: &mut dyn PresentationBackend) {
        while !self.ctx.shutdown_requested() {
            if let Some(event) = self.ctx.events.pop_timeout(EVENT_WAIT) {
                self.handle_render_event(backend, event);
            }

            while let Some(input) = backend.poll_input() {
                self.handle_input(backend, input);
            }
        }
    }

    /// Dispatch one render event.
    pub fn handle_render_event(&mut self, backend: &mut dyn PresentationBackend, event: RenderEvent) {
        match event.kind {
            RenderEventKind::SessionOpen => self.open_session(backend, &event.session),
            RenderEventKind::SessionClose => self.close_session(backend, &event.session),
            RenderEventKind::FrameReady => self.draw_frame(backend, &event.session),
        }
    }

    /// Dispatch one backend input event to the session owning its surface.
    pub fn handle_input(&mut self, backend: &mut dyn PresentationBackend, input: InputEvent) {
        let session = match self.ctx.pool.find_by_surface(input.surface()) {
            Some(session) => session,
            None => return,
        };

        match input {
            InputEvent::CloseRequested(_) => {
                if session.is_active() {
                    if let Some(camera) = session.camera() {
                        if let Err(error) = camera.stop_capture() {
                            log::warn!("failed to stop capture session: {error}");
                        }
                    }
                    session.deactivate();
                }
                self.teardown_surface(backend, &session);
                self.check_global_shutdown();
            }
            InputEvent::PointerClick(_) => self.switch_palette(&session),
            InputEvent::KeyUp(_, key) => self.handle_key(backend, &session, key),
        }
    }

    fn handle_key(
        &mut self,
        _backend: &mut dyn PresentationBackend,
        session: &SessionHandle,
        key: Key,
    ) {
        match key {
            Key::C => self.switch_palette(session),
            Key::A => match session.switch_agc() {
                Ok(name) => println!("agc mode: {name}"),
                Err(error) => log::error!("failed to set agc mode: {error}"),
            },
            Key::S => match session.switch_shutter() {
                Ok(name) => println!("shutter mode: {name}"),
                Err(error) => log::error!("failed to set shutter mode: {error}"),
            },
            Key::T => match session.trigger_shutter() {
                Ok(()) => println!("shutter triggered"),
                Err(error) => log::error!("failed to trigger shutter: {error}"),
            },
            Key::P => {
                if let Err(error) = session.request_print_metadata() {
                    log::error!("failed to print frame metadata: {error}");
                }
            }
            Key::R => match session.restart_capture() {
                Ok(()) => println!("restarted capture session"),
                Err(error) => log::error!("failed to restart capture session: {error}"),
            },
            Key::H => print_user_controls(),
            Key::Q => self.ctx.request_shutdown(),
            Key::Other => {}
        }
    }

    fn switch_palette(&self, session: &SessionHandle) {
        match session.switch_palette() {
            Ok(name) => println!("color palette: {name}"),
            Err(error) => log::error!("failed to set color palette: {error}"),
        }
    }

    /// Create the presentation surface for a newly opened session: hidden and
    /// zero-sized until the first frame arrives, cleared to black.
    fn open_session(&mut self, backend: &mut dyn PresentationBackend, session: &SessionHandle) {
        let (x, y) = SURFACE_POSITIONS[self.position_index];
        self.position_index = (self.position_index + 1) % SURFACE_POSITIONS.len();

        let title = match session.camera() {
            Some(camera) => format!(
                "Thermal Viewer (CID: {}, FW: {})",
                camera.chip_id(),
                camera.firmware_version()
            ),
            None => "Thermal Viewer".to_string(),
        };

        let surface = match backend.create_surface(&title, x, y) {
            Ok(surface) => surface,
            Err(error) => {
                log::error!("failed to create surface: {error}");
                return;
            }
        };

        let context = match backend.create_context(surface) {
            Ok(context) => context,
            Err(error) => {
                log::error!("failed to create drawing context: {error}");
                backend.destroy_surface(surface);
                return;
            }
        };

        backend.clear(context);
        backend.present(context, None);

        {
            let mut state = session.lock_surface();
            state.surface = Some(surface);
            state.context = Some(context);
            state.texture = None;
            state.frame_width = 0;
            state.frame_height = 0;
            state.frame_stride = 0;
        }

        session.set_visible(true);
    }

    /// Tear down a closed session. Deactivation is repeated defensively; the
    /// whole path is idempotent.
    fn close_session(&mut self, backend: &mut dyn PresentationBackend, session: &SessionHandle) {
        session.deactivate();
        self.teardown_surface(backend, session);
        self.check_global_shutdown();
    }

    fn teardown_surface(&self, backend: &mut dyn PresentationBackend, session: &SessionHandle) {
        session.set_visible(false);

        let mut state = session.lock_surface();
        if let Some(texture) = state.texture.take() {
            backend.destroy_texture(texture);
        }
        if let Some(context) = state.context.take() {
            backend.destroy_context(context);
        }
        if let Some(surface) = state.surface.take() {
            backend.destroy_surface(surface);
        }
        state.frame_width = 0;
        state.frame_height = 0;
        state.frame_stride = 0;
    }

    fn check_global_shutdown(&self) {
        // The application stays alive only as long as one session is active.
        if self.ctx.pool.count_active() == 0 {
            self.ctx.request_shutdown();
        }
    }

    /// Draw the session's pending frame, reallocating the texture when the
    /// frame geometry changed.
    fn draw_frame(&mut self, backend: &mut dyn PresentationBackend, session: &SessionHandle) {
        if !session.is_visible() {
            return;
        }

        // The slot lock is held across the whole draw so the producer cannot
        // swap the frame out from under the geometry reads.
        let mut slot = session.lock_frame();
        let frame = match slot.as_ref() {
            Some(frame) => frame.clone(),
            None => return,
        };

        let width = frame.width();
        let height = frame.height();
        let stride = frame.stride();

        let mut state = session.lock_surface();
        let (surface, context) = match (state.surface, state.context) {
            (Some(surface), Some(context)) => (surface, context),
            _ => return,
        };

        let needs_realloc = state.texture.is_none()
            || state.frame_width != width
            || state.frame_height != height
            || state.frame_stride != stride;

        if needs_realloc {
            state.frame_width = width;
            state.frame_height = height;
            state.frame_stride = stride;

            if let Some(texture) = state.texture.take() {
                backend.destroy_texture(texture);
            }

            backend.resize_surface(
                surface,
                width as u32 * UPSCALE_FACTOR,
                height as u32 * UPSCALE_FACTOR,
            );
            backend.show_surface(surface);

            match backend.create_texture(context, width as u32, height as u32) {
                Ok(texture) => state.texture = Some(texture),
                Err(error) => {
                    log::error!("failed to create texture: {error}");
                    *slot = None;
                    return;
                }
            }
        }

        if let Some(texture) = state.texture {
            backend.update_texture(texture, frame.data(), stride);
            backend.present(context, Some(texture));
        }

        if session.take_print_metadata() {
            let header = frame.header();
            println!(
                "frame metadata: (CID: {}, TIMESTAMP: {}, SPOT: {})",
                header.chip_id, header.timestamp_utc_ns, header.thermography_spot_value
            );
        }

        // The buffer handle is never reused after presentation.
        *slot = None;
    }

    /// Forcibly deactivate every record and release its presentation
    /// resources. Called once after the loop has exited and the camera
    /// manager has been torn down.
    pub fn teardown_all(&mut self, backend: &mut dyn PresentationBackend) {
        for session in self.ctx.pool.records() {
            session.deactivate();
            self.teardown_surface(backend, session);
        }
    }
}
