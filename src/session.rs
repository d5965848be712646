//! Per-camera session records and their control operations.
//!
//! A record is allocated once at startup and recycled across connects; it is
//! never freed while the process runs. Lifecycle flags are atomics because
//! driver callback threads use them for fast-path checks. The frame slot has
//! its own lock with last-writer-wins semantics: the producer overwrites any
//! unconsumed frame, the consumer takes-and-clears, so at most one frame is
//! ever pending per record and the loop always draws the newest one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::cycle::SettingCycle;
use crate::driver::{AgcMode, CameraDevice, CameraFrame, ColorPalette, FrameFormat, ShutterMode};
use crate::errors::ViewerError;

/// Shared reference to a session record.
pub type SessionHandle = Arc<SessionRecord>;

/// The three cycled device settings of a session.
pub struct SessionSettings {
    pub palette: SettingCycle<ColorPalette>,
    pub agc: SettingCycle<AgcMode>,
    pub shutter: SettingCycle<ShutterMode>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        let mut palette = ColorPalette::cycle();
        palette.select("tyrian");
        let mut agc = AgcMode::cycle();
        agc.select("histeq");
        let mut shutter = ShutterMode::cycle();
        shutter.select("auto");
        Self {
            palette,
            agc,
            shutter,
        }
    }
}

/// Presentation resources and the cached frame geometry used to detect when
/// the texture must be reallocated. Touched only by the presentation thread.
#[derive(Debug, Default)]
pub struct SurfaceState {
    pub surface: Option<crate::backend::SurfaceId>,
    pub context: Option<crate::backend::ContextId>,
    pub texture: Option<crate::backend::TextureId>,
    pub frame_width: usize,
    pub frame_height: usize,
    pub frame_stride: usize,
}

/// Rendering state for one camera.
pub struct SessionRecord {
    is_active: AtomicBool,
    is_visible: AtomicBool,
    print_metadata: AtomicBool,
    camera: Mutex<Option<Arc<dyn CameraDevice>>>,
    frame: Mutex<Option<Arc<CameraFrame>>>,
    settings: Mutex<SessionSettings>,
    surface: Mutex<SurfaceState>,
    frame_format: FrameFormat,
}

impl SessionRecord {
    pub fn new() -> Self {
        Self {
            is_active: AtomicBool::new(false),
            is_visible: AtomicBool::new(false),
            print_metadata: AtomicBool::new(false),
            camera: Mutex::new(None),
            frame: Mutex::new(None),
            settings: Mutex::new(SessionSettings::default()),
            surface: Mutex::new(SurfaceState::default()),
            frame_format: FrameFormat::ColorArgb8888,
        }
    }

    /// Whether the record holds a connected camera.
    pub fn is_active(&self) -> bool {
        self.is_active.load(Ordering::Acquire)
    }

    /// Whether the record's surface exists and frames may be drawn.
    pub fn is_visible(&self) -> bool {
        self.is_visible.load(Ordering::Acquire)
    }

    pub fn set_visible(&self, visible: bool) {
        self.is_visible.store(visible, Ordering::Release);
    }

    /// Bind a camera to this record and mark it active.
    ///
    /// The handle is stored before the flag is raised, so any thread that
    /// observes `is_active() == true` also observes the handle.
    pub fn activate(&self, camera: Arc<dyn CameraDevice>) {
        *self.camera.lock().expect("lock poisoned") = Some(camera);
        self.is_active.store(true, Ordering::Release);
    }

    /// Mark the record inactive and drop the camera handle and any pending
    /// frame. Idempotent; safe to call on an already-inactive record.
    pub fn deactivate(&self) {
        self.is_active.store(false, Ordering::Release);
        *self.camera.lock().expect("lock poisoned") = None;
        *self.frame.lock().expect("lock poisoned") = None;
    }

    /// The bound camera, if any.
    pub fn camera(&self) -> Option<Arc<dyn CameraDevice>> {
        self.camera.lock().expect("lock poisoned").clone()
    }

    /// Chip id of the bound camera, if any.
    pub fn chip_id(&self) -> Option<crate::types::ChipId> {
        self.camera().map(|camera| camera.chip_id())
    }

    pub fn frame_format(&self) -> FrameFormat {
        self.frame_format
    }

    /// Store a frame, discarding any unconsumed predecessor.
    ///
    /// Returns true when a pending frame was overwritten.
    pub fn store_frame(&self, frame: Arc<CameraFrame>) -> bool {
        let mut slot = self.frame.lock().expect("lock poisoned");
        let dropped = slot.is_some();
        *slot = Some(frame);
        dropped
    }

    /// Lock the frame slot. The consumer must hold this guard while reading
    /// the frame's geometry and pixel data, not just while swapping the
    /// handle out.
    pub fn lock_frame(&self) -> MutexGuard<'_, Option<Arc<CameraFrame>>> {
        self.frame.lock().expect("lock poisoned")
    }

    pub fn lock_settings(&self) -> MutexGuard<'_, SessionSettings> {
        self.settings.lock().expect("lock poisoned")
    }

    /// Lock the presentation resources. Presentation thread only.
    pub fn lock_surface(&self) -> MutexGuard<'_, SurfaceState> {
        self.surface.lock().expect("lock poisoned")
    }

    /// Request that the next drawn frame prints its header metadata.
    pub fn request_print_metadata(&self) -> Result<(), ViewerError> {
        if !self.is_active() {
            return Err(ViewerError::inactive());
        }
        self.print_metadata.store(true, Ordering::Release);
        Ok(())
    }

    /// Consume the print-metadata request, if one is pending.
    pub fn take_print_metadata(&self) -> bool {
        self.print_metadata.swap(false, Ordering::AcqRel)
    }

    fn active_camera(&self) -> Result<Arc<dyn CameraDevice>, ViewerError> {
        if !self.is_active() {
            return Err(ViewerError::inactive());
        }
        self.camera().ok_or_else(ViewerError::inactive)
    }

    /// Push the current palette selection to the device.
    pub fn apply_palette(&self) -> Result<(), ViewerError> {
        let camera = self.active_camera()?;
        let palette = self.lock_settings().palette.current_value();
        camera.set_color_palette(palette)?;
        Ok(())
    }

    /// Advance to the next palette and apply it. The selection moves even
    /// when the apply fails; cycling again recovers.
    pub fn switch_palette(&self) -> Result<&'static str, ViewerError> {
        let name = self.lock_settings().palette.advance().0;
        self.apply_palette()?;
        Ok(name)
    }

    /// Push the current AGC mode selection to the device.
    pub fn apply_agc(&self) -> Result<(), ViewerError> {
        let camera = self.active_camera()?;
        let mode = self.lock_settings().agc.current_value();
        camera.set_agc_mode(mode)?;
        Ok(())
    }

    /// Advance to the next AGC mode and apply it.
    pub fn switch_agc(&self) -> Result<&'static str, ViewerError> {
        let name = self.lock_settings().agc.advance().0;
        self.apply_agc()?;
        Ok(name)
    }

    /// Push the current shutter mode selection to the device.
    pub fn apply_shutter(&self) -> Result<(), ViewerError> {
        let camera = self.active_camera()?;
        let mode = self.lock_settings().shutter.current_value();
        camera.set_shutter_mode(mode)?;
        Ok(())
    }

    /// Advance to the next shutter mode and apply it.
    pub fn switch_shutter(&self) -> Result<&'static str, ViewerError> {
        let name = self.lock_settings().shutter.advance().0;
        self.apply_shutter()?;
        Ok(name)
    }

    /// Trigger the shutter. Vacuous success when no camera is bound.
    pub fn trigger_shutter(&self) -> Result<(), ViewerError> {
        if !self.is_active() {
            return Ok(());
        }
        let camera = self.camera().ok_or_else(ViewerError::inactive)?;
        camera.trigger_shutter()?;
        Ok(())
    }

    /// Restart the capture session: stop, re-apply all three settings, start.
    ///
    /// The first failing step aborts the rest and leaves the device-side
    /// session stopped; the record's active flag is untouched. The caller
    /// decides whether to tear down.
    pub fn restart_capture(&self) -> Result<(), ViewerError> {
        let camera = self.active_camera()?;
        camera.stop_capture()?;
        self.apply_palette()?;
        self.apply_agc()?;
        self.apply_shutter()?;
        camera.start_capture(self.frame_format)?;
        Ok(())
    }
}

impl Default for SessionRecord {
    fn default() -> Self {
        Self::new()
    }
}
