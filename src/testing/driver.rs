//! Scriptable camera driver.
//!
//! `SimManager` mirrors the real manager's contract: it owns its own event
//! thread and invokes the registered callback there, never on the caller's
//! thread. `SimCamera` records every control call and can be told to fail
//! specific operations.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crossbeam_channel::Sender;

use crate::driver::{
    AgcMode, CameraDevice, CameraEvent, CameraManager, ColorPalette, DriverError, EventCallback,
    FrameCallback, FrameFormat, ShutterMode, TemperatureUnit,
};
use crate::testing::synthetic_data::synthetic_frame_for_chip;
use crate::types::{ChipId, DiscoveryMode, FirmwareVersion};

#[derive(Default)]
struct SimCameraState {
    capturing: bool,
    start_count: u32,
    stop_count: u32,
    pair_count: u32,
    trigger_count: u32,
    palette: Option<ColorPalette>,
    agc: Option<AgcMode>,
    shutter: Option<ShutterMode>,
    temperature_unit: Option<TemperatureUnit>,
    emissivity: Option<f32>,
    thermography_offset: Option<f32>,
    filter_enabled: Option<bool>,
    calls: Vec<&'static str>,
    fail_register: bool,
    fail_start: bool,
    fail_stop: bool,
    fail_set_palette: bool,
    fail_set_agc: bool,
    fail_set_shutter: bool,
    fail_trigger: bool,
    fail_pairing: bool,
}

/// Fake camera with call recording and failure injection.
pub struct SimCamera {
    chip_id: ChipId,
    firmware: FirmwareVersion,
    state: Mutex<SimCameraState>,
    frame_callback: Mutex<Option<FrameCallback>>,
}

impl SimCamera {
    pub fn new(chip_id: &str) -> Arc<Self> {
        Self::with_firmware(
            chip_id,
            FirmwareVersion {
                product: 1,
                variant: 0,
                major: 7,
                minor: 2,
            },
        )
    }

    pub fn with_firmware(chip_id: &str, firmware: FirmwareVersion) -> Arc<Self> {
        Arc::new(Self {
            chip_id: chip_id.to_string(),
            firmware,
            state: Mutex::new(SimCameraState::default()),
            frame_callback: Mutex::new(None),
        })
    }

    fn state(&self) -> std::sync::MutexGuard<'_, SimCameraState> {
        self.state.lock().expect("lock poisoned")
    }

    /// Invoke the registered frame callback, as the driver would from its
    /// capture thread.
    pub fn deliver_frame(&self, frame: Arc<crate::driver::CameraFrame>) {
        let callback = self.frame_callback.lock().expect("lock poisoned");
        if let Some(callback) = callback.as_ref() {
            callback(frame);
        }
    }

    pub fn is_capturing(&self) -> bool {
        self.state().capturing
    }

    pub fn start_count(&self) -> u32 {
        self.state().start_count
    }

    pub fn stop_count(&self) -> u32 {
        self.state().stop_count
    }

    pub fn pair_count(&self) -> u32 {
        self.state().pair_count
    }

    pub fn trigger_count(&self) -> u32 {
        self.state().trigger_count
    }

    pub fn applied_palette(&self) -> Option<ColorPalette> {
        self.state().palette
    }

    pub fn applied_agc(&self) -> Option<AgcMode> {
        self.state().agc
    }

    pub fn applied_shutter(&self) -> Option<ShutterMode> {
        self.state().shutter
    }

    pub fn applied_temperature_unit(&self) -> Option<TemperatureUnit> {
        self.state().temperature_unit
    }

    pub fn applied_emissivity(&self) -> Option<f32> {
        self.state().emissivity
    }

    pub fn applied_thermography_offset(&self) -> Option<f32> {
        self.state().thermography_offset
    }

    pub fn applied_filter_enabled(&self) -> Option<bool> {
        self.state().filter_enabled
    }

    pub fn call_log(&self) -> Vec<&'static str> {
        self.state().calls.clone()
    }

    pub fn clear_call_log(&self) {
        self.state().calls.clear();
    }

    pub fn fail_register_callback(&self, fail: bool) {
        self.state().fail_register = fail;
    }

    pub fn fail_start_capture(&self, fail: bool) {
        self.state().fail_start = fail;
    }

    pub fn fail_stop_capture(&self, fail: bool) {
        self.state().fail_stop = fail;
    }

    pub fn fail_set_palette(&self, fail: bool) {
        self.state().fail_set_palette = fail;
    }

    pub fn fail_set_agc(&self, fail: bool) {
        self.state().fail_set_agc = fail;
    }

    pub fn fail_set_shutter(&self, fail: bool) {
        self.state().fail_set_shutter = fail;
    }

    pub fn fail_trigger_shutter(&self, fail: bool) {
        self.state().fail_trigger = fail;
    }

    pub fn fail_pairing(&self, fail: bool) {
        self.state().fail_pairing = fail;
    }
}

impl CameraDevice for SimCamera {
    fn chip_id(&self) -> ChipId {
        self.chip_id.clone()
    }

    fn firmware_version(&self) -> FirmwareVersion {
        self.firmware
    }

    fn register_frame_callback(&self, callback: FrameCallback) -> Result<(), DriverError> {
        let mut state = self.state();
        state.calls.push("register_frame_callback");
        if state.fail_register {
            return Err(DriverError::other("injected register failure"));
        }
        drop(state);
        *self.frame_callback.lock().expect("lock poisoned") = Some(callback);
        Ok(())
    }

    fn start_capture(&self, _format: FrameFormat) -> Result<(), DriverError> {
        let mut state = self.state();
        state.calls.push("start_capture");
        if state.fail_start {
            return Err(DriverError::device_communication());
        }
        state.capturing = true;
        state.start_count += 1;
        Ok(())
    }

    fn stop_capture(&self) -> Result<(), DriverError> {
        let mut state = self.state();
        state.calls.push("stop_capture");
        if state.fail_stop {
            return Err(DriverError::device_communication());
        }
        state.capturing = false;
        state.stop_count += 1;
        Ok(())
    }

    fn set_color_palette(&self, palette: ColorPalette) -> Result<(), DriverError> {
        let mut state = self.state();
        state.calls.push("set_color_palette");
        if state.fail_set_palette {
            return Err(DriverError::other("injected palette failure"));
        }
        state.palette = Some(palette);
        Ok(())
    }

    fn set_agc_mode(&self, mode: AgcMode) -> Result<(), DriverError> {
        let mut state = self.state();
        state.calls.push("set_agc_mode");
        if state.fail_set_agc {
            return Err(DriverError::other("injected agc failure"));
        }
        state.agc = Some(mode);
        Ok(())
    }

    fn set_shutter_mode(&self, mode: ShutterMode) -> Result<(), DriverError> {
        let mut state = self.state();
        state.calls.push("set_shutter_mode");
        if state.fail_set_shutter {
            return Err(DriverError::other("injected shutter failure"));
        }
        state.shutter = Some(mode);
        Ok(())
    }

    fn set_temperature_unit(&self, unit: TemperatureUnit) -> Result<(), DriverError> {
        self.state().temperature_unit = Some(unit);
        Ok(())
    }

    fn set_emissivity(&self, emissivity: f32) -> Result<(), DriverError> {
        self.state().emissivity = Some(emissivity);
        Ok(())
    }

    fn set_thermography_offset(&self, offset: f32) -> Result<(), DriverError> {
        self.state().thermography_offset = Some(offset);
        Ok(())
    }

    fn set_filter_enabled(&self, enabled: bool) -> Result<(), DriverError> {
        self.state().filter_enabled = Some(enabled);
        Ok(())
    }

    fn trigger_shutter(&self) -> Result<(), DriverError> {
        let mut state = self.state();
        state.calls.push("trigger_shutter");
        if state.fail_trigger {
            return Err(DriverError::other("injected trigger failure"));
        }
        state.trigger_count += 1;
        Ok(())
    }

    fn store_calibration_data(&self, progress: &mut dyn FnMut(u8)) -> Result<(), DriverError> {
        {
            let mut state = self.state();
            state.calls.push("store_calibration_data");
            if state.fail_pairing {
                progress(0);
                return Err(DriverError::other("injected pairing failure"));
            }
        }
        for percent in [0u8, 25, 50, 75, 100] {
            progress(percent);
        }
        self.state().pair_count += 1;
        Ok(())
    }
}

enum Command {
    Emit(Arc<SimCamera>, CameraEvent),
}

/// Scriptable camera manager.
///
/// Events are dispatched on a dedicated thread so consumers see the same
/// threading contract as with the real driver.
pub struct SimManager {
    discovery_mode: DiscoveryMode,
    callback: Arc<Mutex<Option<EventCallback>>>,
    tx: Option<Sender<Command>>,
    shutdown: Arc<AtomicBool>,
    event_thread: Option<thread::JoinHandle<()>>,
    camera_threads: Mutex<Vec<thread::JoinHandle<()>>>,
}

impl SimManager {
    pub fn new(discovery_mode: DiscoveryMode) -> Result<Self, DriverError> {
        let (tx, rx) = crossbeam_channel::unbounded::<Command>();
        let callback = Arc::new(Mutex::new(None::<EventCallback>));

        let thread_callback = callback.clone();
        let event_thread = thread::Builder::new()
            .name("thermview-sim-events".to_string())
            .spawn(move || {
                for command in rx {
                    let Command::Emit(camera, event) = command;
                    let mut guard = thread_callback.lock().expect("lock poisoned");
                    if let Some(callback) = guard.as_mut() {
                        callback(camera, event);
                    }
                }
            })
            .map_err(|e| DriverError::other(format!("spawn failed: {e}")))?;

        Ok(Self {
            discovery_mode,
            callback,
            tx: Some(tx),
            shutdown: Arc::new(AtomicBool::new(false)),
            event_thread: Some(event_thread),
            camera_threads: Mutex::new(Vec::new()),
        })
    }

    pub fn discovery_mode(&self) -> DiscoveryMode {
        self.discovery_mode
    }

    fn send(&self, command: Command) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(command);
        }
    }

    pub fn connect(&self, camera: &Arc<SimCamera>) {
        self.send(Command::Emit(camera.clone(), CameraEvent::Connect));
    }

    pub fn disconnect(&self, camera: &Arc<SimCamera>) {
        self.send(Command::Emit(camera.clone(), CameraEvent::Disconnect));
    }

    pub fn raise_error(&self, camera: &Arc<SimCamera>, error: DriverError) {
        self.send(Command::Emit(camera.clone(), CameraEvent::Error(error)));
    }

    pub fn ready_to_pair(&self, camera: &Arc<SimCamera>) {
        self.send(Command::Emit(camera.clone(), CameraEvent::ReadyToPair));
    }

    /// Connect a camera that streams synthetic frames while its capture
    /// session is running. The stream stops when the manager is dropped.
    pub fn simulate_camera(&self, chip_id: &str, width: usize, height: usize) -> Arc<SimCamera> {
        let camera = SimCamera::new(chip_id);
        self.connect(&camera);

        let stream_camera = camera.clone();
        let shutdown = self.shutdown.clone();
        let chip = chip_id.to_string();
        let handle = thread::Builder::new()
            .name(format!("thermview-sim-{chip_id}"))
            .spawn(move || {
                let mut frame_number = 0u64;
                while !shutdown.load(Ordering::Acquire) {
                    if stream_camera.is_capturing() {
                        stream_camera.deliver_frame(synthetic_frame_for_chip(
                            &chip,
                            frame_number,
                            width,
                            height,
                        ));
                        frame_number += 1;
                    }
                    thread::sleep(Duration::from_millis(110));
                }
            })
            .expect("spawn failed");
        self.camera_threads
            .lock()
            .expect("lock poisoned")
            .push(handle);

        camera
    }
}

impl CameraManager for SimManager {
    fn register_event_callback(&self, callback: EventCallback) -> Result<(), DriverError> {
        *self.callback.lock().expect("lock poisoned") = Some(callback);
        Ok(())
    }
}

impl Drop for SimManager {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Release);
        for handle in self.camera_threads.lock().expect("lock poisoned").drain(..) {
            let _ = handle.join();
        }
        // Dropping the sender ends the event thread's receive loop.
        self.tx.take();
        if let Some(handle) = self.event_thread.take() {
            let _ = handle.join();
        }
    }
}
