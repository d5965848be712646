//! Camera driver interface.
//!
//! The viewer core never talks to camera hardware directly. It consumes the
//! narrow interface below: a manager that discovers devices and delivers
//! lifecycle events on threads it owns, and per-device handles for capture
//! control and settings. Frame buffers stay owned by the driver; the core
//! holds shared handles that it drops once a frame has been presented or
//! superseded.

use std::fmt;
use std::sync::Arc;

use crate::cycle::SettingCycle;
use crate::types::{ChipId, FirmwareVersion};

/// Color palette applied by the driver's colorization pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum ColorPalette {
    Amber,
    BlackHot,
    Green,
    Hi,
    Iron,
    Prism,
    Spectra,
    Tyrian,
    WhiteHot,
}

impl ColorPalette {
    /// All selectable palettes in name order. Order is stable so cycling is
    /// deterministic.
    pub fn cycle() -> SettingCycle<ColorPalette> {
        SettingCycle::new(vec![
            ("amber", ColorPalette::Amber),
            ("black-hot", ColorPalette::BlackHot),
            ("green", ColorPalette::Green),
            ("hi", ColorPalette::Hi),
            ("iron", ColorPalette::Iron),
            ("prism", ColorPalette::Prism),
            ("spectra", ColorPalette::Spectra),
            ("tyrian", ColorPalette::Tyrian),
            ("white-hot", ColorPalette::WhiteHot),
        ])
    }
}

/// Automatic gain control mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum AgcMode {
    HistEq,
    Linear,
}

impl AgcMode {
    pub fn cycle() -> SettingCycle<AgcMode> {
        SettingCycle::new(vec![("histeq", AgcMode::HistEq), ("linear", AgcMode::Linear)])
    }
}

/// Shutter control mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum ShutterMode {
    Auto,
    Manual,
}

impl ShutterMode {
    pub fn cycle() -> SettingCycle<ShutterMode> {
        SettingCycle::new(vec![("auto", ShutterMode::Auto), ("manual", ShutterMode::Manual)])
    }
}

/// Pixel format requested when starting a capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameFormat {
    ColorArgb8888,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureUnit {
    Celsius,
    Fahrenheit,
    Kelvin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverErrorKind {
    /// Transient: the device did not answer in time.
    Timeout,
    /// Transient: host to device communication failed.
    DeviceCommunication,
    /// The device has no calibration pairing yet.
    NotPaired,
    NotSupported,
    Other,
}

impl DriverErrorKind {
    /// Transient errors are recovered by restarting the capture session.
    pub fn is_transient(self) -> bool {
        matches!(
            self,
            DriverErrorKind::Timeout | DriverErrorKind::DeviceCommunication
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverError {
    pub kind: DriverErrorKind,
    pub message: String,
}

impl DriverError {
    pub fn timeout() -> Self {
        Self {
            kind: DriverErrorKind::Timeout,
            message: "device timed out".to_string(),
        }
    }

    pub fn device_communication() -> Self {
        Self {
            kind: DriverErrorKind::DeviceCommunication,
            message: "failed to communicate with device".to_string(),
        }
    }

    pub fn not_paired() -> Self {
        Self {
            kind: DriverErrorKind::NotPaired,
            message: "device is not paired".to_string(),
        }
    }

    pub fn not_supported(message: impl Into<String>) -> Self {
        Self {
            kind: DriverErrorKind::NotSupported,
            message: message.into(),
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self {
            kind: DriverErrorKind::Other,
            message: message.into(),
        }
    }
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for DriverError {}

/// Header fields carried alongside every frame.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct FrameHeader {
    pub chip_id: ChipId,
    pub timestamp_utc_ns: u64,
    pub thermography_spot_value: f32,
}

/// One frame produced by the driver.
///
/// The pixel buffer is owned by the driver side; the core only holds `Arc`
/// handles and drops them once the frame is presented or superseded.
#[derive(Debug, Clone)]
pub struct CameraFrame {
    width: usize,
    height: usize,
    stride: usize,
    header: FrameHeader,
    data: Vec<u8>,
}

impl CameraFrame {
    pub fn new(
        width: usize,
        height: usize,
        stride: usize,
        header: FrameHeader,
        data: Vec<u8>,
    ) -> Self {
        debug_assert!(data.len() >= stride * height, "frame buffer too small");
        Self {
            width,
            height,
            stride,
            header,
            data,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Row stride in bytes.
    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn header(&self) -> &FrameHeader {
        &self.header
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Per-record frame delivery callback, invoked on a driver-owned thread.
pub type FrameCallback = Box<dyn Fn(Arc<CameraFrame>) + Send + Sync>;

/// Handle to one connected camera.
///
/// All methods may be invoked from driver callback threads or from the
/// presentation thread; implementations must be thread safe. Calls are
/// synchronous and potentially slow.
pub trait CameraDevice: Send + Sync {
    fn chip_id(&self) -> ChipId;
    fn firmware_version(&self) -> FirmwareVersion;

    /// Register the frame-available callback for this device. The callback is
    /// invoked on a driver-owned thread for every captured frame.
    fn register_frame_callback(&self, callback: FrameCallback) -> Result<(), DriverError>;

    fn start_capture(&self, format: FrameFormat) -> Result<(), DriverError>;
    fn stop_capture(&self) -> Result<(), DriverError>;

    fn set_color_palette(&self, palette: ColorPalette) -> Result<(), DriverError>;
    fn set_agc_mode(&self, mode: AgcMode) -> Result<(), DriverError>;
    fn set_shutter_mode(&self, mode: ShutterMode) -> Result<(), DriverError>;

    fn set_temperature_unit(&self, _unit: TemperatureUnit) -> Result<(), DriverError> {
        Err(DriverError::not_supported("temperature unit not supported"))
    }

    fn set_emissivity(&self, _emissivity: f32) -> Result<(), DriverError> {
        Err(DriverError::not_supported("emissivity not supported"))
    }

    fn set_thermography_offset(&self, _offset: f32) -> Result<(), DriverError> {
        Err(DriverError::not_supported("thermography offset not supported"))
    }

    fn set_filter_enabled(&self, _enabled: bool) -> Result<(), DriverError> {
        Err(DriverError::not_supported("filtering not supported"))
    }

    fn trigger_shutter(&self) -> Result<(), DriverError>;

    /// Pair the sensor's calibration data with the host. Progress is reported
    /// in percent through the callback.
    fn store_calibration_data(&self, progress: &mut dyn FnMut(u8)) -> Result<(), DriverError>;
}

/// Lifecycle event delivered by the camera manager.
#[derive(Debug, Clone, PartialEq)]
pub enum CameraEvent {
    Connect,
    Disconnect,
    Error(DriverError),
    ReadyToPair,
}

impl CameraEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            CameraEvent::Connect => "connect",
            CameraEvent::Disconnect => "disconnect",
            CameraEvent::Error(_) => "error",
            CameraEvent::ReadyToPair => "ready to pair",
        }
    }
}

/// Manager-level event callback, invoked on driver-owned threads.
pub type EventCallback = Box<dyn FnMut(Arc<dyn CameraDevice>, CameraEvent) + Send>;

/// Owner of all camera devices. Discovers cameras on the configured
/// transports and reports lifecycle events through a single callback.
pub trait CameraManager {
    fn register_event_callback(&self, callback: EventCallback) -> Result<(), DriverError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_cycle_is_name_ordered() {
        let cycle = ColorPalette::cycle();
        assert_eq!(cycle.len(), 9);
        assert_eq!(cycle.current(), ("amber", ColorPalette::Amber));
    }

    #[test]
    fn test_default_selections_exist() {
        let mut palettes = ColorPalette::cycle();
        assert!(palettes.select("tyrian"));
        let mut agc = AgcMode::cycle();
        assert!(agc.select("histeq"));
        let mut shutter = ShutterMode::cycle();
        assert!(shutter.select("auto"));
    }

    #[test]
    fn test_transient_error_kinds() {
        assert!(DriverError::timeout().kind.is_transient());
        assert!(DriverError::device_communication().kind.is_transient());
        assert!(!DriverError::not_paired().kind.is_transient());
        assert!(!DriverError::other("x").kind.is_transient());
    }
}
