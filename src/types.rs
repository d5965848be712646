//! Small shared types used across the viewer core.

use std::fmt;
use std::str::FromStr;

/// Unique chip identifier reported by a camera.
pub type ChipId = String;

/// Firmware version reported by a camera.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct FirmwareVersion {
    pub product: u8,
    pub variant: u8,
    pub major: u8,
    pub minor: u8,
}

impl fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.product, self.variant, self.major, self.minor
        )
    }
}

/// Transport mask used for camera discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryMode {
    Usb,
    Spi,
    All,
}

impl DiscoveryMode {
    pub fn includes_usb(self) -> bool {
        matches!(self, DiscoveryMode::Usb | DiscoveryMode::All)
    }

    pub fn includes_spi(self) -> bool {
        matches!(self, DiscoveryMode::Spi | DiscoveryMode::All)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DiscoveryMode::Usb => "usb",
            DiscoveryMode::Spi => "spi",
            DiscoveryMode::All => "all",
        }
    }
}

impl Default for DiscoveryMode {
    fn default() -> Self {
        DiscoveryMode::Usb
    }
}

impl FromStr for DiscoveryMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "usb" => Ok(DiscoveryMode::Usb),
            "spi" => Ok(DiscoveryMode::Spi),
            "all" => Ok(DiscoveryMode::All),
            _ => Err(()),
        }
    }
}
