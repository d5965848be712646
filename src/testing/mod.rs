//! Simulated collaborators for offline testing and demos.
//!
//! The viewer core only ever sees the `CameraManager`/`CameraDevice` and
//! `PresentationBackend` interfaces, so a scriptable driver and a recording
//! backend are enough to exercise every path without hardware or a display.

mod backend;
mod driver;
mod synthetic_data;

pub use backend::{BackendCall, SimBackend};
pub use driver::{SimCamera, SimManager};
pub use synthetic_data::{synthetic_frame, synthetic_frame_for_chip};
