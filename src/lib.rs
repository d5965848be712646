//! thermview: multi-window thermal camera viewer core.
//!
//! This crate bridges an asynchronous camera driver, which delivers
//! connect/disconnect/error/frame events on threads it owns, to a
//! single-threaded presentation loop that must run on the one thread allowed
//! to touch the windowing backend.
//!
//! # Architecture
//! - A fixed pool of session records, one per connected camera, recycled
//!   across connects and never freed mid-run
//! - Driver callbacks mutate records and enqueue events; all backend work is
//!   deferred to the presentation thread through the event channel
//! - Frames are handed off through a per-record slot with last-writer-wins
//!   semantics, so the loop always draws the newest frame and memory stays
//!   bounded
//!
//! The driver and the windowing backend are both consumed through traits
//! (`driver::CameraManager`, `backend::PresentationBackend`); the `testing`
//! module ships simulated implementations of each.

pub mod backend;
pub mod channel;
pub mod context;
pub mod cycle;
pub mod driver;
pub mod errors;
pub mod lifecycle;
pub mod pool;
pub mod present;
pub mod session;
pub mod types;

// Testing utilities - simulated driver and backend for offline testing
pub mod testing;

// Re-exports for convenience
pub use channel::{EventChannel, RenderEvent, RenderEventKind};
pub use context::ViewerContext;
pub use errors::ViewerError;
pub use lifecycle::LifecycleHandler;
pub use pool::SessionPool;
pub use present::PresentationLoop;
pub use session::{SessionHandle, SessionRecord};
pub use types::{ChipId, DiscoveryMode, FirmwareVersion};

/// Initialize logging for the viewer.
pub fn init_logging() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "thermview=info");
    }
    let _ = env_logger::try_init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod lib_tests {
    use super::*;

    #[test]
    fn test_crate_metadata() {
        assert_eq!(NAME, "thermview");
        assert!(!VERSION.is_empty());
    }
}
