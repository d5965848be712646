//! Process-scoped viewer state.
//!
//! One `ViewerContext` is built at startup and shared by `Arc` with every
//! component: the lifecycle handler on driver threads, the presentation loop,
//! and the signal handler. Nothing in the crate holds hidden global state.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::channel::EventChannel;
use crate::pool::{SessionPool, DEFAULT_CAPACITY};

pub struct ViewerContext {
    pub pool: SessionPool,
    pub events: EventChannel,
    shutdown: AtomicBool,
    auto_pair: bool,
}

impl ViewerContext {
    pub fn new(auto_pair: bool) -> Self {
        Self::with_capacity(DEFAULT_CAPACITY, auto_pair)
    }

    pub fn with_capacity(capacity: usize, auto_pair: bool) -> Self {
        Self {
            pool: SessionPool::new(capacity),
            events: EventChannel::new(),
            shutdown: AtomicBool::new(false),
            auto_pair,
        }
    }

    /// Whether unpaired cameras are paired automatically on connect.
    pub fn auto_pair(&self) -> bool {
        self.auto_pair
    }

    /// Request orderly shutdown. One-way: once set it stays set, and the
    /// presentation loop exits after its current iteration.
    pub fn request_shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
    }

    pub fn shutdown_requested(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }
}

impl Default for ViewerContext {
    fn default() -> Self {
        Self::new(true)
    }
}
