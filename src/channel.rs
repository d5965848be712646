//! Event channel between driver callback threads and the presentation thread.
//!
//! Driver callbacks run on threads owned by the camera manager, but all
//! backend work must happen on the presentation thread. Callbacks therefore
//! push coordination events here and the presentation loop consumes them with
//! a bounded wait, so backend input stays responsive when no camera events
//! arrive.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

use crate::session::SessionHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderEventKind {
    /// A session became active; create its surface.
    SessionOpen,
    /// A session closed; tear down its surface.
    SessionClose,
    /// A new frame is pending in the session's frame slot.
    FrameReady,
}

/// Coordination event targeting one session record.
///
/// Events carry no payload beyond the target; the frame and device handle are
/// read from the record at consumption time. Records outlive every event that
/// references them.
#[derive(Clone)]
pub struct RenderEvent {
    pub kind: RenderEventKind,
    pub session: SessionHandle,
}

impl RenderEvent {
    pub fn new(kind: RenderEventKind, session: SessionHandle) -> Self {
        Self { kind, session }
    }
}

/// Unbounded FIFO of render events with wait/notify.
pub struct EventChannel {
    queue: Mutex<VecDeque<RenderEvent>>,
    cv: Condvar,
}

impl EventChannel {
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            cv: Condvar::new(),
        }
    }

    /// Push an event and wake the consumer. The lock is held only for the
    /// push itself.
    pub fn push(&self, event: RenderEvent) {
        let mut queue = self.queue.lock().expect("lock poisoned");
        queue.push_back(event);
        drop(queue);
        self.cv.notify_one();
    }

    /// Pop the next event, waiting up to `timeout` for one to arrive.
    ///
    /// Returns `None` on timeout. The wait predicate is re-checked after
    /// every wakeup, so spurious wakeups never yield an empty result early.
    pub fn pop_timeout(&self, timeout: Duration) -> Option<RenderEvent> {
        let mut queue = self.queue.lock().expect("lock poisoned");

        let deadline = Instant::now() + timeout;
        loop {
            if let Some(event) = queue.pop_front() {
                return Some(event);
            }
            let now = Instant::now();
            if now >= deadline {
                return None;
            }
            let (guard, _) = self
                .cv
                .wait_timeout(queue, deadline - now)
                .expect("lock poisoned");
            queue = guard;
        }
    }

    /// Number of queued events.
    pub fn len(&self) -> usize {
        self.queue.lock().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for EventChannel {
    fn default() -> Self {
        Self::new()
    }
}
