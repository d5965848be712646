//! Fixed-capacity pool of session records.
//!
//! Slots are allocated once and never reaped; "destroying" a session just
//! resets its flags, so slot references stay valid for the whole process
//! lifetime. The pool itself needs no lock: lookups read stable slots whose
//! contents are guarded by the records' own atomics and mutexes. Lookups are
//! linear scans, which is deliberate at this size.

use std::sync::Arc;

use crate::backend::SurfaceId;
use crate::session::{SessionHandle, SessionRecord};
use crate::types::ChipId;

/// Default number of concurrently renderable cameras.
pub const DEFAULT_CAPACITY: usize = 16;

pub struct SessionPool {
    records: Vec<SessionHandle>,
}

impl SessionPool {
    pub fn new(capacity: usize) -> Self {
        let records = (0..capacity)
            .map(|_| Arc::new(SessionRecord::new()))
            .collect();
        Self { records }
    }

    pub fn capacity(&self) -> usize {
        self.records.len()
    }

    /// First record with `is_active == false`, or `None` when the pool is
    /// exhausted.
    pub fn acquire_free(&self) -> Option<SessionHandle> {
        self.records
            .iter()
            .find(|record| !record.is_active())
            .cloned()
    }

    /// Active record bound to the camera with this chip id.
    pub fn find_by_device(&self, chip_id: &ChipId) -> Option<SessionHandle> {
        self.records
            .iter()
            .find(|record| {
                record.is_active() && record.chip_id().as_ref() == Some(chip_id)
            })
            .cloned()
    }

    /// Active record owning this presentation surface.
    pub fn find_by_surface(&self, surface: SurfaceId) -> Option<SessionHandle> {
        self.records
            .iter()
            .find(|record| {
                record.is_active() && record.lock_surface().surface == Some(surface)
            })
            .cloned()
    }

    /// Number of active records. Drives process shutdown when it reaches
    /// zero after a session closes.
    pub fn count_active(&self) -> usize {
        self.records
            .iter()
            .filter(|record| record.is_active())
            .count()
    }

    /// All records, active or not. Used for final teardown.
    pub fn records(&self) -> &[SessionHandle] {
        &self.records
    }
}
