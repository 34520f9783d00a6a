//! Arena checkout guard.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::error::WorkspaceError;

/// RAII marker that the arena is in use by one kernel invocation.
///
/// Holds the handle's in-use flag rather than a borrow of the handle, so
/// destroying a handle with a live checkout is detected at teardown.
#[derive(Debug)]
pub struct Checkout {
    addr: Option<u64>,
    size: usize,
    in_use: Arc<AtomicBool>,
}

impl Checkout {
    pub(crate) fn acquire(
        in_use: &Arc<AtomicBool>,
        addr: Option<u64>,
        size: usize,
    ) -> Result<Self, WorkspaceError> {
        in_use
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| WorkspaceError::ArenaInUse)?;
        Ok(Self { addr, size, in_use: Arc::clone(in_use) })
    }

    /// Device address of the region; `None` only for an empty arena.
    pub fn addr(&self) -> Option<u64> {
        self.addr
    }

    /// Bytes checked out.
    pub fn size(&self) -> usize {
        self.size
    }
}

impl Drop for Checkout {
    fn drop(&mut self) {
        self.in_use.store(false, Ordering::Release);
    }
}
