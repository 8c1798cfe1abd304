//! Exclusive dealer attachment.
//!
//! Only one dealer may drive the table at a time. [`DealerSlot`] hands out
//! a single [`DealerLease`]; the slot frees itself when the lease drops,
//! whichever way the dealer's task ends.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Single-occupancy slot for the dealer connection.
#[derive(Debug, Default)]
pub struct DealerSlot {
    occupied: AtomicBool,
}

/// Proof that the holder is the attached dealer. Releases the slot on drop.
#[derive(Debug)]
pub struct DealerLease {
    slot: Arc<DealerSlot>,
}

impl DealerSlot {
    /// Creates a free slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the slot, or returns `None` if a dealer is already attached.
    #[must_use]
    pub fn try_acquire(self: &Arc<Self>) -> Option<DealerLease> {
        self.occupied
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| DealerLease {
                slot: Arc::clone(self),
            })
    }

    /// Returns `true` while a lease is outstanding.
    #[must_use]
    pub fn is_occupied(&self) -> bool {
        self.occupied.load(Ordering::Acquire)
    }
}

impl Drop for DealerLease {
    fn drop(&mut self) {
        self.slot.occupied.store(false, Ordering::Release);
    }
}
