//! Expiry-Aware Membership Table
//!
//! Storage for the timeout set variant. Instead of one bit per element id,
//! every id owns a 64-bit slot holding its expiry state, so presence is
//! derived from "has a deadline that hasn't passed" rather than a stored
//! boolean.
//!
//! ## Slot Encoding
//!
//! ```text
//! 0                  unset     - never added, or removed, or swept
//! u64::MAX           permanent - added with timeout 0, never expires
//! anything else      deadline  - milliseconds since the table's base instant
//! ```
//!
//! The unset sentinel is distinct from every valid deadline, so a slot can
//! always be reset to "never added" without ambiguity.
//!
//! ## Expiry Model
//!
//! Expiry is observed in two independent ways, and either alone is enough:
//!
//! 1. **Lazy**: `test` reads the slot against the current time, so a stale
//!    entry reports absent before anything has physically cleared it.
//! 2. **Active**: the background sweeper calls `clear_expired` periodically
//!    and resets stale slots to unset, reclaiming them for fresh adds.
//!
//! Slots are atomic words. The owning set's lock discipline guarantees the
//! sweep pass only ever races with readers, never with add/remove/flush,
//! so the sweep's load-then-store per slot cannot lose a concurrent add.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::set::engine::SetError;

/// Slot value for an element that is not present.
const ELEM_UNSET: u64 = 0;

/// Slot value for an element that never expires.
const ELEM_PERMANENT: u64 = u64::MAX;

/// Expiry-aware membership storage for the timeout set variant.
///
/// Deadlines are stored with millisecond granularity relative to a base
/// instant captured at creation. The command surface speaks whole seconds;
/// the finer granularity is internal.
#[derive(Debug)]
pub struct ExpiringTable {
    /// One expiry slot per element id.
    slots: Box<[AtomicU64]>,
    /// Reference point for deadline arithmetic.
    base: Instant,
}

impl ExpiringTable {
    /// Allocates a table of unset slots able to hold `capacity` element ids.
    ///
    /// Fails with [`SetError::AllocationFailed`] if the storage cannot be
    /// obtained, leaving nothing allocated.
    pub fn new(capacity: u32) -> Result<Self, SetError> {
        let mut slots = Vec::new();
        slots
            .try_reserve_exact(capacity as usize)
            .map_err(|_| SetError::AllocationFailed)?;
        slots.resize_with(capacity as usize, || AtomicU64::new(ELEM_UNSET));

        Ok(Self {
            slots: slots.into_boxed_slice(),
            base: Instant::now(),
        })
    }

    #[inline]
    fn now_millis(&self) -> u64 {
        self.base.elapsed().as_millis() as u64
    }

    /// Encodes a time-to-live as an absolute slot deadline.
    #[inline]
    fn deadline_for(&self, ttl: Duration) -> u64 {
        // 0 and u64::MAX are reserved sentinels.
        self.now_millis()
            .saturating_add(ttl.as_millis() as u64)
            .clamp(1, ELEM_PERMANENT - 1)
    }

    #[inline]
    fn slot_is_live(&self, slot: u64, now: u64) -> bool {
        match slot {
            ELEM_UNSET => false,
            ELEM_PERMANENT => true,
            deadline => now < deadline,
        }
    }

    /// Returns whether `id` is present and not expired.
    ///
    /// An entry whose deadline has passed reads as absent here even before
    /// the sweeper has cleared its slot.
    #[inline]
    pub fn test(&self, id: u32) -> bool {
        let slot = self.slots[id as usize].load(Ordering::Acquire);
        self.slot_is_live(slot, self.now_millis())
    }

    /// Stores a deadline for `id`; `None` means the element never expires.
    ///
    /// Fails with [`SetError::AlreadyExists`] if the element currently
    /// tests present. A slot holding an expired deadline is overwritten as
    /// if it were unset.
    pub fn add(&self, id: u32, ttl: Option<Duration>) -> Result<(), SetError> {
        if self.test(id) {
            return Err(SetError::AlreadyExists);
        }

        let slot = match ttl {
            Some(ttl) => self.deadline_for(ttl),
            None => ELEM_PERMANENT,
        };
        self.slots[id as usize].store(slot, Ordering::Release);
        Ok(())
    }

    /// Clears the slot for `id`, reporting whether a live element was there.
    ///
    /// The slot is reset to unset regardless of the outcome: removing an
    /// already-expired-but-not-yet-swept entry reclaims it immediately but
    /// still reports [`SetError::DoesNotExist`]. Only the reported status
    /// depends on the element's prior state.
    pub fn remove(&self, id: u32) -> Result<(), SetError> {
        let was_live = self.test(id);
        self.slots[id as usize].store(ELEM_UNSET, Ordering::Release);

        if was_live {
            Ok(())
        } else {
            Err(SetError::DoesNotExist)
        }
    }

    /// Remaining lifetime of a present element.
    ///
    /// Returns `None` for an absent or expired element and `Duration::ZERO`
    /// for a permanent one, matching what the listing reports.
    pub fn remaining(&self, id: u32) -> Option<Duration> {
        let slot = self.slots[id as usize].load(Ordering::Acquire);
        let now = self.now_millis();

        match slot {
            ELEM_UNSET => None,
            ELEM_PERMANENT => Some(Duration::ZERO),
            deadline if now < deadline => Some(Duration::from_millis(deadline - now)),
            _ => None,
        }
    }

    /// Resets every slot whose deadline has passed back to unset.
    ///
    /// This is the sweeper's work function. It never fails; a table with no
    /// live deadlines is a no-op scan. Returns the number of slots cleared.
    ///
    /// Must run while mutating operations are locked out (the owning set's
    /// shared lock mode); concurrent `test` calls are fine.
    pub fn clear_expired(&self) -> u32 {
        let now = self.now_millis();
        let mut cleared = 0;

        for slot in self.slots.iter() {
            let value = slot.load(Ordering::Acquire);
            if value != ELEM_UNSET && value != ELEM_PERMANENT && now >= value {
                slot.store(ELEM_UNSET, Ordering::Release);
                cleared += 1;
            }
        }

        cleared
    }

    /// Resets every slot to unset.
    pub fn flush(&self) {
        for slot in self.slots.iter() {
            slot.store(ELEM_UNSET, Ordering::Release);
        }
    }

    /// Number of slots physically occupied, counting expired entries the
    /// sweeper has not reclaimed yet.
    pub fn occupied(&self) -> u32 {
        self.slots
            .iter()
            .filter(|s| s.load(Ordering::Acquire) != ELEM_UNSET)
            .count() as u32
    }

    /// Size of the member storage in bytes.
    pub fn mem_size(&self) -> usize {
        self.slots.len() * std::mem::size_of::<AtomicU64>()
    }
}
