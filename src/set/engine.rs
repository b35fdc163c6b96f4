//! The Port Set Entity
//!
//! This module ties the two storage variants together into the set entity
//! that commands operate on: fixed inclusive port bounds, a membership
//! store chosen once at creation, and the lock discipline that lets the
//! packet path race safely with the background sweeper.
//!
//! ## Variants
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                        PortSet                           │
//! │  range: [first_port ..= last_port]   (fixed at creation) │
//! │                                                          │
//! │  members: RwLock<Members>                                │
//! │     ├── Bitmap(MembershipBitmap)     1 bit / id          │
//! │     └── Expiring(ExpiringTable)      1 slot / id         │
//! │                                                          │
//! │  sweeper: ExpirySweeper              (Expiring only)     │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The variant is picked by whether a default timeout was supplied at
//! creation and never changes afterwards. Only element presence and expiry
//! state mutate during the set's lifetime.
//!
//! ## Locking Contract
//!
//! The set owns a reader/writer lock around its member storage. Membership
//! tests and the expiry sweep take the shared mode; `add`, `remove` and
//! `flush` take the exclusive mode. The storage words are atomic, so the
//! sweep may reset expired slots while holding only the shared mode: the
//! exclusive mode exists to serialize mutating commands against each other
//! and against the sweep pass, not to protect individual word accesses.
//! Callers embedding a [`PortSet`] get this discipline for free by going
//! through the methods here.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info};

use crate::set::bitmap::MembershipBitmap;
use crate::set::expiring::ExpiringTable;
use crate::set::sweeper::{sweep_period, ExpirySweeper};

/// Errors surfaced by set operations.
///
/// Every failing command maps to exactly one of these kinds; there is no
/// catch-all failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SetError {
    /// A port or resolved range falls outside the set's bounds.
    #[error("port is outside the set range")]
    OutOfRange,

    /// Malformed command data, or an attribute the variant does not accept.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Add of an element that is already present (and not expired).
    #[error("element already exists")]
    AlreadyExists,

    /// Delete or lookup of an element that is absent or expired.
    #[error("element does not exist")]
    DoesNotExist,

    /// Member storage could not be allocated at creation.
    #[error("cannot allocate set storage")]
    AllocationFailed,
}

/// The inclusive port bounds a set is created with.
///
/// Element ids are zero-based offsets into this range; every id is derived
/// from a port already validated to lie inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortRange {
    first: u16,
    last: u16,
}

impl PortRange {
    /// Builds a range from creation bounds, swapping a reversed pair.
    ///
    /// Creation is tolerant of descending input; runtime commands are not.
    pub fn new(first: u16, last: u16) -> Self {
        if first > last {
            Self { first: last, last: first }
        } else {
            Self { first, last }
        }
    }

    /// Lowest port in the range, inclusive.
    pub fn first_port(&self) -> u16 {
        self.first
    }

    /// Highest port in the range, inclusive.
    pub fn last_port(&self) -> u16 {
        self.last
    }

    /// Whether `port` lies inside the range.
    #[inline]
    pub fn contains(&self, port: u16) -> bool {
        port >= self.first && port <= self.last
    }

    /// Number of element ids the range covers.
    ///
    /// Computed in `u32`: a full-width range holds 65536 ids, one more
    /// than `u16` can represent.
    pub fn capacity(&self) -> u32 {
        u32::from(self.last) - u32::from(self.first) + 1
    }

    #[inline]
    fn id_of(&self, port: u16) -> u32 {
        debug_assert!(self.contains(port));
        u32::from(port) - u32::from(self.first)
    }

    #[inline]
    fn port_of(&self, id: u32) -> u16 {
        debug_assert!(id < self.capacity());
        (u32::from(self.first) + id) as u16
    }
}

/// Creation parameters for a set, as decoded from a create command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetParams {
    /// One end of the port range (may arrive reversed; see [`PortRange::new`]).
    pub first_port: u16,
    /// The other end of the port range.
    pub last_port: u16,
    /// Default element timeout in seconds; `Some` selects the expiring
    /// variant, `None` the plain bitmap.
    pub timeout: Option<u32>,
}

/// The membership storage, fixed to one variant at creation.
#[derive(Debug)]
enum Members {
    Bitmap(MembershipBitmap),
    Expiring(ExpiringTable),
}

impl Members {
    fn mem_size(&self) -> usize {
        match self {
            Members::Bitmap(map) => map.mem_size(),
            Members::Expiring(table) => table.mem_size(),
        }
    }
}

/// Metadata answered by a head command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadInfo {
    pub first_port: u16,
    pub last_port: u16,
    /// Default timeout in seconds; present for the expiring variant only.
    pub timeout: Option<u32>,
    /// External references, the internal bookkeeping one excluded.
    pub references: u32,
    /// Fixed struct size plus member storage size, in bytes.
    pub mem_size: u32,
}

/// Resumable position within a listing pass.
///
/// The caller holds the cursor between pages: a fresh dump starts at
/// [`ListCursor::start`], and a [`ListOutcome::More`] hands back the cursor
/// to resume from. Reaching the end of the range finishes the dump, so the
/// next pass starts over from a fresh cursor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListCursor {
    next_id: u32,
}

impl ListCursor {
    /// Cursor positioned at the first element id.
    pub fn start() -> Self {
        Self::default()
    }

    /// Cursor resuming at a given element id.
    pub fn at(id: u32) -> Self {
        Self { next_id: id }
    }

    /// The smallest element id not yet examined.
    pub fn position(&self) -> u32 {
        self.next_id
    }
}

/// One member entry produced by a listing pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberRecord {
    pub port: u16,
    /// Remaining whole seconds for the expiring variant (0 for a permanent
    /// element); `None` for the plain bitmap.
    pub remaining: Option<u32>,
}

/// How a listing page ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListOutcome {
    /// Every id up to the range bound was examined; the dump is complete.
    Finished,
    /// The page filled up; resume from the contained cursor.
    More(ListCursor),
    /// The very first record of the page did not fit the output budget.
    PageFull,
}

/// A fixed-range port membership set.
///
/// Created once, destroyed once; bounds and variant never change in
/// between. See the module documentation for the locking contract.
///
/// # Example
///
/// ```
/// use portset::set::{PortSet, SetParams};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let set = PortSet::create(SetParams {
///     first_port: 1000,
///     last_port: 1999,
///     timeout: None,
/// })
/// .unwrap();
///
/// set.add(1080, 1080, None, false).unwrap();
/// assert!(set.matches(1080));
/// assert!(!set.matches(2000)); // outside the range: never a match
/// set.destroy().await;
/// # }
/// ```
#[derive(Debug)]
pub struct PortSet {
    range: PortRange,
    /// Default timeout in seconds; `Some` iff the expiring variant.
    default_timeout: Option<u32>,
    members: RwLock<Members>,
    /// Handle to the background sweeper; taken exactly once, by destroy.
    sweeper: Mutex<Option<ExpirySweeper>>,
    /// Reference counter; starts at one for the set's own bookkeeping.
    references: AtomicU32,
}

impl PortSet {
    /// Creates a set, allocating storage and, for the expiring variant,
    /// starting its background sweeper.
    ///
    /// Reversed bounds are normalized by swapping. On allocation failure
    /// nothing is left behind: no storage, no sweeper task.
    pub fn create(params: SetParams) -> Result<Arc<Self>, SetError> {
        let range = PortRange::new(params.first_port, params.last_port);
        let capacity = range.capacity();

        let members = match params.timeout {
            None => Members::Bitmap(MembershipBitmap::new(capacity)?),
            Some(_) => Members::Expiring(ExpiringTable::new(capacity)?),
        };

        let set = Arc::new(Self {
            range,
            default_timeout: params.timeout,
            members: RwLock::new(members),
            sweeper: Mutex::new(None),
            references: AtomicU32::new(1),
        });

        if let Some(timeout) = params.timeout {
            let sweeper = ExpirySweeper::start(Arc::downgrade(&set), sweep_period(timeout));
            *set.sweeper.lock().unwrap() = Some(sweeper);
        }

        info!(
            first_port = range.first_port(),
            last_port = range.last_port(),
            timeout = params.timeout,
            "port set created"
        );

        Ok(set)
    }

    /// The bounds the set was created with.
    pub fn range(&self) -> PortRange {
        self.range
    }

    /// The default element timeout; `Some` iff this is the expiring variant.
    pub fn default_timeout(&self) -> Option<u32> {
        self.default_timeout
    }

    /// Packet-path membership lookup.
    ///
    /// A port outside the set's range is simply not a match; no error is
    /// involved. Takes the shared lock mode.
    #[inline]
    pub fn matches(&self, port: u16) -> bool {
        if !self.range.contains(port) {
            return false;
        }
        let id = self.range.id_of(port);
        match &*self.members.read().unwrap() {
            Members::Bitmap(map) => map.test(id),
            Members::Expiring(table) => table.test(id),
        }
    }

    /// Command-path membership test.
    ///
    /// Unlike [`matches`](Self::matches), an out-of-range port is an error
    /// here, not a miss.
    pub fn test(&self, port: u16) -> Result<bool, SetError> {
        if !self.range.contains(port) {
            return Err(SetError::OutOfRange);
        }
        let id = self.range.id_of(port);
        let present = match &*self.members.read().unwrap() {
            Members::Bitmap(map) => map.test(id),
            Members::Expiring(table) => table.test(id),
        };
        Ok(present)
    }

    /// Converts per-add timeout seconds into the table's lifetime input.
    fn ttl_of(&self, timeout: Option<u32>) -> Option<Duration> {
        let seconds = timeout.or(self.default_timeout).unwrap_or(0);
        // Zero seconds means "never expires".
        (seconds > 0).then(|| Duration::from_secs(u64::from(seconds)))
    }

    /// Adds every port in `first..=last`, walking ascending.
    ///
    /// `timeout` overrides the set's default for these elements and is
    /// rejected on the plain bitmap variant. With `absorb` set, an element
    /// that is already present is skipped and the walk continues; without
    /// it, the walk aborts on the conflict, leaving earlier elements added
    /// (there is no rollback).
    pub fn add(
        &self,
        first: u16,
        last: u16,
        timeout: Option<u32>,
        absorb: bool,
    ) -> Result<(), SetError> {
        self.check_span(first, last)?;
        if timeout.is_some() && self.default_timeout.is_none() {
            return Err(SetError::Protocol(
                "timeout supplied to a set without timeout support".to_string(),
            ));
        }
        let ttl = self.ttl_of(timeout);

        let members = self.members.write().unwrap();
        for port in u32::from(first)..=u32::from(last) {
            let id = port - u32::from(self.range.first);
            let result = match &*members {
                Members::Bitmap(map) => map.add(id),
                Members::Expiring(table) => table.add(id, ttl),
            };
            match result {
                Ok(()) => {}
                Err(SetError::AlreadyExists) if absorb => {}
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    /// Deletes every port in `first..=last`, walking ascending.
    ///
    /// With `absorb` set, an element that is already absent is skipped and
    /// the walk continues; without it, the walk aborts on the conflict,
    /// leaving earlier elements deleted.
    pub fn remove(&self, first: u16, last: u16, absorb: bool) -> Result<(), SetError> {
        self.check_span(first, last)?;

        let members = self.members.write().unwrap();
        for port in u32::from(first)..=u32::from(last) {
            let id = port - u32::from(self.range.first);
            let result = match &*members {
                Members::Bitmap(map) => map.remove(id),
                Members::Expiring(table) => table.remove(id),
            };
            match result {
                Ok(()) => {}
                Err(SetError::DoesNotExist) if absorb => {}
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    fn check_span(&self, first: u16, last: u16) -> Result<(), SetError> {
        if first > last || !self.range.contains(first) || !self.range.contains(last) {
            return Err(SetError::OutOfRange);
        }
        Ok(())
    }

    /// Clears every element. Bounds and variant are unchanged.
    pub fn flush(&self) {
        let members = self.members.write().unwrap();
        match &*members {
            Members::Bitmap(map) => map.flush(),
            Members::Expiring(table) => table.flush(),
        }
        debug!(
            first_port = self.range.first_port(),
            last_port = self.range.last_port(),
            "set flushed"
        );
    }

    /// Answers the head command: bounds, default timeout, external
    /// references and total memory footprint.
    pub fn head(&self) -> HeadInfo {
        let members = self.members.read().unwrap();
        HeadInfo {
            first_port: self.range.first_port(),
            last_port: self.range.last_port(),
            timeout: self.default_timeout,
            references: self.references.load(Ordering::Acquire).saturating_sub(1),
            mem_size: (std::mem::size_of::<Self>() + members.mem_size()) as u32,
        }
    }

    /// Produces one bounded listing page.
    ///
    /// Scans ids upward from the cursor, handing each present member to
    /// `emit`. `emit` returns `false` when the record no longer fits the
    /// caller's output budget: if that happens on the first record of the
    /// page the whole page fails ([`ListOutcome::PageFull`]); later, the
    /// page simply ends at the last emitted record and the returned cursor
    /// resumes at the unexamined id.
    pub fn list_page(
        &self,
        cursor: ListCursor,
        mut emit: impl FnMut(&MemberRecord) -> bool,
    ) -> ListOutcome {
        let members = self.members.read().unwrap();
        let mut emitted = 0usize;

        for id in cursor.next_id..self.range.capacity() {
            let record = match &*members {
                Members::Bitmap(map) => map.test(id).then_some(MemberRecord {
                    port: self.range.port_of(id),
                    remaining: None,
                }),
                Members::Expiring(table) => table.remaining(id).map(|left| MemberRecord {
                    port: self.range.port_of(id),
                    remaining: Some(left.as_secs() as u32),
                }),
            };

            if let Some(record) = record {
                if !emit(&record) {
                    if emitted == 0 {
                        return ListOutcome::PageFull;
                    }
                    return ListOutcome::More(ListCursor::at(id));
                }
                emitted += 1;
            }
        }

        ListOutcome::Finished
    }

    /// Structural equivalence: same bounds and, for the expiring variant,
    /// the same default timeout. Membership contents do not participate.
    pub fn same_set(&self, other: &PortSet) -> bool {
        self.range == other.range && self.default_timeout == other.default_timeout
    }

    /// Whether creation parameters describe a set equivalent to this one.
    ///
    /// Used to recognize a recreate with identical parameters as a no-op.
    pub fn same_params(&self, params: &SetParams) -> bool {
        self.range == PortRange::new(params.first_port, params.last_port)
            && self.default_timeout == params.timeout
    }

    /// Registers an external reference to the set.
    pub fn acquire(&self) {
        self.references.fetch_add(1, Ordering::AcqRel);
    }

    /// Drops an external reference to the set.
    pub fn release(&self) {
        self.references.fetch_sub(1, Ordering::AcqRel);
    }

    /// One expiry sweep pass; called by the background sweeper.
    ///
    /// Takes the shared lock mode, so it runs concurrently with membership
    /// tests while mutating commands are locked out. A no-op on the plain
    /// bitmap variant and on a table with nothing expired.
    pub(crate) fn sweep(&self) {
        let members = self.members.read().unwrap();
        if let Members::Expiring(table) = &*members {
            let cleared = table.clear_expired();
            if cleared > 0 {
                debug!(cleared, "expired elements reclaimed");
            }
        }
    }

    /// Stops the background sweeper and waits for any in-flight sweep to
    /// finish before returning.
    ///
    /// Storage cannot be observed by a sweep after this completes: the
    /// task is joined, not merely signalled. Safe to call more than once;
    /// a plain bitmap set has no sweeper and returns immediately.
    pub async fn destroy(&self) {
        let sweeper = self.sweeper.lock().unwrap().take();
        if let Some(sweeper) = sweeper {
            sweeper.shutdown().await;
        }
        info!(
            first_port = self.range.first_port(),
            last_port = self.range.last_port(),
            "port set destroyed"
        );
    }

    /// Number of physically occupied member slots, for sweeper tests.
    #[cfg(test)]
    pub(crate) fn occupied(&self) -> u32 {
        match &*self.members.read().unwrap() {
            Members::Bitmap(map) => map.occupied(),
            Members::Expiring(table) => table.occupied(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bitmap_set(first: u16, last: u16) -> Arc<PortSet> {
        PortSet::create(SetParams {
            first_port: first,
            last_port: last,
            timeout: None,
        })
        .unwrap()
    }

    #[test]
    fn test_range_normalizes_reversed_bounds() {
        let range = PortRange::new(2000, 1000);
        assert_eq!(range.first_port(), 1000);
        assert_eq!(range.last_port(), 2000);
        assert_eq!(range.capacity(), 1001);
    }

    #[test]
    fn test_full_width_range_capacity() {
        assert_eq!(PortRange::new(0, 65535).capacity(), 65536);
    }

    #[test]
    fn test_add_then_test_then_remove() {
        let set = bitmap_set(100, 200);

        assert_eq!(set.test(150), Ok(false));
        set.add(150, 150, None, false).unwrap();
        assert_eq!(set.test(150), Ok(true));
        set.remove(150, 150, false).unwrap();
        assert_eq!(set.test(150), Ok(false));
    }

    #[test]
    fn test_double_add_and_missing_delete() {
        let set = bitmap_set(0, 100);

        set.add(5, 5, None, false).unwrap();
        assert_eq!(set.add(5, 5, None, false), Err(SetError::AlreadyExists));
        assert_eq!(set.remove(6, 6, false), Err(SetError::DoesNotExist));
    }

    #[test]
    fn test_out_of_range_is_fatal() {
        let set = bitmap_set(100, 200);

        assert_eq!(set.test(99), Err(SetError::OutOfRange));
        assert_eq!(set.add(201, 201, None, false), Err(SetError::OutOfRange));
        assert_eq!(set.remove(50, 150, false), Err(SetError::OutOfRange));
    }

    #[test]
    fn test_matches_treats_out_of_range_as_miss() {
        let set = bitmap_set(100, 200);
        set.add(100, 100, None, false).unwrap();

        assert!(set.matches(100));
        assert!(!set.matches(99));
        assert!(!set.matches(300));
    }

    #[test]
    fn test_range_add_and_delete() {
        let set = bitmap_set(0, 1000);

        set.add(10, 20, None, true).unwrap();
        for port in 10..=20 {
            assert_eq!(set.test(port), Ok(true));
        }
        assert_eq!(set.test(9), Ok(false));
        assert_eq!(set.test(21), Ok(false));

        // Deleting a wider range absorbs the already-absent elements.
        set.remove(5, 25, true).unwrap();
        for port in 5..=25 {
            assert_eq!(set.test(port), Ok(false));
        }
    }

    #[test]
    fn test_range_add_absorbs_existing() {
        let set = bitmap_set(0, 100);

        set.add(15, 15, None, false).unwrap();
        set.add(10, 20, None, true).unwrap();
        for port in 10..=20 {
            assert_eq!(set.test(port), Ok(true));
        }
    }

    #[test]
    fn test_strict_range_add_aborts_without_rollback() {
        let set = bitmap_set(0, 100);

        set.add(15, 15, None, false).unwrap();
        assert_eq!(set.add(10, 20, None, false), Err(SetError::AlreadyExists));

        // The prefix before the conflict stays mutated.
        for port in 10..15 {
            assert_eq!(set.test(port), Ok(true));
        }
        for port in 16..=20 {
            assert_eq!(set.test(port), Ok(false));
        }
    }

    #[test]
    fn test_timeout_rejected_on_bitmap_variant() {
        let set = bitmap_set(0, 100);
        assert!(matches!(
            set.add(1, 1, Some(30), false),
            Err(SetError::Protocol(_))
        ));
    }

    #[test]
    fn test_flush_then_fresh_adds() {
        let set = bitmap_set(0, 100);

        set.add(0, 100, None, true).unwrap();
        set.flush();
        for port in 0..=100 {
            assert_eq!(set.test(port), Ok(false));
        }
        set.add(42, 42, None, false).unwrap();
        assert_eq!(set.test(42), Ok(true));
    }

    #[test]
    fn test_head_metadata() {
        let set = bitmap_set(1000, 1999);
        let head = set.head();

        assert_eq!(head.first_port, 1000);
        assert_eq!(head.last_port, 1999);
        assert_eq!(head.timeout, None);
        assert_eq!(head.references, 0);
        // 1000 bits round up to 16 words of storage plus the struct itself.
        assert_eq!(
            head.mem_size as usize,
            std::mem::size_of::<PortSet>() + 128
        );

        set.acquire();
        set.acquire();
        assert_eq!(set.head().references, 2);
        set.release();
        assert_eq!(set.head().references, 1);
    }

    #[tokio::test]
    async fn test_head_reports_default_timeout() {
        let set = PortSet::create(SetParams {
            first_port: 0,
            last_port: 10,
            timeout: Some(300),
        })
        .unwrap();

        assert_eq!(set.head().timeout, Some(300));
        set.destroy().await;
    }

    #[test]
    fn test_same_set() {
        let a = bitmap_set(0, 100);
        let b = bitmap_set(0, 100);
        let c = bitmap_set(0, 101);

        // Reflexive, and contents do not participate.
        assert!(a.same_set(&a));
        a.add(5, 5, None, false).unwrap();
        assert!(a.same_set(&b));
        assert!(!a.same_set(&c));
    }

    #[tokio::test]
    async fn test_same_set_compares_timeout() {
        let plain = bitmap_set(0, 100);
        let expiring = PortSet::create(SetParams {
            first_port: 0,
            last_port: 100,
            timeout: Some(60),
        })
        .unwrap();
        let expiring_other = PortSet::create(SetParams {
            first_port: 0,
            last_port: 100,
            timeout: Some(90),
        })
        .unwrap();

        assert!(!plain.same_set(&expiring));
        assert!(!expiring.same_set(&expiring_other));
        assert!(expiring.same_params(&SetParams {
            first_port: 0,
            last_port: 100,
            timeout: Some(60),
        }));
        // Reversed bounds normalize before comparing.
        assert!(plain.same_params(&SetParams {
            first_port: 100,
            last_port: 0,
            timeout: None,
        }));

        expiring.destroy().await;
        expiring_other.destroy().await;
    }

    #[test]
    fn test_listing_collects_every_member_once() {
        let set = bitmap_set(100, 300);
        for port in [100u16, 101, 155, 223, 300] {
            set.add(port, port, None, false).unwrap();
        }

        let mut ports = Vec::new();
        let outcome = set.list_page(ListCursor::start(), |record| {
            ports.push(record.port);
            true
        });

        assert_eq!(outcome, ListOutcome::Finished);
        assert_eq!(ports, vec![100, 101, 155, 223, 300]);
    }

    #[test]
    fn test_listing_empty_set() {
        let set = bitmap_set(0, 100);
        let outcome = set.list_page(ListCursor::start(), |_| panic!("nothing to emit"));
        assert_eq!(outcome, ListOutcome::Finished);
    }

    #[test]
    fn test_listing_resumes_across_pages() {
        let set = bitmap_set(0, 1000);
        set.add(0, 1000, None, true).unwrap();

        let mut pages = 0;
        let mut collected = Vec::new();
        let mut cursor = ListCursor::start();

        loop {
            let mut in_page = 0;
            let outcome = set.list_page(cursor, |record| {
                if in_page == 300 {
                    return false;
                }
                collected.push(record.port);
                in_page += 1;
                true
            });
            pages += 1;
            match outcome {
                ListOutcome::More(next) => cursor = next,
                ListOutcome::Finished => break,
                ListOutcome::PageFull => panic!("page budget admits 300 records"),
            }
        }

        assert_eq!(pages, 4);
        assert_eq!(collected.len(), 1001);
        assert_eq!(collected, (0u16..=1000).collect::<Vec<_>>());
    }

    #[test]
    fn test_listing_page_full_on_first_record() {
        let set = bitmap_set(0, 100);
        set.add(50, 50, None, false).unwrap();

        let outcome = set.list_page(ListCursor::start(), |_| false);
        assert_eq!(outcome, ListOutcome::PageFull);
    }

    #[tokio::test]
    async fn test_expiring_set_lazy_expiry_via_test() {
        let set = PortSet::create(SetParams {
            first_port: 0,
            last_port: 10,
            timeout: Some(1),
        })
        .unwrap();

        set.add(3, 3, None, false).unwrap();
        assert_eq!(set.test(3), Ok(true));

        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert_eq!(set.test(3), Ok(false));

        // A fresh add over the stale slot succeeds.
        set.add(3, 3, None, false).unwrap();
        assert_eq!(set.test(3), Ok(true));

        set.destroy().await;
    }

    #[tokio::test]
    async fn test_expiring_set_per_command_timeout_and_listing() {
        let set = PortSet::create(SetParams {
            first_port: 0,
            last_port: 10,
            timeout: Some(600),
        })
        .unwrap();

        set.add(1, 1, None, false).unwrap();
        set.add(2, 2, Some(0), false).unwrap(); // never expires
        set.add(4, 4, Some(30), false).unwrap();

        let mut records = Vec::new();
        let outcome = set.list_page(ListCursor::start(), |record| {
            records.push(*record);
            true
        });
        assert_eq!(outcome, ListOutcome::Finished);
        assert_eq!(records.len(), 3);

        assert_eq!(records[0].port, 1);
        let left = records[0].remaining.unwrap();
        assert!(left > 590 && left <= 600);

        assert_eq!(records[1].remaining, Some(0));

        let left = records[2].remaining.unwrap();
        assert!(left > 20 && left <= 30);

        set.destroy().await;
    }
}
