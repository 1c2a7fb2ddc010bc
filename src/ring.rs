//! Ring buffer core: the index-based protocol engine and its byte-level face.

use core::cell::UnsafeCell;

use snafu::ensure;

use crate::error::{
    ContentionSnafu, ExhaustedSnafu, OutOfOrderSnafu, RingError, UninitializedSnafu,
};
use crate::index::Index;
use crate::region::Region;

/// Storage-free variant of the ring protocol, operating purely on indices.
///
/// Three cursors advance through a doubled index range `[0, 2N)`: `read`
/// marks where consumption starts, `write` where published data ends, and
/// `alloc` where claimed-but-unpublished space ends. The doubled range keeps
/// a full ring (`write - read == N`) distinguishable from an empty one
/// (`read == write`) even though both put the cursors at the same physical
/// offset. Class invariant, cyclically in `[0, 2N)`:
/// `read <= write <= alloc`.
///
/// Every mutating operation loads the cursors it needs, computes its grant,
/// and attempts exactly one compare-and-swap. A lost swap fails the whole
/// call with [`RingError::Contention`]; retrying is the caller's decision.
pub struct IndexRing {
    capacity: usize,
    read: Index,
    write: Index,
    alloc: Index,
}

impl IndexRing {
    /// Create a ring over `capacity` units of storage.
    ///
    /// A capacity of zero produces an unbound ring on which every operation
    /// fails with [`RingError::Uninitialized`] until [`reset`](Self::reset)
    /// binds a real capacity.
    #[must_use]
    pub const fn new(capacity: usize) -> Self {
        Self {
            capacity,
            read: Index::new(0),
            write: Index::new(0),
            alloc: Index::new(0),
        }
    }

    /// Rebind the capacity and return all cursors to zero.
    ///
    /// Exclusive access makes this the one place cursors move without a
    /// compare-and-swap.
    pub fn reset(&mut self, capacity: usize) {
        self.capacity = capacity;
        self.read.store(0);
        self.write.store(0);
        self.alloc.store(0);
    }

    /// Claim up to `len` contiguous units of free space.
    ///
    /// The claim starts at the `alloc` cursor and never crosses the physical
    /// end of the storage; a request spanning that end is truncated there and
    /// the wrapped remainder must be claimed separately once the truncated
    /// part has been published. With `partial` set, a shortfall grants
    /// whatever contiguous run is available; without it, any shortfall fails.
    /// A grant of zero units is a failure either way.
    pub fn allocate(&self, len: usize, partial: bool) -> Result<Region, RingError> {
        ensure!(self.capacity > 0, UninitializedSnafu);

        let alloc = self.alloc.load();
        let read = self.read.load();

        // Free space overall, clipped to the run that ends at the next
        // physical-end-or-round boundary.
        let free = self.capacity - self.span(read, alloc);
        let contiguous = self.capacity - self.physical(alloc);
        let available = free.min(contiguous);

        let granted = if len <= available {
            len
        } else if partial {
            available
        } else {
            0
        };
        ensure!(
            granted > 0,
            ExhaustedSnafu {
                requested: len,
                available
            }
        );

        let next = self.advance(alloc, granted);
        ensure!(self.alloc.compare_exchange(alloc, next), ContentionSnafu);

        Ok(Region::new(self.physical(alloc), granted))
    }

    /// Publish previously claimed units, making them visible to readers.
    ///
    /// `region.index` must equal the physical address of the `write` cursor:
    /// claims are published in the order they were made, and a region that is
    /// not the next one due is rejected with [`RingError::OutOfOrder`]. The
    /// committed length is `region.len` clipped to the pending claim and to
    /// the physical end of the storage. A producer that never publishes its
    /// claim blocks all later claims from being published.
    pub fn publish(&self, region: Region) -> Result<usize, RingError> {
        ensure!(self.capacity > 0, UninitializedSnafu);

        let write = self.write.load();
        let alloc = self.alloc.load();

        let expected = self.physical(write);
        ensure!(
            region.index == expected,
            OutOfOrderSnafu {
                expected,
                got: region.index
            }
        );

        let claimed = self.span(write, alloc);
        ensure!(
            claimed > 0,
            ExhaustedSnafu {
                requested: region.len,
                available: 0usize
            }
        );

        // A single commit never crosses the physical end of the storage.
        let contiguous = claimed.min(self.capacity - expected);
        let committed = region.len.min(contiguous);

        let next = self.advance(write, committed);
        ensure!(self.write.compare_exchange(write, next), ContentionSnafu);

        Ok(committed)
    }

    /// Observe up to `len` contiguous published units without consuming them.
    ///
    /// Same partial-result policy as [`allocate`](Self::allocate). Repeated
    /// peeks with no intervening consume return equal regions.
    pub fn peek(&self, len: usize, partial: bool) -> Result<Region, RingError> {
        ensure!(self.capacity > 0, UninitializedSnafu);

        let read = self.read.load();
        let write = self.write.load();

        let index = self.physical(read);
        let readable = self.span(read, write);
        let available = readable.min(self.capacity - index);

        let granted = if len <= available {
            len
        } else if partial {
            available
        } else {
            0
        };
        ensure!(
            granted > 0,
            ExhaustedSnafu {
                requested: len,
                available
            }
        );

        Ok(Region::new(index, granted))
    }

    /// Release previously peeked units back to the free pool.
    ///
    /// `region.index` must equal the physical address of the `read` cursor;
    /// stale or out-of-order regions are rejected, which catches
    /// double-consume. The released length is `region.len` clipped to the
    /// published run and to the physical end of the storage.
    pub fn consume(&self, region: Region) -> Result<usize, RingError> {
        ensure!(self.capacity > 0, UninitializedSnafu);

        let read = self.read.load();
        let write = self.write.load();

        let expected = self.physical(read);
        ensure!(
            region.index == expected,
            OutOfOrderSnafu {
                expected,
                got: region.index
            }
        );

        let readable = self.span(read, write);
        ensure!(
            readable > 0,
            ExhaustedSnafu {
                requested: region.len,
                available: 0usize
            }
        );

        let contiguous = readable.min(self.capacity - expected);
        let released = region.len.min(contiguous);

        let next = self.advance(read, released);
        ensure!(self.read.compare_exchange(read, next), ContentionSnafu);

        Ok(released)
    }

    /// Published-but-unconsumed units, in `[0, capacity]`.
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        if self.capacity == 0 {
            return 0;
        }
        self.span(self.read.load(), self.write.load())
    }

    /// Total storage units, zero before binding.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// True if nothing is published and unconsumed.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Distance from `from` to `to` in the doubled index range.
    #[inline]
    fn span(&self, from: usize, to: usize) -> usize {
        let d = to + 2 * self.capacity - from;
        if d >= 2 * self.capacity { d - 2 * self.capacity } else { d }
    }

    /// Physical storage offset of a cursor value.
    #[inline]
    fn physical(&self, idx: usize) -> usize {
        if idx >= self.capacity { idx - self.capacity } else { idx }
    }

    /// Move a cursor value forward, wrapping at `2 * capacity`.
    #[inline]
    fn advance(&self, idx: usize, by: usize) -> usize {
        let next = idx + by;
        if next >= 2 * self.capacity { next - 2 * self.capacity } else { next }
    }
}

/// Byte-level ring over caller-owned storage.
///
/// Constructed unbound (capacity zero); [`init`](Self::init) binds the
/// storage exactly once per use and is the only way cursors reset. All
/// protocol behavior is [`IndexRing`]'s; this type adds slice access to
/// claimed and published regions.
///
/// The ring itself never reads or writes the storage. Callers write through
/// [`claimed_mut_unchecked`](Self::claimed_mut_unchecked) between `allocate`
/// and `publish`, and read through
/// [`readable_unchecked`](Self::readable_unchecked) between `peek` and
/// `consume`; the protocol keeps those regions disjoint.
pub struct ByteRing<'buf> {
    storage: &'buf [UnsafeCell<u8>],
    ring: IndexRing,
}

unsafe impl Send for ByteRing<'_> {}

#[cfg(not(feature = "no-atomics"))]
unsafe impl Sync for ByteRing<'_> {}

impl<'buf> ByteRing<'buf> {
    /// Create an unbound ring with capacity zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            storage: &[],
            ring: IndexRing::new(0),
        }
    }

    /// Bind backing storage and reset all cursors.
    ///
    /// Exclusive access rules out running concurrently with any other
    /// operation on the ring.
    pub fn init(&mut self, storage: &'buf mut [u8]) {
        let len = storage.len();
        // An exclusive borrow may be viewed as a run of shared cells.
        self.storage = unsafe { &*(storage as *mut [u8] as *const [UnsafeCell<u8>]) };
        self.ring.reset(len);
    }

    /// Claim up to `len` contiguous free bytes. See [`IndexRing::allocate`].
    pub fn allocate(&self, len: usize, partial: bool) -> Result<Region, RingError> {
        self.ring.allocate(len, partial)
    }

    /// Publish claimed bytes in claim order. See [`IndexRing::publish`].
    pub fn publish(&self, region: Region) -> Result<usize, RingError> {
        self.ring.publish(region)
    }

    /// Observe published bytes without consuming. See [`IndexRing::peek`].
    pub fn peek(&self, len: usize, partial: bool) -> Result<Region, RingError> {
        self.ring.peek(len, partial)
    }

    /// Release peeked bytes back to the free pool. See [`IndexRing::consume`].
    pub fn consume(&self, region: Region) -> Result<usize, RingError> {
        self.ring.consume(region)
    }

    /// Published-but-unconsumed byte count.
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.ring.size()
    }

    /// Storage length in bytes, zero before [`init`](Self::init).
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.ring.capacity()
    }

    /// True if nothing is published and unconsumed.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Write access to a claimed region.
    ///
    /// # Safety
    /// `region` must come from [`allocate`](Self::allocate) on this ring and
    /// not yet have been published, and no other reference to its bytes may
    /// be live.
    #[inline]
    #[allow(clippy::mut_from_ref)]
    pub unsafe fn claimed_mut_unchecked(&self, region: Region) -> &mut [u8] {
        let cells = &self.storage[region.index..region.index + region.len];
        let ptr = UnsafeCell::raw_get(cells.as_ptr());
        unsafe { core::slice::from_raw_parts_mut(ptr, cells.len()) }
    }

    /// Read access to a peeked region.
    ///
    /// # Safety
    /// `region` must come from [`peek`](Self::peek) on this ring and not yet
    /// have been consumed.
    #[inline]
    pub unsafe fn readable_unchecked(&self, region: Region) -> &[u8] {
        let cells = &self.storage[region.index..region.index + region.len];
        unsafe { &*(cells as *const [UnsafeCell<u8>] as *const [u8]) }
    }
}

impl Default for ByteRing<'_> {
    fn default() -> Self {
        Self::new()
    }
}
