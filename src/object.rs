//! Typed adapter moving whole elements through the byte protocol.

use core::cell::UnsafeCell;
use core::mem::MaybeUninit;

use crate::error::RingError;
use crate::region::Region;
use crate::ring::IndexRing;

/// Ring buffer of `CAP` elements of `T`, backed by the claim/publish
/// protocol.
///
/// Embeds its own storage and an [`IndexRing`] counting bytes; the adapter
/// only converts element counts to byte counts and back. All protocol
/// guarantees apply unchanged, expressed in element units. `Region`s produced
/// by this type carry element offsets and lengths.
///
/// Elements are claimed uninitialized, written in place, then published;
/// published elements are peeked by reference and consumed to free their
/// slots. [`push`](Self::push) and [`pop`](Self::pop) bundle those steps for
/// the single-producer / single-consumer case.
pub struct ObjectRing<T, const CAP: usize> {
    storage: [UnsafeCell<MaybeUninit<T>>; CAP],
    ring: IndexRing,
}

unsafe impl<T: Send, const CAP: usize> Send for ObjectRing<T, CAP> {}

#[cfg(not(feature = "no-atomics"))]
unsafe impl<T: Send, const CAP: usize> Sync for ObjectRing<T, CAP> {}

impl<T, const CAP: usize> ObjectRing<T, CAP> {
    // `size_of` already rounds the element size up to its alignment, so it
    // doubles as the storage stride.
    const STRIDE: usize = size_of::<T>();

    /// Create an empty ring.
    #[must_use]
    pub const fn new() -> Self {
        const { assert!(CAP > 0, "capacity must be > 0") };
        const { assert!(size_of::<T>() > 0, "zero-sized elements are not supported") };

        Self {
            storage: [const { UnsafeCell::new(MaybeUninit::uninit()) }; CAP],
            ring: IndexRing::new(CAP * Self::STRIDE),
        }
    }

    /// Claim exactly `n` contiguous element slots.
    ///
    /// The claim never crosses the physical end of the storage, so fewer than
    /// `n` contiguous slots before that end fails even when the ring has
    /// room overall.
    pub fn allocate(&self, n: usize) -> Result<Region, RingError> {
        self.ring
            .allocate(n * Self::STRIDE, false)
            .map(Self::to_elems)
            .map_err(Self::elem_err)
    }

    /// Publish claimed slots in claim order. Returns elements published.
    pub fn publish(&self, region: Region) -> Result<usize, RingError> {
        self.ring
            .publish(Self::to_bytes(region))
            .map(|n| n / Self::STRIDE)
            .map_err(Self::elem_err)
    }

    /// Observe exactly `n` published elements without consuming them.
    pub fn peek(&self, n: usize) -> Result<Region, RingError> {
        self.ring
            .peek(n * Self::STRIDE, false)
            .map(Self::to_elems)
            .map_err(Self::elem_err)
    }

    /// Release peeked elements back to the free pool. Returns elements
    /// released.
    pub fn consume(&self, region: Region) -> Result<usize, RingError> {
        self.ring
            .consume(Self::to_bytes(region))
            .map(|n| n / Self::STRIDE)
            .map_err(Self::elem_err)
    }

    /// Published-but-unconsumed element count.
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.ring.size() / Self::STRIDE
    }

    /// Element capacity.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        CAP
    }

    /// True if nothing is published and unconsumed.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Write access to claimed element slots.
    ///
    /// # Safety
    /// `region` must come from [`allocate`](Self::allocate) on this ring and
    /// not yet have been published, and no other reference to those slots may
    /// be live.
    #[inline]
    #[allow(clippy::mut_from_ref)]
    pub unsafe fn claimed_mut_unchecked(&self, region: Region) -> &mut [MaybeUninit<T>] {
        let cells = &self.storage[region.index..region.index + region.len];
        let ptr = UnsafeCell::raw_get(cells.as_ptr());
        unsafe { core::slice::from_raw_parts_mut(ptr, cells.len()) }
    }

    /// Read access to peeked elements.
    ///
    /// # Safety
    /// `region` must come from [`peek`](Self::peek) on this ring and not yet
    /// have been consumed. Peeked slots are always initialized.
    #[inline]
    pub unsafe fn readable_unchecked(&self, region: Region) -> &[T] {
        let cells = &self.storage[region.index..region.index + region.len];
        unsafe { &*(cells as *const [UnsafeCell<MaybeUninit<T>>] as *const [T]) }
    }

    /// Claim, write, and publish a single element.
    ///
    /// Returns the value if no slot is free or publishing it lost a race.
    /// Intended for a single producer; with concurrent producers, claim and
    /// publish explicitly.
    pub fn push(&self, value: T) -> Result<(), T> {
        let Ok(region) = self.allocate(1) else {
            return Err(value);
        };
        unsafe {
            self.claimed_mut_unchecked(region)[0].write(value);
        }
        match self.publish(region) {
            Ok(_) => Ok(()),
            // The slot stays claimed; hand the value back rather than lose it.
            Err(_) => Err(unsafe { self.claimed_mut_unchecked(region)[0].assume_init_read() }),
        }
    }

    /// Peek, move out, and consume the oldest element.
    ///
    /// Intended for a single consumer; with concurrent consumers, peek and
    /// consume explicitly.
    #[must_use]
    pub fn pop(&self) -> Option<T> {
        let region = self.peek(1).ok()?;
        let value = unsafe { (*self.storage[region.index].get()).assume_init_read() };
        match self.consume(region) {
            Ok(_) => Some(value),
            Err(_) => {
                // A racing consumer released the slot first and owns the value.
                core::mem::forget(value);
                None
            }
        }
    }

    #[inline]
    const fn to_bytes(region: Region) -> Region {
        Region::new(region.index * Self::STRIDE, region.len * Self::STRIDE)
    }

    #[inline]
    const fn to_elems(region: Region) -> Region {
        Region::new(region.index / Self::STRIDE, region.len / Self::STRIDE)
    }

    /// Errors leave the adapter in element units, like every other length.
    fn elem_err(err: RingError) -> RingError {
        match err {
            RingError::Exhausted {
                requested,
                available,
            } => RingError::Exhausted {
                requested: requested / Self::STRIDE,
                available: available / Self::STRIDE,
            },
            RingError::OutOfOrder { expected, got } => RingError::OutOfOrder {
                expected: expected / Self::STRIDE,
                got: got / Self::STRIDE,
            },
            RingError::Contention | RingError::Uninitialized => err,
        }
    }
}

impl<T, const CAP: usize> Default for ObjectRing<T, CAP> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const CAP: usize> Drop for ObjectRing<T, CAP> {
    fn drop(&mut self) {
        // Claimed-but-unpublished slots were never initialized and are left
        // alone; published elements still pending are dropped here.
        while self.pop().is_some() {}
    }
}
