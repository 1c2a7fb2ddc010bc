//! Cursor cell for atomic or non-atomic access.

#[cfg(not(feature = "no-atomics"))]
mod atomic {
    use core::sync::atomic::{AtomicUsize, Ordering};

    /// Atomic cursor using Acquire/Release ordering.
    #[repr(transparent)]
    pub struct Index(AtomicUsize);

    impl Index {
        #[inline]
        pub const fn new(val: usize) -> Self {
            Self(AtomicUsize::new(val))
        }

        /// Load with Acquire ordering.
        #[inline]
        pub fn load(&self) -> usize {
            self.0.load(Ordering::Acquire)
        }

        /// Store with Release ordering.
        #[inline]
        pub fn store(&self, val: usize) {
            self.0.store(val, Ordering::Release);
        }

        /// Single compare-and-swap attempt. True if the cursor advanced.
        #[inline]
        pub fn compare_exchange(&self, current: usize, new: usize) -> bool {
            self.0
                .compare_exchange(current, new, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
        }
    }
}

#[cfg(feature = "no-atomics")]
mod non_atomic {
    use core::cell::Cell;

    /// Non-atomic cursor for single-context use.
    #[repr(transparent)]
    pub struct Index(Cell<usize>);

    impl Index {
        #[inline]
        pub const fn new(val: usize) -> Self {
            Self(Cell::new(val))
        }

        #[inline]
        pub fn load(&self) -> usize {
            self.0.get()
        }

        #[inline]
        pub fn store(&self, val: usize) {
            self.0.set(val);
        }

        /// Compare-then-set with the same contract as the atomic variant.
        #[inline]
        pub fn compare_exchange(&self, current: usize, new: usize) -> bool {
            if self.0.get() == current {
                self.0.set(new);
                true
            } else {
                false
            }
        }
    }
}

#[cfg(not(feature = "no-atomics"))]
pub use atomic::Index;

#[cfg(feature = "no-atomics")]
pub use non_atomic::Index;
