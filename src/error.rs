//! Error types for ring buffer operations.

use snafu::Snafu;

/// Why a ring operation failed.
///
/// A failed operation never moves a cursor or touches storage, so every
/// variant is safe to retry from the caller's side.
#[derive(Debug, Snafu, Clone, Copy, PartialEq, Eq)]
#[snafu(visibility(pub(crate)))]
pub enum RingError {
    /// Not enough contiguous space or data to satisfy the request.
    #[snafu(display(
        "insufficient contiguous run: requested {requested}, available {available}"
    ))]
    Exhausted {
        /// Bytes or elements requested.
        requested: usize,
        /// Bytes or elements available without wrapping.
        available: usize,
    },

    /// A concurrent caller moved the cursor first.
    #[snafu(display("cursor moved by a concurrent caller"))]
    Contention,

    /// The range is not the next one due at its cursor.
    #[snafu(display("range starts at {got}, cursor expects {expected}"))]
    OutOfOrder {
        /// Physical offset the cursor expects next.
        expected: usize,
        /// Physical offset the range carried.
        got: usize,
    },

    /// The ring has no storage bound yet.
    #[snafu(display("ring is not initialized"))]
    Uninitialized,
}
