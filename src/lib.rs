//! A `no_std` lock-free byte ring buffer built on a claim/publish/peek/consume
//! protocol, plus a typed adapter for moving whole elements.
//!
//! Producers first *claim* a contiguous run of bytes, write into it, then
//! *publish* it to make it visible to readers. Readers *peek* at published
//! bytes and finally *consume* them to free the space. All four operations
//! are non-blocking and advance a cursor with a single compare-and-swap
//! attempt; a lost race reports [`RingError::Contention`] and leaves the ring
//! untouched so the caller decides the retry policy.
//!
//! # Byte ring
//!
//! ```
//! use claim_ring::ByteRing;
//!
//! let mut backing = [0u8; 16];
//! let mut ring = ByteRing::new();
//! ring.init(&mut backing);
//!
//! let claim = ring.allocate(4, false).unwrap();
//! unsafe { ring.claimed_mut_unchecked(claim) }.copy_from_slice(b"ping");
//! assert_eq!(ring.publish(claim).unwrap(), 4);
//!
//! let data = ring.peek(4, false).unwrap();
//! assert_eq!(unsafe { ring.readable_unchecked(data) }, b"ping");
//! assert_eq!(ring.consume(data).unwrap(), 4);
//! assert!(ring.is_empty());
//! ```
//!
//! # Typed ring
//!
//! ```
//! use claim_ring::ObjectRing;
//!
//! let ring: ObjectRing<u32, 8> = ObjectRing::new();
//! ring.push(7).unwrap();
//! ring.push(11).unwrap();
//! assert_eq!(ring.pop(), Some(7));
//! assert_eq!(ring.pop(), Some(11));
//! assert_eq!(ring.pop(), None);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

mod copy;
mod error;
mod index;
mod object;
mod region;
mod ring;

#[cfg(test)]
mod tests;

pub use copy::{CopyReport, copy_replace};
pub use error::RingError;
pub use object::ObjectRing;
pub use region::Region;
pub use ring::{ByteRing, IndexRing};
