//! Wrap-around behavior at the physical end of the storage.

use crate::{ByteRing, Region, RingError};

/// Publish `len` bytes of an incrementing pattern starting at `seed`.
fn fill(ring: &ByteRing<'_>, len: usize, seed: u8) {
    let claim = ring.allocate(len, false).unwrap();
    let slots = unsafe { ring.claimed_mut_unchecked(claim) };
    for (i, slot) in slots.iter_mut().enumerate() {
        *slot = seed.wrapping_add(i as u8);
    }
    assert_eq!(ring.publish(claim), Ok(len));
}

fn consume_front(ring: &ByteRing<'_>, len: usize) {
    let data = ring.peek(len, false).unwrap();
    assert_eq!(ring.consume(data), Ok(len));
}

#[test]
fn allocate_fits_before_physical_end() {
    let mut backing = [0u8; 10];
    let mut ring = ByteRing::new();
    ring.init(&mut backing);
    fill(&ring, 7, 0);

    assert_eq!(ring.allocate(3, false), Ok(Region::new(7, 3)));
}

#[test]
fn allocate_fits_before_physical_end_partial() {
    let mut backing = [0u8; 10];
    let mut ring = ByteRing::new();
    ring.init(&mut backing);
    fill(&ring, 7, 0);

    assert_eq!(ring.allocate(3, true), Ok(Region::new(7, 3)));
}

#[test]
fn allocate_across_physical_end_fails() {
    let mut backing = [0u8; 10];
    let mut ring = ByteRing::new();
    ring.init(&mut backing);
    fill(&ring, 7, 0);

    assert_eq!(
        ring.allocate(5, false),
        Err(RingError::Exhausted {
            requested: 5,
            available: 3
        })
    );
}

#[test]
fn allocate_across_physical_end_truncates() {
    let mut backing = [0u8; 10];
    let mut ring = ByteRing::new();
    ring.init(&mut backing);
    fill(&ring, 7, 0);

    assert_eq!(ring.allocate(5, true), Ok(Region::new(7, 3)));
}

#[test]
fn freed_space_does_not_extend_tail_run() {
    let mut backing = [0u8; 10];
    let mut ring = ByteRing::new();
    ring.init(&mut backing);
    fill(&ring, 7, 0);
    consume_front(&ring, 5);

    // Five bytes are free again, but only three are contiguous at the tail.
    assert_eq!(ring.allocate(5, true), Ok(Region::new(7, 3)));
    assert_eq!(ring.size(), 2);

    // The next claim wraps to the front of the physical buffer.
    assert_eq!(ring.allocate(5, true), Ok(Region::new(0, 5)));
    assert_eq!(ring.size(), 2);
}

#[test]
fn exact_allocate_steps_over_the_boundary() {
    let mut backing = [0u8; 10];
    let mut ring = ByteRing::new();
    ring.init(&mut backing);
    fill(&ring, 7, 0);
    consume_front(&ring, 5);

    assert_eq!(
        ring.allocate(5, false),
        Err(RingError::Exhausted {
            requested: 5,
            available: 3
        })
    );
    assert_eq!(ring.allocate(3, false), Ok(Region::new(7, 3)));
    assert_eq!(ring.allocate(5, false), Ok(Region::new(0, 5)));
    assert_eq!(ring.size(), 2);
}

#[test]
fn full_ring_wraps_claim_to_offset_zero() {
    let mut backing = [0u8; 10];
    let mut ring = ByteRing::new();
    ring.init(&mut backing);
    fill(&ring, 10, 0);
    assert_eq!(ring.size(), 10);

    consume_front(&ring, 3);
    assert_eq!(ring.size(), 7);

    assert_eq!(ring.allocate(3, false), Ok(Region::new(0, 3)));
    assert_eq!(ring.size(), 7);
}

#[test]
fn cursors_return_to_origin_after_two_rounds() {
    let mut backing = [0u8; 10];
    let mut ring = ByteRing::new();
    ring.init(&mut backing);

    // Push 2 * capacity bytes through in capacity-sized halves.
    for round in 0..4 {
        fill(&ring, 5, round * 5);
        consume_front(&ring, 5);
    }

    // A full-capacity claim at offset zero only succeeds if all cursors
    // wrapped back to their initial state.
    assert_eq!(ring.allocate(10, false), Ok(Region::new(0, 10)));
}

#[test]
fn full_circle_many_bytes() {
    let mut backing = [0u8; 10];
    let mut ring = ByteRing::new();
    ring.init(&mut backing);

    let mut sent: u8 = 0;
    let mut received: u8 = 0;

    while sent < 200 {
        // Send two chunks of up to three bytes of a running counter.
        for _ in 0..2 {
            let claim = ring.allocate(3, true).unwrap();
            assert!(claim.len > 0 && claim.len <= 3);

            let slots = unsafe { ring.claimed_mut_unchecked(claim) };
            for (i, slot) in slots.iter_mut().enumerate() {
                *slot = sent.wrapping_add(i as u8);
            }
            sent = sent.wrapping_add(claim.len as u8);

            assert_eq!(ring.publish(claim), Ok(claim.len));
            assert!(ring.size() <= ring.capacity());
        }

        // Read the counter back in chunks of up to five bytes.
        let data = ring.peek(5, true).unwrap();
        assert!(data.len > 0 && data.len <= 5);

        let bytes = unsafe { ring.readable_unchecked(data) };
        for (i, byte) in bytes.iter().enumerate() {
            assert_eq!(*byte, received.wrapping_add(i as u8));
        }
        received = received.wrapping_add(data.len as u8);

        assert_eq!(ring.consume(data), Ok(data.len));
        assert!(ring.size() <= ring.capacity());
    }
}
