//! Bounded copy with byte substitution.
//!
//! Fills fixed-size buffers from a source slice while rewriting a single
//! byte into a replacement sequence, e.g. `\n` into `\r\n` when staging wire
//! output. Not related to the ring protocol; purely sequential.

/// Outcome of a [`copy_replace`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CopyReport<'r> {
    /// Bytes consumed from the source.
    pub consumed: usize,
    /// Bytes written to the destination.
    pub written: usize,
    /// Unwritten tail of a replacement that only partially fit.
    pub pending: Option<&'r [u8]>,
}

/// Copy `src` into `dest`, substituting every `search` byte with `replace`.
///
/// Copies until either slice is used up. An empty `replace` deletes the
/// `search` bytes. Bytes of `replace` already written are never scanned for
/// `search` again, so a replacement containing the search byte does not
/// recurse.
///
/// When `dest` fills in the middle of a replacement, the written part counts
/// and the unwritten tail is handed back in [`CopyReport::pending`]; the
/// `search` byte itself still counts as consumed. When `dest` fills before a
/// pending `search` byte could take any replacement bytes, that byte is not
/// consumed, so a follow-up call starting there sees it again.
///
/// Empty inputs are a no-op and report zeros.
pub fn copy_replace<'r>(
    dest: &mut [u8],
    src: &[u8],
    search: u8,
    replace: &'r [u8],
) -> CopyReport<'r> {
    let mut report = CopyReport::default();

    if src.is_empty() || dest.is_empty() {
        return report;
    }

    let mut consumed = 0;
    let mut written = 0;

    while written < dest.len() && consumed < src.len() {
        let found = src[consumed..].iter().position(|&b| b == search);

        // Copy up to the next occurrence, or to the end of src, limited to
        // the room left in dest.
        let run = found.unwrap_or(src.len() - consumed);
        let run = run.min(dest.len() - written);
        dest[written..written + run].copy_from_slice(&src[consumed..consumed + run]);
        consumed += run;
        written += run;

        if found.is_some() {
            let room = dest.len() - written;
            if room > 0 {
                let fit = replace.len().min(room);
                dest[written..written + fit].copy_from_slice(&replace[..fit]);
                written += fit;

                if fit != replace.len() {
                    report.pending = Some(&replace[fit..]);
                }

                // The search byte is replaced, not copied.
                consumed += 1;
            }
        }
    }

    report.consumed = consumed;
    report.written = written;
    report
}
