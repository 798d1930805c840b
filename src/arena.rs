use std::ops::Range;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tracing::debug;

static NEXT_ARENA_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArenaError {
    #[error("arena out of capacity: requested {requested} bytes, {remaining} remaining")]
    OutOfCapacity { requested: usize, remaining: usize },

    #[error("span {offset}..{end} is not readable from this arena")]
    ForeignSpan { offset: usize, end: usize },
}

/// Handle to a contiguous byte range carved out of an [`Arena`].
///
/// A span is only meaningful for the arena that produced it: every access goes
/// through the arena, which checks ownership and bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    arena_id: u64,
    offset: usize,
    len: usize,
}

impl Span {
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn end(&self) -> usize {
        self.offset + self.len
    }

    pub fn range(&self) -> Range<usize> {
        self.offset..self.end()
    }

    /// The first `len` bytes of this span (clamped to the span length).
    pub fn prefix(&self, len: usize) -> Span {
        Span {
            len: len.min(self.len),
            ..*self
        }
    }
}

/// Single-owner bump allocator.
///
/// Hands out [`Span`]s by advancing an offset over a zeroed buffer. Nothing is
/// ever freed individually; dropping (or [`Arena::destroy`]ing) the arena
/// releases everything at once.
#[derive(Debug)]
pub struct Arena {
    id: u64,
    data: Box<[u8]>,
    offset: usize,
}

impl Arena {
    pub fn new(capacity: usize) -> Arena {
        let id = NEXT_ARENA_ID.fetch_add(1, Ordering::Relaxed);
        debug!(arena = id, capacity, "arena created");
        Arena {
            id,
            data: vec![0u8; capacity].into_boxed_slice(),
            offset: 0,
        }
    }

    /// Carve `size` bytes off the end of the used region.
    ///
    /// On failure the offset is left untouched.
    pub fn allocate(&mut self, size: usize) -> Result<Span, ArenaError> {
        let remaining = self.remaining();
        if size > remaining {
            return Err(ArenaError::OutOfCapacity {
                requested: size,
                remaining,
            });
        }

        let span = Span {
            arena_id: self.id,
            offset: self.offset,
            len: size,
        };
        self.offset += size;
        debug!(arena = self.id, offset = span.offset, size, "arena allocation");
        Ok(span)
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn used(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    pub fn get(&self, span: Span) -> Result<&[u8], ArenaError> {
        self.region().get(span)
    }

    pub fn get_mut(&mut self, span: Span) -> Result<&mut [u8], ArenaError> {
        self.check(span, self.offset)?;
        Ok(&mut self.data[span.range()])
    }

    /// Read-only view over everything allocated so far.
    pub fn region(&self) -> Region<'_> {
        Region {
            arena_id: self.id,
            bytes: &self.data[..self.offset],
        }
    }

    /// Splits the used region at `frontier`.
    ///
    /// Returns a read-only view of everything allocated before `frontier` and
    /// the writable bytes from `frontier` up to the current offset (which
    /// covers `frontier` and every span allocated after it).
    pub fn split_frontier(
        &mut self,
        frontier: Span,
    ) -> Result<(Region<'_>, &mut [u8]), ArenaError> {
        self.check(frontier, self.offset)?;
        let (before, after) = self.data[..self.offset].split_at_mut(frontier.offset);
        Ok((
            Region {
                arena_id: self.id,
                bytes: before,
            },
            after,
        ))
    }

    /// Releases the backing buffer. Every span handed out becomes unusable.
    pub fn destroy(self) {
        debug!(arena = self.id, used = self.offset, "arena destroyed");
    }

    fn check(&self, span: Span, limit: usize) -> Result<(), ArenaError> {
        if span.arena_id != self.id || span.end() > limit {
            return Err(ArenaError::ForeignSpan {
                offset: span.offset,
                end: span.end(),
            });
        }
        Ok(())
    }
}

/// Borrowed, read-only slice of an arena's used bytes.
#[derive(Debug, Clone, Copy)]
pub struct Region<'a> {
    arena_id: u64,
    bytes: &'a [u8],
}

impl<'a> Region<'a> {
    pub fn get(&self, span: Span) -> Result<&'a [u8], ArenaError> {
        if span.arena_id != self.arena_id || span.end() > self.bytes.len() {
            return Err(ArenaError::ForeignSpan {
                offset: span.offset,
                end: span.end(),
            });
        }
        Ok(&self.bytes[span.range()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocations_are_contiguous_and_disjoint() {
        let mut arena = Arena::new(16);
        let a = arena.allocate(4).unwrap();
        let b = arena.allocate(0).unwrap();
        let c = arena.allocate(12).unwrap();

        assert_eq!(a.range(), 0..4);
        assert_eq!(b.range(), 4..4);
        assert_eq!(c.range(), 4..16);
        assert_eq!(arena.remaining(), 0);
    }

    #[test]
    fn overflow_leaves_offset_unchanged() {
        let mut arena = Arena::new(10);
        arena.allocate(6).unwrap();

        let err = arena.allocate(5).unwrap_err();
        assert_eq!(
            err,
            ArenaError::OutOfCapacity {
                requested: 5,
                remaining: 4
            }
        );
        assert_eq!(arena.used(), 6);

        // huge requests must not wrap around
        assert!(arena.allocate(usize::MAX).is_err());
        assert_eq!(arena.used(), 6);
    }

    #[test]
    fn fresh_memory_is_zeroed() {
        let mut arena = Arena::new(8);
        let span = arena.allocate(8).unwrap();
        assert!(arena.get(span).unwrap().iter().all(|&b| b == 0));
    }

    #[test]
    fn spans_do_not_cross_arenas() {
        let mut first = Arena::new(8);
        let mut second = Arena::new(8);
        let span = first.allocate(4).unwrap();
        second.allocate(4).unwrap();

        assert!(matches!(second.get(span), Err(ArenaError::ForeignSpan { .. })));
    }

    #[test]
    fn split_frontier_exposes_both_sides() {
        let mut arena = Arena::new(8);
        let src = arena.allocate(3).unwrap();
        arena.get_mut(src).unwrap().copy_from_slice(&[7, 8, 9]);
        let dst = arena.allocate(3).unwrap();

        let (before, after) = arena.split_frontier(dst).unwrap();
        after.copy_from_slice(before.get(src).unwrap());

        assert_eq!(arena.get(dst).unwrap(), &[7, 8, 9]);
    }
}
