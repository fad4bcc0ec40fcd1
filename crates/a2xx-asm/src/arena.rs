use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::error::{AsmError, Result};

/// Round `value` up to the next multiple of 4.
pub(crate) fn align4(value: usize) -> usize {
    value.saturating_add(3) & !3
}

static NEXT_ARENA_ID: AtomicU32 = AtomicU32::new(0);

/// A byte range carved out of an [`Arena`]. Spans remember which arena they came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArenaSpan {
    arena: u32,
    offset: usize,
    len: usize,
}

impl ArenaSpan {
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// A string copied into an [`Arena`]. Resolve it with [`Arena::str`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArenaStr(ArenaSpan);

/// A bump allocator over a single heap allocated up front.
///
/// Allocations are never freed individually; everything goes away with the arena. The heap is
/// zeroed at creation and never reused, so every allocation starts out zero-initialised.
///
/// A clone keeps the identity of its source, so spans handed out before the clone stay valid in
/// both copies.
#[derive(Clone)]
pub struct Arena {
    id: u32,
    heap: Vec<u8>,
    cursor: usize,
}

impl Arena {
    pub fn new(capacity: usize) -> Self {
        Self {
            id: NEXT_ARENA_ID.fetch_add(1, Ordering::Relaxed),
            heap: vec![0; capacity],
            cursor: 0,
        }
    }

    /// Total capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.heap.len()
    }

    /// Bytes handed out so far, including alignment padding.
    pub fn used(&self) -> usize {
        self.cursor
    }

    pub fn remaining(&self) -> usize {
        self.capacity() - self.cursor
    }

    /// Carve `size` bytes (rounded up to a multiple of 4) out of the heap.
    pub fn allocate(&mut self, size: usize) -> Result<ArenaSpan> {
        let aligned = align4(size);
        if aligned > self.remaining() {
            return Err(AsmError::ArenaExhausted {
                requested: aligned,
                remaining: self.remaining(),
            });
        }
        let span = ArenaSpan {
            arena: self.id,
            offset: self.cursor,
            len: size,
        };
        self.cursor += aligned;
        Ok(span)
    }

    /// Copy `s` into the arena. Absent and empty strings yield `None`.
    pub fn duplicate_string(&mut self, s: Option<&str>) -> Result<Option<ArenaStr>> {
        let Some(s) = s.filter(|s| !s.is_empty()) else {
            return Ok(None);
        };
        let span = self.allocate(s.len())?;
        self.heap[span.offset..span.offset + span.len].copy_from_slice(s.as_bytes());
        Ok(Some(ArenaStr(span)))
    }

    /// Bytes behind `span`, or `None` if it was not handed out by this arena.
    pub fn bytes(&self, span: ArenaSpan) -> Option<&[u8]> {
        if span.arena != self.id {
            return None;
        }
        let end = span.offset.checked_add(span.len)?;
        if end > self.cursor {
            return None;
        }
        self.heap.get(span.offset..end)
    }

    /// The string behind `s`, or `None` if it was not copied into this arena.
    pub fn str(&self, s: ArenaStr) -> Option<&str> {
        self.bytes(s.0).and_then(|bytes| std::str::from_utf8(bytes).ok())
    }
}

impl fmt::Debug for Arena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("capacity", &self.capacity())
            .field("used", &self.used())
            .finish()
    }
}
