// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Decision-path arena.
//!
//! Open nodes never hold their full prefix assignment. Instead every decision
//! is recorded once as `{parent, control}` in a reference-counted arena and a
//! node keeps a single `PathHandle` to its last decision. Children share the
//! records of their ancestors, so the memory footprint is proportional to the
//! number of distinct prefixes alive in the frontier rather than
//! `open nodes × depth`.
//!
//! Ownership rules:
//! - `push` returns a handle owning one reference and retains the parent.
//! - `release` drops one reference; a record reaching zero is recycled and
//!   the reference it held on its parent is released in turn.

use crate::error::{BnbError, BnbResult};
use cia_model::index::ControlIndex;

/// A handle to a decision record in the [`PathArena`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct PathHandle(u32);

impl PathHandle {
    /// Number of records a handle can address.
    pub const MAX_SLOTS: usize = u32::MAX as usize;

    #[inline(always)]
    fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for PathHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PathHandle({})", self.0)
    }
}

#[derive(Clone, Copy, Debug)]
struct PathEntry {
    parent: Option<PathHandle>,
    control: ControlIndex,
    depth: u32,
    refs: u32,
}

/// Reference-counted storage of decision prefixes.
#[derive(Clone, Debug)]
pub struct PathArena {
    entries: Vec<PathEntry>,
    free: Vec<u32>,
    live: usize,
    slot_limit: usize,
}

impl Default for PathArena {
    fn default() -> Self {
        Self::new()
    }
}

impl PathArena {
    /// Creates a new, empty arena.
    #[inline]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            free: Vec::new(),
            live: 0,
            slot_limit: PathHandle::MAX_SLOTS,
        }
    }

    /// Creates an arena with room for `capacity` records.
    #[inline]
    pub fn preallocated(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            free: Vec::with_capacity(capacity),
            live: 0,
            slot_limit: PathHandle::MAX_SLOTS,
        }
    }

    #[cfg(test)]
    fn with_slot_limit(slot_limit: usize) -> Self {
        Self {
            slot_limit: slot_limit.min(PathHandle::MAX_SLOTS),
            ..Self::new()
        }
    }

    /// Returns the number of live records.
    #[inline]
    pub fn len(&self) -> usize {
        self.live
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Returns the number of record slots ever allocated.
    #[inline]
    pub fn num_slots(&self) -> usize {
        self.entries.len()
    }

    /// Drops every record but keeps the allocations.
    #[inline]
    pub fn clear(&mut self) {
        self.entries.clear();
        self.free.clear();
        self.live = 0;
    }

    /// Returns the heap memory held by the arena in bytes.
    #[inline]
    pub fn allocated_memory_bytes(&self) -> usize {
        self.entries.capacity() * std::mem::size_of::<PathEntry>()
            + self.free.capacity() * std::mem::size_of::<u32>()
    }

    /// Records the decision `control` below `parent` and returns an owning handle.
    ///
    /// # Errors
    ///
    /// Returns `BnbError::Internal` if every addressable slot is live.
    pub fn push(
        &mut self,
        parent: Option<PathHandle>,
        control: ControlIndex,
    ) -> BnbResult<PathHandle> {
        let slot = match self.free.pop() {
            Some(slot) => slot,
            None => {
                let next = self.entries.len();
                if next >= self.slot_limit {
                    return Err(BnbError::Internal(format!(
                        "path arena exhausted: {} live records",
                        self.live
                    )));
                }
                u32::try_from(next).map_err(|_| {
                    BnbError::Internal(format!("path arena slot {} is not addressable", next))
                })?
            }
        };

        let depth = match parent {
            Some(p) => {
                self.retain(p);
                self.entries[p.index()].depth + 1
            }
            None => 1,
        };
        let entry = PathEntry {
            parent,
            control,
            depth,
            refs: 1,
        };

        self.live += 1;
        if (slot as usize) < self.entries.len() {
            self.entries[slot as usize] = entry;
        } else {
            self.entries.push(entry);
        }
        Ok(PathHandle(slot))
    }

    /// Adds a reference to `handle`.
    #[inline]
    pub fn retain(&mut self, handle: PathHandle) {
        let entry = &mut self.entries[handle.index()];
        debug_assert!(
            entry.refs > 0,
            "called `PathArena::retain` on a released record: {}",
            handle
        );
        entry.refs += 1;
    }

    /// Drops a reference to `handle`, recycling records that become unreachable.
    pub fn release(&mut self, handle: PathHandle) {
        let mut current = Some(handle);
        while let Some(h) = current {
            let entry = &mut self.entries[h.index()];
            debug_assert!(
                entry.refs > 0,
                "called `PathArena::release` on a released record: {}",
                h
            );
            entry.refs -= 1;
            if entry.refs > 0 {
                return;
            }
            current = entry.parent;
            self.free.push(h.0);
            self.live -= 1;
        }
    }

    /// Returns the control decided by the record.
    #[inline]
    pub fn control(&self, handle: PathHandle) -> ControlIndex {
        self.entries[handle.index()].control
    }

    /// Returns the parent record, `None` for a first decision.
    #[inline]
    pub fn parent(&self, handle: PathHandle) -> Option<PathHandle> {
        self.entries[handle.index()].parent
    }

    /// Returns the number of decisions on the path ending at `handle`.
    #[inline]
    pub fn depth(&self, handle: PathHandle) -> usize {
        self.entries[handle.index()].depth as usize
    }

    /// Writes the decisions from the root to `handle` into `out`.
    pub fn collect_into(&self, handle: Option<PathHandle>, out: &mut Vec<ControlIndex>) {
        out.clear();
        let mut current = handle;
        while let Some(h) = current {
            let entry = &self.entries[h.index()];
            out.push(entry.control);
            current = entry.parent;
        }
        out.reverse();
    }
}

impl std::fmt::Display for PathArena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "PathArena(live: {}, slots: {}, free: {})",
            self.live,
            self.entries.len(),
            self.free.len()
        )
    }
}
