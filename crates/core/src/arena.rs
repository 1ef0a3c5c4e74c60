//! Fixed-capacity arena of tagged values
//!
//! The arena is the only owner of value storage. The operand stack refers to
//! cells by address and never holds values itself.
//!
//! ## Layout
//!
//! ```text
//! addr:  0      1      2      3      4                         CAPACITY
//!      ┌──────┬──────┬──────┬──────┬──────┬─────────────────────┐
//!      │ null │  v1  │  v2  │ (free)  v4  │      unused         │
//!      └──────┴──────┴──────┴──────┴──────┴─────────────────────┘
//!                                          ↑ bump cursor
//! ```
//!
//! - Address 0 holds the null sentinel and is never handed out or released.
//! - The bump cursor is the next never-used address.
//! - Released ranges go on the free list and are reused before the cursor
//!   grows. Adjacent free blocks are not coalesced.
//!
//! ## Reuse policies
//!
//! Single-slot requests (integer pushes) take the trailing slot of the most
//! recently released block. Multi-slot requests (strings) scan the free list
//! from the front and carve their run off the tail of the first block that is
//! large enough. Both fall back to the bump cursor.
//!
//! ## Spans
//!
//! A multi-slot allocation is tracked by the address that goes on the stack,
//! so that popping that entry can return the whole run to the free list.

use crate::error::{PangError, Result};
use crate::value::{Address, TaggedValue};
use serde::Serialize;
use std::collections::HashMap;
use std::ops::{Index, IndexMut};
use tracing::debug;

/// Number of cells in every arena
pub const ARENA_CAPACITY: usize = 0x2000;

// Addresses are 16 bits wide
const _: () = assert!(
    ARENA_CAPACITY <= Address::MAX as usize + 1,
    "arena capacity must fit the address type"
);

/// Address of the null sentinel
pub const NULL_ADDRESS: Address = 0;

/// Initial bump cursor (first address after the sentinel)
pub const FIRST_ADDRESS: Address = 1;

/// A contiguous run of `length` cells starting at `start`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Block {
    pub start: Address,
    pub length: usize,
}

impl Block {
    pub fn new(start: Address, length: usize) -> Self {
        Block { start, length }
    }

    /// One past the last address of the run
    #[inline]
    pub fn end(&self) -> usize {
        self.start as usize + self.length
    }

    pub fn overlaps(&self, other: &Block) -> bool {
        (self.start as usize) < other.end() && (other.start as usize) < self.end()
    }

    pub fn contains(&self, addr: Address) -> bool {
        (self.start as usize..self.end()).contains(&(addr as usize))
    }
}

/// Point-in-time view of arena bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ArenaStats {
    pub capacity: usize,
    pub bump_cursor: usize,
    /// High-water mark of the bump cursor since the last reset
    pub peak_cursor: usize,
    pub free_blocks: usize,
    pub free_slots: usize,
    pub tracked_spans: usize,
}

pub struct Arena {
    cells: Box<[TaggedValue]>,
    bump_cursor: usize,
    peak_cursor: usize,
    free_list: Vec<Block>,
    spans: HashMap<Address, Block>,
}

impl Arena {
    pub fn new() -> Self {
        // Cells that were never written read as null
        let cells = vec![TaggedValue::null_int(); ARENA_CAPACITY].into_boxed_slice();
        Arena {
            cells,
            bump_cursor: FIRST_ADDRESS as usize,
            peak_cursor: FIRST_ADDRESS as usize,
            free_list: Vec::new(),
            spans: HashMap::new(),
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn bump_cursor(&self) -> usize {
        self.bump_cursor
    }

    pub fn free_list(&self) -> &[Block] {
        &self.free_list
    }

    /// Total number of cells sitting on the free list
    pub fn free_slots(&self) -> usize {
        self.free_list.iter().map(|b| b.length).sum()
    }

    pub fn get(&self, addr: Address) -> Option<&TaggedValue> {
        self.cells.get(addr as usize)
    }

    pub fn get_mut(&mut self, addr: Address) -> Option<&mut TaggedValue> {
        self.cells.get_mut(addr as usize)
    }

    /// Convert a pointer payload into an arena address
    ///
    /// Returns None for negative payloads and anything past capacity.
    pub fn resolve(&self, real: i64) -> Option<Address> {
        if real < 0 || real as usize >= self.capacity() {
            return None;
        }
        Some(real as Address)
    }

    /// Hand out one cell, preferring the most recently released block
    pub fn alloc_slot(&mut self) -> Result<Address> {
        let addr = match self.free_list.last_mut() {
            Some(block) => {
                block.length -= 1;
                let addr = block.start + block.length as Address;
                if block.length == 0 {
                    self.free_list.pop();
                }
                debug!(addr, "alloc_slot: reused free block tail");
                addr
            }
            None => self.bump(1)?,
        };
        self.spans.remove(&addr);
        Ok(addr)
    }

    /// Hand out `length` contiguous cells, first fit from the front of the
    /// free list; returns the start of the run
    pub fn alloc_run(&mut self, length: usize) -> Result<Address> {
        if length == 1 {
            return self.alloc_slot();
        }

        let fit = self.free_list.iter().position(|b| b.length >= length);
        let start = match fit {
            Some(idx) => {
                let block = &mut self.free_list[idx];
                block.length -= length;
                let start = block.start + block.length as Address;
                if block.length == 0 {
                    self.free_list.remove(idx);
                }
                debug!(start, length, "alloc_run: split free block");
                start
            }
            None => self.bump(length)?,
        };
        Ok(start)
    }

    fn bump(&mut self, length: usize) -> Result<Address> {
        if self.bump_cursor + length > self.capacity() {
            return Err(PangError::ArenaExhausted {
                requested: length,
                cursor: self.bump_cursor,
                capacity: self.capacity(),
            });
        }
        let start = self.bump_cursor as Address;
        self.bump_cursor += length;
        self.peak_cursor = self.peak_cursor.max(self.bump_cursor);
        debug!(start, length, cursor = self.bump_cursor, "bump allocation");
        Ok(start)
    }

    /// Check that `block` could be released without corrupting the free list
    ///
    /// The run must lie between the sentinel and the bump cursor and must not
    /// overlap a block that is already free.
    pub fn check_release(&self, block: Block) -> Result<()> {
        if block.start == NULL_ADDRESS || block.end() > self.bump_cursor {
            return Err(PangError::InvalidAddress {
                op: "release",
                addr: block.start as i64,
            });
        }
        if let Some(existing) = self.free_list.iter().find(|b| b.overlaps(&block)) {
            return Err(PangError::DoubleFree {
                start: block.start,
                length: block.length,
                block_start: existing.start,
                block_length: existing.length,
            });
        }
        Ok(())
    }

    /// Append a run to the free list
    pub fn release(&mut self, block: Block) -> Result<()> {
        self.check_release(block)?;
        debug!(start = block.start, length = block.length, "release");
        self.free_list.push(block);
        Ok(())
    }

    /// Record that the stack entry at `addr` owns `run`
    pub fn track(&mut self, addr: Address, run: Block) {
        self.spans.insert(addr, run);
    }

    /// Forget the run owned by `addr`
    pub fn untrack(&mut self, addr: Address) -> Option<Block> {
        self.spans.remove(&addr)
    }

    /// Drop every tracked run that shares a cell with `block`
    ///
    /// Called when `block` is released from outside its owner, so that no
    /// handle can later give those cells back a second time. The owners fall
    /// back to releasing their own cell only.
    pub fn forget_spans_overlapping(&mut self, block: Block) -> usize {
        let before = self.spans.len();
        self.spans.retain(|_, run| !run.overlaps(&block));
        let forgotten = before - self.spans.len();
        if forgotten > 0 {
            debug!(
                start = block.start,
                length = block.length,
                forgotten,
                "forgot spans overlapping released block"
            );
        }
        forgotten
    }

    /// The run owned by the stack entry at `addr` (a single cell if untracked)
    pub fn span_of(&self, addr: Address) -> Block {
        self.spans
            .get(&addr)
            .copied()
            .unwrap_or_else(|| Block::new(addr, 1))
    }

    /// Forget every allocation: cursor back to the first address, empty
    /// free list, no spans. Cell contents are left as they are.
    pub fn reset(&mut self) {
        self.bump_cursor = FIRST_ADDRESS as usize;
        self.peak_cursor = FIRST_ADDRESS as usize;
        self.free_list.clear();
        self.spans.clear();
    }

    pub fn stats(&self) -> ArenaStats {
        ArenaStats {
            capacity: self.capacity(),
            bump_cursor: self.bump_cursor,
            peak_cursor: self.peak_cursor,
            free_blocks: self.free_list.len(),
            free_slots: self.free_slots(),
            tracked_spans: self.spans.len(),
        }
    }

    /// Cells `0..bump_cursor`
    pub fn used_cells(&self) -> &[TaggedValue] {
        &self.cells[..self.bump_cursor]
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<Address> for Arena {
    type Output = TaggedValue;

    fn index(&self, addr: Address) -> &TaggedValue {
        &self.cells[addr as usize]
    }
}

impl IndexMut<Address> for Arena {
    fn index_mut(&mut self, addr: Address) -> &mut TaggedValue {
        &mut self.cells[addr as usize]
    }
}
