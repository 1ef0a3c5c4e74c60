//! Stack operations: push, purge, swap
//!
//! Pushing allocates arena cells and puts the address of the new value on
//! the operand stack. Purging pops addresses and hands their cells back to
//! the free list. Swap only reorders addresses.

use crate::machine::Machine;
use pang_core::{Block, PangError, Result, TaggedValue};
use tracing::debug;

impl Machine {
    /// Push an integer literal
    ///
    /// Stack effect: ( -- n )
    ///
    /// Takes one cell, reusing the most recently freed one when possible.
    pub fn push_int(&mut self, value: i64) -> Result<()> {
        self.guarded("push", |m| {
            let addr = m.arena.alloc_slot()?;
            m.arena[addr] = TaggedValue::int(value);
            m.stack.push(addr);
            Ok(())
        })
    }

    /// Push a string literal
    ///
    /// Stack effect: ( -- ptr )
    ///
    /// Lays out one integer cell per character, a null-pointer terminator and
    /// finally a pointer to the first character. The address of that last
    /// cell is what goes on the stack.
    ///
    /// ```text
    /// "hi" ->  [ 'h' ][ 'i' ][ null ][ ptr(start) ]
    ///           start                  ^ pushed
    /// ```
    pub fn push_str(&mut self, value: &str) -> Result<()> {
        self.guarded("push", |m| {
            let chars: Vec<char> = value.chars().collect();
            let length = chars.len() + 2;
            let start = m.arena.alloc_run(length)?;

            for (offset, ch) in chars.iter().enumerate() {
                m.arena[start + offset as u16] = TaggedValue::int(*ch as i64);
            }
            let terminator = start + chars.len() as u16;
            let handle = terminator + 1;
            m.arena[terminator] = TaggedValue::null_ptr();
            m.arena[handle] = TaggedValue::ptr(start);

            m.arena.track(handle, Block::new(start, length));
            m.stack.push(handle);
            Ok(())
        })
    }

    /// Drop the top `n` operands, or reset the whole machine when `n` is 0
    ///
    /// Stack effect: ( x1 .. xn -- )
    ///
    /// `purge(0)` empties the stack back to the sentinel, rewinds the bump
    /// cursor and clears the free list regardless of history.
    pub fn purge(&mut self, n: u16) -> Result<()> {
        self.guarded("purge", |m| {
            if n == 0 {
                debug!(dropped = m.depth(), "purge: full reset");
                m.stack.truncate(1);
                m.arena.reset();
                return Ok(());
            }

            let n = n as usize;
            if n > m.depth() {
                return Err(PangError::NullPurge {
                    op: "purge",
                    requested: n,
                    available: m.depth(),
                });
            }

            let keep = m.stack.len() - n;
            let popped = m.stack[keep..].to_vec();
            m.release_entries(&popped)?;
            m.stack.truncate(keep);
            Ok(())
        })
    }

    /// Exchange the top two operands
    ///
    /// Stack effect: ( a b -- b a )
    pub fn swap(&mut self) -> Result<()> {
        self.guarded("swap", |m| {
            let len = m.stack.len();
            if len < 3 {
                return Err(PangError::NullMove {
                    op: "swap",
                    depth: m.depth(),
                });
            }
            m.stack.swap(len - 1, len - 2);
            Ok(())
        })
    }
}
