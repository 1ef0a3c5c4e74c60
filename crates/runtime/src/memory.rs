//! Explicit free
//!
//! `free` gives back the storage a pointer refers to without touching the
//! stack. The pointer stays on top and now dangles.

use crate::machine::Machine;
use pang_core::{Address, Block, NULL_ADDRESS, PangError, Result};

impl Machine {
    /// Release the run the top pointer points at
    ///
    /// Stack effect: ( ptr -- ptr )
    ///
    /// The run extends from the pointee up to and including the first null
    /// cell, so for a string it covers the characters and the terminator.
    /// Pointers to cells that were never allocated are rejected.
    pub fn free(&mut self) -> Result<()> {
        self.guarded("free", |m| {
            let top = m.top_address();
            let value = m.arena[top];

            if !value.is_ptr {
                return Err(PangError::ApplyNonPointer {
                    op: "free",
                    found: value.to_string(),
                });
            }
            if value.is_null {
                return Err(PangError::NullApply { op: "free" });
            }

            let start = m.arena.resolve(value.real).ok_or(PangError::InvalidAddress {
                op: "free",
                addr: value.real,
            })?;
            if start == NULL_ADDRESS {
                return Err(PangError::NullApply { op: "free" });
            }

            let block = Block::new(start, m.run_length(start)?);
            m.arena.release(block)?;

            // No stack entry owns these cells any more
            m.arena.forget_spans_overlapping(block);
            Ok(())
        })
    }

    /// Cells from `start` through the first null, inclusive
    ///
    /// The walk stops at the bump cursor: cells past it were never handed
    /// out, so a run with no terminator below the cursor ends there.
    fn run_length(&self, start: Address) -> Result<usize> {
        let cursor = self.arena.bump_cursor();
        if start as usize >= cursor {
            return Err(PangError::InvalidAddress {
                op: "free",
                addr: start as i64,
            });
        }
        Ok((start as usize..cursor)
            .position(|a| self.arena[a as Address].is_null)
            .map_or(cursor - start as usize, |len| len + 1))
    }
}
