//! Quote and apply
//!
//! Both work on the cell behind the top stack entry and rewrite it in place.
//! Neither allocates, and the stack itself is left alone.
//!
//! - `quote` retags an integer as a pointer to the address it holds.
//! - `apply` replaces a pointer with a copy of the cell it points at.

use crate::machine::Machine;
use pang_core::{PangError, Result};

impl Machine {
    /// Turn the top integer into a pointer
    ///
    /// Stack effect: ( n -- ptr(n) )
    ///
    /// Quoting zero yields the null pointer.
    pub fn quote(&mut self) -> Result<()> {
        self.guarded("quote", |m| {
            let addr = m.top_address();
            let value = m.arena[addr];

            if value.is_ptr {
                return Err(PangError::QuotePointer {
                    found: value.to_string(),
                });
            }
            if value.is_null {
                return Err(PangError::NullQuote);
            }

            let cell = &mut m.arena[addr];
            cell.is_ptr = true;
            if cell.real == 0 {
                cell.is_null = true;
            }
            Ok(())
        })
    }

    /// Dereference the top pointer one level
    ///
    /// Stack effect: ( ptr(a) -- mem[a] )
    pub fn apply(&mut self) -> Result<()> {
        self.guarded("apply", |m| {
            let addr = m.top_address();
            let value = m.arena[addr];

            if !value.is_ptr {
                return Err(PangError::ApplyNonPointer {
                    op: "apply",
                    found: value.to_string(),
                });
            }
            if value.is_null {
                return Err(PangError::NullApply { op: "apply" });
            }

            let target = m.arena.resolve(value.real).ok_or(PangError::InvalidAddress {
                op: "apply",
                addr: value.real,
            })?;
            let pointee = m.arena[target];
            m.arena[addr] = pointee;
            Ok(())
        })
    }
}
