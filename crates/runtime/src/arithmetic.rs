//! Arithmetic on the top two operands
//!
//! `add` and `sub` pop the top operand, release its storage, and fold its
//! payload into the cell of the new top in place. No cell is allocated.
//!
//! # Unchecked by default
//!
//! Only `real` is read and written; the null and pointer flags of either
//! operand are ignored, so adding to a pointer moves the address it holds.
//! `ArithmeticMode::Checked` rejects any operand that is not a plain integer.
//!
//! # Overflow Behavior
//!
//! Wrapping: `i64::MAX + 1` is `i64::MIN`.

use crate::config::ArithmeticMode;
use crate::machine::Machine;
use pang_core::{PangError, Result};

impl Machine {
    /// Add the top operand into the one below it
    ///
    /// Stack effect: ( a b -- a+b )
    pub fn add(&mut self) -> Result<()> {
        self.guarded("add", |m| m.fold_top("add", i64::wrapping_add))
    }

    /// Subtract the top operand from the one below it
    ///
    /// Stack effect: ( a b -- a-b )
    pub fn sub(&mut self) -> Result<()> {
        self.guarded("sub", |m| m.fold_top("sub", i64::wrapping_sub))
    }

    fn fold_top(&mut self, op: &'static str, f: fn(i64, i64) -> i64) -> Result<()> {
        let len = self.stack.len();
        if len < 3 {
            return Err(PangError::NullPurge {
                op,
                requested: 2,
                available: self.depth(),
            });
        }

        let rhs_addr = self.stack[len - 1];
        let lhs_addr = self.stack[len - 2];
        let rhs = self.arena[rhs_addr];

        if self.config.arithmetic == ArithmeticMode::Checked {
            let lhs = self.arena[lhs_addr];
            if let Some(bad) = [lhs, rhs].into_iter().find(|v| !v.is_int()) {
                return Err(PangError::NonInteger {
                    op,
                    found: bad.to_string(),
                });
            }
        }

        self.release_entries(&[rhs_addr])?;
        self.stack.pop();

        let cell = &mut self.arena[lhs_addr];
        cell.real = f(cell.real, rhs.real);
        Ok(())
    }
}
