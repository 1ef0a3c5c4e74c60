//! The Pang machine: one arena plus one operand stack
//!
//! The operand stack is a list of arena addresses. Index 0 always holds
//! `NULL_ADDRESS`, the permanent null sentinel, and is never popped. The
//! stack never owns values; every operation reads and writes the cells its
//! addresses name.
//!
//! ```text
//! stack:  [ 0 ,  3 ,  9 ]          arena:  0: null
//!           │    │    └── top               3: 7
//!           │    └─────── operand           9: ptr(5)
//!           └──────────── sentinel
//! ```
//!
//! A machine runs until its first fault. After that every operation answers
//! with `PangError::Halted` and the state is no longer changed.

use crate::config::{MachineConfig, ReleasePolicy};
use pang_core::{
    Address, Arena, ArenaStats, Block, NULL_ADDRESS, PangError, Result, TaggedValue,
};
use std::fmt::Write;
use tracing::trace;

pub struct Machine {
    pub(crate) arena: Arena,
    pub(crate) stack: Vec<Address>,
    pub(crate) config: MachineConfig,
    fault: Option<i32>,
    ops_executed: u64,
}

impl Machine {
    pub fn new() -> Self {
        Self::with_config(MachineConfig::default())
    }

    pub fn with_config(config: MachineConfig) -> Self {
        Machine {
            arena: Arena::new(),
            stack: vec![NULL_ADDRESS],
            config,
            fault: None,
            ops_executed: 0,
        }
    }

    /// Build a machine configured from `PANG_RELEASE` / `PANG_ARITH`
    pub fn from_env() -> Self {
        Self::with_config(MachineConfig::from_env())
    }

    pub fn config(&self) -> MachineConfig {
        self.config
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Raw operand stack, sentinel included
    pub fn stack(&self) -> &[Address] {
        &self.stack
    }

    /// Number of operands (the sentinel does not count)
    pub fn depth(&self) -> usize {
        self.stack.len() - 1
    }

    /// Exit code of the fault that halted this machine, if any
    pub fn fault(&self) -> Option<i32> {
        self.fault
    }

    pub fn is_halted(&self) -> bool {
        self.fault.is_some()
    }

    pub fn ops_executed(&self) -> u64 {
        self.ops_executed
    }

    pub fn stats(&self) -> ArenaStats {
        self.arena.stats()
    }

    /// The value behind `stack[index]`, or behind the entry `index` below the
    /// top when `reverse` is set (0 is the top)
    pub fn at(&self, index: usize, reverse: bool) -> Option<&TaggedValue> {
        let addr = self.stack_address(index, reverse)?;
        self.arena.get(addr)
    }

    /// Mutable view of the same cell `at` returns
    ///
    /// The sentinel is read-only: asking for it yields None.
    pub fn at_mut(&mut self, index: usize, reverse: bool) -> Option<&mut TaggedValue> {
        let addr = self.stack_address(index, reverse)?;
        if addr == NULL_ADDRESS {
            return None;
        }
        self.arena.get_mut(addr)
    }

    fn stack_address(&self, index: usize, reverse: bool) -> Option<Address> {
        let slot = if reverse {
            self.stack.len().checked_sub(index.checked_add(1)?)?
        } else {
            index
        };
        self.stack.get(slot).copied()
    }

    /// Address of the top entry (the sentinel when there are no operands)
    #[inline]
    pub(crate) fn top_address(&self) -> Address {
        self.stack[self.stack.len() - 1]
    }

    /// Copy of the top value
    pub fn top(&self) -> TaggedValue {
        self.arena[self.top_address()]
    }

    /// Decode the character run starting at `addr` up to its terminator
    ///
    /// Returns None if a cell in the run is a pointer or not a valid
    /// character, or if the run reaches the end of the arena.
    pub fn string_at(&self, addr: Address) -> Option<String> {
        let mut out = String::new();
        for cell in (addr as usize..self.arena.capacity()).map(|a| self.arena[a as Address]) {
            if cell.is_null {
                return Some(out);
            }
            if cell.is_ptr {
                return None;
            }
            out.push(char::from_u32(u32::try_from(cell.real).ok()?)?);
        }
        None
    }

    /// Three-line dump: free list, used cells, stack values
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for block in self.arena.free_list() {
            let _ = write!(out, "{}-{} ", block.start, block.length);
        }
        out.push('\n');
        for cell in self.arena.used_cells() {
            let _ = write!(out, "{} ", cell);
        }
        out.push('\n');
        for &addr in &self.stack {
            let _ = write!(out, "{} ", self.arena[addr]);
        }
        out
    }

    /// Run `f` unless the machine has already faulted; a failure halts it
    pub(crate) fn guarded<F>(&mut self, op: &'static str, f: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        if let Some(code) = self.fault {
            return Err(PangError::Halted { code });
        }
        trace!(op, depth = self.depth(), "exec");
        match f(self) {
            Ok(()) => {
                self.ops_executed += 1;
                Ok(())
            }
            Err(err) => {
                self.fault = Some(err.exit_code());
                Err(err)
            }
        }
    }

    /// Give back the storage owned by the stack entries at `addrs`
    ///
    /// Every release is validated before any is applied.
    pub(crate) fn release_entries(&mut self, addrs: &[Address]) -> Result<()> {
        let mut blocks: Vec<Block> = Vec::with_capacity(addrs.len());
        for &addr in addrs {
            let block = match self.config.release {
                ReleasePolicy::Span => self.arena.span_of(addr),
                ReleasePolicy::Slot => Block::new(addr, 1),
            };
            self.arena.check_release(block)?;
            if let Some(clash) = blocks.iter().find(|b| b.overlaps(&block)) {
                return Err(PangError::DoubleFree {
                    start: block.start,
                    length: block.length,
                    block_start: clash.start,
                    block_length: clash.length,
                });
            }
            blocks.push(block);
        }

        for (&addr, block) in addrs.iter().zip(blocks) {
            self.arena.untrack(addr);
            self.arena.release(block)?;
        }
        Ok(())
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}
