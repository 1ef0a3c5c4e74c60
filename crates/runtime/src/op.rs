//! Operation invocations
//!
//! A front end turns source text into a sequence of `Op`s and hands it to
//! `Machine::run`. Execution stops at the first fault.

use crate::machine::Machine;
use pang_core::Result;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    PushInt(i64),
    PushStr(String),
    /// Drop n operands; 0 resets the machine
    Purge(u16),
    Swap,
    Quote,
    Apply,
    Add,
    Sub,
    Free,
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::PushInt(n) => write!(f, "push {}", n),
            Op::PushStr(s) => write!(f, "push {:?}", s),
            Op::Purge(n) => write!(f, "purge {}", n),
            Op::Swap => write!(f, "swap"),
            Op::Quote => write!(f, "quote"),
            Op::Apply => write!(f, "apply"),
            Op::Add => write!(f, "add"),
            Op::Sub => write!(f, "sub"),
            Op::Free => write!(f, "free"),
        }
    }
}

impl Machine {
    pub fn execute(&mut self, op: &Op) -> Result<()> {
        match op {
            Op::PushInt(n) => self.push_int(*n),
            Op::PushStr(s) => self.push_str(s),
            Op::Purge(n) => self.purge(*n),
            Op::Swap => self.swap(),
            Op::Quote => self.quote(),
            Op::Apply => self.apply(),
            Op::Add => self.add(),
            Op::Sub => self.sub(),
            Op::Free => self.free(),
        }
    }

    /// Execute `ops` in order, stopping at the first fault
    pub fn run<'a, I>(&mut self, ops: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a Op>,
    {
        ops.into_iter().try_for_each(|op| self.execute(op))
    }
}
