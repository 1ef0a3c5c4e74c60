//! Fault kinds and their process exit codes
//!
//! Every fault is fatal to the machine that raised it. The exit code is the
//! only thing a host process sees, so each kind keeps a distinct code.

use crate::value::Address;
use thiserror::Error;

pub const PANG_NULL_APPLY: i32 = 0x10;
pub const PANG_NULL_QUOTE: i32 = 0x12;
pub const PANG_NULL_MOVE: i32 = 0x14;
pub const PANG_NULL_PURGE: i32 = 0x16;
pub const PANG_APPLY_NON_POINTER: i32 = 0x18;
pub const PANG_QUOTE_POINTER: i32 = 0x20;
pub const PANG_ARENA_EXHAUSTED: i32 = 0x22;
pub const PANG_INVALID_ADDRESS: i32 = 0x24;
pub const PANG_DOUBLE_FREE: i32 = 0x26;
pub const PANG_NON_INTEGER: i32 = 0x28;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PangError {
    /// Dereferencing (or freeing) the null pointer
    #[error("{op}: null pointer dereference")]
    NullApply { op: &'static str },

    /// Quoting the null integer
    #[error("quote: cannot quote null")]
    NullQuote,

    /// Fewer than two operands for a reordering operation
    #[error("{op}: stack underflow (need 2 operands, have {depth})")]
    NullMove { op: &'static str, depth: usize },

    /// Popping more operands than the stack holds
    #[error("{op}: stack underflow (need {requested} operands, have {available})")]
    NullPurge {
        op: &'static str,
        requested: usize,
        available: usize,
    },

    /// Dereferencing or freeing a plain integer
    #[error("{op}: expected a pointer, got {found}")]
    ApplyNonPointer { op: &'static str, found: String },

    /// Quoting a value that is already a pointer
    #[error("quote: value is already a pointer ({found})")]
    QuotePointer { found: String },

    #[error("arena exhausted: requested {requested} slots at cursor {cursor}, capacity {capacity}")]
    ArenaExhausted {
        requested: usize,
        cursor: usize,
        capacity: usize,
    },

    #[error("{op}: address {addr} is outside the arena")]
    InvalidAddress { op: &'static str, addr: i64 },

    #[error("release of {start}+{length} overlaps free block {block_start}+{block_length}")]
    DoubleFree {
        start: Address,
        length: usize,
        block_start: Address,
        block_length: usize,
    },

    /// Checked arithmetic saw a null or pointer operand
    #[error("{op}: expected two integers, got {found}")]
    NonInteger { op: &'static str, found: String },

    /// An operation was attempted after the machine already faulted
    #[error("machine halted by earlier fault (exit code {code:#x})")]
    Halted { code: i32 },
}

impl PangError {
    /// Process exit code for this fault
    pub fn exit_code(&self) -> i32 {
        match self {
            PangError::NullApply { .. } => PANG_NULL_APPLY,
            PangError::NullQuote => PANG_NULL_QUOTE,
            PangError::NullMove { .. } => PANG_NULL_MOVE,
            PangError::NullPurge { .. } => PANG_NULL_PURGE,
            PangError::ApplyNonPointer { .. } => PANG_APPLY_NON_POINTER,
            PangError::QuotePointer { .. } => PANG_QUOTE_POINTER,
            PangError::ArenaExhausted { .. } => PANG_ARENA_EXHAUSTED,
            PangError::InvalidAddress { .. } => PANG_INVALID_ADDRESS,
            PangError::DoubleFree { .. } => PANG_DOUBLE_FREE,
            PangError::NonInteger { .. } => PANG_NON_INTEGER,
            PangError::Halted { code } => *code,
        }
    }
}

pub type Result<T> = std::result::Result<T, PangError>;
