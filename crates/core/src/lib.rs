//! Pang Core: storage primitives for the Pang stack machine
//!
//! This crate owns everything below the operand stack:
//! - TaggedValue: one arena cell (null flag, pointer flag, integer payload)
//! - Arena: fixed-capacity cell storage with a bump cursor and a free list
//! - PangError: fault kinds and the exit codes a host process sees
//!
//! # Modules
//!
//! - `value`: TaggedValue and the address type
//! - `arena`: allocation, release, span tracking, statistics
//! - `error`: fault kinds and exit codes

pub mod arena;
pub mod error;
pub mod value;

pub use arena::{ARENA_CAPACITY, Arena, ArenaStats, Block, FIRST_ADDRESS, NULL_ADDRESS};
pub use error::{PangError, Result};
pub use value::{Address, TaggedValue};
