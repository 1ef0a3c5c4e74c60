//! Pang Runtime: the execution core of the Pang stack language
//!
//! Key design principles:
//! - Arena: fixed-size store of tagged values, owned by the machine
//! - Operand stack: arena addresses only, bottomed by the null sentinel
//! - Operations: in-place transformations of (arena, stack); the first fault
//!   halts the machine
//!
//! # Modules
//!
//! - `machine`: Machine state, accessors, halting
//! - `stack`: push, purge, swap
//! - `quotations`: quote, apply
//! - `arithmetic`: add, sub
//! - `memory`: explicit free
//! - `op`: operation invocations and program execution
//! - `config`: release policy and arithmetic mode
//! - `report`: at-exit report (`PANG_REPORT`)
//! - `fatal`: process termination with fault exit codes
//! - `ffi`: C ABI for compiled front ends

pub mod arithmetic;
pub mod config;
pub mod fatal;
pub mod ffi;
pub mod machine;
pub mod memory;
pub mod op;
pub mod quotations;
pub mod report;
pub mod stack;

pub use config::{ArithmeticMode, MachineConfig, ReleasePolicy};
pub use fatal::terminate;
pub use machine::Machine;
pub use op::Op;

// Storage primitives
pub use pang_core::{
    ARENA_CAPACITY, Address, Arena, ArenaStats, Block, PangError, Result, TaggedValue,
};

// C ABI (exported for front-end linking)
pub use ffi::{
    pang_add as add, pang_apply as apply, pang_depth as depth, pang_fault_code as fault_code,
    pang_free as free, pang_machine_free as machine_free, pang_machine_from_env as machine_from_env,
    pang_machine_new as machine_new, pang_purge as purge, pang_push_int as push_int,
    pang_push_str as push_str, pang_quote as quote, pang_sub as sub, pang_swap as swap,
    pang_top_real as top_real,
};
