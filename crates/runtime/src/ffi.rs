//! C ABI for compiled front ends
//!
//! A machine is heap-allocated by `pang_machine_new` and owned by the caller
//! until `pang_machine_free`. Every mutating call returns 0 on success or the
//! fault's exit code. Once a call has failed the machine is halted and all
//! later calls return the same code.

use crate::machine::Machine;
use pang_core::Result;
use std::ffi::{CStr, c_char};

#[inline]
fn status(result: Result<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) => e.exit_code(),
    }
}

/// Allocate a new machine with default configuration
///
/// The caller owns this memory and must call `pang_machine_free` when done.
#[unsafe(no_mangle)]
pub extern "C" fn pang_machine_new() -> *mut Machine {
    Box::into_raw(Box::new(Machine::new()))
}

/// Allocate a new machine configured from the environment
#[unsafe(no_mangle)]
pub extern "C" fn pang_machine_from_env() -> *mut Machine {
    Box::into_raw(Box::new(Machine::from_env()))
}

/// Free a machine
///
/// # Safety
/// The pointer must have been returned by `pang_machine_new` or
/// `pang_machine_from_env` and not freed before.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pang_machine_free(machine: *mut Machine) {
    if !machine.is_null() {
        unsafe {
            drop(Box::from_raw(machine));
        }
    }
}

/// # Safety
/// `machine` must be a valid pointer to a Machine.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pang_push_int(machine: *mut Machine, value: i64) -> i32 {
    assert!(!machine.is_null(), "pang_push_int: null machine");
    status(unsafe { (*machine).push_int(value) })
}

/// Push a NUL-terminated UTF-8 string (invalid sequences become U+FFFD)
///
/// # Safety
/// `machine` must be a valid pointer to a Machine and `value` a valid
/// NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pang_push_str(machine: *mut Machine, value: *const c_char) -> i32 {
    assert!(!machine.is_null(), "pang_push_str: null machine");
    assert!(!value.is_null(), "pang_push_str: null string");
    let text = unsafe { CStr::from_ptr(value) }.to_string_lossy();
    status(unsafe { (*machine).push_str(&text) })
}

/// # Safety
/// `machine` must be a valid pointer to a Machine.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pang_purge(machine: *mut Machine, n: u16) -> i32 {
    assert!(!machine.is_null(), "pang_purge: null machine");
    status(unsafe { (*machine).purge(n) })
}

/// # Safety
/// `machine` must be a valid pointer to a Machine.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pang_swap(machine: *mut Machine) -> i32 {
    assert!(!machine.is_null(), "pang_swap: null machine");
    status(unsafe { (*machine).swap() })
}

/// # Safety
/// `machine` must be a valid pointer to a Machine.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pang_quote(machine: *mut Machine) -> i32 {
    assert!(!machine.is_null(), "pang_quote: null machine");
    status(unsafe { (*machine).quote() })
}

/// # Safety
/// `machine` must be a valid pointer to a Machine.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pang_apply(machine: *mut Machine) -> i32 {
    assert!(!machine.is_null(), "pang_apply: null machine");
    status(unsafe { (*machine).apply() })
}

/// # Safety
/// `machine` must be a valid pointer to a Machine.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pang_add(machine: *mut Machine) -> i32 {
    assert!(!machine.is_null(), "pang_add: null machine");
    status(unsafe { (*machine).add() })
}

/// # Safety
/// `machine` must be a valid pointer to a Machine.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pang_sub(machine: *mut Machine) -> i32 {
    assert!(!machine.is_null(), "pang_sub: null machine");
    status(unsafe { (*machine).sub() })
}

/// # Safety
/// `machine` must be a valid pointer to a Machine.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pang_free(machine: *mut Machine) -> i32 {
    assert!(!machine.is_null(), "pang_free: null machine");
    status(unsafe { (*machine).free() })
}

/// Number of operands on the stack (sentinel excluded)
///
/// # Safety
/// `machine` must be a valid pointer to a Machine.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pang_depth(machine: *const Machine) -> usize {
    assert!(!machine.is_null(), "pang_depth: null machine");
    unsafe { (*machine).depth() }
}

/// Payload of the top value
///
/// # Safety
/// `machine` must be a valid pointer to a Machine.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pang_top_real(machine: *const Machine) -> i64 {
    assert!(!machine.is_null(), "pang_top_real: null machine");
    unsafe { (*machine).top().real }
}

/// Exit code of the fault that halted the machine, 0 if none
///
/// # Safety
/// `machine` must be a valid pointer to a Machine.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pang_fault_code(machine: *const Machine) -> i32 {
    assert!(!machine.is_null(), "pang_fault_code: null machine");
    unsafe { (*machine).fault().unwrap_or(0) }
}
