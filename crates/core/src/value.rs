//! Tagged Value: one arena slot
//!
//! Every cell in the arena holds a `TaggedValue`: a null flag, a pointer
//! flag and a signed integer payload.
//!
//! ```text
//! ┌──────────┬──────────┬─────────────────────────┐
//! │ is_null  │ is_ptr   │ real (i64)              │
//! ├──────────┼──────────┼─────────────────────────┤
//! │ true     │ false    │ 0   null integer        │
//! │ true     │ true     │ 0   null pointer        │
//! │ false    │ false    │ n   integer literal     │
//! │ false    │ true     │ a   pointer to addr a   │
//! └──────────┴──────────┴─────────────────────────┘
//! ```
//!
//! `is_null` always wins: a null cell displays and compares as null no matter
//! what `real` holds.

use serde::Serialize;
use std::fmt;

/// Arena address. The address space is 16 bits wide.
pub type Address = u16;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct TaggedValue {
    pub is_null: bool,
    pub is_ptr: bool,
    pub real: i64,
}

impl TaggedValue {
    /// The sentinel stored at address 0
    pub const fn null_int() -> Self {
        TaggedValue {
            is_null: true,
            is_ptr: false,
            real: 0,
        }
    }

    /// String terminator and the result of quoting zero
    pub const fn null_ptr() -> Self {
        TaggedValue {
            is_null: true,
            is_ptr: true,
            real: 0,
        }
    }

    pub const fn int(value: i64) -> Self {
        TaggedValue {
            is_null: false,
            is_ptr: false,
            real: value,
        }
    }

    pub const fn ptr(addr: Address) -> Self {
        TaggedValue {
            is_null: false,
            is_ptr: true,
            real: addr as i64,
        }
    }

    /// True for a non-null, non-pointer value
    #[inline]
    pub fn is_int(&self) -> bool {
        !self.is_null && !self.is_ptr
    }

    #[inline]
    pub fn is_null_int(&self) -> bool {
        self.is_null && !self.is_ptr
    }

    #[inline]
    pub fn is_null_ptr(&self) -> bool {
        self.is_null && self.is_ptr
    }
}

impl PartialEq for TaggedValue {
    fn eq(&self, other: &Self) -> bool {
        if self.is_null || other.is_null {
            return self.is_null == other.is_null && self.is_ptr == other.is_ptr;
        }
        self.is_ptr == other.is_ptr && self.real == other.real
    }
}

impl Eq for TaggedValue {}

impl fmt::Display for TaggedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null {
            write!(f, "null")
        } else if self.is_ptr {
            write!(f, "ptr({})", self.real)
        } else {
            write!(f, "{}", self.real)
        }
    }
}
