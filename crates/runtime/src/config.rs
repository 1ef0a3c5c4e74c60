//! Machine configuration
//!
//! Read once from the environment when a machine is built with
//! `Machine::from_env()`:
//! - `PANG_RELEASE`: `span` (default) or `slot`
//! - `PANG_ARITH`: `unchecked` (default) or `checked`
//!
//! Unrecognised values are logged and replaced by the default.

use std::env;
use tracing::warn;

pub const RELEASE_ENV: &str = "PANG_RELEASE";
pub const ARITH_ENV: &str = "PANG_ARITH";

/// How much storage a popped stack entry gives back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReleasePolicy {
    /// The whole allocation the entry came from (a string's characters,
    /// terminator and pointer cell)
    #[default]
    Span,
    /// Exactly one cell per entry. Multi-cell allocations leak the rest.
    Slot,
}

impl ReleasePolicy {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "span" => Some(ReleasePolicy::Span),
            "slot" => Some(ReleasePolicy::Slot),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArithmeticMode {
    /// Operate on `real` whatever the tags say
    #[default]
    Unchecked,
    /// Reject null and pointer operands
    Checked,
}

impl ArithmeticMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "unchecked" => Some(ArithmeticMode::Unchecked),
            "checked" => Some(ArithmeticMode::Checked),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MachineConfig {
    pub release: ReleasePolicy,
    pub arithmetic: ArithmeticMode,
}

impl MachineConfig {
    /// Settings that reproduce the reference machine exactly
    pub fn compat() -> Self {
        MachineConfig {
            release: ReleasePolicy::Slot,
            arithmetic: ArithmeticMode::Unchecked,
        }
    }

    pub fn from_env() -> Self {
        Self::from_values(
            env::var(RELEASE_ENV).ok().as_deref(),
            env::var(ARITH_ENV).ok().as_deref(),
        )
    }

    /// Build from raw setting values (`None` or empty means unset)
    pub fn from_values(release: Option<&str>, arithmetic: Option<&str>) -> Self {
        let mut config = MachineConfig::default();

        if let Some(val) = release.filter(|v| !v.is_empty()) {
            match ReleasePolicy::parse(val) {
                Some(policy) => config.release = policy,
                None => warn!("{}='{}' not recognized, using span", RELEASE_ENV, val),
            }
        }

        if let Some(val) = arithmetic.filter(|v| !v.is_empty()) {
            match ArithmeticMode::parse(val) {
                Some(mode) => config.arithmetic = mode,
                None => warn!("{}='{}' not recognized, using unchecked", ARITH_ENV, val),
            }
        }

        config
    }
}
