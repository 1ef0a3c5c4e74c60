//! Fatal termination
//!
//! A fault ends the whole run. Hosts that want the reference behaviour call
//! `Machine::run_or_exit`, which writes the at-exit report and leaves the
//! process with the fault's exit code.

use crate::machine::Machine;
use crate::op::Op;
use crate::report;
use pang_core::PangError;
use tracing::error;

/// Log `err` and exit the process with its code
pub fn terminate(err: &PangError) -> ! {
    error!(code = err.exit_code(), "{}", err);
    std::process::exit(err.exit_code());
}

impl Machine {
    /// Run `ops`; on the first fault, report and exit the process
    pub fn run_or_exit<'a, I>(&mut self, ops: I)
    where
        I: IntoIterator<Item = &'a Op>,
    {
        let result = self.run(ops);
        report::emit(self);
        if let Err(err) = result {
            terminate(&err);
        }
    }
}
