//! Execution error types
//!
//! [`ExecError`] covers the two ways the forward pass can fail. Both are
//! fatal for the pass itself, but the delta log recorded up to the failing
//! step is still valid and can be navigated.

use std::fmt;

/// Errors produced by the forward executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecError {
    /// The IAR points at an address with no command (fell off the end of the
    /// code, or jumped into data).
    NoCommand { address: i32, step: usize },

    /// The step limit was reached before the program halted.
    StepLimitExceeded { limit: usize },
}

impl fmt::Display for ExecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecError::NoCommand { address, step } => {
                write!(
                    f,
                    "no command at address 0x{:05X} (after {} steps)",
                    address, step
                )
            }
            ExecError::StepLimitExceeded { limit } => {
                write!(f, "program did not halt within {} steps", limit)
            }
        }
    }
}

impl std::error::Error for ExecError {}
