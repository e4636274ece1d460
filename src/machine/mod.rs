//! The Mima machine model
//!
//! This module defines the machine the debugger operates on:
//! - [`instruction`]: the instruction set, its 24-bit encoding, and disassembly
//! - [`state`]: the memory image, including the register cells
//! - [`exec`]: the forward executor that runs a program once and records
//!   every cell mutation as a reversible delta
//! - [`errors`]: execution error types
//!
//! # Machine Characteristics
//!
//! The Mima (Minimal Machine) is a single-accumulator teaching machine:
//! - Words are 24 bits wide, interpreted as two's complement when signed
//!   arithmetic matters (`JMN`, display).
//! - Addresses are 20 bits wide; instructions occupy one word each, with a
//!   4-bit opcode and a 20-bit argument (`0xF` selects the no-argument group).
//! - The registers are modeled as reserved *negative* addresses in the memory
//!   image ([`state::IAR`] = -1, [`state::ACCU`] = -2). Ordinary memory is
//!   non-negative, so the writes within one executed step always target
//!   distinct cells.

pub mod errors;
pub mod exec;
pub mod instruction;
pub mod state;

/// Mask selecting the 24 value bits of a machine word.
pub const VALUE_MASK: i32 = 0xFF_FFFF;

/// Mask selecting the 20 address bits of a machine word.
pub const ADDRESS_MASK: i32 = 0xF_FFFF;

/// Sign bit of a 24-bit two's complement word.
pub const SIGN_BIT: i32 = 1 << 23;

/// Label that marks the entry point of a program.
///
/// If a program defines no `START` label, execution begins at address 0.
pub const START_LABEL: &str = "START";

/// Interpret a 24-bit machine word as a signed integer.
pub fn to_signed(value: i32) -> i32 {
    if value & SIGN_BIT != 0 {
        value - (1 << 24)
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_signed() {
        assert_eq!(to_signed(0), 0);
        assert_eq!(to_signed(1), 1);
        assert_eq!(to_signed(VALUE_MASK), -1);
        assert_eq!(to_signed(SIGN_BIT), -(1 << 23));
        assert_eq!(to_signed(SIGN_BIT - 1), (1 << 23) - 1);
    }
}
