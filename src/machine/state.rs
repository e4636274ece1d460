//! Memory image of the machine
//!
//! [`State`] maps integer addresses to 24-bit values. Ordinary memory cells
//! are non-negative addresses; the registers live at reserved negative
//! addresses ([`IAR`], [`ACCU`]) so that deltas for register changes and
//! memory changes flow through the same mechanism.

use crate::machine::instruction::Command;
use rustc_hash::FxHashMap;

/// Reserved address of the instruction address register.
pub const IAR: i32 = -1;

/// Reserved address of the accumulator.
pub const ACCU: i32 = -2;

/// The machine's memory image, registers included.
///
/// Mutated only by the forward executor and by the timeline during
/// navigation; listeners and UI code read it through accessors.
#[derive(Debug, Clone)]
pub struct State {
    cells: FxHashMap<i32, i32>,
}

impl State {
    /// Build the initial memory image for a program.
    ///
    /// Each command's encoding is written at its address (reserving the code
    /// addresses), then the initial data values are applied on top. The IAR
    /// is left at 0; the caller seeds it with the resolved start address.
    pub fn new(commands: &[Command], initial_values: &FxHashMap<i32, i32>) -> Self {
        let mut cells = FxHashMap::default();
        for command in commands {
            cells.insert(command.address, command.encoding());
        }
        for (&address, &value) in initial_values {
            cells.insert(address, value);
        }
        State { cells }
    }

    /// Read the value at `address`.
    ///
    /// An address that was never initialized and never written reads as 0,
    /// matching a machine whose memory is zeroed at power-on. This is the
    /// single uninitialized-read policy of the whole crate.
    pub fn get(&self, address: i32) -> i32 {
        self.cells.get(&address).copied().unwrap_or(0)
    }

    /// Overwrite the value at `address`.
    ///
    /// No validation and no listener notification; observers are the
    /// timeline's responsibility, layered above.
    pub fn set(&mut self, address: i32, value: i32) {
        self.cells.insert(address, value);
    }

    /// Every address that currently has an explicit value.
    pub fn addresses(&self) -> impl Iterator<Item = i32> + '_ {
        self.cells.keys().copied()
    }
}
