//! Forward executor
//!
//! Runs an assembled program exactly once, forward, and records every cell
//! mutation as a reversible [`Update`]. The resulting delta log is what the
//! [`Timeline`](crate::timeline::Timeline) navigates; navigation never
//! re-executes instructions.
//!
//! # Delta Recording
//!
//! Each executed step produces one group of updates:
//! 1. the instruction's memory or accumulator effect (if any),
//! 2. the IAR change, always last.
//!
//! Within one step the updates always target distinct cells (registers are
//! negative addresses, memory is non-negative, and no instruction writes two
//! memory cells), which is the precondition the timeline relies on when it
//! undoes a step in recorded order. Writes are recorded even when the new
//! value equals the old one, so old/new are exact inverses by construction.

use crate::machine::errors::ExecError;
use crate::machine::instruction::Instruction;
use crate::machine::state::{State, ACCU, IAR};
use crate::machine::{ADDRESS_MASK, SIGN_BIT, START_LABEL, VALUE_MASK};
use crate::parser::assembler::Program;
use crate::timeline::Update;
use rustc_hash::FxHashMap;

/// Default bound on the number of executed steps.
///
/// Guards against non-terminating programs; overridable from the CLI.
pub const DEFAULT_MAX_STEPS: usize = 100_000;

/// Executes a program once and accumulates the delta log.
pub struct Executor {
    state: State,
    by_address: FxHashMap<i32, Instruction>,
    log: Vec<Vec<Update>>,
    halted: bool,
}

impl Executor {
    /// Create an executor for `program`, seeding the IAR from the `START`
    /// label (address 0 if the program defines none).
    pub fn new(program: &Program) -> Self {
        let mut state = State::new(&program.commands, &program.initial_values);
        let start = program
            .label_map
            .get(START_LABEL)
            .copied()
            .unwrap_or(0);
        state.set(IAR, start);

        let mut by_address = FxHashMap::default();
        for command in &program.commands {
            by_address.insert(command.address, command.instruction);
        }

        Executor {
            state,
            by_address,
            log: Vec::new(),
            halted: false,
        }
    }

    /// Run until the program halts or `max_steps` is reached.
    ///
    /// On error the log recorded so far remains valid; callers may still
    /// hand it to a timeline for partial navigation.
    pub fn run(&mut self, max_steps: usize) -> Result<(), ExecError> {
        while !self.halted {
            if self.log.len() >= max_steps {
                return Err(ExecError::StepLimitExceeded { limit: max_steps });
            }
            self.step()?;
        }
        Ok(())
    }

    /// Number of steps recorded so far.
    pub fn steps(&self) -> usize {
        self.log.len()
    }

    /// Consume the executor and return the delta log.
    pub fn into_log(self) -> Vec<Vec<Update>> {
        self.log
    }

    /// Execute one instruction, appending its update group to the log.
    fn step(&mut self) -> Result<(), ExecError> {
        let iar = self.state.get(IAR);
        let instruction = *self
            .by_address
            .get(&iar)
            .ok_or(ExecError::NoCommand {
                address: iar,
                step: self.log.len(),
            })?;

        let mut updates = Vec::new();
        let accu = self.state.get(ACCU);
        let mut next_iar = (iar + 1) & ADDRESS_MASK;

        match instruction {
            Instruction::Ldc(c) => {
                self.write(&mut updates, ACCU, c & VALUE_MASK);
            }
            Instruction::Ldv(a) => {
                let value = self.state.get(a);
                self.write(&mut updates, ACCU, value);
            }
            Instruction::Stv(a) => {
                self.write(&mut updates, a, accu);
            }
            Instruction::Add(a) => {
                let value = (accu + self.state.get(a)) & VALUE_MASK;
                self.write(&mut updates, ACCU, value);
            }
            Instruction::And(a) => {
                self.write(&mut updates, ACCU, accu & self.state.get(a));
            }
            Instruction::Or(a) => {
                self.write(&mut updates, ACCU, accu | self.state.get(a));
            }
            Instruction::Xor(a) => {
                self.write(&mut updates, ACCU, accu ^ self.state.get(a));
            }
            Instruction::Eql(a) => {
                let value = if accu == self.state.get(a) { VALUE_MASK } else { 0 };
                self.write(&mut updates, ACCU, value);
            }
            Instruction::Jmp(a) => {
                next_iar = a & ADDRESS_MASK;
            }
            Instruction::Jmn(a) => {
                if accu & SIGN_BIT != 0 {
                    next_iar = a & ADDRESS_MASK;
                }
            }
            Instruction::Ldiv(a) => {
                let pointer = self.state.get(a) & ADDRESS_MASK;
                let value = self.state.get(pointer);
                self.write(&mut updates, ACCU, value);
            }
            Instruction::Stiv(a) => {
                let pointer = self.state.get(a) & ADDRESS_MASK;
                self.write(&mut updates, pointer, accu);
            }
            Instruction::Not => {
                self.write(&mut updates, ACCU, !accu & VALUE_MASK);
            }
            Instruction::Rar => {
                let value = ((accu >> 1) | ((accu & 1) << 23)) & VALUE_MASK;
                self.write(&mut updates, ACCU, value);
            }
            Instruction::Halt => {
                self.halted = true;
            }
        }

        // IAR change is always the last update of a step.
        self.write(&mut updates, IAR, next_iar);
        self.log.push(updates);
        Ok(())
    }

    /// Record the old/new pair for a cell write and apply it.
    fn write(&mut self, updates: &mut Vec<Update>, address: i32, value: i32) {
        updates.push(Update {
            address,
            old_value: self.state.get(address),
            new_value: value,
        });
        self.state.set(address, value);
    }
}
