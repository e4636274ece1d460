//! Instruction set and encoding
//!
//! This module defines [`Instruction`] (the decoded form of one machine word)
//! and [`Command`] (an instruction placed at an address by the assembler).
//!
//! # Encoding
//!
//! An instruction word is `opcode << 20 | argument`. Opcodes `0x0`..`0xB`
//! take a 20-bit argument; opcode `0xF` selects the no-argument group, where
//! the next four bits pick the operation (`0xF0` HALT, `0xF1` NOT, `0xF2` RAR).

use crate::machine::ADDRESS_MASK;
use std::fmt;

/// A decoded Mima instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// ACCU := constant
    Ldc(i32),
    /// ACCU := mem[a]
    Ldv(i32),
    /// mem[a] := ACCU
    Stv(i32),
    /// ACCU := ACCU + mem[a] (mod 2^24)
    Add(i32),
    /// ACCU := ACCU & mem[a]
    And(i32),
    /// ACCU := ACCU | mem[a]
    Or(i32),
    /// ACCU := ACCU ^ mem[a]
    Xor(i32),
    /// ACCU := -1 if ACCU == mem[a], else 0
    Eql(i32),
    /// IAR := a
    Jmp(i32),
    /// IAR := a if ACCU is negative
    Jmn(i32),
    /// ACCU := mem[mem[a]]
    Ldiv(i32),
    /// mem[mem[a]] := ACCU
    Stiv(i32),
    /// Stop execution
    Halt,
    /// ACCU := ~ACCU
    Not,
    /// Rotate ACCU right by one bit (within 24 bits)
    Rar,
}

impl Instruction {
    /// The assembly mnemonic of this instruction.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Instruction::Ldc(_) => "LDC",
            Instruction::Ldv(_) => "LDV",
            Instruction::Stv(_) => "STV",
            Instruction::Add(_) => "ADD",
            Instruction::And(_) => "AND",
            Instruction::Or(_) => "OR",
            Instruction::Xor(_) => "XOR",
            Instruction::Eql(_) => "EQL",
            Instruction::Jmp(_) => "JMP",
            Instruction::Jmn(_) => "JMN",
            Instruction::Ldiv(_) => "LDIV",
            Instruction::Stiv(_) => "STIV",
            Instruction::Halt => "HALT",
            Instruction::Not => "NOT",
            Instruction::Rar => "RAR",
        }
    }

    /// The 20-bit argument, or `None` for the no-argument group.
    pub fn argument(&self) -> Option<i32> {
        match *self {
            Instruction::Ldc(a)
            | Instruction::Ldv(a)
            | Instruction::Stv(a)
            | Instruction::Add(a)
            | Instruction::And(a)
            | Instruction::Or(a)
            | Instruction::Xor(a)
            | Instruction::Eql(a)
            | Instruction::Jmp(a)
            | Instruction::Jmn(a)
            | Instruction::Ldiv(a)
            | Instruction::Stiv(a) => Some(a),
            Instruction::Halt | Instruction::Not | Instruction::Rar => None,
        }
    }

    /// Encode this instruction as a 24-bit machine word.
    pub fn encode(&self) -> i32 {
        let arg = |a: i32| a & ADDRESS_MASK;
        match *self {
            Instruction::Ldc(a) => arg(a),
            Instruction::Ldv(a) => (0x1 << 20) | arg(a),
            Instruction::Stv(a) => (0x2 << 20) | arg(a),
            Instruction::Add(a) => (0x3 << 20) | arg(a),
            Instruction::And(a) => (0x4 << 20) | arg(a),
            Instruction::Or(a) => (0x5 << 20) | arg(a),
            Instruction::Xor(a) => (0x6 << 20) | arg(a),
            Instruction::Eql(a) => (0x7 << 20) | arg(a),
            Instruction::Jmp(a) => (0x8 << 20) | arg(a),
            Instruction::Jmn(a) => (0x9 << 20) | arg(a),
            Instruction::Ldiv(a) => (0xA << 20) | arg(a),
            Instruction::Stiv(a) => (0xB << 20) | arg(a),
            Instruction::Halt => 0xF0 << 16,
            Instruction::Not => 0xF1 << 16,
            Instruction::Rar => 0xF2 << 16,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.argument() {
            Some(arg) => write!(f, "{} 0x{:05X}", self.mnemonic(), arg),
            None => write!(f, "{}", self.mnemonic()),
        }
    }
}

/// An instruction placed at a concrete address by the assembler.
///
/// Carries the defining label (if any) and the 1-based source line so the UI
/// can map the instruction address register back to source text.
#[derive(Debug, Clone)]
pub struct Command {
    /// The memory address this command occupies.
    pub address: i32,
    /// The decoded instruction.
    pub instruction: Instruction,
    /// The label defined on this command's line, if any.
    pub label: Option<String>,
    /// 1-based line in the source text.
    pub line: usize,
}

impl Command {
    /// The 24-bit machine word stored at [`Command::address`].
    pub fn encoding(&self) -> i32 {
        self.instruction.encode()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => write!(f, "0x{:05X}  {}: {}", self.address, label, self.instruction),
            None => write!(f, "0x{:05X}  {}", self.address, self.instruction),
        }
    }
}
