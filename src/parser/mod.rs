//! Mima assembly parser
//!
//! This module transforms assembly source text into an assembled program:
//! - [`lexer`]: tokenization (source text → tokens)
//! - [`assembler`]: two-pass assembly (tokens → commands, labels, data)
//!
//! # Syntax
//!
//! One item per line, `;` starts a comment:
//!
//! ```text
//! ; sum two cells
//! * = 0x100          ; set the location counter
//! START:  LDV a      ; label + instruction
//!         ADD b
//!         STV a
//!         HALT
//! a:      DS 5       ; one data word, initial value 5
//! b:      DS 37
//! ```
//!
//! Numbers are decimal or `0x` hexadecimal; `DS` values may be negative
//! (stored in 24-bit two's complement). Instruction arguments are either
//! numbers or labels and must fit in 20 bits. Mnemonics are matched
//! case-insensitively; labels are case-sensitive.
//!
//! # Implementation
//!
//! Hand-written line-oriented parser. Pass 1 lays out items and collects
//! label addresses; pass 2 resolves label arguments and encodes commands.
//! No external parser dependencies.

pub mod assembler;
pub mod lexer;
