//! # Introduction
//!
//! mimatty assembles and executes programs for the Mima (Minimal Machine),
//! recording every memory-cell mutation as a reversible delta. The recorded
//! history is then navigated forward and backward through a terminal UI built
//! with [ratatui](https://docs.rs/ratatui) — stepping never re-executes an
//! instruction, it only replays or undoes deltas.
//!
//! ## Execution pipeline
//!
//! ```text
//! Source → Lexer → Assembler → Program → Executor → Delta log → Timeline → TUI
//! ```
//!
//! 1. [`parser`] — tokenises the assembly source and lays out the program
//!    (commands, labels, initial data values).
//! 2. [`machine`] — the Mima model: instruction set, memory image
//!    ([`machine::state::State`]), and the forward executor that runs the
//!    program once while recording each cell write as a
//!    [`timeline::Update`].
//! 3. [`timeline`] — the time-travel core: a cursor over the delta log that
//!    reconstructs the machine state at any step in O(1) per step moved and
//!    notifies registered observers of every cell write.
//! 4. [`ui`] — ratatui-based TUI; not part of the stable library API.
//!
//! ## Supported instruction set
//!
//! `LDC`, `LDV`, `STV`, `ADD`, `AND`, `OR`, `XOR`, `EQL`, `JMP`, `JMN`,
//! `LDIV`, `STIV`, `HALT`, `NOT`, `RAR` — the classic Mima set with 24-bit
//! words and 20-bit addresses. Assembler directives: `LABEL:`, `* = addr`,
//! `DS value`.

pub mod machine;
pub mod parser;
pub mod timeline;
pub mod ui;
