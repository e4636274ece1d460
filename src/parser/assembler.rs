//! Two-pass assembler
//!
//! Pass 1 walks the token stream line by line, maintaining the location
//! counter, laying out instructions and data words, and collecting label
//! addresses. Pass 2 resolves label arguments (which may be forward
//! references) and produces the final [`Program`].

use crate::machine::instruction::{Command, Instruction};
use crate::machine::{ADDRESS_MASK, VALUE_MASK};
use crate::parser::lexer::{LexError, Lexer, Token};
use rustc_hash::FxHashMap;
use std::fmt;

/// An assembled program: the static inputs the executor and timeline share.
#[derive(Debug, Clone)]
pub struct Program {
    /// Commands in source order.
    pub commands: Vec<Command>,
    /// Label name → address.
    pub label_map: FxHashMap<String, i32>,
    /// Initial data values (`DS` words), address → value.
    pub initial_values: FxHashMap<i32, i32>,
}

/// Assembler error type
#[derive(Debug)]
pub struct AsmError {
    pub message: String,
    pub line: usize,
}

impl fmt::Display for AsmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Assembly error at line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for AsmError {}

impl From<LexError> for AsmError {
    fn from(err: LexError) -> Self {
        AsmError {
            message: err.message,
            line: err.location.line,
        }
    }
}

/// An unresolved instruction argument.
#[derive(Debug, Clone)]
enum Arg {
    Number(i32),
    Label(String, usize),
}

/// One laid-out source item awaiting argument resolution.
#[derive(Debug)]
enum Item {
    Command {
        address: i32,
        mnemonic: String,
        arg: Option<Arg>,
        label: Option<String>,
        line: usize,
    },
    Data {
        address: i32,
        value: i32,
    },
}

/// Assemble Mima assembly source into a [`Program`].
pub fn assemble(source: &str) -> Result<Program, AsmError> {
    let tokens = Lexer::new(source).tokenize()?;
    let mut assembler = Assembler::new(tokens);
    assembler.layout()?;
    assembler.resolve()
}

struct Assembler {
    tokens: Vec<Token>,
    position: usize,
    counter: i32,
    items: Vec<Item>,
    label_map: FxHashMap<String, i32>,
    occupied: FxHashMap<i32, usize>,
}

impl Assembler {
    fn new(tokens: Vec<Token>) -> Self {
        Assembler {
            tokens,
            position: 0,
            counter: 0,
            items: Vec::new(),
            label_map: FxHashMap::default(),
            occupied: FxHashMap::default(),
        }
    }

    /// Pass 1: lay out items and collect label addresses.
    fn layout(&mut self) -> Result<(), AsmError> {
        loop {
            match self.peek().clone() {
                Token::Eof(_) => return Ok(()),
                Token::Newline(_) => {
                    self.bump();
                }
                _ => self.layout_line()?,
            }
        }
    }

    fn layout_line(&mut self) -> Result<(), AsmError> {
        let line = self.peek().location().line;

        // `* = addr` moves the location counter.
        if matches!(self.peek(), Token::Star(_)) {
            self.bump();
            self.expect_eq(line)?;
            let target = self.expect_number(line)?;
            if !(0..=ADDRESS_MASK).contains(&target) {
                return Err(AsmError {
                    message: format!("origin 0x{:X} is outside the address space", target),
                    line,
                });
            }
            self.counter = target;
            return self.expect_end_of_line(line);
        }

        // Optional `LABEL:` prefix.
        let mut label = None;
        if let Token::Ident(name, _) = self.peek().clone() {
            if matches!(self.peek_at(1), Token::Colon(_)) {
                self.bump();
                self.bump();
                if self.label_map.contains_key(&name) {
                    return Err(AsmError {
                        message: format!("duplicate label '{}'", name),
                        line,
                    });
                }
                self.label_map.insert(name.clone(), self.counter);
                label = Some(name);
            }
        }

        // A label may stand alone on its line.
        if matches!(self.peek(), Token::Newline(_) | Token::Eof(_)) {
            if label.is_none() {
                return Err(AsmError {
                    message: "expected an instruction, 'DS' or '* ='".to_string(),
                    line,
                });
            }
            return self.expect_end_of_line(line);
        }

        let mnemonic = match self.peek().clone() {
            Token::Ident(name, _) => {
                self.bump();
                name
            }
            token => {
                return Err(AsmError {
                    message: format!("expected a mnemonic, found {:?}", token),
                    line,
                });
            }
        };

        if mnemonic.eq_ignore_ascii_case("DS") {
            let value = match self.peek() {
                Token::Number(value, _) => {
                    let value = *value;
                    self.bump();
                    value
                }
                _ => 0,
            };
            if value > VALUE_MASK || value < -(1 << 23) {
                return Err(AsmError {
                    message: format!("data value {} does not fit in 24 bits", value),
                    line,
                });
            }
            self.claim(self.counter, line)?;
            self.items.push(Item::Data {
                address: self.counter,
                value: value & VALUE_MASK,
            });
            self.counter += 1;
            return self.expect_end_of_line(line);
        }

        let arg = match self.peek().clone() {
            Token::Number(value, _) => {
                self.bump();
                Some(Arg::Number(value))
            }
            Token::Ident(name, loc) => {
                self.bump();
                Some(Arg::Label(name, loc.line))
            }
            _ => None,
        };

        self.claim(self.counter, line)?;
        self.items.push(Item::Command {
            address: self.counter,
            mnemonic,
            arg,
            label,
            line,
        });
        self.counter += 1;
        self.expect_end_of_line(line)
    }

    /// Pass 2: resolve arguments and build the program.
    fn resolve(self) -> Result<Program, AsmError> {
        let mut commands = Vec::new();
        let mut initial_values = FxHashMap::default();

        for item in &self.items {
            match item {
                Item::Data { address, value } => {
                    initial_values.insert(*address, *value);
                }
                Item::Command {
                    address,
                    mnemonic,
                    arg,
                    label,
                    line,
                } => {
                    let argument = match arg {
                        None => None,
                        Some(Arg::Number(value)) => Some(*value),
                        Some(Arg::Label(name, line)) => {
                            Some(*self.label_map.get(name).ok_or_else(|| AsmError {
                                message: format!("undefined label '{}'", name),
                                line: *line,
                            })?)
                        }
                    };
                    let instruction = instruction_for(mnemonic, argument, *line)?;
                    commands.push(Command {
                        address: *address,
                        instruction,
                        label: label.clone(),
                        line: *line,
                    });
                }
            }
        }

        Ok(Program {
            commands,
            label_map: self.label_map,
            initial_values,
        })
    }

    /// Mark an address as occupied, rejecting overlaps.
    fn claim(&mut self, address: i32, line: usize) -> Result<(), AsmError> {
        if address > ADDRESS_MASK {
            return Err(AsmError {
                message: format!("address 0x{:X} is outside the address space", address),
                line,
            });
        }
        if let Some(previous) = self.occupied.insert(address, line) {
            return Err(AsmError {
                message: format!(
                    "address 0x{:05X} is already occupied by line {}",
                    address, previous
                ),
                line,
            });
        }
        Ok(())
    }

    fn expect_eq(&mut self, line: usize) -> Result<(), AsmError> {
        if matches!(self.peek(), Token::Eq(_)) {
            self.bump();
            Ok(())
        } else {
            Err(AsmError {
                message: "expected '=' after '*'".to_string(),
                line,
            })
        }
    }

    fn expect_number(&mut self, line: usize) -> Result<i32, AsmError> {
        match self.peek() {
            Token::Number(value, _) => {
                let value = *value;
                self.bump();
                Ok(value)
            }
            _ => Err(AsmError {
                message: "expected a number".to_string(),
                line,
            }),
        }
    }

    fn expect_end_of_line(&mut self, line: usize) -> Result<(), AsmError> {
        match self.peek() {
            Token::Newline(_) => {
                self.bump();
                Ok(())
            }
            Token::Eof(_) => Ok(()),
            token => Err(AsmError {
                message: format!("unexpected trailing {:?}", token),
                line,
            }),
        }
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.position.min(self.tokens.len() - 1)]
    }

    fn peek_at(&self, offset: usize) -> &Token {
        &self.tokens[(self.position + offset).min(self.tokens.len() - 1)]
    }

    fn bump(&mut self) {
        if self.position < self.tokens.len() - 1 {
            self.position += 1;
        }
    }
}

/// Map a mnemonic and optional resolved argument to an [`Instruction`].
fn instruction_for(mnemonic: &str, arg: Option<i32>, line: usize) -> Result<Instruction, AsmError> {
    let upper = mnemonic.to_ascii_uppercase();

    let with_arg = |build: fn(i32) -> Instruction| -> Result<Instruction, AsmError> {
        let value = arg.ok_or_else(|| AsmError {
            message: format!("'{}' requires an argument", upper),
            line,
        })?;
        if !(0..=ADDRESS_MASK).contains(&value) {
            return Err(AsmError {
                message: format!("argument {} does not fit in 20 bits", value),
                line,
            });
        }
        Ok(build(value))
    };

    let without_arg = |instruction: Instruction| -> Result<Instruction, AsmError> {
        if arg.is_some() {
            return Err(AsmError {
                message: format!("'{}' takes no argument", upper),
                line,
            });
        }
        Ok(instruction)
    };

    match upper.as_str() {
        "LDC" => with_arg(Instruction::Ldc),
        "LDV" => with_arg(Instruction::Ldv),
        "STV" => with_arg(Instruction::Stv),
        "ADD" => with_arg(Instruction::Add),
        "AND" => with_arg(Instruction::And),
        "OR" => with_arg(Instruction::Or),
        "XOR" => with_arg(Instruction::Xor),
        "EQL" => with_arg(Instruction::Eql),
        "JMP" => with_arg(Instruction::Jmp),
        "JMN" => with_arg(Instruction::Jmn),
        "LDIV" => with_arg(Instruction::Ldiv),
        "STIV" => with_arg(Instruction::Stiv),
        "HALT" => without_arg(Instruction::Halt),
        "NOT" => without_arg(Instruction::Not),
        "RAR" => without_arg(Instruction::Rar),
        _ => Err(AsmError {
            message: format!("unknown mnemonic '{}'", mnemonic),
            line,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_and_labels() {
        let program = assemble(
            "* = 0x10\n\
             START: LDV a\n\
                    ADD a\n\
                    HALT\n\
             a:     DS 21\n",
        )
        .expect("assembly failed");

        assert_eq!(program.commands.len(), 3);
        assert_eq!(program.commands[0].address, 0x10);
        assert_eq!(program.commands[2].address, 0x12);
        assert_eq!(program.label_map["START"], 0x10);
        assert_eq!(program.label_map["a"], 0x13);
        assert_eq!(program.initial_values[&0x13], 21);
        assert_eq!(program.commands[0].instruction, Instruction::Ldv(0x13));
    }

    #[test]
    fn test_forward_reference_resolves() {
        let program = assemble("JMP end\nend: HALT\n").expect("assembly failed");
        assert_eq!(program.commands[0].instruction, Instruction::Jmp(1));
    }

    #[test]
    fn test_ds_defaults_to_zero_and_masks_negatives() {
        let program = assemble("a: DS\nb: DS -1\n").expect("assembly failed");
        assert_eq!(program.initial_values[&0], 0);
        assert_eq!(program.initial_values[&1], VALUE_MASK);
    }

    #[test]
    fn test_label_alone_on_line() {
        let program = assemble("loop:\nHALT\n").expect("assembly failed");
        assert_eq!(program.label_map["loop"], 0);
        assert_eq!(program.commands[0].address, 0);
        assert_eq!(program.commands[0].label, None);
    }

    #[test]
    fn test_duplicate_label_rejected() {
        let err = assemble("a: DS\na: DS\n").unwrap_err();
        assert!(err.message.contains("duplicate label"));
        assert_eq!(err.line, 2);
    }

    #[test]
    fn test_undefined_label_rejected() {
        let err = assemble("JMP nowhere\n").unwrap_err();
        assert!(err.message.contains("undefined label"));
    }

    #[test]
    fn test_unknown_mnemonic_rejected() {
        let err = assemble("FROB 3\n").unwrap_err();
        assert!(err.message.contains("unknown mnemonic"));
    }

    #[test]
    fn test_arity_errors() {
        assert!(assemble("LDV\n").unwrap_err().message.contains("requires"));
        assert!(assemble("HALT 3\n")
            .unwrap_err()
            .message
            .contains("takes no argument"));
    }

    #[test]
    fn test_overlapping_addresses_rejected() {
        let err = assemble("HALT\n* = 0\nHALT\n").unwrap_err();
        assert!(err.message.contains("already occupied"));
    }

    #[test]
    fn test_argument_out_of_range() {
        let err = assemble("LDC -1\n").unwrap_err();
        assert!(err.message.contains("20 bits"));
    }
}
