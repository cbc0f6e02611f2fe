use parse_display::Display;
use tracing::debug;

use super::{exception::Exception, memory::Memory, Computer, State};
use crate::constants::{self as C, Address, Word};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Opcode {
    /// Add two values
    #[display("add")]
    Add,

    /// Multiply two values
    #[display("mul")]
    Multiply,

    /// Pop a value from the input queue
    #[display("in")]
    Input,

    /// Push a value to the output sequence
    #[display("out")]
    Output,

    /// Jump if the value is not zero
    #[display("jnz")]
    JumpIfTrue,

    /// Jump if the value is zero
    #[display("jz")]
    JumpIfFalse,

    /// Compare two values, store 1 if the first is strictly less
    #[display("lt")]
    LessThan,

    /// Compare two values, store 1 if they are equal
    #[display("eq")]
    Equals,

    /// Add a value to the relative base
    #[display("arb")]
    AdjustRelativeBase,

    /// Stop the computer
    #[display("hlt")]
    Halt,
}

impl Opcode {
    #[must_use]
    pub const fn from_code(code: Word) -> Option<Self> {
        let opcode = match code {
            1 => Self::Add,
            2 => Self::Multiply,
            3 => Self::Input,
            4 => Self::Output,
            5 => Self::JumpIfTrue,
            6 => Self::JumpIfFalse,
            7 => Self::LessThan,
            8 => Self::Equals,
            9 => Self::AdjustRelativeBase,
            99 => Self::Halt,
            _ => return None,
        };
        Some(opcode)
    }

    #[must_use]
    pub const fn code(self) -> Word {
        match self {
            Self::Add => 1,
            Self::Multiply => 2,
            Self::Input => 3,
            Self::Output => 4,
            Self::JumpIfTrue => 5,
            Self::JumpIfFalse => 6,
            Self::LessThan => 7,
            Self::Equals => 8,
            Self::AdjustRelativeBase => 9,
            Self::Halt => 99,
        }
    }

    /// Number of parameters following the opcode
    #[must_use]
    pub const fn arity(self) -> usize {
        match self {
            Self::Add | Self::Multiply | Self::LessThan | Self::Equals => 3,
            Self::JumpIfTrue | Self::JumpIfFalse => 2,
            Self::Input | Self::Output | Self::AdjustRelativeBase => 1,
            Self::Halt => 0,
        }
    }
}

/// How a parameter cell is resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// The cell holds the address of the operand
    #[default]
    Position,

    /// The cell holds the operand itself
    Immediate,

    /// The cell holds an offset to the relative base
    Relative,
}

impl Mode {
    const fn from_digit(digit: Word) -> Option<Self> {
        match digit {
            0 => Some(Self::Position),
            1 => Some(Self::Immediate),
            2 => Some(Self::Relative),
            _ => None,
        }
    }
}

/// An instruction header, decoded from a single word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    /// Where the instruction word was read
    pub address: Address,
    pub opcode: Opcode,
    pub modes: [Mode; C::MAX_PARAMETERS],
}

impl Instruction {
    /// Decode an instruction word.
    ///
    /// The two lowest decimal digits are the opcode, the next three are the
    /// modes of the first, second and third parameters. Missing digits are
    /// zeroes.
    ///
    /// # Errors
    ///
    /// It fails if the word is not a valid instruction, has an unknown opcode
    /// or has an unknown mode digit, even for a parameter the opcode does not
    /// take.
    pub fn decode(word: Word, address: Address) -> Result<Self, Exception> {
        if !(0..=C::MAX_INSTRUCTION).contains(&word) {
            return Err(Exception::InvalidInstruction { word, address });
        }

        let code = word % 100;
        let opcode = Opcode::from_code(code).ok_or(Exception::UnknownOpcode {
            opcode: code,
            address,
        })?;

        let mut modes = [Mode::Position; C::MAX_PARAMETERS];
        let mut digits = word / 100;
        for mode in &mut modes {
            let digit = digits % 10;
            *mode = Mode::from_digit(digit).ok_or(Exception::UnknownMode {
                mode: digit,
                address,
            })?;
            digits /= 10;
        }

        Ok(Self {
            address,
            opcode,
            modes,
        })
    }

    /// Number of cells the instruction spans, opcode included
    #[must_use]
    pub const fn width(&self) -> usize {
        self.opcode.arity() + 1
    }

    /// Resolve two operands, combine them and store the result in the third
    /// parameter
    fn combine(
        &self,
        computer: &mut Computer,
        operation: impl FnOnce(Word, Word) -> Option<Word>,
    ) -> Result<(), Exception> {
        let [first, second, third] = self.modes;
        let a = computer.read_parameter(first)?;
        let b = computer.read_parameter(second)?;
        let res = operation(a, b).ok_or(Exception::Overflow {
            address: self.address,
        })?;
        debug!("{}({}, {}) = {}", self.opcode, a, b, res);
        computer.write_parameter(third, res)
    }

    /// Execute the instruction.
    ///
    /// The program counter must point to the instruction word. When this
    /// returns, it points to the next instruction to execute.
    #[tracing::instrument(skip(computer), level = "trace")]
    pub(crate) fn execute(&self, computer: &mut Computer) -> Result<State, Exception> {
        let [first, second, _] = self.modes;

        match self.opcode {
            Opcode::Add => self.combine(computer, Word::checked_add)?,

            Opcode::Multiply => self.combine(computer, Word::checked_mul)?,

            Opcode::LessThan => self.combine(computer, |a, b| Some(Word::from(a < b)))?,

            Opcode::Equals => self.combine(computer, |a, b| Some(Word::from(a == b)))?,

            Opcode::Input => {
                // Resolve the target first so that a faulty target does not consume input
                let target = computer.write_target(first)?;
                let value = computer
                    .input
                    .pop_front()
                    .ok_or(Exception::InputStarvation {
                        address: self.address,
                    })?;
                debug!(value, target, "Reading input");
                computer.memory.write(target, value);
            }

            Opcode::Output => {
                let value = computer.read_parameter(first)?;
                debug!(value, "Writing output");
                computer.output.push(value);
            }

            Opcode::JumpIfTrue | Opcode::JumpIfFalse => {
                let value = computer.read_parameter(first)?;
                let target = computer.read_parameter(second)?;
                if (value != 0) == (self.opcode == Opcode::JumpIfTrue) {
                    let target = Memory::address(target)?;
                    debug!("Jumping to address {}", target);
                    computer.memory.set_pointer(target);
                    return Ok(State::Running);
                }
            }

            Opcode::AdjustRelativeBase => {
                let delta = computer.read_parameter(first)?;
                let base = computer
                    .memory
                    .adjust_relative_base(delta)
                    .ok_or(Exception::Overflow {
                        address: self.address,
                    })?;
                debug!(delta, base, "Adjusting relative base");
            }

            Opcode::Halt => return Ok(State::Halted),
        }

        // Step over the last parameter
        computer.memory.advance();
        Ok(State::Running)
    }
}
