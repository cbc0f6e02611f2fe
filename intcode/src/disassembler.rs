//! Render a memory image as a listing of instructions.
//!
//! The listing is produced by a linear sweep: cells that decode as an
//! instruction are shown with their parameters, anything else is shown as a
//! `.word` directive. Data mixed with code can therefore be misread as
//! instructions; nothing is executed to tell them apart.

use parse_display::Display;

use crate::constants::{Address, Word};
use crate::runtime::{Instruction, Mode};

/// A parameter, as it appears after the opcode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Parameter {
    #[display("[{0}]")]
    Position(Word),

    #[display("{0}")]
    Immediate(Word),

    #[display("[rb{0:+}]")]
    Relative(Word),
}

impl Parameter {
    const fn new(mode: Mode, cell: Word) -> Self {
        match mode {
            Mode::Position => Self::Position(cell),
            Mode::Immediate => Self::Immediate(cell),
            Mode::Relative => Self::Relative(cell),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Instruction {
        instruction: Instruction,
        parameters: Vec<Parameter>,
    },
    Data {
        address: Address,
        value: Word,
    },
}

impl Line {
    #[must_use]
    pub fn address(&self) -> Address {
        match self {
            Line::Instruction { instruction, .. } => instruction.address,
            Line::Data { address, .. } => *address,
        }
    }

    /// Number of cells covered by the line
    #[must_use]
    pub fn width(&self) -> usize {
        match self {
            Line::Instruction { instruction, .. } => instruction.width(),
            Line::Data { .. } => 1,
        }
    }
}

impl std::fmt::Display for Line {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Line::Instruction {
                instruction,
                parameters,
            } => {
                let mnemonic = instruction.opcode.to_string();
                if parameters.is_empty() {
                    return write!(f, "{mnemonic}");
                }

                let parameters: Vec<String> = parameters.iter().map(ToString::to_string).collect();
                write!(f, "{mnemonic:<3} {}", parameters.join(", "))
            }
            Line::Data { value, .. } => write!(f, ".word {value}"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    pub lines: Vec<Line>,
}

impl std::fmt::Display for Listing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let width = self
            .lines
            .last()
            .map_or(1, |line| line.address().to_string().len());

        for line in &self.lines {
            writeln!(f, "{:>width$}: {}", line.address(), line)?;
        }

        Ok(())
    }
}

/// Disassemble a memory image, starting at address 0
#[must_use]
pub fn disassemble(cells: &[Word]) -> Listing {
    let mut lines = Vec::new();
    let mut address = 0;

    while let Some(&word) = cells.get(address) {
        let line = match Instruction::decode(word, address) {
            Ok(instruction) => {
                let parameters = instruction
                    .modes
                    .iter()
                    .take(instruction.opcode.arity())
                    .enumerate()
                    .map(|(index, &mode)| {
                        // Parameters past the end of the image read as 0, like in memory
                        let cell = cells.get(address + 1 + index).copied().unwrap_or_default();
                        Parameter::new(mode, cell)
                    })
                    .collect();

                Line::Instruction {
                    instruction,
                    parameters,
                }
            }
            Err(_) => Line::Data {
                address,
                value: word,
            },
        };

        address += line.width();
        lines.push(line);
    }

    Listing { lines }
}
