use thiserror::Error;

use super::memory::MemoryError;
use crate::constants::{Address, Word};

/// Faults raised while executing a program.
///
/// None of them can be recovered from: the computer stops in the faulted
/// state, with memory and output as they were when the fault occurred.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exception {
    #[error("unknown opcode {opcode} at address {address}")]
    UnknownOpcode { opcode: Word, address: Address },

    #[error("unknown parameter mode {mode} at address {address}")]
    UnknownMode { mode: Word, address: Address },

    /// The word is negative or has more than five digits
    #[error("invalid instruction {word} at address {address}")]
    InvalidInstruction { word: Word, address: Address },

    /// An immediate mode parameter was used as a write target. The address
    /// is the one of the parameter cell.
    #[error("write to immediate parameter at address {address}")]
    ImmediateWrite { address: Address },

    #[error("input queue exhausted at address {address}")]
    InputStarvation { address: Address },

    /// A result did not fit in a [`Word`]. Words are 64-bit signed integers
    /// and never wrap, so an `add`, `mul` or relative base adjustment past
    /// their range stops the program instead of yielding a truncated value.
    #[error("arithmetic overflow at address {address}")]
    Overflow { address: Address },

    #[error("invalid memory access ({0})")]
    InvalidMemoryAccess(#[from] MemoryError),
}

impl Exception {
    /// Whether the fault was raised while decoding the instruction, before
    /// any of its parameters were resolved
    #[must_use]
    pub const fn is_decode_error(&self) -> bool {
        matches!(
            self,
            Exception::UnknownOpcode { .. }
                | Exception::UnknownMode { .. }
                | Exception::InvalidInstruction { .. }
        )
    }
}
