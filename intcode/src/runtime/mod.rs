use std::collections::VecDeque;

use parse_display::Display;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::constants::{Address, Word};

mod exception;
mod instructions;
mod memory;
mod registers;

pub use self::exception::Exception;
pub use self::instructions::{Instruction, Mode, Opcode};
pub use self::memory::{Memory, MemoryError};
pub use self::registers::Registers;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorError {
    #[error("CPU exception: {0}")]
    Exception(#[from] Exception),

    #[error("computer is not running ({0})")]
    NotRunning(State),

    #[error("step limit reached after {0} instructions")]
    StepLimit(u64),
}

// Implement a MemoryError -> ProcessorError conversion to simplify code
impl From<MemoryError> for ProcessorError {
    fn from(e: MemoryError) -> Self {
        Self::Exception(Exception::InvalidMemoryAccess(e))
    }
}

type Result<T> = std::result::Result<T, ProcessorError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
#[display(style = "lowercase")]
pub enum State {
    #[default]
    Running,
    Halted,
    Faulted,
}

#[derive(Debug, Clone, Default)]
pub struct Computer {
    memory: Memory,
    input: VecDeque<Word>,
    output: Vec<Word>,
    state: State,
    steps: u64,
}

impl Computer {
    /// Create a computer with the given program loaded at address 0 and the
    /// given values waiting in the input queue
    pub fn new(program: impl Into<Vec<Word>>, input: impl IntoIterator<Item = Word>) -> Self {
        Self {
            memory: Memory::new(program),
            input: input.into_iter().collect(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    #[must_use]
    pub fn registers(&self) -> &Registers {
        self.memory.registers()
    }

    #[must_use]
    pub fn state(&self) -> State {
        self.state
    }

    /// Number of instructions executed so far, the final halt excluded
    #[must_use]
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Values emitted by the program so far, in order
    #[must_use]
    pub fn output(&self) -> &[Word] {
        &self.output
    }

    /// Drain the values emitted by the program so far
    pub fn take_output(&mut self) -> Vec<Word> {
        std::mem::take(&mut self.output)
    }

    /// Append a value to the input queue
    pub fn push_input(&mut self, value: Word) {
        self.input.push_back(value);
    }

    /// Resolve the next parameter as a value.
    ///
    /// This first advances the program counter onto the parameter cell, then
    /// reads it according to the mode. It must be called once per parameter,
    /// in order.
    pub(crate) fn read_parameter(&mut self, mode: Mode) -> std::result::Result<Word, Exception> {
        self.memory.advance();
        let cell = self.memory.read(self.memory.pointer());
        let address = match mode {
            Mode::Immediate => return Ok(cell),
            Mode::Position => Memory::address(cell)?,
            Mode::Relative => self.relative_address(cell)?,
        };
        Ok(self.memory.read(address))
    }

    /// Resolve the next parameter as a write target.
    ///
    /// Like [`Computer::read_parameter`], this advances the program counter
    /// onto the parameter cell first.
    pub(crate) fn write_target(&mut self, mode: Mode) -> std::result::Result<Address, Exception> {
        self.memory.advance();
        let cell = self.memory.read(self.memory.pointer());
        match mode {
            Mode::Position => Ok(Memory::address(cell)?),
            Mode::Relative => self.relative_address(cell),
            Mode::Immediate => Err(Exception::ImmediateWrite {
                address: self.memory.pointer(),
            }),
        }
    }

    /// Resolve the next parameter as a write target and store a value there
    pub(crate) fn write_parameter(
        &mut self,
        mode: Mode,
        value: Word,
    ) -> std::result::Result<(), Exception> {
        let address = self.write_target(mode)?;
        self.memory.write(address, value);
        Ok(())
    }

    fn relative_address(&self, offset: Word) -> std::result::Result<Address, Exception> {
        let word = self
            .memory
            .relative_base()
            .checked_add(offset)
            .ok_or(Exception::Overflow {
                address: self.memory.pointer(),
            })?;
        Ok(Memory::address(word)?)
    }

    fn execute_next(&mut self) -> std::result::Result<State, Exception> {
        let address = self.memory.pointer();
        let instruction = Instruction::decode(self.memory.read(address), address)?;
        debug!(
            address,
            opcode = %instruction.opcode,
            "Executing instruction"
        );
        let state = instruction.execute(self)?;
        if state == State::Running {
            self.steps += 1;
        }
        Ok(state)
    }

    /// Decode and execute the instruction under the program counter
    ///
    /// # Errors
    ///
    /// It fails if the computer already stopped, or if the instruction
    /// raised an exception. In the latter case the computer ends up in the
    /// [`State::Faulted`] state.
    #[tracing::instrument(skip(self), level = "debug")]
    pub fn step(&mut self) -> Result<State> {
        if self.state != State::Running {
            return Err(ProcessorError::NotRunning(self.state));
        }

        match self.execute_next() {
            Ok(state) => {
                self.state = state;
                Ok(state)
            }
            Err(exception) => {
                warn!(%exception, registers = %self.registers(), "Computer faulted");
                self.state = State::Faulted;
                Err(exception.into())
            }
        }
    }

    /// Run the program until it halts, and return the memory contents.
    ///
    /// There is no bound on the number of executed instructions, see
    /// [`Computer::run_for`].
    ///
    /// # Errors
    ///
    /// It fails if the computer already stopped, or if an instruction raised
    /// an exception.
    #[tracing::instrument(skip(self))]
    pub fn run(&mut self) -> Result<Vec<Word>> {
        info!("Running program");
        while self.step()? == State::Running {}
        info!(steps = self.steps, "Program halted");
        Ok(self.memory.snapshot())
    }

    /// Run the program until it halts, executing at most `max_steps`
    /// instructions. A halt instruction right after the limit is still
    /// executed.
    ///
    /// # Errors
    ///
    /// Same as [`Computer::run`], plus [`ProcessorError::StepLimit`] if the
    /// program did not halt in time. The computer is left running in that
    /// case.
    #[tracing::instrument(skip(self))]
    pub fn run_for(&mut self, max_steps: u64) -> Result<Vec<Word>> {
        info!("Running program");
        let limit = self.steps.saturating_add(max_steps);
        while self.step_within(limit)? == State::Running {}
        info!(steps = self.steps, "Program halted");
        Ok(self.memory.snapshot())
    }

    fn step_within(&mut self, limit: u64) -> Result<State> {
        if self.steps >= limit && !self.halts_next() {
            return Err(ProcessorError::StepLimit(self.steps));
        }

        self.step()
    }

    fn halts_next(&self) -> bool {
        let address = self.memory.pointer();
        Instruction::decode(self.memory.read(address), address)
            .is_ok_and(|instruction| instruction.opcode == Opcode::Halt)
    }
}
