use std::collections::BTreeMap;

use thiserror::Error;

use super::registers::Registers;
use crate::constants::{Address, Word, MAX_DENSE_GROWTH};

/// Represents errors related to memory manipulations
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MemoryError {
    /// The word does not designate a valid address
    #[error("invalid address {0}")]
    InvalidAddress(Word),
}

/// Holds the memory cells and the registers of the computer.
///
/// The memory grows when a cell past its end is written. Cells that were
/// never written read as 0.
///
/// Cells are stored in a dense vector starting at address 0. A write more
/// than [`MAX_DENSE_GROWTH`] cells past its end goes to a sparse map instead,
/// so far addresses do not allocate the whole range before them. Sparse
/// cells move to the vector once it grows over them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Memory {
    cells: Vec<Word>,
    sparse: BTreeMap<Address, Word>,
    registers: Registers,
}

impl Memory {
    /// Create a memory holding the given program image, with both registers
    /// set to 0
    pub fn new(image: impl Into<Vec<Word>>) -> Self {
        Self {
            cells: image.into(),
            sparse: BTreeMap::new(),
            registers: Registers::default(),
        }
    }

    /// Convert a word to an effective address
    ///
    /// # Errors
    ///
    /// It fails if the word is negative.
    pub fn address(word: Word) -> Result<Address, MemoryError> {
        Address::try_from(word).map_err(|_e| MemoryError::InvalidAddress(word))
    }

    /// Get the value of a cell
    #[must_use]
    pub fn read(&self, address: Address) -> Word {
        match self.cells.get(address) {
            Some(&value) => value,
            None => self.sparse.get(&address).copied().unwrap_or_default(),
        }
    }

    /// Set the value of a cell, growing the memory if needed
    pub fn write(&mut self, address: Address, value: Word) {
        if address < self.cells.len() {
            self.cells[address] = value;
        } else if address - self.cells.len() < MAX_DENSE_GROWTH {
            self.grow(address + 1);
            self.cells[address] = value;
        } else {
            self.sparse.insert(address, value);
        }
    }

    /// Extend the dense part to `len` cells, taking over the sparse cells it
    /// now covers
    fn grow(&mut self, len: Address) {
        self.cells.resize(len, 0);
        let rest = self.sparse.split_off(&len);
        for (address, value) in std::mem::replace(&mut self.sparse, rest) {
            self.cells[address] = value;
        }
    }

    /// Move the program counter to the next cell
    pub fn advance(&mut self) {
        self.registers.pc += 1;
    }

    /// Move the program counter to an arbitrary cell
    pub fn set_pointer(&mut self, address: Address) {
        self.registers.pc = address;
    }

    #[must_use]
    pub fn pointer(&self) -> Address {
        self.registers.pc
    }

    #[must_use]
    pub fn relative_base(&self) -> Word {
        self.registers.rb
    }

    /// Add a value to the relative base.
    ///
    /// Returns the new relative base, or `None` if it overflowed, in which
    /// case the register is left untouched.
    pub fn adjust_relative_base(&mut self, delta: Word) -> Option<Word> {
        self.registers.rb = self.registers.rb.checked_add(delta)?;
        Some(self.registers.rb)
    }

    #[must_use]
    pub fn registers(&self) -> &Registers {
        &self.registers
    }

    /// Number of cells in the dense part of the memory
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty() && self.sparse.is_empty()
    }

    /// The dense part of the memory, address 0 first
    #[must_use]
    pub fn cells(&self) -> &[Word] {
        &self.cells
    }

    /// Cells written far past the dense part, by increasing address
    pub fn sparse_cells(&self) -> impl Iterator<Item = (Address, Word)> + '_ {
        self.sparse.iter().map(|(&address, &value)| (address, value))
    }

    /// Copy the dense part of the memory, address 0 first. Sparse cells are
    /// left out, use [`Memory::sparse_cells`] to get them.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Word> {
        self.cells.clone()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn read_past_end_test() {
        let memory = Memory::new([1, 2, 3]);
        assert_eq!(memory.read(2), 3);
        assert_eq!(memory.read(3), 0);
        assert_eq!(memory.read(10_000), 0);
        // Reading does not grow the memory
        assert_eq!(memory.len(), 3);
    }

    #[test]
    fn write_grows_test() {
        let mut memory = Memory::new([1, 2, 3]);
        memory.write(1, 20);
        assert_eq!(memory.cells(), &[1, 20, 3]);

        memory.write(6, 7);
        assert_eq!(memory.snapshot(), vec![1, 20, 3, 0, 0, 0, 7]);
        assert_eq!(memory.read(6), 7);
        assert_eq!(memory.read(4), 0);
    }

    #[test]
    fn far_write_test() {
        let far = MAX_DENSE_GROWTH + 10;
        let mut memory = Memory::new([1]);
        memory.write(far, 5);
        assert_eq!(memory.len(), 1);
        assert_eq!(memory.read(far), 5);
        assert_eq!(memory.sparse_cells().collect::<Vec<_>>(), vec![(far, 5)]);

        // Close enough to the end, the dense part grows but does not reach the sparse cell yet
        memory.write(MAX_DENSE_GROWTH, 3);
        assert_eq!(memory.len(), MAX_DENSE_GROWTH + 1);
        assert_eq!(memory.sparse_cells().count(), 1);

        // Growing over it moves it in the dense part
        memory.write(far + 1, 6);
        assert_eq!(memory.len(), far + 2);
        assert_eq!(memory.sparse_cells().count(), 0);
        assert_eq!(&memory.cells()[far..], &[5, 6]);
        assert_eq!(memory.read(MAX_DENSE_GROWTH), 3);

        let mut memory = Memory::default();
        memory.write(1_000_000_000_000_000_000, -1);
        assert!(!memory.is_empty());
        assert_eq!(memory.read(1_000_000_000_000_000_000), -1);
        assert_eq!(memory.read(999_999_999_999_999_999), 0);
        assert!(memory.snapshot().is_empty());
    }

    #[test]
    fn address_test() {
        assert_eq!(Memory::address(0), Ok(0));
        assert_eq!(Memory::address(1985), Ok(1985));
        assert_eq!(Memory::address(-1), Err(MemoryError::InvalidAddress(-1)));
    }

    #[test]
    fn registers_test() {
        let mut memory = Memory::default();
        assert!(memory.is_empty());
        assert_eq!(memory.pointer(), 0);
        assert_eq!(memory.relative_base(), 0);

        memory.advance();
        memory.advance();
        assert_eq!(memory.pointer(), 2);

        memory.set_pointer(42);
        assert_eq!(memory.pointer(), 42);

        assert_eq!(memory.adjust_relative_base(19), Some(19));
        assert_eq!(memory.adjust_relative_base(-20), Some(-1));
        assert_eq!(memory.adjust_relative_base(Word::MIN), None);
        assert_eq!(memory.registers(), &Registers { pc: 42, rb: -1 });
    }
}
