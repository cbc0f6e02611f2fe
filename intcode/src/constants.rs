/// Type of memory cells, operands and the relative base register
pub type Word = i64;

/// Type of effective memory addresses
pub type Address = usize;

/// Maximum number of parameters an instruction takes
pub const MAX_PARAMETERS: usize = 3;

/// Largest word that can hold an instruction: two opcode digits and three mode digits
pub(crate) const MAX_INSTRUCTION: Word = 99_999;

/// Largest gap, in cells, the dense part of the memory fills with zeroes on a
/// write past its end. Writes further away are kept in a sparse map.
pub const MAX_DENSE_GROWTH: Address = 1 << 16;
