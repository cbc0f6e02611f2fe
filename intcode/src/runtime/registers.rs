use crate::constants as C;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Registers {
    /// Program counter
    pub pc: C::Address,

    /// Relative base, used by relative mode parameters
    pub rb: C::Word,
}

impl std::fmt::Display for Registers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "%pc = {} | %rb = {}", self.pc, self.rb)
    }
}
