pub mod constants;
pub mod disassembler;
pub mod parser;
pub mod runtime;

pub use self::{disassembler::disassemble, parser::parse, runtime::Computer};
