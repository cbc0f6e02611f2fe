use camino::Utf8PathBuf;
use clap::{Parser, ValueHint};
use intcode::disassemble;
use tracing::debug;

use super::load_program;

#[derive(Parser, Debug)]
pub struct DisasmOpt {
    /// Program file, a comma-separated list of integers
    #[clap(value_parser, value_hint = ValueHint::FilePath)]
    program: Utf8PathBuf,
}

impl DisasmOpt {
    pub fn exec(&self) -> anyhow::Result<()> {
        let program = load_program(&self.program)?;

        debug!("Disassembling program");
        let listing = disassemble(&program);
        print!("{listing}");

        Ok(())
    }
}
