use std::process::exit;

use anyhow::Context;
use camino::Utf8Path;
use intcode::constants::Word;
use tracing::{debug, info};

mod completion;
mod disasm;
mod run;

#[derive(clap::Subcommand)]
pub enum Subcommand {
    /// Load and run a program
    Run(self::run::RunOpt),

    /// Print the instructions of a program without running it
    Disasm(self::disasm::DisasmOpt),

    /// Generate shell completions
    Completion(self::completion::CompletionOpt),
}

impl Subcommand {
    /// Run a subcommand
    pub fn exec(self) -> anyhow::Result<()> {
        match self {
            Self::Run(opt) => opt.exec(),
            Self::Disasm(opt) => opt.exec(),
            Self::Completion(opt) => opt.exec(),
        }
    }
}

/// Read and parse a program file.
///
/// Syntax errors are reported with the offending source and exit the process.
fn load_program(path: &Utf8Path) -> anyhow::Result<Vec<Word>> {
    info!(%path, "Reading program");
    let source = std::fs::read_to_string(path).with_context(|| format!("could not read {path}"))?;

    debug!("Parsing program");
    match intcode::parse(&source) {
        Ok(program) => {
            debug!(len = program.len(), "Program parsed");
            Ok(program)
        }
        Err(e) => {
            let report = miette::Report::new(e)
                .with_source_code(miette::NamedSource::new(path, source));
            eprintln!("{report:?}");
            exit(1);
        }
    }
}
