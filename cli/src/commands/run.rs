use std::io::Write;

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::{ArgAction, Parser, ValueHint};
use intcode::constants::Word;
use intcode::runtime::ProcessorError;
use intcode::Computer;
use tracing::{info, warn};

use super::load_program;

#[derive(Parser, Debug)]
pub struct RunOpt {
    /// Program file, a comma-separated list of integers
    #[clap(value_parser, value_hint = ValueHint::FilePath)]
    program: Utf8PathBuf,

    /// Values to put in the input queue. Can be used multiple times, or with
    /// comma-separated values.
    #[clap(
        short,
        long,
        value_name = "VALUE",
        value_delimiter = ',',
        allow_negative_numbers = true
    )]
    input: Vec<Word>,

    /// Stop the program after this many instructions
    #[clap(long, value_name = "STEPS")]
    max_steps: Option<u64>,

    /// Print the memory contents once the program halted
    #[clap(short, long, action = ArgAction::SetTrue)]
    memory: bool,
}

impl RunOpt {
    pub fn exec(self) -> anyhow::Result<()> {
        let program = load_program(&self.program)?;

        info!(input = ?self.input, "Running program");
        let mut computer = Computer::new(program, self.input);
        let result = match self.max_steps {
            Some(max_steps) => computer.run_for(max_steps),
            None => computer.run(),
        };

        // Whatever was output before a fault is still worth showing
        let mut stdout = std::io::stdout().lock();
        print_values(&mut stdout, computer.output(), "\n")
            .context("Could not write the program output")?;

        let memory = match result {
            Ok(memory) => memory,
            Err(ProcessorError::Exception(exception)) if exception.is_decode_error() => {
                warn!(
                    "Run `intcode disasm {}` to look at the instructions",
                    self.program
                );
                return Err(ProcessorError::Exception(exception).into());
            }
            Err(e) => return Err(e.into()),
        };

        info!(
            steps = computer.steps(),
            registers = %computer.registers(),
            "End of program"
        );

        if self.memory {
            print_values(&mut stdout, &memory, ",")
                .context("Could not write the memory contents")?;
        }

        Ok(())
    }
}

/// Write the values with the separator between them, then a newline. Fails
/// if the output was closed.
fn print_values(out: &mut impl Write, values: &[Word], separator: &str) -> std::io::Result<()> {
    let mut values = values.iter();
    if let Some(first) = values.next() {
        write!(out, "{first}")?;
        for value in values {
            write!(out, "{separator}{value}")?;
        }
        writeln!(out)?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use std::io::ErrorKind;

    use super::*;

    /// A writer whose reader went away, like a pipe into `head`
    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn print_values_test() {
        let mut out = Vec::new();
        print_values(&mut out, &[1, -2, 3], "\n").unwrap();
        print_values(&mut out, &[], "\n").unwrap();
        print_values(&mut out, &[4, 5], ",").unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "1\n-2\n3\n4,5\n");
    }

    #[test]
    fn closed_output_test() {
        let err = print_values(&mut ClosedPipe, &[42], "\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BrokenPipe);
    }
}
