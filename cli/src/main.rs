use std::io::IsTerminal;
use std::process::exit;

use clap::{ArgAction, ArgGroup, Parser};
use tracing::error;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::prelude::*;

mod commands;

use crate::commands::Subcommand;

#[derive(Parser)]
#[clap(version, about, group = ArgGroup::new("format"))]
struct Opt {
    /// Increase the level of verbosity. Can be used multiple times.
    #[clap(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Force colored output. Default is to check if the output is a tty
    #[clap(short = 'c', long, global = true, group = "format")]
    color: bool,

    /// Force non-colored output. Default is to check if the output is a tty
    #[clap(short = 'C', long, global = true, group = "format")]
    no_color: bool,

    /// Use JSON output for log messages
    #[clap(short, long, global = true, group = "format")]
    json: bool,

    #[clap(subcommand)]
    command: Subcommand,
}

impl Opt {
    const fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "intcode=debug,intcode_cli=debug,info",
            2 => "intcode=trace,intcode_cli=trace,info",
            3..=u8::MAX => "trace",
        }
    }

    fn should_use_colors(&self) -> bool {
        if self.color {
            true
        } else if self.no_color {
            false
        } else {
            std::io::stderr().is_terminal()
        }
    }

    fn filter_layer(&self) -> EnvFilter {
        // Parse log level from env
        EnvFilter::try_from_default_env()
            // or infer from args
            .unwrap_or_else(|_| EnvFilter::new(self.log_filter()))
    }
}

fn main() {
    // First, parse the arguments
    let opt = Opt::parse();

    // Then, setup the tracing formatter for logging and instrumentation. Logs
    // go to stderr, stdout is reserved for the program output.
    let registry = tracing_subscriber::Registry::default().with(opt.filter_layer());

    if opt.json {
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr);
        registry.with(json_layer).init();
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .without_time()
            .with_ansi(opt.should_use_colors())
            .with_target(false)
            .with_writer(std::io::stderr);
        registry.with(fmt_layer).init();
    }

    // And run the command
    let res = opt.command.exec();
    if let Err(e) = res {
        error!("{}", e);
        exit(1);
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_test() {
        Opt::command().debug_assert();
    }

    #[test]
    fn verbosity_test() {
        let args = ["intcode", "run", "day9.txt", "-i", "1,-2", "-i", "-3", "-vv"];
        let opt = Opt::try_parse_from(args).unwrap();
        assert_eq!(opt.verbose, 2);
        assert_eq!(opt.log_filter(), "intcode=trace,intcode_cli=trace,info");

        let opt = Opt::try_parse_from(["intcode", "disasm", "day9.txt"]).unwrap();
        assert_eq!(opt.log_filter(), "info");
    }

    #[test]
    fn format_group_test() {
        // Colors and JSON output are mutually exclusive
        assert!(Opt::try_parse_from(["intcode", "-j", "-c", "disasm", "day9.txt"]).is_err());
        assert!(Opt::try_parse_from(["intcode", "-C", "disasm", "day9.txt"]).is_ok());
    }
}
