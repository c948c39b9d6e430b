//! sharedlib CLI - inspect and resolve shared library configurations
//!
//! ```text
//! sharedlib check --config lib.ini
//! sharedlib show --config lib.ini --timeout-secs 30 --json
//! ```

mod commands;
mod error;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sharedlib::logging::{init_logging, LoggingConfig};

use crate::commands::{check, show};
use crate::error::CliError;

#[derive(Debug, Parser)]
#[command(name = "sharedlib", version, about = "Inspect and resolve shared library configurations")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Also write logs to this file
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Resolve a library and print its published content
    Show(show::ShowArgs),

    /// Validate a library configuration without resolving filesets
    Check(check::CheckArgs),
}

fn main() {
    let cli = Cli::parse();

    let mut logging = LoggingConfig::default().with_verbose(cli.verbose);
    if let Some(path) = &cli.log_file {
        logging = logging.with_log_file(path);
    }
    let guard = match init_logging(logging) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: {}", e);
            None
        }
    };

    let result = run(cli.command);
    drop(guard);

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Show(args) => show::run(args),
        Commands::Check(args) => check::run(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_show_with_globals() {
        let cli = Cli::try_parse_from([
            "sharedlib",
            "show",
            "--config",
            "lib.ini",
            "--timeout-secs",
            "3",
            "--json",
            "--verbose",
        ])
        .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Commands::Show(args) => {
                assert_eq!(args.config, PathBuf::from("lib.ini"));
                assert_eq!(args.timeout_secs, 3);
                assert!(args.json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_show_timeout_defaults() {
        let cli = Cli::try_parse_from(["sharedlib", "show", "-c", "lib.ini"]).unwrap();
        match cli.command {
            Commands::Show(args) => assert_eq!(args.timeout_secs, show::DEFAULT_TIMEOUT_SECS),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_log_file_before_subcommand() {
        let cli = Cli::try_parse_from([
            "sharedlib",
            "--log-file",
            "/tmp/sharedlib.log",
            "check",
            "--config",
            "lib.ini",
        ])
        .unwrap();
        assert_eq!(cli.log_file, Some(PathBuf::from("/tmp/sharedlib.log")));
        assert!(matches!(cli.command, Commands::Check(_)));
    }

    #[test]
    fn test_config_is_required() {
        assert!(Cli::try_parse_from(["sharedlib", "check"]).is_err());
    }
}
