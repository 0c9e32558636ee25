// File: src/main.rs
//
// Main entry point for the minipy interpreter.
// Handles command-line argument parsing and dispatches to the appropriate
// subcommand (run, repl, or test).

use clap::{Parser as ClapParser, Subcommand};
use minipy::errors::InterpError;
use minipy::parser::Parser;
use minipy::{interpreter, lexer, repl};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

#[derive(ClapParser)]
#[command(
    name = "minipy",
    about = "minipy: an interpreter for a small Python subset",
    version = env!("CARGO_PKG_VERSION"),
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
#[command(arg_required_else_help = true)]
enum Commands {
    /// Run a minipy script file
    Run {
        /// Path to the .py file
        file: PathBuf,
    },

    /// Launch the interactive minipy shell
    Repl,

    /// Run all demo scripts and compare their output snapshots
    Test {
        /// Regenerate all .out files from the actual output
        #[arg(long)]
        update: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { file } => {
            let code = match fs::read_to_string(&file) {
                Ok(code) => code,
                Err(err) => {
                    eprintln!("Failed to read {}: {}", file.display(), err);
                    process::exit(1);
                }
            };
            if let Err(err) = run_source(&code) {
                eprintln!("{}", err);
                process::exit(1);
            }
        }

        Commands::Repl => {
            let mut repl = match repl::Repl::new() {
                Ok(repl) => repl,
                Err(err) => {
                    eprintln!("Failed to start the shell: {}", err);
                    process::exit(1);
                }
            };
            if let Err(err) = repl.run() {
                eprintln!("{}", err);
                process::exit(1);
            }
        }

        Commands::Test { update } => {
            Parser::run_all_tests(Path::new("demos"), update);
        }
    }
}

/// Lexes, parses, and evaluates one source file.
fn run_source(code: &str) -> Result<(), Box<InterpError>> {
    let tokens = lexer::tokenize(code)?;
    let mut parser = Parser::new(tokens);
    let program = parser.parse()?;
    let mut interpreter = interpreter::Interpreter::new();
    interpreter.run(&program)
}
