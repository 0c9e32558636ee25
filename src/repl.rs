// File: src/repl.rs
//
// Interactive REPL (Read-Eval-Print Loop) for the minipy interpreter.
// Provides an interactive shell with:
// - Multi-line input for indented blocks (a line ending in ':' opens a
//   block, a blank line closes it)
// - Command history with line editing via rustyline
// - Special commands (:help, :vars, :quit)
// - Persistent interpreter state across inputs
// - Echoing of top-level expression values

use crate::interpreter::{Interpreter, Value};
use crate::lexer;
use crate::parser::Parser;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// REPL session that maintains interpreter state and handles user interaction
pub struct Repl {
    interpreter: Interpreter,
    editor: DefaultEditor,
}

impl Repl {
    /// Creates a new REPL session with a fresh interpreter
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let editor = DefaultEditor::new()?;
        Ok(Repl { interpreter: Interpreter::new(), editor })
    }

    /// Starts the REPL loop
    pub fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        println!("{}", "minipy interactive shell".bright_cyan());
        println!("Type {} for commands, {} to leave.", ":help".bright_yellow(), ":quit".bright_yellow());

        let mut buffer = String::new();

        loop {
            let prompt = if buffer.is_empty() {
                ">>> ".bright_green().to_string()
            } else {
                "... ".bright_blue().to_string()
            };

            match self.editor.readline(&prompt) {
                Ok(line) => {
                    let _ = self.editor.add_history_entry(line.as_str());

                    if buffer.is_empty() && line.trim_start().starts_with(':') {
                        if self.handle_command(line.trim()) {
                            continue;
                        }
                        break;
                    }

                    buffer.push_str(&line);
                    buffer.push('\n');

                    if input_complete(&buffer) {
                        self.eval_input(&buffer);
                        buffer.clear();
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("KeyboardInterrupt");
                    buffer.clear();
                }
                Err(ReadlineError::Eof) => break,
                Err(err) => {
                    eprintln!("{} {}", "Error:".bright_red(), err);
                    break;
                }
            }
        }

        Ok(())
    }

    /// Handles special REPL commands starting with ':'.
    /// Returns true to continue the REPL, false to quit.
    fn handle_command(&mut self, cmd: &str) -> bool {
        match cmd {
            ":help" | ":h" => {
                println!("  :help   show this help");
                println!("  :vars   list global variables");
                println!("  :quit   leave the shell");
                println!("End a block statement with a blank line.");
                true
            }
            ":vars" => {
                let globals = self.interpreter.env.globals();
                let mut names: Vec<_> = globals.keys().collect();
                names.sort();
                for name in names {
                    println!("  {} = {}", name.bright_yellow(), globals[name]);
                }
                true
            }
            ":quit" | ":q" | ":exit" => false,
            other => {
                println!("Unknown command {} (try :help)", other.bright_yellow());
                true
            }
        }
    }

    /// Lexes, parses, and evaluates one accumulated input, printing either
    /// the value of a lone expression or a structured error.
    fn eval_input(&mut self, source: &str) {
        let program = match lexer::tokenize(source).and_then(|tokens| Parser::new(tokens).parse()) {
            Ok(program) => program,
            Err(err) => {
                eprintln!("{}", err);
                return;
            }
        };

        match self.interpreter.eval_repl_line(&program) {
            Ok(Some(value)) if value != Value::None => println!("{}", value),
            Ok(_) => {}
            Err(err) => eprintln!("{}", err),
        }
    }
}

/// A block statement (first line ending in ':') is complete once the user
/// enters a blank line; everything else completes after one line.
fn input_complete(buffer: &str) -> bool {
    let Some(first) = buffer.lines().next() else {
        return true;
    };
    if first.trim_end().ends_with(':') {
        buffer.ends_with("\n\n")
    } else {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line_is_complete() {
        assert!(input_complete("x = 1\n"));
    }

    #[test]
    fn test_block_waits_for_blank_line() {
        assert!(!input_complete("while x:\n"));
        assert!(!input_complete("while x:\n    x -= 1\n"));
        assert!(input_complete("while x:\n    x -= 1\n\n"));
    }
}
