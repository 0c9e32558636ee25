// File: src/errors.rs
//
// Error handling and reporting for the minipy interpreter.
// Provides structured error types with source location information
// and pretty-printed error messages.

use colored::Colorize;
use std::fmt;

/// Source location information for tracking where code appears in a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// For errors that arise after parsing, where no span survives.
    pub fn unknown() -> Self {
        Self { line: 0, column: 0 }
    }

    pub fn is_known(&self) -> bool {
        self.line != 0
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Types of errors that can occur while lexing, parsing, or evaluating
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    SyntaxError,
    IndentationError,
    DivisionByZero,
    /// break/continue outside a loop, or return outside a function,
    /// escaped the outermost statement handler.
    StrayControlFlow,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ErrorKind::SyntaxError => write!(f, "Syntax Error"),
            ErrorKind::IndentationError => write!(f, "Indentation Error"),
            ErrorKind::DivisionByZero => write!(f, "Division By Zero"),
            ErrorKind::StrayControlFlow => write!(f, "Stray Control Flow"),
        }
    }
}

/// A structured error with location information
#[derive(Debug, Clone)]
pub struct InterpError {
    pub kind: ErrorKind,
    pub message: String,
    pub location: SourceLocation,
}

impl InterpError {
    pub fn new(kind: ErrorKind, message: String, location: SourceLocation) -> Self {
        Self { kind, message, location }
    }

    pub fn syntax_error(message: String, location: SourceLocation) -> Box<Self> {
        Box::new(Self::new(ErrorKind::SyntaxError, message, location))
    }

    pub fn indentation_error(message: String, location: SourceLocation) -> Box<Self> {
        Box::new(Self::new(ErrorKind::IndentationError, message, location))
    }

    pub fn division_by_zero() -> Box<Self> {
        Box::new(Self::new(
            ErrorKind::DivisionByZero,
            "integer division or modulo by zero".to_string(),
            SourceLocation::unknown(),
        ))
    }

    pub fn stray_control_flow(what: &str) -> Box<Self> {
        Box::new(Self::new(
            ErrorKind::StrayControlFlow,
            format!("'{}' outside of any enclosing block that handles it", what),
            SourceLocation::unknown(),
        ))
    }
}

impl fmt::Display for InterpError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let kind_str = format!("{}", self.kind);
        write!(f, "{}: {}", kind_str.red().bold(), self.message.bold())?;
        if self.location.is_known() {
            write!(f, "\n{}", format!("  --> {}", self.location).bright_blue())?;
        }
        Ok(())
    }
}

impl std::error::Error for InterpError {}
