// File: src/interpreter/mod.rs
//
// Tree-walking interpreter for the minipy language.
// Executes programs by traversing the parse tree produced by the parser.
//
// The interpreter maintains a scope stack for variables, a table of
// user-defined functions, evaluates expressions to produce values, and
// executes statements for their effects. It supports:
// - Assignment (chained and augmented) and name lookup
// - Function calls with positional, keyword, and default arguments
// - Control flow (if/elif/else, while with break/continue, return)
// - Short-circuit boolean operators and chained comparisons
// - Formatted-string interpolation
// - The built-in functions print, int, float, str, and bool

mod control_flow;
mod environment;
mod value;

pub use environment::Environment;
pub use value::Value;

use control_flow::ControlFlow;

use crate::ast::{Arg, Expr, FStringPart, Stmt};
use crate::builtins;
use crate::errors::InterpError;
use std::collections::HashMap;
use std::io::Write;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

/// A registered function: parameter order, default values captured at
/// definition time, and the body statements.
#[derive(Clone)]
struct FunctionDef {
    params: Vec<String>,
    defaults: HashMap<String, Value>,
    body: Rc<Vec<Stmt>>,
}

/// Main interpreter that executes minipy programs
pub struct Interpreter {
    pub env: Environment,
    functions: HashMap<String, FunctionDef>,
    control_flow: ControlFlow,
    return_value: Option<Value>,
    output: Option<Arc<Mutex<Vec<u8>>>>,
}

impl Interpreter {
    /// Creates a new interpreter with an empty global scope
    pub fn new() -> Self {
        Interpreter {
            env: Environment::new(),
            functions: HashMap::new(),
            control_flow: ControlFlow::None,
            return_value: None,
            output: None,
        }
    }

    /// Redirect print output into a shared buffer (used by tests and the
    /// script runner); without a buffer, output goes to stdout.
    pub fn set_output(&mut self, output: Arc<Mutex<Vec<u8>>>) {
        self.output = Some(output);
    }

    /// Evaluates a whole program over the persistent global scope.
    /// A control-flow signal that survives to the top level is a stray
    /// break/continue/return and aborts with an error.
    pub fn run(&mut self, program: &[Stmt]) -> Result<(), Box<InterpError>> {
        self.eval_stmts(program)?;
        self.take_stray_signal()
    }

    /// REPL entry point: a line holding a single expression statement
    /// evaluates to its value so the shell can echo it; anything else runs
    /// like a program fragment.
    pub fn eval_repl_line(&mut self, program: &[Stmt]) -> Result<Option<Value>, Box<InterpError>> {
        if let [Stmt::Expr(expr)] = program {
            let value = self.eval_expr(expr)?;
            self.take_stray_signal()?;
            return Ok(Some(value));
        }
        self.run(program)?;
        Ok(None)
    }

    fn take_stray_signal(&mut self) -> Result<(), Box<InterpError>> {
        match std::mem::replace(&mut self.control_flow, ControlFlow::None) {
            ControlFlow::Break => return Err(InterpError::stray_control_flow("break")),
            ControlFlow::Continue => return Err(InterpError::stray_control_flow("continue")),
            ControlFlow::None => {}
        }
        if self.return_value.take().is_some() {
            return Err(InterpError::stray_control_flow("return"));
        }
        Ok(())
    }

    /// Evaluates statements sequentially, stopping early when a
    /// break/continue/return signal is pending.
    fn eval_stmts(&mut self, stmts: &[Stmt]) -> Result<(), Box<InterpError>> {
        for stmt in stmts {
            self.eval_stmt(stmt)?;
            if self.control_flow != ControlFlow::None || self.return_value.is_some() {
                break;
            }
        }
        Ok(())
    }

    /// Helper to write a finished output line to the buffer or stdout
    fn write_output(&self, msg: &str) {
        if let Some(out) = &self.output {
            let mut buffer = out.lock().unwrap();
            let _ = writeln!(buffer, "{}", msg);
        } else {
            println!("{}", msg);
        }
    }

    /// Evaluates a single statement
    fn eval_stmt(&mut self, stmt: &Stmt) -> Result<(), Box<InterpError>> {
        match stmt {
            Stmt::Expr(expr) => {
                self.eval_expr(expr)?;
            }
            Stmt::Assign { targets, value } => {
                // The rightmost expression is evaluated once; each target
                // then receives a copy.
                let value = self.eval_expr(value)?;
                for target in targets {
                    self.env.define(target.clone(), value.clone());
                }
            }
            Stmt::AugAssign { target, op, value } => {
                let old = self.env.get(target).unwrap_or(Value::None);
                let rhs = self.eval_expr(value)?;
                let new = old.binary(*op, &rhs)?;
                self.env.define(target.clone(), new);
            }
            Stmt::If { branches, else_body } => {
                for (test, suite) in branches {
                    if self.eval_expr(test)?.truthy() {
                        return self.eval_stmts(suite);
                    }
                }
                if let Some(else_body) = else_body {
                    self.eval_stmts(else_body)?;
                }
            }
            Stmt::While { test, body } => {
                while self.eval_expr(test)?.truthy() {
                    self.eval_stmts(body)?;
                    if self.control_flow == ControlFlow::Break {
                        self.control_flow = ControlFlow::None;
                        break;
                    } else if self.control_flow == ControlFlow::Continue {
                        self.control_flow = ControlFlow::None;
                        continue;
                    }
                    if self.return_value.is_some() {
                        break;
                    }
                }
            }
            Stmt::FuncDef { name, params, body } => {
                // Defaults are evaluated once, now, in the defining scope.
                let mut defaults = HashMap::new();
                let mut param_names = Vec::with_capacity(params.len());
                for param in params {
                    if let Some(default) = &param.default {
                        defaults.insert(param.name.clone(), self.eval_expr(default)?);
                    }
                    param_names.push(param.name.clone());
                }
                // A later definition shadows an earlier one.
                self.functions.insert(
                    name.clone(),
                    FunctionDef { params: param_names, defaults, body: Rc::new(body.clone()) },
                );
            }
            Stmt::Break => {
                self.control_flow = ControlFlow::Break;
            }
            Stmt::Continue => {
                self.control_flow = ControlFlow::Continue;
            }
            Stmt::Return(expr) => {
                let value = match expr {
                    Some(expr) => self.eval_expr(expr)?,
                    None => Value::None,
                };
                self.return_value = Some(value);
            }
        }
        Ok(())
    }

    /// Evaluates an expression to a value
    fn eval_expr(&mut self, expr: &Expr) -> Result<Value, Box<InterpError>> {
        match expr {
            Expr::Name(name) => Ok(self.env.get(name).unwrap_or(Value::None)),
            Expr::Int(i) => Ok(Value::Int(i.clone())),
            Expr::Float(f) => Ok(Value::Float(*f)),
            Expr::Str(s) => Ok(Value::Str(s.clone())),
            Expr::NoneLiteral => Ok(Value::None),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::UnaryNeg(operand) => Ok(self.eval_expr(operand)?.neg()),
            Expr::Not(operand) => Ok(Value::Bool(!self.eval_expr(operand)?.truthy())),
            Expr::BinaryOp { left, op, right } => {
                let left = self.eval_expr(left)?;
                let right = self.eval_expr(right)?;
                left.binary(*op, &right)
            }
            Expr::Or(operands) => {
                // Value-preserving: the first truthy operand, or the last.
                let mut result = self.eval_expr(&operands[0])?;
                for operand in &operands[1..] {
                    if result.truthy() {
                        return Ok(result);
                    }
                    result = self.eval_expr(operand)?;
                }
                Ok(result)
            }
            Expr::And(operands) => {
                let mut result = self.eval_expr(&operands[0])?;
                for operand in &operands[1..] {
                    if !result.truthy() {
                        return Ok(result);
                    }
                    result = self.eval_expr(operand)?;
                }
                Ok(result)
            }
            Expr::Compare { first, rest } => {
                // Each middle operand is evaluated exactly once; the chain
                // short-circuits on the first false link.
                let mut left = self.eval_expr(first)?;
                for (op, right) in rest {
                    let right = self.eval_expr(right)?;
                    if !left.compare(*op, &right) {
                        return Ok(Value::Bool(false));
                    }
                    left = right;
                }
                Ok(Value::Bool(true))
            }
            Expr::FString(parts) => {
                let mut result = String::new();
                for part in parts {
                    match part {
                        FStringPart::Text(text) => result.push_str(text),
                        FStringPart::Exprs(exprs) => {
                            for (i, expr) in exprs.iter().enumerate() {
                                if i > 0 {
                                    result.push(' ');
                                }
                                let value = self.eval_expr(expr)?;
                                result.push_str(&value.to_string());
                            }
                        }
                    }
                }
                Ok(Value::Str(result))
            }
            Expr::Call { name, args } => self.eval_call(name, args),
        }
    }

    /// Dispatches a call: builtins are resolved before the user table, and
    /// an unknown name evaluates to None.
    fn eval_call(&mut self, name: &str, args: &[Arg]) -> Result<Value, Box<InterpError>> {
        if name == "print" {
            let mut line = String::new();
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    line.push(' ');
                }
                let value = self.eval_expr(&arg.value)?;
                line.push_str(&value.to_string());
            }
            self.write_output(&line);
            return Ok(Value::None);
        }

        if builtins::is_coercion(name) {
            let arg = match args.first() {
                Some(arg) => Some(self.eval_expr(&arg.value)?),
                None => None,
            };
            return Ok(builtins::coerce(name, arg));
        }

        match self.functions.get(name).cloned() {
            Some(func) => self.call_function(&func, args),
            None => Ok(Value::None),
        }
    }

    /// Calls a user-defined function:
    /// arguments are evaluated in the caller's scope in source order, a
    /// fresh scope is pushed, parameters bind positionally then by keyword
    /// then from defaults (or None), the body runs, and a pending return
    /// value becomes the call result.
    fn call_function(&mut self, func: &FunctionDef, args: &[Arg]) -> Result<Value, Box<InterpError>> {
        let mut bound: HashMap<String, Value> = HashMap::new();
        let mut positional = 0usize;
        for arg in args {
            let value = self.eval_expr(&arg.value)?;
            match &arg.name {
                Some(keyword) => {
                    bound.insert(keyword.clone(), value);
                }
                None => {
                    if let Some(param) = func.params.get(positional) {
                        bound.insert(param.clone(), value);
                    }
                    positional += 1;
                }
            }
        }

        self.env.push_scope();
        for param in &func.params {
            let value = bound
                .remove(param)
                .or_else(|| func.defaults.get(param).cloned())
                .unwrap_or(Value::None);
            self.env.define(param.clone(), value);
        }

        self.eval_stmts(&func.body)?;

        let result = self.return_value.take().unwrap_or(Value::None);
        self.env.pop_scope();

        // A break or continue that unwound past the function body has no
        // loop to catch it.
        match std::mem::replace(&mut self.control_flow, ControlFlow::None) {
            ControlFlow::None => Ok(result),
            ControlFlow::Break => Err(InterpError::stray_control_flow("break")),
            ControlFlow::Continue => Err(InterpError::stray_control_flow("continue")),
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}
