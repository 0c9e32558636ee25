// File: src/ast.rs
//
// Parse-tree node definitions for the minipy language.
// The parser flattens the grammar's precedence chain into typed nodes:
// assignment targets are plain names, comparison chains keep their
// operand list so middle operands can be evaluated exactly once.

use crate::bigint::BigInt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
}

/// One piece of an f-string: literal text or a `{...}` expression list.
#[derive(Debug, Clone)]
pub enum FStringPart {
    Text(String),
    Exprs(Vec<Expr>),
}

/// A call argument, keyword name taken syntactically when present.
#[derive(Debug, Clone)]
pub struct Arg {
    pub name: Option<String>,
    pub value: Expr,
}

/// A function parameter with an optional default expression.
/// Parameters without defaults precede those with defaults.
#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub default: Option<Expr>,
}

#[derive(Debug, Clone)]
pub enum Expr {
    Name(String),
    Int(BigInt),
    Float(f64),
    Str(String),
    FString(Vec<FStringPart>),
    NoneLiteral,
    Bool(bool),
    UnaryNeg(Box<Expr>),
    Not(Box<Expr>),
    BinaryOp {
        left: Box<Expr>,
        op: BinOp,
        right: Box<Expr>,
    },
    /// Short-circuit `or` / `and` over two or more operands.
    Or(Vec<Expr>),
    And(Vec<Expr>),
    /// `first op1 b op2 c ...`; `rest` is never empty (the parser collapses
    /// a bare arith_expr to its own node).
    Compare {
        first: Box<Expr>,
        rest: Vec<(CmpOp, Expr)>,
    },
    /// Names either a builtin or an entry in the function table.
    Call {
        name: String,
        args: Vec<Arg>,
    },
}

#[derive(Debug, Clone)]
pub enum Stmt {
    /// Evaluate for effect and discard the result.
    Expr(Expr),
    /// `a = b = ... = value`; targets assigned left to right.
    Assign {
        targets: Vec<String>,
        value: Expr,
    },
    /// `name op= value`.
    AugAssign {
        target: String,
        op: BinOp,
        value: Expr,
    },
    /// `if`/`elif` arms in order, plus an optional `else` suite.
    If {
        branches: Vec<(Expr, Vec<Stmt>)>,
        else_body: Option<Vec<Stmt>>,
    },
    While {
        test: Expr,
        body: Vec<Stmt>,
    },
    FuncDef {
        name: String,
        params: Vec<Param>,
        body: Vec<Stmt>,
    },
    Break,
    Continue,
    Return(Option<Expr>),
}
