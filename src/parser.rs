// File: src/parser.rs
//
// Recursive-descent parser for the minipy language.
// Consumes the token stream produced by the lexer and builds the typed
// parse tree defined in ast.rs. The grammar follows the usual layering:
//
//   file_input := stmt*
//   stmt       := simple line (small_stmt (';' small_stmt)* NEWLINE)
//               | if_stmt | while_stmt | funcdef
//   suite      := simple line | NEWLINE INDENT stmt+ DEDENT
//   test       := or_test ('or' ...)  ->  and_test  ->  not_test
//               -> comparison -> arith_expr -> term -> factor -> atom
//
// Assignment targets are flattened to plain names here, so the evaluator
// never has to dig through precedence nodes to find one.

use crate::ast::{Arg, BinOp, CmpOp, Expr, FStringPart, Param, Stmt};
use crate::bigint::BigInt;
use crate::errors::{InterpError, SourceLocation};
use crate::lexer::{self, FStringPiece, Token, TokenKind};
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, pos: 0 }
    }

    fn peek(&self) -> &TokenKind {
        self.tokens.get(self.pos).map(|t| &t.kind).unwrap_or(&TokenKind::Eof)
    }

    fn location(&self) -> SourceLocation {
        self.tokens
            .get(self.pos)
            .map(|t| SourceLocation::new(t.line, t.column))
            .unwrap_or_else(SourceLocation::unknown)
    }

    fn advance(&mut self) -> TokenKind {
        let kind = self.tokens.get(self.pos).map(|t| t.kind.clone()).unwrap_or(TokenKind::Eof);
        self.pos += 1;
        kind
    }

    fn error(&self, message: impl Into<String>) -> Box<InterpError> {
        InterpError::syntax_error(message.into(), self.location())
    }

    fn eat_punct(&mut self, c: char) -> bool {
        if *self.peek() == TokenKind::Punctuation(c) {
            self.advance();
            return true;
        }
        false
    }

    fn expect_punct(&mut self, c: char) -> Result<(), Box<InterpError>> {
        if self.eat_punct(c) {
            Ok(())
        } else {
            Err(self.error(format!("expected '{}'", c)))
        }
    }

    fn eat_keyword(&mut self, word: &str) -> bool {
        if matches!(self.peek(), TokenKind::Keyword(k) if k == word) {
            self.advance();
            return true;
        }
        false
    }

    fn eat_operator(&mut self, op: &str) -> bool {
        if matches!(self.peek(), TokenKind::Operator(o) if o == op) {
            self.advance();
            return true;
        }
        false
    }

    fn expect_newline(&mut self) -> Result<(), Box<InterpError>> {
        match self.peek() {
            TokenKind::Newline => {
                self.advance();
                Ok(())
            }
            TokenKind::Eof => Ok(()),
            _ => Err(self.error("expected end of line")),
        }
    }

    /// Parses a whole program: statements until end of input.
    pub fn parse(&mut self) -> Result<Vec<Stmt>, Box<InterpError>> {
        let mut stmts = Vec::new();
        while *self.peek() != TokenKind::Eof {
            if *self.peek() == TokenKind::Newline {
                self.advance();
                continue;
            }
            self.parse_stmt(&mut stmts)?;
        }
        Ok(stmts)
    }

    /// Parses one statement, which for a simple line may contribute several
    /// small statements separated by ';'.
    fn parse_stmt(&mut self, out: &mut Vec<Stmt>) -> Result<(), Box<InterpError>> {
        match self.peek() {
            TokenKind::Keyword(k) if k == "if" => {
                let stmt = self.parse_if()?;
                out.push(stmt);
                Ok(())
            }
            TokenKind::Keyword(k) if k == "while" => {
                let stmt = self.parse_while()?;
                out.push(stmt);
                Ok(())
            }
            TokenKind::Keyword(k) if k == "def" => {
                let stmt = self.parse_funcdef()?;
                out.push(stmt);
                Ok(())
            }
            _ => self.parse_simple_line(out),
        }
    }

    fn parse_simple_line(&mut self, out: &mut Vec<Stmt>) -> Result<(), Box<InterpError>> {
        loop {
            if let Some(stmt) = self.parse_small_stmt()? {
                out.push(stmt);
            }
            if self.eat_punct(';') {
                // A trailing ';' may close the line.
                if matches!(self.peek(), TokenKind::Newline | TokenKind::Eof) {
                    break;
                }
                continue;
            }
            break;
        }
        self.expect_newline()
    }

    /// expr_stmt or flow_stmt. Returns None for shape violations that the
    /// language treats as no-ops (an augmented assignment to a non-name).
    fn parse_small_stmt(&mut self) -> Result<Option<Stmt>, Box<InterpError>> {
        if self.eat_keyword("break") {
            return Ok(Some(Stmt::Break));
        }
        if self.eat_keyword("continue") {
            return Ok(Some(Stmt::Continue));
        }
        if self.eat_keyword("return") {
            if matches!(self.peek(), TokenKind::Newline | TokenKind::Eof)
                || *self.peek() == TokenKind::Punctuation(';')
            {
                return Ok(Some(Stmt::Return(None)));
            }
            let mut exprs = self.parse_testlist()?;
            return Ok(Some(Stmt::Return(Some(exprs.remove(0)))));
        }

        let first = self.parse_testlist()?;

        if let TokenKind::Operator(op) = self.peek() {
            if let Some(binop) = augassign_op(op) {
                self.advance();
                let mut rhs = self.parse_testlist()?;
                let value = rhs.remove(0);
                // Only a plain name can be augmented; anything else is a no-op.
                return match single_name(&first) {
                    Some(target) => Ok(Some(Stmt::AugAssign { target, op: binop, value })),
                    None => Ok(None),
                };
            }
        }

        if matches!(self.peek(), TokenKind::Operator(o) if o == "=") {
            // Chained assignment: every testlist before the last is a target
            // list, the last is the value.
            let mut lists = vec![first];
            while self.eat_operator("=") {
                lists.push(self.parse_testlist()?);
            }
            let mut value_list = lists.pop().unwrap();
            let value = value_list.remove(0);
            let targets = lists.iter().filter_map(single_name).collect();
            return Ok(Some(Stmt::Assign { targets, value }));
        }

        let mut exprs = first;
        Ok(Some(Stmt::Expr(exprs.remove(0))))
    }

    fn parse_if(&mut self) -> Result<Stmt, Box<InterpError>> {
        self.advance(); // if
        let mut branches = Vec::new();
        let test = self.parse_test()?;
        self.expect_punct(':')?;
        branches.push((test, self.parse_suite()?));

        let mut else_body = None;
        loop {
            if self.eat_keyword("elif") {
                let test = self.parse_test()?;
                self.expect_punct(':')?;
                branches.push((test, self.parse_suite()?));
            } else if self.eat_keyword("else") {
                self.expect_punct(':')?;
                else_body = Some(self.parse_suite()?);
                break;
            } else {
                break;
            }
        }
        Ok(Stmt::If { branches, else_body })
    }

    fn parse_while(&mut self) -> Result<Stmt, Box<InterpError>> {
        self.advance(); // while
        let test = self.parse_test()?;
        self.expect_punct(':')?;
        let body = self.parse_suite()?;
        Ok(Stmt::While { test, body })
    }

    fn parse_funcdef(&mut self) -> Result<Stmt, Box<InterpError>> {
        self.advance(); // def
        let name = match self.advance() {
            TokenKind::Identifier(n) => n,
            _ => return Err(self.error("expected function name after 'def'")),
        };
        self.expect_punct('(')?;
        let mut params = Vec::new();
        let mut seen_default = false;
        while let TokenKind::Identifier(p) = self.peek() {
            let p = p.clone();
            self.advance();
            let default = if self.eat_operator("=") {
                seen_default = true;
                Some(self.parse_test()?)
            } else {
                if seen_default {
                    return Err(self.error("parameter without a default follows one with a default"));
                }
                None
            };
            params.push(Param { name: p, default });
            if !self.eat_punct(',') {
                break;
            }
        }
        self.expect_punct(')')?;
        self.expect_punct(':')?;
        let body = self.parse_suite()?;
        Ok(Stmt::FuncDef { name, params, body })
    }

    /// A suite is either the rest of the current line or an indented block.
    fn parse_suite(&mut self) -> Result<Vec<Stmt>, Box<InterpError>> {
        let mut body = Vec::new();
        if *self.peek() == TokenKind::Newline {
            self.advance();
            if *self.peek() != TokenKind::Indent {
                return Err(self.error("expected an indented block"));
            }
            self.advance();
            while *self.peek() != TokenKind::Dedent {
                if *self.peek() == TokenKind::Newline {
                    self.advance();
                    continue;
                }
                if *self.peek() == TokenKind::Eof {
                    return Err(self.error("unexpected end of input inside a block"));
                }
                self.parse_stmt(&mut body)?;
            }
            self.advance(); // Dedent
        } else {
            self.parse_simple_line(&mut body)?;
        }
        Ok(body)
    }

    /// testlist := test (',' test)* [',']
    fn parse_testlist(&mut self) -> Result<Vec<Expr>, Box<InterpError>> {
        let mut exprs = vec![self.parse_test()?];
        while self.eat_punct(',') {
            if matches!(
                self.peek(),
                TokenKind::Newline
                    | TokenKind::Eof
                    | TokenKind::Punctuation(';')
                    | TokenKind::Punctuation(')')
                    | TokenKind::Punctuation(':')
            ) {
                break;
            }
            exprs.push(self.parse_test()?);
        }
        Ok(exprs)
    }

    fn parse_test(&mut self) -> Result<Expr, Box<InterpError>> {
        self.parse_or_test()
    }

    fn parse_or_test(&mut self) -> Result<Expr, Box<InterpError>> {
        let first = self.parse_and_test()?;
        if !matches!(self.peek(), TokenKind::Keyword(k) if k == "or") {
            return Ok(first);
        }
        let mut operands = vec![first];
        while self.eat_keyword("or") {
            operands.push(self.parse_and_test()?);
        }
        Ok(Expr::Or(operands))
    }

    fn parse_and_test(&mut self) -> Result<Expr, Box<InterpError>> {
        let first = self.parse_not_test()?;
        if !matches!(self.peek(), TokenKind::Keyword(k) if k == "and") {
            return Ok(first);
        }
        let mut operands = vec![first];
        while self.eat_keyword("and") {
            operands.push(self.parse_not_test()?);
        }
        Ok(Expr::And(operands))
    }

    fn parse_not_test(&mut self) -> Result<Expr, Box<InterpError>> {
        if self.eat_keyword("not") {
            let operand = self.parse_not_test()?;
            return Ok(Expr::Not(Box::new(operand)));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expr, Box<InterpError>> {
        let first = self.parse_arith_expr()?;
        let mut rest = Vec::new();
        while let Some(op) = comparison_op(self.peek()) {
            self.advance();
            rest.push((op, self.parse_arith_expr()?));
        }
        if rest.is_empty() {
            Ok(first)
        } else {
            Ok(Expr::Compare { first: Box::new(first), rest })
        }
    }

    fn parse_arith_expr(&mut self) -> Result<Expr, Box<InterpError>> {
        let mut left = self.parse_term()?;
        loop {
            let op = match self.peek() {
                TokenKind::Operator(o) if o == "+" => BinOp::Add,
                TokenKind::Operator(o) if o == "-" => BinOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_term()?;
            left = Expr::BinaryOp { left: Box::new(left), op, right: Box::new(right) };
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> Result<Expr, Box<InterpError>> {
        let mut left = self.parse_factor()?;
        loop {
            let op = match self.peek() {
                TokenKind::Operator(o) if o == "*" => BinOp::Mul,
                TokenKind::Operator(o) if o == "/" => BinOp::Div,
                TokenKind::Operator(o) if o == "//" => BinOp::FloorDiv,
                TokenKind::Operator(o) if o == "%" => BinOp::Mod,
                _ => break,
            };
            self.advance();
            let right = self.parse_factor()?;
            left = Expr::BinaryOp { left: Box::new(left), op, right: Box::new(right) };
        }
        Ok(left)
    }

    fn parse_factor(&mut self) -> Result<Expr, Box<InterpError>> {
        if self.eat_operator("-") {
            let operand = self.parse_factor()?;
            return Ok(Expr::UnaryNeg(Box::new(operand)));
        }
        if self.eat_operator("+") {
            // Unary plus leaves the operand unchanged.
            return self.parse_factor();
        }
        self.parse_atom_expr()
    }

    /// atom, optionally followed by a call argument list when the atom is a
    /// plain name.
    fn parse_atom_expr(&mut self) -> Result<Expr, Box<InterpError>> {
        let atom = self.parse_atom()?;
        if let Expr::Name(name) = &atom {
            if *self.peek() == TokenKind::Punctuation('(') {
                self.advance();
                let args = self.parse_arglist()?;
                self.expect_punct(')')?;
                return Ok(Expr::Call { name: name.clone(), args });
            }
        }
        Ok(atom)
    }

    fn parse_arglist(&mut self) -> Result<Vec<Arg>, Box<InterpError>> {
        let mut args = Vec::new();
        if *self.peek() == TokenKind::Punctuation(')') {
            return Ok(args);
        }
        loop {
            let expr = self.parse_test()?;
            // NAME '=' test is a keyword argument; the name is syntactic.
            if let Expr::Name(name) = &expr {
                if self.eat_operator("=") {
                    let value = self.parse_test()?;
                    args.push(Arg { name: Some(name.clone()), value });
                    if !self.eat_punct(',') {
                        break;
                    }
                    continue;
                }
            }
            args.push(Arg { name: None, value: expr });
            if !self.eat_punct(',') {
                break;
            }
        }
        Ok(args)
    }

    fn parse_atom(&mut self) -> Result<Expr, Box<InterpError>> {
        match self.peek().clone() {
            TokenKind::Identifier(name) => {
                self.advance();
                Ok(Expr::Name(name))
            }
            TokenKind::Number(lexeme) => {
                self.advance();
                if lexeme.contains('.') {
                    Ok(Expr::Float(lexeme.parse().unwrap_or(0.0)))
                } else {
                    Ok(Expr::Int(BigInt::parse(&lexeme)))
                }
            }
            TokenKind::Str(first) => {
                self.advance();
                // Adjacent string literals concatenate.
                let mut text = first;
                while let TokenKind::Str(next) = self.peek() {
                    text.push_str(next);
                    self.advance();
                }
                Ok(Expr::Str(text))
            }
            TokenKind::FString(pieces) => {
                self.advance();
                let mut parts = Vec::new();
                for piece in pieces {
                    match piece {
                        FStringPiece::Text(text) => parts.push(FStringPart::Text(text)),
                        FStringPiece::Expr(source) => {
                            parts.push(FStringPart::Exprs(parse_embedded_exprs(&source)?));
                        }
                    }
                }
                Ok(Expr::FString(parts))
            }
            TokenKind::Keyword(k) if k == "None" => {
                self.advance();
                Ok(Expr::NoneLiteral)
            }
            TokenKind::Keyword(k) if k == "True" => {
                self.advance();
                Ok(Expr::Bool(true))
            }
            TokenKind::Keyword(k) if k == "False" => {
                self.advance();
                Ok(Expr::Bool(false))
            }
            TokenKind::Punctuation('(') => {
                self.advance();
                let inner = self.parse_test()?;
                self.expect_punct(')')?;
                Ok(inner)
            }
            other => Err(self.error(format!("unexpected token {:?}", other))),
        }
    }

    // --- SCRIPT TEST RUNNER ---

    /// Runs every `.py` script in the given directory and compares its
    /// captured output against the sibling `.out` snapshot. With `update`,
    /// snapshots are rewritten from the actual output.
    pub fn run_all_tests(test_dir: &Path, update_snapshots: bool) {
        let Ok(entries) = fs::read_dir(test_dir) else {
            eprintln!("[!] Failed to read script directory: {}", test_dir.display());
            return;
        };

        let mut passed = 0;
        let mut total = 0;

        let mut paths: Vec<_> = entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.extension().map(|e| e == "py").unwrap_or(false))
            .collect();
        paths.sort();

        for path in paths {
            total += 1;
            let content = fs::read_to_string(&path).unwrap_or_default();
            let expected_path = path.with_extension("out");

            let start = Instant::now();
            let buffer = Arc::new(Mutex::new(Vec::new()));
            let actual = match run_captured(&content, buffer.clone()) {
                Ok(()) => {
                    let lock = buffer.lock().unwrap();
                    String::from_utf8_lossy(&lock).trim_end().to_string()
                }
                Err(err) => format!("error: {}", err.kind),
            };

            let expected = if expected_path.exists() && !update_snapshots {
                fs::read_to_string(&expected_path).unwrap_or_default().trim_end().to_string()
            } else {
                fs::write(&expected_path, &actual).ok();
                actual.clone()
            };

            if actual == expected {
                println!("[+] {} ({:.2?})", path.display(), start.elapsed());
                passed += 1;
            } else {
                println!("[x] {}", path.display());
                println!("Expected:\n{}\nGot:\n{}\n", expected, actual);
            }
        }

        println!("\nPassed {}/{} scripts", passed, total);
    }
}

/// Lexes and parses the raw source of one f-string interpolation into its
/// expression list.
fn parse_embedded_exprs(source: &str) -> Result<Vec<Expr>, Box<InterpError>> {
    let tokens = lexer::tokenize(source)?;
    let mut parser = Parser::new(tokens);
    let exprs = parser.parse_testlist()?;
    parser.expect_newline()?;
    Ok(exprs)
}

/// Parses and evaluates a program with print output captured into `buffer`.
fn run_captured(
    source: &str,
    buffer: Arc<Mutex<Vec<u8>>>,
) -> Result<(), Box<InterpError>> {
    let tokens = lexer::tokenize(source)?;
    let mut parser = Parser::new(tokens);
    let program = parser.parse()?;
    let mut interp = crate::interpreter::Interpreter::new();
    interp.set_output(buffer);
    interp.run(&program)
}

fn augassign_op(op: &str) -> Option<BinOp> {
    match op {
        "+=" => Some(BinOp::Add),
        "-=" => Some(BinOp::Sub),
        "*=" => Some(BinOp::Mul),
        "/=" => Some(BinOp::Div),
        "//=" => Some(BinOp::FloorDiv),
        "%=" => Some(BinOp::Mod),
        _ => None,
    }
}

fn comparison_op(kind: &TokenKind) -> Option<CmpOp> {
    let TokenKind::Operator(op) = kind else {
        return None;
    };
    match op.as_str() {
        "<" => Some(CmpOp::Lt),
        ">" => Some(CmpOp::Gt),
        "<=" => Some(CmpOp::Le),
        ">=" => Some(CmpOp::Ge),
        "==" => Some(CmpOp::Eq),
        "!=" => Some(CmpOp::Ne),
        _ => None,
    }
}

/// Extracts the plain name from a one-element target list, if that is what
/// it is.
fn single_name(exprs: &Vec<Expr>) -> Option<String> {
    match exprs.as_slice() {
        [Expr::Name(name)] => Some(name.clone()),
        _ => None,
    }
}
