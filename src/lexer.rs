// File: src/lexer.rs
//
// Lexical analyzer (tokenizer) for the minipy language.
// Converts source text into a stream of tokens for parsing.
//
// Supports:
// - Keywords: def, return, if, elif, else, while, break, continue,
//   and, or, not, None, True, False
// - Identifiers and numeric literals (digits with an optional '.')
// - String literals with escape sequences, f-strings with {} interpolation
// - Operators: + - * / // % = += -= *= /= //= %= == != < <= > >=
// - Punctuation: ( ) , : ;
// - Indentation blocks emitted as Indent/Dedent tokens, statement
//   boundaries as Newline tokens
// - Single-line comments starting with #

use crate::errors::{InterpError, SourceLocation};
use std::iter::Peekable;
use std::str::CharIndices;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Identifier(String),
    /// Full lexeme of a numeric literal; a '.' marks it as a float.
    Number(String),
    /// Decoded string literal contents.
    Str(String),
    /// Alternating text and raw expression source from an f-string.
    FString(Vec<FStringPiece>),
    Keyword(String),
    Operator(String),
    Punctuation(char),
    Newline,
    Indent,
    Dedent,
    Eof,
}

/// Represents parts of a formatted string literal
#[derive(Debug, Clone, PartialEq)]
pub enum FStringPiece {
    /// Literal text, escapes already decoded.
    Text(String),
    /// Raw source of an expression list inside {}.
    Expr(String),
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
}

const KEYWORDS: &[&str] = &[
    "def", "return", "if", "elif", "else", "while", "break", "continue", "and", "or", "not",
    "None", "True", "False",
];

/// Tokenizes minipy source code into a vector of tokens.
///
/// Works line by line so the indentation of each logical line can be
/// compared against the current indent stack: deeper indentation emits
/// `Indent`, returning to an enclosing level emits one `Dedent` per level
/// closed. Blank lines and comment-only lines produce no tokens. Lines
/// inside an open parenthesis continue the previous logical line.
pub fn tokenize(source: &str) -> Result<Vec<Token>, Box<InterpError>> {
    let mut tokens = Vec::new();
    let mut indents: Vec<usize> = vec![0];
    let mut paren_depth: usize = 0;

    for (index, raw_line) in source.lines().enumerate() {
        let line_no = index + 1;

        if paren_depth == 0 {
            let indent = measure_indent(raw_line);
            let rest = raw_line.trim_start_matches([' ', '\t']);
            if rest.is_empty() || rest.starts_with('#') {
                continue;
            }

            if indent > *indents.last().unwrap() {
                indents.push(indent);
                tokens.push(Token { kind: TokenKind::Indent, line: line_no, column: 1 });
            } else {
                while indent < *indents.last().unwrap() {
                    indents.pop();
                    tokens.push(Token { kind: TokenKind::Dedent, line: line_no, column: 1 });
                }
                if indent != *indents.last().unwrap() {
                    return Err(InterpError::indentation_error(
                        "unindent does not match any outer indentation level".to_string(),
                        SourceLocation::new(line_no, 1),
                    ));
                }
            }
        }

        lex_line(raw_line, line_no, &mut tokens, &mut paren_depth)?;

        if paren_depth == 0 {
            tokens.push(Token {
                kind: TokenKind::Newline,
                line: line_no,
                column: raw_line.chars().count() + 1,
            });
        }
    }

    let last_line = source.lines().count() + 1;
    while indents.len() > 1 {
        indents.pop();
        tokens.push(Token { kind: TokenKind::Dedent, line: last_line, column: 1 });
    }
    tokens.push(Token { kind: TokenKind::Eof, line: last_line, column: 1 });

    Ok(tokens)
}

/// Indentation width in columns; a tab advances to the next multiple of 8.
fn measure_indent(line: &str) -> usize {
    let mut width = 0;
    for c in line.chars() {
        match c {
            ' ' => width += 1,
            '\t' => width = width / 8 * 8 + 8,
            _ => break,
        }
    }
    width
}

/// Lexes the tokens of one physical line, updating the open-paren depth.
fn lex_line(
    line: &str,
    line_no: usize,
    tokens: &mut Vec<Token>,
    paren_depth: &mut usize,
) -> Result<(), Box<InterpError>> {
    let mut chars = line.char_indices().peekable();

    while let Some(&(pos, c)) = chars.peek() {
        let column = pos + 1;
        match c {
            ' ' | '\t' => {
                chars.next();
            }
            '#' => break,
            '\'' | '"' => {
                chars.next();
                let text = lex_string_body(&mut chars, c, line_no, column)?;
                tokens.push(Token { kind: TokenKind::Str(text), line: line_no, column });
            }
            '0'..='9' => {
                let mut lexeme = String::new();
                let mut has_decimal = false;
                while let Some(&(_, ch)) = chars.peek() {
                    if ch.is_ascii_digit() {
                        lexeme.push(ch);
                        chars.next();
                    } else if ch == '.' && !has_decimal {
                        has_decimal = true;
                        lexeme.push(ch);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token { kind: TokenKind::Number(lexeme), line: line_no, column });
            }
            'a'..='z' | 'A'..='Z' | '_' => {
                let mut ident = String::new();
                while let Some(&(_, ch)) = chars.peek() {
                    if ch.is_alphanumeric() || ch == '_' {
                        ident.push(ch);
                        chars.next();
                    } else {
                        break;
                    }
                }

                // An f prefix immediately followed by a quote starts an f-string.
                if (ident == "f" || ident == "F")
                    && matches!(chars.peek(), Some(&(_, '\'')) | Some(&(_, '"')))
                {
                    let (_, quote) = chars.next().unwrap();
                    let pieces = lex_fstring_body(&mut chars, quote, line_no, column)?;
                    tokens.push(Token { kind: TokenKind::FString(pieces), line: line_no, column });
                    continue;
                }

                let kind = if KEYWORDS.contains(&ident.as_str()) {
                    TokenKind::Keyword(ident)
                } else {
                    TokenKind::Identifier(ident)
                };
                tokens.push(Token { kind, line: line_no, column });
            }
            '+' | '-' | '*' | '%' => {
                chars.next();
                let op = if matches!(chars.peek(), Some(&(_, '='))) {
                    chars.next();
                    format!("{}=", c)
                } else {
                    c.to_string()
                };
                tokens.push(Token { kind: TokenKind::Operator(op), line: line_no, column });
            }
            '/' => {
                chars.next();
                let mut op = String::from("/");
                if matches!(chars.peek(), Some(&(_, '/'))) {
                    chars.next();
                    op.push('/');
                }
                if matches!(chars.peek(), Some(&(_, '='))) {
                    chars.next();
                    op.push('=');
                }
                tokens.push(Token { kind: TokenKind::Operator(op), line: line_no, column });
            }
            '=' | '<' | '>' | '!' => {
                chars.next();
                if matches!(chars.peek(), Some(&(_, '='))) {
                    chars.next();
                    tokens.push(Token {
                        kind: TokenKind::Operator(format!("{}=", c)),
                        line: line_no,
                        column,
                    });
                } else if c == '!' {
                    return Err(InterpError::syntax_error(
                        "unexpected character '!'".to_string(),
                        SourceLocation::new(line_no, column),
                    ));
                } else {
                    tokens.push(Token {
                        kind: TokenKind::Operator(c.to_string()),
                        line: line_no,
                        column,
                    });
                }
            }
            '(' => {
                chars.next();
                *paren_depth += 1;
                tokens.push(Token { kind: TokenKind::Punctuation('('), line: line_no, column });
            }
            ')' => {
                chars.next();
                *paren_depth = paren_depth.saturating_sub(1);
                tokens.push(Token { kind: TokenKind::Punctuation(')'), line: line_no, column });
            }
            ',' | ':' | ';' => {
                chars.next();
                tokens.push(Token { kind: TokenKind::Punctuation(c), line: line_no, column });
            }
            _ => {
                return Err(InterpError::syntax_error(
                    format!("unexpected character '{}'", c),
                    SourceLocation::new(line_no, column),
                ));
            }
        }
    }

    Ok(())
}

/// Consumes a string literal body up to the closing quote, decoding the
/// escapes \n \t \r \\ \' \". Any other escape drops the backslash and
/// keeps the following character.
fn lex_string_body(
    chars: &mut Peekable<CharIndices<'_>>,
    quote: char,
    line_no: usize,
    start_col: usize,
) -> Result<String, Box<InterpError>> {
    let mut text = String::new();
    while let Some((_, ch)) = chars.next() {
        if ch == quote {
            return Ok(text);
        }
        if ch == '\\' {
            match chars.next() {
                Some((_, 'n')) => text.push('\n'),
                Some((_, 't')) => text.push('\t'),
                Some((_, 'r')) => text.push('\r'),
                Some((_, other)) => text.push(other),
                None => break,
            }
        } else {
            text.push(ch);
        }
    }
    Err(InterpError::syntax_error(
        "unterminated string literal".to_string(),
        SourceLocation::new(line_no, start_col),
    ))
}

/// Consumes an f-string body, splitting it into decoded literal text and
/// the raw source of each {} interpolation. Braces nest inside an
/// interpolation so expressions like nested calls survive intact.
fn lex_fstring_body(
    chars: &mut Peekable<CharIndices<'_>>,
    quote: char,
    line_no: usize,
    start_col: usize,
) -> Result<Vec<FStringPiece>, Box<InterpError>> {
    let mut pieces = Vec::new();
    let mut text = String::new();

    while let Some((_, ch)) = chars.next() {
        if ch == quote {
            if !text.is_empty() {
                pieces.push(FStringPiece::Text(text));
            }
            return Ok(pieces);
        }
        match ch {
            '\\' => match chars.next() {
                Some((_, 'n')) => text.push('\n'),
                Some((_, 't')) => text.push('\t'),
                Some((_, 'r')) => text.push('\r'),
                Some((_, other)) => text.push(other),
                None => break,
            },
            '{' => {
                if !text.is_empty() {
                    pieces.push(FStringPiece::Text(std::mem::take(&mut text)));
                }
                let mut expr = String::new();
                let mut brace_depth = 1;
                for (_, ec) in chars.by_ref() {
                    if ec == '{' {
                        brace_depth += 1;
                    } else if ec == '}' {
                        brace_depth -= 1;
                        if brace_depth == 0 {
                            break;
                        }
                    }
                    expr.push(ec);
                }
                pieces.push(FStringPiece::Expr(expr));
            }
            _ => text.push(ch),
        }
    }
    Err(InterpError::syntax_error(
        "unterminated f-string literal".to_string(),
        SourceLocation::new(line_no, start_col),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_indent_dedent_pairs() {
        let source = "while x:\n    y = 1\nz = 2\n";
        let toks = kinds(source);
        let indents = toks.iter().filter(|k| **k == TokenKind::Indent).count();
        let dedents = toks.iter().filter(|k| **k == TokenKind::Dedent).count();
        assert_eq!(indents, 1);
        assert_eq!(dedents, 1);
    }

    #[test]
    fn test_dedent_emitted_at_eof() {
        let toks = kinds("if x:\n    if y:\n        z = 1\n");
        let dedents = toks.iter().filter(|k| **k == TokenKind::Dedent).count();
        assert_eq!(dedents, 2);
        assert_eq!(toks.last(), Some(&TokenKind::Eof));
    }

    #[test]
    fn test_blank_and_comment_lines_are_skipped() {
        let toks = kinds("x = 1\n\n# comment\n   \ny = 2\n");
        let newlines = toks.iter().filter(|k| **k == TokenKind::Newline).count();
        assert_eq!(newlines, 2);
    }

    #[test]
    fn test_inconsistent_dedent_is_an_error() {
        assert!(tokenize("if x:\n        y = 1\n    z = 2\n").is_err());
    }

    #[test]
    fn test_number_lexeme_is_preserved() {
        let toks = kinds("100000000000000000000\n");
        assert_eq!(toks[0], TokenKind::Number("100000000000000000000".to_string()));
    }

    #[test]
    fn test_string_escapes() {
        let toks = kinds("\"a\\tb\\n\\\\\\q\"\n");
        assert_eq!(toks[0], TokenKind::Str("a\tb\n\\q".to_string()));
    }

    #[test]
    fn test_fstring_pieces() {
        let toks = kinds("f\"hello {name}!\"\n");
        assert_eq!(
            toks[0],
            TokenKind::FString(vec![
                FStringPiece::Text("hello ".to_string()),
                FStringPiece::Expr("name".to_string()),
                FStringPiece::Text("!".to_string()),
            ])
        );
    }

    #[test]
    fn test_compound_operators() {
        let toks = kinds("a //= 2\nb != 1\n");
        assert!(toks.contains(&TokenKind::Operator("//=".to_string())));
        assert!(toks.contains(&TokenKind::Operator("!=".to_string())));
    }

    #[test]
    fn test_open_paren_joins_lines() {
        let toks = kinds("print(1,\n      2)\n");
        let newlines = toks.iter().filter(|k| **k == TokenKind::Newline).count();
        assert_eq!(newlines, 1);
    }
}
