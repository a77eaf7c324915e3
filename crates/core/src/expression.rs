//! Arithmetic expression evaluation.
//!
//! A tokenizer plus a recursive-descent parser restricted to the validated alphabet:
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := ('+' | '-') unary | primary
//! primary := number | '(' expr ')'
//! number  := digits ['.' digits] | '.' digits | digits '.'
//! ```
//!
//! Whitespace is insignificant and may appear anywhere, including inside a number
//! (`"1 2"` reads as `12`). Evaluation uses plain `f64` arithmetic; only the final value is
//! checked for finiteness. Reported positions are byte offsets into the original input.

use std::fmt;

use crate::error::{CalcError, CalcResult};
use crate::validator::has_valid_charset;

/// Maximum nesting of parentheses and unary signs.
const MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Num(f64),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Num(n) => write!(f, "{n}"),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Spanned {
    token: Token,
    pos: usize,
}

fn failure(message: impl fmt::Display) -> CalcError {
    CalcError::Evaluation(format!("Expression evaluation failed: {message}"))
}

/// Evaluates `expression` with standard precedence and grouping.
pub fn evaluate_expression(expression: &str) -> CalcResult<f64> {
    let chars: Vec<(usize, char)> = expression
        .char_indices()
        .filter(|(_, c)| !c.is_whitespace())
        .collect();

    if chars.is_empty() {
        return Err(CalcError::Evaluation("Invalid expression".to_string()));
    }

    if !has_valid_charset(expression) {
        return Err(CalcError::Evaluation(
            "Invalid characters in expression".to_string(),
        ));
    }

    let tokens = tokenize(&chars)?;
    let mut parser = Parser {
        tokens: &tokens,
        cursor: 0,
        depth: 0,
    };

    let value = parser.parse_expr()?;

    if let Some(extra) = parser.peek() {
        return Err(failure(format!(
            "Unexpected '{}' at position {}",
            extra.token, extra.pos
        )));
    }

    if !value.is_finite() {
        return Err(failure("Invalid calculation result"));
    }

    Ok(value)
}

fn tokenize(chars: &[(usize, char)]) -> CalcResult<Vec<Spanned>> {
    let mut tokens = Vec::with_capacity(chars.len());
    let mut i = 0;

    while i < chars.len() {
        let (pos, c) = chars[i];

        let token = match c {
            '0'..='9' | '.' => {
                let start = i;
                while i < chars.len() && matches!(chars[i].1, '0'..='9' | '.') {
                    i += 1;
                }
                let literal: String = chars[start..i].iter().map(|(_, c)| c).collect();
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| failure(format!("Malformed number '{literal}' at position {pos}")))?;
                tokens.push(Spanned {
                    token: Token::Num(value),
                    pos,
                });
                continue;
            }
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '(' => Token::LParen,
            ')' => Token::RParen,
            other => {
                return Err(failure(format!(
                    "Unexpected '{other}' at position {pos}"
                )))
            }
        };

        // `++`, `--`, `//`, `**` are distinct operators in the grammar the source alphabet
        // was borrowed from; none of them is arithmetic here.
        if let Some(&(_, next)) = chars.get(i + 1) {
            if next == c && matches!(c, '+' | '-' | '/' | '*') {
                return Err(failure(format!(
                    "Unexpected '{c}{next}' at position {pos}"
                )));
            }
        }

        tokens.push(Spanned { token, pos });
        i += 1;
    }

    Ok(tokens)
}

struct Parser<'a> {
    tokens: &'a [Spanned],
    cursor: usize,
    depth: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<Spanned> {
        self.tokens.get(self.cursor).copied()
    }

    fn advance(&mut self) -> Option<Spanned> {
        let next = self.peek();
        if next.is_some() {
            self.cursor += 1;
        }
        next
    }

    fn descend(&mut self) -> CalcResult<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(failure("Expression is nested too deeply"));
        }
        Ok(())
    }

    fn parse_expr(&mut self) -> CalcResult<f64> {
        let mut lhs = self.parse_term()?;

        while let Some(Spanned {
            token: op @ (Token::Plus | Token::Minus),
            ..
        }) = self.peek()
        {
            self.cursor += 1;
            let rhs = self.parse_term()?;
            lhs = if op == Token::Plus { lhs + rhs } else { lhs - rhs };
        }

        Ok(lhs)
    }

    fn parse_term(&mut self) -> CalcResult<f64> {
        let mut lhs = self.parse_unary()?;

        while let Some(Spanned {
            token: op @ (Token::Star | Token::Slash),
            ..
        }) = self.peek()
        {
            self.cursor += 1;
            let rhs = self.parse_unary()?;
            lhs = if op == Token::Star { lhs * rhs } else { lhs / rhs };
        }

        Ok(lhs)
    }

    fn parse_unary(&mut self) -> CalcResult<f64> {
        match self.peek() {
            Some(Spanned {
                token: sign @ (Token::Plus | Token::Minus),
                ..
            }) => {
                self.cursor += 1;
                self.descend()?;
                let operand = self.parse_unary()?;
                self.depth -= 1;
                Ok(if sign == Token::Minus { -operand } else { operand })
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> CalcResult<f64> {
        match self.advance() {
            Some(Spanned {
                token: Token::Num(value),
                ..
            }) => Ok(value),
            Some(Spanned {
                token: Token::LParen,
                pos,
            }) => {
                if let Some(Spanned {
                    token: Token::RParen,
                    ..
                }) = self.peek()
                {
                    return Err(failure(format!("Empty parentheses at position {pos}")));
                }

                self.descend()?;
                let value = self.parse_expr()?;
                self.depth -= 1;

                match self.advance() {
                    Some(Spanned {
                        token: Token::RParen,
                        ..
                    }) => Ok(value),
                    Some(other) => Err(failure(format!(
                        "Expected ')' but found '{}' at position {}",
                        other.token, other.pos
                    ))),
                    None => Err(failure(format!("Missing ')' for '(' at position {pos}"))),
                }
            }
            Some(other) => Err(failure(format!(
                "Unexpected '{}' at position {}",
                other.token, other.pos
            ))),
            None => Err(failure("Unexpected end of expression")),
        }
    }
}
