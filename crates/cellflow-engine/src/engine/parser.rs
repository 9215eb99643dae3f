//! Arithmetic expression parser
//!
//! A recursive descent parser for the general-expression fallback of a
//! formula: numbers, cell references, `+ - * /`, unary sign and parentheses
//! with the usual precedence. Input is expected upper-case.

use super::cell_ref::CellRef;
use super::error::{EvalError, EvalResult};

/// Nesting limit for parentheses and unary operators.
const MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

/// Parsed arithmetic expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Ref(CellRef),
    Negate(Box<Expr>),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

/// Parse an arithmetic expression (no leading `=`).
pub fn parse_expression(input: &str) -> EvalResult<Expr> {
    let tokens = tokenize(input)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let expr = parser.parse_additive()?;

    if parser.current() != &Token::Eof {
        return Err(failure(format!(
            "unexpected {} after expression",
            parser.current().describe()
        )));
    }
    Ok(expr)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ref(CellRef),
    Plus,
    Minus,
    Star,
    Slash,
    LeftParen,
    RightParen,
    Eof,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Number(n) => format!("number {}", n),
            Token::Ref(cell) => format!("reference {}", cell),
            Token::Plus => "'+'".to_string(),
            Token::Minus => "'-'".to_string(),
            Token::Star => "'*'".to_string(),
            Token::Slash => "'/'".to_string(),
            Token::LeftParen => "'('".to_string(),
            Token::RightParen => "')'".to_string(),
            Token::Eof => "end of expression".to_string(),
        }
    }
}

fn failure(message: String) -> EvalError {
    EvalError::EvaluationFailure(message)
}

fn tokenize(input: &str) -> EvalResult<Vec<Token>> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let c = bytes[pos];
        let token = match c {
            b' ' | b'\t' | b'\r' | b'\n' => {
                pos += 1;
                continue;
            }
            b'+' => Token::Plus,
            b'-' => Token::Minus,
            b'*' => Token::Star,
            b'/' => Token::Slash,
            b'(' => Token::LeftParen,
            b')' => Token::RightParen,
            b'0'..=b'9' | b'.' => {
                let start = pos;
                while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                    pos += 1;
                }
                if pos < bytes.len() && bytes[pos] == b'.' {
                    pos += 1;
                    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                        pos += 1;
                    }
                }
                let text = &input[start..pos];
                let n = text
                    .parse::<f64>()
                    .ok()
                    .filter(|n| n.is_finite())
                    .ok_or_else(|| failure(format!("invalid number '{}'", text)))?;
                tokens.push(Token::Number(n));
                continue;
            }
            b'A'..=b'Z' => {
                let start = pos;
                while pos < bytes.len() && bytes[pos].is_ascii_uppercase() {
                    pos += 1;
                }
                let letters_end = pos;
                while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                    pos += 1;
                }
                if pos == letters_end {
                    return Err(failure(format!(
                        "unknown identifier '{}'",
                        &input[start..letters_end]
                    )));
                }
                tokens.push(Token::Ref(CellRef::parse(&input[start..pos])?));
                continue;
            }
            _ => {
                let ch = input[pos..].chars().next().unwrap_or('?');
                return Err(failure(format!("unexpected character '{}'", ch)));
            }
        };
        tokens.push(token);
        pos += 1;
    }

    tokens.push(Token::Eof);
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&Token::Eof)
    }

    fn consume(&mut self) -> Token {
        let token = self.current().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn enter(&mut self) -> EvalResult<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(failure("expression nested too deeply".to_string()));
        }
        Ok(())
    }

    fn parse_additive(&mut self) -> EvalResult<Expr> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match self.current() {
                Token::Plus => BinaryOp::Add,
                Token::Minus => BinaryOp::Subtract,
                _ => break,
            };

            self.consume();
            let right = self.parse_multiplicative()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> EvalResult<Expr> {
        let mut left = self.parse_unary()?;

        loop {
            let op = match self.current() {
                Token::Star => BinaryOp::Multiply,
                Token::Slash => BinaryOp::Divide,
                _ => break,
            };

            self.consume();
            let right = self.parse_unary()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> EvalResult<Expr> {
        // Prefix unary minus
        if matches!(self.current(), Token::Minus) {
            self.consume();
            self.enter()?;
            let operand = self.parse_unary()?;
            self.depth -= 1;
            return Ok(Expr::Negate(Box::new(operand)));
        }

        // Prefix plus (no-op)
        if matches!(self.current(), Token::Plus) {
            self.consume();
            self.enter()?;
            let operand = self.parse_unary()?;
            self.depth -= 1;
            return Ok(operand);
        }

        self.parse_primary()
    }

    fn parse_primary(&mut self) -> EvalResult<Expr> {
        match self.consume() {
            Token::Number(n) => Ok(Expr::Number(n)),
            Token::Ref(cell) => Ok(Expr::Ref(cell)),
            Token::LeftParen => {
                self.enter()?;
                let inner = self.parse_additive()?;
                self.depth -= 1;
                match self.consume() {
                    Token::RightParen => Ok(inner),
                    other => Err(failure(format!("expected ')', found {}", other.describe()))),
                }
            }
            other => Err(failure(format!("unexpected {}", other.describe()))),
        }
    }
}
