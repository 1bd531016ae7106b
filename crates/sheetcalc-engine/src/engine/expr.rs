//! Arithmetic expression tokenizer and recursive-descent evaluator.
//!
//! Formulas are plain arithmetic over numeric literals and cell references:
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := ('+' | '-') unary | primary
//! primary := NUMBER | '(' expr ')'
//! ```
//!
//! Reference tokens are resolved by the caller and replaced with
//! [`Token::Number`] before [`evaluate_tokens`] runs, so the parser itself
//! never looks at the grid.

use super::eval::EvalError;

#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    Number(f64),
    /// A maximal run of uppercase letters followed by digits, e.g. `AB12`.
    Ref(String),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
    /// Anything the grammar has no place for. Kept as a token so references
    /// after it are still scanned; the parser rejects it.
    Unknown(String),
}

/// Split formula text into tokens. Never fails; bad input becomes
/// [`Token::Unknown`].
pub fn tokenize(expr: &str) -> Vec<Token> {
    let chars: Vec<char> = expr.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '*' => {
                tokens.push(Token::Star);
                i += 1;
            }
            '/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            'A'..='Z' => {
                let start = i;
                while i < chars.len() && chars[i].is_ascii_uppercase() {
                    i += 1;
                }
                let letters_end = i;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                if i == letters_end {
                    tokens.push(Token::Unknown(text));
                } else {
                    tokens.push(Token::Ref(text));
                }
            }
            '0'..='9' | '.' => {
                let (token, next) = lex_number(&chars, i);
                tokens.push(token);
                i = next;
            }
            other => {
                tokens.push(Token::Unknown(other.to_string()));
                i += 1;
            }
        }
    }

    tokens
}

/// Lex `digits [. digits] [e [+-] digits]` starting at `start`.
fn lex_number(chars: &[char], start: usize) -> (Token, usize) {
    let mut i = start;
    while i < chars.len() && chars[i].is_ascii_digit() {
        i += 1;
    }
    if i < chars.len() && chars[i] == '.' {
        i += 1;
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
    }
    // Exponent is lowercase only: uppercase letters always start a reference.
    if i < chars.len() && chars[i] == 'e' {
        let mut j = i + 1;
        if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
            j += 1;
        }
        let digits_start = j;
        while j < chars.len() && chars[j].is_ascii_digit() {
            j += 1;
        }
        if j > digits_start {
            i = j;
        }
    }

    let text: String = chars[start..i].iter().collect();
    match text.parse::<f64>() {
        Ok(n) if n.is_finite() => (Token::Number(n), i),
        _ => (Token::Unknown(text), i),
    }
}

/// Evaluate a fully resolved token stream (no [`Token::Ref`] left).
pub fn evaluate_tokens(tokens: &[Token]) -> Result<f64, EvalError> {
    let mut parser = Parser { tokens, pos: 0 };
    let value = parser.expr()?;
    if parser.pos != tokens.len() {
        return Err(EvalError::Malformed);
    }
    if !value.is_finite() {
        return Err(EvalError::NonFinite);
    }
    Ok(value)
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expr(&mut self) -> Result<f64, EvalError> {
        let mut acc = self.term()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.pos += 1;
                    acc += self.term()?;
                }
                Some(Token::Minus) => {
                    self.pos += 1;
                    acc -= self.term()?;
                }
                _ => return Ok(acc),
            }
        }
    }

    fn term(&mut self) -> Result<f64, EvalError> {
        let mut acc = self.unary()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.pos += 1;
                    acc *= self.unary()?;
                }
                Some(Token::Slash) => {
                    self.pos += 1;
                    let divisor = self.unary()?;
                    acc /= divisor;
                    if !acc.is_finite() {
                        return Err(EvalError::NonFinite);
                    }
                }
                _ => return Ok(acc),
            }
        }
    }

    fn unary(&mut self) -> Result<f64, EvalError> {
        match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                Ok(-self.unary()?)
            }
            Some(Token::Plus) => {
                self.pos += 1;
                self.unary()
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<f64, EvalError> {
        match self.next() {
            Some(Token::Number(n)) => Ok(*n),
            Some(Token::LParen) => {
                let value = self.expr()?;
                match self.next() {
                    Some(Token::RParen) => Ok(value),
                    _ => Err(EvalError::Malformed),
                }
            }
            Some(Token::Ref(_)) => Err(EvalError::InvalidReference),
            _ => Err(EvalError::Malformed),
        }
    }
}
