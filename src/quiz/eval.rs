//! Integer arithmetic over question prompts such as `"−10 × 3 ÷ −5 + 6 − 2 = ?"`.
//!
//! Used to check that a level's answer key matches its prompts. Supports `+ - × ÷`
//! (and the ASCII spellings `* x /`), parentheses and unary minus, with the usual
//! precedence. Division must be exact.

use std::iter::Peekable;
use std::str::Chars;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("unbalanced parentheses")]
    Unbalanced,
    #[error("division by zero")]
    DivisionByZero,
    #[error("{0} ÷ {1} is not a whole number")]
    InexactDivision(i64, i64),
    #[error("number out of range")]
    Overflow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Num(i64),
    Plus,
    Minus,
    Times,
    Divide,
    Open,
    Close,
}

/// Evaluates the expression part of a prompt: everything before `=` (or a trailing `?`).
pub fn evaluate_prompt(prompt: &str) -> Result<i64, EvalError> {
    let expression = prompt
        .split('=')
        .next()
        .unwrap_or_default()
        .trim_end()
        .trim_end_matches('?');

    let tokens = tokenize(expression)?;
    let mut parser = Parser { tokens: &tokens, pos: 0 };
    let value = parser.expression()?;

    match parser.peek() {
        None => Ok(value),
        Some(Token::Close) => Err(EvalError::Unbalanced),
        Some(_) => Err(EvalError::UnexpectedEnd),
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, EvalError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        let token = match c {
            c if c.is_whitespace() => { chars.next(); continue; }
            '0'..='9' => Token::Num(number(&mut chars)?),
            '+' => Token::Plus,
            '-' | '−' | '–' => Token::Minus,
            '*' | '×' | 'x' | 'X' => Token::Times,
            '/' | '÷' => Token::Divide,
            '(' => Token::Open,
            ')' => Token::Close,
            other => return Err(EvalError::UnexpectedChar(other)),
        };

        if !matches!(token, Token::Num(_)) {
            chars.next();
        }
        tokens.push(token);
    }

    Ok(tokens)
}

fn number(chars: &mut Peekable<Chars<'_>>) -> Result<i64, EvalError> {
    let mut value: i64 = 0;
    while let Some(digit) = chars.peek().and_then(|c| c.to_digit(10)) {
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_add(i64::from(digit)))
            .ok_or(EvalError::Overflow)?;
        chars.next();
    }
    Ok(value)
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.peek();
        self.pos += 1;
        token
    }

    // expression := term (('+' | '-') term)*
    fn expression(&mut self) -> Result<i64, EvalError> {
        let mut value = self.term()?;
        while let Some(op @ (Token::Plus | Token::Minus)) = self.peek() {
            self.bump();
            let rhs = self.term()?;
            value = match op {
                Token::Plus => value.checked_add(rhs),
                _ => value.checked_sub(rhs),
            }.ok_or(EvalError::Overflow)?;
        }
        Ok(value)
    }

    // term := unary (('×' | '÷') unary)*
    fn term(&mut self) -> Result<i64, EvalError> {
        let mut value = self.unary()?;
        while let Some(op @ (Token::Times | Token::Divide)) = self.peek() {
            self.bump();
            let rhs = self.unary()?;
            value = match op {
                Token::Times => value.checked_mul(rhs).ok_or(EvalError::Overflow)?,
                _ => divide(value, rhs)?,
            };
        }
        Ok(value)
    }

    fn unary(&mut self) -> Result<i64, EvalError> {
        match self.peek() {
            Some(Token::Minus) => {
                self.bump();
                self.unary()?.checked_neg().ok_or(EvalError::Overflow)
            }
            Some(Token::Plus) => {
                self.bump();
                self.unary()
            }
            _ => self.atom(),
        }
    }

    fn atom(&mut self) -> Result<i64, EvalError> {
        match self.bump() {
            Some(Token::Num(n)) => Ok(n),
            Some(Token::Open) => {
                let value = self.expression()?;
                match self.bump() {
                    Some(Token::Close) => Ok(value),
                    _ => Err(EvalError::Unbalanced),
                }
            }
            Some(Token::Close) => Err(EvalError::Unbalanced),
            _ => Err(EvalError::UnexpectedEnd),
        }
    }
}

fn divide(lhs: i64, rhs: i64) -> Result<i64, EvalError> {
    if rhs == 0 {
        return Err(EvalError::DivisionByZero);
    }
    if lhs.checked_rem(rhs).ok_or(EvalError::Overflow)? != 0 {
        return Err(EvalError::InexactDivision(lhs, rhs));
    }
    lhs.checked_div(rhs).ok_or(EvalError::Overflow)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluates_with_precedence() {
        assert_eq!(evaluate_prompt("−5 + 3 × 2 − (−4) ÷ 2 = ?"), Ok(3));
        assert_eq!(evaluate_prompt("−12 + 10 ÷ −5 × 4 − 1 = ?"), Ok(-21));
        assert_eq!(evaluate_prompt("14 − (−7) ÷ −1 × 2 + 3 = ?"), Ok(3));
    }

    #[test]
    fn min_divided_by_minus_one_overflows() {
        assert_eq!(
            evaluate_prompt("(−9223372036854775807 − 1) ÷ −1 = ?"),
            Err(EvalError::Overflow)
        );
        assert_eq!(evaluate_prompt("(−9223372036854775807 − 1) ÷ 2 = ?"), Ok(i64::MIN / 2));
    }

    #[test]
    fn accepts_ascii_and_unicode_operators() {
        assert_eq!(evaluate_prompt("4 x 7 = ?"), Ok(28));
        assert_eq!(evaluate_prompt("-3 + -7 = ?"), Ok(-10));
        assert_eq!(evaluate_prompt("6 ÷−3 = ?"), Ok(-2));
        assert_eq!(evaluate_prompt("-5 + 8 + -2 + -1 ?"), Ok(0));
    }

    #[test]
    fn rejects_malformed_expressions() {
        assert_eq!(evaluate_prompt("(1 + 2 = ?"), Err(EvalError::Unbalanced));
        assert_eq!(evaluate_prompt("1 + 2) = ?"), Err(EvalError::Unbalanced));
        assert_eq!(evaluate_prompt("3 + = ?"), Err(EvalError::UnexpectedEnd));
        assert_eq!(evaluate_prompt("3 ^ 2 = ?"), Err(EvalError::UnexpectedChar('^')));
        assert_eq!(evaluate_prompt("7 ÷ 2 = ?"), Err(EvalError::InexactDivision(7, 2)));
        assert_eq!(evaluate_prompt("7 ÷ 0 = ?"), Err(EvalError::DivisionByZero));
    }
}
