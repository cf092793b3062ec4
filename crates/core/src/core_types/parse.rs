//! Unit string parser
//!
//! Accepts the generic notation units are printed in, plus the common
//! shorthands people type into metadata:
//! - factors separated by whitespace, `*` or `.` (`kg m`, `m*s`, `N.m`)
//! - `/` divides by the next factor (`m / s`, `km/h`, `kg / (m s2)`)
//! - exponents as trailing integers, `^n` or `**n` (`s2`, `m-1`, `m^2`)
//! - an optional numeric scale (`1000 m`, `0.001`)
//! - `""` and `"1"` for dimensionless

use super::units::Unit;
use crate::error::{UnitError, UnitResult};

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Symbol(String),
    Power(i32),
    Star,
    Slash,
    LParen,
    RParen,
}

/// Parse a unit expression into a [`Unit`].
pub(crate) fn parse_unit(input: &str) -> UnitResult<Unit> {
    let tokens = lex(input)?;
    let mut parser = Parser {
        input,
        tokens,
        pos: 0,
    };
    let unit = parser.product()?;
    if parser.pos < parser.tokens.len() {
        return Err(parser.malformed("unbalanced ')'"));
    }
    Ok(unit)
}

fn malformed(input: &str, reason: impl Into<String>) -> UnitError {
    UnitError::MalformedUnit {
        input: input.to_string(),
        reason: reason.into(),
    }
}

// ============================================================================
// LEXER
// ============================================================================

fn lex(input: &str) -> UnitResult<Vec<Token>> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        match c {
            c if c.is_whitespace() => i += 1,
            '*' if next == Some('*') => {
                let (power, end) = read_int(input, &chars, i + 2)?;
                tokens.push(Token::Power(power));
                i = end;
            }
            '^' => {
                let (power, end) = read_int(input, &chars, i + 1)?;
                tokens.push(Token::Power(power));
                i = end;
            }
            '.' if next.is_some_and(|n| n.is_ascii_digit()) => {
                let (value, end) = read_number(input, &chars, i)?;
                tokens.push(Token::Number(value));
                i = end;
            }
            '*' | '.' | '·' => {
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
                if let Some((power, end)) = adjacent_exponent(&chars, i) {
                    tokens.push(Token::Power(power));
                    i = end;
                }
            }
            c if c.is_ascii_digit() => {
                let (value, end) = read_number(input, &chars, i)?;
                tokens.push(Token::Number(value));
                i = end;
            }
            c if c.is_alphabetic() => {
                let start = i;
                while i < chars.len() && chars[i].is_alphabetic() {
                    i += 1;
                }
                tokens.push(Token::Symbol(chars[start..i].iter().collect()));
                if let Some((power, end)) = adjacent_exponent(&chars, i) {
                    tokens.push(Token::Power(power));
                    i = end;
                }
            }
            other => return Err(malformed(input, format!("unexpected character '{other}'"))),
        }
    }
    Ok(tokens)
}

/// An integer written directly after a symbol or `)`, as in `s2` or `m-1`.
fn adjacent_exponent(chars: &[char], i: usize) -> Option<(i32, usize)> {
    let first = *chars.get(i)?;
    let digits_from = if first == '-' || first == '+' { i + 1 } else { i };
    if !chars.get(digits_from)?.is_ascii_digit() {
        return None;
    }
    let end = scan_digits(chars, digits_from);
    let text: String = chars[i..end].iter().collect();
    text.parse().ok().map(|p| (p, end))
}

fn read_int(input: &str, chars: &[char], i: usize) -> UnitResult<(i32, usize)> {
    adjacent_exponent(chars, i).ok_or_else(|| malformed(input, "expected an integer exponent"))
}

fn read_number(input: &str, chars: &[char], start: usize) -> UnitResult<(f64, usize)> {
    let mut end = scan_digits(chars, start);
    if chars.get(end) == Some(&'.') {
        end = scan_digits(chars, end + 1);
    }
    if matches!(chars.get(end), Some('e' | 'E')) {
        let sign = usize::from(matches!(chars.get(end + 1), Some('-' | '+')));
        if chars.get(end + 1 + sign).is_some_and(char::is_ascii_digit) {
            end = scan_digits(chars, end + 1 + sign);
        }
    }
    let text: String = chars[start..end].iter().collect();
    text.parse()
        .map(|v| (v, end))
        .map_err(|_| malformed(input, format!("invalid number '{text}'")))
}

fn scan_digits(chars: &[char], mut i: usize) -> usize {
    while i < chars.len() && chars[i].is_ascii_digit() {
        i += 1;
    }
    i
}

// ============================================================================
// PARSER
// ============================================================================

struct Parser<'a> {
    input: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn malformed(&self, reason: impl Into<String>) -> UnitError {
        malformed(self.input, reason)
    }

    /// Report units that leave the representable range as malformed input.
    fn in_range(&self, unit: UnitResult<Unit>) -> UnitResult<Unit> {
        unit.map_err(|err| match err {
            UnitError::OutOfRange { reason, .. } => self.malformed(reason),
            other => other,
        })
    }

    /// factor ( ['*'] factor | '/' factor )*
    fn product(&mut self) -> UnitResult<Unit> {
        let mut acc = Unit::dimensionless();
        let mut seen = false;
        loop {
            let divide = match self.peek() {
                None | Some(Token::RParen) => break,
                Some(Token::Star | Token::Slash) if !seen => {
                    return Err(self.malformed("operator without a left operand"));
                }
                Some(Token::Star) => {
                    self.pos += 1;
                    false
                }
                Some(Token::Slash) => {
                    self.pos += 1;
                    true
                }
                Some(_) => false,
            };
            let factor = self.factor()?;
            acc = self.in_range(if divide {
                acc.divide(&factor)
            } else {
                acc.multiply(&factor)
            })?;
            seen = true;
        }
        Ok(acc)
    }

    /// (number | symbol | '(' product ')') [power]
    fn factor(&mut self) -> UnitResult<Unit> {
        let base = match self.bump() {
            Some(Token::Number(value)) => self.in_range(Unit::scaled(value))?,
            Some(Token::Symbol(symbol)) => {
                Unit::symbol(&symbol).map_err(|_| UnitError::UnknownUnit {
                    input: self.input.to_string(),
                    symbol,
                })?
            }
            Some(Token::LParen) => {
                let inner = self.product()?;
                match self.bump() {
                    Some(Token::RParen) => inner,
                    _ => return Err(self.malformed("missing ')'")),
                }
            }
            Some(token) => return Err(self.malformed(format!("unexpected {token:?}"))),
            None => return Err(self.malformed("expected a unit after operator")),
        };
        if let Some(Token::Power(power)) = self.peek() {
            let power = *power;
            self.pos += 1;
            return self.in_range(base.powi(power));
        }
        Ok(base)
    }
}
