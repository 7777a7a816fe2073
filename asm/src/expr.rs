use std::fmt::{self, Display, Formatter};

use crate::symtab::Symtab;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ExprError {
    #[error("invalid number: `{0}`")]
    InvalidNumber(String),

    #[error("invalid expression: `{0}`")]
    InvalidExpression(String),
}

/// Parses a numeric literal. The radix comes from the last character:
/// `h` hexadecimal, `q` octal, `b` binary, anything else decimal.
pub fn parse_number(text: &str) -> Result<u16, ExprError> {
    let invalid = || ExprError::InvalidNumber(text.to_string());
    let (digits, radix) = match text.as_bytes().last() {
        None => return Err(invalid()),
        Some(b'h' | b'H') => (&text[..text.len() - 1], 16),
        Some(b'q' | b'Q') => (&text[..text.len() - 1], 8),
        Some(b'b' | b'B') => (&text[..text.len() - 1], 2),
        Some(_) => (text, 10),
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(invalid());
    }
    u32::from_str_radix(digits, radix)
        .ok()
        .and_then(|value| u16::try_from(value).ok())
        .ok_or_else(invalid)
}

pub fn is_char_constant(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.len() == 3 && matches!(bytes[0], b'\'' | b'"') && bytes[2] == bytes[0]
}

pub fn is_quote_delimited(text: &str) -> bool {
    let bytes = text.trim().as_bytes();
    bytes.len() >= 2 && matches!(bytes[0], b'\'' | b'"') && bytes[bytes.len() - 1] == bytes[0]
}

pub fn split_arguments(text: &str) -> Vec<&str> {
    let mut args = Vec::new();
    let mut quote = None;
    let mut start = 0;
    for (index, c) in text.char_indices() {
        match (quote, c) {
            (None, ',') => {
                args.push(text[start..index].trim());
                start = index + 1;
            }
            (None, '\'' | '"') => quote = Some(c),
            (Some(q), c) if q == c => quote = None,
            _ => {}
        }
    }
    args.push(text[start..].trim());
    args
}

pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || matches!(c, '_' | '?' | '@' | '.') => {
            chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '?' | '@' | '.'))
        }
        _ => false,
    }
}

pub fn dollar(here: u16, text: &str) -> Result<u16, ExprError> {
    match Expr::parse(text)? {
        expr @ Expr::Here(_) => expr.apply(here),
        _ => Err(ExprError::InvalidExpression(text.trim().to_string())),
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl Operator {
    fn parse(c: char) -> Option<Self> {
        match c {
            '+' => Some(Self::Add),
            '-' => Some(Self::Sub),
            '*' => Some(Self::Mul),
            '/' => Some(Self::Div),
            '%' => Some(Self::Rem),
            _ => None,
        }
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Add => "+",
                Self::Sub => "-",
                Self::Mul => "*",
                Self::Div => "/",
                Self::Rem => "%",
            }
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expr {
    Value(u16),
    Here(Option<(Operator, u16)>),
    Label(String),
}

impl Expr {
    pub fn parse(text: &str) -> Result<Self, ExprError> {
        let text = text.trim();

        if let Some(rest) = text.strip_prefix('$') {
            let mut chars = rest.trim_start().chars();
            return match chars.next() {
                None => Ok(Self::Here(None)),
                Some(c) => match Operator::parse(c) {
                    Some(op) => Ok(Self::Here(Some((op, parse_number(chars.as_str().trim())?)))),
                    None => Err(ExprError::InvalidExpression(text.to_string())),
                },
            };
        }

        if is_char_constant(text) {
            return Ok(Self::Value(text.as_bytes()[1] as u16));
        }

        match text.chars().next() {
            Some(c) if c.is_ascii_digit() => Ok(Self::Value(parse_number(text)?)),
            Some(_) if is_identifier(text) => Ok(Self::Label(text.to_ascii_lowercase())),
            Some('-' | '+') => Err(ExprError::InvalidNumber(text.to_string())),
            _ => Err(ExprError::InvalidExpression(text.to_string())),
        }
    }

    /// Resolves the expression. `Ok(None)` means it names a label that is
    /// not (yet) in the symbol table.
    pub fn evaluate(&self, here: u16, symtab: &Symtab) -> Result<Option<u16>, ExprError> {
        match self {
            Self::Value(value) => Ok(Some(*value)),
            Self::Here(_) => self.apply(here).map(Some),
            Self::Label(label) => Ok(symtab.get(label)),
        }
    }

    fn apply(&self, here: u16) -> Result<u16, ExprError> {
        let (op, rhs) = match self {
            Self::Here(None) => return Ok(here),
            Self::Here(Some(term)) => *term,
            _ => return Err(ExprError::InvalidExpression(self.to_string())),
        };
        let lhs = here as i64;
        let rhs = rhs as i64;
        let value = match op {
            Operator::Add => Some(lhs + rhs),
            Operator::Sub => Some(lhs - rhs),
            Operator::Mul => Some(lhs * rhs),
            Operator::Div => lhs.checked_div(rhs),
            Operator::Rem => lhs.checked_rem(rhs),
        };
        value
            .and_then(|value| u16::try_from(value).ok())
            .ok_or_else(|| ExprError::InvalidExpression(self.to_string()))
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => write!(f, "{value}"),
            Self::Here(None) => write!(f, "$"),
            Self::Here(Some((op, value))) => write!(f, "${op}{value}"),
            Self::Label(label) => write!(f, "{label}"),
        }
    }
}
