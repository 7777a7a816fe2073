use std::fmt::{self, Display, Formatter};

use crate::expr;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LexerError {
    #[error("invalid label: `{label}`")]
    InvalidLabel { label: String },

    #[error("unexpected operand after \"{mnemonic}\": `{operand}`")]
    InvalidOperands { mnemonic: String, operand: String },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum OperationName {
    Aci,
    Adc,
    Add,
    Adi,
    Ana,
    Ani,
    Call,
    Cc,
    Cm,
    Cma,
    Cmc,
    Cmp,
    Cnc,
    Cnz,
    Cp,
    Cpe,
    Cpi,
    Cpo,
    Cz,
    Daa,
    Dad,
    Dcr,
    Dcx,
    Di,
    Ei,
    Hlt,
    In,
    Inr,
    Inx,
    Jc,
    Jm,
    Jmp,
    Jnc,
    Jnz,
    Jp,
    Jpe,
    Jpo,
    Jz,
    Lda,
    Ldax,
    Lhld,
    Lxi,
    Mov,
    Mvi,
    Nop,
    Ora,
    Ori,
    Out,
    Pchl,
    Pop,
    Push,
    Ral,
    Rar,
    Rc,
    Ret,
    Rlc,
    Rm,
    Rnc,
    Rnz,
    Rp,
    Rpe,
    Rpo,
    Rrc,
    Rst,
    Rz,
    Sbb,
    Sbi,
    Shld,
    Sphl,
    Sta,
    Stax,
    Stc,
    Sub,
    Sui,
    Xchg,
    Xra,
    Xri,
    Xthl,
}

impl OperationName {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "aci" => Some(Self::Aci),
            "adc" => Some(Self::Adc),
            "add" => Some(Self::Add),
            "adi" => Some(Self::Adi),
            "ana" => Some(Self::Ana),
            "ani" => Some(Self::Ani),
            "call" => Some(Self::Call),
            "cc" => Some(Self::Cc),
            "cm" => Some(Self::Cm),
            "cma" => Some(Self::Cma),
            "cmc" => Some(Self::Cmc),
            "cmp" => Some(Self::Cmp),
            "cnc" => Some(Self::Cnc),
            "cnz" => Some(Self::Cnz),
            "cp" => Some(Self::Cp),
            "cpe" => Some(Self::Cpe),
            "cpi" => Some(Self::Cpi),
            "cpo" => Some(Self::Cpo),
            "cz" => Some(Self::Cz),
            "daa" => Some(Self::Daa),
            "dad" => Some(Self::Dad),
            "dcr" => Some(Self::Dcr),
            "dcx" => Some(Self::Dcx),
            "di" => Some(Self::Di),
            "ei" => Some(Self::Ei),
            "hlt" => Some(Self::Hlt),
            "in" => Some(Self::In),
            "inr" => Some(Self::Inr),
            "inx" => Some(Self::Inx),
            "jc" => Some(Self::Jc),
            "jm" => Some(Self::Jm),
            "jmp" => Some(Self::Jmp),
            "jnc" => Some(Self::Jnc),
            "jnz" => Some(Self::Jnz),
            "jp" => Some(Self::Jp),
            "jpe" => Some(Self::Jpe),
            "jpo" => Some(Self::Jpo),
            "jz" => Some(Self::Jz),
            "lda" => Some(Self::Lda),
            "ldax" => Some(Self::Ldax),
            "lhld" => Some(Self::Lhld),
            "lxi" => Some(Self::Lxi),
            "mov" => Some(Self::Mov),
            "mvi" => Some(Self::Mvi),
            "nop" => Some(Self::Nop),
            "ora" => Some(Self::Ora),
            "ori" => Some(Self::Ori),
            "out" => Some(Self::Out),
            "pchl" => Some(Self::Pchl),
            "pop" => Some(Self::Pop),
            "push" => Some(Self::Push),
            "ral" => Some(Self::Ral),
            "rar" => Some(Self::Rar),
            "rc" => Some(Self::Rc),
            "ret" => Some(Self::Ret),
            "rlc" => Some(Self::Rlc),
            "rm" => Some(Self::Rm),
            "rnc" => Some(Self::Rnc),
            "rnz" => Some(Self::Rnz),
            "rp" => Some(Self::Rp),
            "rpe" => Some(Self::Rpe),
            "rpo" => Some(Self::Rpo),
            "rrc" => Some(Self::Rrc),
            "rst" => Some(Self::Rst),
            "rz" => Some(Self::Rz),
            "sbb" => Some(Self::Sbb),
            "sbi" => Some(Self::Sbi),
            "shld" => Some(Self::Shld),
            "sphl" => Some(Self::Sphl),
            "sta" => Some(Self::Sta),
            "stax" => Some(Self::Stax),
            "stc" => Some(Self::Stc),
            "sub" => Some(Self::Sub),
            "sui" => Some(Self::Sui),
            "xchg" => Some(Self::Xchg),
            "xra" => Some(Self::Xra),
            "xri" => Some(Self::Xri),
            "xthl" => Some(Self::Xthl),
            _ => None,
        }
    }
}

impl Display for OperationName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        // Debug names are the mnemonics with a capital first letter
        let name = format!("{self:?}").to_ascii_lowercase();
        write!(f, "{name}")
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DirectiveName {
    Org,
    Equ,
    Db,
    Dw,
    Ds,
    End,
    Name,
    Title,
}

impl DirectiveName {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "org" => Some(Self::Org),
            "equ" => Some(Self::Equ),
            "db" => Some(Self::Db),
            "dw" => Some(Self::Dw),
            "ds" => Some(Self::Ds),
            "end" => Some(Self::End),
            "name" => Some(Self::Name),
            "title" => Some(Self::Title),
            _ => None,
        }
    }
}

impl Display for DirectiveName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Org => "org",
                Self::Equ => "equ",
                Self::Db => "db",
                Self::Dw => "dw",
                Self::Ds => "ds",
                Self::End => "end",
                Self::Name => "name",
                Self::Title => "title",
            }
        )
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RegisterName {
    B,
    C,
    D,
    E,
    H,
    L,
    M,
    A,
}

impl RegisterName {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "b" | "B" => Some(Self::B),
            "c" | "C" => Some(Self::C),
            "d" | "D" => Some(Self::D),
            "e" | "E" => Some(Self::E),
            "h" | "H" => Some(Self::H),
            "l" | "L" => Some(Self::L),
            "m" | "M" => Some(Self::M),
            "a" | "A" => Some(Self::A),
            _ => None,
        }
    }

    #[inline]
    pub fn offset(self) -> u8 {
        self as u8
    }
}

impl Display for RegisterName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::B => "b",
                Self::C => "c",
                Self::D => "d",
                Self::E => "e",
                Self::H => "h",
                Self::L => "l",
                Self::M => "m",
                Self::A => "a",
            }
        )
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PairName {
    BC,
    DE,
    HL,
    SP,
    PSW,
}

impl PairName {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "b" | "B" | "bc" | "BC" => Some(Self::BC),
            "d" | "D" | "de" | "DE" => Some(Self::DE),
            "h" | "H" | "hl" | "HL" => Some(Self::HL),
            "sp" | "SP" => Some(Self::SP),
            "psw" | "PSW" => Some(Self::PSW),
            _ => None,
        }
    }

    /// Register pair field, already shifted into bits 4..5 of the opcode.
    /// `sp` and `psw` share the same encoding.
    #[inline]
    pub fn offset(self) -> u8 {
        match self {
            Self::BC => 0x00,
            Self::DE => 0x10,
            Self::HL => 0x20,
            Self::SP | Self::PSW => 0x30,
        }
    }
}

impl Display for PairName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::BC => "b",
                Self::DE => "d",
                Self::HL => "h",
                Self::SP => "sp",
                Self::PSW => "psw",
            }
        )
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Tokens {
    pub label: String,
    pub mnemonic: String,
    pub operand1: String,
    pub operand2: String,
    pub comment: String,
}

impl Tokens {
    fn new(label: &str, mnemonic: &str, operand1: &str, operand2: &str, comment: &str) -> Self {
        Self {
            label: label.trim().to_ascii_lowercase(),
            mnemonic: mnemonic.trim().to_ascii_lowercase(),
            operand1: operand1.trim().to_string(),
            operand2: operand2.trim().to_string(),
            comment: comment.trim().to_string(),
        }
    }

    /// Number of operands present, counting an `operand2` without an `operand1`
    /// as two so that it never passes an arity check.
    #[inline]
    pub fn operand_count(&self) -> usize {
        match (self.operand1.is_empty(), self.operand2.is_empty()) {
            (true, true) => 0,
            (false, true) => 1,
            _ => 2,
        }
    }
}

/// Splits one raw source line into label, mnemonic, operands and comment.
///
/// The line is peeled from the right: comment first, then the second operand
/// at the last comma, the first operand at the last space and finally the
/// label at the last colon. `db` and `title` keep their argument text unsplit
/// and `equ` takes everything to its left as the label.
pub fn parse(line: &str) -> Result<Tokens, LexerError> {
    let line = line.replace('\t', " ");
    let (rest, comment) = split_comment(line.trim_start());
    let rest = rest.trim();

    if let Some((label, mnemonic, args)) = raw_arguments(rest)? {
        return Ok(Tokens::new(label, mnemonic, args, "", comment));
    }

    if let Some((label, args)) = equate(rest)? {
        return Ok(Tokens::new(label, "equ", args, "", comment));
    }

    let (rest, operand2) = match rsplit_unquoted(rest, ',') {
        Some((rest, operand2)) => (rest.trim(), operand2),
        None => (rest, ""),
    };
    let (rest, operand1) = match rsplit_unquoted(rest, ' ') {
        Some((rest, operand1)) => (rest.trim(), operand1),
        None => ("", rest),
    };
    let (label, mnemonic) = match rest.rsplit_once(':') {
        Some((label, mnemonic)) => (label, mnemonic),
        None => ("", rest),
    };

    // With no space in the line the single word was taken as the first
    // operand; it can only be a mnemonic or a `label:` definition.
    let (label, mnemonic, operand1) = if mnemonic.trim().is_empty() && label.is_empty() {
        match operand1.rsplit_once(':') {
            Some((label, mnemonic)) => (label, mnemonic, ""),
            None if operand2.is_empty() => ("", operand1, ""),
            None => ("", "", operand1),
        }
    } else if mnemonic.trim().is_empty() && operand2.is_empty() {
        (label, operand1, "")
    } else {
        (label, mnemonic, operand1)
    };

    Ok(Tokens::new(label, mnemonic, operand1, operand2, comment))
}

/// Byte offsets of `separator` outside of quoted strings.
fn unquoted(text: &str, separator: char) -> impl Iterator<Item = usize> + '_ {
    let mut quote = None;
    text.char_indices().filter_map(move |(index, c)| {
        match (quote, c) {
            (None, c) if c == separator => return Some(index),
            (None, '\'' | '"') => quote = Some(c),
            (Some(q), c) if q == c => quote = None,
            _ => {}
        }
        None
    })
}

fn split_unquoted(text: &str, separator: char) -> (&str, &str) {
    match unquoted(text, separator).next() {
        Some(index) => (&text[..index], &text[index + 1..]),
        None => (text, ""),
    }
}

fn rsplit_unquoted(text: &str, separator: char) -> Option<(&str, &str)> {
    let index = unquoted(text, separator).last()?;
    Some((&text[..index], &text[index + 1..]))
}

fn split_comment(line: &str) -> (&str, &str) {
    split_unquoted(line, ';')
}

fn is_reserved(word: &str) -> bool {
    let word = word.to_ascii_lowercase();
    OperationName::parse(&word).is_some() || DirectiveName::parse(&word).is_some()
}

#[inline]
fn split_word(text: &str) -> (&str, &str) {
    let text = text.trim_start();
    match text.find(' ') {
        Some(index) => (&text[..index], text[index..].trim_start()),
        None => (text, ""),
    }
}

fn raw_arguments(rest: &str) -> Result<Option<(&str, &'static str, &str)>, LexerError> {
    fn raw_directive(word: &str) -> Option<&'static str> {
        if word.eq_ignore_ascii_case("db") {
            Some("db")
        } else if word.eq_ignore_ascii_case("title") {
            Some("title")
        } else {
            None
        }
    }

    let (first, tail) = split_word(rest);
    if let Some(mnemonic) = raw_directive(first) {
        return Ok(Some(("", mnemonic, tail)));
    }

    if is_reserved(first) {
        return Ok(None);
    }

    let (second, args) = split_word(tail);
    match raw_directive(second) {
        Some(mnemonic) => match first.strip_suffix(':') {
            Some(label) if expr::is_identifier(label) => Ok(Some((label, mnemonic, args))),
            _ => Err(LexerError::InvalidLabel {
                label: first.to_string(),
            }),
        },
        None => Ok(None),
    }
}

/// `name equ value`, with an optional colon after the name.
fn equate(rest: &str) -> Result<Option<(&str, &str)>, LexerError> {
    if is_reserved(split_word(rest).0) {
        return Ok(None);
    }

    let mut search = rest;
    let mut offset = 0;
    loop {
        let (word, tail) = split_word(search);
        if word.is_empty() {
            return Ok(None);
        }
        if word.eq_ignore_ascii_case("equ") {
            let start = offset + (search.len() - search.trim_start().len());
            let label = rest[..start].trim();
            let label = label.strip_suffix(':').unwrap_or(label).trim_end();
            if label.contains(' ') {
                return Err(LexerError::InvalidLabel {
                    label: label.to_string(),
                });
            }
            let (_, comma) = split_unquoted(tail, ',');
            if !comma.is_empty() {
                return Err(LexerError::InvalidOperands {
                    mnemonic: "equ".to_string(),
                    operand: comma.trim().to_string(),
                });
            }
            return Ok(Some((label, tail)));
        }
        offset += search.len() - tail.len();
        search = tail;
    }
}
