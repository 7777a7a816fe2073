use std::fmt::Display;

use tracing::{debug, trace};

use crate::{
    expr::{self, Expr, ExprError},
    lexer::{self, DirectiveName, LexerError, OperationName, Tokens},
    module::Module,
    symtab::Symtab,
};

mod encoder;

#[cfg(test)]
mod tests;

pub use encoder::{register_offset16, register_offset8, Encoding};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[error("unknown mnemonic \"{0}\"")]
    UnknownMnemonic(String),

    #[error("invalid operands: {0}")]
    InvalidOperands(String),

    #[error("invalid register \"{0}\"")]
    InvalidRegister(String),

    #[error("invalid number \"{0}\"")]
    InvalidNumber(String),

    #[error("invalid expression \"{0}\"")]
    InvalidExpression(String),

    #[error("undefined label \"{0}\"")]
    UndefinedLabel(String),

    #[error("duplicate label \"{0}\"")]
    DuplicateLabel(String),

    #[error("invalid label \"{0}\"")]
    InvalidLabel(String),

    #[error("code extends past address FFFFh")]
    AddressOverflow,
}

impl From<LexerError> for ErrorKind {
    fn from(e: LexerError) -> Self {
        match e {
            LexerError::InvalidLabel { label } => Self::InvalidLabel(label),
            e @ LexerError::InvalidOperands { .. } => Self::InvalidOperands(e.to_string()),
        }
    }
}

impl From<ExprError> for ErrorKind {
    fn from(e: ExprError) -> Self {
        match e {
            ExprError::InvalidNumber(text) => Self::InvalidNumber(text),
            ExprError::InvalidExpression(text) => Self::InvalidExpression(text),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {kind}")]
pub struct AssemblerError {
    pub line: usize,
    pub kind: ErrorKind,
}

const ADDRESS_SPACE: usize = 0x10000;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Pass {
    One,
    Two,
}

enum Flow {
    Continue,
    End,
}

pub struct Assembler {
    symtab: Symtab,
    data: Vec<u8>,
    pass: Pass,
    /// Next address to fill. Reaches 10000h once the last cell is used.
    here: u32,
    label: Option<String>,
}

impl Default for Assembler {
    fn default() -> Self {
        Self::new()
    }
}

impl Assembler {
    pub fn new() -> Self {
        Self {
            symtab: Symtab::new(),
            data: Vec::new(),
            pass: Pass::One,
            here: 0,
            label: None,
        }
    }

    pub fn assemble<S: AsRef<str>>(mut self, lines: &[S]) -> Result<Module, AssemblerError> {
        for pass in [Pass::One, Pass::Two] {
            self.pass = pass;
            self.here = 0;
            debug!(?pass, lines = lines.len(), "starting pass");

            for (index, line) in lines.iter().enumerate() {
                match self.line(line.as_ref()) {
                    Ok(Flow::Continue) => {}
                    Ok(Flow::End) => {
                        debug!(line = index + 1, "\"end\" reached");
                        break;
                    }
                    Err(kind) => {
                        return Err(AssemblerError {
                            line: index + 1,
                            kind,
                        })
                    }
                }
            }

            debug!(
                ?pass,
                here = self.here,
                symbols = self.symtab.len(),
                bytes = self.data.len(),
                "finished pass"
            );
        }

        let Self { symtab, data, .. } = self;
        Ok(Module::new(data, symtab))
    }

    fn line(&mut self, text: &str) -> Result<Flow, ErrorKind> {
        let tokens = lexer::parse(text)?;

        self.label = match tokens.label.as_str() {
            "" => None,
            label if expr::is_identifier(label) => Some(label.to_string()),
            label => return Err(ErrorKind::InvalidLabel(label.to_string())),
        };

        if tokens.mnemonic.is_empty() {
            if tokens.operand_count() != 0 {
                return Err(ErrorKind::InvalidOperands(format!(
                    "operands without a mnemonic: \"{}\"",
                    text.trim()
                )));
            }
            self.bind_label()?;
            return Ok(Flow::Continue);
        }

        if let Some(name) = DirectiveName::parse(&tokens.mnemonic) {
            return self.directive(name, &tokens);
        }

        match OperationName::parse(&tokens.mnemonic) {
            Some(name) => {
                self.operation(name, &tokens)?;
                Ok(Flow::Continue)
            }
            None => Err(ErrorKind::UnknownMnemonic(tokens.mnemonic)),
        }
    }

    /// Binds the label of the current line (if any) to the current address.
    /// Only the first pass writes to the symbol table.
    fn bind_label(&mut self) -> Result<(), ErrorKind> {
        if let Some(label) = self.label.take() {
            if self.pass == Pass::One {
                let address = self.address()?;
                trace!("{label} = {address:04X}h");
                self.symtab.define(label, address)?;
            }
        }
        Ok(())
    }

    fn address(&self) -> Result<u16, ErrorKind> {
        u16::try_from(self.here).map_err(|_| ErrorKind::AddressOverflow)
    }

    /// The one place where instructions and data take up space. Both passes
    /// advance the address by the same amount; only the second keeps the bytes.
    fn emit(&mut self, bytes: &[u8]) -> Result<(), ErrorKind> {
        self.bind_label()?;

        if self.here as usize + bytes.len() > ADDRESS_SPACE {
            return Err(ErrorKind::AddressOverflow);
        }
        if self.pass == Pass::Two {
            trace!("{:04X}h: {bytes:02X?}", self.here);
            self.data.extend_from_slice(bytes);
        }
        self.here += bytes.len() as u32;
        Ok(())
    }

    /// Resolves a value operand. Forward references are unknown during the
    /// first pass and stand in as zero until the second.
    fn value(&self, text: &str) -> Result<u16, ErrorKind> {
        let expr = Expr::parse(text)?;
        match expr.evaluate(self.address()?, &self.symtab)? {
            Some(value) => Ok(value),
            None if self.pass == Pass::One => Ok(0),
            None => Err(ErrorKind::UndefinedLabel(expr.to_string())),
        }
    }

    /// Resolves a value operand that decides an address or a size, so it has
    /// to be known as soon as it is seen.
    fn known_value(&self, text: &str) -> Result<u16, ErrorKind> {
        let expr = Expr::parse(text)?;
        expr.evaluate(self.address()?, &self.symtab)?
            .ok_or_else(|| ErrorKind::UndefinedLabel(expr.to_string()))
    }

    fn byte(&self, text: &str) -> Result<u8, ErrorKind> {
        let value = self.value(text)?;
        u8::try_from(value).map_err(|_| {
            ErrorKind::InvalidOperands(format!("\"{text}\" ({value}) does not fit in a byte"))
        })
    }

    fn directive(&mut self, name: DirectiveName, tokens: &Tokens) -> Result<Flow, ErrorKind> {
        match name {
            DirectiveName::Org => {
                expect_operands(name, tokens, 1)?;
                self.here = expr::parse_number(&tokens.operand1)?.into();
                trace!("origin {:04X}h", self.here);
                self.bind_label()?;
            }

            DirectiveName::Equ => {
                expect_operands(name, tokens, 1)?;
                let label = self.label.take().ok_or_else(|| {
                    ErrorKind::InvalidOperands(format!("\"{name}\" without a label"))
                })?;
                if self.pass == Pass::One {
                    let value = self.known_value(&tokens.operand1)?;
                    trace!("{label} equ {value:04X}h");
                    self.symtab.define(label, value)?;
                }
            }

            DirectiveName::Db => {
                expect_operands(name, tokens, 1)?;
                let mut bytes = Vec::new();
                for arg in expr::split_arguments(&tokens.operand1) {
                    if arg.is_empty() {
                        return Err(ErrorKind::InvalidOperands(format!(
                            "empty argument in \"{name} {}\"",
                            tokens.operand1
                        )));
                    } else if expr::is_char_constant(arg) {
                        bytes.push(arg.as_bytes()[1]);
                    } else if expr::is_quote_delimited(arg) {
                        bytes.extend_from_slice(&arg.as_bytes()[1..arg.len() - 1]);
                    } else if let Expr::Label(_) = Expr::parse(arg)? {
                        // Labels take as many bytes as their value needs, which
                        // must be the same in both passes
                        let value = self.known_value(arg)?;
                        match u8::try_from(value) {
                            Ok(value) => bytes.push(value),
                            Err(_) => bytes.extend_from_slice(&value.to_le_bytes()),
                        }
                    } else {
                        bytes.push(self.byte(arg)?);
                    }
                }
                self.emit(&bytes)?;
            }

            DirectiveName::Dw => {
                expect_operands(name, tokens, 1)?;
                let value = self.value(&tokens.operand1)?;
                self.emit(&value.to_le_bytes())?;
            }

            DirectiveName::Ds => {
                expect_operands(name, tokens, 1)?;
                let size = self.known_value(&tokens.operand1)?;
                self.emit(&vec![0; size as usize])?;
            }

            DirectiveName::End => {
                if !tokens.operand2.is_empty() {
                    expect_operands(name, tokens, 1)?;
                }
                self.bind_label()?;
                return Ok(Flow::End);
            }

            DirectiveName::Name | DirectiveName::Title => {
                expect_operands(name, tokens, 1)?;
                self.bind_label()?;
            }
        }
        Ok(Flow::Continue)
    }
}

fn expect_operands(name: impl Display, tokens: &Tokens, count: usize) -> Result<(), ErrorKind> {
    let found = tokens.operand_count();
    if found == count {
        return Ok(());
    }
    let plural = if count == 1 { "" } else { "s" };
    Err(ErrorKind::InvalidOperands(format!(
        "\"{name}\" takes {count} operand{plural}, found {found}"
    )))
}
