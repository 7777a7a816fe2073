//! Disassembler for Intel 8080 machine code.

use std::{
    fmt::{self, Display, Formatter},
    iter::FusedIterator,
};

use tracing::trace;

pub mod opcodes;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Instruction<'a> {
    address: usize,
    bytes: &'a [u8],
    mnemonic: &'static str,
}

impl<'a> Instruction<'a> {
    #[inline]
    pub fn address(&self) -> usize {
        self.address
    }

    #[inline]
    pub fn opcode(&self) -> u8 {
        self.bytes[0]
    }

    #[inline]
    pub fn args(&self) -> &'a [u8] {
        &self.bytes[1..]
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn mnemonic(&self) -> &'static str {
        self.mnemonic
    }

    /// The operand as it would be written in source, most significant byte first.
    pub fn operand(&self) -> Option<String> {
        match self.args() {
            [] => None,
            [value] => Some(format!("{value:02x}h")),
            [lo, hi] => Some(format!("{hi:02x}{lo:02x}h")),
            _ => None,
        }
    }

    pub fn text(&self) -> String {
        match self.operand() {
            Some(operand) => format!("{} {operand}", self.mnemonic),
            None => self.mnemonic.to_string(),
        }
    }
}

impl<'a> Display for Instruction<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let bytes = self
            .bytes
            .iter()
            .map(|byte| format!("{byte:02x}"))
            .collect::<Vec<_>>()
            .join(" ");
        write!(f, "{:04x}   {bytes:<8}   {}", self.address, self.text())
    }
}

/// Lazily decodes an image from its first byte. The image is only borrowed,
/// so the same bytes can be decoded again from the start at any time.
#[derive(Clone, Debug)]
pub struct Disassembly<'a> {
    data: &'a [u8],
    cursor: usize,
}

impl<'a> Iterator for Disassembly<'a> {
    type Item = Instruction<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let opcode = *self.data.get(self.cursor)?;
        let (mnemonic, size) = opcodes::lookup(opcode);

        // A trailing instruction cut short is data, not an error
        let Some(bytes) = self.data.get(self.cursor..self.cursor + size) else {
            trace!(
                "{:04x}: {} needs {size} bytes, {} left",
                self.cursor,
                mnemonic,
                self.data.len() - self.cursor
            );
            self.cursor = self.data.len();
            return None;
        };

        let instruction = Instruction {
            address: self.cursor,
            bytes,
            mnemonic,
        };
        self.cursor += size;
        Some(instruction)
    }
}

impl<'a> FusedIterator for Disassembly<'a> {}

pub fn disassemble(data: &[u8]) -> Disassembly<'_> {
    Disassembly { data, cursor: 0 }
}
