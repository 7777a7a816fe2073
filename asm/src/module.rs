use std::io::{self, Write};

use crate::symtab::Symtab;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Module {
    data: Vec<u8>,
    symtab: Symtab,
}

impl Module {
    #[inline]
    pub fn new(data: Vec<u8>, symtab: Symtab) -> Self {
        Self { data, symtab }
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn symtab(&self) -> &Symtab {
        &self.symtab
    }

    pub fn write(&self, writer: &mut dyn Write) -> io::Result<()> {
        writer.write_all(&self.data)
    }

    /// Writes one `AAAA NAME` line per symbol and returns how many were written.
    /// Names are uppercased and cut to 16 characters.
    pub fn write_symbols(&self, writer: &mut dyn Write) -> io::Result<usize> {
        let symbols = self.symtab.sorted();
        for (name, value) in &symbols {
            let name: String = name.chars().take(16).collect();
            writeln!(writer, "{value:04X} {}", name.to_ascii_uppercase())?;
        }
        Ok(symbols.len())
    }
}
