//! A two-pass assembler for the Intel 8080.
//!
//! The first pass binds every label to its address, the second emits the
//! program image. Both passes walk the same lines with the same address
//! bookkeeping, so forward references resolve to the addresses the first
//! pass recorded.

pub mod assembler;
pub mod expr;
pub mod fileman;
pub mod lexer;
pub mod module;
pub mod symtab;

pub use assembler::{Assembler, AssemblerError, ErrorKind};
pub use module::Module;

pub fn assemble<S: AsRef<str>>(lines: &[S]) -> Result<Module, AssemblerError> {
    Assembler::new().assemble(lines)
}
