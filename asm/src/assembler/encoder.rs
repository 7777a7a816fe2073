use super::{expect_operands, Assembler, ErrorKind};
use crate::lexer::{OperationName, PairName, RegisterName, Tokens};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Encoding {
    Implied(u8),
    Source(u8),
    Destination(u8),
    Move,
    MoveImmediate,
    /// Register pair in bits 4..5. Stack operations take `psw` where the
    /// others take `sp`.
    Pair { base: u8, stack: bool },
    LoadPair,
    /// `ldax`/`stax`, which only address through `b` or `d`.
    Indirect(u8),
    Immediate(u8),
    Address(u8),
    Restart,
}

impl OperationName {
    pub fn encoding(self) -> Encoding {
        match self {
            Self::Aci => Encoding::Immediate(0xCE),
            Self::Adc => Encoding::Source(0x88),
            Self::Add => Encoding::Source(0x80),
            Self::Adi => Encoding::Immediate(0xC6),
            Self::Ana => Encoding::Source(0xA0),
            Self::Ani => Encoding::Immediate(0xE6),
            Self::Call => Encoding::Address(0xCD),
            Self::Cc => Encoding::Address(0xDC),
            Self::Cm => Encoding::Address(0xFC),
            Self::Cma => Encoding::Implied(0x2F),
            Self::Cmc => Encoding::Implied(0x3F),
            Self::Cmp => Encoding::Source(0xB8),
            Self::Cnc => Encoding::Address(0xD4),
            Self::Cnz => Encoding::Address(0xC4),
            Self::Cp => Encoding::Address(0xF4),
            Self::Cpe => Encoding::Address(0xEC),
            Self::Cpi => Encoding::Immediate(0xFE),
            Self::Cpo => Encoding::Address(0xE4),
            Self::Cz => Encoding::Address(0xCC),
            Self::Daa => Encoding::Implied(0x27),
            Self::Dad => Encoding::Pair {
                base: 0x09,
                stack: false,
            },
            Self::Dcr => Encoding::Destination(0x05),
            Self::Dcx => Encoding::Pair {
                base: 0x0B,
                stack: false,
            },
            Self::Di => Encoding::Implied(0xF3),
            Self::Ei => Encoding::Implied(0xFB),
            Self::Hlt => Encoding::Implied(0x76),
            Self::In => Encoding::Immediate(0xDB),
            Self::Inr => Encoding::Destination(0x04),
            Self::Inx => Encoding::Pair {
                base: 0x03,
                stack: false,
            },
            Self::Jc => Encoding::Address(0xDA),
            Self::Jm => Encoding::Address(0xFA),
            Self::Jmp => Encoding::Address(0xC3),
            Self::Jnc => Encoding::Address(0xD2),
            Self::Jnz => Encoding::Address(0xC2),
            Self::Jp => Encoding::Address(0xF2),
            Self::Jpe => Encoding::Address(0xEA),
            Self::Jpo => Encoding::Address(0xE2),
            Self::Jz => Encoding::Address(0xCA),
            Self::Lda => Encoding::Address(0x3A),
            Self::Ldax => Encoding::Indirect(0x0A),
            Self::Lhld => Encoding::Address(0x2A),
            Self::Lxi => Encoding::LoadPair,
            Self::Mov => Encoding::Move,
            Self::Mvi => Encoding::MoveImmediate,
            Self::Nop => Encoding::Implied(0x00),
            Self::Ora => Encoding::Source(0xB0),
            Self::Ori => Encoding::Immediate(0xF6),
            Self::Out => Encoding::Immediate(0xD3),
            Self::Pchl => Encoding::Implied(0xE9),
            Self::Pop => Encoding::Pair {
                base: 0xC1,
                stack: true,
            },
            Self::Push => Encoding::Pair {
                base: 0xC5,
                stack: true,
            },
            Self::Ral => Encoding::Implied(0x17),
            Self::Rar => Encoding::Implied(0x1F),
            Self::Rc => Encoding::Implied(0xD8),
            Self::Ret => Encoding::Implied(0xC9),
            Self::Rlc => Encoding::Implied(0x07),
            Self::Rm => Encoding::Implied(0xF8),
            Self::Rnc => Encoding::Implied(0xD0),
            Self::Rnz => Encoding::Implied(0xC0),
            Self::Rp => Encoding::Implied(0xF0),
            Self::Rpe => Encoding::Implied(0xE8),
            Self::Rpo => Encoding::Implied(0xE0),
            Self::Rrc => Encoding::Implied(0x0F),
            Self::Rst => Encoding::Restart,
            Self::Rz => Encoding::Implied(0xC8),
            Self::Sbb => Encoding::Source(0x98),
            Self::Sbi => Encoding::Immediate(0xDE),
            Self::Shld => Encoding::Address(0x22),
            Self::Sphl => Encoding::Implied(0xF9),
            Self::Sta => Encoding::Address(0x32),
            Self::Stax => Encoding::Indirect(0x02),
            Self::Stc => Encoding::Implied(0x37),
            Self::Sub => Encoding::Source(0x90),
            Self::Sui => Encoding::Immediate(0xD6),
            Self::Xchg => Encoding::Implied(0xEB),
            Self::Xra => Encoding::Source(0xA8),
            Self::Xri => Encoding::Immediate(0xEE),
            Self::Xthl => Encoding::Implied(0xE3),
        }
    }
}

pub fn register_offset8(text: &str) -> Result<u8, ErrorKind> {
    RegisterName::parse(text)
        .map(RegisterName::offset)
        .ok_or_else(|| ErrorKind::InvalidRegister(text.to_string()))
}

/// Register pair field. `psw` is only legal for stack operations and `sp`
/// only for the others.
pub fn register_offset16(text: &str, stack: bool) -> Result<u8, ErrorKind> {
    match PairName::parse(text) {
        Some(PairName::PSW) if !stack => Err(ErrorKind::InvalidRegister(text.to_string())),
        Some(PairName::SP) if stack => Err(ErrorKind::InvalidRegister(text.to_string())),
        Some(pair) => Ok(pair.offset()),
        None => Err(ErrorKind::InvalidRegister(text.to_string())),
    }
}

impl Assembler {
    pub(super) fn operation(
        &mut self,
        name: OperationName,
        tokens: &Tokens,
    ) -> Result<(), ErrorKind> {
        let Tokens {
            operand1, operand2, ..
        } = tokens;

        match name.encoding() {
            Encoding::Implied(opcode) => {
                expect_operands(name, tokens, 0)?;
                self.emit(&[opcode])
            }

            Encoding::Source(base) => {
                expect_operands(name, tokens, 1)?;
                let src = register_offset8(operand1)?;
                self.emit(&[base | src])
            }

            Encoding::Destination(base) => {
                expect_operands(name, tokens, 1)?;
                let dst = register_offset8(operand1)?;
                self.emit(&[base | (dst << 3)])
            }

            Encoding::Move => {
                expect_operands(name, tokens, 2)?;
                let dst = register_offset8(operand1)?;
                let src = register_offset8(operand2)?;
                // That slot is `hlt`
                if dst == RegisterName::M.offset() && src == RegisterName::M.offset() {
                    return Err(ErrorKind::InvalidOperands(format!(
                        "\"{name} {operand1}, {operand2}\" is not an instruction"
                    )));
                }
                self.emit(&[0x40 | (dst << 3) | src])
            }

            Encoding::MoveImmediate => {
                expect_operands(name, tokens, 2)?;
                let dst = register_offset8(operand1)?;
                let value = self.byte(operand2)?;
                self.emit(&[0x06 | (dst << 3), value])
            }

            Encoding::Pair { base, stack } => {
                expect_operands(name, tokens, 1)?;
                let pair = register_offset16(operand1, stack)?;
                self.emit(&[base | pair])
            }

            Encoding::LoadPair => {
                expect_operands(name, tokens, 2)?;
                let pair = register_offset16(operand1, false)?;
                let [lo, hi] = self.value(operand2)?.to_le_bytes();
                self.emit(&[0x01 | pair, lo, hi])
            }

            Encoding::Indirect(base) => {
                expect_operands(name, tokens, 1)?;
                match PairName::parse(operand1) {
                    Some(pair @ (PairName::BC | PairName::DE)) => self.emit(&[base | pair.offset()]),
                    _ => Err(ErrorKind::InvalidRegister(operand1.to_string())),
                }
            }

            Encoding::Immediate(opcode) => {
                expect_operands(name, tokens, 1)?;
                let value = self.byte(operand1)?;
                self.emit(&[opcode, value])
            }

            Encoding::Address(opcode) => {
                expect_operands(name, tokens, 1)?;
                let [lo, hi] = self.value(operand1)?.to_le_bytes();
                self.emit(&[opcode, lo, hi])
            }

            Encoding::Restart => {
                expect_operands(name, tokens, 1)?;
                let vector = match operand1.as_bytes() {
                    [digit @ b'0'..=b'7'] => digit - b'0',
                    _ => {
                        return Err(ErrorKind::InvalidOperands(format!(
                            "\"{name}\" vector must be 0 to 7, found \"{operand1}\""
                        )))
                    }
                };
                self.emit(&[0xC7 | (vector << 3)])
            }
        }
    }
}
