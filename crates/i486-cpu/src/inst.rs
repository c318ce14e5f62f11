//! The decoder-facing instruction type and its textual rendering.

use std::fmt;

use crate::operand::Operand;
use crate::rep::RepPrefix;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mnemonic {
    Mov,
    Add,
    Adc,
    Sub,
    Sbb,
    And,
    Or,
    Xor,
    Inc,
    Dec,
    Shl,
    Shr,
    Push,
    Pop,
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Mnemonic::Mov => "MOV",
            Mnemonic::Add => "ADD",
            Mnemonic::Adc => "ADC",
            Mnemonic::Sub => "SUB",
            Mnemonic::Sbb => "SBB",
            Mnemonic::And => "AND",
            Mnemonic::Or => "OR",
            Mnemonic::Xor => "XOR",
            Mnemonic::Inc => "INC",
            Mnemonic::Dec => "DEC",
            Mnemonic::Shl => "SHL",
            Mnemonic::Shr => "SHR",
            Mnemonic::Push => "PUSH",
            Mnemonic::Pop => "POP",
        };
        f.write_str(s)
    }
}

/// One decoded instruction. Produced by the external decoder, consumed
/// read-only by the engine and the disassembly listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub mnemonic: Mnemonic,
    pub operands: Vec<Operand>,
    /// Encoded length in bytes.
    pub num_bytes: u32,
    pub address_size: u8,
    pub operand_size: u8,
    pub rep: RepPrefix,
}

impl Instruction {
    /// Mnemonic and operand text, e.g. `MOV     EAX,[EBX+4H]`.
    pub fn text(&self) -> String {
        let mut s = match self.rep {
            RepPrefix::None => String::new(),
            RepPrefix::Rep => "REP ".to_string(),
            RepPrefix::RepNe => "REPNE ".to_string(),
        };
        s += &format!("{:<8}", self.mnemonic.to_string());
        for (i, op) in self.operands.iter().enumerate() {
            if i > 0 {
                s.push(',');
            }
            s += &op.to_string();
        }
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regs::Reg;

    #[test]
    fn text_rendering() {
        let inst = Instruction {
            mnemonic: Mnemonic::Mov,
            operands: vec![Operand::Reg(Reg::Eax), Operand::Imm32(0x12)],
            num_bytes: 5,
            address_size: 32,
            operand_size: 32,
            rep: RepPrefix::None,
        };
        assert_eq!(inst.text(), "MOV     EAX,00000012H");

        let inst = Instruction {
            mnemonic: Mnemonic::Inc,
            operands: vec![Operand::Reg(Reg::Bx)],
            num_bytes: 1,
            address_size: 16,
            operand_size: 16,
            rep: RepPrefix::None,
        };
        assert_eq!(inst.text(), "INC     BX");
    }
}
