//! Debugger-facing state dump and disassembly listing.
//!
//! Both formats are consumed by external tooling and are byte-stable.

use i486_mem::MemoryBus;

use crate::inst::Instruction;
use crate::regs::Gpr;
use crate::segments::fetch_byte;
use crate::state::{CpuState, SegReg, SegmentRegister};

impl CpuState {
    /// Multi-line textual dump of the architectural state.
    pub fn state_text(&self) -> Vec<String> {
        let cs = self.seg(SegReg::Cs);
        let mut text = vec![
            format!(
                "CS:EIP={:04X}:{:08X}  LINEAR:{:08X}  EFLAGS={:08X}",
                cs.selector,
                self.eip,
                cs.base.wrapping_add(self.eip),
                self.eflags
            ),
            format!(
                "EAX={:08X}  EBX={:08X}  ECX={:08X}  EDX={:08X}",
                self.gpr32(Gpr::Eax),
                self.gpr32(Gpr::Ebx),
                self.gpr32(Gpr::Ecx),
                self.gpr32(Gpr::Edx)
            ),
            format!(
                "ESI={:08X}  EDI={:08X}  EBP={:08X}  ESP={:08X}",
                self.gpr32(Gpr::Esi),
                self.gpr32(Gpr::Edi),
                self.gpr32(Gpr::Ebp),
                self.gpr32(Gpr::Esp)
            ),
            format!(
                "CR0={:08X}  CR1={:08X}  CR2={:08X}  CR3={:08X}",
                self.cr[0], self.cr[1], self.cr[2], self.cr[3]
            ),
            format!(
                "CF{}  PF{}  AF{}  ZF{}  SF{}  TF{}  IF{}  DF{}  OF{}  IOPL{:X}  NT{}  RF{}  VM{}  AC{}",
                self.cf() as u8,
                self.pf() as u8,
                self.af() as u8,
                self.zf() as u8,
                self.sf() as u8,
                self.tf() as u8,
                self.if_flag() as u8,
                self.df() as u8,
                self.of() as u8,
                self.iopl(),
                self.nt() as u8,
                self.rf() as u8,
                self.vm() as u8,
                self.ac() as u8
            ),
        ];
        if self.exception {
            text.push("!EXCEPTION!".to_string());
        }
        if self.hold_irq {
            text.push("HOLD IRQ for 1 Instruction".to_string());
        }
        text
    }

    pub fn print_state(&self) {
        for line in self.state_text() {
            println!("{line}");
        }
    }

    /// One listing line: `SSSS:OOOOOOOO <raw bytes>` padded to column 40,
    /// followed by the instruction text.
    pub fn disassemble<M: MemoryBus>(
        &self,
        mem: &mut M,
        inst: &Instruction,
        seg: &SegmentRegister,
        offset: u32,
    ) -> String {
        let mut line = format!("{:04X}:{:08X} ", seg.selector, offset);
        for i in 0..inst.num_bytes {
            line += &format!("{:02X}", fetch_byte(&mut *mem, seg, offset.wrapping_add(i)));
        }
        line.push(' ');
        while line.len() < 40 {
            line.push(' ');
        }
        line + &inst.text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inst::Mnemonic;
    use crate::operand::Operand;
    use crate::regs::Reg;
    use crate::rep::RepPrefix;
    use i486_mem::VecMemory;

    #[test]
    fn reset_state_dump_is_byte_stable() {
        let cpu = CpuState::default();
        let text = cpu.state_text();
        assert_eq!(
            text,
            vec![
                "CS:EIP=F000:0000FFF0  LINEAR:FFFFFFF0  EFLAGS=00000002".to_string(),
                "EAX=00000000  EBX=00000000  ECX=00000000  EDX=00000400".to_string(),
                "ESI=00000000  EDI=00000000  EBP=00000000  ESP=00000000".to_string(),
                "CR0=60000010  CR1=00000000  CR2=00000000  CR3=00000000".to_string(),
                "CF0  PF0  AF0  ZF0  SF0  TF0  IF0  DF0  OF0  IOPL0  NT0  RF0  VM0  AC0"
                    .to_string(),
            ]
        );
    }

    #[test]
    fn trailer_lines() {
        let mut cpu = CpuState::default();
        cpu.exception = true;
        cpu.hold_irq = true;
        let text = cpu.state_text();
        assert_eq!(text[text.len() - 2], "!EXCEPTION!");
        assert_eq!(text[text.len() - 1], "HOLD IRQ for 1 Instruction");
    }

    #[test]
    fn disassembly_line_format() {
        let cpu = CpuState::default();
        let mut mem = VecMemory::new(0x20000);
        let seg = SegmentRegister {
            selector: 0x1000,
            base: 0x1000 << 4,
            limit: 0xFFFF,
            address_size: 16,
            operand_size: 16,
        };
        mem.write_bytes(0x10000 + 0x100, &[0xB8, 0x34, 0x12]);
        let inst = Instruction {
            mnemonic: Mnemonic::Mov,
            operands: vec![Operand::Reg(Reg::Ax), Operand::Imm16(0x1234)],
            num_bytes: 3,
            address_size: 16,
            operand_size: 16,
            rep: RepPrefix::None,
        };
        let line = cpu.disassemble(&mut mem, &inst, &seg, 0x100);
        assert_eq!(&line[..40], "1000:00000100 B83412                    ");
        assert_eq!(&line[40..], "MOV     AX,1234H");
    }
}
