//! Push/Pop honoring the current stack addressing size.

use i486_mem::MemoryBus;

use crate::regs::Gpr;
use crate::segments::{fetch_byte, store_byte};
use crate::state::{CpuState, SegReg};

impl CpuState {
    /// 16 in real mode, otherwise the resolved address size of SS.
    pub fn stack_addressing_size(&self) -> u8 {
        if self.is_in_real_mode() {
            16
        } else {
            self.seg(SegReg::Ss).address_size
        }
    }

    /// Push a 16- or 32-bit value. Operand size is independent of the stack
    /// addressing size: a 16-bit stack pointer wraps modulo 65536 after the
    /// adjustment, a 32-bit one wraps naturally.
    pub fn push<M: MemoryBus>(&mut self, mem: &mut M, operand_size: u8, value: u32) {
        let ss = *self.seg(SegReg::Ss);
        let bytes = if operand_size == 16 { 2u32 } else { 4 };
        if self.stack_addressing_size() == 16 {
            let sp = (self.gpr16(Gpr::Esp) as u32).wrapping_sub(bytes) & 0xFFFF;
            for i in 0..bytes {
                store_byte(&mut *mem, &ss, sp + i, (value >> (8 * i)) as u8);
            }
            self.set_gpr16(Gpr::Esp, sp as u16);
        } else {
            let esp = self.gpr32(Gpr::Esp).wrapping_sub(bytes);
            for i in 0..bytes {
                store_byte(&mut *mem, &ss, esp.wrapping_add(i), (value >> (8 * i)) as u8);
            }
            self.set_gpr32(Gpr::Esp, esp);
        }
    }

    pub fn pop<M: MemoryBus>(&mut self, mem: &mut M, operand_size: u8) -> u32 {
        let ss = *self.seg(SegReg::Ss);
        let bytes = if operand_size == 16 { 2u32 } else { 4 };
        let mut value = 0u32;
        if self.stack_addressing_size() == 16 {
            let sp = self.gpr16(Gpr::Esp) as u32;
            for i in 0..bytes {
                value |= (fetch_byte(&mut *mem, &ss, sp + i) as u32) << (8 * i);
            }
            self.set_gpr16(Gpr::Esp, sp.wrapping_add(bytes) as u16);
        } else {
            let esp = self.gpr32(Gpr::Esp);
            for i in 0..bytes {
                value |= (fetch_byte(&mut *mem, &ss, esp.wrapping_add(i)) as u32) << (8 * i);
            }
            self.set_gpr32(Gpr::Esp, esp.wrapping_add(bytes));
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use i486_mem::VecMemory;

    #[test]
    fn push_pop_round_trip_16bit_stack() {
        let mut cpu = CpuState::default();
        let mut mem = VecMemory::new(0x40000);
        cpu.load_segment_register_real_mode(SegReg::Ss, 0x2000);
        cpu.set_gpr16(Gpr::Esp, 0x0100);

        cpu.push(&mut mem, 32, 0xDEAD_BEEF);
        assert_eq!(cpu.gpr16(Gpr::Esp), 0x00FC);
        assert_eq!(cpu.pop(&mut mem, 32), 0xDEAD_BEEF);
        assert_eq!(cpu.gpr16(Gpr::Esp), 0x0100);

        cpu.push(&mut mem, 16, 0x1234);
        assert_eq!(cpu.gpr16(Gpr::Esp), 0x00FE);
        assert_eq!(cpu.pop(&mut mem, 16), 0x1234);
        assert_eq!(cpu.gpr16(Gpr::Esp), 0x0100);
    }

    #[test]
    fn sixteen_bit_pointer_wraps_modulo_65536() {
        let mut cpu = CpuState::default();
        let mut mem = VecMemory::new(0x40000);
        cpu.load_segment_register_real_mode(SegReg::Ss, 0x2000);
        cpu.set_gpr16(Gpr::Esp, 0x0000);

        cpu.push(&mut mem, 16, 0xBEEF);
        assert_eq!(cpu.gpr16(Gpr::Esp), 0xFFFE);
        assert_eq!(cpu.pop(&mut mem, 16), 0xBEEF);
        assert_eq!(cpu.gpr16(Gpr::Esp), 0x0000);
    }

    #[test]
    fn esp_preserves_high_bits_under_16bit_addressing() {
        let mut cpu = CpuState::default();
        let mut mem = VecMemory::new(0x40000);
        cpu.load_segment_register_real_mode(SegReg::Ss, 0x2000);
        cpu.set_gpr32(Gpr::Esp, 0xAAAA_0100);

        cpu.push(&mut mem, 16, 0x5555);
        assert_eq!(cpu.gpr32(Gpr::Esp), 0xAAAA_00FE);
    }

    #[test]
    fn thirty_two_bit_stack_uses_full_esp() {
        let mut cpu = CpuState::default();
        let mut mem = VecMemory::new(0x40000);
        // Protected-mode-style 32-bit SS without going through a GDT.
        cpu.cr[0] |= crate::state::CR0_PE;
        *cpu.seg_mut(SegReg::Ss) = crate::state::SegmentRegister {
            selector: 0x10,
            base: 0,
            limit: 0xFFFF_FFFF,
            address_size: 32,
            operand_size: 32,
        };
        cpu.set_gpr32(Gpr::Esp, 0x0002_0000);

        cpu.push(&mut mem, 32, 0xCAFE_F00D);
        assert_eq!(cpu.gpr32(Gpr::Esp), 0x0001_FFFC);
        assert_eq!(mem.read_u32(0x0001_FFFC), 0xCAFE_F00D);
        assert_eq!(cpu.pop(&mut mem, 32), 0xCAFE_F00D);
        assert_eq!(cpu.gpr32(Gpr::Esp), 0x0002_0000);
    }
}
