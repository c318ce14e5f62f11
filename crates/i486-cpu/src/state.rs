//! Architectural processor state and size-polymorphic register access.

use crate::regs::{Gpr, Reg};

pub const CR0_PE: u32 = 1 << 0;

// Power-on defaults (i486 hardware reference, table of reset values).
pub const RESET_EFLAGS: u32 = 0x0000_0002;
pub const RESET_EIP: u32 = 0x0000_FFF0;
pub const RESET_CS: u16 = 0xF000;
// At reset CS descrambles to the top of the address space, not selector<<4.
pub const RESET_CS_BASE: u32 = 0xFFFF_0000;
pub const RESET_IDTR_BASE: u32 = 0;
pub const RESET_IDTR_LIMIT: u16 = 0x03FF;
pub const RESET_DX: u16 = 0x0400;
pub const RESET_CR0: u32 = 0x6000_0010;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegReg {
    Es = 0,
    Cs = 1,
    Ss = 2,
    Ds = 3,
    Fs = 4,
    Gs = 5,
}

/// A segment register together with its resolved shadow state. The shadow
/// fields are always consistent with the most recently loaded selector and
/// the mode that was active at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentRegister {
    pub selector: u16,
    pub base: u32,
    pub limit: u32,
    /// 16 or 32.
    pub address_size: u8,
    /// 16 or 32.
    pub operand_size: u8,
}

impl SegmentRegister {
    pub fn null() -> Self {
        Self {
            selector: 0,
            base: 0,
            limit: 0xFFFF,
            address_size: 16,
            operand_size: 16,
        }
    }
}

/// GDTR/IDTR/LDTR image: linear base plus limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DescriptorTableReg {
    pub base: u32,
    pub limit: u16,
}

/// TR0-TR7 test registers as exposed to the debugger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SystemSegmentRegister {
    pub base: u32,
    pub limit: u16,
    pub selector: u16,
    pub attrib: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpuState {
    gprs: [u32; 8],
    pub eip: u32,
    pub eflags: u32,

    sregs: [SegmentRegister; 6],

    pub gdtr: DescriptorTableReg,
    pub idtr: DescriptorTableReg,
    pub ldtr: DescriptorTableReg,
    pub tr: [SystemSegmentRegister; 8],

    pub cr: [u32; 4],
    pub dr: [u32; 8],

    pub halted: bool,
    /// MOV-SS interrupt shadow: interrupts are held for one instruction
    /// after a stack-segment load.
    pub hold_irq: bool,
    pub exception: bool,
}

impl Default for CpuState {
    fn default() -> Self {
        let mut cpu = Self {
            gprs: [0; 8],
            eip: 0,
            eflags: RESET_EFLAGS,
            sregs: [SegmentRegister::null(); 6],
            gdtr: DescriptorTableReg::default(),
            idtr: DescriptorTableReg::default(),
            ldtr: DescriptorTableReg::default(),
            tr: [SystemSegmentRegister::default(); 8],
            cr: [0; 4],
            dr: [0; 8],
            halted: false,
            hold_irq: false,
            exception: false,
        };
        cpu.reset();
        cpu
    }
}

impl CpuState {
    /// Power-on / hardware reset.
    pub fn reset(&mut self) {
        self.eflags = RESET_EFLAGS;

        self.eip = RESET_EIP;
        self.sregs[SegReg::Cs as usize] = SegmentRegister {
            selector: RESET_CS,
            base: RESET_CS_BASE,
            limit: 0xFFFF,
            address_size: 16,
            operand_size: 16,
        };
        self.load_segment_register_real_mode(SegReg::Ds, 0);
        self.load_segment_register_real_mode(SegReg::Ss, 0);
        self.load_segment_register_real_mode(SegReg::Es, 0);
        self.load_segment_register_real_mode(SegReg::Fs, 0);
        self.load_segment_register_real_mode(SegReg::Gs, 0);

        self.gdtr = DescriptorTableReg::default();
        self.ldtr = DescriptorTableReg::default();
        self.idtr = DescriptorTableReg {
            base: RESET_IDTR_BASE,
            limit: RESET_IDTR_LIMIT,
        };
        self.tr = [SystemSegmentRegister::default(); 8];

        self.gprs = [0; 8];
        self.set_gpr16(Gpr::Edx, RESET_DX);
        self.cr = [0; 4];
        self.cr[0] = RESET_CR0;
        self.dr = [0; 8];

        self.halted = false;
        // Loading SS above armed the interrupt shadow; reset discards it.
        self.hold_irq = false;
        self.exception = false;
    }

    pub fn is_in_real_mode(&self) -> bool {
        self.cr[0] & CR0_PE == 0
    }

    pub fn seg(&self, reg: SegReg) -> &SegmentRegister {
        &self.sregs[reg as usize]
    }

    pub fn seg_mut(&mut self, reg: SegReg) -> &mut SegmentRegister {
        &mut self.sregs[reg as usize]
    }

    pub fn gpr32(&self, reg: Gpr) -> u32 {
        self.gprs[reg as usize]
    }

    pub fn set_gpr32(&mut self, reg: Gpr, value: u32) {
        self.gprs[reg as usize] = value;
    }

    pub fn gpr16(&self, reg: Gpr) -> u16 {
        self.gprs[reg as usize] as u16
    }

    pub fn set_gpr16(&mut self, reg: Gpr, value: u16) {
        let cell = &mut self.gprs[reg as usize];
        *cell = (*cell & 0xFFFF_0000) | value as u32;
    }

    pub fn gpr8l(&self, reg: Gpr) -> u8 {
        self.gprs[reg as usize] as u8
    }

    pub fn set_gpr8l(&mut self, reg: Gpr, value: u8) {
        let cell = &mut self.gprs[reg as usize];
        *cell = (*cell & 0xFFFF_FF00) | value as u32;
    }

    pub fn gpr8h(&self, reg: Gpr) -> u8 {
        (self.gprs[reg as usize] >> 8) as u8
    }

    pub fn set_gpr8h(&mut self, reg: Gpr, value: u8) {
        let cell = &mut self.gprs[reg as usize];
        *cell = (*cell & 0xFFFF_00FF) | ((value as u32) << 8);
    }

    /// Zero-extended value of any scalar register. Registers with no scalar
    /// value (descriptor-table and test registers, `(none)`) read as 0; this
    /// leniency lets memory-expression evaluation treat an absent base or
    /// index register uniformly.
    pub fn register_value(&self, reg: Reg) -> u32 {
        use Reg::*;
        match reg {
            Al => self.gpr8l(Gpr::Eax) as u32,
            Cl => self.gpr8l(Gpr::Ecx) as u32,
            Dl => self.gpr8l(Gpr::Edx) as u32,
            Bl => self.gpr8l(Gpr::Ebx) as u32,
            Ah => self.gpr8h(Gpr::Eax) as u32,
            Ch => self.gpr8h(Gpr::Ecx) as u32,
            Dh => self.gpr8h(Gpr::Edx) as u32,
            Bh => self.gpr8h(Gpr::Ebx) as u32,

            Ax => self.gpr16(Gpr::Eax) as u32,
            Cx => self.gpr16(Gpr::Ecx) as u32,
            Dx => self.gpr16(Gpr::Edx) as u32,
            Bx => self.gpr16(Gpr::Ebx) as u32,
            Sp => self.gpr16(Gpr::Esp) as u32,
            Bp => self.gpr16(Gpr::Ebp) as u32,
            Si => self.gpr16(Gpr::Esi) as u32,
            Di => self.gpr16(Gpr::Edi) as u32,

            Eax => self.gpr32(Gpr::Eax),
            Ecx => self.gpr32(Gpr::Ecx),
            Edx => self.gpr32(Gpr::Edx),
            Ebx => self.gpr32(Gpr::Ebx),
            Esp => self.gpr32(Gpr::Esp),
            Ebp => self.gpr32(Gpr::Ebp),
            Esi => self.gpr32(Gpr::Esi),
            Edi => self.gpr32(Gpr::Edi),

            Eip => self.eip,
            Eflags => self.eflags,

            Es => self.seg(SegReg::Es).selector as u32,
            Cs => self.seg(SegReg::Cs).selector as u32,
            Ss => self.seg(SegReg::Ss).selector as u32,
            Ds => self.seg(SegReg::Ds).selector as u32,
            Fs => self.seg(SegReg::Fs).selector as u32,
            Gs => self.seg(SegReg::Gs).selector as u32,

            Cr0 => self.cr[0],
            Cr1 => self.cr[1],
            Cr2 => self.cr[2],
            Cr3 => self.cr[3],
            Dr0 => self.dr[0],
            Dr1 => self.dr[1],
            Dr2 => self.dr[2],
            Dr3 => self.dr[3],
            Dr4 => self.dr[4],
            Dr5 => self.dr[5],
            Dr6 => self.dr[6],
            Dr7 => self.dr[7],

            None | Gdt | Ldt | Idtr => 0,
            Tr0 | Tr1 | Tr2 | Tr3 | Tr4 | Tr5 | Tr6 | Tr7 => 0,
        }
    }

    /// The repeat counter: CX under 16-bit addressing, ECX under 32-bit.
    pub fn cx_or_ecx(&self, address_size: u8) -> u32 {
        if address_size == 16 {
            self.gpr16(Gpr::Ecx) as u32
        } else {
            self.gpr32(Gpr::Ecx)
        }
    }

    pub fn set_cx_or_ecx(&mut self, address_size: u8, value: u32) {
        if address_size == 16 {
            self.set_gpr16(Gpr::Ecx, value as u16);
        } else {
            self.set_gpr32(Gpr::Ecx, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_defaults() {
        let cpu = CpuState::default();
        assert_eq!(cpu.eflags, 0x0000_0002);
        assert_eq!(cpu.eip, 0x0000_FFF0);
        assert_eq!(cpu.seg(SegReg::Cs).selector, 0xF000);
        assert_eq!(cpu.seg(SegReg::Cs).base, 0xFFFF_0000);
        assert_eq!(cpu.seg(SegReg::Ds).base, 0);
        assert_eq!(cpu.seg(SegReg::Ds).limit, 0xFFFF);
        assert_eq!(cpu.idtr.limit, 0x03FF);
        assert_eq!(cpu.gpr16(Gpr::Edx), 0x0400);
        assert_eq!(cpu.cr[0], 0x6000_0010);
        assert!(cpu.is_in_real_mode());
        assert!(!cpu.hold_irq);
        assert!(!cpu.halted);
        assert!(!cpu.exception);
    }

    #[test]
    fn sub_register_writes_preserve_siblings() {
        let mut cpu = CpuState::default();
        cpu.set_gpr32(Gpr::Eax, 0x1122_3344);
        cpu.set_gpr8l(Gpr::Eax, 0xAA);
        assert_eq!(cpu.gpr32(Gpr::Eax), 0x1122_33AA);
        cpu.set_gpr8h(Gpr::Eax, 0xBB);
        assert_eq!(cpu.gpr32(Gpr::Eax), 0x1122_BBAA);
        cpu.set_gpr16(Gpr::Eax, 0xCCDD);
        assert_eq!(cpu.gpr32(Gpr::Eax), 0x1122_CCDD);
        cpu.set_gpr32(Gpr::Eax, 0x5566_7788);
        assert_eq!(cpu.gpr32(Gpr::Eax), 0x5566_7788);
    }

    #[test]
    fn register_value_views() {
        let mut cpu = CpuState::default();
        cpu.set_gpr32(Gpr::Ebx, 0xCAFE_BABE);
        assert_eq!(cpu.register_value(Reg::Bl), 0xBE);
        assert_eq!(cpu.register_value(Reg::Bh), 0xBA);
        assert_eq!(cpu.register_value(Reg::Bx), 0xBABE);
        assert_eq!(cpu.register_value(Reg::Ebx), 0xCAFE_BABE);
        assert_eq!(cpu.register_value(Reg::Cs), 0xF000);
        // No scalar value: reads as 0.
        assert_eq!(cpu.register_value(Reg::None), 0);
        assert_eq!(cpu.register_value(Reg::Gdt), 0);
    }

    #[test]
    fn repeat_counter_views() {
        let mut cpu = CpuState::default();
        cpu.set_gpr32(Gpr::Ecx, 0x1234_5678);
        assert_eq!(cpu.cx_or_ecx(16), 0x5678);
        assert_eq!(cpu.cx_or_ecx(32), 0x1234_5678);
        cpu.set_cx_or_ecx(16, 0xAAAA);
        assert_eq!(cpu.gpr32(Gpr::Ecx), 0x1234_AAAA);
        cpu.set_cx_or_ecx(32, 7);
        assert_eq!(cpu.gpr32(Gpr::Ecx), 7);
    }
}
