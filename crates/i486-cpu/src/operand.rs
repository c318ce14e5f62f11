//! Decoded operands and the evaluate/store contract every instruction is
//! expressed through.

use std::fmt;

use i486_mem::MemoryBus;

use crate::error::{CpuError, Result};
use crate::regs::{Gpr, Reg};
use crate::segments::{fetch_byte, store_byte};
use crate::state::{CpuState, SegReg, SegmentRegister};

/// An operand as produced by the decoder. Immutable once decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Operand {
    #[default]
    Undefined,
    Reg(Reg),
    Mem {
        base: Reg,
        index: Reg,
        scale: u32,
        disp: u32,
        seg_override: Option<SegReg>,
        /// Access width in bytes.
        size: u8,
    },
    Imm8(u8),
    Imm16(u16),
    Imm32(u32),
    Far {
        selector: u16,
        offset: u32,
    },
}

impl Operand {
    /// Width in bytes of the value this operand reads or writes.
    pub fn size(&self) -> usize {
        match self {
            Operand::Undefined => 0,
            Operand::Reg(reg) => reg.size(),
            Operand::Mem { size, .. } => *size as usize,
            Operand::Imm8(_) => 1,
            Operand::Imm16(_) => 2,
            Operand::Imm32(_) => 4,
            Operand::Far { .. } => 6,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Undefined => write!(f, "(undefined)"),
            Operand::Reg(reg) => write!(f, "{reg}"),
            Operand::Mem {
                base,
                index,
                scale,
                disp,
                seg_override,
                ..
            } => {
                if let Some(seg) = seg_override {
                    let name = match seg {
                        SegReg::Es => "ES",
                        SegReg::Cs => "CS",
                        SegReg::Ss => "SS",
                        SegReg::Ds => "DS",
                        SegReg::Fs => "FS",
                        SegReg::Gs => "GS",
                    };
                    write!(f, "{name}:")?;
                }
                write!(f, "[")?;
                let mut wrote = false;
                if *base != Reg::None {
                    write!(f, "{base}")?;
                    wrote = true;
                }
                if *index != Reg::None {
                    if wrote {
                        write!(f, "+")?;
                    }
                    write!(f, "{index}")?;
                    if *scale > 1 {
                        write!(f, "*{scale}")?;
                    }
                    wrote = true;
                }
                if *disp != 0 || !wrote {
                    if wrote {
                        write!(f, "+")?;
                    }
                    write!(f, "{disp:X}H")?;
                }
                write!(f, "]")
            }
            Operand::Imm8(v) => write!(f, "{v:02X}H"),
            Operand::Imm16(v) => write!(f, "{v:04X}H"),
            Operand::Imm32(v) => write!(f, "{v:08X}H"),
            Operand::Far { selector, offset } => write!(f, "{selector:04X}:{offset:08X}"),
        }
    }
}

/// A length-tagged little-endian byte value. 1/2/4 bytes for scalar
/// registers, memory, and immediates; 6 and 10 bytes for descriptor-table
/// and test-register images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperandValue {
    pub num_bytes: usize,
    pub bytes: [u8; 10],
}

impl OperandValue {
    pub fn from_u32(num_bytes: usize, value: u32) -> Self {
        let mut bytes = [0u8; 10];
        for (i, b) in bytes.iter_mut().take(num_bytes.min(4)).enumerate() {
            *b = (value >> (8 * i)) as u8;
        }
        Self { num_bytes, bytes }
    }

    /// Assemble up to the first 4 bytes, little-endian.
    pub fn as_u32(&self) -> u32 {
        let mut value = 0u32;
        for i in 0..self.num_bytes.min(4) {
            value |= (self.bytes[i] as u32) << (8 * i);
        }
        value
    }

    pub fn as_u16(&self) -> u16 {
        self.as_u32() as u16
    }
}

impl CpuState {
    /// Segment used by a memory operand: an explicit override always wins,
    /// otherwise SS for stack-pointer-class base registers and DS for
    /// everything else.
    fn mem_segment(&self, seg_override: Option<SegReg>, base: Reg) -> SegmentRegister {
        match seg_override {
            Some(seg) => *self.seg(seg),
            None => {
                if matches!(base, Reg::Sp | Reg::Esp | Reg::Bp | Reg::Ebp) {
                    *self.seg(SegReg::Ss)
                } else {
                    *self.seg(SegReg::Ds)
                }
            }
        }
    }

    fn mem_offset(&self, base: Reg, index: Reg, scale: u32, disp: u32) -> u32 {
        self.register_value(base)
            .wrapping_add(self.register_value(index).wrapping_mul(scale))
            .wrapping_add(disp)
    }

    /// Read an operand into a raw byte value. `destination_bytes` sets the
    /// transfer width for memory operands (the width belongs to the
    /// destination of the instruction, not the address expression).
    pub fn evaluate_operand<M: MemoryBus>(
        &self,
        mem: &mut M,
        address_size: u8,
        op: &Operand,
        destination_bytes: usize,
    ) -> Result<OperandValue> {
        match *op {
            Operand::Undefined => Err(CpuError::InvalidOperand(
                "tried to evaluate an undefined operand",
            )),
            Operand::Far { .. } => Err(CpuError::InvalidOperand(
                "tried to evaluate a far address",
            )),
            Operand::Mem {
                base,
                index,
                scale,
                disp,
                seg_override,
                ..
            } => {
                let seg = self.mem_segment(seg_override, base);
                let offset = self.mem_offset(base, index, scale, disp);
                let mut value = OperandValue {
                    num_bytes: destination_bytes,
                    bytes: [0; 10],
                };
                if address_size == 16 {
                    // 16-bit addressing wraps per byte within the segment.
                    for i in 0..destination_bytes {
                        value.bytes[i] =
                            fetch_byte(mem, &seg, offset.wrapping_add(i as u32) & 0xFFFF);
                    }
                } else {
                    for i in 0..destination_bytes {
                        value.bytes[i] = fetch_byte(mem, &seg, offset.wrapping_add(i as u32));
                    }
                }
                Ok(value)
            }
            Operand::Reg(reg) => self.evaluate_register(reg),
            Operand::Imm8(v) => Ok(OperandValue::from_u32(1, v as u32)),
            Operand::Imm16(v) => Ok(OperandValue::from_u32(2, v as u32)),
            Operand::Imm32(v) => Ok(OperandValue::from_u32(4, v)),
        }
    }

    fn evaluate_register(&self, reg: Reg) -> Result<OperandValue> {
        use Reg::*;
        let value = match reg {
            None => {
                return Err(CpuError::InvalidOperand(
                    "tried to evaluate an absent register",
                ))
            }
            Gdt => descriptor_table_image(self.gdtr.base, self.gdtr.limit),
            Ldt => descriptor_table_image(self.ldtr.base, self.ldtr.limit),
            Idtr => descriptor_table_image(self.idtr.base, self.idtr.limit),
            Tr0 | Tr1 | Tr2 | Tr3 | Tr4 | Tr5 | Tr6 | Tr7 => {
                let tr = &self.tr[reg as usize - Tr0 as usize];
                let mut value = descriptor_table_image(tr.base, tr.limit);
                value.num_bytes = 10;
                value.bytes[6] = tr.selector as u8;
                value.bytes[7] = (tr.selector >> 8) as u8;
                value.bytes[8] = tr.attrib as u8;
                value.bytes[9] = (tr.attrib >> 8) as u8;
                value
            }
            _ => OperandValue::from_u32(reg.size(), self.register_value(reg)),
        };
        Ok(value)
    }

    /// Write a raw byte value through an operand. Sub-width register
    /// destinations preserve their sibling bits; segment-register
    /// destinations go through the segmentation resolver.
    pub fn store_operand_value<M: MemoryBus>(
        &mut self,
        mem: &mut M,
        address_size: u8,
        dst: &Operand,
        value: OperandValue,
    ) -> Result<()> {
        match *dst {
            Operand::Undefined => Err(CpuError::InvalidOperand(
                "tried to store through an undefined operand",
            )),
            Operand::Far { .. } => Err(CpuError::InvalidOperand(
                "tried to store through a far address",
            )),
            Operand::Imm8(_) | Operand::Imm16(_) | Operand::Imm32(_) => Err(
                CpuError::InvalidOperand("immediate value specified as a destination"),
            ),
            Operand::Mem {
                base,
                index,
                scale,
                disp,
                seg_override,
                ..
            } => {
                let seg = self.mem_segment(seg_override, base);
                let offset = self.mem_offset(base, index, scale, disp);
                if address_size == 16 {
                    for i in 0..value.num_bytes {
                        store_byte(
                            mem,
                            &seg,
                            offset.wrapping_add(i as u32) & 0xFFFF,
                            value.bytes[i],
                        );
                    }
                } else {
                    for i in 0..value.num_bytes {
                        store_byte(mem, &seg, offset.wrapping_add(i as u32), value.bytes[i]);
                    }
                }
                Ok(())
            }
            Operand::Reg(reg) => self.store_register(mem, reg, value),
        }
    }

    fn store_register<M: MemoryBus>(
        &mut self,
        mem: &mut M,
        reg: Reg,
        value: OperandValue,
    ) -> Result<()> {
        use Reg::*;
        match reg {
            Al => self.set_gpr8l(Gpr::Eax, value.bytes[0]),
            Cl => self.set_gpr8l(Gpr::Ecx, value.bytes[0]),
            Dl => self.set_gpr8l(Gpr::Edx, value.bytes[0]),
            Bl => self.set_gpr8l(Gpr::Ebx, value.bytes[0]),
            Ah => self.set_gpr8h(Gpr::Eax, value.bytes[0]),
            Ch => self.set_gpr8h(Gpr::Ecx, value.bytes[0]),
            Dh => self.set_gpr8h(Gpr::Edx, value.bytes[0]),
            Bh => self.set_gpr8h(Gpr::Ebx, value.bytes[0]),

            Ax => self.set_gpr16(Gpr::Eax, value.as_u16()),
            Cx => self.set_gpr16(Gpr::Ecx, value.as_u16()),
            Dx => self.set_gpr16(Gpr::Edx, value.as_u16()),
            Bx => self.set_gpr16(Gpr::Ebx, value.as_u16()),
            Sp => self.set_gpr16(Gpr::Esp, value.as_u16()),
            Bp => self.set_gpr16(Gpr::Ebp, value.as_u16()),
            Si => self.set_gpr16(Gpr::Esi, value.as_u16()),
            Di => self.set_gpr16(Gpr::Edi, value.as_u16()),

            Eax => self.set_gpr32(Gpr::Eax, value.as_u32()),
            Ecx => self.set_gpr32(Gpr::Ecx, value.as_u32()),
            Edx => self.set_gpr32(Gpr::Edx, value.as_u32()),
            Ebx => self.set_gpr32(Gpr::Ebx, value.as_u32()),
            Esp => self.set_gpr32(Gpr::Esp, value.as_u32()),
            Ebp => self.set_gpr32(Gpr::Ebp, value.as_u32()),
            Esi => self.set_gpr32(Gpr::Esi, value.as_u32()),
            Edi => self.set_gpr32(Gpr::Edi, value.as_u32()),

            Eip => self.eip = value.as_u32(),
            Eflags => self.eflags = value.as_u32(),

            Es => self.load_segment_register(SegReg::Es, value.as_u16(), mem)?,
            Cs => self.load_segment_register(SegReg::Cs, value.as_u16(), mem)?,
            Ss => self.load_segment_register(SegReg::Ss, value.as_u16(), mem)?,
            Ds => self.load_segment_register(SegReg::Ds, value.as_u16(), mem)?,
            Fs => self.load_segment_register(SegReg::Fs, value.as_u16(), mem)?,
            Gs => self.load_segment_register(SegReg::Gs, value.as_u16(), mem)?,

            Gdt | Ldt | Idtr | Tr0 | Tr1 | Tr2 | Tr3 | Tr4 | Tr5 | Tr6 | Tr7 => {
                return Err(CpuError::UnsupportedFeature(
                    "store to a descriptor-table or test register operand",
                ))
            }

            Cr0 => self.cr[0] = value.as_u32(),
            Cr1 => self.cr[1] = value.as_u32(),
            Cr2 => self.cr[2] = value.as_u32(),
            Cr3 => self.cr[3] = value.as_u32(),
            Dr0 => self.dr[0] = value.as_u32(),
            Dr1 => self.dr[1] = value.as_u32(),
            Dr2 => self.dr[2] = value.as_u32(),
            Dr3 => self.dr[3] = value.as_u32(),
            Dr4 => self.dr[4] = value.as_u32(),
            Dr5 => self.dr[5] = value.as_u32(),
            Dr6 => self.dr[6] = value.as_u32(),
            Dr7 => self.dr[7] = value.as_u32(),

            None => {
                return Err(CpuError::InvalidOperand(
                    "tried to store through an absent register",
                ))
            }
        }
        Ok(())
    }
}

// TODO: confirm this 6/10-byte image layout against the Intel programmer's
// reference; only the debugger evaluates these registers today.
fn descriptor_table_image(base: u32, limit: u16) -> OperandValue {
    let mut value = OperandValue {
        num_bytes: 6,
        bytes: [0; 10],
    };
    value.bytes[0] = base as u8;
    value.bytes[1] = (base >> 8) as u8;
    value.bytes[2] = (base >> 16) as u8;
    value.bytes[3] = (base >> 24) as u8;
    value.bytes[4] = limit as u8;
    value.bytes[5] = (limit >> 8) as u8;
    value
}
