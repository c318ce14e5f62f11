//! Segmentation: selector loads in real and protected mode, descriptor-table
//! register parsing, and segment-relative byte access.

use i486_mem::MemoryBus;
use tracing::{debug, trace};

use crate::error::{CpuError, Result};
use crate::state::{CpuState, DescriptorTableReg, SegReg, SegmentRegister};

/// Read one byte at `seg.base + offset` (a linear address).
pub fn fetch_byte<M: MemoryBus>(mem: &mut M, seg: &SegmentRegister, offset: u32) -> u8 {
    mem.read_u8(seg.base.wrapping_add(offset))
}

/// Write one byte at `seg.base + offset`.
pub fn store_byte<M: MemoryBus>(mem: &mut M, seg: &SegmentRegister, offset: u32, value: u8) {
    mem.write_u8(seg.base.wrapping_add(offset), value);
}

/// Parse an LGDT/LIDT-style 6-byte image: limit in bytes 0-1, base in bytes
/// 2-4 (16-bit operand size) or 2-5 (32-bit operand size).
pub fn load_descriptor_table_register(
    reg: &mut DescriptorTableReg,
    operand_size: u8,
    image: &[u8; 6],
) {
    reg.limit = image[0] as u16 | ((image[1] as u16) << 8);
    reg.base = image[2] as u32 | ((image[3] as u32) << 8) | ((image[4] as u32) << 16);
    if operand_size != 16 {
        reg.base |= (image[5] as u32) << 24;
    }
    debug!(limit = format_args!("{:04X}", reg.limit), base = format_args!("{:08X}", reg.base), "descriptor table register loaded");
}

impl CpuState {
    /// Load a segment register from a selector. In real mode the base is
    /// `selector << 4`; in protected mode the selector indexes the GDT and
    /// the descriptor is fetched through `mem`. Loading SS arms the
    /// one-instruction interrupt shadow in either mode.
    pub fn load_segment_register<M: MemoryBus>(
        &mut self,
        reg: SegReg,
        selector: u16,
        mem: &mut M,
    ) -> Result<()> {
        if reg == SegReg::Ss {
            self.hold_irq = true;
        }
        if self.is_in_real_mode() {
            self.load_segment_register_real_mode(reg, selector);
            return Ok(());
        }

        let _rpl = selector & 3;
        let ti = selector & 4 != 0;
        let index = (selector >> 3) & 0x1FFF;
        if ti {
            return Err(CpuError::UnsupportedFeature(
                "segment selector through the LDT",
            ));
        }

        let desc_addr = self.gdtr.base.wrapping_add(8 * index as u32);
        let mut raw = [0u8; 8];
        mem.read_bytes(desc_addr, &mut raw);

        let mut limit = raw[0] as u32 | ((raw[1] as u32) << 8) | (((raw[6] & 0x0F) as u32) << 16);
        let base =
            raw[2] as u32 | ((raw[3] as u32) << 8) | ((raw[4] as u32) << 16) | ((raw[7] as u32) << 24);
        if raw[6] & 0x80 != 0 {
            // G=1: limit counts 4KB pages. A full 20-bit limit wraps to
            // 0xFFFFFFFF here, which is the intended flat-segment value.
            limit = (limit + 1).wrapping_mul(4096).wrapping_sub(1);
        }
        let size: u8 = if raw[6] & 0x40 != 0 { 32 } else { 16 };

        *self.seg_mut(reg) = SegmentRegister {
            selector,
            base,
            limit,
            address_size: size,
            operand_size: size,
        };
        trace!(
            ?reg,
            selector = format_args!("{selector:04X}"),
            base = format_args!("{base:08X}"),
            limit = format_args!("{limit:08X}"),
            size,
            "segment loaded from GDT"
        );
        Ok(())
    }

    pub fn load_segment_register_real_mode(&mut self, reg: SegReg, selector: u16) {
        if reg == SegReg::Ss {
            self.hold_irq = true;
        }
        *self.seg_mut(reg) = SegmentRegister {
            selector,
            base: (selector as u32) << 4,
            limit: 0xFFFF,
            address_size: 16,
            operand_size: 16,
        };
    }
}
