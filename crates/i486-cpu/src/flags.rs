//! EFLAGS bit positions and accessors.

use crate::state::CpuState;

pub const EFLAGS_CF: u32 = 1 << 0;
pub const EFLAGS_PF: u32 = 1 << 2;
pub const EFLAGS_AF: u32 = 1 << 4;
pub const EFLAGS_ZF: u32 = 1 << 6;
pub const EFLAGS_SF: u32 = 1 << 7;
pub const EFLAGS_TF: u32 = 1 << 8;
pub const EFLAGS_IF: u32 = 1 << 9;
pub const EFLAGS_DF: u32 = 1 << 10;
pub const EFLAGS_OF: u32 = 1 << 11;
pub const EFLAGS_IOPL_MASK: u32 = 0b11 << 12;
pub const EFLAGS_IOPL_SHIFT: u32 = 12;
pub const EFLAGS_NT: u32 = 1 << 14;
pub const EFLAGS_RF: u32 = 1 << 16;
pub const EFLAGS_VM: u32 = 1 << 17;
pub const EFLAGS_AC: u32 = 1 << 18;

/// PF is set when the low byte of a result has an even number of set bits.
pub fn parity(low_byte: u8) -> bool {
    low_byte.count_ones() % 2 == 0
}

macro_rules! flag_accessors {
    ($($get:ident, $set:ident, $bit:expr;)*) => {
        $(
            pub fn $get(&self) -> bool {
                self.eflags & $bit != 0
            }

            pub fn $set(&mut self, value: bool) {
                if value {
                    self.eflags |= $bit;
                } else {
                    self.eflags &= !$bit;
                }
            }
        )*
    };
}

impl CpuState {
    flag_accessors! {
        cf, set_cf, EFLAGS_CF;
        pf, set_pf, EFLAGS_PF;
        af, set_af, EFLAGS_AF;
        zf, set_zf, EFLAGS_ZF;
        sf, set_sf, EFLAGS_SF;
        tf, set_tf, EFLAGS_TF;
        if_flag, set_if, EFLAGS_IF;
        df, set_df, EFLAGS_DF;
        of, set_of, EFLAGS_OF;
        nt, set_nt, EFLAGS_NT;
        rf, set_rf, EFLAGS_RF;
        vm, set_vm, EFLAGS_VM;
        ac, set_ac, EFLAGS_AC;
    }

    pub fn iopl(&self) -> u8 {
        ((self.eflags & EFLAGS_IOPL_MASK) >> EFLAGS_IOPL_SHIFT) as u8
    }

    pub fn set_iopl(&mut self, level: u8) {
        self.eflags &= !EFLAGS_IOPL_MASK;
        self.eflags |= ((level as u32) << EFLAGS_IOPL_SHIFT) & EFLAGS_IOPL_MASK;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parity_counts_low_byte_bits() {
        assert!(parity(0x00));
        assert!(parity(0x03));
        assert!(parity(0xFF));
        assert!(!parity(0x01));
        assert!(!parity(0x07));
    }

    #[test]
    fn flag_set_clear_leaves_other_bits() {
        let mut cpu = CpuState::default();
        let before = cpu.eflags;
        cpu.set_cf(true);
        cpu.set_of(true);
        assert!(cpu.cf());
        assert!(cpu.of());
        cpu.set_cf(false);
        cpu.set_of(false);
        assert_eq!(cpu.eflags, before);
    }

    #[test]
    fn iopl_is_two_bits() {
        let mut cpu = CpuState::default();
        cpu.set_iopl(3);
        assert_eq!(cpu.iopl(), 3);
        cpu.set_iopl(1);
        assert_eq!(cpu.iopl(), 1);
        assert_eq!(cpu.eflags & !EFLAGS_IOPL_MASK, CpuState::default().eflags);
    }
}
