//! Width-tripled arithmetic, logic, and shift micro-operations.
//!
//! Every operation exists in byte/word/dword form plus a `*_word_or_dword`
//! dispatcher selected by operand size. Flag behavior per operation:
//!
//! - ADD/ADC/SUB/SBB: CF OF SF ZF AF PF
//! - AND/OR/XOR: clear CF and OF, set SF ZF PF, leave AF alone
//! - INC/DEC: OF SF ZF AF PF, never CF
//! - SHL/SHR: CF from the last bit shifted out; OF defined only for a
//!   count of exactly 1, left unmodified otherwise; a count of 0 changes
//!   nothing
//!
//! The overflow and auxiliary-carry comparisons are pre/post-value
//! heuristics carried over unchanged for guest compatibility.

use crate::flags::parity;
use crate::state::CpuState;

impl CpuState {
    pub fn add_word_or_dword(&mut self, operand_size: u8, value1: &mut u32, value2: u32) {
        if operand_size == 16 {
            self.add_word(value1, value2);
        } else {
            self.add_dword(value1, value2);
        }
    }

    pub fn add_dword(&mut self, value1: &mut u32, value2: u32) {
        let prev = *value1;
        *value1 = value1.wrapping_add(value2);
        self.set_of(prev < 0x8000_0000 && 0x8000_0000 <= *value1);
        self.set_sf(*value1 & 0x8000_0000 != 0);
        self.set_zf(*value1 == 0);
        self.set_af((prev & 0x0F) < (*value1 & 0x0F));
        self.set_cf(*value1 < prev);
        self.set_pf(parity(*value1 as u8));
    }

    pub fn add_word(&mut self, value1: &mut u32, value2: u32) {
        let prev = *value1 & 0xFFFF;
        *value1 = prev.wrapping_add(value2) & 0xFFFF;
        self.set_of(prev < 0x8000 && 0x8000 <= *value1);
        self.set_sf(*value1 & 0x8000 != 0);
        self.set_zf(*value1 == 0);
        self.set_af((prev & 0x0F) < (*value1 & 0x0F));
        self.set_cf(*value1 < prev);
        self.set_pf(parity(*value1 as u8));
    }

    pub fn add_byte(&mut self, value1: &mut u32, value2: u32) {
        let prev = *value1 & 0xFF;
        *value1 = prev.wrapping_add(value2) & 0xFF;
        self.set_of(prev < 0x80 && 0x80 <= *value1);
        self.set_sf(*value1 & 0x80 != 0);
        self.set_zf(*value1 == 0);
        self.set_af((prev & 0x0F) < (*value1 & 0x0F));
        self.set_cf(*value1 < prev);
        self.set_pf(parity(*value1 as u8));
    }

    pub fn adc_word_or_dword(&mut self, operand_size: u8, value1: &mut u32, value2: u32) {
        if operand_size == 16 {
            self.adc_word(value1, value2);
        } else {
            self.adc_dword(value1, value2);
        }
    }

    pub fn adc_dword(&mut self, value1: &mut u32, value2: u32) {
        let carry = self.cf() as u32;
        let prev = *value1;
        *value1 = value1.wrapping_add(value2).wrapping_add(carry);
        self.set_of(prev < 0x8000_0000 && 0x8000_0000 <= *value1);
        self.set_sf(*value1 & 0x8000_0000 != 0);
        self.set_zf(*value1 == 0);
        self.set_af((prev & 0x0F) < (*value1 & 0x0F));
        self.set_cf(*value1 < prev);
        self.set_pf(parity(*value1 as u8));
    }

    pub fn adc_word(&mut self, value1: &mut u32, value2: u32) {
        let carry = self.cf() as u32;
        let prev = *value1 & 0xFFFF;
        *value1 = prev.wrapping_add(value2).wrapping_add(carry) & 0xFFFF;
        self.set_of(prev < 0x8000 && 0x8000 <= *value1);
        self.set_sf(*value1 & 0x8000 != 0);
        self.set_zf(*value1 == 0);
        self.set_af((prev & 0x0F) < (*value1 & 0x0F));
        self.set_cf(*value1 < prev);
        self.set_pf(parity(*value1 as u8));
    }

    pub fn adc_byte(&mut self, value1: &mut u32, value2: u32) {
        let carry = self.cf() as u32;
        let prev = *value1 & 0xFF;
        *value1 = prev.wrapping_add(value2).wrapping_add(carry) & 0xFF;
        self.set_of(prev < 0x80 && 0x80 <= *value1);
        self.set_sf(*value1 & 0x80 != 0);
        self.set_zf(*value1 == 0);
        self.set_af((prev & 0x0F) < (*value1 & 0x0F));
        self.set_cf(*value1 < prev);
        self.set_pf(parity(*value1 as u8));
    }

    pub fn sub_word_or_dword(&mut self, operand_size: u8, value1: &mut u32, value2: u32) {
        if operand_size == 16 {
            self.sub_word(value1, value2);
        } else {
            self.sub_dword(value1, value2);
        }
    }

    pub fn sub_dword(&mut self, value1: &mut u32, value2: u32) {
        let prev = *value1;
        *value1 = value1.wrapping_sub(value2);
        self.set_of(prev >= 0x8000_0000 && 0x8000_0000 > *value1);
        self.set_sf(*value1 & 0x8000_0000 != 0);
        self.set_zf(*value1 == 0);
        self.set_af((prev & 0xFF) >= 0x10 && (*value1 & 0xFF) <= 0x10);
        self.set_cf(*value1 > prev);
        self.set_pf(parity(*value1 as u8));
    }

    pub fn sub_word(&mut self, value1: &mut u32, value2: u32) {
        let prev = *value1 & 0xFFFF;
        *value1 = prev.wrapping_sub(value2) & 0xFFFF;
        self.set_of(prev >= 0x8000 && 0x8000 > *value1);
        self.set_sf(*value1 & 0x8000 != 0);
        self.set_zf(*value1 == 0);
        self.set_af((prev & 0xFF) >= 0x10 && (*value1 & 0xFF) <= 0x10);
        self.set_cf(*value1 > prev);
        self.set_pf(parity(*value1 as u8));
    }

    pub fn sub_byte(&mut self, value1: &mut u32, value2: u32) {
        let prev = *value1 & 0xFF;
        *value1 = prev.wrapping_sub(value2) & 0xFF;
        self.set_of(prev >= 0x80 && 0x80 > *value1);
        self.set_sf(*value1 & 0x80 != 0);
        self.set_zf(*value1 == 0);
        self.set_af((prev & 0xFF) >= 0x10 && (*value1 & 0xFF) <= 0x10);
        self.set_cf(*value1 > prev);
        self.set_pf(parity(*value1 as u8));
    }

    pub fn sbb_word_or_dword(&mut self, operand_size: u8, value1: &mut u32, value2: u32) {
        if operand_size == 16 {
            self.sbb_word(value1, value2);
        } else {
            self.sbb_dword(value1, value2);
        }
    }

    pub fn sbb_dword(&mut self, value1: &mut u32, value2: u32) {
        let carry = self.cf() as u32;
        let prev = *value1;
        *value1 = value1.wrapping_sub(value2).wrapping_sub(carry);
        self.set_of(prev >= 0x8000_0000 && 0x8000_0000 > *value1);
        self.set_sf(*value1 & 0x8000_0000 != 0);
        self.set_zf(*value1 == 0);
        self.set_af((prev & 0xFF) >= 0x10 && (*value1 & 0xFF) <= 0x10);
        self.set_cf(*value1 > prev);
        self.set_pf(parity(*value1 as u8));
    }

    pub fn sbb_word(&mut self, value1: &mut u32, value2: u32) {
        let carry = self.cf() as u32;
        let prev = *value1 & 0xFFFF;
        *value1 = prev.wrapping_sub(value2).wrapping_sub(carry) & 0xFFFF;
        self.set_of(prev >= 0x8000 && 0x8000 > *value1);
        self.set_sf(*value1 & 0x8000 != 0);
        self.set_zf(*value1 == 0);
        self.set_af((prev & 0xFF) >= 0x10 && (*value1 & 0xFF) <= 0x10);
        self.set_cf(*value1 > prev);
        self.set_pf(parity(*value1 as u8));
    }

    pub fn sbb_byte(&mut self, value1: &mut u32, value2: u32) {
        let carry = self.cf() as u32;
        let prev = *value1 & 0xFF;
        *value1 = prev.wrapping_sub(value2).wrapping_sub(carry) & 0xFF;
        self.set_of(prev >= 0x80 && 0x80 > *value1);
        self.set_sf(*value1 & 0x80 != 0);
        self.set_zf(*value1 == 0);
        self.set_af((prev & 0xFF) >= 0x10 && (*value1 & 0xFF) <= 0x10);
        self.set_cf(*value1 > prev);
        self.set_pf(parity(*value1 as u8));
    }

    pub fn and_word_or_dword(&mut self, operand_size: u8, value1: &mut u32, value2: u32) {
        if operand_size == 16 {
            self.and_word(value1, value2);
        } else {
            self.and_dword(value1, value2);
        }
    }

    pub fn and_dword(&mut self, value1: &mut u32, value2: u32) {
        self.set_cf(false);
        self.set_of(false);
        *value1 &= value2;
        self.set_sf(*value1 & 0x8000_0000 != 0);
        self.set_zf(*value1 == 0);
        self.set_pf(parity(*value1 as u8));
    }

    pub fn and_word(&mut self, value1: &mut u32, value2: u32) {
        self.set_cf(false);
        self.set_of(false);
        *value1 = (*value1 & value2) & 0xFFFF;
        self.set_sf(*value1 & 0x8000 != 0);
        self.set_zf(*value1 == 0);
        self.set_pf(parity(*value1 as u8));
    }

    pub fn and_byte(&mut self, value1: &mut u32, value2: u32) {
        self.set_cf(false);
        self.set_of(false);
        *value1 = (*value1 & value2) & 0xFF;
        self.set_sf(*value1 & 0x80 != 0);
        self.set_zf(*value1 == 0);
        self.set_pf(parity(*value1 as u8));
    }

    pub fn or_word_or_dword(&mut self, operand_size: u8, value1: &mut u32, value2: u32) {
        if operand_size == 16 {
            self.or_word(value1, value2);
        } else {
            self.or_dword(value1, value2);
        }
    }

    pub fn or_dword(&mut self, value1: &mut u32, value2: u32) {
        self.set_cf(false);
        self.set_of(false);
        *value1 |= value2;
        self.set_sf(*value1 & 0x8000_0000 != 0);
        self.set_zf(*value1 == 0);
        self.set_pf(parity(*value1 as u8));
    }

    pub fn or_word(&mut self, value1: &mut u32, value2: u32) {
        self.set_cf(false);
        self.set_of(false);
        *value1 = (*value1 | value2) & 0xFFFF;
        self.set_sf(*value1 & 0x8000 != 0);
        self.set_zf(*value1 == 0);
        self.set_pf(parity(*value1 as u8));
    }

    pub fn or_byte(&mut self, value1: &mut u32, value2: u32) {
        self.set_cf(false);
        self.set_of(false);
        *value1 = (*value1 | value2) & 0xFF;
        self.set_sf(*value1 & 0x80 != 0);
        self.set_zf(*value1 == 0);
        self.set_pf(parity(*value1 as u8));
    }

    pub fn xor_word_or_dword(&mut self, operand_size: u8, value1: &mut u32, value2: u32) {
        if operand_size == 16 {
            self.xor_word(value1, value2);
        } else {
            self.xor_dword(value1, value2);
        }
    }

    pub fn xor_dword(&mut self, value1: &mut u32, value2: u32) {
        self.set_cf(false);
        self.set_of(false);
        *value1 ^= value2;
        self.set_sf(*value1 & 0x8000_0000 != 0);
        self.set_zf(*value1 == 0);
        self.set_pf(parity(*value1 as u8));
    }

    pub fn xor_word(&mut self, value1: &mut u32, value2: u32) {
        self.set_cf(false);
        self.set_of(false);
        *value1 = (*value1 ^ value2) & 0xFFFF;
        self.set_sf(*value1 & 0x8000 != 0);
        self.set_zf(*value1 == 0);
        self.set_pf(parity(*value1 as u8));
    }

    pub fn xor_byte(&mut self, value1: &mut u32, value2: u32) {
        self.set_cf(false);
        self.set_of(false);
        *value1 = (*value1 ^ value2) & 0xFF;
        self.set_sf(*value1 & 0x80 != 0);
        self.set_zf(*value1 == 0);
        self.set_pf(parity(*value1 as u8));
    }

    pub fn increment_word_or_dword(&mut self, operand_size: u8, value: &mut u32) {
        if operand_size == 16 {
            self.increment_word(value);
        } else {
            self.increment_dword(value);
        }
    }

    pub fn increment_dword(&mut self, value: &mut u32) {
        self.set_af(*value & 0x0F == 0x0F);
        *value = value.wrapping_add(1);
        self.set_of(*value == 0x8000_0000);
        self.set_sf(*value & 0x8000_0000 != 0);
        self.set_zf(*value == 0);
        self.set_pf(parity(*value as u8));
    }

    pub fn increment_word(&mut self, value: &mut u32) {
        self.set_af(*value & 0x0F == 0x0F);
        *value = value.wrapping_add(1) & 0xFFFF;
        self.set_of(*value == 0x8000);
        self.set_sf(*value & 0x8000 != 0);
        self.set_zf(*value == 0);
        self.set_pf(parity(*value as u8));
    }

    pub fn increment_byte(&mut self, value: &mut u32) {
        self.set_af(*value & 0x0F == 0x0F);
        *value = value.wrapping_add(1) & 0xFF;
        self.set_of(*value == 0x80);
        self.set_sf(*value & 0x80 != 0);
        self.set_zf(*value == 0);
        self.set_pf(parity(*value as u8));
    }

    pub fn decrement_word_or_dword(&mut self, operand_size: u8, value: &mut u32) {
        if operand_size == 16 {
            self.decrement_word(value);
        } else {
            self.decrement_dword(value);
        }
    }

    pub fn decrement_dword(&mut self, value: &mut u32) {
        *value = value.wrapping_sub(1);
        self.set_of(*value == 0x7FFF_FFFF);
        self.set_sf(*value & 0x8000_0000 != 0);
        self.set_zf(*value == 0);
        self.set_af(*value & 0x0F == 0x0F);
        self.set_pf(parity(*value as u8));
    }

    pub fn decrement_word(&mut self, value: &mut u32) {
        *value = value.wrapping_sub(1) & 0xFFFF;
        self.set_of(*value == 0x7FFF);
        self.set_sf(*value & 0x8000 != 0);
        self.set_zf(*value == 0);
        self.set_af(*value & 0x0F == 0x0F);
        self.set_pf(parity(*value as u8));
    }

    pub fn decrement_byte(&mut self, value: &mut u32) {
        *value = value.wrapping_sub(1) & 0xFF;
        self.set_of(*value == 0x7F);
        self.set_sf(*value & 0x80 != 0);
        self.set_zf(*value == 0);
        self.set_af(*value & 0x0F == 0x0F);
        self.set_pf(parity(*value as u8));
    }

    pub fn shl_word_or_dword(&mut self, operand_size: u8, value: &mut u32, ctr: u32) {
        if operand_size == 16 {
            self.shl_word(value, ctr);
        } else {
            self.shl_dword(value, ctr);
        }
    }

    pub fn shl_dword(&mut self, value: &mut u32, ctr: u32) {
        // Hardware masks the count to 5 bits.
        let ctr = ctr & 0x1F;
        if ctr > 1 {
            *value <<= ctr - 1;
            self.set_cf(*value & 0x8000_0000 != 0);
            *value <<= 1;
        } else if ctr == 1 {
            self.set_cf(*value & 0x8000_0000 != 0);
            let prev = *value;
            *value <<= 1;
            self.set_of((prev & 0x8000_0000) != (*value & 0x8000_0000));
        }
    }

    pub fn shl_word(&mut self, value: &mut u32, ctr: u32) {
        let ctr = ctr & 0x1F;
        if ctr > 1 {
            *value <<= ctr - 1;
            self.set_cf(*value & 0x8000 != 0);
            *value = (*value << 1) & 0xFFFF;
        } else if ctr == 1 {
            self.set_cf(*value & 0x8000 != 0);
            let prev = *value;
            *value = (*value << 1) & 0xFFFF;
            self.set_of((prev & 0x8000) != (*value & 0x8000));
        }
    }

    pub fn shl_byte(&mut self, value: &mut u32, ctr: u32) {
        let ctr = ctr & 0x1F;
        if ctr > 1 {
            *value <<= ctr - 1;
            self.set_cf(*value & 0x80 != 0);
            *value = (*value << 1) & 0xFF;
        } else if ctr == 1 {
            self.set_cf(*value & 0x80 != 0);
            let prev = *value;
            *value = (*value << 1) & 0xFF;
            self.set_of((prev & 0x80) != (*value & 0x80));
        }
    }

    pub fn shr_word_or_dword(&mut self, operand_size: u8, value: &mut u32, ctr: u32) {
        if operand_size == 16 {
            self.shr_word(value, ctr);
        } else {
            self.shr_dword(value, ctr);
        }
    }

    pub fn shr_dword(&mut self, value: &mut u32, ctr: u32) {
        let ctr = ctr & 0x1F;
        if ctr == 0 {
            return;
        }
        self.set_cf((*value >> (ctr - 1)) & 1 != 0);
        if ctr == 1 {
            self.set_of(false);
        }
        *value >>= ctr;
    }

    pub fn shr_word(&mut self, value: &mut u32, ctr: u32) {
        let ctr = ctr & 0x1F;
        if ctr == 0 {
            return;
        }
        *value &= 0xFFFF;
        self.set_cf((*value >> (ctr - 1)) & 1 != 0);
        if ctr == 1 {
            self.set_of(false);
        }
        *value >>= ctr;
    }

    pub fn shr_byte(&mut self, value: &mut u32, ctr: u32) {
        let ctr = ctr & 0x1F;
        if ctr == 0 {
            return;
        }
        *value &= 0xFF;
        self.set_cf((*value >> (ctr - 1)) & 1 != 0);
        if ctr == 1 {
            self.set_of(false);
        }
        *value >>= ctr;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cpu() -> CpuState {
        CpuState::default()
    }

    #[test]
    fn add_byte_carry_and_zero() {
        let mut c = cpu();
        let mut v = 0xFFu32;
        c.add_byte(&mut v, 1);
        assert_eq!(v, 0);
        assert!(c.cf());
        assert!(c.zf());
        assert!(!c.sf());
        assert!(c.pf());
    }

    #[test]
    fn add_word_signed_overflow() {
        let mut c = cpu();
        let mut v = 0x7FFFu32;
        c.add_word(&mut v, 1);
        assert_eq!(v, 0x8000);
        assert!(c.of());
        assert!(c.sf());
        assert!(!c.cf());
        assert!(!c.zf());
    }

    #[test]
    fn add_dword_wraps() {
        let mut c = cpu();
        let mut v = 0xFFFF_FFFFu32;
        c.add_dword(&mut v, 2);
        assert_eq!(v, 1);
        assert!(c.cf());
        assert!(!c.zf());
    }

    #[test]
    fn adc_consumes_carry() {
        let mut c = cpu();
        c.set_cf(true);
        let mut v = 0x10u32;
        c.adc_byte(&mut v, 0x20);
        assert_eq!(v, 0x31);
        assert!(!c.cf());
    }

    #[test]
    fn sub_borrow_sets_cf() {
        let mut c = cpu();
        let mut v = 1u32;
        c.sub_word(&mut v, 2);
        assert_eq!(v, 0xFFFF);
        assert!(c.cf());
        assert!(c.sf());
        assert!(!c.zf());
    }

    #[test]
    fn sub_to_zero() {
        let mut c = cpu();
        let mut v = 0x44u32;
        c.sub_dword(&mut v, 0x44);
        assert_eq!(v, 0);
        assert!(c.zf());
        assert!(!c.cf());
        assert!(!c.sf());
        assert!(c.pf());
    }

    #[test]
    fn sbb_consumes_carry() {
        let mut c = cpu();
        c.set_cf(true);
        let mut v = 0x10u32;
        c.sbb_byte(&mut v, 0x08);
        assert_eq!(v, 0x07);
    }

    #[test]
    fn logic_ops_clear_cf_of() {
        let mut c = cpu();
        c.set_cf(true);
        c.set_of(true);
        let mut v = 0xF0F0u32;
        c.and_word(&mut v, 0x0FF0);
        assert_eq!(v, 0x00F0);
        assert!(!c.cf());
        assert!(!c.of());
        assert!(!c.sf());
        assert!(c.pf());

        c.set_cf(true);
        let mut v = 0u32;
        c.or_dword(&mut v, 0x8000_0000);
        assert!(!c.cf());
        assert!(c.sf());

        c.set_cf(true);
        let mut v = 0xAAu32;
        c.xor_byte(&mut v, 0xAA);
        assert_eq!(v, 0);
        assert!(c.zf());
        assert!(!c.cf());
    }

    #[test]
    fn inc_dec_never_touch_cf() {
        for carry in [false, true] {
            let mut c = cpu();
            c.set_cf(carry);
            let mut v = 0xFFu32;
            c.increment_byte(&mut v);
            assert_eq!(v, 0);
            assert!(c.zf());
            assert!(c.af());
            assert_eq!(c.cf(), carry);

            let mut v = 0u32;
            c.decrement_word(&mut v);
            assert_eq!(v, 0xFFFF);
            assert!(c.sf());
            assert_eq!(c.cf(), carry);
        }
    }

    #[test]
    fn inc_signed_overflow() {
        let mut c = cpu();
        let mut v = 0x7FFF_FFFFu32;
        c.increment_dword(&mut v);
        assert_eq!(v, 0x8000_0000);
        assert!(c.of());
        assert!(c.sf());
    }

    #[test]
    fn dec_signed_overflow() {
        let mut c = cpu();
        let mut v = 0x80u32;
        c.decrement_byte(&mut v);
        assert_eq!(v, 0x7F);
        assert!(c.of());
        assert!(!c.sf());
    }

    #[test]
    fn shl_count_one_defines_of() {
        let mut c = cpu();
        let mut v = 0x4000u32;
        c.shl_word(&mut v, 1);
        assert_eq!(v, 0x8000);
        assert!(c.of());
        assert!(!c.cf());
    }

    #[test]
    fn shl_count_above_one_leaves_of() {
        let mut c = cpu();
        c.set_of(true);
        let mut v = 0x4000u32;
        c.shl_word(&mut v, 2);
        assert_eq!(v, 0);
        assert!(c.of());
        assert!(c.cf()); // 0x8000 was the last bit out

        let mut c = cpu();
        c.set_of(false);
        let mut v = 0x4000u32;
        c.shl_word(&mut v, 2);
        assert!(!c.of());
    }

    #[test]
    fn shl_count_zero_is_a_no_op() {
        let mut c = cpu();
        c.set_cf(true);
        let mut v = 0x8001u32;
        c.shl_word(&mut v, 0);
        assert_eq!(v, 0x8001);
        assert!(c.cf());
    }

    #[test]
    fn shr_cf_tracks_last_bit_out() {
        let mut c = cpu();
        let mut v = 0b100u32;
        c.shr_dword(&mut v, 3);
        assert_eq!(v, 0);
        assert!(c.cf());

        let mut v = 0b1000u32;
        c.shr_dword(&mut v, 3);
        assert_eq!(v, 1);
        assert!(!c.cf());
    }

    #[test]
    fn shr_count_one_clears_of() {
        let mut c = cpu();
        c.set_of(true);
        let mut v = 3u32;
        c.shr_byte(&mut v, 1);
        assert_eq!(v, 1);
        assert!(!c.of());
        assert!(c.cf());
    }

    #[test]
    fn shr_count_zero_is_a_no_op() {
        let mut c = cpu();
        c.set_cf(false);
        let mut v = 1u32;
        c.shr_word(&mut v, 0);
        assert_eq!(v, 1);
        assert!(!c.cf());
    }

    #[test]
    fn word_or_dword_dispatch() {
        let mut c = cpu();
        let mut v = 0xFFFFu32;
        c.add_word_or_dword(16, &mut v, 1);
        assert_eq!(v, 0);
        assert!(c.cf());

        let mut v = 0xFFFFu32;
        c.add_word_or_dword(32, &mut v, 1);
        assert_eq!(v, 0x10000);
        assert!(!c.cf());
    }
}
