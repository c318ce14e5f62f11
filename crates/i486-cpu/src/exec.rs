//! Per-instruction helpers invoked by the driving loop after decode.
//!
//! All semantics are expressed as evaluate -> micro-op -> store, so the
//! operand machinery is the single path for register aliasing, segment
//! defaults, and addressing wrap.

use i486_mem::MemoryBus;

use crate::error::{CpuError, Result};
use crate::operand::{Operand, OperandValue};
use crate::state::CpuState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluOp {
    Add,
    Adc,
    Sub,
    Sbb,
    And,
    Or,
    Xor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftOp {
    Shl,
    Shr,
}

impl CpuState {
    /// MOV: evaluate the source at the destination's width, store through
    /// the destination. No flags.
    pub fn mov<M: MemoryBus>(
        &mut self,
        mem: &mut M,
        address_size: u8,
        dst: &Operand,
        src: &Operand,
    ) -> Result<()> {
        let value = self.evaluate_operand(mem, address_size, src, dst.size())?;
        self.store_operand_value(mem, address_size, dst, value)
    }

    /// Binary arithmetic/logic on a destination operand.
    pub fn alu<M: MemoryBus>(
        &mut self,
        mem: &mut M,
        address_size: u8,
        op: AluOp,
        dst: &Operand,
        src: &Operand,
    ) -> Result<()> {
        let width = dst.size();
        let mut value = self
            .evaluate_operand(mem, address_size, dst, width)?
            .as_u32();
        let rhs = self
            .evaluate_operand(mem, address_size, src, width)?
            .as_u32();
        match (op, width) {
            (AluOp::Add, 1) => self.add_byte(&mut value, rhs),
            (AluOp::Add, 2) => self.add_word(&mut value, rhs),
            (AluOp::Add, 4) => self.add_dword(&mut value, rhs),
            (AluOp::Adc, 1) => self.adc_byte(&mut value, rhs),
            (AluOp::Adc, 2) => self.adc_word(&mut value, rhs),
            (AluOp::Adc, 4) => self.adc_dword(&mut value, rhs),
            (AluOp::Sub, 1) => self.sub_byte(&mut value, rhs),
            (AluOp::Sub, 2) => self.sub_word(&mut value, rhs),
            (AluOp::Sub, 4) => self.sub_dword(&mut value, rhs),
            (AluOp::Sbb, 1) => self.sbb_byte(&mut value, rhs),
            (AluOp::Sbb, 2) => self.sbb_word(&mut value, rhs),
            (AluOp::Sbb, 4) => self.sbb_dword(&mut value, rhs),
            (AluOp::And, 1) => self.and_byte(&mut value, rhs),
            (AluOp::And, 2) => self.and_word(&mut value, rhs),
            (AluOp::And, 4) => self.and_dword(&mut value, rhs),
            (AluOp::Or, 1) => self.or_byte(&mut value, rhs),
            (AluOp::Or, 2) => self.or_word(&mut value, rhs),
            (AluOp::Or, 4) => self.or_dword(&mut value, rhs),
            (AluOp::Xor, 1) => self.xor_byte(&mut value, rhs),
            (AluOp::Xor, 2) => self.xor_word(&mut value, rhs),
            (AluOp::Xor, 4) => self.xor_dword(&mut value, rhs),
            _ => return Err(CpuError::InvalidOperand("unsupported ALU operand width")),
        }
        self.store_operand_value(mem, address_size, dst, OperandValue::from_u32(width, value))
    }

    /// Shift a destination operand by an already-resolved count.
    pub fn shift<M: MemoryBus>(
        &mut self,
        mem: &mut M,
        address_size: u8,
        op: ShiftOp,
        dst: &Operand,
        count: u32,
    ) -> Result<()> {
        let width = dst.size();
        let mut value = self
            .evaluate_operand(mem, address_size, dst, width)?
            .as_u32();
        match (op, width) {
            (ShiftOp::Shl, 1) => self.shl_byte(&mut value, count),
            (ShiftOp::Shl, 2) => self.shl_word(&mut value, count),
            (ShiftOp::Shl, 4) => self.shl_dword(&mut value, count),
            (ShiftOp::Shr, 1) => self.shr_byte(&mut value, count),
            (ShiftOp::Shr, 2) => self.shr_word(&mut value, count),
            (ShiftOp::Shr, 4) => self.shr_dword(&mut value, count),
            _ => return Err(CpuError::InvalidOperand("unsupported shift operand width")),
        }
        self.store_operand_value(mem, address_size, dst, OperandValue::from_u32(width, value))
    }

    pub fn inc<M: MemoryBus>(
        &mut self,
        mem: &mut M,
        address_size: u8,
        dst: &Operand,
    ) -> Result<()> {
        let width = dst.size();
        let mut value = self
            .evaluate_operand(mem, address_size, dst, width)?
            .as_u32();
        match width {
            1 => self.increment_byte(&mut value),
            2 => self.increment_word(&mut value),
            4 => self.increment_dword(&mut value),
            _ => return Err(CpuError::InvalidOperand("unsupported INC operand width")),
        }
        self.store_operand_value(mem, address_size, dst, OperandValue::from_u32(width, value))
    }

    pub fn dec<M: MemoryBus>(
        &mut self,
        mem: &mut M,
        address_size: u8,
        dst: &Operand,
    ) -> Result<()> {
        let width = dst.size();
        let mut value = self
            .evaluate_operand(mem, address_size, dst, width)?
            .as_u32();
        match width {
            1 => self.decrement_byte(&mut value),
            2 => self.decrement_word(&mut value),
            4 => self.decrement_dword(&mut value),
            _ => return Err(CpuError::InvalidOperand("unsupported DEC operand width")),
        }
        self.store_operand_value(mem, address_size, dst, OperandValue::from_u32(width, value))
    }
}
