//! i486-class instruction execution engine.
//!
//! Given a decoded [`inst::Instruction`] and a byte-addressable
//! [`i486_mem::MemoryBus`], this crate reproduces the processor's
//! architectural behavior: register and flag mutation, real/protected-mode
//! segmentation, the operand evaluate/store contract, stack discipline, and
//! repeat-prefix cycle accounting. Opcode fetch/decode, devices, paging, and
//! exception delivery live outside this crate.

#![forbid(unsafe_code)]

pub mod alu;
pub mod debug;
pub mod error;
pub mod exec;
pub mod flags;
pub mod inst;
pub mod operand;
pub mod regs;
pub mod rep;
pub mod segments;
pub mod stack;
pub mod state;

pub use error::{CpuError, Result};
pub use exec::{AluOp, ShiftOp};
pub use inst::{Instruction, Mnemonic};
pub use operand::{Operand, OperandValue};
pub use regs::{Gpr, Reg, REG_NAMES};
pub use rep::{RepOutcome, RepPrefix};
pub use segments::load_descriptor_table_register;
pub use state::{CpuState, DescriptorTableReg, SegReg, SegmentRegister, SystemSegmentRegister};
