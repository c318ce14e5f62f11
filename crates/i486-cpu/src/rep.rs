//! Repeat-prefix protocol for string instructions.

use crate::state::CpuState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RepPrefix {
    #[default]
    None,
    Rep,
    RepNe,
}

/// Result of one repeat-controller step. `clocks` is the fixed cycle cost
/// of the counter handling itself; `None` means the prefix did not apply
/// and timing is left entirely to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepOutcome {
    pub proceed: bool,
    pub clocks: Option<u32>,
}

impl CpuState {
    /// Step the repeat counter before an iteration of a string instruction.
    /// With a REP-class prefix: counter 0 stops at a cost of 5 clocks,
    /// otherwise the counter is decremented and the iteration proceeds at a
    /// cost of 7 clocks. Without a prefix the iteration always proceeds.
    pub fn rep_check(&mut self, prefix: RepPrefix, address_size: u8) -> RepOutcome {
        match prefix {
            RepPrefix::None => RepOutcome {
                proceed: true,
                clocks: None,
            },
            RepPrefix::Rep | RepPrefix::RepNe => {
                let counter = self.cx_or_ecx(address_size);
                if counter == 0 {
                    return RepOutcome {
                        proceed: false,
                        clocks: Some(5),
                    };
                }
                self.set_cx_or_ecx(address_size, counter - 1);
                RepOutcome {
                    proceed: true,
                    clocks: Some(7),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regs::Gpr;

    #[test]
    fn counter_runs_down_then_stops() {
        let mut cpu = CpuState::default();
        cpu.set_gpr32(Gpr::Ecx, 3);
        for expected in [2u32, 1, 0] {
            let out = cpu.rep_check(RepPrefix::Rep, 32);
            assert!(out.proceed);
            assert_eq!(out.clocks, Some(7));
            assert_eq!(cpu.gpr32(Gpr::Ecx), expected);
        }
        let out = cpu.rep_check(RepPrefix::Rep, 32);
        assert!(!out.proceed);
        assert_eq!(out.clocks, Some(5));
        assert_eq!(cpu.gpr32(Gpr::Ecx), 0);
    }

    #[test]
    fn no_prefix_always_proceeds() {
        let mut cpu = CpuState::default();
        cpu.set_gpr32(Gpr::Ecx, 0);
        let out = cpu.rep_check(RepPrefix::None, 32);
        assert!(out.proceed);
        assert_eq!(out.clocks, None);
        assert_eq!(cpu.gpr32(Gpr::Ecx), 0);
    }

    #[test]
    fn sixteen_bit_addressing_uses_cx_only() {
        let mut cpu = CpuState::default();
        cpu.set_gpr32(Gpr::Ecx, 0x0001_0000);
        // CX is 0 even though ECX is not.
        let out = cpu.rep_check(RepPrefix::RepNe, 16);
        assert!(!out.proceed);
        assert_eq!(out.clocks, Some(5));
        assert_eq!(cpu.gpr32(Gpr::Ecx), 0x0001_0000);

        let out = cpu.rep_check(RepPrefix::RepNe, 32);
        assert!(out.proceed);
        assert_eq!(cpu.gpr32(Gpr::Ecx), 0x0000_FFFF);
    }
}
