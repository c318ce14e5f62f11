//! Register identifiers and the debugger-facing name table.

use std::fmt;

/// Every register addressable through an operand, in the same order as
/// [`REG_NAMES`]. `None` is what the decoder emits for an absent base or
/// index register in a memory expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Reg {
    #[default]
    None = 0,

    Al,
    Cl,
    Dl,
    Bl,
    Ah,
    Ch,
    Dh,
    Bh,

    Ax,
    Cx,
    Dx,
    Bx,
    Sp,
    Bp,
    Si,
    Di,

    Eax,
    Ecx,
    Edx,
    Ebx,
    Esp,
    Ebp,
    Esi,
    Edi,

    Eip,
    Eflags,

    Es,
    Cs,
    Ss,
    Ds,
    Fs,
    Gs,

    Gdt,
    Ldt,
    Tr0,
    Tr1,
    Tr2,
    Tr3,
    Tr4,
    Tr5,
    Tr6,
    Tr7,
    Idtr,
    Cr0,
    Cr1,
    Cr2,
    Cr3,
    Dr0,
    Dr1,
    Dr2,
    Dr3,
    Dr4,
    Dr5,
    Dr6,
    Dr7,
}

pub const REG_COUNT: usize = 56;

pub const REG_NAMES: [&str; REG_COUNT] = [
    "(none)",
    "AL", "CL", "DL", "BL", "AH", "CH", "DH", "BH",
    "AX", "CX", "DX", "BX", "SP", "BP", "SI", "DI",
    "EAX", "ECX", "EDX", "EBX", "ESP", "EBP", "ESI", "EDI",
    "EIP", "EFLAGS",
    "ES", "CS", "SS", "DS", "FS", "GS",
    "GDT", "LDT",
    "TR0", "TR1", "TR2", "TR3", "TR4", "TR5", "TR6", "TR7",
    "IDTR",
    "CR0", "CR1", "CR2", "CR3",
    "DR0", "DR1", "DR2", "DR3", "DR4", "DR5", "DR6", "DR7",
];

const ALL_REGS: [Reg; REG_COUNT] = [
    Reg::None,
    Reg::Al, Reg::Cl, Reg::Dl, Reg::Bl, Reg::Ah, Reg::Ch, Reg::Dh, Reg::Bh,
    Reg::Ax, Reg::Cx, Reg::Dx, Reg::Bx, Reg::Sp, Reg::Bp, Reg::Si, Reg::Di,
    Reg::Eax, Reg::Ecx, Reg::Edx, Reg::Ebx, Reg::Esp, Reg::Ebp, Reg::Esi, Reg::Edi,
    Reg::Eip, Reg::Eflags,
    Reg::Es, Reg::Cs, Reg::Ss, Reg::Ds, Reg::Fs, Reg::Gs,
    Reg::Gdt, Reg::Ldt,
    Reg::Tr0, Reg::Tr1, Reg::Tr2, Reg::Tr3, Reg::Tr4, Reg::Tr5, Reg::Tr6, Reg::Tr7,
    Reg::Idtr,
    Reg::Cr0, Reg::Cr1, Reg::Cr2, Reg::Cr3,
    Reg::Dr0, Reg::Dr1, Reg::Dr2, Reg::Dr3, Reg::Dr4, Reg::Dr5, Reg::Dr6, Reg::Dr7,
];

impl Reg {
    pub fn name(self) -> &'static str {
        REG_NAMES[self as usize]
    }

    pub fn from_name(name: &str) -> Option<Reg> {
        ALL_REGS
            .iter()
            .copied()
            .find(|reg| reg.name().eq_ignore_ascii_case(name))
    }

    /// Width in bytes of the value read through an operand. Registers that
    /// have no plain scalar width (descriptor-table and test registers)
    /// return 0.
    pub fn size(self) -> usize {
        use Reg::*;
        match self {
            Al | Cl | Dl | Bl | Ah | Ch | Dh | Bh => 1,
            Ax | Cx | Dx | Bx | Sp | Bp | Si | Di => 2,
            Eax | Ecx | Edx | Ebx | Esp | Ebp | Esi | Edi | Eip | Eflags => 4,
            Es | Cs | Ss | Ds | Fs | Gs => 2,
            Cr0 | Cr1 | Cr2 | Cr3 => 4,
            Dr0 | Dr1 | Dr2 | Dr3 | Dr4 | Dr5 | Dr6 | Dr7 => 4,
            None | Gdt | Ldt | Idtr => 0,
            Tr0 | Tr1 | Tr2 | Tr3 | Tr4 | Tr5 | Tr6 | Tr7 => 0,
        }
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Index into the general-purpose register array, in ModR/M encoding order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gpr {
    Eax = 0,
    Ecx = 1,
    Edx = 2,
    Ebx = 3,
    Esp = 4,
    Ebp = 5,
    Esi = 6,
    Edi = 7,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_table_round_trip() {
        for reg in ALL_REGS {
            assert_eq!(Reg::from_name(reg.name()), Some(reg));
        }
        assert_eq!(Reg::from_name("eax"), Some(Reg::Eax));
        assert_eq!(Reg::from_name("XYZZY"), None);
    }

    #[test]
    fn name_table_ordering() {
        assert_eq!(Reg::None.name(), "(none)");
        assert_eq!(Reg::Al.name(), "AL");
        assert_eq!(Reg::Di.name(), "DI");
        assert_eq!(Reg::Eax.name(), "EAX");
        assert_eq!(Reg::Eflags.name(), "EFLAGS");
        assert_eq!(Reg::Gs.name(), "GS");
        assert_eq!(Reg::Tr7.name(), "TR7");
        assert_eq!(Reg::Dr7.name(), "DR7");
    }

    #[test]
    fn widths() {
        assert_eq!(Reg::Ah.size(), 1);
        assert_eq!(Reg::Sp.size(), 2);
        assert_eq!(Reg::Esp.size(), 4);
        assert_eq!(Reg::Cs.size(), 2);
        assert_eq!(Reg::Gdt.size(), 0);
        assert_eq!(Reg::None.size(), 0);
    }
}
