//! amd64 register model: the registers the optimizer tracks and a bitset over them.
use bitflags::bitflags;
use std::fmt;

/// Enumeration of the registers tracked by the dataflow passes.
/// General registers come first in hardware encoding order, then the SSE registers.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Reg {
    AX = 0,
    CX,
    DX,
    BX,
    SP,
    BP,
    SI,
    DI,
    R8,
    R9,
    R10,
    R11,
    R12,
    R13,
    R14,
    R15,
    X0,
    X1,
    X2,
    X3,
    X4,
    X5,
    X6,
    X7,
    X8,
    X9,
    X10,
    X11,
    X12,
    X13,
    X14,
    X15,
}
const REG_NAMES: &[&str] = &[
    "AX", "CX", "DX", "BX", "SP", "BP", "SI", "DI", "R8", "R9", "R10", "R11", "R12", "R13", "R14", "R15", "X0", "X1",
    "X2", "X3", "X4", "X5", "X6", "X7", "X8", "X9", "X10", "X11", "X12", "X13", "X14", "X15",
];

impl Reg {
    pub const ALL: [Reg; 32] = [
        Reg::AX,
        Reg::CX,
        Reg::DX,
        Reg::BX,
        Reg::SP,
        Reg::BP,
        Reg::SI,
        Reg::DI,
        Reg::R8,
        Reg::R9,
        Reg::R10,
        Reg::R11,
        Reg::R12,
        Reg::R13,
        Reg::R14,
        Reg::R15,
        Reg::X0,
        Reg::X1,
        Reg::X2,
        Reg::X3,
        Reg::X4,
        Reg::X5,
        Reg::X6,
        Reg::X7,
        Reg::X8,
        Reg::X9,
        Reg::X10,
        Reg::X11,
        Reg::X12,
        Reg::X13,
        Reg::X14,
        Reg::X15,
    ];
    pub fn to_str(self) -> &'static str { REG_NAMES[self as usize] }
    // the given string may be in any case
    pub fn from_str(s: &str) -> Option<Self> {
        let upper = s.to_ascii_uppercase();
        REG_NAMES.iter().position(|n| *n == upper).map(|i| Reg::ALL[i])
    }
    /// The single-register set holding this register.
    pub fn mask(self) -> RegSet { RegSet::from_bits_retain(1u32 << self as u32) }
    pub fn is_sse(self) -> bool { self >= Reg::X0 }
}
impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { f.write_str(self.to_str()) }
}

bitflags! {
    /// A set of registers, one bit per `Reg`.
    #[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
    pub struct RegSet: u32 {
        const AX = 1 << 0;
        const CX = 1 << 1;
        const DX = 1 << 2;
        const BX = 1 << 3;
        const SP = 1 << 4;
        const BP = 1 << 5;
        const SI = 1 << 6;
        const DI = 1 << 7;
        const R8 = 1 << 8;
        const R9 = 1 << 9;
        const R10 = 1 << 10;
        const R11 = 1 << 11;
        const R12 = 1 << 12;
        const R13 = 1 << 13;
        const R14 = 1 << 14;
        const R15 = 1 << 15;
        const X0 = 1 << 16;
        const X1 = 1 << 17;
        const X2 = 1 << 18;
        const X3 = 1 << 19;
        const X4 = 1 << 20;
        const X5 = 1 << 21;
        const X6 = 1 << 22;
        const X7 = 1 << 23;
        const X8 = 1 << 24;
        const X9 = 1 << 25;
        const X10 = 1 << 26;
        const X11 = 1 << 27;
        const X12 = 1 << 28;
        const X13 = 1 << 29;
        const X14 = 1 << 30;
        const X15 = 1 << 31;
    }
}

impl RegSet {
    pub fn has(&self, reg: Reg) -> bool { self.contains(reg.mask()) }
    pub fn add(&mut self, reg: Reg) { self.insert(reg.mask()) }
    /// Registers in the set, in encoding order.
    pub fn regs(&self) -> Vec<Reg> { Reg::ALL.iter().copied().filter(|r| self.has(*r)).collect() }
}
impl From<Reg> for RegSet {
    fn from(reg: Reg) -> Self { reg.mask() }
}
impl fmt::Display for RegSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "{:width$}", "-", width = f.width().unwrap_or(0));
        }
        let names: Vec<&str> = self.regs().iter().map(|r| r.to_str()).collect();
        write!(f, "{:width$}", names.join(" "), width = f.width().unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn bit_positions_follow_encoding_order() {
        for (i, r) in Reg::ALL.iter().enumerate() {
            assert_eq!(r.mask().bits(), 1u32 << i, "{}", r);
            assert_eq!(Reg::from_str(r.to_str()), Some(*r));
        }
        assert_eq!(Reg::CX.mask(), RegSet::CX);
        assert_eq!(Reg::X15.mask(), RegSet::X15);
        assert!(Reg::X0.is_sse() && !Reg::R15.is_sse());
    }
    #[test]
    fn names_are_case_insensitive() {
        assert_eq!(Reg::from_str("r11"), Some(Reg::R11));
        assert_eq!(Reg::from_str("x7"), Some(Reg::X7));
        assert_eq!(Reg::from_str("FP"), None);
        assert_eq!(Reg::from_str("SB"), None);
    }
    #[test]
    fn display() {
        let mut set = RegSet::AX | RegSet::DX;
        set.add(Reg::X1);
        assert_eq!(set.to_string(), "AX DX X1");
        assert_eq!(RegSet::empty().to_string(), "-");
        assert!(set.has(Reg::DX) && !set.has(Reg::CX));
    }
}
