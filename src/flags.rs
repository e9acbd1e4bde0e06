//! Property flags carried by every instruction descriptor.
use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// Basic information about an instruction as seen by the optimizer.
    #[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
    pub struct ProgFlags: u32 {
        /// Pseudo-op, like TEXT, TYPE, PCDATA, FUNCDATA.
        const PSEUDO = 1 << 1;
        /// There's nothing to say about the instruction, but it's still okay to see.
        const OK = 1 << 2;

        // Size of right-side write, or right-side read if no write.
        const SIZE_B = 1 << 3;
        const SIZE_W = 1 << 4;
        const SIZE_L = 1 << 5;
        const SIZE_Q = 1 << 6;
        /// float32
        const SIZE_F = 1 << 7;
        /// float64
        const SIZE_D = 1 << 8;

        // Left side: address taken, read, write.
        const LEFT_ADDR = 1 << 9;
        const LEFT_READ = 1 << 10;
        const LEFT_WRITE = 1 << 11;

        // Right side: address taken, read, write.
        const RIGHT_ADDR = 1 << 12;
        const RIGHT_READ = 1 << 13;
        const RIGHT_WRITE = 1 << 14;

        // Set, use, or kill of carry bit.
        // Kill means the carry bit is never looked at after this kind of instruction.
        const SET_CARRY = 1 << 15;
        const USE_CARRY = 1 << 16;
        const KILL_CARRY = 1 << 17;

        /// straight move
        const MOVE = 1 << 18;
        /// value representation conversion
        const CONV = 1 << 19;
        /// conditional jump
        const CJMP = 1 << 20;
        /// breaks control flow (no fallthrough)
        const BREAK = 1 << 21;
        /// function call
        const CALL = 1 << 22;
        /// jump
        const JUMP = 1 << 23;
        /// never reaches the optimizer as code
        const SKIP = 1 << 24;

        /// shift count in CX unless the count is an immediate
        const SHIFT_CX = 1 << 25;
        /// multiply into DX:AX unless there is an explicit destination
        const IMUL_AXDX = 1 << 26;

        const LEFT_RDWR = Self::LEFT_READ.bits() | Self::LEFT_WRITE.bits();
        const RIGHT_RDWR = Self::RIGHT_READ.bits() | Self::RIGHT_WRITE.bits();
    }
}

const SIZES: [(ProgFlags, OpSize); 6] = [
    (ProgFlags::SIZE_B, OpSize::B),
    (ProgFlags::SIZE_W, OpSize::W),
    (ProgFlags::SIZE_L, OpSize::L),
    (ProgFlags::SIZE_Q, OpSize::Q),
    (ProgFlags::SIZE_F, OpSize::F),
    (ProgFlags::SIZE_D, OpSize::D),
];

/// Operand size class of an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpSize {
    B,
    W,
    L,
    Q,
    F,
    D,
}
impl OpSize {
    /// width in bytes
    pub fn width(self) -> u8 {
        match self {
            OpSize::B => 1,
            OpSize::W => 2,
            OpSize::L | OpSize::F => 4,
            OpSize::Q | OpSize::D => 8,
        }
    }
    pub fn is_float(self) -> bool { matches!(self, OpSize::F | OpSize::D) }
}

/// How an instruction touches one operand slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    None,
    Read,
    Write,
    ReadWrite,
}
impl Access {
    fn from_bits(read: bool, write: bool) -> Self {
        match (read, write) {
            (false, false) => Access::None,
            (true, false) => Access::Read,
            (false, true) => Access::Write,
            (true, true) => Access::ReadWrite,
        }
    }
    pub fn reads(self) -> bool { matches!(self, Access::Read | Access::ReadWrite) }
    pub fn writes(self) -> bool { matches!(self, Access::Write | Access::ReadWrite) }
}

impl ProgFlags {
    /// The size class, if exactly one is present.
    pub fn size(&self) -> Option<OpSize> {
        let mut found = SIZES.iter().filter(|(f, _)| self.contains(*f)).map(|(_, s)| *s);
        match (found.next(), found.next()) {
            (Some(s), None) => Some(s),
            _ => None,
        }
    }
    /// Number of size classes present; well-formed descriptors have zero or one.
    pub fn size_count(&self) -> usize { SIZES.iter().filter(|(f, _)| self.contains(*f)).count() }
    pub fn left(&self) -> Access {
        Access::from_bits(self.contains(ProgFlags::LEFT_READ), self.contains(ProgFlags::LEFT_WRITE))
    }
    pub fn right(&self) -> Access {
        Access::from_bits(self.contains(ProgFlags::RIGHT_READ), self.contains(ProgFlags::RIGHT_WRITE))
    }
    /// Any carry flag effect at all.
    pub fn touches_carry(&self) -> bool {
        self.intersects(ProgFlags::SET_CARRY | ProgFlags::USE_CARRY | ProgFlags::KILL_CARRY)
    }
}

impl fmt::Display for ProgFlags {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "-");
        }
        // iter_names yields the composite RDWR names too; print only the single bits
        let names: Vec<&str> = self
            .iter_names()
            .filter(|(_, flag)| flag.bits().is_power_of_two())
            .map(|(name, _)| name)
            .collect();
        write!(f, "{}", names.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn slot_access() {
        let f = ProgFlags::SIZE_L | ProgFlags::LEFT_READ | ProgFlags::RIGHT_RDWR;
        assert_eq!(f.left(), Access::Read);
        assert_eq!(f.right(), Access::ReadWrite);
        assert_eq!(ProgFlags::RIGHT_WRITE.right(), Access::Write);
        assert_eq!(ProgFlags::OK.left(), Access::None);
        assert!(Access::ReadWrite.reads() && Access::ReadWrite.writes());
        assert!(!Access::Write.reads());
    }
    #[test]
    fn size_class() {
        assert_eq!((ProgFlags::SIZE_Q | ProgFlags::MOVE).size(), Some(OpSize::Q));
        assert_eq!(ProgFlags::SIZE_D.size().map(|s| s.width()), Some(8));
        assert!(ProgFlags::SIZE_F.size().is_some_and(|s| s.is_float()));
        assert_eq!(ProgFlags::PSEUDO.size(), None);
        assert_eq!((ProgFlags::SIZE_B | ProgFlags::SIZE_W).size(), None);
        assert_eq!((ProgFlags::SIZE_B | ProgFlags::SIZE_W).size_count(), 2);
    }
    #[test]
    fn display_skips_composites() {
        let f = ProgFlags::SIZE_B | ProgFlags::RIGHT_RDWR;
        assert_eq!(f.to_string(), "SIZE_B RIGHT_READ RIGHT_WRITE");
        assert_eq!(ProgFlags::empty().to_string(), "-");
    }
}
