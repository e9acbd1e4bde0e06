//! Per-occurrence refinement of the static descriptors.
use crate::error::Error;
use crate::flags::ProgFlags;
use crate::operand::AddrType;
use crate::prog::Prog;
use crate::progtable::{progtable, ProgInfo, ProgTable};
use crate::registers::RegSet;

impl ProgTable {
    /// Resolve the descriptor of one instruction occurrence.
    ///
    /// Starts from the opcode's static entry, then applies the opcode-specific
    /// register rules and finally the registers read by address arithmetic.
    /// An opcode whose entry has no flags is a table defect and is reported as
    /// `ErrorKind::UnknownInstruction`; callers must treat it as fatal.
    pub fn proginfo(&self, p: &Prog) -> Result<ProgInfo, Error> {
        let mut info = *self.get(p.op);
        if info.flags.is_empty() {
            return Err(unknown_inst_err!(p));
        }

        // a variable shift count lives in CX; an immediate count does not
        if info.flags.contains(ProgFlags::SHIFT_CX) && !p.from.is_const() {
            info.reguse |= RegSet::CX;
        }

        if info.flags.contains(ProgFlags::IMUL_AXDX) {
            if p.to.typ == AddrType::None {
                info.reguse |= RegSet::AX;
                info.regset |= RegSet::AX | RegSet::DX;
            } else {
                info.flags |= ProgFlags::RIGHT_RDWR;
            }
        }

        // Addressing makes some registers used.
        info.regindex = p.from.address_regs() | p.to.address_regs();
        info.reguse |= info.regindex;
        Ok(info)
    }
}

/// Resolve `p` against the amd64 table.
pub fn proginfo(p: &Prog) -> Result<ProgInfo, Error> { progtable().proginfo(p) }

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::flags::Access;
    use crate::opcode::Opcode;
    use crate::operand::Addr;
    use crate::progtable::amd64_entry;
    use crate::registers::Reg;

    fn resolve(op: Opcode, from: Addr, to: Addr) -> ProgInfo {
        match proginfo(&Prog::new(op, from, to)) {
            Ok(info) => info,
            Err(e) => panic!("{}", e),
        }
    }

    #[test]
    fn register_move() {
        let info = resolve(Opcode::MOVL, Addr::reg(Reg::AX), Addr::reg(Reg::BX));
        assert_eq!(
            info.flags,
            ProgFlags::SIZE_L | ProgFlags::MOVE | ProgFlags::LEFT_READ | ProgFlags::RIGHT_WRITE
        );
        assert!(info.reguse.is_empty());
        assert!(info.regset.is_empty());
    }
    #[test]
    fn conditional_jump() {
        let info = resolve(Opcode::JNE, Addr::none(), Addr::branch("loop"));
        assert!(info.flags.contains(ProgFlags::CJMP | ProgFlags::USE_CARRY));
        assert!(info.reguse.is_empty() && info.regset.is_empty());
    }
    #[test]
    fn shift_count_register() {
        for op in [Opcode::SHLQ, Opcode::SARL, Opcode::RCRB, Opcode::ROLW] {
            let imm = resolve(op, Addr::konst(3), Addr::reg(Reg::AX));
            assert!(!imm.reguse.has(Reg::CX), "{}", op);
            let var = resolve(op, Addr::reg(Reg::CX), Addr::reg(Reg::AX));
            assert!(var.reguse.has(Reg::CX), "{}", op);
            let mem = resolve(op, Addr::indir(Reg::SI, 0), Addr::reg(Reg::AX));
            assert!(mem.reguse.has(Reg::CX) && mem.reguse.has(Reg::SI), "{}", op);
            assert!(!var.regset.has(Reg::CX));
        }
        // a float immediate is not an integer shift count
        let f = resolve(Opcode::SHLL, Addr::new(AddrType::FConst(1.0)), Addr::reg(Reg::AX));
        assert!(f.reguse.has(Reg::CX));
    }
    #[test]
    fn wide_multiply_implicit_pair() {
        for op in [Opcode::IMULL, Opcode::IMULQ, Opcode::IMULW] {
            let implicit = resolve(op, Addr::reg(Reg::BX), Addr::none());
            assert_eq!(implicit.reguse, RegSet::AX, "{}", op);
            assert_eq!(implicit.regset, RegSet::AX | RegSet::DX, "{}", op);
            assert_eq!(implicit.flags.right(), Access::None);

            let explicit = resolve(op, Addr::reg(Reg::BX), Addr::reg(Reg::CX));
            assert_eq!(explicit.flags.right(), Access::ReadWrite, "{}", op);
            assert!(!explicit.regset.intersects(RegSet::AX | RegSet::DX));
            assert!(explicit.reguse.is_empty());
        }
        // presence decides, not value: an explicit AX destination is still the narrow form
        let to_ax = resolve(Opcode::IMULQ, Addr::konst(10), Addr::reg(Reg::AX));
        assert_eq!(to_ax.flags.right(), Access::ReadWrite);
        assert!(to_ax.regset.is_empty());
    }
    #[test]
    fn addressing_registers_are_used_never_defined() {
        let store = resolve(
            Opcode::MOVQ,
            Addr::reg(Reg::AX),
            Addr::indir(Reg::BX, 8).with_index(Reg::CX, 8),
        );
        assert_eq!(store.reguse, RegSet::BX | RegSet::CX);
        assert_eq!(store.regindex, RegSet::BX | RegSet::CX);
        assert!(store.regset.is_empty());

        let load = resolve(
            Opcode::ADDL,
            Addr::indir(Reg::R12, -4).with_index(Reg::R13, 4),
            Addr::reg(Reg::DX),
        );
        assert_eq!(load.reguse, RegSet::R12 | RegSet::R13);

        let global = resolve(
            Opcode::MOVSD,
            Addr::symbol(AddrType::Extern, "math·tab", 0).with_index(Reg::DI, 8),
            Addr::reg(Reg::X0),
        );
        assert_eq!(global.reguse, RegSet::DI);

        let lea = resolve(Opcode::LEAQ, Addr::indir(Reg::SP, 16), Addr::reg(Reg::DI));
        assert_eq!(lea.reguse, RegSet::SP);
        assert!(lea.regset.is_empty());
    }
    #[test]
    fn addressing_registers_for_every_opcode() {
        let addressing = RegSet::R12 | RegSet::R13 | RegSet::R14 | RegSet::R15;
        for op in Opcode::ALL {
            let info = resolve(
                *op,
                Addr::indir(Reg::R12, 8).with_index(Reg::R13, 4),
                Addr::indir(Reg::R14, -8).with_index(Reg::R15, 8),
            );
            assert!(info.reguse.contains(addressing), "{}: use {}", op, info.reguse);
            assert!(!info.regset.intersects(addressing), "{}: set {}", op, info.regset);
            assert_eq!(info.regindex, addressing, "{}", op);
            assert_eq!(info.reguse, progtable().get(*op).reguse | addressing | variable_shift_count(*op), "{}", op);
        }
    }
    // a memory shift count is read from CX
    fn variable_shift_count(op: Opcode) -> RegSet {
        if progtable().get(op).flags.contains(ProgFlags::SHIFT_CX) {
            RegSet::CX
        } else {
            RegSet::empty()
        }
    }
    #[test]
    fn static_registers_are_kept() {
        let stos = resolve(Opcode::STOSQ, Addr::none(), Addr::none());
        assert_eq!((stos.reguse, stos.regset), (RegSet::AX | RegSet::DI, RegSet::DI));
        let div = resolve(Opcode::IDIVQ, Addr::indir(Reg::BX, 0), Addr::none());
        assert_eq!(div.reguse, RegSet::AX | RegSet::DX | RegSet::BX);
        assert_eq!(div.regset, RegSet::AX | RegSet::DX);
        assert_eq!(div.regindex, RegSet::BX);
    }
    #[test]
    fn operandless_opcodes() {
        for op in [Opcode::RET, Opcode::CLD, Opcode::STD, Opcode::CQO, Opcode::REP, Opcode::UNDEF] {
            let info = resolve(op, Addr::none(), Addr::none());
            assert!(!info.flags.is_empty(), "{}", op);
            assert!(info.regindex.is_empty());
        }
    }
    #[test]
    fn every_opcode_resolves() {
        for op in Opcode::ALL {
            let p = Prog::new(*op, Addr::reg(Reg::AX), Addr::reg(Reg::BX));
            assert!(proginfo(&p).is_ok(), "{}", op);
        }
    }
    #[test]
    fn deterministic() {
        let p = Prog::new(Opcode::SHLQ, Addr::reg(Reg::CX), Addr::indir(Reg::AX, 0).with_index(Reg::BX, 2));
        let first = proginfo(&p).map_err(|e| e.to_string());
        for _ in 0..8 {
            assert_eq!(proginfo(&p).map_err(|e| e.to_string()), first);
        }
    }
    #[test]
    fn unclassified_opcode_is_fatal() {
        let table = ProgTable::from_fn(|op| if op == Opcode::XORQ { ProgInfo::default() } else { amd64_entry(op) });
        let p = Prog::new(Opcode::XORQ, Addr::reg(Reg::AX), Addr::reg(Reg::AX)).at_line(42);
        match table.proginfo(&p) {
            Ok(info) => panic!("expected an error, got {}", info),
            Err(e) => {
                assert_eq!(e.kind, ErrorKind::UnknownInstruction);
                assert!(e.msg.contains("XORQ"));
                assert!(e.msg.contains("line 42"));
                assert_eq!(e.ctx, Some(p));
            }
        }
        // the rest of the table is unaffected
        let ok = Prog::new(Opcode::XORL, Addr::reg(Reg::AX), Addr::reg(Reg::AX));
        assert!(table.proginfo(&ok).is_ok());
    }
}
