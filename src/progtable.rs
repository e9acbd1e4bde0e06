//! The static instruction descriptor table.
//!
//! The table gives the basic information about every instruction generated by the
//! compiler and processed in the optimizer. Size-variant families are written out
//! in full even where the compiler only emits some of the variants, so that a new
//! emitter finds an entry instead of a hole.
//!
//! The classification is an exhaustive `match` over `Opcode`: an opcode added to
//! the enumeration without a row here does not compile. The runtime check for an
//! empty flag set in `ProgTable::proginfo` stays as the safety net for tables built
//! with `ProgTable::from_fn`.
use crate::flags::ProgFlags;
use crate::opcode::Opcode;
use crate::registers::RegSet;
use lazy_static::lazy_static;
use std::fmt;

/// Descriptor of an instruction: its flags and the registers it touches implicitly.
///
/// For a static table entry `reguse` and `regset` are the registers always used
/// and always defined, whatever the operands. For a resolved occurrence they are
/// the complete use and define sets, and `regindex` holds the part of `reguse`
/// that comes from address arithmetic (base and index registers).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ProgInfo {
    pub flags: ProgFlags,
    pub reguse: RegSet,
    pub regset: RegSet,
    pub regindex: RegSet,
}
impl ProgInfo {
    pub fn new(flags: ProgFlags) -> Self {
        ProgInfo {
            flags,
            ..Default::default()
        }
    }
    pub fn with_regs(flags: ProgFlags, reguse: RegSet, regset: RegSet) -> Self {
        ProgInfo {
            flags,
            reguse,
            regset,
            regindex: RegSet::empty(),
        }
    }
}
impl fmt::Display for ProgInfo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "flags: {}  use: {}  set: {}", self.flags, self.reguse, self.regset)?;
        if !self.regindex.is_empty() {
            write!(f, "  index: {}", self.regindex)?;
        }
        Ok(())
    }
}

const AX: RegSet = RegSet::AX;
const CX: RegSet = RegSet::CX;
const DX: RegSet = RegSet::DX;
const DI: RegSet = RegSet::DI;
const SI: RegSet = RegSet::SI;

/// Static classification of every amd64 opcode.
#[rustfmt::skip]
pub fn amd64_entry(op: Opcode) -> ProgInfo {
    use ProgFlags as F;
    use Opcode::*;
    let (b, w, l, q) = (F::SIZE_B, F::SIZE_W, F::SIZE_L, F::SIZE_Q);
    let (sf, sd) = (F::SIZE_F, F::SIZE_D);
    let lr = F::LEFT_READ;
    let rw = F::RIGHT_WRITE;
    let rdwr = F::RIGHT_RDWR;
    let (c, u) = (F::SET_CARRY, F::USE_CARRY);
    let sh = F::SHIFT_CX;
    let flags = |f: ProgFlags| ProgInfo::new(f);
    let regs = |f: ProgFlags, reguse: RegSet, regset: RegSet| ProgInfo::with_regs(f, reguse, regset);

    match op {
        TYPE =>     flags(F::PSEUDO | F::SKIP),
        TEXT =>     flags(F::PSEUDO),
        FUNCDATA => flags(F::PSEUDO),
        PCDATA =>   flags(F::PSEUDO),
        UNDEF =>    flags(F::BREAK),
        USEFIELD => flags(F::OK),
        CHECKNIL => flags(lr),
        VARDEF =>   flags(F::PSEUDO | rw),
        VARKILL =>  flags(F::PSEUDO | rw),

        // NOP is an internal no-op that also stands
        // for USED and SET annotations, not the Intel opcode.
        NOP =>      flags(lr | rw),

        ADCL =>     flags(l | lr | rdwr | c | u),
        ADCQ =>     flags(q | lr | rdwr | c | u),
        ADCW =>     flags(w | lr | rdwr | c | u),

        ADDB =>     flags(b | lr | rdwr | c),
        ADDL =>     flags(l | lr | rdwr | c),
        ADDW =>     flags(w | lr | rdwr | c),
        ADDQ =>     flags(q | lr | rdwr | c),

        ANDB =>     flags(b | lr | rdwr | c),
        ANDL =>     flags(l | lr | rdwr | c),
        ANDQ =>     flags(q | lr | rdwr | c),
        ANDW =>     flags(w | lr | rdwr | c),

        ORB =>      flags(b | lr | rdwr | c),
        ORL =>      flags(l | lr | rdwr | c),
        ORQ =>      flags(q | lr | rdwr | c),
        ORW =>      flags(w | lr | rdwr | c),

        SBBB =>     flags(b | lr | rdwr | c | u),
        SBBL =>     flags(l | lr | rdwr | c | u),
        SBBQ =>     flags(q | lr | rdwr | c | u),
        SBBW =>     flags(w | lr | rdwr | c | u),

        SUBB =>     flags(b | lr | rdwr | c),
        SUBL =>     flags(l | lr | rdwr | c),
        SUBQ =>     flags(q | lr | rdwr | c),
        SUBW =>     flags(w | lr | rdwr | c),

        XORB =>     flags(b | lr | rdwr | c),
        XORL =>     flags(l | lr | rdwr | c),
        XORQ =>     flags(q | lr | rdwr | c),
        XORW =>     flags(w | lr | rdwr | c),

        DECB =>     flags(b | rdwr),
        DECL =>     flags(l | rdwr),
        DECQ =>     flags(q | rdwr),
        DECW =>     flags(w | rdwr),

        INCB =>     flags(b | rdwr),
        INCL =>     flags(l | rdwr),
        INCQ =>     flags(q | rdwr),
        INCW =>     flags(w | rdwr),

        NEGB =>     flags(b | rdwr | c),
        NEGL =>     flags(l | rdwr | c),
        NEGQ =>     flags(q | rdwr | c),
        NEGW =>     flags(w | rdwr | c),

        NOTB =>     flags(b | rdwr),
        NOTL =>     flags(l | rdwr),
        NOTQ =>     flags(q | rdwr),
        NOTW =>     flags(w | rdwr),

        CMPB =>     flags(b | lr | F::RIGHT_READ | c),
        CMPL =>     flags(l | lr | F::RIGHT_READ | c),
        CMPQ =>     flags(q | lr | F::RIGHT_READ | c),
        CMPW =>     flags(w | lr | F::RIGHT_READ | c),

        TESTB =>    flags(b | lr | F::RIGHT_READ | c),
        TESTL =>    flags(l | lr | F::RIGHT_READ | c),
        TESTQ =>    flags(q | lr | F::RIGHT_READ | c),
        TESTW =>    flags(w | lr | F::RIGHT_READ | c),

        COMISD =>   flags(sd | lr | F::RIGHT_READ | c),
        COMISS =>   flags(sf | lr | F::RIGHT_READ | c),
        UCOMISD =>  flags(sd | lr | F::RIGHT_READ),
        UCOMISS =>  flags(sf | lr | F::RIGHT_READ),

        ADDSD =>    flags(sd | lr | rdwr),
        ADDSS =>    flags(sf | lr | rdwr),
        SUBSD =>    flags(sd | lr | rdwr),
        SUBSS =>    flags(sf | lr | rdwr),
        MULSD =>    flags(sd | lr | rdwr),
        MULSS =>    flags(sf | lr | rdwr),
        DIVSD =>    flags(sd | lr | rdwr),
        DIVSS =>    flags(sf | lr | rdwr),

        DIVB =>     regs(b | lr | c, AX, AX),
        DIVL =>     regs(l | lr | c, AX | DX, AX | DX),
        DIVQ =>     regs(q | lr | c, AX | DX, AX | DX),
        DIVW =>     regs(w | lr | c, AX | DX, AX | DX),

        IDIVB =>    regs(b | lr | c, AX, AX),
        IDIVL =>    regs(l | lr | c, AX | DX, AX | DX),
        IDIVQ =>    regs(q | lr | c, AX | DX, AX | DX),
        IDIVW =>    regs(w | lr | c, AX | DX, AX | DX),

        IMULB =>    regs(b | lr | c, AX, AX),
        IMULL =>    flags(l | lr | F::IMUL_AXDX | c),
        IMULQ =>    flags(q | lr | F::IMUL_AXDX | c),
        IMULW =>    flags(w | lr | F::IMUL_AXDX | c),

        MULB =>     regs(b | lr | c, AX, AX),
        MULL =>     regs(l | lr | c, AX, AX | DX),
        MULQ =>     regs(q | lr | c, AX, AX | DX),
        MULW =>     regs(w | lr | c, AX, AX | DX),

        CDQ =>      regs(F::OK, AX, AX | DX),
        CQO =>      regs(F::OK, AX, AX | DX),
        CWD =>      regs(F::OK, AX, AX | DX),

        CVTSD2SL => flags(l | lr | rw | F::CONV),
        CVTSD2SQ => flags(q | lr | rw | F::CONV),
        CVTSD2SS => flags(sf | lr | rw | F::CONV),
        CVTSL2SD => flags(sd | lr | rw | F::CONV),
        CVTSL2SS => flags(sf | lr | rw | F::CONV),
        CVTSQ2SD => flags(sd | lr | rw | F::CONV),
        CVTSQ2SS => flags(sf | lr | rw | F::CONV),
        CVTSS2SD => flags(sd | lr | rw | F::CONV),
        CVTSS2SL => flags(l | lr | rw | F::CONV),
        CVTSS2SQ => flags(q | lr | rw | F::CONV),
        CVTTSD2SL => flags(l | lr | rw | F::CONV),
        CVTTSD2SQ => flags(q | lr | rw | F::CONV),
        CVTTSS2SL => flags(l | lr | rw | F::CONV),
        CVTTSS2SQ => flags(q | lr | rw | F::CONV),

        MOVBLSX =>  flags(l | lr | rw | F::CONV),
        MOVBLZX =>  flags(l | lr | rw | F::CONV),
        MOVBQSX =>  flags(q | lr | rw | F::CONV),
        MOVBQZX =>  flags(q | lr | rw | F::CONV),
        MOVBWSX =>  flags(w | lr | rw | F::CONV),
        MOVBWZX =>  flags(w | lr | rw | F::CONV),
        MOVLQSX =>  flags(q | lr | rw | F::CONV),
        MOVLQZX =>  flags(q | lr | rw | F::CONV),
        MOVWLSX =>  flags(l | lr | rw | F::CONV),
        MOVWLZX =>  flags(l | lr | rw | F::CONV),
        MOVWQSX =>  flags(q | lr | rw | F::CONV),
        MOVWQZX =>  flags(q | lr | rw | F::CONV),
        MOVQL =>    flags(l | lr | rw | F::CONV),

        MOVB =>     flags(b | lr | rw | F::MOVE),
        MOVL =>     flags(l | lr | rw | F::MOVE),
        MOVQ =>     flags(q | lr | rw | F::MOVE),
        MOVW =>     flags(w | lr | rw | F::MOVE),
        MOVSD =>    flags(sd | lr | rw | F::MOVE),
        MOVSS =>    flags(sf | lr | rw | F::MOVE),
        // MOVAPD is used as a faster synonym for MOVSD.
        MOVAPD =>   flags(sd | lr | rw | F::MOVE),

        LEAL =>     flags(F::LEFT_ADDR | rw),
        LEAQ =>     flags(F::LEFT_ADDR | rw),

        POPQ =>     flags(q | rw),
        PUSHQ =>    flags(q | lr),

        XCHGB =>    flags(b | F::LEFT_RDWR | rdwr),
        XCHGL =>    flags(l | F::LEFT_RDWR | rdwr),
        XCHGQ =>    flags(q | F::LEFT_RDWR | rdwr),
        XCHGW =>    flags(w | F::LEFT_RDWR | rdwr),

        MOVSB =>    regs(F::OK, DI | SI, DI | SI),
        MOVSL =>    regs(F::OK, DI | SI, DI | SI),
        MOVSQ =>    regs(F::OK, DI | SI, DI | SI),
        MOVSW =>    regs(F::OK, DI | SI, DI | SI),
        // duffcopy moves each word through CX
        DUFFCOPY => regs(F::OK, DI | SI, DI | SI | CX),

        STOSB =>    regs(F::OK, AX | DI, DI),
        STOSL =>    regs(F::OK, AX | DI, DI),
        STOSQ =>    regs(F::OK, AX | DI, DI),
        STOSW =>    regs(F::OK, AX | DI, DI),
        DUFFZERO => regs(F::OK, AX | DI, DI),

        REP =>      regs(F::OK, CX, CX),
        REPN =>     regs(F::OK, CX, CX),
        CLD =>      flags(F::OK),
        STD =>      flags(F::OK),

        RCLB =>     flags(b | lr | rdwr | sh | c | u),
        RCLL =>     flags(l | lr | rdwr | sh | c | u),
        RCLQ =>     flags(q | lr | rdwr | sh | c | u),
        RCLW =>     flags(w | lr | rdwr | sh | c | u),

        RCRB =>     flags(b | lr | rdwr | sh | c | u),
        RCRL =>     flags(l | lr | rdwr | sh | c | u),
        RCRQ =>     flags(q | lr | rdwr | sh | c | u),
        RCRW =>     flags(w | lr | rdwr | sh | c | u),

        ROLB =>     flags(b | lr | rdwr | sh | c),
        ROLL =>     flags(l | lr | rdwr | sh | c),
        ROLQ =>     flags(q | lr | rdwr | sh | c),
        ROLW =>     flags(w | lr | rdwr | sh | c),

        RORB =>     flags(b | lr | rdwr | sh | c),
        RORL =>     flags(l | lr | rdwr | sh | c),
        RORQ =>     flags(q | lr | rdwr | sh | c),
        RORW =>     flags(w | lr | rdwr | sh | c),

        SALB =>     flags(b | lr | rdwr | sh | c),
        SALL =>     flags(l | lr | rdwr | sh | c),
        SALQ =>     flags(q | lr | rdwr | sh | c),
        SALW =>     flags(w | lr | rdwr | sh | c),

        SARB =>     flags(b | lr | rdwr | sh | c),
        SARL =>     flags(l | lr | rdwr | sh | c),
        SARQ =>     flags(q | lr | rdwr | sh | c),
        SARW =>     flags(w | lr | rdwr | sh | c),

        SHLB =>     flags(b | lr | rdwr | sh | c),
        SHLL =>     flags(l | lr | rdwr | sh | c),
        SHLQ =>     flags(q | lr | rdwr | sh | c),
        SHLW =>     flags(w | lr | rdwr | sh | c),

        SHRB =>     flags(b | lr | rdwr | sh | c),
        SHRL =>     flags(l | lr | rdwr | sh | c),
        SHRQ =>     flags(q | lr | rdwr | sh | c),
        SHRW =>     flags(w | lr | rdwr | sh | c),

        JCC | JCS | JEQ | JGE | JGT | JHI | JLE | JLS |
        JLT | JMI | JNE | JOC | JOS | JPC | JPL | JPS =>
                    flags(F::CJMP | u),

        JMP =>      flags(F::JUMP | F::BREAK | F::KILL_CARRY),
        CALL =>     flags(F::RIGHT_ADDR | F::CALL | F::KILL_CARRY),
        RET =>      flags(F::BREAK | F::KILL_CARRY),
    }
}

/// A broken rule of the classification policy, found by `ProgTable::verify`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub op: Opcode,
    pub rule: &'static str,
}
impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { write!(f, "{}: {}", self.op, self.rule) }
}

/// Descriptor table indexed by opcode.
#[derive(Debug, Clone)]
pub struct ProgTable {
    entries: Vec<ProgInfo>,
}

lazy_static! {
    static ref PROGTABLE: ProgTable = ProgTable::amd64();
}

/// The process-wide amd64 table, built on first use.
pub fn progtable() -> &'static ProgTable { &PROGTABLE }

impl ProgTable {
    /// Build a table by classifying every opcode with `f`.
    pub fn from_fn<F: Fn(Opcode) -> ProgInfo>(f: F) -> Self {
        ProgTable {
            entries: Opcode::ALL.iter().map(|op| f(*op)).collect(),
        }
    }
    pub fn amd64() -> Self { ProgTable::from_fn(amd64_entry) }
    pub fn get(&self, op: Opcode) -> &ProgInfo { &self.entries[op.index()] }
    pub fn iter(&self) -> impl Iterator<Item = (Opcode, &ProgInfo)> + '_ {
        Opcode::ALL.iter().copied().zip(self.entries.iter())
    }

    /// Check every entry against the classification policy.
    pub fn verify(&self) -> Vec<Violation> {
        use ProgFlags as F;
        let mut found = Vec::new();
        for (op, info) in self.iter() {
            let fl = info.flags;
            let mut rule = |broken: bool, rule: &'static str| {
                if broken {
                    found.push(Violation { op, rule })
                }
            };
            rule(fl.is_empty(), "no flags; opcode is not classified");
            rule(fl.size_count() > 1, "more than one size class");
            rule(
                fl.contains(F::CJMP) && !fl.contains(F::USE_CARRY),
                "conditional jump must use carry",
            );
            rule(
                fl.contains(F::JUMP) && !fl.contains(F::BREAK | F::KILL_CARRY),
                "jump must break and kill carry",
            );
            rule(
                fl.contains(F::MOVE) && (!fl.contains(F::LEFT_READ | F::RIGHT_WRITE) || fl.touches_carry()),
                "move must read left, write right and leave carry alone",
            );
            rule(
                fl.contains(F::CONV) && !fl.contains(F::LEFT_READ | F::RIGHT_WRITE),
                "conversion must read left and write right",
            );
            rule(
                fl.contains(F::SHIFT_CX) && !fl.contains(F::SET_CARRY | F::RIGHT_RDWR),
                "shift must set carry and read-write right",
            );
            rule(
                fl.contains(F::PSEUDO) && !(info.reguse | info.regset).is_empty(),
                "pseudo-op with implicit registers",
            );
            rule(!info.regindex.is_empty(), "static entry with addressing registers");
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::{Access, OpSize};
    #[test]
    fn every_opcode_is_classified() {
        let table = progtable();
        for (op, info) in table.iter() {
            if !info.flags.contains(ProgFlags::SKIP) {
                assert!(!info.flags.is_empty(), "{} has no flags", op);
            }
        }
        assert_eq!(table.iter().count(), Opcode::COUNT);
    }
    #[test]
    fn amd64_table_passes_self_check() {
        let violations = progtable().verify();
        assert!(violations.is_empty(), "{:?}", violations);
    }
    #[test]
    fn self_check_reports_broken_tables() {
        let table = ProgTable::from_fn(|op| match op {
            Opcode::JEQ => ProgInfo::new(ProgFlags::CJMP),
            Opcode::MOVL => ProgInfo::new(ProgFlags::SIZE_L | ProgFlags::SIZE_Q | ProgFlags::LEFT_READ),
            Opcode::ADDQ => ProgInfo::default(),
            _ => amd64_entry(op),
        });
        let broken: Vec<(Opcode, &str)> = table.verify().iter().map(|v| (v.op, v.rule)).collect();
        assert!(broken.contains(&(Opcode::JEQ, "conditional jump must use carry")));
        assert!(broken.contains(&(Opcode::MOVL, "more than one size class")));
        assert!(broken.contains(&(Opcode::ADDQ, "no flags; opcode is not classified")));
        assert_eq!(broken.len(), 3, "{:?}", broken);
    }
    #[test]
    fn classification_policy_samples() {
        let t = progtable();
        let addq = t.get(Opcode::ADDQ).flags;
        assert_eq!(addq.size(), Some(OpSize::Q));
        assert_eq!((addq.left(), addq.right()), (Access::Read, Access::ReadWrite));
        assert!(addq.contains(ProgFlags::SET_CARRY));

        let cmpl = t.get(Opcode::CMPL).flags;
        assert_eq!((cmpl.left(), cmpl.right()), (Access::Read, Access::Read));

        let rclq = t.get(Opcode::RCLQ).flags;
        assert!(rclq.contains(ProgFlags::SHIFT_CX | ProgFlags::SET_CARRY | ProgFlags::USE_CARRY));
        assert!(!t.get(Opcode::SHLQ).flags.contains(ProgFlags::USE_CARRY));

        let mulq = t.get(Opcode::MULQ);
        assert_eq!((mulq.reguse, mulq.regset), (RegSet::AX, RegSet::AX | RegSet::DX));
        let cqo = t.get(Opcode::CQO);
        assert_eq!((cqo.reguse, cqo.regset), (RegSet::AX, RegSet::AX | RegSet::DX));
        let duff = t.get(Opcode::DUFFCOPY);
        assert_eq!(duff.regset, RegSet::DI | RegSet::SI | RegSet::CX);

        assert!(t.get(Opcode::TYPE).flags.contains(ProgFlags::SKIP));
        assert_eq!(t.get(Opcode::NOP).flags, ProgFlags::LEFT_READ | ProgFlags::RIGHT_WRITE);
        assert!(t.get(Opcode::RET).flags.contains(ProgFlags::BREAK | ProgFlags::KILL_CARRY));
    }
}
